//! Integration tests for the campaign repositories: draft creation, the
//! conditional start transition, message materialization, counter deltas,
//! and terminal-state handling.

use sqlx::PgPool;
use warmline_core::campaign::MessageStatus;
use warmline_db::models::campaign::{CampaignRecipient, CreateCampaign};
use warmline_db::models::instance::CreateSendingInstance;
use warmline_db::repositories::{CampaignMessageRepo, CampaignRepo, InstanceRepo};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn new_instance(pool: &PgPool, operator_id: i64, label: &str) -> i64 {
    InstanceRepo::create(
        pool,
        &CreateSendingInstance {
            operator_id,
            label: label.to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

fn recipients(n: usize) -> Vec<CampaignRecipient> {
    (0..n)
        .map(|i| CampaignRecipient {
            phone: format!("+55119000000{i:02}"),
            contact_name: Some(format!("Lead {i}")),
        })
        .collect()
}

async fn new_draft(pool: &PgPool, instance_ids: Vec<i64>, n: usize) -> i64 {
    let input = CreateCampaign {
        operator_id: 1,
        name: "march-promo".to_string(),
        sending_mode: "sequential".to_string(),
        instance_ids,
        recipients: recipients(n),
    };
    let json = serde_json::to_value(&input.recipients).unwrap();
    CampaignRepo::create(pool, &input, &json).await.unwrap().id
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn draft_campaign_has_zero_counters(pool: PgPool) {
    let a = new_instance(&pool, 1, "wa-a").await;
    let id = new_draft(&pool, vec![a], 5).await;

    let campaign = CampaignRepo::find_by_id(&pool, id).await.unwrap().unwrap();
    assert_eq!(campaign.status, "draft");
    assert_eq!(campaign.total_contacts, 5);
    assert_eq!(campaign.sent, 0);
    assert_eq!(campaign.failed, 0);
    assert!(campaign.started_at.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn mark_sending_is_single_shot(pool: PgPool) {
    let a = new_instance(&pool, 1, "wa-a").await;
    let id = new_draft(&pool, vec![a], 3).await;

    let started = CampaignRepo::mark_sending(&pool, id).await.unwrap();
    assert!(started.is_some());
    assert!(started.unwrap().started_at.is_some());

    // Second start attempt loses the conditional update.
    assert!(CampaignRepo::mark_sending(&pool, id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn bulk_insert_preserves_recipient_order(pool: PgPool) {
    let a = new_instance(&pool, 1, "wa-a").await;
    let b = new_instance(&pool, 1, "wa-b").await;
    let id = new_draft(&pool, vec![a, b], 4).await;

    let recips = recipients(4);
    let assignments = vec![a, b, a, b];
    let inserted = CampaignMessageRepo::bulk_insert(&pool, id, &recips, &assignments)
        .await
        .unwrap();
    assert_eq!(inserted, 4);

    let messages = CampaignMessageRepo::list_for_campaign(&pool, id).await.unwrap();
    assert_eq!(messages.len(), 4);
    for (i, message) in messages.iter().enumerate() {
        assert_eq!(message.phone, recips[i].phone);
        assert_eq!(message.instance_id, assignments[i]);
        assert_eq!(message.status, "queued");
    }

    let counts = CampaignMessageRepo::assignment_counts(&pool, id).await.unwrap();
    assert_eq!(counts, vec![(a, 2), (b, 2)]);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn transition_is_guarded_on_current_status(pool: PgPool) {
    let a = new_instance(&pool, 1, "wa-a").await;
    let id = new_draft(&pool, vec![a], 1).await;
    CampaignMessageRepo::bulk_insert(&pool, id, &recipients(1), &[a])
        .await
        .unwrap();
    let message = &CampaignMessageRepo::list_for_campaign(&pool, id).await.unwrap()[0];

    let updated = CampaignMessageRepo::transition(
        &pool,
        message.id,
        MessageStatus::Queued,
        MessageStatus::Sent,
        None,
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(updated.status, "sent");
    assert!(updated.sent_at.is_some());

    // The guard refuses a transition from a stale expected status.
    let stale = CampaignMessageRepo::transition(
        &pool,
        message.id,
        MessageStatus::Queued,
        MessageStatus::Failed,
        Some("late worker"),
    )
    .await
    .unwrap();
    assert!(stale.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn deltas_and_completion(pool: PgPool) {
    let a = new_instance(&pool, 1, "wa-a").await;
    let id = new_draft(&pool, vec![a], 2).await;
    CampaignRepo::mark_sending(&pool, id).await.unwrap();

    // Not terminal yet: 1 sent of 2.
    CampaignRepo::apply_result_deltas(&pool, id, 1, 0, 0).await.unwrap();
    assert!(CampaignRepo::complete_if_done(&pool, id).await.unwrap().is_none());

    // 1 sent + 1 failed = 2: terminal.
    CampaignRepo::apply_result_deltas(&pool, id, 0, 0, 1).await.unwrap();
    let completed = CampaignRepo::complete_if_done(&pool, id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(completed.status, "completed");
    assert!(completed.completed_at.is_some());

    // Completion is idempotent.
    assert!(CampaignRepo::complete_if_done(&pool, id).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancel_only_from_draft_or_sending(pool: PgPool) {
    let a = new_instance(&pool, 1, "wa-a").await;

    let draft = new_draft(&pool, vec![a], 1).await;
    assert!(CampaignRepo::cancel(&pool, draft).await.unwrap().is_some());
    // Already cancelled: conditional refuses.
    assert!(CampaignRepo::cancel(&pool, draft).await.unwrap().is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn failed_messages_view(pool: PgPool) {
    let a = new_instance(&pool, 1, "wa-a").await;
    let id = new_draft(&pool, vec![a], 3).await;
    CampaignMessageRepo::bulk_insert(&pool, id, &recipients(3), &[a, a, a])
        .await
        .unwrap();
    let messages = CampaignMessageRepo::list_for_campaign(&pool, id).await.unwrap();

    CampaignMessageRepo::transition(
        &pool,
        messages[1].id,
        MessageStatus::Queued,
        MessageStatus::Failed,
        Some("number does not exist"),
    )
    .await
    .unwrap();

    let failed = CampaignMessageRepo::list_failed(&pool, id).await.unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].id, messages[1].id);
    assert_eq!(failed[0].error_message.as_deref(), Some("number does not exist"));
}
