//! Integration tests for campaign planning, start semantics, result
//! ingestion, and progress aggregation.

mod common;

use std::collections::HashMap;
use std::sync::Arc;

use assert_matches::assert_matches;
use sqlx::PgPool;
use warmline_core::campaign::MessageStatus;
use warmline_core::distribution::SendingMode;
use warmline_core::error::CoreError;
use warmline_db::models::campaign::{CampaignRecipient, CreateCampaign};
use warmline_db::repositories::{CampaignMessageRepo, InstanceRepo};
use warmline_engine::{Engine, EngineError};
use warmline_gateway::mock::MockGateway;

use common::{build_engine, new_instance};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn recipients(n: usize) -> Vec<CampaignRecipient> {
    (0..n)
        .map(|i| CampaignRecipient {
            phone: format!("+5511900{i:05}"),
            contact_name: Some(format!("Lead {i}")),
        })
        .collect()
}

fn campaign_input(instance_ids: Vec<i64>, mode: &str, n: usize) -> CreateCampaign {
    CreateCampaign {
        operator_id: 1,
        name: "spring-launch".to_string(),
        sending_mode: mode.to_string(),
        instance_ids,
        recipients: recipients(n),
    }
}

async fn started_campaign(engine: &Engine, instance_ids: Vec<i64>, mode: &str, n: usize) -> i64 {
    let campaign = engine
        .create_campaign(campaign_input(instance_ids, mode, n))
        .await
        .unwrap();
    engine.start_campaign(campaign.id).await.unwrap();
    campaign.id
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn sequential_plan_is_strict_round_robin(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);

    let a = new_instance(&pool, 1, "wa-a").await;
    let b = new_instance(&pool, 1, "wa-b").await;
    let c = new_instance(&pool, 1, "wa-c").await;
    for id in [a, b, c] {
        gateway.connect(id, "+551190000000").await;
    }

    let id = started_campaign(&engine, vec![a, b, c], "sequential", 10).await;

    // 10 recipients over 3 instances: counts {4, 3, 3} in round-robin order.
    let counts: HashMap<i64, i64> = CampaignMessageRepo::assignment_counts(&pool, id)
        .await
        .unwrap()
        .into_iter()
        .collect();
    assert_eq!(counts[&a], 4);
    assert_eq!(counts[&b], 3);
    assert_eq!(counts[&c], 3);

    let messages = CampaignMessageRepo::list_for_campaign(&pool, id).await.unwrap();
    let expected = [a, b, c, a, b, c, a, b, c, a];
    for (message, want) in messages.iter().zip(expected) {
        assert_eq!(message.instance_id, want);
        assert_eq!(message.status, "queued");
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn weighted_plan_follows_warming_levels(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);

    let strong = new_instance(&pool, 1, "wa-strong").await;
    let weak = new_instance(&pool, 1, "wa-weak").await;
    InstanceRepo::update_warming_level(&pool, strong, 5).await.unwrap();
    gateway.connect(strong, "+551190000001").await;
    gateway.connect(weak, "+551190000002").await;

    let id = started_campaign(&engine, vec![strong, weak], "warming", 6000).await;

    let counts: HashMap<i64, i64> = CampaignMessageRepo::assignment_counts(&pool, id)
        .await
        .unwrap()
        .into_iter()
        .collect();

    // Expectation 5000:1000; allow +-10%.
    assert!(
        (4500..=5500).contains(&counts[&strong]),
        "strong share was {}",
        counts[&strong]
    );
    assert!(
        (500..=1500).contains(&counts[&weak]),
        "weak share was {}",
        counts[&weak]
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn preview_reports_rounded_expected_shares(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);

    let strong = new_instance(&pool, 1, "wa-strong").await;
    let weak = new_instance(&pool, 1, "wa-weak").await;
    InstanceRepo::update_warming_level(&pool, strong, 5).await.unwrap();

    let shares = engine
        .preview_distribution(&[strong, weak], SendingMode::Warming)
        .await
        .unwrap();
    assert_eq!(shares.len(), 2);
    assert_eq!(shares[0].percent, 83);
    assert_eq!(shares[1].percent, 17);
}

// ---------------------------------------------------------------------------
// Start semantics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn starting_twice_is_rejected_without_touching_messages(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);

    let a = new_instance(&pool, 1, "wa-a").await;
    gateway.connect(a, "+551190000001").await;
    let id = started_campaign(&engine, vec![a], "sequential", 10).await;

    let before = CampaignMessageRepo::list_for_campaign(&pool, id).await.unwrap();

    let second = engine.start_campaign(id).await;
    assert_matches!(second, Err(EngineError::Core(CoreError::Conflict(_))));

    let after = CampaignMessageRepo::list_for_campaign(&pool, id).await.unwrap();
    assert_eq!(before.len(), after.len());
    for (b, a) in before.iter().zip(&after) {
        assert_eq!(b.status, a.status);
        assert_eq!(b.instance_id, a.instance_id);
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn start_with_disconnected_instance_is_rejected(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);

    let a = new_instance(&pool, 1, "wa-a").await;
    let b = new_instance(&pool, 1, "wa-b").await;
    gateway.connect(a, "+551190000001").await;
    // b stays disconnected.

    let campaign = engine
        .create_campaign(campaign_input(vec![a, b], "sequential", 5))
        .await
        .unwrap();

    let result = engine.start_campaign(campaign.id).await;
    assert_matches!(result, Err(EngineError::Core(CoreError::Validation(_))));

    // No partial state: still a draft with zero message rows.
    let progress = engine.campaign_progress(campaign.id).await.unwrap();
    assert_eq!(progress.status, "draft");
    assert!(CampaignMessageRepo::list_for_campaign(&pool, campaign.id)
        .await
        .unwrap()
        .is_empty());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn create_rejects_bad_input(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);
    let a = new_instance(&pool, 1, "wa-a").await;

    // Empty recipient list.
    let empty = engine
        .create_campaign(campaign_input(vec![a], "sequential", 0))
        .await;
    assert_matches!(empty, Err(EngineError::Core(CoreError::Validation(_))));

    // Unknown instance id.
    let unknown = engine
        .create_campaign(campaign_input(vec![a, 9999], "sequential", 3))
        .await;
    assert_matches!(unknown, Err(EngineError::Core(CoreError::Validation(_))));

    // Duplicate instance selection.
    let dup = engine
        .create_campaign(campaign_input(vec![a, a], "sequential", 3))
        .await;
    assert_matches!(dup, Err(EngineError::Core(CoreError::Validation(_))));

    // Unknown sending mode.
    let mode = engine
        .create_campaign(campaign_input(vec![a], "broadcast", 3))
        .await;
    assert_matches!(mode, Err(EngineError::Core(CoreError::Validation(_))));
}

// ---------------------------------------------------------------------------
// Results & progress
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn results_drive_progress_and_completion(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);

    let a = new_instance(&pool, 1, "wa-a").await;
    gateway.connect(a, "+551190000001").await;
    let id = started_campaign(&engine, vec![a], "sequential", 5).await;
    let messages = CampaignMessageRepo::list_for_campaign(&pool, id).await.unwrap();

    // 2 sent, 1 failed.
    for message in &messages[0..2] {
        engine
            .record_message_result(id, message.id, MessageStatus::Sent, None)
            .await
            .unwrap();
    }
    engine
        .record_message_result(
            id,
            messages[2].id,
            MessageStatus::Failed,
            Some("invalid number".to_string()),
        )
        .await
        .unwrap();

    let progress = engine.campaign_progress(id).await.unwrap();
    assert_eq!(progress.status, "sending");
    assert_eq!(progress.sent, 2);
    assert_eq!(progress.failed, 1);
    // Failures do not advance progress: 2/5, not 3/5.
    assert_eq!(progress.progress_percent, 40);
    assert!(progress.elapsed_seconds.is_some());
    assert!(progress.estimated_remaining_seconds.is_some());

    let failed = engine.failed_messages(id).await.unwrap();
    assert_eq!(failed.len(), 1);
    assert_eq!(failed[0].error_message.as_deref(), Some("invalid number"));

    // Remaining 2 sent: terminal.
    for message in &messages[3..5] {
        engine
            .record_message_result(id, message.id, MessageStatus::Sent, None)
            .await
            .unwrap();
    }

    let done = engine.campaign_progress(id).await.unwrap();
    assert_eq!(done.status, "completed");
    assert_eq!(done.sent, 4);
    assert_eq!(done.failed, 1);
    assert_eq!(done.progress_percent, 80);
    assert!(done.estimated_remaining_seconds.is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn delivered_receipts_are_tracked_separately(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);

    let a = new_instance(&pool, 1, "wa-a").await;
    gateway.connect(a, "+551190000001").await;
    let id = started_campaign(&engine, vec![a], "sequential", 2).await;
    let messages = CampaignMessageRepo::list_for_campaign(&pool, id).await.unwrap();

    engine
        .record_message_result(id, messages[0].id, MessageStatus::Sent, None)
        .await
        .unwrap();
    engine
        .record_message_result(id, messages[0].id, MessageStatus::Delivered, None)
        .await
        .unwrap();

    let progress = engine.campaign_progress(id).await.unwrap();
    // A delivery receipt does not double-count the send.
    assert_eq!(progress.sent, 1);
    assert_eq!(progress.delivered, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn invalid_message_transition_is_rejected(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);

    let a = new_instance(&pool, 1, "wa-a").await;
    gateway.connect(a, "+551190000001").await;
    let id = started_campaign(&engine, vec![a], "sequential", 1).await;
    let messages = CampaignMessageRepo::list_for_campaign(&pool, id).await.unwrap();

    engine
        .record_message_result(
            id,
            messages[0].id,
            MessageStatus::Failed,
            Some("offline".to_string()),
        )
        .await
        .unwrap();

    // failed is terminal; a late "sent" report must not resurrect it.
    let late = engine
        .record_message_result(id, messages[0].id, MessageStatus::Sent, None)
        .await;
    assert_matches!(late, Err(EngineError::Core(CoreError::Conflict(_))));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn cancel_semantics(pool: PgPool) {
    let gateway = Arc::new(MockGateway::new());
    let engine = build_engine(&pool, Arc::clone(&gateway), 12);

    let a = new_instance(&pool, 1, "wa-a").await;
    gateway.connect(a, "+551190000001").await;

    // A sending campaign can be cancelled.
    let id = started_campaign(&engine, vec![a], "sequential", 2).await;
    let cancelled = engine.cancel_campaign(id).await.unwrap();
    assert_eq!(cancelled.status, "cancelled");

    // Cancelling again is a conflict.
    let again = engine.cancel_campaign(id).await;
    assert_matches!(again, Err(EngineError::Core(CoreError::Conflict(_))));

    // Unknown campaigns report not-found.
    let missing = engine.cancel_campaign(99999).await;
    assert_matches!(missing, Err(EngineError::Core(CoreError::NotFound { .. })));
}
