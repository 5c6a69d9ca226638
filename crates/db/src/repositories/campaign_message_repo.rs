//! Repository for the `campaign_messages` table.

use sqlx::PgPool;
use warmline_core::campaign::MessageStatus;
use warmline_core::types::DbId;

use crate::models::campaign::CampaignRecipient;
use crate::models::campaign_message::CampaignMessage;

/// Column list for `campaign_messages` queries.
const COLUMNS: &str = "\
    id, campaign_id, phone, contact_name, instance_id, status, \
    sent_at, error_message, created_at, updated_at";

/// Provides CRUD operations for campaign messages.
pub struct CampaignMessageRepo;

impl CampaignMessageRepo {
    /// Materialize one queued message per recipient with its planned
    /// instance assignment, in recipient order.
    ///
    /// `assignments` must be parallel to `recipients` (one instance id per
    /// recipient); the UNNEST insert keeps this a single round trip for
    /// arbitrarily large campaigns.
    pub async fn bulk_insert(
        pool: &PgPool,
        campaign_id: DbId,
        recipients: &[CampaignRecipient],
        assignments: &[DbId],
    ) -> Result<u64, sqlx::Error> {
        let phones: Vec<String> = recipients.iter().map(|r| r.phone.clone()).collect();
        let names: Vec<Option<String>> =
            recipients.iter().map(|r| r.contact_name.clone()).collect();

        let result = sqlx::query(
            "INSERT INTO campaign_messages (campaign_id, phone, contact_name, instance_id) \
             SELECT $1, phone, contact_name, instance_id \
             FROM UNNEST($2::text[], $3::text[], $4::bigint[]) \
               AS t(phone, contact_name, instance_id)",
        )
        .bind(campaign_id)
        .bind(&phones)
        .bind(&names)
        .bind(assignments)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<CampaignMessage>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaign_messages WHERE id = $1");
        sqlx::query_as::<_, CampaignMessage>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All messages of a campaign in recipient (insertion) order.
    pub async fn list_for_campaign(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<CampaignMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaign_messages WHERE campaign_id = $1 ORDER BY id"
        );
        sqlx::query_as::<_, CampaignMessage>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// Failed messages with their failure reasons, for the campaign's
    /// failed-messages view.
    pub async fn list_failed(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<CampaignMessage>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaign_messages \
             WHERE campaign_id = $1 AND status = 'failed' \
             ORDER BY id"
        );
        sqlx::query_as::<_, CampaignMessage>(&query)
            .bind(campaign_id)
            .fetch_all(pool)
            .await
    }

    /// Apply one status transition, guarded on the expected current status.
    ///
    /// Returns `None` when the row moved under us (another pipeline worker
    /// got there first); the engine maps that to a conflict.
    pub async fn transition(
        pool: &PgPool,
        id: DbId,
        from: MessageStatus,
        to: MessageStatus,
        error_message: Option<&str>,
    ) -> Result<Option<CampaignMessage>, sqlx::Error> {
        let query = format!(
            "UPDATE campaign_messages \
             SET status = $3, \
                 sent_at = CASE WHEN $3 = 'sent' THEN NOW() ELSE sent_at END, \
                 error_message = $4, \
                 updated_at = NOW() \
             WHERE id = $1 AND status = $2 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CampaignMessage>(&query)
            .bind(id)
            .bind(from.as_str())
            .bind(to.as_str())
            .bind(error_message)
            .fetch_optional(pool)
            .await
    }

    /// Per-instance assignment counts for a campaign.
    pub async fn assignment_counts(
        pool: &PgPool,
        campaign_id: DbId,
    ) -> Result<Vec<(DbId, i64)>, sqlx::Error> {
        sqlx::query_as::<_, (DbId, i64)>(
            "SELECT instance_id, COUNT(*) FROM campaign_messages \
             WHERE campaign_id = $1 \
             GROUP BY instance_id \
             ORDER BY instance_id",
        )
        .bind(campaign_id)
        .fetch_all(pool)
        .await
    }
}
