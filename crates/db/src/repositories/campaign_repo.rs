//! Repository for the `campaigns` table.
//!
//! Status transitions are conditional UPDATEs guarded on the current
//! status, so a double "start" or a late counter update can never corrupt a
//! campaign. Counters use increment semantics; no read-modify-write.

use sqlx::PgPool;
use warmline_core::types::DbId;

use crate::models::campaign::{Campaign, CreateCampaign};

/// Column list for `campaigns` queries.
const COLUMNS: &str = "\
    id, operator_id, name, sending_mode, instance_ids, recipients, \
    total_contacts, sent, delivered, failed, status, \
    started_at, completed_at, created_at, updated_at";

/// Provides CRUD and counter operations for campaigns.
pub struct CampaignRepo;

impl CampaignRepo {
    /// Create a draft campaign with its recipient list staged as JSONB.
    pub async fn create(
        pool: &PgPool,
        input: &CreateCampaign,
        recipients_json: &serde_json::Value,
    ) -> Result<Campaign, sqlx::Error> {
        let query = format!(
            "INSERT INTO campaigns \
                (operator_id, name, sending_mode, instance_ids, recipients, total_contacts) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(input.operator_id)
            .bind(&input.name)
            .bind(&input.sending_mode)
            .bind(&input.instance_ids)
            .bind(recipients_json)
            .bind(input.recipients.len() as i32)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM campaigns WHERE id = $1");
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List an operator's campaigns, newest first.
    pub async fn list_for_operator(
        pool: &PgPool,
        operator_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Campaign>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM campaigns \
             WHERE operator_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(operator_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Transition draft -> sending and stamp `started_at`.
    ///
    /// Conditional on the row still being a draft: returns `None` when the
    /// campaign is already sending (or otherwise past draft), which the
    /// engine surfaces as a conflict without touching any message row.
    pub async fn mark_sending(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns \
             SET status = 'sending', started_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = 'draft' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Apply counter deltas from one message transition.
    pub async fn apply_result_deltas(
        pool: &PgPool,
        id: DbId,
        d_sent: i32,
        d_delivered: i32,
        d_failed: i32,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns \
             SET sent = sent + $2, \
                 delivered = delivered + $3, \
                 failed = failed + $4, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .bind(d_sent)
            .bind(d_delivered)
            .bind(d_failed)
            .fetch_optional(pool)
            .await
    }

    /// Transition sending -> completed once every message reached a terminal
    /// send outcome. Conditional, so repeated calls are harmless.
    pub async fn complete_if_done(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns \
             SET status = 'completed', completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 \
               AND status = 'sending' \
               AND sent + failed >= total_contacts \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transition sending -> failed, for a start that could not materialize
    /// its message rows.
    pub async fn mark_failed(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns \
             SET status = 'failed', completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status = 'sending' \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Transition draft/sending -> cancelled.
    pub async fn cancel(pool: &PgPool, id: DbId) -> Result<Option<Campaign>, sqlx::Error> {
        let query = format!(
            "UPDATE campaigns \
             SET status = 'cancelled', completed_at = NOW(), updated_at = NOW() \
             WHERE id = $1 AND status IN ('draft', 'sending') \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Campaign>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }
}
