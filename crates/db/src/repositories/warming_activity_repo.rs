//! Repository for the `warming_activities` audit log.
//!
//! Insert-only by design: there is no update or delete method, and none
//! should be added. The log is the audit trail for the whole engine.

use sqlx::PgPool;
use warmline_core::types::DbId;

use crate::models::warming_activity::{NewWarmingActivity, WarmingActivity};

/// Column list for `warming_activities` queries.
const COLUMNS: &str = "\
    id, schedule_id, instance_id, activity_type, target_phone, \
    content_preview, success, error_message, created_at";

/// Append-only access to the warming activity log.
pub struct WarmingActivityRepo;

impl WarmingActivityRepo {
    /// Record one dispatch attempt, successful or not.
    pub async fn insert(
        pool: &PgPool,
        activity: &NewWarmingActivity,
    ) -> Result<WarmingActivity, sqlx::Error> {
        let query = format!(
            "INSERT INTO warming_activities \
                (schedule_id, instance_id, activity_type, target_phone, \
                 content_preview, success, error_message) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingActivity>(&query)
            .bind(activity.schedule_id)
            .bind(activity.instance_id)
            .bind(&activity.activity_type)
            .bind(&activity.target_phone)
            .bind(&activity.content_preview)
            .bind(activity.success)
            .bind(&activity.error_message)
            .fetch_one(pool)
            .await
    }

    /// Paginated audit trail for an instance, newest first.
    pub async fn list_for_instance(
        pool: &PgPool,
        instance_id: DbId,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<WarmingActivity>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM warming_activities \
             WHERE instance_id = $1 \
             ORDER BY created_at DESC, id DESC \
             LIMIT $2 OFFSET $3"
        );
        sqlx::query_as::<_, WarmingActivity>(&query)
            .bind(instance_id)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await
    }

    /// Total attempts logged for a schedule.
    pub async fn count_for_schedule(
        pool: &PgPool,
        schedule_id: DbId,
    ) -> Result<i64, sqlx::Error> {
        sqlx::query_scalar("SELECT COUNT(*) FROM warming_activities WHERE schedule_id = $1")
            .bind(schedule_id)
            .fetch_one(pool)
            .await
    }
}
