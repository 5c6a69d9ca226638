//! Repository for the `warming_schedules` table.
//!
//! Counter mutations are single conditional UPDATE statements so that
//! overlapping dispatch cycles can never produce a lost update or push
//! `messages_sent_today` past the daily target.

use chrono::NaiveDate;
use sqlx::PgPool;
use warmline_core::schedule::ScheduleStatus;
use warmline_core::types::DbId;

use crate::models::warming_schedule::WarmingSchedule;

/// Column list for `warming_schedules` queries.
const COLUMNS: &str = "\
    id, instance_id, current_day, messages_sent_today, messages_target_today, \
    target_date, total_messages_sent, total_messages_received, status, \
    last_activity_at, created_at, updated_at";

/// Provides CRUD and counter operations for warming schedules.
pub struct WarmingScheduleRepo;

impl WarmingScheduleRepo {
    /// Create an active schedule for an instance, starting at day 1.
    ///
    /// Fails with a unique violation (`uq_warming_schedules_instance`) if
    /// the instance already has a schedule.
    pub async fn create(pool: &PgPool, instance_id: DbId) -> Result<WarmingSchedule, sqlx::Error> {
        let query = format!(
            "INSERT INTO warming_schedules (instance_id) \
             VALUES ($1) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingSchedule>(&query)
            .bind(instance_id)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WarmingSchedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM warming_schedules WHERE id = $1");
        sqlx::query_as::<_, WarmingSchedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    pub async fn find_by_instance(
        pool: &PgPool,
        instance_id: DbId,
    ) -> Result<Option<WarmingSchedule>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM warming_schedules WHERE instance_id = $1");
        sqlx::query_as::<_, WarmingSchedule>(&query)
            .bind(instance_id)
            .fetch_optional(pool)
            .await
    }

    /// List every schedule the dispatch cycle should consider.
    pub async fn list_active(pool: &PgPool) -> Result<Vec<WarmingSchedule>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM warming_schedules WHERE status = $1 ORDER BY id"
        );
        sqlx::query_as::<_, WarmingSchedule>(&query)
            .bind(ScheduleStatus::Active.as_str())
            .fetch_all(pool)
            .await
    }

    /// Persist the day's sampled target.
    ///
    /// When the stored `target_date` differs from `target_date` (a new local
    /// day), `messages_sent_today` is reset in the same statement so the old
    /// day's count never bleeds into the new target.
    pub async fn set_daily_target(
        pool: &PgPool,
        id: DbId,
        target: i32,
        target_date: NaiveDate,
    ) -> Result<Option<WarmingSchedule>, sqlx::Error> {
        let query = format!(
            "UPDATE warming_schedules \
             SET messages_target_today = $2, \
                 messages_sent_today = CASE \
                     WHEN target_date IS DISTINCT FROM $3 THEN 0 \
                     ELSE messages_sent_today \
                 END, \
                 target_date = $3, \
                 updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingSchedule>(&query)
            .bind(id)
            .bind(target)
            .bind(target_date)
            .fetch_optional(pool)
            .await
    }

    /// Atomically count one successful send against the daily target.
    ///
    /// The increment only happens while `messages_sent_today` is strictly
    /// below the target, so concurrent cycles cannot overshoot it. Returns
    /// the updated row, or `None` when the target was already met (the send
    /// still happened; only the counter race is resolved here).
    pub async fn try_increment_sent(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<WarmingSchedule>, sqlx::Error> {
        let query = format!(
            "UPDATE warming_schedules \
             SET messages_sent_today = messages_sent_today + 1, \
                 total_messages_sent = total_messages_sent + 1, \
                 last_activity_at = NOW(), \
                 updated_at = NOW() \
             WHERE id = $1 \
               AND status = 'active' \
               AND messages_target_today IS NOT NULL \
               AND messages_sent_today < messages_target_today \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingSchedule>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Count an inbound reply against the instance's schedule.
    pub async fn increment_received(
        pool: &PgPool,
        instance_id: DbId,
    ) -> Result<Option<WarmingSchedule>, sqlx::Error> {
        let query = format!(
            "UPDATE warming_schedules \
             SET total_messages_received = total_messages_received + 1, \
                 updated_at = NOW() \
             WHERE instance_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingSchedule>(&query)
            .bind(instance_id)
            .fetch_optional(pool)
            .await
    }

    /// Change a schedule's status (pause/resume).
    pub async fn set_status(
        pool: &PgPool,
        instance_id: DbId,
        status: ScheduleStatus,
    ) -> Result<Option<WarmingSchedule>, sqlx::Error> {
        let query = format!(
            "UPDATE warming_schedules \
             SET status = $2, updated_at = NOW() \
             WHERE instance_id = $1 \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingSchedule>(&query)
            .bind(instance_id)
            .bind(status.as_str())
            .fetch_optional(pool)
            .await
    }

    /// Remove the schedule when warming is disabled. Returns whether a row
    /// was deleted.
    pub async fn delete_by_instance(
        pool: &PgPool,
        instance_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM warming_schedules WHERE instance_id = $1")
            .bind(instance_id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Advance every schedule whose daily target belongs to a past local
    /// day: bump `current_day` by the number of elapsed days and clear the
    /// daily counters so the next cycle resamples a fresh target.
    ///
    /// Returns the number of schedules rolled over.
    pub async fn rollover_due(pool: &PgPool, today: NaiveDate) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "UPDATE warming_schedules \
             SET current_day = current_day + ($1 - target_date), \
                 messages_sent_today = 0, \
                 messages_target_today = NULL, \
                 target_date = NULL, \
                 updated_at = NOW() \
             WHERE target_date IS NOT NULL AND target_date < $1",
        )
        .bind(today)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
