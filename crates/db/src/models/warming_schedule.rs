//! Warming schedule entity: one per instance being warmed.

use chrono::NaiveDate;
use serde::Serialize;
use sqlx::FromRow;
use warmline_core::types::{DbId, Timestamp};

/// A row from the `warming_schedules` table.
///
/// `messages_target_today` is NULL until the dispatch cycle samples a target
/// for the current local calendar day; `target_date` records which day the
/// target belongs to so stale targets are resampled after rollover.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarmingSchedule {
    pub id: DbId,
    pub instance_id: DbId,
    pub current_day: i32,
    pub messages_sent_today: i32,
    pub messages_target_today: Option<i32>,
    pub target_date: Option<NaiveDate>,
    pub total_messages_sent: i64,
    pub total_messages_received: i64,
    pub status: String,
    pub last_activity_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
