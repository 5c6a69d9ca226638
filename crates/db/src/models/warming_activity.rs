//! Warming activity entity: the append-only audit log of every dispatch
//! attempt. Rows are never mutated after insertion.

use serde::Serialize;
use sqlx::FromRow;
use warmline_core::types::{DbId, Timestamp};

/// A row from the `warming_activities` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarmingActivity {
    pub id: DbId,
    pub schedule_id: DbId,
    pub instance_id: DbId,
    /// `send_<content_type>`, e.g. `send_text`.
    pub activity_type: String,
    pub target_phone: String,
    pub content_preview: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
}

/// Insert payload for a dispatch attempt, built by the engine.
#[derive(Debug, Clone)]
pub struct NewWarmingActivity {
    pub schedule_id: DbId,
    pub instance_id: DbId,
    pub activity_type: String,
    pub target_phone: String,
    pub content_preview: Option<String>,
    pub success: bool,
    pub error_message: Option<String>,
}
