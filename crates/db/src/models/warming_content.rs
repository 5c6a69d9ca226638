//! Warming content entity: a text/image/audio/video item from the shared or
//! operator-owned content library.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warmline_core::types::{DbId, Timestamp};

/// A row from the `warming_contents` table.
///
/// `operator_id` NULL marks a global (shared library) item visible to every
/// operator. At least one of `body` / `media_url` is always present.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarmingContent {
    pub id: DbId,
    pub operator_id: Option<DbId>,
    pub content_type: String,
    pub body: Option<String>,
    pub media_url: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for adding a content item.
#[derive(Debug, Deserialize)]
pub struct CreateWarmingContent {
    pub operator_id: Option<DbId>,
    pub content_type: String,
    pub body: Option<String>,
    pub media_url: Option<String>,
}
