//! Warming contact entity: an operator-supplied phone number used purely as
//! a warming target, not a real lead.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warmline_core::types::{DbId, Timestamp};

/// A row from the `warming_contacts` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarmingContact {
    pub id: DbId,
    pub operator_id: DbId,
    pub phone: String,
    pub display_name: Option<String>,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for adding a warming contact.
#[derive(Debug, Deserialize)]
pub struct CreateWarmingContact {
    pub operator_id: DbId,
    pub phone: String,
    pub display_name: Option<String>,
}
