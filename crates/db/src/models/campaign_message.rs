//! Campaign message entity: one row per (campaign, recipient), with the
//! instance assignment fixed at planning time.

use serde::Serialize;
use sqlx::FromRow;
use warmline_core::types::{DbId, Timestamp};

/// A row from the `campaign_messages` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct CampaignMessage {
    pub id: DbId,
    pub campaign_id: DbId,
    pub phone: String,
    pub contact_name: Option<String>,
    pub instance_id: DbId,
    pub status: String,
    pub sent_at: Option<Timestamp>,
    pub error_message: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
