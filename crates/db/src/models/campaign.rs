//! Campaign entity and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warmline_core::types::{DbId, Timestamp};

/// A row from the `campaigns` table.
///
/// `recipients` holds the staged recipient list (an array of
/// [`CampaignRecipient`] values) between creation and start; once started,
/// the materialized `campaign_messages` rows are authoritative.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Campaign {
    pub id: DbId,
    pub operator_id: DbId,
    pub name: String,
    pub sending_mode: String,
    pub instance_ids: Vec<DbId>,
    pub recipients: serde_json::Value,
    pub total_contacts: i32,
    pub sent: i32,
    pub delivered: i32,
    pub failed: i32,
    pub status: String,
    pub started_at: Option<Timestamp>,
    pub completed_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// One recipient of a bulk send.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignRecipient {
    pub phone: String,
    pub contact_name: Option<String>,
}

/// DTO for creating a draft campaign.
#[derive(Debug, Deserialize)]
pub struct CreateCampaign {
    pub operator_id: DbId,
    pub name: String,
    pub sending_mode: String,
    pub instance_ids: Vec<DbId>,
    pub recipients: Vec<CampaignRecipient>,
}
