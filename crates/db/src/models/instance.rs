//! Sending instance entity.
//!
//! Instances are registered by an external provisioning flow; this core
//! reads them, checks their live connectivity through the gateway, and owns
//! exactly one column: `warming_level`.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warmline_core::types::{DbId, Timestamp};

/// A row from the `sending_instances` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct SendingInstance {
    pub id: DbId,
    pub operator_id: DbId,
    pub label: String,
    /// 1-5 reputation score, recomputed after every successful warming send.
    pub warming_level: i16,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// DTO for registering an instance.
#[derive(Debug, Deserialize)]
pub struct CreateSendingInstance {
    pub operator_id: DbId,
    pub label: String,
}
