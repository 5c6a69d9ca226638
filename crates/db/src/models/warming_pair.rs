//! Warming pair entity: a bilateral "we warm each other" link between two
//! instances of the same operator.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warmline_core::types::{DbId, Timestamp};

/// A row from the `warming_pairs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarmingPair {
    pub id: DbId,
    pub instance_a_id: DbId,
    pub instance_b_id: DbId,
    pub is_active: bool,
    pub created_at: Timestamp,
}

impl WarmingPair {
    /// The other side of the pair, as seen from `instance_id`.
    pub fn counterpart_of(&self, instance_id: DbId) -> DbId {
        if self.instance_a_id == instance_id {
            self.instance_b_id
        } else {
            self.instance_a_id
        }
    }
}

/// DTO for linking two instances.
#[derive(Debug, Deserialize)]
pub struct CreateWarmingPair {
    pub instance_a_id: DbId,
    pub instance_b_id: DbId,
}
