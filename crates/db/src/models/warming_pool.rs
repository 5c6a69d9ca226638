//! Cross-operator warming pool entities.
//!
//! A pool entry opts an instance into the shared pool under a phone
//! identity; a pool pair is an explicit edge between two entries of
//! different operators. Pairs are created by an external matching process,
//! so their existence implies mutual consent.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use warmline_core::types::{DbId, Timestamp};

/// A row from the `warming_pool_entries` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarmingPoolEntry {
    pub id: DbId,
    pub instance_id: DbId,
    pub phone: String,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// A row from the `warming_pool_pairs` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct WarmingPoolPair {
    pub id: DbId,
    pub entry_a_id: DbId,
    pub entry_b_id: DbId,
    pub is_active: bool,
    pub created_at: Timestamp,
}

/// DTO for opting an instance into the pool.
#[derive(Debug, Deserialize)]
pub struct CreateWarmingPoolEntry {
    pub instance_id: DbId,
    pub phone: String,
}

/// DTO for linking two pool entries.
#[derive(Debug, Deserialize)]
pub struct CreateWarmingPoolPair {
    pub entry_a_id: DbId,
    pub entry_b_id: DbId,
}
