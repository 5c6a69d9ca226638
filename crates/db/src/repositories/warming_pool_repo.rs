//! Repository for the cross-operator warming pool tables.

use sqlx::PgPool;
use warmline_core::types::DbId;

use crate::models::warming_pool::{
    CreateWarmingPoolEntry, CreateWarmingPoolPair, WarmingPoolEntry, WarmingPoolPair,
};

/// Column list for `warming_pool_entries` queries.
const ENTRY_COLUMNS: &str = "id, instance_id, phone, is_active, created_at";

/// Column list for `warming_pool_pairs` queries.
const PAIR_COLUMNS: &str = "id, entry_a_id, entry_b_id, is_active, created_at";

/// Provides access to pool entries and their pairing edges.
pub struct WarmingPoolRepo;

impl WarmingPoolRepo {
    /// Opt an instance into the shared pool.
    pub async fn create_entry(
        pool: &PgPool,
        input: &CreateWarmingPoolEntry,
    ) -> Result<WarmingPoolEntry, sqlx::Error> {
        let query = format!(
            "INSERT INTO warming_pool_entries (instance_id, phone) \
             VALUES ($1, $2) \
             RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, WarmingPoolEntry>(&query)
            .bind(input.instance_id)
            .bind(&input.phone)
            .fetch_one(pool)
            .await
    }

    /// The active pool entry of an instance, if it opted in.
    pub async fn find_active_entry_by_instance(
        pool: &PgPool,
        instance_id: DbId,
    ) -> Result<Option<WarmingPoolEntry>, sqlx::Error> {
        let query = format!(
            "SELECT {ENTRY_COLUMNS} FROM warming_pool_entries \
             WHERE instance_id = $1 AND is_active"
        );
        sqlx::query_as::<_, WarmingPoolEntry>(&query)
            .bind(instance_id)
            .fetch_optional(pool)
            .await
    }

    /// Link two pool entries. Pairs are created by the external matching
    /// process; their existence implies mutual consent.
    pub async fn create_pair(
        pool: &PgPool,
        input: &CreateWarmingPoolPair,
    ) -> Result<WarmingPoolPair, sqlx::Error> {
        let query = format!(
            "INSERT INTO warming_pool_pairs (entry_a_id, entry_b_id) \
             VALUES ($1, $2) \
             RETURNING {PAIR_COLUMNS}"
        );
        sqlx::query_as::<_, WarmingPoolPair>(&query)
            .bind(input.entry_a_id)
            .bind(input.entry_b_id)
            .fetch_one(pool)
            .await
    }

    /// Counterpart entries one hop away from `entry_id` across active pool
    /// pairs, restricted to active entries.
    pub async fn counterpart_entries(
        pool: &PgPool,
        entry_id: DbId,
    ) -> Result<Vec<WarmingPoolEntry>, sqlx::Error> {
        let query = format!(
            "SELECT e.id, e.instance_id, e.phone, e.is_active, e.created_at \
             FROM warming_pool_pairs p \
             JOIN warming_pool_entries e \
               ON e.id = CASE \
                   WHEN p.entry_a_id = $1 THEN p.entry_b_id \
                   ELSE p.entry_a_id \
               END \
             WHERE (p.entry_a_id = $1 OR p.entry_b_id = $1) \
               AND p.is_active \
               AND e.is_active \
             ORDER BY e.id"
        );
        sqlx::query_as::<_, WarmingPoolEntry>(&query)
            .bind(entry_id)
            .fetch_all(pool)
            .await
    }

    pub async fn set_entry_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<WarmingPoolEntry>, sqlx::Error> {
        let query = format!(
            "UPDATE warming_pool_entries SET is_active = $2 WHERE id = $1 \
             RETURNING {ENTRY_COLUMNS}"
        );
        sqlx::query_as::<_, WarmingPoolEntry>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }
}
