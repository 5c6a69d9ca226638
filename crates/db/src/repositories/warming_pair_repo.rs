//! Repository for the `warming_pairs` table.

use sqlx::PgPool;
use warmline_core::types::DbId;

use crate::models::warming_pair::{CreateWarmingPair, WarmingPair};

/// Column list for `warming_pairs` queries.
const COLUMNS: &str = "id, instance_a_id, instance_b_id, is_active, created_at";

/// Provides CRUD operations for warming pairs.
pub struct WarmingPairRepo;

impl WarmingPairRepo {
    /// Link two instances for mutual warming.
    pub async fn create(
        pool: &PgPool,
        input: &CreateWarmingPair,
    ) -> Result<WarmingPair, sqlx::Error> {
        let query = format!(
            "INSERT INTO warming_pairs (instance_a_id, instance_b_id) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingPair>(&query)
            .bind(input.instance_a_id)
            .bind(input.instance_b_id)
            .fetch_one(pool)
            .await
    }

    /// All active pairs an instance participates in, on either side.
    pub async fn list_active_for_instance(
        pool: &PgPool,
        instance_id: DbId,
    ) -> Result<Vec<WarmingPair>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM warming_pairs \
             WHERE (instance_a_id = $1 OR instance_b_id = $1) AND is_active \
             ORDER BY id"
        );
        sqlx::query_as::<_, WarmingPair>(&query)
            .bind(instance_id)
            .fetch_all(pool)
            .await
    }

    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<WarmingPair>, sqlx::Error> {
        let query = format!(
            "UPDATE warming_pairs SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingPair>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }
}
