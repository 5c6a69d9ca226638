//! Repository for the `warming_contents` table.

use sqlx::PgPool;
use warmline_core::types::DbId;

use crate::models::warming_content::{CreateWarmingContent, WarmingContent};

/// Column list for `warming_contents` queries.
const COLUMNS: &str = "id, operator_id, content_type, body, media_url, is_active, created_at";

/// Provides CRUD operations for the warming content library.
pub struct WarmingContentRepo;

impl WarmingContentRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateWarmingContent,
    ) -> Result<WarmingContent, sqlx::Error> {
        let query = format!(
            "INSERT INTO warming_contents (operator_id, content_type, body, media_url) \
             VALUES ($1, $2, $3, $4) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingContent>(&query)
            .bind(input.operator_id)
            .bind(&input.content_type)
            .bind(&input.body)
            .bind(&input.media_url)
            .fetch_one(pool)
            .await
    }

    /// Content items an operator may send on a given warming day: active,
    /// of an allowed content type, and either operator-owned or global.
    pub async fn list_eligible(
        pool: &PgPool,
        operator_id: DbId,
        allowed_types: &[&str],
    ) -> Result<Vec<WarmingContent>, sqlx::Error> {
        let types: Vec<String> = allowed_types.iter().map(|t| t.to_string()).collect();
        let query = format!(
            "SELECT {COLUMNS} FROM warming_contents \
             WHERE is_active \
               AND content_type = ANY($2) \
               AND (operator_id = $1 OR operator_id IS NULL) \
             ORDER BY id"
        );
        sqlx::query_as::<_, WarmingContent>(&query)
            .bind(operator_id)
            .bind(&types)
            .fetch_all(pool)
            .await
    }

    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<WarmingContent>, sqlx::Error> {
        let query = format!(
            "UPDATE warming_contents SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingContent>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }
}
