//! Repository for the `sending_instances` table.

use sqlx::PgPool;
use warmline_core::types::DbId;

use crate::models::instance::{CreateSendingInstance, SendingInstance};

/// Column list for `sending_instances` queries.
const COLUMNS: &str = "id, operator_id, label, warming_level, created_at, updated_at";

/// Provides CRUD operations for sending instances.
pub struct InstanceRepo;

impl InstanceRepo {
    /// Register a new instance at warming level 1.
    pub async fn create(
        pool: &PgPool,
        input: &CreateSendingInstance,
    ) -> Result<SendingInstance, sqlx::Error> {
        let query = format!(
            "INSERT INTO sending_instances (operator_id, label) \
             VALUES ($1, $2) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, SendingInstance>(&query)
            .bind(input.operator_id)
            .bind(&input.label)
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<SendingInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sending_instances WHERE id = $1");
        sqlx::query_as::<_, SendingInstance>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Fetch several instances at once, in the order of `ids`.
    ///
    /// Missing ids are silently absent from the result; the caller decides
    /// whether that is an error.
    pub async fn find_by_ids(
        pool: &PgPool,
        ids: &[DbId],
    ) -> Result<Vec<SendingInstance>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sending_instances \
             WHERE id = ANY($1) \
             ORDER BY array_position($1, id)"
        );
        sqlx::query_as::<_, SendingInstance>(&query)
            .bind(ids)
            .fetch_all(pool)
            .await
    }

    /// List all instances in creation order.
    pub async fn list(pool: &PgPool) -> Result<Vec<SendingInstance>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sending_instances ORDER BY id");
        sqlx::query_as::<_, SendingInstance>(&query).fetch_all(pool).await
    }

    /// Persist a freshly classified warming level.
    pub async fn update_warming_level(
        pool: &PgPool,
        id: DbId,
        warming_level: i16,
    ) -> Result<(), sqlx::Error> {
        sqlx::query(
            "UPDATE sending_instances \
             SET warming_level = $2, updated_at = NOW() \
             WHERE id = $1",
        )
        .bind(id)
        .bind(warming_level)
        .execute(pool)
        .await?;
        Ok(())
    }
}
