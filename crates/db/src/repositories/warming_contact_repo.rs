//! Repository for the `warming_contacts` table.

use sqlx::PgPool;
use warmline_core::types::DbId;

use crate::models::warming_contact::{CreateWarmingContact, WarmingContact};

/// Column list for `warming_contacts` queries.
const COLUMNS: &str = "id, operator_id, phone, display_name, is_active, created_at";

/// Provides CRUD operations for warming contacts.
pub struct WarmingContactRepo;

impl WarmingContactRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateWarmingContact,
    ) -> Result<WarmingContact, sqlx::Error> {
        let query = format!(
            "INSERT INTO warming_contacts (operator_id, phone, display_name) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingContact>(&query)
            .bind(input.operator_id)
            .bind(&input.phone)
            .bind(&input.display_name)
            .fetch_one(pool)
            .await
    }

    /// All active warming contacts owned by an operator.
    pub async fn list_active_for_operator(
        pool: &PgPool,
        operator_id: DbId,
    ) -> Result<Vec<WarmingContact>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM warming_contacts \
             WHERE operator_id = $1 AND is_active \
             ORDER BY id"
        );
        sqlx::query_as::<_, WarmingContact>(&query)
            .bind(operator_id)
            .fetch_all(pool)
            .await
    }

    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        is_active: bool,
    ) -> Result<Option<WarmingContact>, sqlx::Error> {
        let query = format!(
            "UPDATE warming_contacts SET is_active = $2 WHERE id = $1 RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, WarmingContact>(&query)
            .bind(id)
            .bind(is_active)
            .fetch_optional(pool)
            .await
    }
}
