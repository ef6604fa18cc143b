//! Repository for the `categories` table.

use sqlx::PgConnection;
use todo_core::category::NewCategory;
use todo_core::types::DbId;

use crate::models::category::CategoryRow;

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, name, description";

/// Provides CRUD operations for categories.
pub struct CategoryRepo;

impl CategoryRepo {
    /// Insert a new category, returning the created row.
    pub async fn create(
        conn: &mut PgConnection,
        input: &NewCategory,
    ) -> Result<CategoryRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, description)
             VALUES ($1, $2)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_one(conn)
            .await
    }

    /// Replace name and description of category `id`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &NewCategory,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!(
            "UPDATE categories SET name = $2, description = $3
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(conn)
            .await
    }

    /// Insert the category unless one with the same name exists.
    ///
    /// Returns the inserted row, or `None` when the name was already taken
    /// (possibly by a concurrent transaction that committed while this one
    /// waited on the unique index).
    pub async fn insert_if_absent(
        conn: &mut PgConnection,
        input: &NewCategory,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!(
            "INSERT INTO categories (name, description)
             VALUES ($1, $2)
             ON CONFLICT (name) DO NOTHING
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .fetch_optional(conn)
            .await
    }

    pub async fn find_by_id(
        conn: &mut PgConnection,
        id: DbId,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE id = $1");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    pub async fn find_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE name = $1");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(name)
            .fetch_optional(conn)
            .await
    }

    /// Like [`Self::find_by_name`], holding a key-share lock on the row.
    ///
    /// The lock blocks a concurrent delete until this transaction ends, so a
    /// task written afterwards can still reference the row.
    pub async fn share_by_name(
        conn: &mut PgConnection,
        name: &str,
    ) -> Result<Option<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories WHERE name = $1 FOR KEY SHARE");
        sqlx::query_as::<_, CategoryRow>(&query)
            .bind(name)
            .fetch_optional(conn)
            .await
    }

    /// List all categories in insertion order.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<CategoryRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM categories ORDER BY id");
        sqlx::query_as::<_, CategoryRow>(&query)
            .fetch_all(conn)
            .await
    }

    pub async fn exists_by_name(conn: &mut PgConnection, name: &str) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1)")
            .bind(name)
            .fetch_one(conn)
            .await
    }

    pub async fn exists_by_name_excluding_id(
        conn: &mut PgConnection,
        name: &str,
        id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM categories WHERE name = $1 AND id <> $2)",
        )
        .bind(name)
        .bind(id)
        .fetch_one(conn)
        .await
    }

    /// Lock row `id` for the rest of the transaction. Returns `false` if absent.
    ///
    /// The row lock conflicts with the key-share lock taken by foreign-key
    /// checks, so no task can start referencing the row until it is released.
    pub async fn lock_by_id(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let row = sqlx::query_scalar::<_, DbId>("SELECT id FROM categories WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(row.is_some())
    }

    /// Permanently delete a category by ID. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
