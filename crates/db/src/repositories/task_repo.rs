//! Repository for the `tasks` table.
//!
//! Every read returns the task joined with its category.

use sqlx::PgConnection;
use todo_core::task::TaskRecord;
use todo_core::types::DbId;

use crate::models::task::TaskRow;

/// Joined projection shared by every query returning a [`TaskRow`].
/// Expects the task relation aliased `t` and the category `c`.
const JOINED_COLUMNS: &str = "t.id, t.name, t.description, t.deadline, \
     c.id AS category_id, c.name AS category_name, c.description AS category_description";

/// Provides CRUD operations for tasks.
pub struct TaskRepo;

impl TaskRepo {
    /// Insert a new task, returning it joined with its category.
    pub async fn create(conn: &mut PgConnection, input: &TaskRecord) -> Result<TaskRow, sqlx::Error> {
        let query = format!(
            "WITH t AS (
                INSERT INTO tasks (name, description, deadline, category_id)
                VALUES ($1, $2, $3, $4)
                RETURNING *
             )
             SELECT {JOINED_COLUMNS} FROM t JOIN categories c ON c.id = t.category_id"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.deadline)
            .bind(input.category_id)
            .fetch_one(conn)
            .await
    }

    /// Replace every column of task `id`.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        conn: &mut PgConnection,
        id: DbId,
        input: &TaskRecord,
    ) -> Result<Option<TaskRow>, sqlx::Error> {
        let query = format!(
            "WITH t AS (
                UPDATE tasks SET
                    name = $2,
                    description = $3,
                    deadline = $4,
                    category_id = $5
                WHERE id = $1
                RETURNING *
             )
             SELECT {JOINED_COLUMNS} FROM t JOIN categories c ON c.id = t.category_id"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .bind(&input.name)
            .bind(&input.description)
            .bind(input.deadline)
            .bind(input.category_id)
            .fetch_optional(conn)
            .await
    }

    pub async fn find_by_id(conn: &mut PgConnection, id: DbId) -> Result<Option<TaskRow>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM tasks t
             JOIN categories c ON c.id = t.category_id
             WHERE t.id = $1"
        );
        sqlx::query_as::<_, TaskRow>(&query)
            .bind(id)
            .fetch_optional(conn)
            .await
    }

    /// List all tasks in insertion order.
    pub async fn list(conn: &mut PgConnection) -> Result<Vec<TaskRow>, sqlx::Error> {
        let query = format!(
            "SELECT {JOINED_COLUMNS} FROM tasks t
             JOIN categories c ON c.id = t.category_id
             ORDER BY t.id"
        );
        sqlx::query_as::<_, TaskRow>(&query).fetch_all(conn).await
    }

    /// Lock row `id` for the rest of the transaction. Returns `false` if absent.
    pub async fn lock_by_id(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let row = sqlx::query_scalar::<_, DbId>("SELECT id FROM tasks WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(conn)
            .await?;
        Ok(row.is_some())
    }

    pub async fn exists_by_category_id(
        conn: &mut PgConnection,
        category_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM tasks WHERE category_id = $1)")
            .bind(category_id)
            .fetch_one(conn)
            .await
    }

    /// Permanently delete a task by ID. Returns `true` if a row was removed.
    pub async fn delete(conn: &mut PgConnection, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(conn)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
