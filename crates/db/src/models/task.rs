//! Task row model, joined with its category.

use sqlx::FromRow;
use todo_core::category::Category;
use todo_core::task::Task;
use todo_core::types::{DbId, Timestamp};

/// A `tasks` row joined with the referenced `categories` row.
#[derive(Debug, Clone, FromRow)]
pub struct TaskRow {
    pub id: DbId,
    pub name: String,
    pub description: Option<String>,
    pub deadline: Timestamp,
    pub category_id: DbId,
    pub category_name: String,
    pub category_description: String,
}

impl From<TaskRow> for Task {
    fn from(row: TaskRow) -> Self {
        Task {
            id: row.id,
            name: row.name,
            description: row.description,
            deadline: row.deadline,
            category: Category {
                id: row.category_id,
                name: row.category_name,
                description: row.category_description,
            },
        }
    }
}
