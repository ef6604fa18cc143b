//! Persistence gateway contract consumed by the rule engines.
//!
//! A [`Store`] hands out [`Gateway`]s, each of which is one storage
//! transaction. Every read and write issued through a gateway observes the
//! same transaction; nothing is visible to other gateways until
//! [`Gateway::commit`] succeeds. Dropping a gateway without committing rolls
//! it back.

use async_trait::async_trait;

use crate::category::{Category, NewCategory};
use crate::task::{Task, TaskRecord};
use crate::types::DbId;

/// Unique constraint guarding category names.
pub const CATEGORY_NAME_CONSTRAINT: &str = "uq_categories_name";

/// Foreign key from `tasks.category_id` to `categories.id`.
pub const TASK_CATEGORY_CONSTRAINT: &str = "fk_tasks_category";

/// Failures reported by a gateway implementation.
#[derive(Debug, Clone, thiserror::Error)]
pub enum StoreError {
    #[error("unique constraint violated: {constraint}")]
    UniqueViolation { constraint: String },

    #[error("foreign key constraint violated: {constraint}")]
    ForeignKeyViolation { constraint: String },

    #[error("storage backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn backend(err: impl std::fmt::Display) -> Self {
        Self::Backend(err.to_string())
    }

    /// `true` when this is a unique violation on `constraint`.
    pub fn is_unique_violation(&self, name: &str) -> bool {
        matches!(self, StoreError::UniqueViolation { constraint } if constraint == name)
    }

    /// `true` when this is a foreign-key violation on `constraint`.
    pub fn is_foreign_key_violation(&self, name: &str) -> bool {
        matches!(self, StoreError::ForeignKeyViolation { constraint } if constraint == name)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Source of transactions. Owns the connection pool for the process lifetime.
#[async_trait]
pub trait Store: Send + Sync {
    /// Open a new transaction.
    async fn begin(&self) -> StoreResult<Box<dyn Gateway>>;

    /// Cheap liveness probe of the backing storage.
    async fn health_check(&self) -> StoreResult<()>;
}

/// One open storage transaction.
///
/// Existence checks that precede a mutation (`*_exists_by_id`) lock the
/// inspected row until the transaction ends, so the check and the write
/// cannot be interleaved with a concurrent writer.
#[async_trait]
pub trait Gateway: Send {
    // -- categories --

    async fn category_exists_by_name(&mut self, name: &str) -> StoreResult<bool>;

    async fn category_exists_by_name_excluding_id(
        &mut self,
        name: &str,
        id: DbId,
    ) -> StoreResult<bool>;

    async fn category_exists_by_id(&mut self, id: DbId) -> StoreResult<bool>;

    /// Insert when `id` is `None`, otherwise replace every column of row `id`.
    async fn save_category(
        &mut self,
        id: Option<DbId>,
        category: &NewCategory,
    ) -> StoreResult<Category>;

    /// Returns the existing category named `category.name`, or inserts it.
    ///
    /// Must be a single atomic step: concurrent callers with the same name
    /// all receive the same row.
    async fn find_or_create_category(&mut self, category: &NewCategory) -> StoreResult<Category>;

    /// Returns `true` if a row was removed.
    async fn delete_category_by_id(&mut self, id: DbId) -> StoreResult<bool>;

    async fn find_category_by_id(&mut self, id: DbId) -> StoreResult<Option<Category>>;

    async fn find_category_by_name(&mut self, name: &str) -> StoreResult<Option<Category>>;

    /// All categories in insertion order.
    async fn list_categories(&mut self) -> StoreResult<Vec<Category>>;

    // -- tasks --

    async fn task_exists_by_id(&mut self, id: DbId) -> StoreResult<bool>;

    async fn task_exists_by_category_id(&mut self, category_id: DbId) -> StoreResult<bool>;

    /// Insert when `id` is `None`, otherwise replace every column of row `id`.
    async fn save_task(&mut self, id: Option<DbId>, task: &TaskRecord) -> StoreResult<Task>;

    /// Returns `true` if a row was removed.
    async fn delete_task_by_id(&mut self, id: DbId) -> StoreResult<bool>;

    async fn find_task_by_id(&mut self, id: DbId) -> StoreResult<Option<Task>>;

    /// All tasks in insertion order.
    async fn list_tasks(&mut self) -> StoreResult<Vec<Task>>;

    /// Make every write of this transaction visible.
    async fn commit(self: Box<Self>) -> StoreResult<()>;
}
