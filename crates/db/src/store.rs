//! PostgreSQL implementation of the `todo_core` persistence gateway.

use async_trait::async_trait;
use sqlx::{Postgres, Transaction};
use todo_core::category::{Category, NewCategory};
use todo_core::store::{Gateway, Store, StoreError, StoreResult};
use todo_core::task::{Task, TaskRecord};
use todo_core::types::DbId;

use crate::repositories::{CategoryRepo, TaskRepo};
use crate::DbPool;

/// PostgreSQL error code for unique constraint violations.
const UNIQUE_VIOLATION: &str = "23505";

/// PostgreSQL error code for foreign key violations.
const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Insert/lookup rounds before find-or-create gives up.
const FIND_OR_CREATE_ATTEMPTS: usize = 3;

/// Gateway factory backed by a connection pool.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

/// One open PostgreSQL transaction. Rolled back on drop unless committed.
pub struct PgGateway {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl Store for PgStore {
    async fn begin(&self) -> StoreResult<Box<dyn Gateway>> {
        let tx = self.pool.begin().await.map_err(classify)?;
        Ok(Box::new(PgGateway { tx }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        crate::health_check(&self.pool).await.map_err(classify)
    }
}

#[async_trait]
impl Gateway for PgGateway {
    async fn category_exists_by_name(&mut self, name: &str) -> StoreResult<bool> {
        CategoryRepo::exists_by_name(&mut self.tx, name)
            .await
            .map_err(classify)
    }

    async fn category_exists_by_name_excluding_id(
        &mut self,
        name: &str,
        id: DbId,
    ) -> StoreResult<bool> {
        CategoryRepo::exists_by_name_excluding_id(&mut self.tx, name, id)
            .await
            .map_err(classify)
    }

    async fn category_exists_by_id(&mut self, id: DbId) -> StoreResult<bool> {
        CategoryRepo::lock_by_id(&mut self.tx, id)
            .await
            .map_err(classify)
    }

    async fn save_category(
        &mut self,
        id: Option<DbId>,
        category: &NewCategory,
    ) -> StoreResult<Category> {
        let row = match id {
            None => CategoryRepo::create(&mut self.tx, category)
                .await
                .map_err(classify)?,
            Some(id) => CategoryRepo::update(&mut self.tx, id, category)
                .await
                .map_err(classify)?
                .ok_or_else(|| StoreError::backend(format!("no category row {id}")))?,
        };
        Ok(row.into())
    }

    async fn find_or_create_category(&mut self, category: &NewCategory) -> StoreResult<Category> {
        // A conflicting row can be deleted between the insert and the lookup;
        // the next insert then succeeds.
        for _ in 0..FIND_OR_CREATE_ATTEMPTS {
            if let Some(row) = CategoryRepo::insert_if_absent(&mut self.tx, category)
                .await
                .map_err(classify)?
            {
                tracing::debug!(category_id = row.id, name = %row.name, "Inserted category for task");
                return Ok(row.into());
            }
            if let Some(row) = CategoryRepo::share_by_name(&mut self.tx, &category.name)
                .await
                .map_err(classify)?
            {
                return Ok(row.into());
            }
        }
        Err(StoreError::backend(format!(
            "category '{}' kept conflicting on insert but is not visible",
            category.name
        )))
    }

    async fn delete_category_by_id(&mut self, id: DbId) -> StoreResult<bool> {
        CategoryRepo::delete(&mut self.tx, id)
            .await
            .map_err(classify)
    }

    async fn find_category_by_id(&mut self, id: DbId) -> StoreResult<Option<Category>> {
        let row = CategoryRepo::find_by_id(&mut self.tx, id)
            .await
            .map_err(classify)?;
        Ok(row.map(Category::from))
    }

    async fn find_category_by_name(&mut self, name: &str) -> StoreResult<Option<Category>> {
        let row = CategoryRepo::find_by_name(&mut self.tx, name)
            .await
            .map_err(classify)?;
        Ok(row.map(Category::from))
    }

    async fn list_categories(&mut self) -> StoreResult<Vec<Category>> {
        let rows = CategoryRepo::list(&mut self.tx).await.map_err(classify)?;
        Ok(rows.into_iter().map(Category::from).collect())
    }

    async fn task_exists_by_id(&mut self, id: DbId) -> StoreResult<bool> {
        TaskRepo::lock_by_id(&mut self.tx, id)
            .await
            .map_err(classify)
    }

    async fn task_exists_by_category_id(&mut self, category_id: DbId) -> StoreResult<bool> {
        TaskRepo::exists_by_category_id(&mut self.tx, category_id)
            .await
            .map_err(classify)
    }

    async fn save_task(&mut self, id: Option<DbId>, task: &TaskRecord) -> StoreResult<Task> {
        let row = match id {
            None => TaskRepo::create(&mut self.tx, task)
                .await
                .map_err(classify)?,
            Some(id) => TaskRepo::update(&mut self.tx, id, task)
                .await
                .map_err(classify)?
                .ok_or_else(|| StoreError::backend(format!("no task row {id}")))?,
        };
        Ok(row.into())
    }

    async fn delete_task_by_id(&mut self, id: DbId) -> StoreResult<bool> {
        TaskRepo::delete(&mut self.tx, id).await.map_err(classify)
    }

    async fn find_task_by_id(&mut self, id: DbId) -> StoreResult<Option<Task>> {
        let row = TaskRepo::find_by_id(&mut self.tx, id)
            .await
            .map_err(classify)?;
        Ok(row.map(Task::from))
    }

    async fn list_tasks(&mut self) -> StoreResult<Vec<Task>> {
        let rows = TaskRepo::list(&mut self.tx).await.map_err(classify)?;
        Ok(rows.into_iter().map(Task::from).collect())
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        self.tx.commit().await.map_err(classify)
    }
}

/// Classify a sqlx error into the gateway's error kinds.
///
/// Unique and foreign-key violations keep their constraint name so the rule
/// engines can translate them into business errors.
pub fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        let constraint = db_err.constraint().unwrap_or("unknown").to_string();
        match db_err.code().as_deref() {
            Some(UNIQUE_VIOLATION) => return StoreError::UniqueViolation { constraint },
            Some(FOREIGN_KEY_VIOLATION) => return StoreError::ForeignKeyViolation { constraint },
            _ => {}
        }
    }
    tracing::error!(error = %err, "Database error");
    StoreError::backend(err)
}
