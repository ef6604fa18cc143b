use std::sync::Arc;

use crate::error::CoreError;
use crate::store::{Store, StoreError, TASK_CATEGORY_CONSTRAINT};
use crate::task::{NewTask, Task, TaskRecord};
use crate::types::DbId;

/// Enforces task existence and resolves each task's category by name.
#[derive(Clone)]
pub struct TaskService {
    store: Arc<dyn Store>,
}

impl TaskService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: DbId) -> Result<Task, CoreError> {
        let mut tx = self.store.begin().await?;
        tx.find_task_by_id(id)
            .await?
            .ok_or(CoreError::TaskNotFound { id })
    }

    pub async fn list_all(&self) -> Result<Vec<Task>, CoreError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.list_tasks().await?)
    }

    /// Insert a task, linking it to the category named in its payload.
    ///
    /// An existing category is reused as stored (the payload description is
    /// ignored); otherwise the payload becomes a new category in the same
    /// transaction as the task.
    pub async fn create(&self, input: &NewTask) -> Result<Task, CoreError> {
        let mut tx = self.store.begin().await?;

        let category = tx.find_or_create_category(&input.category).await?;
        let task = tx
            .save_task(None, &TaskRecord::new(input, category.id))
            .await
            .map_err(|e| category_gone(e, &category.name))?;
        tx.commit().await?;

        tracing::info!(
            task_id = task.id,
            category_id = task.category.id,
            name = %task.name,
            "Task created",
        );
        Ok(task)
    }

    /// Replace every field of task `id`, resolving the category as in
    /// [`Self::create`].
    pub async fn update(&self, id: DbId, input: &NewTask) -> Result<Task, CoreError> {
        let mut tx = self.store.begin().await?;

        if !tx.task_exists_by_id(id).await? {
            return Err(CoreError::TaskNotFound { id });
        }

        let category = tx.find_or_create_category(&input.category).await?;
        let task = tx
            .save_task(Some(id), &TaskRecord::new(input, category.id))
            .await
            .map_err(|e| category_gone(e, &category.name))?;
        tx.commit().await?;

        tracing::info!(
            task_id = id,
            category_id = task.category.id,
            name = %task.name,
            "Task updated",
        );
        Ok(task)
    }

    /// Remove task `id`. Its category is left in place.
    pub async fn delete_by_id(&self, id: DbId) -> Result<(), CoreError> {
        let mut tx = self.store.begin().await?;

        if !tx.task_exists_by_id(id).await? || !tx.delete_task_by_id(id).await? {
            return Err(CoreError::TaskNotFound { id });
        }
        tx.commit().await?;

        tracing::info!(task_id = id, "Task deleted");
        Ok(())
    }
}

/// The resolved category can be deleted by another writer before the task
/// row lands; the foreign key rejects the write.
fn category_gone(err: StoreError, name: &str) -> CoreError {
    if err.is_foreign_key_violation(TASK_CATEGORY_CONSTRAINT) {
        CoreError::CategoryNameNotFound {
            name: name.to_string(),
        }
    } else {
        err.into()
    }
}
