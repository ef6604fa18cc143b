use std::sync::Arc;

use crate::category::{Category, NewCategory};
use crate::error::CoreError;
use crate::store::{Store, StoreError, CATEGORY_NAME_CONSTRAINT, TASK_CATEGORY_CONSTRAINT};
use crate::types::DbId;

/// Enforces category name uniqueness and existence rules.
#[derive(Clone)]
pub struct CategoryService {
    store: Arc<dyn Store>,
}

impl CategoryService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    pub async fn find_by_id(&self, id: DbId) -> Result<Category, CoreError> {
        let mut tx = self.store.begin().await?;
        tx.find_category_by_id(id)
            .await?
            .ok_or(CoreError::CategoryNotFound { id })
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Category, CoreError> {
        let mut tx = self.store.begin().await?;
        tx.find_category_by_name(name)
            .await?
            .ok_or_else(|| CoreError::CategoryNameNotFound {
                name: name.to_string(),
            })
    }

    /// All categories in storage order.
    pub async fn list_all(&self) -> Result<Vec<Category>, CoreError> {
        let mut tx = self.store.begin().await?;
        Ok(tx.list_categories().await?)
    }

    /// Insert a category whose name is not yet taken.
    pub async fn create(&self, input: &NewCategory) -> Result<Category, CoreError> {
        let mut tx = self.store.begin().await?;

        if tx.category_exists_by_name(&input.name).await? {
            tracing::debug!(name = %input.name, "Rejected duplicate category name");
            return Err(already_exists(&input.name));
        }

        let category = tx
            .save_category(None, input)
            .await
            .map_err(|e| name_conflict(e, &input.name))?;
        tx.commit().await.map_err(|e| name_conflict(e, &input.name))?;

        tracing::info!(category_id = category.id, name = %category.name, "Category created");
        Ok(category)
    }

    /// Replace the name and description of category `id`.
    ///
    /// Keeping the current name is allowed; taking another category's name
    /// is not.
    pub async fn update(&self, id: DbId, input: &NewCategory) -> Result<Category, CoreError> {
        let mut tx = self.store.begin().await?;

        if !tx.category_exists_by_id(id).await? {
            return Err(CoreError::CategoryNotFound { id });
        }
        if tx
            .category_exists_by_name_excluding_id(&input.name, id)
            .await?
        {
            tracing::debug!(category_id = id, name = %input.name, "Rejected category rename");
            return Err(already_exists(&input.name));
        }

        let category = tx
            .save_category(Some(id), input)
            .await
            .map_err(|e| name_conflict(e, &input.name))?;
        tx.commit().await.map_err(|e| name_conflict(e, &input.name))?;

        tracing::info!(category_id = id, name = %category.name, "Category updated");
        Ok(category)
    }

    /// Remove category `id` if no task references it.
    pub async fn delete_by_id(&self, id: DbId) -> Result<(), CoreError> {
        let mut tx = self.store.begin().await?;

        if !tx.category_exists_by_id(id).await? {
            return Err(CoreError::CategoryNotFound { id });
        }
        if tx.task_exists_by_category_id(id).await? {
            tracing::debug!(category_id = id, "Rejected delete of referenced category");
            return Err(CoreError::CategoryHasAssociatedTasks { id });
        }

        let deleted = tx
            .delete_category_by_id(id)
            .await
            .map_err(|e| still_referenced(e, id))?;
        if !deleted {
            return Err(CoreError::CategoryNotFound { id });
        }
        tx.commit().await.map_err(|e| still_referenced(e, id))?;

        tracing::info!(category_id = id, "Category deleted");
        Ok(())
    }
}

fn already_exists(name: &str) -> CoreError {
    CoreError::CategoryAlreadyExists {
        name: name.to_string(),
    }
}

/// A concurrent writer can still claim the name between check and write;
/// the storage constraint catches it.
fn name_conflict(err: StoreError, name: &str) -> CoreError {
    if err.is_unique_violation(CATEGORY_NAME_CONSTRAINT) {
        already_exists(name)
    } else {
        err.into()
    }
}

fn still_referenced(err: StoreError, id: DbId) -> CoreError {
    if err.is_foreign_key_violation(TASK_CATEGORY_CONSTRAINT) {
        CoreError::CategoryHasAssociatedTasks { id }
    } else {
        err.into()
    }
}
