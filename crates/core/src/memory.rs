//! In-memory gateway.
//!
//! Transactions are fully serialized: [`MemoryStore::begin`] holds the state
//! lock until the gateway is committed or dropped, and works on a private
//! copy that replaces the shared state only on commit. Enforces the same
//! uniqueness and foreign-key constraints as the PostgreSQL schema.
//!
//! A caller must not hold two gateways from the same store at once.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedMutexGuard};

use crate::category::{Category, NewCategory};
use crate::store::{
    Gateway, Store, StoreError, StoreResult, CATEGORY_NAME_CONSTRAINT, TASK_CATEGORY_CONSTRAINT,
};
use crate::task::{Task, TaskRecord};
use crate::types::DbId;

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Arc<Mutex<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[derive(Debug, Clone, Default)]
struct MemoryState {
    categories: BTreeMap<DbId, Category>,
    tasks: BTreeMap<DbId, TaskRecord>,
    last_category_id: DbId,
    last_task_id: DbId,
}

impl MemoryState {
    fn name_taken(&self, name: &str, except: Option<DbId>) -> bool {
        self.categories
            .values()
            .any(|c| c.name == name && Some(c.id) != except)
    }

    fn category_by_name(&self, name: &str) -> Option<&Category> {
        self.categories.values().find(|c| c.name == name)
    }

    fn resolve_task(&self, id: DbId, record: &TaskRecord) -> StoreResult<Task> {
        let category = self
            .categories
            .get(&record.category_id)
            .cloned()
            .ok_or_else(|| {
                StoreError::backend(format!(
                    "task {id} references missing category {}",
                    record.category_id
                ))
            })?;
        Ok(Task {
            id,
            name: record.name.clone(),
            description: record.description.clone(),
            deadline: record.deadline,
            category,
        })
    }

    fn unique_name_violation() -> StoreError {
        StoreError::UniqueViolation {
            constraint: CATEGORY_NAME_CONSTRAINT.to_string(),
        }
    }

    fn category_reference_violation() -> StoreError {
        StoreError::ForeignKeyViolation {
            constraint: TASK_CATEGORY_CONSTRAINT.to_string(),
        }
    }
}

struct MemoryGateway {
    shared: OwnedMutexGuard<MemoryState>,
    working: MemoryState,
}

#[async_trait]
impl Store for MemoryStore {
    async fn begin(&self) -> StoreResult<Box<dyn Gateway>> {
        let shared = Arc::clone(&self.state).lock_owned().await;
        let working = shared.clone();
        Ok(Box::new(MemoryGateway { shared, working }))
    }

    async fn health_check(&self) -> StoreResult<()> {
        Ok(())
    }
}

#[async_trait]
impl Gateway for MemoryGateway {
    async fn category_exists_by_name(&mut self, name: &str) -> StoreResult<bool> {
        Ok(self.working.name_taken(name, None))
    }

    async fn category_exists_by_name_excluding_id(
        &mut self,
        name: &str,
        id: DbId,
    ) -> StoreResult<bool> {
        Ok(self.working.name_taken(name, Some(id)))
    }

    async fn category_exists_by_id(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.working.categories.contains_key(&id))
    }

    async fn save_category(
        &mut self,
        id: Option<DbId>,
        category: &NewCategory,
    ) -> StoreResult<Category> {
        if self.working.name_taken(&category.name, id) {
            return Err(MemoryState::unique_name_violation());
        }
        let id = match id {
            Some(id) if self.working.categories.contains_key(&id) => id,
            Some(id) => return Err(StoreError::backend(format!("no category row {id}"))),
            None => {
                self.working.last_category_id += 1;
                self.working.last_category_id
            }
        };
        let stored = Category {
            id,
            name: category.name.clone(),
            description: category.description.clone(),
        };
        self.working.categories.insert(id, stored.clone());
        Ok(stored)
    }

    async fn find_or_create_category(&mut self, category: &NewCategory) -> StoreResult<Category> {
        if let Some(existing) = self.working.category_by_name(&category.name) {
            return Ok(existing.clone());
        }
        self.save_category(None, category).await
    }

    async fn delete_category_by_id(&mut self, id: DbId) -> StoreResult<bool> {
        if self.working.tasks.values().any(|t| t.category_id == id) {
            return Err(MemoryState::category_reference_violation());
        }
        Ok(self.working.categories.remove(&id).is_some())
    }

    async fn find_category_by_id(&mut self, id: DbId) -> StoreResult<Option<Category>> {
        Ok(self.working.categories.get(&id).cloned())
    }

    async fn find_category_by_name(&mut self, name: &str) -> StoreResult<Option<Category>> {
        Ok(self.working.category_by_name(name).cloned())
    }

    async fn list_categories(&mut self) -> StoreResult<Vec<Category>> {
        Ok(self.working.categories.values().cloned().collect())
    }

    async fn task_exists_by_id(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.working.tasks.contains_key(&id))
    }

    async fn task_exists_by_category_id(&mut self, category_id: DbId) -> StoreResult<bool> {
        Ok(self
            .working
            .tasks
            .values()
            .any(|t| t.category_id == category_id))
    }

    async fn save_task(&mut self, id: Option<DbId>, task: &TaskRecord) -> StoreResult<Task> {
        if !self.working.categories.contains_key(&task.category_id) {
            return Err(MemoryState::category_reference_violation());
        }
        let id = match id {
            Some(id) if self.working.tasks.contains_key(&id) => id,
            Some(id) => return Err(StoreError::backend(format!("no task row {id}"))),
            None => {
                self.working.last_task_id += 1;
                self.working.last_task_id
            }
        };
        self.working.tasks.insert(id, task.clone());
        self.working.resolve_task(id, task)
    }

    async fn delete_task_by_id(&mut self, id: DbId) -> StoreResult<bool> {
        Ok(self.working.tasks.remove(&id).is_some())
    }

    async fn find_task_by_id(&mut self, id: DbId) -> StoreResult<Option<Task>> {
        self.working
            .tasks
            .get(&id)
            .map(|record| self.working.resolve_task(id, record))
            .transpose()
    }

    async fn list_tasks(&mut self) -> StoreResult<Vec<Task>> {
        self.working
            .tasks
            .iter()
            .map(|(id, record)| self.working.resolve_task(*id, record))
            .collect()
    }

    async fn commit(self: Box<Self>) -> StoreResult<()> {
        let MemoryGateway {
            mut shared,
            working,
        } = *self;
        *shared = working;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use assert_matches::assert_matches;
    use chrono::{TimeZone, Utc};

    use super::*;

    fn record(category_id: DbId) -> TaskRecord {
        TaskRecord {
            name: "t".into(),
            description: None,
            deadline: Utc.with_ymd_and_hms(2030, 1, 1, 0, 0, 0).unwrap(),
            category_id,
        }
    }

    #[tokio::test]
    async fn uncommitted_writes_are_discarded() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        tx.save_category(None, &NewCategory::new("a", "d"))
            .await
            .unwrap();
        drop(tx);

        let mut tx = store.begin().await.unwrap();
        assert!(tx.list_categories().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn committed_writes_are_visible() {
        let store = MemoryStore::new();

        let mut tx = store.begin().await.unwrap();
        let saved = tx
            .save_category(None, &NewCategory::new("a", "d"))
            .await
            .unwrap();
        tx.commit().await.unwrap();

        let mut tx = store.begin().await.unwrap();
        assert_eq!(tx.find_category_by_id(saved.id).await.unwrap(), Some(saved));
    }

    #[tokio::test]
    async fn ids_are_assigned_sequentially() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let a = tx.save_category(None, &NewCategory::new("a", "d")).await.unwrap();
        let b = tx.save_category(None, &NewCategory::new("b", "d")).await.unwrap();
        assert_eq!((a.id, b.id), (1, 2));
    }

    #[tokio::test]
    async fn duplicate_name_violates_unique_constraint() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        tx.save_category(None, &NewCategory::new("a", "d")).await.unwrap();

        let err = tx
            .save_category(None, &NewCategory::new("a", "other"))
            .await
            .unwrap_err();
        assert!(err.is_unique_violation(CATEGORY_NAME_CONSTRAINT));
    }

    #[tokio::test]
    async fn find_or_create_reuses_existing_row() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let first = tx
            .find_or_create_category(&NewCategory::new("a", "first"))
            .await
            .unwrap();
        let second = tx
            .find_or_create_category(&NewCategory::new("a", "second"))
            .await
            .unwrap();
        assert_eq!(first, second);
        assert_eq!(second.description, "first");
        assert_eq!(tx.list_categories().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn referenced_category_cannot_be_deleted() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        let category = tx.save_category(None, &NewCategory::new("a", "d")).await.unwrap();
        tx.save_task(None, &record(category.id)).await.unwrap();

        let err = tx.delete_category_by_id(category.id).await.unwrap_err();
        assert!(err.is_foreign_key_violation(TASK_CATEGORY_CONSTRAINT));
    }

    #[tokio::test]
    async fn task_requires_existing_category() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        assert_matches!(
            tx.save_task(None, &record(42)).await,
            Err(StoreError::ForeignKeyViolation { .. })
        );
    }

    #[tokio::test]
    async fn replacing_missing_row_fails() {
        let store = MemoryStore::new();
        let mut tx = store.begin().await.unwrap();
        assert_matches!(
            tx.save_category(Some(9), &NewCategory::new("a", "d")).await,
            Err(StoreError::Backend(_))
        );
    }
}
