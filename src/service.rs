//! Task CRUD on top of [`TaskStore`].
//!
//! Reads go straight to the store. Every mutation runs inside
//! [`TaskStore::modify`], so the read, the in-memory change and the write
//! happen while no other writer can touch the file.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::error::ServiceError;
use crate::logic::{self, TaskFilter};
use crate::models::{Task, TaskInput};
use crate::store::TaskStore;

#[derive(Clone)]
pub struct TaskService {
    store: Arc<TaskStore>,
}

impl TaskService {
    pub fn new(store: Arc<TaskStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &TaskStore {
        &self.store
    }

    pub async fn list(&self, filter: &TaskFilter) -> Result<Vec<Task>, ServiceError> {
        let tasks = self.store.read_all().await?;
        Ok(logic::filter_and_sort(tasks, filter))
    }

    pub async fn get(&self, id: &str) -> Result<Task, ServiceError> {
        self.store
            .read_all()
            .await?
            .into_iter()
            .find(|t| t.id == id)
            .ok_or(ServiceError::NotFound)
    }

    /// Validate and append a new task.
    ///
    /// `description` defaults to empty and `status` to pending.
    pub async fn create(&self, input: TaskInput) -> Result<Task, ServiceError> {
        let valid = logic::validate(&input).map_err(ServiceError::Validation)?;

        let now = Utc::now();
        let task = Task {
            id: Uuid::new_v4().to_string(),
            title: valid.title,
            description: valid.description.unwrap_or_default(),
            status: valid.status.unwrap_or_default(),
            created_at: now,
            updated_at: now,
        };

        let created = self
            .store
            .modify(|tasks| {
                tasks.push(task.clone());
                Ok::<_, ServiceError>(task)
            })
            .await?;

        tracing::info!(id = %created.id, "task created");
        Ok(created)
    }

    /// Replace a task's fields and refresh `updatedAt`.
    ///
    /// `title` is required. An omitted `description` or `status` keeps the
    /// stored value.
    pub async fn update(&self, id: &str, input: TaskInput) -> Result<Task, ServiceError> {
        let updated = self
            .store
            .modify(|tasks| {
                let task = tasks
                    .iter_mut()
                    .find(|t| t.id == id)
                    .ok_or(ServiceError::NotFound)?;
                let valid = logic::validate(&input).map_err(ServiceError::Validation)?;

                task.title = valid.title;
                if let Some(description) = valid.description {
                    task.description = description;
                }
                if let Some(status) = valid.status {
                    task.status = status;
                }
                task.updated_at = Utc::now();
                Ok::<_, ServiceError>(task.clone())
            })
            .await?;

        tracing::info!(id = %updated.id, status = %updated.status, "task updated");
        Ok(updated)
    }

    pub async fn delete(&self, id: &str) -> Result<(), ServiceError> {
        self.store
            .modify(|tasks| {
                let before = tasks.len();
                tasks.retain(|t| t.id != id);
                if tasks.len() == before {
                    return Err(ServiceError::NotFound);
                }
                Ok(())
            })
            .await?;

        tracing::info!(id, "task deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TaskStatus;
    use std::collections::HashSet;

    async fn seeded() -> (tempfile::TempDir, TaskService) {
        let dir = tempfile::tempdir().unwrap();
        let store = TaskStore::new(dir.path().join("tasks.json"));
        store.initialize().await;
        (dir, TaskService::new(Arc::new(store)))
    }

    fn input(title: &str) -> TaskInput {
        TaskInput {
            title: Some(title.into()),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_applies_defaults_and_persists() {
        let (_dir, service) = seeded().await;

        let task = service.create(input("Buy milk")).await.unwrap();

        assert_eq!(task.description, "");
        assert_eq!(task.status, TaskStatus::Pending);
        assert_eq!(task.created_at, task.updated_at);
        assert_eq!(service.get(&task.id).await.unwrap(), task);
        assert_eq!(service.store().read_all().await.unwrap().len(), 4);
    }

    #[tokio::test]
    async fn create_assigns_unique_ids() {
        let (_dir, service) = seeded().await;

        let mut ids = HashSet::new();
        for i in 0..10 {
            let task = service.create(input(&format!("Task {i}"))).await.unwrap();
            assert!(ids.insert(task.id));
        }
        let stored: HashSet<String> = service
            .store()
            .read_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(stored.len(), 13);
    }

    #[tokio::test]
    async fn short_title_is_rejected_without_write() {
        let (_dir, service) = seeded().await;
        let before = service.store().read_all().await.unwrap();

        let err = service.create(input("a")).await.unwrap_err();

        assert!(matches!(err, ServiceError::Validation(_)));
        assert_eq!(service.store().read_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn get_unknown_id_is_not_found() {
        let (_dir, service) = seeded().await;
        assert!(matches!(
            service.get("nope").await,
            Err(ServiceError::NotFound)
        ));
    }

    #[tokio::test]
    async fn update_keeps_created_at_and_refreshes_updated_at() {
        let (_dir, service) = seeded().await;
        let original = service.get("seed-1").await.unwrap();

        let updated = service
            .update(
                "seed-1",
                TaskInput {
                    title: Some("Renamed".into()),
                    description: Some("New text".to_string()),
                    status: Some("done".into()),
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.id, "seed-1");
        assert_eq!(updated.title, "Renamed");
        assert_eq!(updated.description, "New text");
        assert_eq!(updated.status, TaskStatus::Done);
        assert_eq!(updated.created_at, original.created_at);
        assert!(updated.updated_at >= original.updated_at);
        assert_eq!(service.get("seed-1").await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_without_optional_fields_keeps_them() {
        let (_dir, service) = seeded().await;

        let updated = service.update("seed-2", input("Renamed")).await.unwrap();

        assert_eq!(updated.description, "Your data is saved in a local JSON file.");
        assert_eq!(updated.status, TaskStatus::Done);
    }

    #[tokio::test]
    async fn update_checks_existence_before_validation() {
        let (_dir, service) = seeded().await;

        assert!(matches!(
            service.update("missing", input("a")).await,
            Err(ServiceError::NotFound)
        ));
        assert!(matches!(
            service.update("seed-1", input("a")).await,
            Err(ServiceError::Validation(_))
        ));
        assert_eq!(service.get("seed-1").await.unwrap().title, "Welcome to TaskFlow");
    }

    #[tokio::test]
    async fn delete_removes_task() {
        let (_dir, service) = seeded().await;

        service.delete("seed-3").await.unwrap();

        let ids: Vec<String> = service
            .store()
            .read_all()
            .await
            .unwrap()
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, ["seed-1", "seed-2"]);
    }

    #[tokio::test]
    async fn delete_unknown_id_leaves_snapshot_unchanged() {
        let (_dir, service) = seeded().await;
        let before = service.store().read_all().await.unwrap();

        assert!(matches!(
            service.delete("ghost").await,
            Err(ServiceError::NotFound)
        ));
        assert_eq!(service.store().read_all().await.unwrap(), before);
    }

    #[tokio::test]
    async fn list_filters_seed_data() {
        let (_dir, service) = seeded().await;

        let welcome = service
            .list(&TaskFilter {
                q: Some("welcome".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(welcome.len(), 1);
        assert_eq!(welcome[0].id, "seed-1");

        let done = service
            .list(&TaskFilter {
                status: Some("done".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(done.len(), 1);
        assert_eq!(done[0].id, "seed-2");
    }

    #[tokio::test]
    async fn list_puts_newest_first() {
        let (_dir, service) = seeded().await;
        let newest = service.create(input("Fresh")).await.unwrap();

        let all = service.list(&TaskFilter::default()).await.unwrap();

        assert_eq!(all.len(), 4);
        assert_eq!(all[0].id, newest.id);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_creates_are_all_kept() {
        let (_dir, service) = seeded().await;

        let handles: Vec<_> = (0..20)
            .map(|i| {
                let service = service.clone();
                tokio::spawn(async move { service.create(input(&format!("Job {i}"))).await })
            })
            .collect();
        let mut created = Vec::new();
        for handle in handles {
            created.push(handle.await.unwrap().unwrap().id);
        }

        let stored = service.store().read_all().await.unwrap();
        assert_eq!(stored.len(), 23);
        for id in created {
            assert!(stored.iter().any(|t| t.id == id));
        }
    }
}
