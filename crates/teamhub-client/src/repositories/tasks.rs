use teamhub_api::ApiClient;
use teamhub_shared::requests::{NewTask, TaskUpdate};
use teamhub_shared::{Task, WorkStatus};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::sync::{local_then_remote, scope};

use super::Emissions;

#[derive(Clone)]
pub struct TaskRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl TaskRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    pub fn cached_tasks(&self, workspace_id: &str) -> Result<Vec<Task>> {
        self.cache.read(|db| db.tasks_for_workspace(workspace_id))
    }

    pub async fn refresh_tasks(&self, workspace_id: &str) -> Result<Vec<Task>> {
        let remote = self.api.list_tasks(workspace_id).await?;
        self.cache.replace_scope("workspace_id", workspace_id, &remote)?;
        self.cache
            .write_untracked(|db| db.mark_synced(&scope::workspace(workspace_id, "tasks")))?;
        self.cached_tasks(workspace_id)
    }

    pub fn tasks(&self, workspace_id: &str) -> Emissions<Vec<Task>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.cached_tasks(&id),
            move || async move { remote.refresh_tasks(&remote_id).await },
        )
    }

    pub async fn refresh_task(&self, task_id: &str) -> Result<Task> {
        let task = self.api.get_task(task_id).await?;
        self.cache.upsert(&task)?;
        Ok(task)
    }

    pub fn task(&self, task_id: &str) -> Emissions<Option<Task>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (task_id.to_string(), task_id.to_string());
        local_then_remote(
            move || local.cache.read(|db| db.find::<Task>(&id)),
            move || async move { remote.refresh_task(&remote_id).await.map(Some) },
        )
    }

    /// Open tasks assigned to a user across all cached workspaces.
    pub fn my_open_tasks(&self, user_id: &str) -> Result<Vec<Task>> {
        self.cache.read(|db| db.open_tasks_for_assignee(user_id))
    }

    pub async fn create(&self, workspace_id: &str, new: &NewTask) -> Result<Task> {
        let task = self.api.create_task(workspace_id, new).await?;
        self.cache.upsert(&task)?;
        Ok(task)
    }

    pub async fn update(&self, task_id: &str, update: &TaskUpdate) -> Result<Task> {
        let task = self.api.update_task(task_id, update).await?;
        self.cache.upsert(&task)?;
        Ok(task)
    }

    pub async fn set_status(&self, task_id: &str, status: WorkStatus) -> Result<Task> {
        let update = TaskUpdate {
            status: Some(status),
            ..Default::default()
        };
        self.update(task_id, &update).await
    }

    pub async fn assign(&self, task_id: &str, assignee_id: &str) -> Result<Task> {
        let update = TaskUpdate {
            assignee_id: Some(assignee_id.to_string()),
            ..Default::default()
        };
        self.update(task_id, &update).await
    }

    pub async fn delete(&self, task_id: &str) -> Result<()> {
        self.api.delete_task(task_id).await?;
        self.cache.delete::<Task>(task_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Path;
    use axum::routing::put;
    use axum::{Json, Router};
    use teamhub_shared::fixtures;

    use crate::testing;

    #[tokio::test]
    async fn set_status_writes_server_copy() {
        let router = Router::new().route(
            "/tasks/:id",
            put(|Path(id): Path<String>, Json(update): Json<TaskUpdate>| async move {
                let mut task = fixtures::task(&id, "w-1");
                task.status = update.status.unwrap();
                task.updated_at = fixtures::at(30);
                Json(task)
            }),
        );
        let (api, cache) = testing::api_and_cache(router).await;
        cache.upsert(&fixtures::task("t-1", "w-1")).unwrap();

        let repo = TaskRepository::new(api, cache);
        repo.set_status("t-1", WorkStatus::Done).await.unwrap();

        let cached = repo.cached_tasks("w-1").unwrap();
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].status, WorkStatus::Done);
        assert_eq!(cached[0].updated_at, fixtures::at(30));
    }

    #[tokio::test]
    async fn failed_update_leaves_cache_untouched() {
        let cache = LocalCache::open_in_memory().unwrap();
        cache.upsert(&fixtures::task("t-1", "w-1")).unwrap();
        let repo = TaskRepository::new(testing::offline_api(), cache);

        assert!(repo.set_status("t-1", WorkStatus::Done).await.is_err());
        assert_eq!(repo.cached_tasks("w-1").unwrap()[0].status, WorkStatus::Todo);
    }
}
