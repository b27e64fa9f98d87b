use teamhub_api::ApiClient;
use teamhub_shared::requests::{EpicUpdate, NewEpic};
use teamhub_shared::{Epic, Task};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::sync::{local_then_remote, scope};

use super::Emissions;

#[derive(Clone)]
pub struct EpicRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl EpicRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    pub fn cached_epics(&self, workspace_id: &str) -> Result<Vec<Epic>> {
        self.cache.read(|db| db.epics_for_workspace(workspace_id))
    }

    pub async fn refresh_epics(&self, workspace_id: &str) -> Result<Vec<Epic>> {
        let remote = self.api.list_epics(workspace_id).await?;
        self.cache.replace_scope("workspace_id", workspace_id, &remote)?;
        self.cache
            .write_untracked(|db| db.mark_synced(&scope::workspace(workspace_id, "epics")))?;
        self.cached_epics(workspace_id)
    }

    pub fn epics(&self, workspace_id: &str) -> Emissions<Vec<Epic>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.cached_epics(&id),
            move || async move { remote.refresh_epics(&remote_id).await },
        )
    }

    pub fn cached_tasks(&self, epic_id: &str) -> Result<Vec<Task>> {
        self.cache.read(|db| db.tasks_for_epic(epic_id))
    }

    pub async fn refresh_tasks(&self, epic_id: &str) -> Result<Vec<Task>> {
        let remote = self.api.epic_tasks(epic_id).await?;
        self.cache.replace_scope("epic_id", epic_id, &remote)?;
        self.cached_tasks(epic_id)
    }

    pub fn tasks(&self, epic_id: &str) -> Emissions<Vec<Task>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (epic_id.to_string(), epic_id.to_string());
        local_then_remote(
            move || local.cached_tasks(&id),
            move || async move { remote.refresh_tasks(&remote_id).await },
        )
    }

    /// Percentage of the epic's cached tasks that are done.
    pub fn progress(&self, epic_id: &str) -> Result<Option<u8>> {
        self.cache.read(|db| db.epic_progress(epic_id))
    }

    pub async fn create(&self, workspace_id: &str, new: &NewEpic) -> Result<Epic> {
        let epic = self.api.create_epic(workspace_id, new).await?;
        self.cache.upsert(&epic)?;
        Ok(epic)
    }

    pub async fn update(&self, epic_id: &str, update: &EpicUpdate) -> Result<Epic> {
        let epic = self.api.update_epic(epic_id, update).await?;
        self.cache.upsert(&epic)?;
        Ok(epic)
    }

    pub async fn delete(&self, epic_id: &str) -> Result<()> {
        self.api.delete_epic(epic_id).await?;
        self.cache.delete::<Epic>(epic_id)?;
        Ok(())
    }
}
