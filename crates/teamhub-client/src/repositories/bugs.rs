use teamhub_api::ApiClient;
use teamhub_shared::requests::{BugUpdate, NewBug};
use teamhub_shared::{Bug, BugStatus};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::sync::{local_then_remote, scope};

use super::Emissions;

#[derive(Clone)]
pub struct BugRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl BugRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    pub fn cached_bugs(&self, workspace_id: &str) -> Result<Vec<Bug>> {
        self.cache.read(|db| db.bugs_for_workspace(workspace_id))
    }

    pub fn cached_open_bugs(&self, workspace_id: &str) -> Result<Vec<Bug>> {
        self.cache.read(|db| db.open_bugs(workspace_id))
    }

    pub async fn refresh_bugs(&self, workspace_id: &str) -> Result<Vec<Bug>> {
        let remote = self.api.list_bugs(workspace_id).await?;
        self.cache.replace_scope("workspace_id", workspace_id, &remote)?;
        self.cache
            .write_untracked(|db| db.mark_synced(&scope::workspace(workspace_id, "bugs")))?;
        self.cached_bugs(workspace_id)
    }

    pub fn bugs(&self, workspace_id: &str) -> Emissions<Vec<Bug>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.cached_bugs(&id),
            move || async move { remote.refresh_bugs(&remote_id).await },
        )
    }

    pub fn cached_task_bugs(&self, task_id: &str) -> Result<Vec<Bug>> {
        self.cache.read(|db| db.bugs_for_task(task_id))
    }

    pub async fn refresh_task_bugs(&self, task_id: &str) -> Result<Vec<Bug>> {
        let remote = self.api.task_bugs(task_id).await?;
        self.cache.replace_scope("task_id", task_id, &remote)?;
        self.cached_task_bugs(task_id)
    }

    pub fn task_bugs(&self, task_id: &str) -> Emissions<Vec<Bug>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (task_id.to_string(), task_id.to_string());
        local_then_remote(
            move || local.cached_task_bugs(&id),
            move || async move { remote.refresh_task_bugs(&remote_id).await },
        )
    }

    pub async fn report(&self, workspace_id: &str, new: &NewBug) -> Result<Bug> {
        let bug = self.api.report_bug(workspace_id, new).await?;
        self.cache.upsert(&bug)?;
        Ok(bug)
    }

    pub async fn update(&self, bug_id: &str, update: &BugUpdate) -> Result<Bug> {
        let bug = self.api.update_bug(bug_id, update).await?;
        self.cache.upsert(&bug)?;
        Ok(bug)
    }

    pub async fn resolve(&self, bug_id: &str) -> Result<Bug> {
        let update = BugUpdate {
            status: Some(BugStatus::Resolved),
            ..Default::default()
        };
        self.update(bug_id, &update).await
    }

    pub async fn delete(&self, bug_id: &str) -> Result<()> {
        self.api.delete_bug(bug_id).await?;
        self.cache.delete::<Bug>(bug_id)?;
        Ok(())
    }
}
