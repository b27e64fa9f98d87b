use teamhub_api::ApiClient;
use teamhub_shared::requests::{NewSprint, SprintUpdate};
use teamhub_shared::{Sprint, SprintStatus, Task};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::sync::{local_then_remote, scope};

use super::Emissions;

#[derive(Clone)]
pub struct SprintRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl SprintRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    pub fn cached_sprints(&self, workspace_id: &str) -> Result<Vec<Sprint>> {
        self.cache.read(|db| db.sprints_for_workspace(workspace_id))
    }

    pub fn active_sprint(&self, workspace_id: &str) -> Result<Option<Sprint>> {
        self.cache.read(|db| db.active_sprint(workspace_id))
    }

    pub async fn refresh_sprints(&self, workspace_id: &str) -> Result<Vec<Sprint>> {
        let remote = self.api.list_sprints(workspace_id).await?;
        self.cache.replace_scope("workspace_id", workspace_id, &remote)?;
        self.cache
            .write_untracked(|db| db.mark_synced(&scope::workspace(workspace_id, "sprints")))?;
        self.cached_sprints(workspace_id)
    }

    pub fn sprints(&self, workspace_id: &str) -> Emissions<Vec<Sprint>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.cached_sprints(&id),
            move || async move { remote.refresh_sprints(&remote_id).await },
        )
    }

    pub fn cached_tasks(&self, sprint_id: &str) -> Result<Vec<Task>> {
        self.cache.read(|db| db.tasks_for_sprint(sprint_id))
    }

    pub async fn refresh_tasks(&self, sprint_id: &str) -> Result<Vec<Task>> {
        let remote = self.api.sprint_tasks(sprint_id).await?;
        self.cache.replace_scope("sprint_id", sprint_id, &remote)?;
        self.cached_tasks(sprint_id)
    }

    pub fn tasks(&self, sprint_id: &str) -> Emissions<Vec<Task>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (sprint_id.to_string(), sprint_id.to_string());
        local_then_remote(
            move || local.cached_tasks(&id),
            move || async move { remote.refresh_tasks(&remote_id).await },
        )
    }

    pub async fn create(&self, workspace_id: &str, new: &NewSprint) -> Result<Sprint> {
        let sprint = self.api.create_sprint(workspace_id, new).await?;
        self.cache.upsert(&sprint)?;
        Ok(sprint)
    }

    pub async fn update(&self, sprint_id: &str, update: &SprintUpdate) -> Result<Sprint> {
        let sprint = self.api.update_sprint(sprint_id, update).await?;
        self.cache.upsert(&sprint)?;
        Ok(sprint)
    }

    pub async fn start(&self, sprint_id: &str) -> Result<Sprint> {
        self.set_status(sprint_id, SprintStatus::Active).await
    }

    pub async fn complete(&self, sprint_id: &str) -> Result<Sprint> {
        self.set_status(sprint_id, SprintStatus::Completed).await
    }

    async fn set_status(&self, sprint_id: &str, status: SprintStatus) -> Result<Sprint> {
        let update = SprintUpdate {
            status: Some(status),
            ..Default::default()
        };
        self.update(sprint_id, &update).await
    }

    pub async fn delete(&self, sprint_id: &str) -> Result<()> {
        self.api.delete_sprint(sprint_id).await?;
        self.cache.delete::<Sprint>(sprint_id)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::get;
    use axum::{Json, Router};
    use futures::StreamExt;
    use teamhub_shared::fixtures;

    use crate::sync::Emission;
    use crate::testing;

    #[tokio::test]
    async fn sprint_tasks_replace_only_that_sprint() {
        let router = Router::new().route(
            "/sprints/s-1/tasks",
            get(|| async {
                let mut t = fixtures::task("t-2", "w-1");
                t.sprint_id = Some("s-1".into());
                Json(vec![t])
            }),
        );
        let (api, cache) = testing::api_and_cache(router).await;
        let mut moved_out = fixtures::task("t-1", "w-1");
        moved_out.sprint_id = Some("s-1".into());
        let mut other = fixtures::task("t-9", "w-1");
        other.sprint_id = Some("s-2".into());
        cache.upsert(&moved_out).unwrap();
        cache.upsert(&other).unwrap();

        let repo = SprintRepository::new(api, cache);
        let emissions: Vec<_> = repo.tasks("s-1").collect().await;
        match &emissions[1] {
            Ok(Emission::Fresh(tasks)) => {
                assert_eq!(tasks.len(), 1);
                assert_eq!(tasks[0].id, "t-2");
            }
            other => panic!("unexpected emission: {other:?}"),
        }
        assert_eq!(repo.cached_tasks("s-2").unwrap().len(), 1);
    }
}
