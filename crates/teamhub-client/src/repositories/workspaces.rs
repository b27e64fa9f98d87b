use teamhub_api::ApiClient;
use teamhub_shared::requests::{NewWorkspace, WorkspaceUpdate};
use teamhub_shared::Workspace;

use crate::cache::LocalCache;
use crate::error::Result;
use crate::sync::{local_then_remote, scope};

use super::Emissions;

#[derive(Clone)]
pub struct WorkspaceRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl WorkspaceRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    pub fn cached_workspaces(&self) -> Result<Vec<Workspace>> {
        self.cache.read(|db| db.list_all::<Workspace>())
    }

    /// Pull the workspace list and make the cache match it.
    pub async fn refresh_workspaces(&self) -> Result<Vec<Workspace>> {
        let remote = self.api.list_workspaces().await?;
        self.cache.replace_all(&remote)?;
        self.cache.write_untracked(|db| db.mark_synced(scope::WORKSPACES))?;
        self.cached_workspaces()
    }

    pub fn workspaces(&self) -> Emissions<Vec<Workspace>> {
        let local = self.clone();
        let remote = self.clone();
        local_then_remote(
            move || local.cached_workspaces(),
            move || async move { remote.refresh_workspaces().await },
        )
    }

    pub async fn refresh_workspace(&self, workspace_id: &str) -> Result<Workspace> {
        let workspace = self.api.get_workspace(workspace_id).await?;
        self.cache.upsert(&workspace)?;
        Ok(workspace)
    }

    pub fn workspace(&self, workspace_id: &str) -> Emissions<Option<Workspace>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.cache.read(|db| db.find::<Workspace>(&id)),
            move || async move { remote.refresh_workspace(&remote_id).await.map(Some) },
        )
    }

    pub async fn create(&self, new: &NewWorkspace) -> Result<Workspace> {
        let workspace = self.api.create_workspace(new).await?;
        self.cache.upsert(&workspace)?;
        Ok(workspace)
    }

    pub async fn update(&self, workspace_id: &str, update: &WorkspaceUpdate) -> Result<Workspace> {
        let workspace = self.api.update_workspace(workspace_id, update).await?;
        self.cache.upsert(&workspace)?;
        Ok(workspace)
    }

    pub async fn delete(&self, workspace_id: &str) -> Result<()> {
        self.api.delete_workspace(workspace_id).await?;
        self.cache.delete::<Workspace>(workspace_id)?;
        Ok(())
    }

    /// Remove a member; the cached workspace is re-fetched so its member
    /// list stays accurate.
    pub async fn remove_member(&self, workspace_id: &str, user_id: &str) -> Result<Workspace> {
        self.api.remove_member(workspace_id, user_id).await?;
        self.refresh_workspace(workspace_id).await
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
    async fn workspaces_stream_cached_then_fresh() {
        let router = Router::new().route(
            "/workspaces",
            get(|| async { Json(vec![fixtures::workspace("w-2")]) }),
        );
        let (api, cache) = testing::api_and_cache(router).await;
        cache.upsert(&fixtures::workspace("w-1")).unwrap();

        let repo = WorkspaceRepository::new(api, cache);
        let emissions: Vec<_> = repo.workspaces().collect().await;

        match &emissions[0] {
            Ok(Emission::Cached(list)) => assert_eq!(list[0].id, "w-1"),
            other => panic!("unexpected emission: {other:?}"),
        }
        match &emissions[1] {
            Ok(Emission::Fresh(list)) => {
                assert_eq!(list.len(), 1);
                assert_eq!(list[0].id, "w-2");
            }
            other => panic!("unexpected emission: {other:?}"),
        }
    }

    #[tokio::test]
    async fn offline_keeps_cache_and_reports_error() {
        let cache = LocalCache::open_in_memory().unwrap();
        cache.upsert(&fixtures::workspace("w-1")).unwrap();
        let repo = WorkspaceRepository::new(testing::offline_api(), cache);

        let emissions: Vec<_> = repo.workspaces().collect().await;
        assert!(matches!(emissions[0], Ok(Emission::Cached(ref l)) if l.len() == 1));
        assert!(emissions[1].is_err());
        assert_eq!(repo.cached_workspaces().unwrap().len(), 1);
    }
}
