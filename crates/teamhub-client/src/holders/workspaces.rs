use tokio::sync::watch;

use teamhub_shared::{EntityKind, Workspace};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::repositories::WorkspaceRepository;

use super::{StateHolder, UiState};

/// The workspace switcher.
pub struct WorkspacesHolder {
    holder: StateHolder<Vec<Workspace>>,
    repo: WorkspaceRepository,
}

impl WorkspacesHolder {
    pub fn new(repo: WorkspaceRepository, cache: &LocalCache) -> Self {
        let reader = repo.clone();
        let holder = StateHolder::spawn(
            cache,
            &[EntityKind::Workspace],
            repo.workspaces(),
            move || reader.cached_workspaces(),
        );
        Self { holder, repo }
    }

    pub fn state(&self) -> UiState<Vec<Workspace>> {
        self.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState<Vec<Workspace>>> {
        self.holder.subscribe()
    }

    /// Pull the list again. A failure replaces the screen with the error.
    pub async fn refresh(&self) {
        let result = self.repo.refresh_workspaces().await;
        self.holder.publish(result);
    }

    pub async fn leave(&self, workspace_id: &str, me: &str) -> Result<()> {
        self.repo.remove_member(workspace_id, me).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::routing::get;
    use axum::{Json, Router};
    use teamhub_shared::fixtures;

    use crate::holders::test_support::wait_for;
    use crate::testing;

    #[tokio::test]
    async fn shows_cached_then_fresh_list() {
        let router = Router::new().route(
            "/workspaces",
            get(|| async { Json(vec![fixtures::workspace("w-1"), fixtures::workspace("w-2")]) }),
        );
        let (api, cache) = testing::api_and_cache(router).await;
        cache.upsert(&fixtures::workspace("w-1")).unwrap();

        let holder = WorkspacesHolder::new(WorkspaceRepository::new(api, cache.clone()), &cache);
        let mut rx = holder.subscribe();
        let ready = wait_for(&mut rx, |s| s.data().map_or(false, |w| w.len() == 2)).await;
        assert_eq!(ready.data().unwrap()[1].id, "w-2");
    }

    #[tokio::test]
    async fn offline_keeps_cached_rows_but_reports_failure() {
        let cache = LocalCache::open_in_memory().unwrap();
        cache.upsert(&fixtures::workspace("w-1")).unwrap();
        let holder = WorkspacesHolder::new(
            WorkspaceRepository::new(testing::offline_api(), cache.clone()),
            &cache,
        );
        let mut rx = holder.subscribe();
        wait_for(&mut rx, |s| s.error().is_some()).await;

        // Nothing was removed from the cache.
        assert_eq!(
            WorkspaceRepository::new(testing::offline_api(), cache)
                .cached_workspaces()
                .unwrap()
                .len(),
            1
        );
    }
}
