use teamhub_api::ApiClient;
use teamhub_shared::User;

use crate::cache::LocalCache;
use crate::error::Result;
use crate::sync::{local_then_remote, scope};

use super::Emissions;

#[derive(Clone)]
pub struct UserRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl UserRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    pub fn cached_members(&self, workspace_id: &str) -> Result<Vec<User>> {
        self.cache.read(|db| db.workspace_members(workspace_id))
    }

    pub async fn refresh_members(&self, workspace_id: &str) -> Result<Vec<User>> {
        let remote = self.api.workspace_members(workspace_id).await?;
        self.cache.upsert_all(&remote)?;
        self.cache
            .write_untracked(|db| db.mark_synced(&scope::workspace(workspace_id, "members")))?;
        self.cached_members(workspace_id)
    }

    /// Members of a workspace, resolved from its member id list.
    pub fn members(&self, workspace_id: &str) -> Emissions<Vec<User>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.cached_members(&id),
            move || async move { remote.refresh_members(&remote_id).await },
        )
    }

    pub fn cached_user(&self, user_id: &str) -> Result<Option<User>> {
        self.cache.read(|db| db.find::<User>(user_id))
    }

    pub async fn get_user(&self, user_id: &str) -> Result<User> {
        let user = self.api.get_user(user_id).await?;
        self.cache.upsert(&user)?;
        Ok(user)
    }

    /// Name or email match against cached users only.
    pub fn search_cached(&self, query: &str) -> Result<Vec<User>> {
        self.cache.read(|db| db.search_users(query))
    }

    /// Server-side search. Hits are cached so later offline searches find them.
    pub async fn search(&self, query: &str) -> Result<Vec<User>> {
        let hits = self.api.search_users(query).await?;
        self.cache.upsert_all(&hits)?;
        Ok(hits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::Query;
    use axum::routing::get;
    use axum::{Json, Router};
    use futures::StreamExt;
    use serde::Deserialize;
    use teamhub_shared::fixtures;

    use crate::testing;

    #[derive(Deserialize)]
    struct Search {
        search: String,
    }

    #[tokio::test]
    async fn remote_search_feeds_local_search() {
        let router = Router::new().route(
            "/users",
            get(|Query(q): Query<Search>| async move {
                assert_eq!(q.search, "bo");
                Json(vec![fixtures::user("u-2", "bo@example.com")])
            }),
        );
        let (api, cache) = testing::api_and_cache(router).await;
        let repo = UserRepository::new(api, cache);

        assert!(repo.search_cached("bo@").unwrap().is_empty());
        assert_eq!(repo.search("bo").await.unwrap().len(), 1);
        assert_eq!(repo.search_cached("bo@").unwrap()[0].id, "u-2");
    }

    #[tokio::test]
    async fn members_emit_cached_then_fresh() {
        let router = Router::new().route(
            "/workspaces/w-1/members",
            get(|| async {
                Json(vec![
                    fixtures::user("u-1", "ann@example.com"),
                    fixtures::user("u-2", "bo@example.com"),
                ])
            }),
        );
        let (api, cache) = testing::api_and_cache(router).await;
        cache.upsert(&fixtures::workspace("w-1")).unwrap();
        cache.upsert(&fixtures::user("u-1", "ann@example.com")).unwrap();
        let repo = UserRepository::new(api, cache);

        let emitted: Vec<_> = repo.members("w-1").collect().await;
        assert_eq!(emitted.len(), 2);
        let cached = emitted[0].as_ref().unwrap();
        assert!(!cached.is_fresh());
        let fresh = emitted[1].as_ref().unwrap();
        assert!(fresh.is_fresh());
        assert_eq!(fresh.clone().into_inner().len(), 2);
    }
}
