use tracing::debug;

use teamhub_api::ApiClient;
use teamhub_shared::requests::{ChannelUpdate, NewChannel};
use teamhub_shared::{Channel, EntityKind};
use teamhub_store::ScopeReplace;

use crate::cache::{CacheChange, LocalCache};
use crate::error::Result;
use crate::sync::{local_then_remote, scope};

use super::Emissions;

#[derive(Clone)]
pub struct ChannelRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl ChannelRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    /// Public and private channels of a workspace, without DMs.
    pub fn cached_channels(&self, workspace_id: &str) -> Result<Vec<Channel>> {
        self.cache.read(|db| db.channels_for_workspace(workspace_id))
    }

    pub fn cached_direct_channels(&self, workspace_id: &str) -> Result<Vec<Channel>> {
        self.cache.read(|db| db.direct_channels(workspace_id))
    }

    /// Pull every channel of the workspace (DMs included) and replace the
    /// cached set.
    pub async fn refresh_channels(&self, workspace_id: &str) -> Result<()> {
        let remote = self.api.list_channels(workspace_id).await?;
        replace_channels(&self.cache, workspace_id, &remote)?;
        self.cache
            .write_untracked(|db| db.mark_synced(&scope::workspace(workspace_id, "channels")))?;
        Ok(())
    }

    pub fn channels(&self, workspace_id: &str) -> Emissions<Vec<Channel>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.cached_channels(&id),
            move || async move {
                remote.refresh_channels(&remote_id).await?;
                remote.cached_channels(&remote_id)
            },
        )
    }

    pub fn direct_channels(&self, workspace_id: &str) -> Emissions<Vec<Channel>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.cached_direct_channels(&id),
            move || async move {
                remote.refresh_channels(&remote_id).await?;
                remote.cached_direct_channels(&remote_id)
            },
        )
    }

    pub async fn create(&self, workspace_id: &str, new: &NewChannel) -> Result<Channel> {
        let channel = self.api.create_channel(workspace_id, new).await?;
        self.cache.upsert(&channel)?;
        Ok(channel)
    }

    pub async fn update(&self, channel_id: &str, update: &ChannelUpdate) -> Result<Channel> {
        let channel = self.api.update_channel(channel_id, update).await?;
        self.cache.upsert(&channel)?;
        Ok(channel)
    }

    /// Delete remotely, then drop the channel and its cached history.
    pub async fn delete(&self, channel_id: &str) -> Result<()> {
        self.api.delete_channel(channel_id).await?;
        forget_channel(&self.cache, channel_id)
    }

    /// The DM with `other_user_id`, from the cache when it is already known.
    pub async fn open_direct(
        &self,
        workspace_id: &str,
        me: &str,
        other_user_id: &str,
    ) -> Result<Channel> {
        if let Some(existing) = self
            .cache
            .read(|db| db.find_direct_channel(workspace_id, me, other_user_id))?
        {
            debug!(channel = %existing.id, "Reusing cached direct channel");
            return Ok(existing);
        }
        let channel = self.api.open_direct_channel(workspace_id, other_user_id).await?;
        self.cache.upsert(&channel)?;
        Ok(channel)
    }
}

/// Replace the cached channels of a workspace, DMs included. Channels the
/// remote no longer lists are forgotten along with their history.
pub(crate) fn replace_channels(
    cache: &LocalCache,
    workspace_id: &str,
    remote: &[Channel],
) -> Result<ScopeReplace> {
    let cached = cache.read(|db| {
        let mut ids: Vec<String> = db
            .channels_for_workspace(workspace_id)?
            .into_iter()
            .map(|c| c.id)
            .collect();
        ids.extend(db.direct_channels(workspace_id)?.into_iter().map(|c| c.id));
        Ok(ids)
    })?;

    let outcome = cache.replace_scope("workspace_id", workspace_id, remote)?;
    for gone in cached.iter().filter(|id| !remote.iter().any(|c| &c.id == *id)) {
        debug!(channel = %gone, "Channel no longer listed");
        forget_channel(cache, gone)?;
    }
    Ok(outcome)
}

/// Remove a channel and its messages from the cache.
pub(crate) fn forget_channel(cache: &LocalCache, channel_id: &str) -> Result<()> {
    cache.delete::<Channel>(channel_id)?;
    cache.write(
        CacheChange::Replaced {
            kind: EntityKind::Message,
            scope: Some(channel_id.to_string()),
        },
        |db| {
            db.delete_messages_for_channel(channel_id)?;
            db.reset_sync_state(&scope::channel_messages(channel_id))
        },
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use axum::http::StatusCode;
    use axum::routing::{delete, post};
    use axum::{Json, Router};
    use teamhub_shared::{fixtures, ChannelKind, Message};

    use crate::testing;

    #[tokio::test]
    async fn open_direct_prefers_cached_channel() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let router = Router::new().route(
            "/channels/direct",
            post(move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                let mut dm = fixtures::channel("dm-new", "w-1", ChannelKind::Direct);
                dm.member_ids = vec!["u-1".into(), "u-3".into()];
                Json(dm)
            }),
        );
        let (api, cache) = testing::api_and_cache(router).await;
        let mut known = fixtures::channel("dm-1", "w-1", ChannelKind::Direct);
        known.member_ids = vec!["u-1".into(), "u-2".into()];
        cache.upsert(&known).unwrap();

        let repo = ChannelRepository::new(api, cache);
        assert_eq!(repo.open_direct("w-1", "u-1", "u-2").await.unwrap().id, "dm-1");
        assert_eq!(calls.load(Ordering::SeqCst), 0);

        assert_eq!(repo.open_direct("w-1", "u-1", "u-3").await.unwrap().id, "dm-new");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(repo.cached_direct_channels("w-1").unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_drops_channel_history() {
        let router = Router::new().route(
            "/channels/c-1",
            delete(|| async { StatusCode::NO_CONTENT }),
        );
        let (api, cache) = testing::api_and_cache(router).await;
        cache
            .upsert(&fixtures::channel("c-1", "w-1", ChannelKind::Public))
            .unwrap();
        cache.upsert(&fixtures::message("m-1", "c-1", 0)).unwrap();

        ChannelRepository::new(api, cache.clone())
            .delete("c-1")
            .await
            .unwrap();

        assert!(cache.read(|db| db.find::<Channel>("c-1")).unwrap().is_none());
        assert!(cache.read(|db| db.find::<Message>("m-1")).unwrap().is_none());
    }
}
