//! The signed-in user's notifications, paged like channel history.

use tracing::debug;

use teamhub_api::ApiClient;
use teamhub_shared::requests::PageQuery;
use teamhub_shared::{EntityKind, Notification};

use crate::cache::{CacheChange, LocalCache};
use crate::error::{ClientError, Result};
use crate::sync::scope;

use super::PageLoad;

#[derive(Clone)]
pub struct NotificationRepository {
    api: ApiClient,
    cache: LocalCache,
    page_size: u32,
}

impl NotificationRepository {
    pub fn new(api: ApiClient, cache: LocalCache, page_size: u32) -> Self {
        Self {
            api,
            cache,
            page_size: page_size.max(1),
        }
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    fn user_id(&self) -> Result<String> {
        self.cache
            .read(|db| db.current_user())?
            .map(|u| u.id)
            .ok_or(ClientError::NotAuthenticated)
    }

    /// The newest `limit` cached notifications.
    pub fn cached_notifications(&self, limit: u32) -> Result<Vec<Notification>> {
        let user_id = self.user_id()?;
        self.cache
            .read(|db| db.notifications_page(&user_id, limit, 0))
    }

    pub fn unread_count(&self) -> Result<u64> {
        let user_id = self.user_id()?;
        self.cache.read(|db| db.unread_notification_count(&user_id))
    }

    pub fn has_more(&self) -> Result<bool> {
        let state = self.cache.read(|db| db.sync_state(scope::NOTIFICATIONS))?;
        Ok(state.map_or(true, |s| !s.exhausted))
    }

    pub async fn load_first_page(&self) -> Result<PageLoad> {
        self.load_page(0).await
    }

    pub async fn load_next_page(&self) -> Result<PageLoad> {
        match self.cache.read(|db| db.sync_state(scope::NOTIFICATIONS))? {
            Some(s) if s.exhausted => Ok(PageLoad {
                loaded: 0,
                has_more: false,
            }),
            Some(s) => self.load_page(s.next_page).await,
            None => self.load_page(0).await,
        }
    }

    async fn load_page(&self, page: u32) -> Result<PageLoad> {
        let query = PageQuery {
            page,
            size: self.page_size,
        };
        let fetched = self.api.notifications_page(query).await?;
        let has_more = fetched.has_more();
        let loaded = self.cache.upsert_all(&fetched.items)?;
        self.cache
            .write_untracked(|db| db.record_page(scope::NOTIFICATIONS, page + 1, !has_more))?;
        debug!(page, loaded, has_more, "Loaded notification page");
        Ok(PageLoad { loaded, has_more })
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<()> {
        self.api.mark_notification_read(notification_id).await?;
        self.cache.write(
            CacheChange::Upserted {
                kind: EntityKind::Notification,
                id: notification_id.to_string(),
            },
            |db| db.mark_notification_read(notification_id),
        )?;
        Ok(())
    }

    pub async fn mark_all_read(&self) -> Result<usize> {
        let user_id = self.user_id()?;
        self.api.mark_all_notifications_read().await?;
        self.cache.write(
            CacheChange::Replaced {
                kind: EntityKind::Notification,
                scope: Some(user_id.clone()),
            },
            |db| db.mark_all_notifications_read(&user_id),
        )
    }

    pub async fn delete(&self, notification_id: &str) -> Result<()> {
        self.api.delete_notification(notification_id).await?;
        self.cache.delete::<Notification>(notification_id)?;
        Ok(())
    }
}
