use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use teamhub_shared::{EntityKind, Notification};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::repositories::{NotificationRepository, PageLoad};
use crate::sync::local_then_remote;

use super::{StateHolder, UiState};

#[derive(Debug, Clone, PartialEq)]
pub struct NotificationFeed {
    pub items: Vec<Notification>,
    pub unread: u64,
    pub has_more: bool,
}

#[derive(Clone)]
struct Feed {
    repo: NotificationRepository,
    pages: Arc<AtomicU32>,
}

impl Feed {
    fn read(&self) -> Result<NotificationFeed> {
        let limit = self.pages.load(Ordering::SeqCst) * self.repo.page_size();
        Ok(NotificationFeed {
            items: self.repo.cached_notifications(limit)?,
            unread: self.repo.unread_count()?,
            has_more: self.repo.has_more()?,
        })
    }
}

/// The notification inbox and its unread badge.
pub struct NotificationsHolder {
    holder: StateHolder<NotificationFeed>,
    feed: Feed,
}

impl NotificationsHolder {
    pub fn new(repo: NotificationRepository, cache: &LocalCache) -> Self {
        let feed = Feed {
            repo,
            pages: Arc::new(AtomicU32::new(1)),
        };
        let (local, remote, reader) = (feed.clone(), feed.clone(), feed.clone());
        let initial = local_then_remote(
            move || local.read(),
            move || async move {
                remote.repo.load_first_page().await?;
                remote.read()
            },
        );
        let holder = StateHolder::spawn(cache, &[EntityKind::Notification], initial, move || {
            reader.read()
        });
        Self { holder, feed }
    }

    pub fn state(&self) -> UiState<NotificationFeed> {
        self.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState<NotificationFeed>> {
        self.holder.subscribe()
    }

    pub async fn load_more(&self) -> Result<PageLoad> {
        if !self.feed.repo.has_more()? {
            return Ok(PageLoad {
                loaded: 0,
                has_more: false,
            });
        }
        self.feed.pages.fetch_add(1, Ordering::SeqCst);
        match self.feed.repo.load_next_page().await {
            Ok(load) => {
                self.holder.publish(self.feed.read());
                Ok(load)
            }
            Err(e) => {
                self.feed.pages.fetch_sub(1, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    pub async fn mark_read(&self, notification_id: &str) -> Result<()> {
        self.feed.repo.mark_read(notification_id).await
    }

    pub async fn mark_all_read(&self) -> Result<usize> {
        self.feed.repo.mark_all_read().await
    }
}
