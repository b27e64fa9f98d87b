use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use tokio::sync::watch;

use teamhub_shared::{EntityKind, Message};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::repositories::{MessageRepository, PageLoad};
use crate::sync::local_then_remote;

use super::{StateHolder, UiState};

/// What the conversation screen renders. Newest message first.
#[derive(Debug, Clone, PartialEq)]
pub struct MessageList {
    pub messages: Vec<Message>,
    pub has_more: bool,
}

/// Reads as many cached messages as the pages loaded so far cover.
#[derive(Clone)]
struct Window {
    repo: MessageRepository,
    channel_id: String,
    pages: Arc<AtomicU32>,
}

impl Window {
    fn read(&self) -> Result<MessageList> {
        let limit = self.pages.load(Ordering::SeqCst) * self.repo.page_size();
        Ok(MessageList {
            messages: self.repo.cached_messages(&self.channel_id, limit)?,
            has_more: self.repo.has_more(&self.channel_id)?,
        })
    }
}

/// One channel's history with "load older" paging.
pub struct ChannelMessagesHolder {
    holder: StateHolder<MessageList>,
    window: Window,
}

impl ChannelMessagesHolder {
    pub fn new(repo: MessageRepository, cache: &LocalCache, channel_id: &str) -> Self {
        let window = Window {
            repo,
            channel_id: channel_id.to_string(),
            pages: Arc::new(AtomicU32::new(1)),
        };

        let (local, remote, reader) = (window.clone(), window.clone(), window.clone());
        let initial = local_then_remote(
            move || local.read(),
            move || async move {
                remote.repo.load_first_page(&remote.channel_id).await?;
                remote.read()
            },
        );
        let holder = StateHolder::spawn(cache, &[EntityKind::Message], initial, move || {
            reader.read()
        });

        Self { holder, window }
    }

    pub fn channel_id(&self) -> &str {
        &self.window.channel_id
    }

    pub fn state(&self) -> UiState<MessageList> {
        self.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState<MessageList>> {
        self.holder.subscribe()
    }

    /// Fetch the next older page and widen the window over it.
    pub async fn load_more(&self) -> Result<PageLoad> {
        let repo = &self.window.repo;
        if !repo.has_more(&self.window.channel_id)? {
            return Ok(PageLoad {
                loaded: 0,
                has_more: false,
            });
        }

        self.window.pages.fetch_add(1, Ordering::SeqCst);
        match repo.load_next_page(&self.window.channel_id).await {
            Ok(load) => {
                // The paging cursor is not a broadcast change; publish directly.
                self.holder.publish(self.window.read());
                Ok(load)
            }
            Err(e) => {
                self.window.pages.fetch_sub(1, Ordering::SeqCst);
                Err(e)
            }
        }
    }

    pub async fn send(&self, content: &str) -> Result<Message> {
        self.window
            .repo
            .send_text(&self.window.channel_id, content)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::{Path, Query};
    use axum::routing::get;
    use axum::{Json, Router};
    use teamhub_shared::requests::PageQuery;
    use teamhub_shared::{fixtures, Page};

    use crate::holders::test_support::wait_for;
    use crate::testing;

    #[tokio::test]
    async fn load_more_widens_window_until_exhausted() {
        let router = Router::new().route(
            "/channels/:id/messages",
            get(|Path(id): Path<String>, Query(q): Query<PageQuery>| async move {
                let all: Vec<Message> = (0..3)
                    .rev()
                    .map(|i| fixtures::message(&format!("m-{i}"), &id, i))
                    .collect();
                let items = all
                    .into_iter()
                    .skip((q.page * q.size) as usize)
                    .take(q.size as usize)
                    .collect();
                Json(Page { items, page: q.page, page_size: q.size, total: 3 })
            }),
        );
        let (api, cache) = testing::api_and_cache(router).await;
        let holder = ChannelMessagesHolder::new(MessageRepository::new(api, cache.clone(), 2), &cache, "c-1");
        let mut rx = holder.subscribe();

        let first = wait_for(&mut rx, |s| s.data().map_or(false, |l| l.messages.len() == 2)).await;
        assert!(first.data().unwrap().has_more);

        let load = holder.load_more().await.unwrap();
        assert_eq!(load, PageLoad { loaded: 1, has_more: false });
        let all = wait_for(&mut rx, |s| s.data().map_or(false, |l| !l.has_more)).await;
        let ids: Vec<_> = all.data().unwrap().messages.iter().map(|m| m.id.as_str()).collect();
        assert_eq!(ids, vec!["m-2", "m-1", "m-0"]);

        assert_eq!(holder.load_more().await.unwrap().loaded, 0);
    }
}
