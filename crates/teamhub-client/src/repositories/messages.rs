//! Channel history with page-based loading.
//!
//! Pages are requested newest first. The next page index and whether the
//! backend ran out are kept in `sync_state` under
//! `channel:<id>:messages`, so paging resumes where it left off after a
//! restart.

use tracing::debug;

use teamhub_api::ApiClient;
use teamhub_shared::requests::{NewMessage, PageQuery};
use teamhub_shared::Message;

use crate::cache::LocalCache;
use crate::error::Result;
use crate::sync::scope;

/// Outcome of loading one page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageLoad {
    /// Items the page carried.
    pub loaded: usize,
    /// Whether another page can be requested.
    pub has_more: bool,
}

#[derive(Clone)]
pub struct MessageRepository {
    api: ApiClient,
    cache: LocalCache,
    page_size: u32,
}

impl MessageRepository {
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

    /// The newest `limit` cached messages, newest first.
    pub fn cached_messages(&self, channel_id: &str, limit: u32) -> Result<Vec<Message>> {
        self.cache
            .read(|db| db.get_messages_for_channel(channel_id, limit, 0))
    }

    /// Whether another page can be requested. `true` before the first load.
    pub fn has_more(&self, channel_id: &str) -> Result<bool> {
        let state = self
            .cache
            .read(|db| db.sync_state(&scope::channel_messages(channel_id)))?;
        Ok(state.map_or(true, |s| !s.exhausted))
    }

    /// Restart paging from the newest page.
    pub async fn load_first_page(&self, channel_id: &str) -> Result<PageLoad> {
        self.load_page(channel_id, 0).await
    }

    /// Fetch the page after the last one loaded. Does nothing once the
    /// backend reported the end of the history.
    pub async fn load_next_page(&self, channel_id: &str) -> Result<PageLoad> {
        let scope_name = scope::channel_messages(channel_id);
        let state = self.cache.read(|db| db.sync_state(&scope_name))?;
        match state {
            Some(s) if s.exhausted => Ok(PageLoad {
                loaded: 0,
                has_more: false,
            }),
            Some(s) => self.load_page(channel_id, s.next_page).await,
            None => self.load_page(channel_id, 0).await,
        }
    }

    async fn load_page(&self, channel_id: &str, page: u32) -> Result<PageLoad> {
        let query = PageQuery {
            page,
            size: self.page_size,
        };
        let fetched = self.api.messages_page(channel_id, query).await?;
        let has_more = fetched.has_more();
        let loaded = self.cache.upsert_all(&fetched.items)?;
        self.cache.write_untracked(|db| {
            db.record_page(&scope::channel_messages(channel_id), page + 1, !has_more)
        })?;
        debug!(channel = %channel_id, page, loaded, has_more, "Loaded message page");
        Ok(PageLoad { loaded, has_more })
    }

    pub async fn send(&self, channel_id: &str, new: &NewMessage) -> Result<Message> {
        let message = self.api.send_message(channel_id, new).await?;
        self.cache.upsert(&message)?;
        Ok(message)
    }

    pub async fn send_text(&self, channel_id: &str, content: &str) -> Result<Message> {
        let new = NewMessage {
            content: content.to_string(),
            attachment_url: None,
            reply_to_id: None,
        };
        self.send(channel_id, &new).await
    }

    pub async fn edit(&self, message_id: &str, content: &str) -> Result<Message> {
        let message = self.api.edit_message(message_id, content).await?;
        self.cache.upsert(&message)?;
        Ok(message)
    }

    pub async fn delete(&self, message_id: &str) -> Result<()> {
        self.api.delete_message(message_id).await?;
        self.cache.delete::<Message>(message_id)?;
        Ok(())
    }

    /// Search cached history; works offline.
    pub fn search(&self, query: &str, channel_id: Option<&str>, limit: u32) -> Result<Vec<Message>> {
        self.cache
            .read(|db| db.search_messages(query, channel_id, limit))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::{Arc, Mutex};

    use axum::extract::{Path, Query};
    use axum::routing::get;
    use axum::{Json, Router};
    use teamhub_shared::{fixtures, Page};

    use crate::testing;

    /// Five messages served newest first, two per page.
    fn history_router(requested: Arc<Mutex<Vec<u32>>>) -> Router {
        Router::new().route(
            "/channels/:id/messages",
            get(move |Path(id): Path<String>, Query(q): Query<PageQuery>| {
                let requested = requested.clone();
                async move {
                    requested.lock().unwrap().push(q.page);
                    let all: Vec<Message> = (0..5)
                        .rev()
                        .map(|i| fixtures::message(&format!("m-{i}"), &id, i))
                        .collect();
                    let start = (q.page * q.size) as usize;
                    let items = all.into_iter().skip(start).take(q.size as usize).collect();
                    Json(Page {
                        items,
                        page: q.page,
                        page_size: q.size,
                        total: 5,
                    })
                }
            }),
        )
    }

    #[tokio::test]
    async fn pages_until_short_page_then_stops() {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let (api, cache) = testing::api_and_cache(history_router(requested.clone())).await;
        let repo = MessageRepository::new(api, cache, 2);

        assert!(repo.has_more("c-1").unwrap());

        let first = repo.load_first_page("c-1").await.unwrap();
        assert_eq!(first, PageLoad { loaded: 2, has_more: true });
        let newest: Vec<String> = repo
            .cached_messages("c-1", 10)
            .unwrap()
            .into_iter()
            .map(|m| m.id)
            .collect();
        assert_eq!(newest, vec!["m-4", "m-3"]);

        assert_eq!(repo.load_next_page("c-1").await.unwrap().loaded, 2);
        let last = repo.load_next_page("c-1").await.unwrap();
        assert_eq!(last, PageLoad { loaded: 1, has_more: false });
        assert!(!repo.has_more("c-1").unwrap());

        // Exhausted: no further request goes out.
        let none = repo.load_next_page("c-1").await.unwrap();
        assert_eq!(none.loaded, 0);
        assert_eq!(*requested.lock().unwrap(), vec![0, 1, 2]);
        assert_eq!(repo.cached_messages("c-1", 10).unwrap().len(), 5);
    }

    #[tokio::test]
    async fn first_page_restarts_paging() {
        let requested = Arc::new(Mutex::new(Vec::new()));
        let (api, cache) = testing::api_and_cache(history_router(requested.clone())).await;
        let repo = MessageRepository::new(api, cache, 2);

        repo.load_first_page("c-1").await.unwrap();
        repo.load_next_page("c-1").await.unwrap();
        repo.load_first_page("c-1").await.unwrap();
        repo.load_next_page("c-1").await.unwrap();

        assert_eq!(*requested.lock().unwrap(), vec![0, 1, 0, 1]);
    }

    #[test]
    fn search_is_local() {
        let cache = LocalCache::open_in_memory().unwrap();
        let mut m = fixtures::message("m-1", "c-1", 0);
        m.content = "Deploy is green".into();
        cache.upsert(&m).unwrap();

        let repo = MessageRepository::new(testing::offline_api(), cache, 30);
        assert_eq!(repo.search("green", Some("c-1"), 10).unwrap().len(), 1);
        assert!(repo.search("red", None, 10).unwrap().is_empty());
    }
}
