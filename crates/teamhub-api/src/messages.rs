//! Message endpoints. History is paged, newest first.

use teamhub_shared::requests::{MessageEdit, NewMessage, PageQuery};
use teamhub_shared::{Message, Page};

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn messages_page(&self, channel_id: &str, query: PageQuery) -> Result<Page<Message>> {
        self.get_query(&format!("/channels/{channel_id}/messages"), &query)
            .await
    }

    pub async fn send_message(&self, channel_id: &str, new: &NewMessage) -> Result<Message> {
        self.post(&format!("/channels/{channel_id}/messages"), new)
            .await
    }

    pub async fn edit_message(&self, message_id: &str, content: &str) -> Result<Message> {
        let body = MessageEdit {
            content: content.to_string(),
        };
        self.put(&format!("/messages/{message_id}"), &body).await
    }

    pub async fn delete_message(&self, message_id: &str) -> Result<()> {
        self.delete(&format!("/messages/{message_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::{Path, Query};
    use axum::routing::get;
    use axum::{Json, Router};
    use serde_json::Value;
    use teamhub_shared::requests::{NewMessage, PageQuery};
    use teamhub_shared::{fixtures, Page};

    use crate::mock;

    #[tokio::test]
    async fn page_query_and_send() {
        let router = Router::new().route(
            "/channels/:id/messages",
            get(|Path(id): Path<String>, Query(q): Query<PageQuery>| async move {
                assert_eq!(id, "c-1");
                let items = if q.page == 0 {
                    vec![fixtures::message("m-2", "c-1", 2), fixtures::message("m-1", "c-1", 1)]
                } else {
                    vec![]
                };
                Json(Page { items, page: q.page, page_size: q.size, total: 2 })
            })
            .post(|Path(id): Path<String>, Json(body): Json<Value>| async move {
                let mut m = fixtures::message("m-3", &id, 3);
                m.content = body["content"].as_str().unwrap().to_string();
                assert!(body.get("replyToId").is_none());
                Json(m)
            }),
        );
        let api = mock::client(router).await;

        let first = api
            .messages_page("c-1", PageQuery { page: 0, size: 2 })
            .await
            .unwrap();
        assert_eq!(first.items.len(), 2);
        assert!(!first.has_more());

        let sent = api
            .send_message(
                "c-1",
                &NewMessage {
                    content: "ship it".into(),
                    attachment_url: None,
                    reply_to_id: None,
                },
            )
            .await
            .unwrap();
        assert_eq!(sent.channel_id, "c-1");
        assert_eq!(sent.content, "ship it");
    }
}
