//! Notification endpoints for the signed-in user.

use teamhub_shared::requests::PageQuery;
use teamhub_shared::{Notification, Page};

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn notifications_page(&self, query: PageQuery) -> Result<Page<Notification>> {
        self.get_query("/notifications", &query).await
    }

    pub async fn mark_notification_read(&self, notification_id: &str) -> Result<()> {
        self.post_unit(
            &format!("/notifications/{notification_id}/read"),
            &serde_json::json!({}),
        )
        .await
    }

    pub async fn mark_all_notifications_read(&self) -> Result<()> {
        self.post_unit("/notifications/read-all", &serde_json::json!({}))
            .await
    }

    pub async fn delete_notification(&self, notification_id: &str) -> Result<()> {
        self.delete(&format!("/notifications/{notification_id}"))
            .await
    }
}
