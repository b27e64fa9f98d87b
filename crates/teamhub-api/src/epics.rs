//! Epic endpoints.

use teamhub_shared::requests::{EpicUpdate, NewEpic};
use teamhub_shared::{Epic, Task};

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn list_epics(&self, workspace_id: &str) -> Result<Vec<Epic>> {
        self.get(&format!("/workspaces/{workspace_id}/epics")).await
    }

    pub async fn get_epic(&self, epic_id: &str) -> Result<Epic> {
        self.get(&format!("/epics/{epic_id}")).await
    }

    pub async fn epic_tasks(&self, epic_id: &str) -> Result<Vec<Task>> {
        self.get(&format!("/epics/{epic_id}/tasks")).await
    }

    pub async fn create_epic(&self, workspace_id: &str, new: &NewEpic) -> Result<Epic> {
        self.post(&format!("/workspaces/{workspace_id}/epics"), new)
            .await
    }

    pub async fn update_epic(&self, epic_id: &str, update: &EpicUpdate) -> Result<Epic> {
        self.put(&format!("/epics/{epic_id}"), update).await
    }

    pub async fn delete_epic(&self, epic_id: &str) -> Result<()> {
        self.delete(&format!("/epics/{epic_id}")).await
    }
}
