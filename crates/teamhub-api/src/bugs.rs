//! Bug endpoints.

use teamhub_shared::requests::{BugUpdate, NewBug};
use teamhub_shared::Bug;

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn list_bugs(&self, workspace_id: &str) -> Result<Vec<Bug>> {
        self.get(&format!("/workspaces/{workspace_id}/bugs")).await
    }

    pub async fn task_bugs(&self, task_id: &str) -> Result<Vec<Bug>> {
        self.get(&format!("/tasks/{task_id}/bugs")).await
    }

    pub async fn get_bug(&self, bug_id: &str) -> Result<Bug> {
        self.get(&format!("/bugs/{bug_id}")).await
    }

    pub async fn report_bug(&self, workspace_id: &str, new: &NewBug) -> Result<Bug> {
        self.post(&format!("/workspaces/{workspace_id}/bugs"), new)
            .await
    }

    pub async fn update_bug(&self, bug_id: &str, update: &BugUpdate) -> Result<Bug> {
        self.put(&format!("/bugs/{bug_id}"), update).await
    }

    pub async fn delete_bug(&self, bug_id: &str) -> Result<()> {
        self.delete(&format!("/bugs/{bug_id}")).await
    }
}
