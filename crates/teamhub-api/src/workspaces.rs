//! `/workspaces` endpoints.

use teamhub_shared::requests::{NewWorkspace, WorkspaceUpdate};
use teamhub_shared::{User, Workspace};

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Workspaces the signed-in user belongs to.
    pub async fn list_workspaces(&self) -> Result<Vec<Workspace>> {
        self.get("/workspaces").await
    }

    pub async fn get_workspace(&self, workspace_id: &str) -> Result<Workspace> {
        self.get(&format!("/workspaces/{workspace_id}")).await
    }

    pub async fn create_workspace(&self, new: &NewWorkspace) -> Result<Workspace> {
        self.post("/workspaces", new).await
    }

    pub async fn update_workspace(
        &self,
        workspace_id: &str,
        update: &WorkspaceUpdate,
    ) -> Result<Workspace> {
        self.put(&format!("/workspaces/{workspace_id}"), update).await
    }

    pub async fn delete_workspace(&self, workspace_id: &str) -> Result<()> {
        self.delete(&format!("/workspaces/{workspace_id}")).await
    }

    pub async fn workspace_members(&self, workspace_id: &str) -> Result<Vec<User>> {
        self.get(&format!("/workspaces/{workspace_id}/members")).await
    }

    pub async fn remove_member(&self, workspace_id: &str, user_id: &str) -> Result<()> {
        self.delete(&format!("/workspaces/{workspace_id}/members/{user_id}"))
            .await
    }
}
