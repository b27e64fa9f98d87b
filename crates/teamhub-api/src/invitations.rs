//! Workspace invitation endpoints.

use teamhub_shared::requests::NewInvitation;
use teamhub_shared::{Invitation, Workspace};

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Invitations addressed to the signed-in user.
    pub async fn received_invitations(&self) -> Result<Vec<Invitation>> {
        self.get("/invitations").await
    }

    pub async fn workspace_invitations(&self, workspace_id: &str) -> Result<Vec<Invitation>> {
        self.get(&format!("/workspaces/{workspace_id}/invitations"))
            .await
    }

    pub async fn send_invitation(&self, workspace_id: &str, email: &str) -> Result<Invitation> {
        let body = NewInvitation {
            email: email.to_string(),
        };
        self.post(&format!("/workspaces/{workspace_id}/invitations"), &body)
            .await
    }

    /// Accept an invitation; the backend answers with the joined workspace.
    pub async fn accept_invitation(&self, invitation_id: &str) -> Result<Workspace> {
        self.post_empty(&format!("/invitations/{invitation_id}/accept"))
            .await
    }

    pub async fn decline_invitation(&self, invitation_id: &str) -> Result<Invitation> {
        self.post_empty(&format!("/invitations/{invitation_id}/decline"))
            .await
    }

    /// Withdraw an invitation the caller sent.
    pub async fn cancel_invitation(&self, invitation_id: &str) -> Result<()> {
        self.delete(&format!("/invitations/{invitation_id}")).await
    }
}
