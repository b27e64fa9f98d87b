//! Channel endpoints, including direct (two-person) channels.

use teamhub_shared::requests::{ChannelUpdate, DirectChannelRequest, NewChannel};
use teamhub_shared::Channel;

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    /// Every channel of a workspace visible to the caller, direct ones included.
    pub async fn list_channels(&self, workspace_id: &str) -> Result<Vec<Channel>> {
        self.get(&format!("/workspaces/{workspace_id}/channels")).await
    }

    pub async fn get_channel(&self, channel_id: &str) -> Result<Channel> {
        self.get(&format!("/channels/{channel_id}")).await
    }

    pub async fn create_channel(&self, workspace_id: &str, new: &NewChannel) -> Result<Channel> {
        self.post(&format!("/workspaces/{workspace_id}/channels"), new)
            .await
    }

    pub async fn update_channel(&self, channel_id: &str, update: &ChannelUpdate) -> Result<Channel> {
        self.put(&format!("/channels/{channel_id}"), update).await
    }

    pub async fn delete_channel(&self, channel_id: &str) -> Result<()> {
        self.delete(&format!("/channels/{channel_id}")).await
    }

    /// Open the direct channel with `user_id`, or return the existing one.
    pub async fn open_direct_channel(&self, workspace_id: &str, user_id: &str) -> Result<Channel> {
        let body = DirectChannelRequest {
            workspace_id: workspace_id.to_string(),
            user_id: user_id.to_string(),
        };
        self.post("/channels/direct", &body).await
    }
}
