//! Real-time push protocol.
//!
//! Frames are JSON text of the form `{"type": "...", "payload": {...}}`.
//! Inbound [`ServerEvent`]s mostly carry a full entity that the client
//! upserts into its cache; deletions carry only the identifiers.

use serde::{Deserialize, Serialize};

use crate::error::ProtocolError;
use crate::models::{
    Bug, Channel, Epic, EntityKind, Invitation, Message, Notification, Sprint, Task, User,
    Workspace,
};

/// Identifies a deleted entity.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct EntityRef {
    pub id: String,
}

/// Identifies a deleted message together with its channel.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MessageRef {
    pub id: String,
    pub channel_id: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Typing {
    pub channel_id: String,
    pub user_id: String,
}

/// Events pushed by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ServerEvent {
    MessageCreated(Message),
    MessageUpdated(Message),
    MessageDeleted(MessageRef),

    ChannelUpserted(Channel),
    ChannelDeleted(EntityRef),

    WorkspaceUpserted(Workspace),
    WorkspaceDeleted(EntityRef),

    UserUpserted(User),

    TaskUpserted(Task),
    TaskDeleted(EntityRef),

    EpicUpserted(Epic),
    EpicDeleted(EntityRef),

    SprintUpserted(Sprint),
    SprintDeleted(EntityRef),

    BugUpserted(Bug),
    BugDeleted(EntityRef),

    NotificationCreated(Notification),

    InvitationUpserted(Invitation),
    InvitationDeleted(EntityRef),

    Typing(Typing),

    Pong,
}

impl ServerEvent {
    /// The entity kind this event touches, if it touches the cache at all.
    pub fn entity_kind(&self) -> Option<EntityKind> {
        Some(match self {
            Self::MessageCreated(_) | Self::MessageUpdated(_) | Self::MessageDeleted(_) => {
                EntityKind::Message
            }
            Self::ChannelUpserted(_) | Self::ChannelDeleted(_) => EntityKind::Channel,
            Self::WorkspaceUpserted(_) | Self::WorkspaceDeleted(_) => EntityKind::Workspace,
            Self::UserUpserted(_) => EntityKind::User,
            Self::TaskUpserted(_) | Self::TaskDeleted(_) => EntityKind::Task,
            Self::EpicUpserted(_) | Self::EpicDeleted(_) => EntityKind::Epic,
            Self::SprintUpserted(_) | Self::SprintDeleted(_) => EntityKind::Sprint,
            Self::BugUpserted(_) | Self::BugDeleted(_) => EntityKind::Bug,
            Self::NotificationCreated(_) => EntityKind::Notification,
            Self::InvitationUpserted(_) | Self::InvitationDeleted(_) => EntityKind::Invitation,
            Self::Typing(_) | Self::Pong => return None,
        })
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Frames sent by the client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum ClientFrame {
    Subscribe {
        #[serde(rename = "channelId")]
        channel_id: String,
    },
    Unsubscribe {
        #[serde(rename = "channelId")]
        channel_id: String,
    },
    Typing {
        #[serde(rename = "channelId")]
        channel_id: String,
    },
    Ping,
}

impl ClientFrame {
    pub fn to_json(&self) -> Result<String, ProtocolError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(text: &str) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_str(text)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_message_created_frame() {
        let text = r#"{
            "type": "message_created",
            "payload": {
                "id": "m-1",
                "channelId": "c-1",
                "senderId": "u-1",
                "content": "hello",
                "createdAt": "2026-03-01T10:00:00Z",
                "updatedAt": "2026-03-01T10:00:00Z"
            }
        }"#;
        let event = ServerEvent::from_json(text).unwrap();
        match event {
            ServerEvent::MessageCreated(m) => {
                assert_eq!(m.id, "m-1");
                assert_eq!(m.channel_id, "c-1");
                assert!(!m.edited);
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn decodes_unit_and_ref_frames() {
        assert_eq!(
            ServerEvent::from_json(r#"{"type":"pong"}"#).unwrap(),
            ServerEvent::Pong
        );
        let deleted =
            ServerEvent::from_json(r#"{"type":"message_deleted","payload":{"id":"m-9","channelId":"c-2"}}"#)
                .unwrap();
        assert_eq!(deleted.entity_kind(), Some(EntityKind::Message));
    }

    #[test]
    fn unknown_type_is_malformed() {
        let err = ServerEvent::from_json(r#"{"type":"telepathy","payload":{}}"#).unwrap_err();
        assert!(matches!(err, ProtocolError::Malformed(_)));
    }

    #[test]
    fn client_frame_shape() {
        let json = ClientFrame::Subscribe { channel_id: "c-1".into() }.to_json().unwrap();
        assert_eq!(json, r#"{"type":"subscribe","payload":{"channelId":"c-1"}}"#);
        assert_eq!(ClientFrame::Ping.to_json().unwrap(), r#"{"type":"ping"}"#);
    }
}
