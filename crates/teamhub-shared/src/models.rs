//! Entity model mirrored one-to-one from the backend resources.
//!
//! Every struct derives `Serialize` and `Deserialize` with camelCase field
//! names, so the same types are decoded from REST responses and push events
//! and handed to the local cache unchanged.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{
    BugSeverity, BugStatus, ChannelKind, InvitationStatus, NotificationKind, Priority,
    SprintStatus, WorkStatus,
};

// ---------------------------------------------------------------------------
// Entity kinds
// ---------------------------------------------------------------------------

/// Names each cached entity type. Used to tag cache change events and sync
/// scopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    User,
    Account,
    Workspace,
    Channel,
    Message,
    Task,
    Epic,
    Sprint,
    Bug,
    Notification,
    Invitation,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Account => "account",
            Self::Workspace => "workspace",
            Self::Channel => "channel",
            Self::Message => "message",
            Self::Task => "task",
            Self::Epic => "epic",
            Self::Sprint => "sprint",
            Self::Bug => "bug",
            Self::Notification => "notification",
            Self::Invitation => "invitation",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// User / Account
// ---------------------------------------------------------------------------

/// A person known to the client: the signed-in user or another member.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    /// Set only for the signed-in user; links the profile to its account.
    #[serde(default)]
    pub account_id: Option<String>,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub avatar_url: Option<String>,
    /// Job title shown next to the name.
    #[serde(default)]
    pub title: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Credentials of the signed-in account.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// Tokens stay out of logs.
impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("email", &self.email)
            .field("phone", &self.phone)
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("created_at", &self.created_at)
            .field("updated_at", &self.updated_at)
            .finish()
    }
}

/// Result of a successful sign-in, registration or OTP verification.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub account: Account,
    pub user: User,
}

// ---------------------------------------------------------------------------
// Workspace / Channel / Message
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Workspace {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub owner_id: String,
    #[serde(default)]
    pub avatar_url: Option<String>,
    #[serde(default)]
    pub member_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Channel {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub kind: ChannelKind,
    #[serde(default)]
    pub member_ids: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: String,
    pub channel_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(default)]
    pub attachment_url: Option<String>,
    #[serde(default)]
    pub reply_to_id: Option<String>,
    #[serde(default)]
    pub edited: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Work tracking
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: String,
    pub workspace_id: String,
    #[serde(default)]
    pub epic_id: Option<String>,
    #[serde(default)]
    pub sprint_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: WorkStatus,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub assignee_id: Option<String>,
    pub reporter_id: String,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub story_points: Option<u32>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Epic {
    pub id: String,
    pub workspace_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub status: WorkStatus,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub due_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Sprint {
    pub id: String,
    pub workspace_id: String,
    pub name: String,
    #[serde(default)]
    pub goal: Option<String>,
    pub status: SprintStatus,
    #[serde(default)]
    pub start_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub end_date: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Bug {
    pub id: String,
    pub workspace_id: String,
    #[serde(default)]
    pub task_id: Option<String>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub severity: BugSeverity,
    pub status: BugStatus,
    pub reporter_id: String,
    #[serde(default)]
    pub assignee_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Notification / Invitation
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub body: String,
    /// Id of the entity the notification points at (task, message, ...).
    #[serde(default)]
    pub entity_id: Option<String>,
    #[serde(default)]
    pub read: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Invitation {
    pub id: String,
    pub workspace_id: String,
    pub inviter_id: String,
    pub invitee_email: String,
    #[serde(default)]
    pub invitee_id: Option<String>,
    pub status: InvitationStatus,
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Invitation {
    /// Pending and not past its expiry.
    pub fn is_actionable(&self, now: DateTime<Utc>) -> bool {
        self.status == InvitationStatus::Pending && self.expires_at.map_or(true, |t| t > now)
    }
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

/// Work summary for one workspace. Served by the reports endpoint and also
/// computed from the local cache when offline.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceReport {
    pub workspace_id: String,
    pub total_tasks: u64,
    pub completed_tasks: u64,
    /// Task count per `WorkStatus` text.
    #[serde(default)]
    pub tasks_by_status: BTreeMap<String, u64>,
    pub open_bugs: u64,
    #[serde(default)]
    pub active_sprint_id: Option<String>,
    #[serde(default)]
    pub story_points_done: u64,
}

impl WorkspaceReport {
    /// Share of completed tasks in `[0, 1]`; zero for an empty workspace.
    pub fn completion_ratio(&self) -> f64 {
        if self.total_tasks == 0 {
            0.0
        } else {
            self.completed_tasks as f64 / self.total_tasks as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn task_decodes_backend_json_with_missing_optionals() {
        let json = r#"{
            "id": "t-1",
            "workspaceId": "w-1",
            "title": "Ship it",
            "reporterId": "u-1",
            "createdAt": "2026-01-02T03:04:05Z",
            "updatedAt": "2026-01-02T03:04:05Z"
        }"#;
        let task: Task = serde_json::from_str(json).unwrap();
        assert_eq!(task.status, WorkStatus::Todo);
        assert_eq!(task.priority, Priority::Medium);
        assert!(task.epic_id.is_none());
        assert!(task.story_points.is_none());
    }

    #[test]
    fn account_debug_hides_tokens() {
        let now = Utc::now();
        let account = Account {
            id: "a-1".into(),
            email: "ada@example.com".into(),
            phone: None,
            access_token: "secret-access".into(),
            refresh_token: Some("secret-refresh".into()),
            created_at: now,
            updated_at: now,
        };
        let printed = format!("{account:?}");
        assert!(!printed.contains("secret-access"));
        assert!(!printed.contains("secret-refresh"));
    }

    #[test]
    fn invitation_actionable_respects_expiry() {
        let now = Utc::now();
        let mut inv = Invitation {
            id: "i-1".into(),
            workspace_id: "w-1".into(),
            inviter_id: "u-1".into(),
            invitee_email: "bob@example.com".into(),
            invitee_id: None,
            status: InvitationStatus::Pending,
            expires_at: None,
            created_at: now,
            updated_at: now,
        };
        assert!(inv.is_actionable(now));

        inv.expires_at = Some(now - chrono::Duration::hours(1));
        assert!(!inv.is_actionable(now));

        inv.expires_at = None;
        inv.status = InvitationStatus::Accepted;
        assert!(!inv.is_actionable(now));
    }

    #[test]
    fn report_completion_ratio() {
        let empty = WorkspaceReport::default();
        assert_eq!(empty.completion_ratio(), 0.0);

        let half = WorkspaceReport { total_tasks: 4, completed_tasks: 2, ..Default::default() };
        assert!((half.completion_ratio() - 0.5).abs() < f64::EPSILON);
    }
}
