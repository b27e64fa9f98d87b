//! Sample entities for tests across the workspace. Timestamps are whole
//! seconds so they survive the RFC-3339 round trip unchanged.

use chrono::{DateTime, Duration, TimeZone, Utc};

use crate::*;

pub fn at(minutes: i64) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 1, 1, 9, 0, 0).unwrap() + Duration::minutes(minutes)
}

pub fn account(id: &str, email: &str) -> Account {
    Account {
        id: id.into(),
        email: email.into(),
        phone: None,
        access_token: format!("token-{id}"),
        refresh_token: Some(format!("refresh-{id}")),
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn user(id: &str, email: &str) -> User {
    User {
        id: id.into(),
        account_id: None,
        name: format!("User {id}"),
        email: email.into(),
        phone: None,
        avatar_url: None,
        title: None,
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn workspace(id: &str) -> Workspace {
    Workspace {
        id: id.into(),
        name: format!("Workspace {id}"),
        description: None,
        owner_id: "u-1".into(),
        avatar_url: None,
        member_ids: vec!["u-1".into(), "u-2".into()],
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn channel(id: &str, workspace_id: &str, kind: ChannelKind) -> Channel {
    Channel {
        id: id.into(),
        workspace_id: workspace_id.into(),
        name: format!("#{id}"),
        description: None,
        kind,
        member_ids: vec!["u-1".into()],
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn message(id: &str, channel_id: &str, minute: i64) -> Message {
    Message {
        id: id.into(),
        channel_id: channel_id.into(),
        sender_id: "u-1".into(),
        content: format!("message {id}"),
        attachment_url: None,
        reply_to_id: None,
        edited: false,
        created_at: at(minute),
        updated_at: at(minute),
    }
}

pub fn task(id: &str, workspace_id: &str) -> Task {
    Task {
        id: id.into(),
        workspace_id: workspace_id.into(),
        epic_id: None,
        sprint_id: None,
        title: format!("Task {id}"),
        description: None,
        status: WorkStatus::Todo,
        priority: Priority::Medium,
        assignee_id: None,
        reporter_id: "u-1".into(),
        due_date: None,
        story_points: None,
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn epic(id: &str, workspace_id: &str) -> Epic {
    Epic {
        id: id.into(),
        workspace_id: workspace_id.into(),
        title: format!("Epic {id}"),
        description: None,
        status: WorkStatus::InProgress,
        start_date: Some(at(0)),
        due_date: None,
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn sprint(id: &str, workspace_id: &str, status: SprintStatus) -> Sprint {
    Sprint {
        id: id.into(),
        workspace_id: workspace_id.into(),
        name: format!("Sprint {id}"),
        goal: None,
        status,
        start_date: Some(at(0)),
        end_date: Some(at(60 * 24 * 14)),
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn bug(id: &str, workspace_id: &str, task_id: Option<&str>) -> Bug {
    Bug {
        id: id.into(),
        workspace_id: workspace_id.into(),
        task_id: task_id.map(str::to_string),
        title: format!("Bug {id}"),
        description: None,
        severity: BugSeverity::Major,
        status: BugStatus::Open,
        reporter_id: "u-1".into(),
        assignee_id: None,
        created_at: at(0),
        updated_at: at(0),
    }
}

pub fn notification(id: &str, user_id: &str, minute: i64) -> Notification {
    Notification {
        id: id.into(),
        user_id: user_id.into(),
        kind: NotificationKind::Mention,
        title: "You were mentioned".into(),
        body: format!("notification {id}"),
        entity_id: None,
        read: false,
        created_at: at(minute),
        updated_at: at(minute),
    }
}

pub fn invitation(id: &str, workspace_id: &str, email: &str) -> Invitation {
    Invitation {
        id: id.into(),
        workspace_id: workspace_id.into(),
        inviter_id: "u-1".into(),
        invitee_email: email.into(),
        invitee_id: None,
        status: InvitationStatus::Pending,
        expires_at: None,
        created_at: at(0),
        updated_at: at(0),
    }
}
