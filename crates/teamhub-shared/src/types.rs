use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ParseEnumError;

/// Declares a closed enum that travels as a snake_case string, both on the
/// wire (serde) and in SQLite (`as_str` / `FromStr`).
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $($variant:ident => $text:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(#[serde(rename = $text)] $variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err(ParseEnumError {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

string_enum! {
    /// Visibility of a channel. `Direct` channels are two-person DMs.
    pub enum ChannelKind {
        Public => "public",
        Private => "private",
        Direct => "direct",
    }
}

string_enum! {
    /// Progress state shared by tasks and epics.
    pub enum WorkStatus {
        Todo => "todo",
        InProgress => "in_progress",
        InReview => "in_review",
        Done => "done",
    }
}

string_enum! {
    pub enum Priority {
        Low => "low",
        Medium => "medium",
        High => "high",
        Critical => "critical",
    }
}

string_enum! {
    pub enum SprintStatus {
        Planned => "planned",
        Active => "active",
        Completed => "completed",
    }
}

string_enum! {
    pub enum BugSeverity {
        Minor => "minor",
        Major => "major",
        Critical => "critical",
        Blocker => "blocker",
    }
}

string_enum! {
    pub enum BugStatus {
        Open => "open",
        InProgress => "in_progress",
        Resolved => "resolved",
        Closed => "closed",
    }
}

string_enum! {
    pub enum NotificationKind {
        Message => "message",
        Mention => "mention",
        TaskAssigned => "task_assigned",
        TaskUpdated => "task_updated",
        BugReported => "bug_reported",
        Invitation => "invitation",
        SprintStarted => "sprint_started",
        System => "system",
    }
}

string_enum! {
    pub enum InvitationStatus {
        Pending => "pending",
        Accepted => "accepted",
        Declined => "declined",
        Expired => "expired",
    }
}

impl Default for WorkStatus {
    fn default() -> Self {
        Self::Todo
    }
}

impl Default for Priority {
    fn default() -> Self {
        Self::Medium
    }
}

impl BugStatus {
    /// Whether the bug still needs work.
    pub fn is_open(&self) -> bool {
        matches!(self, Self::Open | Self::InProgress)
    }
}

/// One page of a paged list endpoint.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Page<T> {
    pub items: Vec<T>,
    /// Zero-based page index.
    pub page: u32,
    pub page_size: u32,
    /// Total number of items across all pages.
    pub total: u64,
}

impl<T> Page<T> {
    /// A page is the last one when it comes back short or reaches `total`.
    pub fn has_more(&self) -> bool {
        let seen = u64::from(self.page) * u64::from(self.page_size) + self.items.len() as u64;
        self.items.len() as u32 >= self.page_size && seen < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn enum_text_round_trips_through_serde_and_from_str() {
        for status in WorkStatus::ALL {
            let json = serde_json::to_string(status).unwrap();
            assert_eq!(json, format!("\"{}\"", status.as_str()));
            assert_eq!(status.as_str().parse::<WorkStatus>().unwrap(), *status);
        }
    }

    #[test]
    fn unknown_enum_text_is_rejected() {
        let err = "archived".parse::<SprintStatus>().unwrap_err();
        assert_eq!(err.kind, "SprintStatus");
        assert_eq!(err.value, "archived");
    }

    #[test]
    fn page_has_more() {
        let full = Page { items: vec![1, 2], page: 0, page_size: 2, total: 5 };
        assert!(full.has_more());

        let short = Page { items: vec![5], page: 2, page_size: 2, total: 5 };
        assert!(!short.has_more());

        let exact_end = Page { items: vec![3, 4], page: 1, page_size: 2, total: 4 };
        assert!(!exact_end.has_more());
    }
}
