use rusqlite::types::Value;
use rusqlite::{params, Row};
use teamhub_shared::{Bug, BugStatus, EntityKind};

use crate::database::Database;
use crate::error::Result;
use crate::record::{opt_text, read_enum, read_ts, text, timestamp, Record};

impl Record for Bug {
    const KIND: EntityKind = EntityKind::Bug;
    const TABLE: &'static str = "bugs";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "workspace_id",
        "task_id",
        "title",
        "description",
        "severity",
        "status",
        "reporter_id",
        "assignee_id",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.workspace_id),
            opt_text(self.task_id.as_deref()),
            text(&self.title),
            opt_text(self.description.as_deref()),
            text(self.severity.as_str()),
            text(self.status.as_str()),
            text(&self.reporter_id),
            opt_text(self.assignee_id.as_deref()),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Bug {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            task_id: row.get(2)?,
            title: row.get(3)?,
            description: row.get(4)?,
            severity: read_enum(row, 5)?,
            status: read_enum(row, 6)?,
            reporter_id: row.get(7)?,
            assignee_id: row.get(8)?,
            created_at: read_ts(row, 9)?,
            updated_at: read_ts(row, 10)?,
        })
    }
}

impl Database {
    pub fn bugs_for_workspace(&self, workspace_id: &str) -> Result<Vec<Bug>> {
        self.query_where("workspace_id = ?1", params![workspace_id])
    }

    pub fn bugs_for_task(&self, task_id: &str) -> Result<Vec<Bug>> {
        self.query_where("task_id = ?1", params![task_id])
    }

    /// Open or in-progress bugs of a workspace.
    pub fn open_bugs(&self, workspace_id: &str) -> Result<Vec<Bug>> {
        self.query_where(
            "workspace_id = ?1 AND status IN (?2, ?3)",
            params![
                workspace_id,
                BugStatus::Open.as_str(),
                BugStatus::InProgress.as_str()
            ],
        )
    }
}
