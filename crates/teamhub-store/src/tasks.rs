//! Cached [`Task`] records and the board-style queries over them.

use rusqlite::types::Value;
use rusqlite::{params, Row};
use teamhub_shared::{EntityKind, Task, WorkStatus};

use crate::database::Database;
use crate::error::Result;
use crate::record::{
    opt_int, opt_text, opt_timestamp, read_enum, read_opt_ts, read_ts, text, timestamp, Record,
};

impl Record for Task {
    const KIND: EntityKind = EntityKind::Task;
    const TABLE: &'static str = "tasks";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "workspace_id",
        "epic_id",
        "sprint_id",
        "title",
        "description",
        "status",
        "priority",
        "assignee_id",
        "reporter_id",
        "due_date",
        "story_points",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "updated_at DESC, id ASC";

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.workspace_id),
            opt_text(self.epic_id.as_deref()),
            opt_text(self.sprint_id.as_deref()),
            text(&self.title),
            opt_text(self.description.as_deref()),
            text(self.status.as_str()),
            text(self.priority.as_str()),
            opt_text(self.assignee_id.as_deref()),
            text(&self.reporter_id),
            opt_timestamp(self.due_date.as_ref()),
            opt_int(self.story_points),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Task {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            epic_id: row.get(2)?,
            sprint_id: row.get(3)?,
            title: row.get(4)?,
            description: row.get(5)?,
            status: read_enum(row, 6)?,
            priority: read_enum(row, 7)?,
            assignee_id: row.get(8)?,
            reporter_id: row.get(9)?,
            due_date: read_opt_ts(row, 10)?,
            story_points: row.get(11)?,
            created_at: read_ts(row, 12)?,
            updated_at: read_ts(row, 13)?,
        })
    }
}

impl Database {
    pub fn tasks_for_workspace(&self, workspace_id: &str) -> Result<Vec<Task>> {
        self.query_where("workspace_id = ?1", params![workspace_id])
    }

    pub fn tasks_for_epic(&self, epic_id: &str) -> Result<Vec<Task>> {
        self.query_where("epic_id = ?1", params![epic_id])
    }

    pub fn tasks_for_sprint(&self, sprint_id: &str) -> Result<Vec<Task>> {
        self.query_where("sprint_id = ?1", params![sprint_id])
    }

    /// Tasks assigned to a user that are not done yet, earliest due first.
    pub fn open_tasks_for_assignee(&self, assignee_id: &str) -> Result<Vec<Task>> {
        self.query_tail(
            "WHERE assignee_id = ?1 AND status != ?2
             ORDER BY due_date IS NULL, due_date ASC, updated_at DESC",
            params![assignee_id, WorkStatus::Done.as_str()],
        )
    }

    pub fn tasks_with_status(&self, workspace_id: &str, status: WorkStatus) -> Result<Vec<Task>> {
        self.query_where(
            "workspace_id = ?1 AND status = ?2",
            params![workspace_id, status.as_str()],
        )
    }
}
