use rusqlite::types::Value;
use rusqlite::{params, Row};
use teamhub_shared::{EntityKind, Sprint, SprintStatus};

use crate::database::Database;
use crate::error::Result;
use crate::record::{
    opt_text, opt_timestamp, read_enum, read_opt_ts, read_ts, text, timestamp, Record,
};

impl Record for Sprint {
    const KIND: EntityKind = EntityKind::Sprint;
    const TABLE: &'static str = "sprints";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "workspace_id",
        "name",
        "goal",
        "status",
        "start_date",
        "end_date",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "start_date DESC, created_at DESC";

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.workspace_id),
            text(&self.name),
            opt_text(self.goal.as_deref()),
            text(self.status.as_str()),
            opt_timestamp(self.start_date.as_ref()),
            opt_timestamp(self.end_date.as_ref()),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Sprint {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            name: row.get(2)?,
            goal: row.get(3)?,
            status: read_enum(row, 4)?,
            start_date: read_opt_ts(row, 5)?,
            end_date: read_opt_ts(row, 6)?,
            created_at: read_ts(row, 7)?,
            updated_at: read_ts(row, 8)?,
        })
    }
}

impl Database {
    pub fn sprints_for_workspace(&self, workspace_id: &str) -> Result<Vec<Sprint>> {
        self.query_where("workspace_id = ?1", params![workspace_id])
    }

    /// The running sprint of a workspace. If the backend reports more than
    /// one, the most recently started wins.
    pub fn active_sprint(&self, workspace_id: &str) -> Result<Option<Sprint>> {
        Ok(self
            .query_where::<Sprint, _>(
                "workspace_id = ?1 AND status = ?2",
                params![workspace_id, SprintStatus::Active.as_str()],
            )?
            .into_iter()
            .next())
    }
}
