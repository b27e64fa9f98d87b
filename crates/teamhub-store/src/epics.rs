use rusqlite::types::Value;
use rusqlite::{params, Row};
use teamhub_shared::{EntityKind, Epic};

use crate::database::Database;
use crate::error::Result;
use crate::record::{
    opt_text, opt_timestamp, read_enum, read_opt_ts, read_ts, text, timestamp, Record,
};

impl Record for Epic {
    const KIND: EntityKind = EntityKind::Epic;
    const TABLE: &'static str = "epics";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "workspace_id",
        "title",
        "description",
        "status",
        "start_date",
        "due_date",
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
            text(&self.title),
            opt_text(self.description.as_deref()),
            text(self.status.as_str()),
            opt_timestamp(self.start_date.as_ref()),
            opt_timestamp(self.due_date.as_ref()),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Epic {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            title: row.get(2)?,
            description: row.get(3)?,
            status: read_enum(row, 4)?,
            start_date: read_opt_ts(row, 5)?,
            due_date: read_opt_ts(row, 6)?,
            created_at: read_ts(row, 7)?,
            updated_at: read_ts(row, 8)?,
        })
    }
}

impl Database {
    pub fn epics_for_workspace(&self, workspace_id: &str) -> Result<Vec<Epic>> {
        self.query_where("workspace_id = ?1", params![workspace_id])
    }

    /// Percentage of an epic's tasks that are done, `None` when it has no tasks.
    pub fn epic_progress(&self, epic_id: &str) -> Result<Option<u8>> {
        let (total, done): (i64, i64) = self.conn().query_row(
            "SELECT COUNT(*), COALESCE(SUM(status = 'done'), 0) FROM tasks WHERE epic_id = ?1",
            params![epic_id],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        if total == 0 {
            return Ok(None);
        }
        Ok(Some(((done * 100) / total) as u8))
    }
}

#[cfg(test)]
mod tests {
    use teamhub_shared::{fixtures, WorkStatus};

    use super::*;

    #[test]
    fn progress_counts_done_tasks() {
        let db = Database::open_in_memory().unwrap();
        db.upsert(&fixtures::epic("e-1", "w-1")).unwrap();
        assert_eq!(db.epic_progress("e-1").unwrap(), None);

        let tasks: Vec<_> = (0..4)
            .map(|i| {
                let mut t = fixtures::task(&format!("t-{i}"), "w-1");
                t.epic_id = Some("e-1".into());
                if i == 0 {
                    t.status = WorkStatus::Done;
                }
                t
            })
            .collect();
        db.upsert_all(&tasks).unwrap();

        assert_eq!(db.epic_progress("e-1").unwrap(), Some(25));
        assert_eq!(db.epics_for_workspace("w-1").unwrap().len(), 1);
    }
}
