//! Workspace report computed from cached rows, used when the reports
//! endpoint cannot be reached.

use std::collections::BTreeMap;

use rusqlite::params;
use teamhub_shared::{WorkStatus, WorkspaceReport};

use crate::database::Database;
use crate::error::Result;

impl Database {
    pub fn local_report(&self, workspace_id: &str) -> Result<WorkspaceReport> {
        let mut tasks_by_status = BTreeMap::new();
        let mut total_tasks = 0u64;
        let mut completed_tasks = 0u64;

        {
            let mut stmt = self.conn().prepare(
                "SELECT status, COUNT(*) FROM tasks WHERE workspace_id = ?1 GROUP BY status",
            )?;
            let rows = stmt.query_map(params![workspace_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?))
            })?;
            for row in rows {
                let (status, count) = row?;
                let count = count as u64;
                total_tasks += count;
                if status == WorkStatus::Done.as_str() {
                    completed_tasks += count;
                }
                tasks_by_status.insert(status, count);
            }
        }

        let story_points_done: i64 = self.conn().query_row(
            "SELECT COALESCE(SUM(story_points), 0) FROM tasks WHERE workspace_id = ?1 AND status = ?2",
            params![workspace_id, WorkStatus::Done.as_str()],
            |row| row.get(0),
        )?;

        let open_bugs = self.open_bugs(workspace_id)?.len() as u64;
        let active_sprint_id = self.active_sprint(workspace_id)?.map(|s| s.id);

        Ok(WorkspaceReport {
            workspace_id: workspace_id.to_string(),
            total_tasks,
            completed_tasks,
            tasks_by_status,
            open_bugs,
            active_sprint_id,
            story_points_done: story_points_done as u64,
        })
    }
}
