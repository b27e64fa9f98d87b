//! Per-scope sync bookkeeping.
//!
//! A scope names one remotely-pulled list, e.g. `workspaces`,
//! `workspace:<id>:tasks` or `channel:<id>:messages`. Paged scopes also
//! remember the next page to request and whether the remote ran out.

use chrono::{DateTime, Duration, Utc};
use rusqlite::params;

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::record::read_ts;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncState {
    pub scope: String,
    pub last_synced_at: DateTime<Utc>,
    pub next_page: u32,
    /// The last page fetched for this scope came back short.
    pub exhausted: bool,
}

impl SyncState {
    /// Whether the scope was pulled less than `max_age` ago.
    pub fn is_fresh(&self, max_age: Duration, now: DateTime<Utc>) -> bool {
        now - self.last_synced_at < max_age
    }
}

impl Database {
    pub fn sync_state(&self, scope: &str) -> Result<Option<SyncState>> {
        let result = self.conn().query_row(
            "SELECT scope, last_synced_at, next_page, exhausted FROM sync_state WHERE scope = ?1",
            params![scope],
            |row| {
                Ok(SyncState {
                    scope: row.get(0)?,
                    last_synced_at: read_ts(row, 1)?,
                    next_page: row.get(2)?,
                    exhausted: row.get(3)?,
                })
            },
        );
        match result {
            Ok(state) => Ok(Some(state)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Sqlite(e)),
        }
    }

    /// Record a full (unpaged) pull of `scope`.
    pub fn mark_synced(&self, scope: &str) -> Result<()> {
        self.record_page(scope, 0, true)
    }

    /// Record that a page was fetched: `next_page` is the page to ask for
    /// next and `exhausted` says whether the remote has more.
    pub fn record_page(&self, scope: &str, next_page: u32, exhausted: bool) -> Result<()> {
        self.conn().execute(
            "INSERT INTO sync_state (scope, last_synced_at, next_page, exhausted)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(scope) DO UPDATE SET
                last_synced_at = excluded.last_synced_at,
                next_page = excluded.next_page,
                exhausted = excluded.exhausted",
            params![scope, Utc::now().to_rfc3339(), next_page, exhausted],
        )?;
        Ok(())
    }

    /// Forget the paging position of a scope so the next load starts over.
    pub fn reset_sync_state(&self, scope: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute("DELETE FROM sync_state WHERE scope = ?1", params![scope])?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_page_overwrites_previous_position() {
        let db = Database::open_in_memory().unwrap();
        assert!(db.sync_state("channel:c-1:messages").unwrap().is_none());

        db.record_page("channel:c-1:messages", 1, false).unwrap();
        db.record_page("channel:c-1:messages", 2, true).unwrap();

        let state = db.sync_state("channel:c-1:messages").unwrap().unwrap();
        assert_eq!(state.next_page, 2);
        assert!(state.exhausted);
        assert!(state.is_fresh(Duration::minutes(5), Utc::now()));

        assert!(db.reset_sync_state("channel:c-1:messages").unwrap());
        assert!(db.sync_state("channel:c-1:messages").unwrap().is_none());
    }

    #[test]
    fn staleness() {
        let state = SyncState {
            scope: "workspaces".into(),
            last_synced_at: Utc::now() - Duration::hours(2),
            next_page: 0,
            exhausted: true,
        };
        assert!(!state.is_fresh(Duration::hours(1), Utc::now()));
    }
}
