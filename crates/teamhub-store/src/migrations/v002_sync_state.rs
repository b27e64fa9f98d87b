//! v002 -- Sync bookkeeping.
//!
//! One row per sync scope (e.g. `channel:<id>:messages`) recording when it
//! was last pulled and which page to request next.

use rusqlite::Connection;

const UP_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS sync_state (
    scope          TEXT PRIMARY KEY NOT NULL,
    last_synced_at TEXT NOT NULL,              -- RFC-3339
    next_page      INTEGER NOT NULL DEFAULT 0,
    exhausted      INTEGER NOT NULL DEFAULT 0  -- boolean 0/1: no more pages
);
"#;

pub fn up(conn: &Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(UP_SQL)
}
