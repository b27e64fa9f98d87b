//! Schema migrations, tracked with `PRAGMA user_version`.

pub mod v001_initial;
pub mod v002_sync_state;

use rusqlite::Connection;

use crate::error::{Result, StoreError};

type Step = fn(&Connection) -> rusqlite::Result<()>;

/// Ordered schema steps. Step `n` (zero-based) moves `user_version` to `n + 1`.
const STEPS: &[(&str, Step)] = &[
    ("v001_initial", v001_initial::up),
    ("v002_sync_state", v002_sync_state::up),
];

pub const CURRENT_VERSION: u32 = STEPS.len() as u32;

/// Apply every step above the database's `user_version`.
pub fn run_migrations(conn: &Connection) -> Result<()> {
    let current: u32 = conn.pragma_query_value(None, "user_version", |row| row.get(0))?;
    if current >= CURRENT_VERSION {
        tracing::debug!(version = current, "schema up to date");
        return Ok(());
    }

    for (index, (name, up)) in STEPS.iter().enumerate().skip(current as usize) {
        let version = index as u32 + 1;
        tracing::info!(migration = %name, version, "applying migration");
        up(conn).map_err(|e| StoreError::Migration(format!("{name}: {e}")))?;
        conn.pragma_update(None, "user_version", version)?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn migrations_reach_current_version_once() {
        let conn = Connection::open_in_memory().unwrap();
        run_migrations(&conn).unwrap();
        run_migrations(&conn).unwrap();

        let version: u32 = conn
            .pragma_query_value(None, "user_version", |row| row.get(0))
            .unwrap();
        assert_eq!(version, CURRENT_VERSION);
    }
}
