//! Observable wrapper around the store.
//!
//! [`LocalCache`] serialises access to the single SQLite connection and
//! broadcasts a [`CacheChange`] after every successful write, which is what
//! state holders listen to. Repositories and the real-time bridge write
//! through it; nothing else touches the [`Database`] directly.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::debug;

use teamhub_shared::constants::CACHE_CHANGE_CAPACITY;
use teamhub_shared::EntityKind;
use teamhub_store::{Database, Record, ScopeReplace};

use crate::error::{ClientError, Result};

/// A write that happened in the cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheChange {
    Upserted { kind: EntityKind, id: String },
    Deleted { kind: EntityKind, id: String },
    /// Many rows of one kind changed at once (batch upsert, scope replace,
    /// bulk status update). `scope` is the parent key when there is one.
    Replaced {
        kind: EntityKind,
        scope: Option<String>,
    },
    /// Everything was wiped (sign-out).
    Cleared,
}

impl CacheChange {
    /// Whether a reader of `kind` should re-read after this change.
    pub fn touches(&self, kind: EntityKind) -> bool {
        match self {
            CacheChange::Upserted { kind: k, .. }
            | CacheChange::Deleted { kind: k, .. }
            | CacheChange::Replaced { kind: k, .. } => *k == kind,
            CacheChange::Cleared => true,
        }
    }
}

/// Shared handle to the local cache. Cheap to clone.
#[derive(Clone)]
pub struct LocalCache {
    db: Arc<Mutex<Database>>,
    changes: broadcast::Sender<CacheChange>,
}

impl LocalCache {
    pub fn new(db: Database) -> Self {
        let (changes, _) = broadcast::channel(CACHE_CHANGE_CAPACITY);
        Self {
            db: Arc::new(Mutex::new(db)),
            changes,
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Database::open_in_memory()?))
    }

    /// Receive every change made after this call.
    pub fn subscribe(&self) -> broadcast::Receiver<CacheChange> {
        self.changes.subscribe()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Database>> {
        self.db.lock().map_err(|_| ClientError::LockPoisoned)
    }

    /// Run a read-only query against the database.
    pub fn read<T>(&self, f: impl FnOnce(&Database) -> teamhub_store::Result<T>) -> Result<T> {
        let db = self.lock()?;
        Ok(f(&db)?)
    }

    /// Run a write nobody observes: sync cursors, timestamps, the signed-in
    /// session. Nothing is broadcast.
    pub fn write_untracked<T>(
        &self,
        f: impl FnOnce(&Database) -> teamhub_store::Result<T>,
    ) -> Result<T> {
        let db = self.lock()?;
        Ok(f(&db)?)
    }

    /// Run a write and broadcast `change` if it succeeds.
    pub fn write<T>(
        &self,
        change: CacheChange,
        f: impl FnOnce(&Database) -> teamhub_store::Result<T>,
    ) -> Result<T> {
        let value = {
            let db = self.lock()?;
            f(&db)?
        };
        self.notify(change);
        Ok(value)
    }

    fn notify(&self, change: CacheChange) {
        debug!(change = ?change, "Cache changed");
        // No receivers is fine: nobody is watching.
        let _ = self.changes.send(change);
    }

    // -- typed helpers ---------------------------------------------------------

    pub fn upsert<R: Record>(&self, record: &R) -> Result<()> {
        self.write(
            CacheChange::Upserted {
                kind: R::KIND,
                id: record.id().to_string(),
            },
            |db| db.upsert(record),
        )
    }

    pub fn upsert_all<R: Record>(&self, records: &[R]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }
        self.write(
            CacheChange::Replaced {
                kind: R::KIND,
                scope: None,
            },
            |db| db.upsert_all(records),
        )
    }

    /// See [`Database::replace_scope`].
    pub fn replace_scope<R: Record>(
        &self,
        scope_column: &'static str,
        scope_value: &str,
        records: &[R],
    ) -> Result<ScopeReplace> {
        self.write(
            CacheChange::Replaced {
                kind: R::KIND,
                scope: Some(scope_value.to_string()),
            },
            |db| db.replace_scope(scope_column, scope_value, records),
        )
    }

    pub fn replace_all<R: Record>(&self, records: &[R]) -> Result<ScopeReplace> {
        self.write(
            CacheChange::Replaced {
                kind: R::KIND,
                scope: None,
            },
            |db| db.replace_all(records),
        )
    }

    /// Returns `true` if the row existed. No change is broadcast otherwise.
    pub fn delete<R: Record>(&self, id: &str) -> Result<bool> {
        let removed = {
            let db = self.lock()?;
            db.delete::<R>(id)?
        };
        if removed {
            self.notify(CacheChange::Deleted {
                kind: R::KIND,
                id: id.to_string(),
            });
        }
        Ok(removed)
    }

    pub fn clear(&self) -> Result<()> {
        self.write(CacheChange::Cleared, |db| db.clear_all())
    }
}
