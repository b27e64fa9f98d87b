//! Generic cache operations.
//!
//! Every cached entity implements [`Record`]: its table, its columns (the
//! first one is always `id`), how to bind its fields and how to map a row
//! back. The typed CRUD helpers on [`Database`] are written once against the
//! trait; entity modules add only their specific queries.

use std::collections::HashSet;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use rusqlite::types::{Type, Value};
use rusqlite::{params, params_from_iter, Params, Row};
use teamhub_shared::EntityKind;

use crate::database::Database;
use crate::error::{Result, StoreError};

/// A row type stored in its own table.
pub trait Record: Sized {
    const KIND: EntityKind;
    const TABLE: &'static str;
    /// Column names in binding order. `COLUMNS[0]` must be `"id"`.
    const COLUMNS: &'static [&'static str];
    /// `ORDER BY` clause used by [`Database::list_all`].
    const ORDER_BY: &'static str = "created_at DESC";
    /// Local-only columns the server copy never carries. An upsert with NULL
    /// keeps the cached value.
    const STICKY_COLUMNS: &'static [&'static str] = &[];

    fn id(&self) -> &str;

    /// Values for [`Record::COLUMNS`], in the same order.
    fn values(&self) -> Vec<Value>;

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self>;
}

/// Outcome of [`Database::replace_scope`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScopeReplace {
    pub upserted: usize,
    pub removed: usize,
}

fn select_sql<R: Record>() -> String {
    format!("SELECT {} FROM {}", R::COLUMNS.join(", "), R::TABLE)
}

fn upsert_sql<R: Record>() -> String {
    let placeholders: Vec<String> = (1..=R::COLUMNS.len()).map(|i| format!("?{i}")).collect();
    let updates: Vec<String> = R::COLUMNS[1..]
        .iter()
        .map(|c| {
            if R::STICKY_COLUMNS.contains(c) {
                format!("{c} = COALESCE(excluded.{c}, {table}.{c})", table = R::TABLE)
            } else {
                format!("{c} = excluded.{c}")
            }
        })
        .collect();
    format!(
        "INSERT INTO {} ({}) VALUES ({}) ON CONFLICT(id) DO UPDATE SET {}",
        R::TABLE,
        R::COLUMNS.join(", "),
        placeholders.join(", "),
        updates.join(", "),
    )
}

impl Database {
    // ------------------------------------------------------------------
    // Write
    // ------------------------------------------------------------------

    /// Insert a record or overwrite the cached copy with the same id.
    pub fn upsert<R: Record>(&self, record: &R) -> Result<()> {
        self.conn()
            .execute(&upsert_sql::<R>(), params_from_iter(record.values()))
            .map_err(StoreError::from_query)?;
        Ok(())
    }

    /// Upsert a batch inside one transaction.
    pub fn upsert_all<R: Record>(&self, records: &[R]) -> Result<usize> {
        let tx = self.conn().unchecked_transaction()?;
        {
            let mut stmt = tx.prepare_cached(&upsert_sql::<R>())?;
            for record in records {
                stmt.execute(params_from_iter(record.values()))
                    .map_err(StoreError::from_query)?;
            }
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// Make the cached rows of one scope match `records` exactly.
    ///
    /// Rows whose `scope_column` equals `scope_value` and whose id is not in
    /// `records` are deleted; everything in `records` is upserted. Both
    /// happen in one transaction.
    pub fn replace_scope<R: Record>(
        &self,
        scope_column: &'static str,
        scope_value: &str,
        records: &[R],
    ) -> Result<ScopeReplace> {
        let outcome = self.replace_rows(Some((scope_column, scope_value)), records)?;

        tracing::debug!(
            table = R::TABLE,
            scope = %scope_value,
            upserted = outcome.upserted,
            removed = outcome.removed,
            "replaced cached scope"
        );

        Ok(outcome)
    }

    /// Like [`Database::replace_scope`] over the whole table.
    pub fn replace_all<R: Record>(&self, records: &[R]) -> Result<ScopeReplace> {
        self.replace_rows(None, records)
    }

    fn replace_rows<R: Record>(
        &self,
        scope: Option<(&'static str, &str)>,
        records: &[R],
    ) -> Result<ScopeReplace> {
        let keep: HashSet<&str> = records.iter().map(|r| r.id()).collect();

        let tx = self.conn().unchecked_transaction()?;
        let existing: Vec<String> = {
            let mut ids = Vec::new();
            match scope {
                Some((column, value)) => {
                    let mut stmt =
                        tx.prepare(&format!("SELECT id FROM {} WHERE {column} = ?1", R::TABLE))?;
                    for id in stmt.query_map(params![value], |row| row.get(0))? {
                        ids.push(id?);
                    }
                }
                None => {
                    let mut stmt = tx.prepare(&format!("SELECT id FROM {}", R::TABLE))?;
                    for id in stmt.query_map([], |row| row.get(0))? {
                        ids.push(id?);
                    }
                }
            }
            ids
        };

        let mut removed = 0;
        {
            let mut delete = tx.prepare(&format!("DELETE FROM {} WHERE id = ?1", R::TABLE))?;
            for id in existing.iter().filter(|id| !keep.contains(id.as_str())) {
                removed += delete.execute(params![id])?;
            }
            let mut upsert = tx.prepare_cached(&upsert_sql::<R>())?;
            for record in records {
                upsert
                    .execute(params_from_iter(record.values()))
                    .map_err(StoreError::from_query)?;
            }
        }
        tx.commit()?;

        Ok(ScopeReplace {
            upserted: records.len(),
            removed,
        })
    }

    /// Delete a record by id.  Returns `true` if a row was deleted.
    pub fn delete<R: Record>(&self, id: &str) -> Result<bool> {
        let affected = self
            .conn()
            .execute(&format!("DELETE FROM {} WHERE id = ?1", R::TABLE), params![id])?;
        Ok(affected > 0)
    }

    // ------------------------------------------------------------------
    // Read
    // ------------------------------------------------------------------

    /// Fetch a single record by id.
    pub fn get<R: Record>(&self, id: &str) -> Result<R> {
        self.conn()
            .query_row(
                &format!("{} WHERE id = ?1", select_sql::<R>()),
                params![id],
                R::from_row,
            )
            .map_err(StoreError::from_query)
    }

    /// Like [`Database::get`] but `None` when missing.
    pub fn find<R: Record>(&self, id: &str) -> Result<Option<R>> {
        match self.get(id) {
            Ok(r) => Ok(Some(r)),
            Err(StoreError::NotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Every cached record of a type, in [`Record::ORDER_BY`] order.
    pub fn list_all<R: Record>(&self) -> Result<Vec<R>> {
        self.query_where("1 = 1", [])
    }

    /// Run `SELECT <columns> FROM <table> WHERE <filter> ORDER BY <default>`.
    pub(crate) fn query_where<R: Record, P: Params>(&self, filter: &str, params: P) -> Result<Vec<R>> {
        self.query_sql(
            &format!("{} WHERE {filter} ORDER BY {}", select_sql::<R>(), R::ORDER_BY),
            params,
        )
    }

    /// Run `SELECT <columns> FROM <table> <tail>` where `tail` carries its own
    /// filter, order and limit.
    pub(crate) fn query_tail<R: Record, P: Params>(&self, tail: &str, params: P) -> Result<Vec<R>> {
        self.query_sql(&format!("{} {tail}", select_sql::<R>()), params)
    }

    fn query_sql<R: Record, P: Params>(&self, sql: &str, params: P) -> Result<Vec<R>> {
        let mut stmt = self.conn().prepare(sql)?;
        let rows = stmt.query_map(params, R::from_row)?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    pub(crate) fn count_where<R: Record, P: Params>(&self, filter: &str, params: P) -> Result<u64> {
        let n: i64 = self.conn().query_row(
            &format!("SELECT COUNT(*) FROM {} WHERE {filter}", R::TABLE),
            params,
            |row| row.get(0),
        )?;
        Ok(n as u64)
    }
}

// ---------------------------------------------------------------------------
// Binding helpers
// ---------------------------------------------------------------------------

pub(crate) fn text(s: &str) -> Value {
    Value::Text(s.to_owned())
}

pub(crate) fn opt_text(s: Option<&str>) -> Value {
    s.map_or(Value::Null, text)
}

pub(crate) fn timestamp(t: &DateTime<Utc>) -> Value {
    Value::Text(t.to_rfc3339())
}

pub(crate) fn opt_timestamp(t: Option<&DateTime<Utc>>) -> Value {
    t.map_or(Value::Null, timestamp)
}

pub(crate) fn flag(b: bool) -> Value {
    Value::Integer(i64::from(b))
}

pub(crate) fn opt_int(n: Option<u32>) -> Value {
    n.map_or(Value::Null, |n| Value::Integer(i64::from(n)))
}

/// `%query%` for a `LIKE ?n ESCAPE '\\'` clause, with the wildcards in
/// `query` matched literally.
pub(crate) fn contains_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.trim().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

pub(crate) fn id_list(ids: &[String]) -> Value {
    Value::Text(serde_json::to_string(ids).unwrap_or_else(|_| "[]".to_string()))
}

// ---------------------------------------------------------------------------
// Row helpers
// ---------------------------------------------------------------------------

fn conversion<E>(idx: usize, e: E) -> rusqlite::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e))
}

pub(crate) fn read_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<DateTime<Utc>> {
    let s: String = row.get(idx)?;
    DateTime::parse_from_rfc3339(&s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| conversion(idx, e))
}

pub(crate) fn read_opt_ts(row: &Row<'_>, idx: usize) -> rusqlite::Result<Option<DateTime<Utc>>> {
    let s: Option<String> = row.get(idx)?;
    s.map(|s| {
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| conversion(idx, e))
    })
    .transpose()
}

pub(crate) fn read_enum<E>(row: &Row<'_>, idx: usize) -> rusqlite::Result<E>
where
    E: FromStr<Err = teamhub_shared::ParseEnumError>,
{
    let s: String = row.get(idx)?;
    s.parse().map_err(|e| conversion(idx, e))
}

pub(crate) fn read_id_list(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let s: String = row.get(idx)?;
    serde_json::from_str(&s).map_err(|e| conversion(idx, e))
}
