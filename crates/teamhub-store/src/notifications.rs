use chrono::Utc;
use rusqlite::types::Value;
use rusqlite::{params, Row};
use teamhub_shared::{EntityKind, Notification};

use crate::database::Database;
use crate::error::Result;
use crate::record::{flag, opt_text, read_enum, read_ts, text, timestamp, Record};

impl Record for Notification {
    const KIND: EntityKind = EntityKind::Notification;
    const TABLE: &'static str = "notifications";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "user_id",
        "kind",
        "title",
        "body",
        "entity_id",
        "read",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.user_id),
            text(self.kind.as_str()),
            text(&self.title),
            text(&self.body),
            opt_text(self.entity_id.as_deref()),
            flag(self.read),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Notification {
            id: row.get(0)?,
            user_id: row.get(1)?,
            kind: read_enum(row, 2)?,
            title: row.get(3)?,
            body: row.get(4)?,
            entity_id: row.get(5)?,
            read: row.get(6)?,
            created_at: read_ts(row, 7)?,
            updated_at: read_ts(row, 8)?,
        })
    }
}

impl Database {
    /// One page of a user's notifications, newest first.
    pub fn notifications_page(
        &self,
        user_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Notification>> {
        self.query_tail(
            "WHERE user_id = ?1 ORDER BY created_at DESC, id DESC LIMIT ?2 OFFSET ?3",
            params![user_id, limit, offset],
        )
    }

    pub fn unread_notification_count(&self, user_id: &str) -> Result<u64> {
        self.count_where::<Notification, _>("user_id = ?1 AND read = 0", params![user_id])
    }

    /// Returns `true` if the notification existed and was unread.
    pub fn mark_notification_read(&self, id: &str) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE notifications SET read = 1, updated_at = ?1 WHERE id = ?2 AND read = 0",
            params![Utc::now().to_rfc3339(), id],
        )?;
        Ok(affected > 0)
    }

    /// Returns the number of notifications flipped to read.
    pub fn mark_all_notifications_read(&self, user_id: &str) -> Result<usize> {
        Ok(self.conn().execute(
            "UPDATE notifications SET read = 1, updated_at = ?1 WHERE user_id = ?2 AND read = 0",
            params![Utc::now().to_rfc3339(), user_id],
        )?)
    }
}
