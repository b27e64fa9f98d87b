use rusqlite::types::Value;
use rusqlite::{params, Row};
use teamhub_shared::{EntityKind, Message};

use crate::database::Database;
use crate::error::Result;
use crate::record::{contains_pattern, flag, opt_text, read_ts, text, timestamp, Record};

impl Record for Message {
    const KIND: EntityKind = EntityKind::Message;
    const TABLE: &'static str = "messages";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "channel_id",
        "sender_id",
        "content",
        "attachment_url",
        "reply_to_id",
        "edited",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.channel_id),
            text(&self.sender_id),
            text(&self.content),
            opt_text(self.attachment_url.as_deref()),
            opt_text(self.reply_to_id.as_deref()),
            flag(self.edited),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Message {
            id: row.get(0)?,
            channel_id: row.get(1)?,
            sender_id: row.get(2)?,
            content: row.get(3)?,
            attachment_url: row.get(4)?,
            reply_to_id: row.get(5)?,
            edited: row.get(6)?,
            created_at: read_ts(row, 7)?,
            updated_at: read_ts(row, 8)?,
        })
    }
}

impl Database {
    /// One page of a channel's messages, newest first.
    pub fn get_messages_for_channel(
        &self,
        channel_id: &str,
        limit: u32,
        offset: u32,
    ) -> Result<Vec<Message>> {
        self.query_tail(
            "WHERE channel_id = ?1
             ORDER BY created_at DESC, id DESC
             LIMIT ?2 OFFSET ?3",
            params![channel_id, limit, offset],
        )
    }

    pub fn latest_message(&self, channel_id: &str) -> Result<Option<Message>> {
        Ok(self.get_messages_for_channel(channel_id, 1, 0)?.into_iter().next())
    }

    pub fn count_messages(&self, channel_id: &str) -> Result<u64> {
        self.count_where::<Message, _>("channel_id = ?1", params![channel_id])
    }

    /// Case-insensitive content search, newest first.
    pub fn search_messages(
        &self,
        query: &str,
        channel_id: Option<&str>,
        limit: u32,
    ) -> Result<Vec<Message>> {
        let pattern = contains_pattern(query);
        match channel_id {
            Some(cid) => self.query_tail(
                "WHERE content LIKE ?1 ESCAPE '\\' AND channel_id = ?2 ORDER BY created_at DESC LIMIT ?3",
                params![pattern, cid, limit],
            ),
            None => self.query_tail(
                "WHERE content LIKE ?1 ESCAPE '\\' ORDER BY created_at DESC LIMIT ?2",
                params![pattern, limit],
            ),
        }
    }

    /// Drop every cached message of a channel (e.g. after the channel was
    /// deleted remotely).
    pub fn delete_messages_for_channel(&self, channel_id: &str) -> Result<usize> {
        Ok(self.conn().execute(
            "DELETE FROM messages WHERE channel_id = ?1",
            params![channel_id],
        )?)
    }
}
