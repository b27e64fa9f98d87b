//! Cached [`Channel`] records, including two-person direct channels.

use rusqlite::types::Value;
use rusqlite::{params, Row};
use teamhub_shared::{Channel, ChannelKind, EntityKind};

use crate::database::Database;
use crate::error::Result;
use crate::record::{id_list, opt_text, read_enum, read_id_list, read_ts, text, timestamp, Record};

impl Record for Channel {
    const KIND: EntityKind = EntityKind::Channel;
    const TABLE: &'static str = "channels";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "workspace_id",
        "name",
        "description",
        "kind",
        "member_ids",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "name COLLATE NOCASE ASC";

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.workspace_id),
            text(&self.name),
            opt_text(self.description.as_deref()),
            text(self.kind.as_str()),
            id_list(&self.member_ids),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Channel {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            name: row.get(2)?,
            description: row.get(3)?,
            kind: read_enum(row, 4)?,
            member_ids: read_id_list(row, 5)?,
            created_at: read_ts(row, 6)?,
            updated_at: read_ts(row, 7)?,
        })
    }
}

impl Database {
    /// Public and private channels of a workspace, ordered by name.
    pub fn channels_for_workspace(&self, workspace_id: &str) -> Result<Vec<Channel>> {
        self.query_where(
            "workspace_id = ?1 AND kind != ?2",
            params![workspace_id, ChannelKind::Direct.as_str()],
        )
    }

    /// Direct channels of a workspace, most recently active first.
    pub fn direct_channels(&self, workspace_id: &str) -> Result<Vec<Channel>> {
        self.query_tail(
            "WHERE workspace_id = ?1 AND kind = ?2 ORDER BY updated_at DESC",
            params![workspace_id, ChannelKind::Direct.as_str()],
        )
    }

    /// The cached direct channel between two users in a workspace, if any.
    pub fn find_direct_channel(
        &self,
        workspace_id: &str,
        user_a: &str,
        user_b: &str,
    ) -> Result<Option<Channel>> {
        Ok(self
            .direct_channels(workspace_id)?
            .into_iter()
            .find(|c| {
                c.member_ids.len() == 2
                    && c.member_ids.iter().any(|m| m == user_a)
                    && c.member_ids.iter().any(|m| m == user_b)
            }))
    }
}

#[cfg(test)]
mod tests {
    use teamhub_shared::fixtures;

    use super::*;

    #[test]
    fn workspace_listing_excludes_direct_channels() {
        let db = Database::open_in_memory().unwrap();
        db.upsert_all(&[
            fixtures::channel("general", "w-1", ChannelKind::Public),
            fixtures::channel("staff", "w-1", ChannelKind::Private),
            fixtures::channel("dm", "w-1", ChannelKind::Direct),
            fixtures::channel("other", "w-2", ChannelKind::Public),
        ])
        .unwrap();

        let names: Vec<String> = db
            .channels_for_workspace("w-1")
            .unwrap()
            .into_iter()
            .map(|c| c.id)
            .collect();
        assert_eq!(names, vec!["general".to_string(), "staff".to_string()]);
        assert_eq!(db.direct_channels("w-1").unwrap().len(), 1);
    }

    #[test]
    fn finds_direct_channel_by_member_pair() {
        let db = Database::open_in_memory().unwrap();
        let mut dm = fixtures::channel("dm-1", "w-1", ChannelKind::Direct);
        dm.member_ids = vec!["u-1".into(), "u-2".into()];
        db.upsert(&dm).unwrap();

        let found = db.find_direct_channel("w-1", "u-2", "u-1").unwrap();
        assert_eq!(found.map(|c| c.id).as_deref(), Some("dm-1"));
        assert!(db.find_direct_channel("w-1", "u-1", "u-3").unwrap().is_none());
    }
}
