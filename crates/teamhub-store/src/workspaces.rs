use rusqlite::types::Value;
use rusqlite::{params, Row};
use teamhub_shared::{EntityKind, Workspace};

use crate::database::Database;
use crate::error::Result;
use crate::record::{id_list, opt_text, read_id_list, read_ts, text, timestamp, Record};

impl Record for Workspace {
    const KIND: EntityKind = EntityKind::Workspace;
    const TABLE: &'static str = "workspaces";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "name",
        "description",
        "owner_id",
        "avatar_url",
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
            text(&self.name),
            opt_text(self.description.as_deref()),
            text(&self.owner_id),
            opt_text(self.avatar_url.as_deref()),
            id_list(&self.member_ids),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Workspace {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            owner_id: row.get(3)?,
            avatar_url: row.get(4)?,
            member_ids: read_id_list(row, 5)?,
            created_at: read_ts(row, 6)?,
            updated_at: read_ts(row, 7)?,
        })
    }
}

impl Database {
    /// Workspaces owned by `user_id`.
    pub fn workspaces_owned_by(&self, user_id: &str) -> Result<Vec<Workspace>> {
        self.query_where("owner_id = ?1", params![user_id])
    }
}

#[cfg(test)]
mod tests {
    use teamhub_shared::fixtures;

    use super::*;

    #[test]
    fn list_is_name_ordered_and_member_ids_survive() {
        let db = Database::open_in_memory().unwrap();
        let mut b = fixtures::workspace("w-b");
        b.name = "beta".into();
        let mut a = fixtures::workspace("w-a");
        a.name = "Alpha".into();
        db.upsert_all(&[b, a]).unwrap();

        let all = db.list_all::<Workspace>().unwrap();
        assert_eq!(all[0].name, "Alpha");
        assert_eq!(all[1].name, "beta");
        assert_eq!(all[0].member_ids, vec!["u-1".to_string(), "u-2".to_string()]);

        assert_eq!(db.workspaces_owned_by("u-1").unwrap().len(), 2);
        assert!(db.workspaces_owned_by("u-2").unwrap().is_empty());
    }
}
