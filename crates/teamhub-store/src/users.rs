//! Cached [`User`] profiles.

use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Row};
use teamhub_shared::{EntityKind, User, Workspace};

use crate::database::Database;
use crate::error::Result;
use crate::record::{contains_pattern, opt_text, read_ts, text, timestamp, Record};

impl Record for User {
    const KIND: EntityKind = EntityKind::User;
    const TABLE: &'static str = "users";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "account_id",
        "name",
        "email",
        "phone",
        "avatar_url",
        "title",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "name COLLATE NOCASE ASC";
    const STICKY_COLUMNS: &'static [&'static str] = &["account_id"];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            opt_text(self.account_id.as_deref()),
            text(&self.name),
            text(&self.email),
            opt_text(self.phone.as_deref()),
            opt_text(self.avatar_url.as_deref()),
            opt_text(self.title.as_deref()),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(User {
            id: row.get(0)?,
            account_id: row.get(1)?,
            name: row.get(2)?,
            email: row.get(3)?,
            phone: row.get(4)?,
            avatar_url: row.get(5)?,
            title: row.get(6)?,
            created_at: read_ts(row, 7)?,
            updated_at: read_ts(row, 8)?,
        })
    }
}

impl Database {
    /// The profile linked to a cached account, i.e. the signed-in user.
    pub fn current_user(&self) -> Result<Option<User>> {
        Ok(self
            .query_where::<User, _>("account_id IN (SELECT id FROM accounts)", [])?
            .into_iter()
            .next())
    }

    pub fn find_user_by_email(&self, email: &str) -> Result<Option<User>> {
        Ok(self
            .query_where::<User, _>("email = ?1 COLLATE NOCASE", params![email])?
            .into_iter()
            .next())
    }

    /// Users whose ids are in `ids`, name-ordered. Unknown ids are skipped.
    pub fn users_by_ids(&self, ids: &[String]) -> Result<Vec<User>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
        self.query_where(
            &format!("id IN ({})", placeholders.join(", ")),
            params_from_iter(ids.iter()),
        )
    }

    /// Cached profiles of a workspace's members.
    pub fn workspace_members(&self, workspace_id: &str) -> Result<Vec<User>> {
        match self.find::<Workspace>(workspace_id)? {
            Some(ws) => self.users_by_ids(&ws.member_ids),
            None => Ok(Vec::new()),
        }
    }

    /// Case-insensitive match on name or email.
    pub fn search_users(&self, query: &str) -> Result<Vec<User>> {
        self.query_where(
            "name LIKE ?1 ESCAPE '\\' OR email LIKE ?1 ESCAPE '\\'",
            params![contains_pattern(query)],
        )
    }
}

#[cfg(test)]
mod tests {
    use teamhub_shared::fixtures;

    use super::*;
    use crate::StoreError;

    #[test]
    fn duplicate_email_is_a_constraint_violation() {
        let db = Database::open_in_memory().unwrap();
        db.upsert(&fixtures::user("u-1", "ada@example.com")).unwrap();

        let err = db
            .upsert(&fixtures::user("u-2", "ada@example.com"))
            .unwrap_err();
        assert!(matches!(err, StoreError::Constraint(_)));
    }

    #[test]
    fn duplicate_phone_is_a_constraint_violation() {
        let db = Database::open_in_memory().unwrap();
        let mut a = fixtures::user("u-1", "a@example.com");
        a.phone = Some("+3361234".into());
        let mut b = fixtures::user("u-2", "b@example.com");
        b.phone = Some("+3361234".into());

        db.upsert(&a).unwrap();
        assert!(matches!(db.upsert(&b), Err(StoreError::Constraint(_))));
    }

    #[test]
    fn members_follow_workspace_member_ids() {
        let db = Database::open_in_memory().unwrap();
        db.upsert(&fixtures::workspace("w-1")).unwrap(); // members u-1, u-2
        db.upsert_all(&[
            fixtures::user("u-1", "a@example.com"),
            fixtures::user("u-2", "b@example.com"),
            fixtures::user("u-3", "c@example.com"),
        ])
        .unwrap();

        let ids: Vec<String> = db
            .workspace_members("w-1")
            .unwrap()
            .into_iter()
            .map(|u| u.id)
            .collect();
        assert_eq!(ids, vec!["u-1".to_string(), "u-2".to_string()]);
        assert!(db.workspace_members("missing").unwrap().is_empty());
    }

    #[test]
    fn search_matches_name_and_email() {
        let db = Database::open_in_memory().unwrap();
        let mut ada = fixtures::user("u-1", "ada@example.com");
        ada.name = "Ada Lovelace".into();
        db.upsert(&ada).unwrap();
        db.upsert(&fixtures::user("u-2", "grace@example.com")).unwrap();

        assert_eq!(db.search_users("lovelace").unwrap().len(), 1);
        assert_eq!(db.search_users("example.com").unwrap().len(), 2);
        assert_eq!(
            db.find_user_by_email("GRACE@example.com").unwrap().unwrap().id,
            "u-2"
        );
    }

    #[test]
    fn server_copy_keeps_sign_in_link() {
        let db = Database::open_in_memory().unwrap();
        db.save_session(&teamhub_shared::AuthSession {
            account: fixtures::account("a-1", "ada@example.com"),
            user: fixtures::user("u-1", "ada@example.com"),
        })
        .unwrap();

        let mut server = fixtures::user("u-1", "ada@example.com");
        server.name = "Ada L.".into();
        db.upsert_all(&[server, fixtures::user("u-2", "bob@example.com")])
            .unwrap();

        let me = db.current_user().unwrap().unwrap();
        assert_eq!(me.id, "u-1");
        assert_eq!(me.name, "Ada L.");
        assert_eq!(me.account_id.as_deref(), Some("a-1"));
    }

    #[test]
    fn search_treats_wildcards_literally() {
        let db = Database::open_in_memory().unwrap();
        let mut underscored = fixtures::user("u-1", "ada_l@example.com");
        underscored.name = "Ada".into();
        db.upsert_all(&[underscored, fixtures::user("u-2", "adaxl@example.com")])
            .unwrap();

        let hits = db.search_users("ada_l").unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "u-1");
        assert!(db.search_users("%").unwrap().is_empty());
    }
}
