//! The signed-in [`Account`].
//!
//! Deleting an account cascades to the user profile linked to it.

use rusqlite::types::Value;
use rusqlite::Row;
use teamhub_shared::{Account, AuthSession, EntityKind};

use crate::database::Database;
use crate::error::{Result, StoreError};
use crate::record::{opt_text, read_ts, text, timestamp, Record};

impl Record for Account {
    const KIND: EntityKind = EntityKind::Account;
    const TABLE: &'static str = "accounts";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "email",
        "phone",
        "access_token",
        "refresh_token",
        "created_at",
        "updated_at",
    ];
    const ORDER_BY: &'static str = "updated_at DESC";

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.email),
            opt_text(self.phone.as_deref()),
            text(&self.access_token),
            opt_text(self.refresh_token.as_deref()),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Account {
            id: row.get(0)?,
            email: row.get(1)?,
            phone: row.get(2)?,
            access_token: row.get(3)?,
            refresh_token: row.get(4)?,
            created_at: read_ts(row, 5)?,
            updated_at: read_ts(row, 6)?,
        })
    }
}

impl Database {
    /// The most recently updated account, if anyone is signed in.
    pub fn current_account(&self) -> Result<Option<Account>> {
        Ok(self.list_all::<Account>()?.into_iter().next())
    }

    /// Persist a fresh session: the account first, then its user profile
    /// linked through `account_id`.
    pub fn save_session(&self, session: &AuthSession) -> Result<()> {
        let mut user = session.user.clone();
        user.account_id = Some(session.account.id.clone());

        let tx = self.conn().unchecked_transaction()?;
        self.upsert(&session.account)?;
        self.upsert(&user)?;
        tx.commit()?;
        Ok(())
    }

    /// Replace the tokens of a cached account after a refresh.
    pub fn update_tokens(
        &self,
        account_id: &str,
        access_token: &str,
        refresh_token: Option<&str>,
    ) -> Result<()> {
        let affected = self.conn().execute(
            "UPDATE accounts
             SET access_token = ?1,
                 refresh_token = COALESCE(?2, refresh_token),
                 updated_at = ?3
             WHERE id = ?4",
            rusqlite::params![
                access_token,
                refresh_token,
                chrono::Utc::now().to_rfc3339(),
                account_id
            ],
        )?;
        if affected == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use teamhub_shared::{fixtures, User};

    use super::*;

    fn session() -> AuthSession {
        AuthSession {
            account: fixtures::account("a-1", "ada@example.com"),
            user: fixtures::user("u-1", "ada@example.com"),
        }
    }

    #[test]
    fn save_session_links_user_to_account() {
        let db = Database::open_in_memory().unwrap();
        db.save_session(&session()).unwrap();

        let account = db.current_account().unwrap().unwrap();
        assert_eq!(account.id, "a-1");
        let me = db.current_user().unwrap().unwrap();
        assert_eq!(me.id, "u-1");
        assert_eq!(me.account_id.as_deref(), Some("a-1"));
    }

    #[test]
    fn deleting_account_cascades_to_user() {
        let db = Database::open_in_memory().unwrap();
        db.save_session(&session()).unwrap();
        db.upsert(&fixtures::user("u-2", "bob@example.com")).unwrap();

        assert!(db.delete::<Account>("a-1").unwrap());

        assert!(db.find::<User>("u-1").unwrap().is_none());
        assert!(db.find::<User>("u-2").unwrap().is_some());
        assert!(db.current_account().unwrap().is_none());
    }

    #[test]
    fn user_pointing_at_unknown_account_is_rejected() {
        let db = Database::open_in_memory().unwrap();
        let mut orphan = fixtures::user("u-1", "ada@example.com");
        orphan.account_id = Some("ghost".into());
        assert!(matches!(db.upsert(&orphan), Err(StoreError::Constraint(_))));
    }

    #[test]
    fn update_tokens_keeps_refresh_token_when_absent() {
        let db = Database::open_in_memory().unwrap();
        db.save_session(&session()).unwrap();

        db.update_tokens("a-1", "new-access", None).unwrap();
        let account: Account = db.get("a-1").unwrap();
        assert_eq!(account.access_token, "new-access");
        assert_eq!(account.refresh_token.as_deref(), Some("refresh-a-1"));

        assert!(matches!(
            db.update_tokens("missing", "x", None),
            Err(StoreError::NotFound)
        ));
    }
}
