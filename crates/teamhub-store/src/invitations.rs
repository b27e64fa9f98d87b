use rusqlite::types::Value;
use rusqlite::{params, Row};
use teamhub_shared::{EntityKind, Invitation, InvitationStatus};

use crate::database::Database;
use crate::error::Result;
use crate::record::{
    opt_text, opt_timestamp, read_enum, read_opt_ts, read_ts, text, timestamp, Record,
};

impl Record for Invitation {
    const KIND: EntityKind = EntityKind::Invitation;
    const TABLE: &'static str = "invitations";
    const COLUMNS: &'static [&'static str] = &[
        "id",
        "workspace_id",
        "inviter_id",
        "invitee_email",
        "invitee_id",
        "status",
        "expires_at",
        "created_at",
        "updated_at",
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn values(&self) -> Vec<Value> {
        vec![
            text(&self.id),
            text(&self.workspace_id),
            text(&self.inviter_id),
            text(&self.invitee_email),
            opt_text(self.invitee_id.as_deref()),
            text(self.status.as_str()),
            opt_timestamp(self.expires_at.as_ref()),
            timestamp(&self.created_at),
            timestamp(&self.updated_at),
        ]
    }

    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Invitation {
            id: row.get(0)?,
            workspace_id: row.get(1)?,
            inviter_id: row.get(2)?,
            invitee_email: row.get(3)?,
            invitee_id: row.get(4)?,
            status: read_enum(row, 5)?,
            expires_at: read_opt_ts(row, 6)?,
            created_at: read_ts(row, 7)?,
            updated_at: read_ts(row, 8)?,
        })
    }
}

impl Database {
    /// Invitations sent from a workspace, any status.
    pub fn invitations_for_workspace(&self, workspace_id: &str) -> Result<Vec<Invitation>> {
        self.query_where("workspace_id = ?1", params![workspace_id])
    }

    /// Pending invitations addressed to an email, expired ones excluded.
    pub fn pending_invitations_for(&self, email: &str) -> Result<Vec<Invitation>> {
        let now = chrono::Utc::now();
        Ok(self
            .query_where::<Invitation, _>(
                "invitee_email = ?1 COLLATE NOCASE AND status = ?2",
                params![email, InvitationStatus::Pending.as_str()],
            )?
            .into_iter()
            .filter(|inv| inv.is_actionable(now))
            .collect())
    }

    pub fn set_invitation_status(&self, id: &str, status: InvitationStatus) -> Result<bool> {
        let affected = self.conn().execute(
            "UPDATE invitations SET status = ?1, updated_at = ?2 WHERE id = ?3",
            params![status.as_str(), chrono::Utc::now().to_rfc3339(), id],
        )?;
        Ok(affected > 0)
    }
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use teamhub_shared::fixtures;

    use super::*;

    #[test]
    fn pending_for_email_skips_expired_and_answered() {
        let db = Database::open_in_memory().unwrap();
        let mut expired = fixtures::invitation("i-2", "w-2", "bob@example.com");
        expired.expires_at = Some(Utc::now() - Duration::days(1));
        let mut future = fixtures::invitation("i-3", "w-3", "bob@example.com");
        future.expires_at = Some(Utc::now() + Duration::days(1));
        db.upsert_all(&[
            fixtures::invitation("i-1", "w-1", "Bob@Example.com"),
            expired,
            future,
        ])
        .unwrap();

        let pending: Vec<String> = db
            .pending_invitations_for("bob@example.com")
            .unwrap()
            .into_iter()
            .map(|i| i.id)
            .collect();
        assert_eq!(pending.len(), 2);
        assert!(pending.contains(&"i-1".to_string()));
        assert!(pending.contains(&"i-3".to_string()));

        assert!(db.set_invitation_status("i-1", InvitationStatus::Declined).unwrap());
        assert_eq!(db.pending_invitations_for("bob@example.com").unwrap().len(), 1);
        assert_eq!(db.invitations_for_workspace("w-1").unwrap().len(), 1);
    }
}
