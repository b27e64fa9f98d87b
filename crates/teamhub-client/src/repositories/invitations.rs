use teamhub_api::ApiClient;
use teamhub_shared::{EntityKind, Invitation, InvitationStatus, Workspace};
use teamhub_store::ScopeReplace;

use crate::cache::{CacheChange, LocalCache};
use crate::error::{ClientError, Result};
use crate::sync::{local_then_remote, scope};

use super::Emissions;

#[derive(Clone)]
pub struct InvitationRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl InvitationRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    /// Pending, unexpired invitations addressed to the signed-in user.
    pub fn cached_received(&self) -> Result<Vec<Invitation>> {
        let user = self
            .cache
            .read(|db| db.current_user())?
            .ok_or(ClientError::NotAuthenticated)?;
        self.cache
            .read(|db| db.pending_invitations_for(&user.email))
    }

    pub async fn refresh_received(&self) -> Result<Vec<Invitation>> {
        let remote = self.api.received_invitations().await?;
        replace_received(&self.cache, &remote)?;
        self.cache
            .write_untracked(|db| db.mark_synced(scope::RECEIVED_INVITATIONS))?;
        self.cached_received()
    }

    pub fn received(&self) -> Emissions<Vec<Invitation>> {
        let (local, remote) = (self.clone(), self.clone());
        local_then_remote(
            move || local.cached_received(),
            move || async move { remote.refresh_received().await },
        )
    }

    pub fn cached_for_workspace(&self, workspace_id: &str) -> Result<Vec<Invitation>> {
        self.cache
            .read(|db| db.invitations_for_workspace(workspace_id))
    }

    pub async fn refresh_for_workspace(&self, workspace_id: &str) -> Result<Vec<Invitation>> {
        let remote = self.api.workspace_invitations(workspace_id).await?;
        self.cache.replace_scope("workspace_id", workspace_id, &remote)?;
        self.cache
            .write_untracked(|db| db.mark_synced(&scope::workspace(workspace_id, "invitations")))?;
        self.cached_for_workspace(workspace_id)
    }

    pub fn for_workspace(&self, workspace_id: &str) -> Emissions<Vec<Invitation>> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.cached_for_workspace(&id),
            move || async move { remote.refresh_for_workspace(&remote_id).await },
        )
    }

    pub async fn send(&self, workspace_id: &str, email: &str) -> Result<Invitation> {
        let invitation = self.api.send_invitation(workspace_id, email).await?;
        self.cache.upsert(&invitation)?;
        Ok(invitation)
    }

    /// Join the workspace. The joined workspace is cached right away.
    pub async fn accept(&self, invitation_id: &str) -> Result<Workspace> {
        let workspace = self.api.accept_invitation(invitation_id).await?;
        self.cache.upsert(&workspace)?;
        self.set_status(invitation_id, InvitationStatus::Accepted)?;
        Ok(workspace)
    }

    pub async fn decline(&self, invitation_id: &str) -> Result<Invitation> {
        let invitation = self.api.decline_invitation(invitation_id).await?;
        self.cache.upsert(&invitation)?;
        Ok(invitation)
    }

    pub async fn cancel(&self, invitation_id: &str) -> Result<()> {
        self.api.cancel_invitation(invitation_id).await?;
        self.cache.delete::<Invitation>(invitation_id)?;
        Ok(())
    }

    fn set_status(&self, invitation_id: &str, status: InvitationStatus) -> Result<bool> {
        self.cache.write(
            CacheChange::Upserted {
                kind: EntityKind::Invitation,
                id: invitation_id.to_string(),
            },
            |db| db.set_invitation_status(invitation_id, status),
        )
    }
}

/// Replace the cached invitations addressed to the signed-in user. Without
/// a session there is no address to scope by, so `remote` is only upserted.
pub(crate) fn replace_received(cache: &LocalCache, remote: &[Invitation]) -> Result<ScopeReplace> {
    match cache.read(|db| db.current_user())? {
        Some(me) => cache.replace_scope("invitee_email", &me.email, remote),
        None => Ok(ScopeReplace {
            upserted: cache.upsert_all(remote)?,
            removed: 0,
        }),
    }
}
