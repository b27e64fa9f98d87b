//! Offline-first synchronisation.
//!
//! Two patterns live here:
//!
//! - **First-local-then-remote**: [`local_then_remote`] yields the cached
//!   value immediately, then the value re-read after a remote refresh.
//! - **Pull-then-sync**: [`SyncService`] pulls every list of a workspace in
//!   turn and replaces the matching cache scope. Steps run one after another;
//!   a failing step is recorded in the [`SyncReport`] and the next one runs.
//!   Nothing is retried.

use std::future::Future;

use futures::stream::{self, BoxStream, StreamExt};
use tracing::{info, warn};

use teamhub_api::ApiClient;
use teamhub_shared::{Bug, Epic, Invitation, Sprint, Task, Workspace};
use teamhub_store::ScopeReplace;

use crate::cache::LocalCache;
use crate::error::Result;
use crate::repositories::channels::replace_channels;
use crate::repositories::invitations::replace_received;

// ---------------------------------------------------------------------------
// First-local-then-remote
// ---------------------------------------------------------------------------

/// One value produced by a first-local-then-remote read.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission<T> {
    /// Straight from the cache, possibly stale.
    Cached(T),
    /// Re-read after the remote refresh was written to the cache.
    Fresh(T),
}

impl<T> Emission<T> {
    pub fn into_inner(self) -> T {
        match self {
            Emission::Cached(v) | Emission::Fresh(v) => v,
        }
    }

    pub fn is_fresh(&self) -> bool {
        matches!(self, Emission::Fresh(_))
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Emission<U> {
        match self {
            Emission::Cached(v) => Emission::Cached(f(v)),
            Emission::Fresh(v) => Emission::Fresh(f(v)),
        }
    }
}

/// Stream the cached value, then the refreshed one.
///
/// A failing local read does not stop the remote refresh; each failure is
/// yielded as an `Err` item in its place.
pub fn local_then_remote<T, L, R, Fut>(local: L, remote: R) -> BoxStream<'static, Result<Emission<T>>>
where
    T: Send + 'static,
    L: FnOnce() -> Result<T> + Send + 'static,
    R: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T>> + Send + 'static,
{
    let cached = stream::once(async move { local().map(Emission::Cached) });
    let fresh = stream::once(async move { remote().await.map(Emission::Fresh) });
    cached.chain(fresh).boxed()
}

// ---------------------------------------------------------------------------
// Scopes
// ---------------------------------------------------------------------------

/// Sync-state scope names.
pub mod scope {
    pub const WORKSPACES: &str = "workspaces";
    pub const RECEIVED_INVITATIONS: &str = "invitations:received";
    pub const NOTIFICATIONS: &str = "notifications";

    pub fn workspace(workspace_id: &str, list: &str) -> String {
        format!("workspace:{workspace_id}:{list}")
    }

    pub fn channel_messages(channel_id: &str) -> String {
        format!("channel:{channel_id}:messages")
    }
}

// ---------------------------------------------------------------------------
// Pull-then-sync
// ---------------------------------------------------------------------------

/// One list pulled during a sync.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncStep {
    pub scope: String,
    pub outcome: std::result::Result<ScopeReplace, String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    pub steps: Vec<SyncStep>,
}

impl SyncReport {
    pub fn is_clean(&self) -> bool {
        self.steps.iter().all(|s| s.outcome.is_ok())
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &str)> {
        self.steps.iter().filter_map(|s| match &s.outcome {
            Ok(_) => None,
            Err(message) => Some((s.scope.as_str(), message.as_str())),
        })
    }

    /// Rows written across all successful steps.
    pub fn upserted(&self) -> usize {
        self.steps
            .iter()
            .filter_map(|s| s.outcome.as_ref().ok())
            .map(|r| r.upserted)
            .sum()
    }

    fn record(&mut self, scope: String, outcome: Result<ScopeReplace>) {
        let outcome = outcome.map_err(|e| {
            warn!(scope = %scope, error = %e, "Sync step failed");
            e.user_message()
        });
        self.steps.push(SyncStep { scope, outcome });
    }

    fn merge(&mut self, other: SyncReport) {
        self.steps.extend(other.steps);
    }
}

#[derive(Clone)]
pub struct SyncService {
    api: ApiClient,
    cache: LocalCache,
}

impl SyncService {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    /// Pull the workspace list, then every workspace in it, then the
    /// invitations addressed to the user.
    pub async fn sync_all(&self) -> SyncReport {
        let mut report = SyncReport::default();

        let workspaces = match self.api.list_workspaces().await {
            Ok(list) => list,
            Err(e) => {
                report.record(scope::WORKSPACES.to_string(), Err(e.into()));
                return report;
            }
        };
        report.record(
            scope::WORKSPACES.to_string(),
            self.store_all(scope::WORKSPACES, &workspaces),
        );

        for workspace in &workspaces {
            report.merge(self.sync_workspace(&workspace.id).await);
        }

        let outcome = match self.api.received_invitations().await {
            Ok(list) => self.mark_synced(
                scope::RECEIVED_INVITATIONS,
                replace_received(&self.cache, &list),
            ),
            Err(e) => Err(e.into()),
        };
        report.record(scope::RECEIVED_INVITATIONS.to_string(), outcome);

        info!(
            steps = report.steps.len(),
            upserted = report.upserted(),
            clean = report.is_clean(),
            "Full sync finished"
        );
        report
    }

    /// Pull channels, members, tasks, epics, sprints, bugs and invitations
    /// of one workspace.
    pub async fn sync_workspace(&self, workspace_id: &str) -> SyncReport {
        let mut report = SyncReport::default();
        let api = &self.api;

        let step = scope::workspace(workspace_id, "channels");
        let outcome = match api.list_channels(workspace_id).await {
            Ok(list) => self.mark_synced(&step, replace_channels(&self.cache, workspace_id, &list)),
            Err(e) => Err(e.into()),
        };
        report.record(step, outcome);

        let step = scope::workspace(workspace_id, "members");
        let outcome = match api.workspace_members(workspace_id).await {
            Ok(list) => self.store_unscoped(&step, &list),
            Err(e) => Err(e.into()),
        };
        report.record(step, outcome);

        let step = scope::workspace(workspace_id, "tasks");
        let outcome = match api.list_tasks(workspace_id).await {
            Ok(list) => self.store_scope::<Task>(&step, workspace_id, &list),
            Err(e) => Err(e.into()),
        };
        report.record(step, outcome);

        let step = scope::workspace(workspace_id, "epics");
        let outcome = match api.list_epics(workspace_id).await {
            Ok(list) => self.store_scope::<Epic>(&step, workspace_id, &list),
            Err(e) => Err(e.into()),
        };
        report.record(step, outcome);

        let step = scope::workspace(workspace_id, "sprints");
        let outcome = match api.list_sprints(workspace_id).await {
            Ok(list) => self.store_scope::<Sprint>(&step, workspace_id, &list),
            Err(e) => Err(e.into()),
        };
        report.record(step, outcome);

        let step = scope::workspace(workspace_id, "bugs");
        let outcome = match api.list_bugs(workspace_id).await {
            Ok(list) => self.store_scope::<Bug>(&step, workspace_id, &list),
            Err(e) => Err(e.into()),
        };
        report.record(step, outcome);

        let step = scope::workspace(workspace_id, "invitations");
        let outcome = match api.workspace_invitations(workspace_id).await {
            Ok(list) => self.store_scope::<Invitation>(&step, workspace_id, &list),
            Err(e) => Err(e.into()),
        };
        report.record(step, outcome);

        info!(
            workspace = %workspace_id,
            upserted = report.upserted(),
            clean = report.is_clean(),
            "Workspace sync finished"
        );
        report
    }

    fn mark_synced(&self, scope_name: &str, outcome: Result<ScopeReplace>) -> Result<ScopeReplace> {
        let outcome = outcome?;
        self.cache.write_untracked(|db| db.mark_synced(scope_name))?;
        Ok(outcome)
    }

    fn store_scope<R: teamhub_store::Record>(
        &self,
        scope_name: &str,
        workspace_id: &str,
        records: &[R],
    ) -> Result<ScopeReplace> {
        self.mark_synced(
            scope_name,
            self.cache.replace_scope("workspace_id", workspace_id, records),
        )
    }

    /// Upsert a list with no parent column to replace by.
    fn store_unscoped<R: teamhub_store::Record>(
        &self,
        scope_name: &str,
        records: &[R],
    ) -> Result<ScopeReplace> {
        let upserted = self.cache.upsert_all(records)?;
        self.cache.write_untracked(|db| db.mark_synced(scope_name))?;
        Ok(ScopeReplace {
            upserted,
            removed: 0,
        })
    }

    fn store_all(&self, scope_name: &str, workspaces: &[Workspace]) -> Result<ScopeReplace> {
        self.mark_synced(scope_name, self.cache.replace_all(workspaces))
    }
}
