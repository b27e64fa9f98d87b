//! Workspace summaries. Remote reports are not cached; the offline figure
//! is computed from cached tasks, bugs and sprints.

use teamhub_api::ApiClient;
use teamhub_shared::WorkspaceReport;

use crate::cache::LocalCache;
use crate::error::Result;
use crate::sync::local_then_remote;

use super::Emissions;

#[derive(Clone)]
pub struct ReportRepository {
    api: ApiClient,
    cache: LocalCache,
}

impl ReportRepository {
    pub fn new(api: ApiClient, cache: LocalCache) -> Self {
        Self { api, cache }
    }

    pub fn local_report(&self, workspace_id: &str) -> Result<WorkspaceReport> {
        self.cache.read(|db| db.local_report(workspace_id))
    }

    pub async fn remote_report(&self, workspace_id: &str) -> Result<WorkspaceReport> {
        Ok(self.api.workspace_report(workspace_id).await?)
    }

    pub fn report(&self, workspace_id: &str) -> Emissions<WorkspaceReport> {
        let (local, remote) = (self.clone(), self.clone());
        let (id, remote_id) = (workspace_id.to_string(), workspace_id.to_string());
        local_then_remote(
            move || local.local_report(&id),
            move || async move { remote.remote_report(&remote_id).await },
        )
    }
}
