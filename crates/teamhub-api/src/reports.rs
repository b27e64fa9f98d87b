//! Workspace reporting endpoint.

use teamhub_shared::WorkspaceReport;

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn workspace_report(&self, workspace_id: &str) -> Result<WorkspaceReport> {
        self.get(&format!("/workspaces/{workspace_id}/reports")).await
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::{Json, Router};

    use crate::mock;

    #[tokio::test]
    async fn decodes_report_with_missing_optionals() {
        let router = Router::new().route(
            "/workspaces/w-1/reports",
            get(|| async {
                Json(serde_json::json!({
                    "workspaceId": "w-1",
                    "totalTasks": 4,
                    "completedTasks": 1,
                    "tasksByStatus": { "todo": 3, "done": 1 },
                    "openBugs": 2
                }))
            }),
        );
        let api = mock::client(router).await;

        let report = api.workspace_report("w-1").await.unwrap();
        assert_eq!(report.open_bugs, 2);
        assert_eq!(report.active_sprint_id, None);
        assert!((report.completion_ratio() - 0.25).abs() < f64::EPSILON);
    }
}
