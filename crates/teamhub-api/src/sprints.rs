//! Sprint endpoints.

use teamhub_shared::requests::{NewSprint, SprintUpdate};
use teamhub_shared::{Sprint, Task};

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn list_sprints(&self, workspace_id: &str) -> Result<Vec<Sprint>> {
        self.get(&format!("/workspaces/{workspace_id}/sprints")).await
    }

    pub async fn get_sprint(&self, sprint_id: &str) -> Result<Sprint> {
        self.get(&format!("/sprints/{sprint_id}")).await
    }

    pub async fn sprint_tasks(&self, sprint_id: &str) -> Result<Vec<Task>> {
        self.get(&format!("/sprints/{sprint_id}/tasks")).await
    }

    pub async fn create_sprint(&self, workspace_id: &str, new: &NewSprint) -> Result<Sprint> {
        self.post(&format!("/workspaces/{workspace_id}/sprints"), new)
            .await
    }

    pub async fn update_sprint(&self, sprint_id: &str, update: &SprintUpdate) -> Result<Sprint> {
        self.put(&format!("/sprints/{sprint_id}"), update).await
    }

    pub async fn delete_sprint(&self, sprint_id: &str) -> Result<()> {
        self.delete(&format!("/sprints/{sprint_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use axum::routing::get;
    use axum::{Json, Router};
    use teamhub_shared::fixtures;

    use crate::mock;

    #[tokio::test]
    async fn sprint_tasks_by_parent() {
        let router = Router::new().route(
            "/sprints/s-1/tasks",
            get(|| async {
                let mut t = fixtures::task("t-1", "w-1");
                t.sprint_id = Some("s-1".into());
                Json(vec![t])
            }),
        );
        let api = mock::client(router).await;

        let tasks = api.sprint_tasks("s-1").await.unwrap();
        assert_eq!(tasks[0].sprint_id.as_deref(), Some("s-1"));
    }
}
