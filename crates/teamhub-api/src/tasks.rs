//! Task endpoints.

use teamhub_shared::requests::{NewTask, TaskUpdate};
use teamhub_shared::Task;

use crate::client::ApiClient;
use crate::error::Result;

impl ApiClient {
    pub async fn list_tasks(&self, workspace_id: &str) -> Result<Vec<Task>> {
        self.get(&format!("/workspaces/{workspace_id}/tasks")).await
    }

    pub async fn get_task(&self, task_id: &str) -> Result<Task> {
        self.get(&format!("/tasks/{task_id}")).await
    }

    pub async fn create_task(&self, workspace_id: &str, new: &NewTask) -> Result<Task> {
        self.post(&format!("/workspaces/{workspace_id}/tasks"), new)
            .await
    }

    pub async fn update_task(&self, task_id: &str, update: &TaskUpdate) -> Result<Task> {
        self.put(&format!("/tasks/{task_id}"), update).await
    }

    pub async fn delete_task(&self, task_id: &str) -> Result<()> {
        self.delete(&format!("/tasks/{task_id}")).await
    }
}

#[cfg(test)]
mod tests {
    use axum::extract::Path;
    use axum::routing::put;
    use axum::{Json, Router};
    use teamhub_shared::requests::TaskUpdate;
    use teamhub_shared::{fixtures, WorkStatus};

    use crate::mock;

    #[tokio::test]
    async fn update_sends_only_changed_fields() {
        let router = Router::new().route(
            "/tasks/:id",
            put(|Path(id): Path<String>, Json(body): Json<serde_json::Value>| async move {
                assert_eq!(body, serde_json::json!({ "status": "in_review" }));
                let mut task = fixtures::task(&id, "w-1");
                task.status = WorkStatus::InReview;
                Json(task)
            }),
        );
        let api = mock::client(router).await;

        let update = TaskUpdate {
            status: Some(WorkStatus::InReview),
            ..Default::default()
        };
        let task = api.update_task("t-7", &update).await.unwrap();
        assert_eq!(task.id, "t-7");
        assert_eq!(task.status, WorkStatus::InReview);
    }
}
