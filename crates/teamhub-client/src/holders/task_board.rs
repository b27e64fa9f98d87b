use futures::StreamExt;
use tokio::sync::watch;

use teamhub_shared::{EntityKind, Task, WorkStatus};

use crate::cache::LocalCache;
use crate::error::Result;
use crate::repositories::TaskRepository;

use super::{StateHolder, UiState};

#[derive(Debug, Clone, PartialEq)]
pub struct TaskColumn {
    pub status: WorkStatus,
    pub tasks: Vec<Task>,
}

/// A workspace's tasks grouped by status, one column per [`WorkStatus`] in
/// declaration order. Empty columns are kept.
#[derive(Debug, Clone, PartialEq)]
pub struct TaskBoard {
    pub columns: Vec<TaskColumn>,
}

impl TaskBoard {
    pub fn from_tasks(tasks: Vec<Task>) -> Self {
        let mut columns: Vec<TaskColumn> = WorkStatus::ALL
            .iter()
            .map(|&status| TaskColumn {
                status,
                tasks: Vec::new(),
            })
            .collect();
        for task in tasks {
            if let Some(col) = columns.iter_mut().find(|c| c.status == task.status) {
                col.tasks.push(task);
            }
        }
        Self { columns }
    }

    pub fn column(&self, status: WorkStatus) -> &[Task] {
        self.columns
            .iter()
            .find(|c| c.status == status)
            .map(|c| c.tasks.as_slice())
            .unwrap_or(&[])
    }

    pub fn total(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum()
    }
}

pub struct TaskBoardHolder {
    holder: StateHolder<TaskBoard>,
    repo: TaskRepository,
    workspace_id: String,
}

impl TaskBoardHolder {
    pub fn new(repo: TaskRepository, cache: &LocalCache, workspace_id: &str) -> Self {
        let initial = repo
            .tasks(workspace_id)
            .map(|item| item.map(|e| e.map(TaskBoard::from_tasks)))
            .boxed();
        let (reader, id) = (repo.clone(), workspace_id.to_string());
        let holder = StateHolder::spawn(cache, &[EntityKind::Task], initial, move || {
            reader.cached_tasks(&id).map(TaskBoard::from_tasks)
        });
        Self {
            holder,
            repo,
            workspace_id: workspace_id.to_string(),
        }
    }

    pub fn state(&self) -> UiState<TaskBoard> {
        self.holder.current()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState<TaskBoard>> {
        self.holder.subscribe()
    }

    pub async fn refresh(&self) {
        let result = self
            .repo
            .refresh_tasks(&self.workspace_id)
            .await
            .map(TaskBoard::from_tasks);
        self.holder.publish(result);
    }

    /// Drag a card to another column.
    pub async fn move_task(&self, task_id: &str, status: WorkStatus) -> Result<Task> {
        self.repo.set_status(task_id, status).await
    }
}
