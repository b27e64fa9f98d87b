//! Per-screen state holders.
//!
//! A [`StateHolder`] publishes a [`UiState`] through a watch channel. It
//! starts from a first-local-then-remote stream, then re-reads the cache
//! whenever a [`CacheChange`](crate::cache::CacheChange) touching one of its
//! entity kinds arrives. Dropping the holder aborts its background task.

mod messages;
mod notifications;
mod task_board;
mod workspaces;

pub use messages::{ChannelMessagesHolder, MessageList};
pub use notifications::{NotificationFeed, NotificationsHolder};
pub use task_board::{TaskBoard, TaskBoardHolder, TaskColumn};
pub use workspaces::WorkspacesHolder;

use std::sync::Arc;

use futures::StreamExt;
use tokio::sync::broadcast::error::RecvError;
use tokio::sync::{broadcast, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use teamhub_shared::EntityKind;

use crate::cache::{CacheChange, LocalCache};
use crate::error::Result;
use crate::repositories::Emissions;

/// What a screen shows.
#[derive(Debug, Clone, PartialEq)]
pub enum UiState<T> {
    Idle,
    Loading,
    Ready(T),
    /// A user-facing message, see [`ClientError::user_message`](crate::ClientError::user_message).
    Failed(String),
}

impl<T> UiState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, UiState::Loading)
    }

    pub fn data(&self) -> Option<&T> {
        match self {
            UiState::Ready(v) => Some(v),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            UiState::Failed(msg) => Some(msg),
            _ => None,
        }
    }

    fn from_result(result: Result<T>) -> Self {
        match result {
            Ok(v) => UiState::Ready(v),
            Err(e) => {
                warn!(error = %e, "State holder load failed");
                UiState::Failed(e.user_message())
            }
        }
    }
}

pub struct StateHolder<T> {
    state: Arc<watch::Sender<UiState<T>>>,
    task: JoinHandle<()>,
}

impl<T> StateHolder<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Start from `initial`, then call `reread` after every relevant change.
    pub(crate) fn spawn<R>(
        cache: &LocalCache,
        kinds: &'static [EntityKind],
        initial: Emissions<T>,
        reread: R,
    ) -> Self
    where
        R: Fn() -> Result<T> + Send + 'static,
    {
        let (tx, _) = watch::channel(UiState::Idle);
        let state = Arc::new(tx);
        // Subscribe before the first read so no change slips between them.
        let changes = cache.subscribe();
        let task = tokio::spawn(drive(state.clone(), changes, kinds, initial, reread));
        Self { state, task }
    }

    /// The latest state.
    pub fn current(&self) -> UiState<T> {
        self.state.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<UiState<T>> {
        self.state.subscribe()
    }

    pub(crate) fn publish(&self, result: Result<T>) {
        self.state.send_replace(UiState::from_result(result));
    }
}

impl<T> Drop for StateHolder<T> {
    fn drop(&mut self) {
        self.task.abort();
    }
}

async fn drive<T, R>(
    state: Arc<watch::Sender<UiState<T>>>,
    mut changes: broadcast::Receiver<CacheChange>,
    kinds: &'static [EntityKind],
    mut initial: Emissions<T>,
    reread: R,
) where
    R: Fn() -> Result<T>,
{
    state.send_replace(UiState::Loading);
    while let Some(item) = initial.next().await {
        state.send_replace(UiState::from_result(item.map(|e| e.into_inner())));
    }

    loop {
        match changes.recv().await {
            Ok(change) if kinds.iter().any(|k| change.touches(*k)) => {}
            Ok(_) => continue,
            Err(RecvError::Lagged(skipped)) => {
                debug!(skipped, "State holder lagged behind cache changes, re-reading");
            }
            Err(RecvError::Closed) => break,
        }
        state.send_replace(UiState::from_result(reread()));
    }
}
