//! Repositories mediate between the local cache and the REST API.
//!
//! Reads come in two flavours: a plain cached read, and a
//! first-local-then-remote stream built with
//! [`local_then_remote`](crate::sync::local_then_remote). Writes call the
//! endpoint first and upsert whatever the backend returns; the cache is
//! never written optimistically.

pub mod bugs;
pub mod channels;
pub mod epics;
pub mod invitations;
pub mod messages;
pub mod notifications;
pub mod reports;
pub mod sprints;
pub mod tasks;
pub mod users;
pub mod workspaces;

pub use bugs::BugRepository;
pub use channels::ChannelRepository;
pub use epics::EpicRepository;
pub use invitations::InvitationRepository;
pub use messages::{MessageRepository, PageLoad};
pub use notifications::NotificationRepository;
pub use reports::ReportRepository;
pub use sprints::SprintRepository;
pub use tasks::TaskRepository;
pub use users::UserRepository;
pub use workspaces::WorkspaceRepository;

use futures::stream::BoxStream;

use crate::error::Result;
use crate::sync::Emission;

/// A first-local-then-remote read.
pub type Emissions<T> = BoxStream<'static, Result<Emission<T>>>;
