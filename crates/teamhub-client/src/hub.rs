//! Everything a client needs, wired from one [`ClientConfig`].
//!
//! [`TeamHub`] owns the shared [`ApiClient`] and [`LocalCache`] and hands
//! clones of both to every repository, so a token set by
//! [`SessionRepository`] is immediately used by all of them.

use tracing::info;

use teamhub_api::ApiClient;
use teamhub_realtime::RealtimeConfig;
use teamhub_store::Database;

use crate::cache::LocalCache;
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::holders::{ChannelMessagesHolder, NotificationsHolder, TaskBoardHolder, WorkspacesHolder};
use crate::realtime_bridge::RealtimeBridge;
use crate::repositories::{
    BugRepository, ChannelRepository, EpicRepository, InvitationRepository, MessageRepository,
    NotificationRepository, ReportRepository, SprintRepository, TaskRepository, UserRepository,
    WorkspaceRepository,
};
use crate::session::SessionRepository;
use crate::sync::SyncService;

pub struct TeamHub {
    pub config: ClientConfig,

    /// Shared REST client. Holds the bearer token.
    pub api: ApiClient,

    pub cache: LocalCache,

    /// Sign-in, sign-out and the current profile.
    pub session: SessionRepository,

    pub users: UserRepository,
    pub workspaces: WorkspaceRepository,
    pub channels: ChannelRepository,
    pub messages: MessageRepository,
    pub tasks: TaskRepository,
    pub epics: EpicRepository,
    pub sprints: SprintRepository,
    pub bugs: BugRepository,
    pub notifications: NotificationRepository,
    pub invitations: InvitationRepository,
    pub reports: ReportRepository,

    /// Pull-then-sync over whole workspaces.
    pub sync: SyncService,
}

impl TeamHub {
    /// Open the database named by the config (or the platform default).
    pub fn open(config: ClientConfig) -> Result<Self> {
        let db = match &config.db_path {
            Some(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)
                        .map_err(teamhub_store::StoreError::from)?;
                }
                Database::open_at(path)?
            }
            None => Database::new()?,
        };
        Self::open_with(config, db)
    }

    /// Build on an already opened database.
    pub fn open_with(config: ClientConfig, db: Database) -> Result<Self> {
        let api = ApiClient::new(&config.api_url, config.http_timeout)
            .map_err(|e| ClientError::InvalidConfig(e.to_string()))?;
        let cache = LocalCache::new(db);
        info!(api = %config.api_url, "TeamHub client ready");

        Ok(Self {
            session: SessionRepository::new(api.clone(), cache.clone()),
            users: UserRepository::new(api.clone(), cache.clone()),
            workspaces: WorkspaceRepository::new(api.clone(), cache.clone()),
            channels: ChannelRepository::new(api.clone(), cache.clone()),
            messages: MessageRepository::new(api.clone(), cache.clone(), config.page_size),
            tasks: TaskRepository::new(api.clone(), cache.clone()),
            epics: EpicRepository::new(api.clone(), cache.clone()),
            sprints: SprintRepository::new(api.clone(), cache.clone()),
            bugs: BugRepository::new(api.clone(), cache.clone()),
            notifications: NotificationRepository::new(
                api.clone(),
                cache.clone(),
                config.page_size,
            ),
            invitations: InvitationRepository::new(api.clone(), cache.clone()),
            reports: ReportRepository::new(api.clone(), cache.clone()),
            sync: SyncService::new(api.clone(), cache.clone()),
            config,
            api,
            cache,
        })
    }

    /// Connect the real-time channel with the signed-in account's token.
    pub async fn connect_realtime(&self) -> Result<RealtimeBridge> {
        let account = self.session.current_account()?;
        let mut config = RealtimeConfig::new(&self.config.ws_url, Some(account.access_token));
        config.ping_interval = self.config.ping_interval;
        RealtimeBridge::start(config, self.cache.clone()).await
    }

    // -- state holders -------------------------------------------------------

    pub fn workspaces_holder(&self) -> WorkspacesHolder {
        WorkspacesHolder::new(self.workspaces.clone(), &self.cache)
    }

    pub fn channel_messages_holder(&self, channel_id: &str) -> ChannelMessagesHolder {
        ChannelMessagesHolder::new(self.messages.clone(), &self.cache, channel_id)
    }

    pub fn task_board_holder(&self, workspace_id: &str) -> TaskBoardHolder {
        TaskBoardHolder::new(self.tasks.clone(), &self.cache, workspace_id)
    }

    pub fn notifications_holder(&self) -> NotificationsHolder {
        NotificationsHolder::new(self.notifications.clone(), &self.cache)
    }
}
