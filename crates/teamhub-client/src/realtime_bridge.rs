//! Feeds real-time events into the local cache.
//!
//! [`RealtimeBridge::start`] connects the socket, subscribes to every cached
//! channel and spawns a loop that applies each [`ServerEvent`] through
//! [`apply_event`]. State holders see the result as ordinary cache changes.
//! Typing indicators never touch the cache; they are re-broadcast to
//! whoever called [`RealtimeBridge::typing_events`].

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use teamhub_realtime::{
    spawn_realtime, RealtimeCommand, RealtimeConfig, RealtimeError, RealtimeNotification,
};
use teamhub_shared::protocol::{ServerEvent, Typing};
use teamhub_shared::{Bug, Channel, Epic, Invitation, Message, Sprint, Task, Workspace};

use crate::cache::LocalCache;
use crate::error::{ClientError, Result};
use crate::repositories::channels::forget_channel;

const TYPING_CAPACITY: usize = 64;

/// Apply one pushed event to the cache.
///
/// Upserts replace the cached row wholesale; deletions of rows the cache
/// never saw are no-ops.
pub fn apply_event(cache: &LocalCache, event: &ServerEvent) -> Result<()> {
    match event {
        ServerEvent::MessageCreated(m) | ServerEvent::MessageUpdated(m) => cache.upsert(m)?,
        ServerEvent::MessageDeleted(r) => {
            cache.delete::<Message>(&r.id)?;
        }

        ServerEvent::ChannelUpserted(c) => cache.upsert(c)?,
        ServerEvent::ChannelDeleted(r) => forget_channel(cache, &r.id)?,

        ServerEvent::WorkspaceUpserted(w) => cache.upsert(w)?,
        ServerEvent::WorkspaceDeleted(r) => {
            cache.delete::<Workspace>(&r.id)?;
        }

        ServerEvent::UserUpserted(u) => cache.upsert(u)?,

        ServerEvent::TaskUpserted(t) => cache.upsert(t)?,
        ServerEvent::TaskDeleted(r) => {
            cache.delete::<Task>(&r.id)?;
        }

        ServerEvent::EpicUpserted(e) => cache.upsert(e)?,
        ServerEvent::EpicDeleted(r) => {
            cache.delete::<Epic>(&r.id)?;
        }

        ServerEvent::SprintUpserted(s) => cache.upsert(s)?,
        ServerEvent::SprintDeleted(r) => {
            cache.delete::<Sprint>(&r.id)?;
        }

        ServerEvent::BugUpserted(b) => cache.upsert(b)?,
        ServerEvent::BugDeleted(r) => {
            cache.delete::<Bug>(&r.id)?;
        }

        ServerEvent::NotificationCreated(n) => cache.upsert(n)?,

        ServerEvent::InvitationUpserted(i) => cache.upsert(i)?,
        ServerEvent::InvitationDeleted(r) => {
            cache.delete::<Invitation>(&r.id)?;
        }

        ServerEvent::Typing(_) | ServerEvent::Pong => {}
    }
    Ok(())
}

/// Handle to a running real-time connection. Dropping it leaves the
/// connection running until the socket closes; call
/// [`RealtimeBridge::shutdown`] to end it.
pub struct RealtimeBridge {
    commands: mpsc::Sender<RealtimeCommand>,
    typing: broadcast::Sender<Typing>,
    connected: watch::Receiver<bool>,
    task: JoinHandle<()>,
}

impl RealtimeBridge {
    pub async fn start(config: RealtimeConfig, cache: LocalCache) -> Result<Self> {
        let (commands, notifications) = spawn_realtime(config).await?;
        let (typing, _) = broadcast::channel(TYPING_CAPACITY);
        let (connected_tx, connected) = watch::channel(false);

        subscribe_cached_channels(&cache, &commands).await;

        let task = tokio::spawn(notification_loop(
            cache,
            notifications,
            typing.clone(),
            connected_tx,
        ));

        Ok(Self {
            commands,
            typing,
            connected,
            task,
        })
    }

    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }

    /// Watch the connection flag flip to `false` when the socket goes away.
    pub fn connection_state(&self) -> watch::Receiver<bool> {
        self.connected.clone()
    }

    pub fn typing_events(&self) -> broadcast::Receiver<Typing> {
        self.typing.subscribe()
    }

    pub async fn subscribe(&self, channel_id: &str) -> Result<()> {
        self.send(RealtimeCommand::Subscribe(channel_id.to_string()))
            .await
    }

    pub async fn unsubscribe(&self, channel_id: &str) -> Result<()> {
        self.send(RealtimeCommand::Unsubscribe(channel_id.to_string()))
            .await
    }

    pub async fn send_typing(&self, channel_id: &str) -> Result<()> {
        self.send(RealtimeCommand::Typing(channel_id.to_string()))
            .await
    }

    /// Close the socket and wait for the event loop to drain.
    pub async fn shutdown(self) {
        let _ = self.commands.send(RealtimeCommand::Shutdown).await;
        if let Err(e) = self.task.await {
            warn!(error = %e, "Real-time bridge task failed");
        }
    }

    /// Resolves once the connection has ended for any reason.
    pub async fn closed(&mut self) {
        while self.connected.changed().await.is_ok() {}
    }

    async fn send(&self, command: RealtimeCommand) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| ClientError::from(RealtimeError::Closed))
    }
}

async fn subscribe_cached_channels(cache: &LocalCache, commands: &mpsc::Sender<RealtimeCommand>) {
    let channels = match cache.read(|db| db.list_all::<Channel>()) {
        Ok(channels) => channels,
        Err(e) => {
            warn!(error = %e, "Could not list cached channels to subscribe");
            return;
        }
    };

    for channel in &channels {
        debug!(channel = %channel.id, "Auto-subscribing to channel");
        let _ = commands
            .send(RealtimeCommand::Subscribe(channel.id.clone()))
            .await;
    }

    info!(count = channels.len(), "Subscribed to cached channels");
}

async fn notification_loop(
    cache: LocalCache,
    mut notifications: mpsc::Receiver<RealtimeNotification>,
    typing: broadcast::Sender<Typing>,
    connected: watch::Sender<bool>,
) {
    info!("Real-time bridge started");

    while let Some(notification) = notifications.recv().await {
        match notification {
            RealtimeNotification::Connected => {
                connected.send_replace(true);
            }

            RealtimeNotification::Event(ServerEvent::Typing(t)) => {
                let _ = typing.send(t);
            }

            RealtimeNotification::Event(event) => {
                if let Err(e) = apply_event(&cache, &event) {
                    warn!(error = %e, kind = ?event.entity_kind(), "Failed to apply real-time event");
                }
            }

            RealtimeNotification::Disconnected { reason } => {
                info!(reason = %reason, "Real-time connection ended");
                break;
            }
        }
    }

    connected.send_replace(false);
    info!("Real-time bridge stopped");
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
    use axum::response::Response;
    use axum::routing::get;
    use axum::Router;
    use teamhub_shared::protocol::{ClientFrame, EntityRef, MessageRef};
    use teamhub_shared::{fixtures, ChannelKind};

    use crate::cache::CacheChange;
    use crate::testing;

    #[test]
    fn upserts_and_deletes_reach_the_cache() {
        let cache = LocalCache::open_in_memory().unwrap();

        apply_event(&cache, &ServerEvent::TaskUpserted(fixtures::task("t-1", "w-1"))).unwrap();
        assert!(cache.read(|db| db.find::<Task>("t-1")).unwrap().is_some());

        apply_event(&cache, &ServerEvent::TaskDeleted(EntityRef { id: "t-1".into() })).unwrap();
        assert!(cache.read(|db| db.find::<Task>("t-1")).unwrap().is_none());

        // Unknown ids are ignored.
        apply_event(&cache, &ServerEvent::BugDeleted(EntityRef { id: "b-404".into() })).unwrap();
    }

    #[test]
    fn pushed_profile_keeps_the_session() {
        let cache = LocalCache::open_in_memory().unwrap();
        let session = teamhub_shared::AuthSession {
            account: fixtures::account("a-1", "ann@example.com"),
            user: fixtures::user("u-1", "ann@example.com"),
        };
        cache.write_untracked(|db| db.save_session(&session)).unwrap();

        let mut renamed = fixtures::user("u-1", "ann@example.com");
        renamed.title = Some("Lead".into());
        apply_event(&cache, &ServerEvent::UserUpserted(renamed)).unwrap();

        let me = cache.read(|db| db.current_user()).unwrap().unwrap();
        assert_eq!(me.title.as_deref(), Some("Lead"));
        assert_eq!(me.account_id.as_deref(), Some("a-1"));
    }

    #[test]
    fn message_events_follow_their_channel() {
        let cache = LocalCache::open_in_memory().unwrap();
        let channel = fixtures::channel("c-1", "w-1", ChannelKind::Public);
        apply_event(&cache, &ServerEvent::ChannelUpserted(channel)).unwrap();
        for i in 0..3 {
            let m = fixtures::message(&format!("m-{i}"), "c-1", i);
            apply_event(&cache, &ServerEvent::MessageCreated(m)).unwrap();
        }

        apply_event(
            &cache,
            &ServerEvent::MessageDeleted(MessageRef {
                id: "m-0".into(),
                channel_id: "c-1".into(),
            }),
        )
        .unwrap();
        assert_eq!(cache.read(|db| db.count_messages("c-1")).unwrap(), 2);

        apply_event(&cache, &ServerEvent::ChannelDeleted(EntityRef { id: "c-1".into() })).unwrap();
        assert_eq!(cache.read(|db| db.count_messages("c-1")).unwrap(), 0);
        assert!(cache.read(|db| db.find::<Channel>("c-1")).unwrap().is_none());
    }

    #[test]
    fn pong_and_typing_leave_cache_untouched() {
        let cache = LocalCache::open_in_memory().unwrap();
        let mut rx = cache.subscribe();
        apply_event(&cache, &ServerEvent::Pong).unwrap();
        apply_event(
            &cache,
            &ServerEvent::Typing(Typing {
                channel_id: "c-1".into(),
                user_id: "u-2".into(),
            }),
        )
        .unwrap();
        assert!(rx.try_recv().is_err());
    }

    async fn push_session(mut socket: WebSocket) {
        // Wait for the auto-subscribe before pushing anything.
        while let Some(Ok(msg)) = socket.recv().await {
            if let WsMessage::Text(text) = msg {
                if let Ok(ClientFrame::Subscribe { channel_id }) = ClientFrame::from_json(&text) {
                    let typing = ServerEvent::Typing(Typing {
                        channel_id: channel_id.clone(),
                        user_id: "u-2".into(),
                    });
                    let created =
                        ServerEvent::MessageCreated(fixtures::message("m-9", &channel_id, 9));
                    for event in [typing, created] {
                        let _ = socket.send(WsMessage::Text(event.to_json().unwrap())).await;
                    }
                    break;
                }
            }
        }
        // Stay open until the client hangs up.
        while let Some(Ok(_)) = socket.recv().await {}
    }

    async fn push(ws: WebSocketUpgrade) -> Response {
        ws.on_upgrade(push_session)
    }

    #[tokio::test]
    async fn bridge_applies_pushed_events() {
        let addr = testing::serve(Router::new().route("/ws", get(push))).await;
        let cache = LocalCache::open_in_memory().unwrap();
        cache
            .upsert(&fixtures::channel("c-1", "w-1", ChannelKind::Public))
            .unwrap();
        let mut changes = cache.subscribe();

        let config = RealtimeConfig {
            url: format!("ws://{addr}/ws"),
            token: Some("tok".into()),
            ping_interval: Duration::from_secs(3600),
        };
        let bridge = RealtimeBridge::start(config, cache.clone()).await.unwrap();
        let mut typing = bridge.typing_events();

        let t = tokio::time::timeout(Duration::from_secs(5), typing.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(t.user_id, "u-2");

        let change = tokio::time::timeout(Duration::from_secs(5), changes.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(
            change,
            CacheChange::Upserted {
                kind: teamhub_shared::EntityKind::Message,
                id: "m-9".into()
            }
        );
        assert!(bridge.is_connected());

        let state = bridge.connection_state();
        bridge.shutdown().await;
        assert!(!*state.borrow());
    }

    #[tokio::test]
    async fn start_fails_on_refused_connection() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let config = RealtimeConfig::new(format!("ws://{addr}/ws"), None);
        let err = RealtimeBridge::start(config, LocalCache::open_in_memory().unwrap())
            .await
            .err()
            .unwrap();
        assert!(matches!(err, ClientError::Realtime(_)));
    }
}
