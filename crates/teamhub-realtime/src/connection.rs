//! WebSocket connection with the tokio mpsc command/notification pattern.
//!
//! [`spawn_realtime`] connects, then hands the socket to a dedicated task.
//! Callers drive the task through [`RealtimeCommand`]s and receive
//! [`RealtimeNotification`]s. There is no reconnect: when the socket closes
//! the task reports `Disconnected` and ends.

use std::time::Duration;

use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;
use tokio_tungstenite::tungstenite::client::IntoClientRequest;
use tokio_tungstenite::tungstenite::http::{header, HeaderValue};
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream};
use tracing::{debug, info, warn};

use teamhub_shared::constants::{DEFAULT_PING_INTERVAL_SECS, REALTIME_CHANNEL_CAPACITY};
use teamhub_shared::protocol::{ClientFrame, ServerEvent};
use teamhub_shared::ProtocolError;

use crate::error::RealtimeError;

type WsSink = SplitSink<WebSocketStream<MaybeTlsStream<TcpStream>>, Message>;

// ---------------------------------------------------------------------------
// Command / notification types
// ---------------------------------------------------------------------------

/// Commands sent *into* the connection task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RealtimeCommand {
    /// Start receiving events for a channel.
    Subscribe(String),
    Unsubscribe(String),
    /// Tell the channel's members that the user is typing.
    Typing(String),
    /// Close the socket and end the task.
    Shutdown,
}

/// Notifications sent *from* the connection task.
#[derive(Debug, Clone, PartialEq)]
pub enum RealtimeNotification {
    Connected,
    Event(ServerEvent),
    /// The socket is gone; no further notifications follow.
    Disconnected { reason: String },
}

#[derive(Clone)]
pub struct RealtimeConfig {
    /// `ws://` or `wss://` endpoint.
    pub url: String,
    /// Bearer token sent in the `Authorization` header of the upgrade request.
    pub token: Option<String>,
    pub ping_interval: Duration,
}

impl std::fmt::Debug for RealtimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RealtimeConfig")
            .field("url", &self.url)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("ping_interval", &self.ping_interval)
            .finish()
    }
}

impl RealtimeConfig {
    pub fn new(url: impl Into<String>, token: Option<String>) -> Self {
        Self {
            url: url.into(),
            token,
            ping_interval: Duration::from_secs(DEFAULT_PING_INTERVAL_SECS),
        }
    }
}

// ---------------------------------------------------------------------------
// Connection task
// ---------------------------------------------------------------------------

/// Connect and spawn the connection task.
///
/// Returns `(command_tx, notification_rx)`. Connection failures are returned
/// directly; once this returns `Ok` the first notification is `Connected`.
pub async fn spawn_realtime(
    config: RealtimeConfig,
) -> Result<
    (
        mpsc::Sender<RealtimeCommand>,
        mpsc::Receiver<RealtimeNotification>,
    ),
    RealtimeError,
> {
    if !(config.url.starts_with("ws://") || config.url.starts_with("wss://")) {
        return Err(RealtimeError::InvalidUrl(config.url));
    }

    let mut request = config.url.as_str().into_client_request()?;
    if let Some(token) = &config.token {
        let value = HeaderValue::from_str(&format!("Bearer {token}"))
            .map_err(|_| RealtimeError::InvalidToken)?;
        request.headers_mut().insert(header::AUTHORIZATION, value);
    }

    let (socket, _response) = tokio_tungstenite::connect_async(request).await?;
    info!(url = %config.url, "Real-time channel connected");

    let (cmd_tx, mut cmd_rx) = mpsc::channel::<RealtimeCommand>(REALTIME_CHANNEL_CAPACITY);
    let (notif_tx, notif_rx) = mpsc::channel::<RealtimeNotification>(REALTIME_CHANNEL_CAPACITY);

    let ping_interval = config.ping_interval;
    tokio::spawn(async move {
        let (mut sink, mut stream) = socket.split();
        let _ = notif_tx.send(RealtimeNotification::Connected).await;

        let mut ping = tokio::time::interval(ping_interval);
        ping.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately.
        ping.tick().await;

        let reason = loop {
            tokio::select! {
                // --- Outgoing commands ---
                cmd = cmd_rx.recv() => {
                    let frame = match cmd {
                        Some(RealtimeCommand::Subscribe(channel_id)) => {
                            ClientFrame::Subscribe { channel_id }
                        }
                        Some(RealtimeCommand::Unsubscribe(channel_id)) => {
                            ClientFrame::Unsubscribe { channel_id }
                        }
                        Some(RealtimeCommand::Typing(channel_id)) => {
                            ClientFrame::Typing { channel_id }
                        }
                        Some(RealtimeCommand::Shutdown) => {
                            info!("Real-time shutdown requested");
                            let _ = sink.send(Message::Close(None)).await;
                            break "shutdown".to_string();
                        }
                        None => {
                            // All senders dropped
                            info!("Command channel closed, closing real-time socket");
                            let _ = sink.send(Message::Close(None)).await;
                            break "command channel closed".to_string();
                        }
                    };
                    if let Err(e) = send_frame(&mut sink, &frame).await {
                        break e.to_string();
                    }
                }

                // --- Keep-alive ---
                _ = ping.tick() => {
                    if let Err(e) = send_frame(&mut sink, &ClientFrame::Ping).await {
                        break e.to_string();
                    }
                }

                // --- Incoming frames ---
                msg = stream.next() => {
                    match msg {
                        Some(Ok(Message::Text(text))) => match ServerEvent::from_json(&text) {
                            Ok(event) => {
                                if notif_tx.send(RealtimeNotification::Event(event)).await.is_err() {
                                    break "notification receiver dropped".to_string();
                                }
                            }
                            Err(e) => warn!(error = %e, "Skipping malformed real-time frame"),
                        },
                        Some(Ok(Message::Binary(data))) => {
                            warn!(error = %ProtocolError::Binary(data.len()), "Skipping real-time frame");
                        }
                        Some(Ok(Message::Close(frame))) => {
                            break frame
                                .map(|f| f.reason.to_string())
                                .filter(|r| !r.is_empty())
                                .unwrap_or_else(|| "closed by server".to_string());
                        }
                        // Ping/pong control frames are answered by tungstenite.
                        Some(Ok(_)) => {}
                        Some(Err(e)) => break e.to_string(),
                        None => break "stream ended".to_string(),
                    }
                }
            }
        };

        info!(reason = %reason, "Real-time channel disconnected");
        let _ = notif_tx
            .send(RealtimeNotification::Disconnected { reason })
            .await;
    });

    Ok((cmd_tx, notif_rx))
}

async fn send_frame(sink: &mut WsSink, frame: &ClientFrame) -> Result<(), RealtimeError> {
    let text = frame.to_json()?;
    debug!(frame = %text, "Sending real-time frame");
    sink.send(Message::Text(text)).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    use axum::extract::ws::{Message as WsMessage, WebSocket, WebSocketUpgrade};
    use axum::http::HeaderMap;
    use axum::response::Response;
    use axum::routing::get;
    use axum::Router;
    use teamhub_shared::fixtures;
    use teamhub_shared::protocol::Typing;

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("ws://{addr}/ws")
    }

    fn config(url: String) -> RealtimeConfig {
        RealtimeConfig {
            url,
            token: Some("tok-1".into()),
            ping_interval: Duration::from_secs(3600),
        }
    }

    async fn chatty(ws: WebSocketUpgrade, headers: HeaderMap) -> Response {
        let auth = headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        ws.on_upgrade(move |socket| chatty_session(socket, auth))
    }

    async fn chatty_session(mut socket: WebSocket, auth: String) {
        let created = ServerEvent::MessageCreated(fixtures::message("m-1", "c-1", 0));
        socket
            .send(WsMessage::Text(created.to_json().unwrap()))
            .await
            .unwrap();
        socket
            .send(WsMessage::Text("{not json".into()))
            .await
            .unwrap();
        socket
            .send(WsMessage::Text(ServerEvent::Pong.to_json().unwrap()))
            .await
            .unwrap();

        while let Some(Ok(msg)) = socket.recv().await {
            if let WsMessage::Text(text) = msg {
                if let Ok(ClientFrame::Subscribe { channel_id }) = ClientFrame::from_json(&text) {
                    let echo = ServerEvent::Typing(Typing {
                        channel_id,
                        user_id: auth.clone(),
                    });
                    socket
                        .send(WsMessage::Text(echo.to_json().unwrap()))
                        .await
                        .unwrap();
                }
            }
        }
    }

    #[tokio::test]
    async fn delivers_events_skips_garbage_and_shuts_down() {
        let url = serve(Router::new().route("/ws", get(chatty))).await;
        let (cmd_tx, mut notif_rx) = spawn_realtime(config(url)).await.unwrap();

        assert_eq!(notif_rx.recv().await, Some(RealtimeNotification::Connected));
        match notif_rx.recv().await {
            Some(RealtimeNotification::Event(ServerEvent::MessageCreated(m))) => {
                assert_eq!(m.id, "m-1")
            }
            other => panic!("unexpected notification: {other:?}"),
        }
        assert_eq!(
            notif_rx.recv().await,
            Some(RealtimeNotification::Event(ServerEvent::Pong))
        );

        cmd_tx
            .send(RealtimeCommand::Subscribe("c-7".into()))
            .await
            .unwrap();
        assert_eq!(
            notif_rx.recv().await,
            Some(RealtimeNotification::Event(ServerEvent::Typing(Typing {
                channel_id: "c-7".into(),
                user_id: "Bearer tok-1".into(),
            })))
        );

        cmd_tx.send(RealtimeCommand::Shutdown).await.unwrap();
        assert_eq!(
            notif_rx.recv().await,
            Some(RealtimeNotification::Disconnected {
                reason: "shutdown".into()
            })
        );
        assert_eq!(notif_rx.recv().await, None);
    }

    #[tokio::test]
    async fn server_close_ends_the_task() {
        let router = Router::new().route(
            "/ws",
            get(|ws: WebSocketUpgrade| async move {
                ws.on_upgrade(|mut socket| async move {
                    let _ = socket.send(WsMessage::Close(None)).await;
                })
            }),
        );
        let url = serve(router).await;
        let (_cmd_tx, mut notif_rx) = spawn_realtime(config(url)).await.unwrap();

        assert_eq!(notif_rx.recv().await, Some(RealtimeNotification::Connected));
        match notif_rx.recv().await {
            Some(RealtimeNotification::Disconnected { reason }) => assert!(!reason.is_empty()),
            other => panic!("unexpected notification: {other:?}"),
        }
    }

    #[tokio::test]
    async fn rejects_bad_url_and_refused_connection() {
        let err = spawn_realtime(config("http://localhost/ws".into()))
            .await
            .unwrap_err();
        assert!(matches!(err, RealtimeError::InvalidUrl(_)));

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let err = spawn_realtime(config(format!("ws://{addr}/ws")))
            .await
            .unwrap_err();
        assert!(matches!(err, RealtimeError::WebSocket(_)));
    }
}
