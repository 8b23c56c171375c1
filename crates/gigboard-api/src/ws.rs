//! Real-time gig change feed over WebSocket with backpressure support.

use std::collections::HashSet;
use std::sync::atomic::{AtomicI64, Ordering};
use std::time::{Duration, Instant};

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::response::Response;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::{broadcast, mpsc};
use tokio::time::interval;
use tracing::{debug, info, warn};

use gigboard_events::TopicMessage;
use gigboard_models::EventKind;

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;

/// Global counter for active WebSocket connections.
///
/// Only moved once the upgrade completes; a handshake that never completes
/// leaves it untouched.
static ACTIVE_WS_CONNECTIONS: AtomicI64 = AtomicI64::new(0);

const WS_SEND_BUFFER_SIZE: usize = 32;
const WS_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);
const ENDPOINT: &str = "gigs";

#[derive(Debug, Default, Deserialize)]
pub struct WsQuery {
    /// Comma-separated topic names; all topics when absent
    #[serde(default)]
    pub topics: Option<String>,
}

/// Topics a client subscribed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicFilter {
    topics: Option<HashSet<&'static str>>,
}

impl TopicFilter {
    pub fn parse(raw: Option<&str>) -> ApiResult<Self> {
        let names: Vec<&str> = raw
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect();

        if names.is_empty() {
            return Ok(Self { topics: None });
        }

        let mut topics = HashSet::new();
        for name in names {
            let kind = EventKind::from_topic(name)
                .ok_or_else(|| ApiError::validation(format!("Unknown topic '{}'", name)))?;
            topics.insert(kind.topic());
        }
        Ok(Self {
            topics: Some(topics),
        })
    }

    pub fn allows(&self, topic: &str) -> bool {
        self.topics.as_ref().map_or(true, |t| t.contains(topic))
    }
}

/// Counts one upgraded connection for as long as it is alive, including when
/// the socket task is cancelled.
struct ConnectionGuard;

impl ConnectionGuard {
    fn acquire() -> Self {
        let count = ACTIVE_WS_CONNECTIONS.fetch_add(1, Ordering::SeqCst) + 1;
        metrics::set_ws_active_connections(count);
        metrics::record_ws_connection(ENDPOINT);
        Self
    }
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        let count = ACTIVE_WS_CONNECTIONS.fetch_sub(1, Ordering::SeqCst) - 1;
        metrics::set_ws_active_connections(count);
    }
}

/// Number of WebSocket subscribers currently connected.
pub fn active_connections() -> i64 {
    ACTIVE_WS_CONNECTIONS.load(Ordering::SeqCst)
}

/// Send a frame, waiting for buffer space when the client is slow.
async fn send_frame(tx: &mpsc::Sender<Message>, frame: &TopicMessage) -> bool {
    let json = match serde_json::to_string(frame) {
        Ok(j) => j,
        Err(e) => {
            warn!("Failed to serialize frame: {}", e);
            return true;
        }
    };

    match tx.try_send(Message::Text(json)) {
        Ok(()) => true,
        Err(mpsc::error::TrySendError::Full(msg)) => {
            debug!("WebSocket send buffer full, applying backpressure");
            tx.send(msg).await.is_ok()
        }
        Err(mpsc::error::TrySendError::Closed(_)) => false,
    }
}

/// Gig change feed endpoint: `GET /ws/gigs?topics=newGig,deleteGig`.
pub async fn ws_gigs(
    ws: WebSocketUpgrade,
    Query(query): Query<WsQuery>,
    State(state): State<AppState>,
) -> ApiResult<Response> {
    let filter = TopicFilter::parse(query.topics.as_deref())?;
    let events = state.hub.subscribe();

    Ok(ws.on_upgrade(move |socket| async move {
        let _connection = ConnectionGuard::acquire();
        handle_socket(socket, events, filter).await;
    }))
}

async fn handle_socket(
    socket: WebSocket,
    mut events: broadcast::Receiver<TopicMessage>,
    filter: TopicFilter,
) {
    let (ws_sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<Message>(WS_SEND_BUFFER_SIZE);

    let send_task = tokio::spawn(async move {
        let mut ws_sender = ws_sender;
        while let Some(msg) = rx.recv().await {
            if ws_sender.send(msg).await.is_err() {
                break;
            }
        }
        let _ = ws_sender.close().await;
    });

    info!("WebSocket subscriber connected");

    let mut heartbeat = interval(WS_HEARTBEAT_INTERVAL);
    let mut last_activity = Instant::now();

    loop {
        tokio::select! {
            event = events.recv() => {
                match event {
                    Ok(frame) => {
                        if !filter.allows(&frame.event) {
                            continue;
                        }
                        last_activity = Instant::now();
                        if !send_frame(&tx, &frame).await {
                            warn!("WebSocket send failed, client disconnected");
                            break;
                        }
                        metrics::record_ws_message_sent(&frame.event);
                    }
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "WebSocket subscriber lagging, frames dropped");
                        metrics::record_ws_messages_dropped(skipped);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
            _ = heartbeat.tick() => {
                if last_activity.elapsed() > WS_HEARTBEAT_INTERVAL / 2
                    && tx.send(Message::Ping(Vec::new())).await.is_err()
                {
                    warn!("Heartbeat failed, client disconnected");
                    break;
                }
            }
            client_msg = receiver.next() => {
                match client_msg {
                    Some(Ok(Message::Pong(_))) => {
                        last_activity = Instant::now();
                    }
                    Some(Ok(Message::Close(_))) | None => {
                        info!("Client closed connection");
                        break;
                    }
                    Some(Err(e)) => {
                        debug!("WebSocket receive error: {}", e);
                        break;
                    }
                    _ => {}
                }
            }
        }
    }

    drop(tx);
    let _ = send_task.await;
}
