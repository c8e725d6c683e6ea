//! WebSocket connection handlers and read-only HTTP endpoints.

use std::sync::Arc;

use axum::{
    Json,
    extract::{
        Query, State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    http::StatusCode,
    response::IntoResponse,
};
use futures_util::{sink::SinkExt, stream::StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use super::context::ChatContext;
use super::protocol::ClientFrame;
use super::registry::{ConnectionId, Identity};

/// Query parameters for the WebSocket connection request. Defaults keep a
/// missing parameter indistinguishable from an empty one, so both are
/// refused by the same identity check.
#[derive(Debug, Deserialize)]
pub struct ConnectQuery {
    #[serde(rename = "userId", default)]
    pub user_id: String,
    #[serde(rename = "userName", default)]
    pub user_name: String,
}

/// Upgrade handler for `/chat`.
///
/// A request without a non-empty `userId` and `userName` is refused before
/// any registry or presence mutation.
pub async fn chat_handler(
    ws: WebSocketUpgrade,
    State(context): State<Arc<ChatContext>>,
    Query(query): Query<ConnectQuery>,
) -> Result<impl IntoResponse, StatusCode> {
    let identity = match Identity::new(query.user_id, query.user_name) {
        Ok(identity) => identity,
        Err(e) => {
            tracing::warn!("Rejecting connection: {}", e);
            return Err(StatusCode::BAD_REQUEST);
        }
    };

    Ok(ws.on_upgrade(move |socket| handle_socket(socket, context, identity)))
}

/// Spawns a task that drains the connection's outbound channel into the
/// WebSocket sink. This task is the only writer to the socket, so the order
/// events were queued in is the order the client sees.
fn pusher_loop(
    mut rx: mpsc::UnboundedReceiver<String>,
    mut sender: futures_util::stream::SplitSink<WebSocket, Message>,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            if sender.send(Message::Text(event.into())).await.is_err() {
                break;
            }
        }
    })
}

/// Per-connection lifecycle: join, relay inbound frames, leave on close or
/// transport error. Both paths end in the same `leave`, and `leave` itself
/// is idempotent.
async fn handle_socket(socket: WebSocket, context: Arc<ChatContext>, identity: Identity) {
    let (sender, mut receiver) = socket.split();
    let (tx, rx) = mpsc::unbounded_channel();
    let connection_id = ConnectionId::new();

    context.join(connection_id, identity, tx).await;

    let recv_context = context.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(msg) = receiver.next().await {
            let msg = match msg {
                Ok(msg) => msg,
                Err(e) => {
                    // Treated like a close for bookkeeping purposes.
                    tracing::error!("WebSocket error on '{}': {}", connection_id, e);
                    break;
                }
            };

            match msg {
                Message::Text(text) => match serde_json::from_str::<ClientFrame>(&text) {
                    Ok(frame) => {
                        recv_context.publish(frame).await;
                    }
                    Err(e) => {
                        // Dropped silently; no error goes back to the client.
                        tracing::warn!("Dropping malformed frame from '{}': {}", connection_id, e);
                    }
                },
                Message::Close(_) => {
                    tracing::info!("Connection '{}' requested close", connection_id);
                    break;
                }
                Message::Ping(_) => {
                    tracing::debug!("Received ping");
                    // Ping/pong is handled automatically by the WebSocket protocol
                }
                _ => {}
            }
        }
    });

    let mut send_task = pusher_loop(rx, sender);

    // If any one of the tasks completes, abort the other
    tokio::select! {
        _ = &mut recv_task => send_task.abort(),
        _ = &mut send_task => recv_task.abort(),
    };

    context.leave(connection_id).await;
}

/// Snapshot of relay counters exposed at `/api/chat/stats`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatStats {
    pub user_count: usize,
    pub connection_count: usize,
    pub buffered_messages: usize,
}

/// Read-only stats endpoint; mutation stays with the lifecycle handler.
pub async fn chat_stats(State(context): State<Arc<ChatContext>>) -> Json<ChatStats> {
    Json(ChatStats {
        user_count: context.user_count().await,
        connection_count: context.connection_count().await,
        buffered_messages: context.history_snapshot().await.len(),
    })
}

/// Health check endpoint
pub async fn health_check() -> Json<serde_json::Value> {
    Json(serde_json::json!({"status": "ok"}))
}
