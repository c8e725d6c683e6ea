//! Shared relay context and the high-level connection lifecycle operations.
//!
//! Registry, presence map, history buffer, and the message-id sequence live
//! behind a single mutex, so `join`, `publish`, and `leave` each run to
//! completion before the next operation observes the state. That recovers
//! the reference deployment's single-threaded serialization on a
//! multi-threaded runtime: counts are consistent at the moment they are
//! broadcast and message order equals acceptance order.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::common::time::{Clock, SystemClock};

use super::broadcast::{broadcast_to_all, send_to};
use super::history::HistoryBuffer;
use super::presence::PresenceTracker;
use super::protocol::{ChatMessage, ClientFrame, ServerEvent};
use super::registry::{ConnectionId, ConnectionRegistry, Identity, OutboundSender};

struct RelayState {
    registry: ConnectionRegistry,
    presence: PresenceTracker,
    history: HistoryBuffer,
    /// Tie-break for message ids assigned within the same millisecond.
    next_message_seq: u64,
}

/// Process-wide chat state, owned by the server instance and shared with
/// every connection task. One context per server; one context per test.
pub struct ChatContext {
    clock: Arc<dyn Clock>,
    inner: Mutex<RelayState>,
}

impl ChatContext {
    pub fn new(history_capacity: usize) -> Self {
        Self::with_clock(history_capacity, Arc::new(SystemClock))
    }

    /// Context with an injected clock, for deterministic message ids in tests.
    pub fn with_clock(history_capacity: usize, clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            inner: Mutex::new(RelayState {
                registry: ConnectionRegistry::new(),
                presence: PresenceTracker::new(),
                history: HistoryBuffer::new(history_capacity),
                next_message_seq: 0,
            }),
        }
    }

    /// Bring an identified connection into the room.
    ///
    /// Registers the connection, updates presence, broadcasts the new
    /// distinct-user count to all connections (the joiner included), then
    /// replays the history snapshot to the joiner only. The snapshot
    /// reflects the buffer strictly before any message the joiner sends.
    pub async fn join(&self, connection_id: ConnectionId, identity: Identity, sender: OutboundSender) {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;

        state
            .registry
            .register(connection_id, identity.clone(), sender);
        state
            .presence
            .on_connect(&identity.user_id, &identity.user_name);
        tracing::info!("User connected: {} ({})", identity.user_name, identity.user_id);

        let count_event = ServerEvent::UserCount {
            count: state.presence.current_count(),
        }
        .to_json();
        broadcast_to_all(&state.registry, &count_event);

        let history_event = ServerEvent::History {
            messages: state.history.snapshot(),
        }
        .to_json();
        if let Err(e) = send_to(&state.registry, connection_id, &history_event) {
            tracing::warn!("Failed to replay history to new connection: {}", e);
        }
    }

    /// Accept an inbound chat frame: stamp a fresh id, append to history,
    /// and broadcast to every open connection, the sender included.
    ///
    /// The client-supplied timestamp is relayed verbatim; only the id is
    /// server-assigned.
    pub async fn publish(&self, frame: ClientFrame) -> ChatMessage {
        let ClientFrame::Message {
            user_id,
            user_name,
            content,
            timestamp,
        } = frame;

        let mut guard = self.inner.lock().await;
        let state = &mut *guard;

        state.next_message_seq += 1;
        let message = ChatMessage {
            id: format!("{}-{}", self.clock.now_millis(), state.next_message_seq),
            user_id,
            user_name,
            content,
            timestamp,
        };
        state.history.append(message.clone());

        let event = ServerEvent::Message(message.clone()).to_json();
        broadcast_to_all(&state.registry, &event);

        message
    }

    /// Take a connection out of the room after close or transport error.
    ///
    /// Idempotent: a second call for the same connection is a no-op. The
    /// registry scan, not the presence counter, decides whether the user's
    /// presence entry is evicted; the refreshed count is broadcast to the
    /// remaining connections either way.
    pub async fn leave(&self, connection_id: ConnectionId) {
        let mut guard = self.inner.lock().await;
        let state = &mut *guard;

        let Ok(identity) = state.registry.unregister(connection_id) else {
            tracing::debug!("Connection '{}' already unregistered", connection_id);
            return;
        };

        let still_connected = state
            .registry
            .has_other_connections_for(&identity.user_id, connection_id);
        state
            .presence
            .on_disconnect(&identity.user_id, still_connected);
        tracing::info!(
            "User disconnected: {} ({})",
            identity.user_name,
            identity.user_id
        );

        let count_event = ServerEvent::UserCount {
            count: state.presence.current_count(),
        }
        .to_json();
        broadcast_to_all(&state.registry, &count_event);
    }

    /// Current distinct-user count.
    pub async fn user_count(&self) -> usize {
        self.inner.lock().await.presence.current_count()
    }

    /// Number of currently open connections.
    pub async fn connection_count(&self) -> usize {
        self.inner.lock().await.registry.len()
    }

    /// Copy of the current history buffer, oldest first.
    pub async fn history_snapshot(&self) -> Vec<ChatMessage> {
        self.inner.lock().await.history.snapshot()
    }
}
