//! Event delivery to connections.
//!
//! Each send goes over the connection's unbounded channel and is therefore
//! non-blocking. A failed send means the receiving half is gone (the socket
//! writer task exited); during a broadcast that failure is logged and the
//! remaining recipients still get the event.

use super::error::RelayError;
use super::registry::{ConnectionId, ConnectionRegistry};

/// Deliver an event to every currently registered connection.
///
/// Per-recipient failures are isolated: one broken connection never aborts
/// delivery to the rest.
pub fn broadcast_to_all(registry: &ConnectionRegistry, event: &str) {
    for (id, connection) in registry.iter() {
        if connection.sender.send(event.to_string()).is_err() {
            tracing::warn!("Failed to deliver event to connection '{}', skipping", id);
        }
    }
}

/// Deliver an event to a single connection (used for the history replay).
pub fn send_to(
    registry: &ConnectionRegistry,
    connection_id: ConnectionId,
    event: &str,
) -> Result<(), RelayError> {
    let connection = registry
        .get(connection_id)
        .ok_or(RelayError::NotRegistered(connection_id))?;
    connection
        .sender
        .send(event.to_string())
        .map_err(|_| RelayError::Delivery(connection_id))
}
