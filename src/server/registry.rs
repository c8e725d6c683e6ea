//! Connection registry: maps each live connection to its claimed identity.
//!
//! A pure associative store mutated only by the connection lifecycle. Entries
//! carry the outbound channel for the socket so the broadcast engine can
//! reach every open connection.

use std::collections::HashMap;
use std::fmt;

use tokio::sync::mpsc;
use uuid::Uuid;

use super::error::RelayError;

/// Outbound channel for one connection. The socket writer task drains the
/// receiving half, so sends never block the caller.
pub type OutboundSender = mpsc::UnboundedSender<String>;

/// Opaque identifier for one live connection.
///
/// Identity is claimed per connection, not per user: the same user id may be
/// behind several connections (multiple tabs), so registry entries are keyed
/// by a fresh UUID rather than by the user id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ConnectionId(Uuid);

impl ConnectionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ConnectionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ConnectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Claimed identity supplied at connect time. Both values are opaque strings;
/// the relay does not validate them against the blog's user store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub user_id: String,
    pub user_name: String,
}

impl Identity {
    /// Build an identity, refusing empty or whitespace-only values.
    pub fn new(
        user_id: impl Into<String>,
        user_name: impl Into<String>,
    ) -> Result<Self, RelayError> {
        let user_id = user_id.into();
        let user_name = user_name.into();
        if user_id.trim().is_empty() || user_name.trim().is_empty() {
            return Err(RelayError::IdentityMissing);
        }
        Ok(Self { user_id, user_name })
    }
}

/// One registered connection: the claimed identity plus its outbound channel.
pub struct RegisteredConnection {
    pub identity: Identity,
    pub sender: OutboundSender,
}

/// Associative store of all currently open connections.
#[derive(Default)]
pub struct ConnectionRegistry {
    entries: HashMap<ConnectionId, RegisteredConnection>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the mapping for a newly identified connection.
    pub fn register(&mut self, id: ConnectionId, identity: Identity, sender: OutboundSender) {
        self.entries
            .insert(id, RegisteredConnection { identity, sender });
    }

    /// Remove the mapping and return the identity that was associated.
    ///
    /// Calling this twice for the same connection returns `NotRegistered`;
    /// the caller treats that as a no-op, not as a fatal condition.
    pub fn unregister(&mut self, id: ConnectionId) -> Result<Identity, RelayError> {
        self.entries
            .remove(&id)
            .map(|connection| connection.identity)
            .ok_or(RelayError::NotRegistered(id))
    }

    /// Whether any other live connection still claims the given user id.
    ///
    /// This scan is the source of truth for presence eviction; the presence
    /// tracker never trusts its own counter over registry membership.
    pub fn has_other_connections_for(&self, user_id: &str, excluding: ConnectionId) -> bool {
        self.entries
            .iter()
            .any(|(id, connection)| *id != excluding && connection.identity.user_id == user_id)
    }

    pub fn get(&self, id: ConnectionId) -> Option<&RegisteredConnection> {
        self.entries.get(&id)
    }

    /// Iterate over all registered connections (no ordering guarantee).
    pub fn iter(&self) -> impl Iterator<Item = (&ConnectionId, &RegisteredConnection)> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_identity(user_id: &str, user_name: &str) -> Identity {
        Identity::new(user_id, user_name).unwrap()
    }

    fn test_sender() -> OutboundSender {
        let (tx, _rx) = mpsc::unbounded_channel();
        tx
    }

    #[test]
    fn test_identity_rejects_empty_user_id() {
        // given / when:
        let result = Identity::new("", "Alice");

        // then:
        assert_eq!(result, Err(RelayError::IdentityMissing));
    }

    #[test]
    fn test_identity_rejects_empty_user_name() {
        // given / when:
        let result = Identity::new("u1", "");

        // then:
        assert_eq!(result, Err(RelayError::IdentityMissing));
    }

    #[test]
    fn test_identity_rejects_whitespace_only_values() {
        // given / when:
        let result = Identity::new("   ", "Alice");

        // then:
        assert_eq!(result, Err(RelayError::IdentityMissing));
    }

    #[test]
    fn test_register_and_unregister_returns_identity() {
        // given:
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::new();
        registry.register(id, test_identity("u1", "Alice"), test_sender());
        assert_eq!(registry.len(), 1);

        // when:
        let result = registry.unregister(id);

        // then:
        assert_eq!(result, Ok(test_identity("u1", "Alice")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_unregister_twice_signals_not_registered() {
        // given:
        let mut registry = ConnectionRegistry::new();
        let id = ConnectionId::new();
        registry.register(id, test_identity("u1", "Alice"), test_sender());
        registry.unregister(id).unwrap();

        // when:
        let result = registry.unregister(id);

        // then:
        assert_eq!(result, Err(RelayError::NotRegistered(id)));
    }

    #[test]
    fn test_has_other_connections_for_same_user() {
        // given: two tabs for u1, one for u2
        let mut registry = ConnectionRegistry::new();
        let tab1 = ConnectionId::new();
        let tab2 = ConnectionId::new();
        let other = ConnectionId::new();
        registry.register(tab1, test_identity("u1", "Alice"), test_sender());
        registry.register(tab2, test_identity("u1", "Alice"), test_sender());
        registry.register(other, test_identity("u2", "Bob"), test_sender());

        // when / then: the sibling tab still counts, the user's own
        // connection and unrelated users do not
        assert!(registry.has_other_connections_for("u1", tab1));
        assert!(registry.has_other_connections_for("u1", tab2));
        assert!(!registry.has_other_connections_for("u2", other));
    }

    #[test]
    fn test_has_other_connections_for_after_removal() {
        // given:
        let mut registry = ConnectionRegistry::new();
        let tab1 = ConnectionId::new();
        let tab2 = ConnectionId::new();
        registry.register(tab1, test_identity("u1", "Alice"), test_sender());
        registry.register(tab2, test_identity("u1", "Alice"), test_sender());

        // when: the first tab closes
        registry.unregister(tab1).unwrap();
        let after_first = registry.has_other_connections_for("u1", tab1);
        registry.unregister(tab2).unwrap();
        let after_last = registry.has_other_connections_for("u1", tab2);

        // then:
        assert!(after_first);
        assert!(!after_last);
    }
}
