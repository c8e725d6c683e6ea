//! Presence tracking: distinct users currently online.
//!
//! Keyed by user id. A user with several open tabs has one entry, so
//! `current_count()` reports distinct users, not open connections. Eviction
//! is driven by the connection registry scan, never by the local counter.

use std::collections::HashMap;

/// Presence state for one user id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceEntry {
    /// Last-seen display name for this user id.
    pub user_name: String,
    /// Open connections claiming this user id (>= 1 while present).
    pub connection_count: u32,
}

/// Map of user id to presence state.
#[derive(Debug, Default)]
pub struct PresenceTracker {
    entries: HashMap<String, PresenceEntry>,
}

impl PresenceTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a new connection for a user: insert on first sight, otherwise
    /// increment the connection count and refresh the display name.
    pub fn on_connect(&mut self, user_id: &str, user_name: &str) {
        self.entries
            .entry(user_id.to_string())
            .and_modify(|entry| {
                entry.connection_count += 1;
                entry.user_name = user_name.to_string();
            })
            .or_insert_with(|| PresenceEntry {
                user_name: user_name.to_string(),
                connection_count: 1,
            });
    }

    /// Record a closed connection for a user.
    ///
    /// `still_has_other_connections` comes from scanning the connection
    /// registry; when false the entry is removed entirely. The stored counter
    /// is informational and never decides eviction.
    pub fn on_disconnect(&mut self, user_id: &str, still_has_other_connections: bool) {
        if !still_has_other_connections {
            self.entries.remove(user_id);
            return;
        }
        if let Some(entry) = self.entries.get_mut(user_id) {
            entry.connection_count = entry.connection_count.saturating_sub(1).max(1);
        }
    }

    /// Number of distinct users currently present.
    pub fn current_count(&self) -> usize {
        self.entries.len()
    }

    pub fn get(&self, user_id: &str) -> Option<&PresenceEntry> {
        self.entries.get(user_id)
    }
}
