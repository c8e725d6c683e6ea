//! Bounded message history replayed to newly joined connections.
//!
//! Oldest-first FIFO ring: appending beyond capacity evicts the oldest
//! message. Shared by all connections for the lifetime of the process;
//! nothing survives a restart.

use std::collections::VecDeque;

use super::protocol::ChatMessage;

/// Default ring capacity, matching the production deployment.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Ordered store of the most recent broadcast messages.
#[derive(Debug)]
pub struct HistoryBuffer {
    capacity: usize,
    messages: VecDeque<ChatMessage>,
}

impl HistoryBuffer {
    /// Create a buffer with a fixed capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            messages: VecDeque::with_capacity(capacity),
        }
    }

    /// Append a message, evicting the oldest entry when at capacity.
    pub fn append(&mut self, message: ChatMessage) {
        if self.capacity == 0 {
            return;
        }
        if self.messages.len() == self.capacity {
            self.messages.pop_front();
        }
        self.messages.push_back(message);
    }

    /// Owned copy of the current contents, oldest first. Callers never
    /// observe later mutations through a snapshot.
    pub fn snapshot(&self) -> Vec<ChatMessage> {
        self.messages.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
