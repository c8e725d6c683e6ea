//! Real-time global chat relay for the blog platform.
//!
//! A single-room WebSocket broadcast server: clients connect with a claimed
//! identity, receive a replay of recent messages, and every accepted message
//! and presence change is fanned out to all open connections.

pub mod common;
pub mod server;
