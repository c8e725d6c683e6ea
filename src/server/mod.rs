//! WebSocket chat relay implementation.

pub mod broadcast;
pub mod context;
pub mod error;
pub mod history;
pub mod presence;
pub mod protocol;
pub mod registry;

mod handler;
mod runner;
mod signal;

pub use context::ChatContext;
pub use runner::run_server;
