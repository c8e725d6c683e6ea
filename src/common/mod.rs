//! Shared utilities used by the server binary and the relay core.

pub mod logger;
pub mod time;
