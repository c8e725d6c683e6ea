//! Error taxonomy for the chat relay.
//!
//! None of these are fatal to the process: identity failures refuse a single
//! connection, delivery failures are isolated per recipient, and everything
//! else is handled at the point of occurrence.

use thiserror::Error;

use super::registry::ConnectionId;

/// Errors raised by the relay core.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RelayError {
    /// The connection request did not carry a non-empty user id and user name.
    #[error("connection is missing a user id or user name")]
    IdentityMissing,

    /// The connection is not (or no longer) present in the registry.
    #[error("connection '{0}' is not registered")]
    NotRegistered(ConnectionId),

    /// An event could not be delivered to a single recipient.
    #[error("failed to deliver event to connection '{0}'")]
    Delivery(ConnectionId),
}
