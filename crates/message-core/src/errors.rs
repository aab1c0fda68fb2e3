//! Error types for message posting and bus configuration

use thiserror::Error;

/// Result type alias using the crate's error type
pub type Result<T> = std::result::Result<T, MessageError>;

/// Errors reported by a [`Poster`](crate::message::Poster) implementation or
/// while configuring one.
///
/// Failures raised inside a listener callback are not represented here: they
/// are handled by the dispatcher's panic policy (see
/// [`MessageBusConfig::catch_listener_panics`](crate::bus::MessageBusConfig)).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MessageError {
    /// The bus was closed and no longer accepts messages
    #[error("Message bus is closed")]
    BusClosed,

    /// A bounded delivery queue had no room for the message
    #[error("Message queue is full (capacity {capacity})")]
    QueueFull {
        /// Configured queue capacity
        capacity: usize,
    },

    /// Queued delivery was requested outside of a tokio runtime
    #[error("Queued delivery requires a running tokio runtime")]
    NoRuntime,

    /// Invalid or unreadable configuration
    #[error("Configuration error: {0}")]
    Config(String),
}

impl MessageError {
    /// Whether retrying the same post later could succeed
    pub fn is_transient(&self) -> bool {
        matches!(self, MessageError::QueueFull { .. })
    }
}
