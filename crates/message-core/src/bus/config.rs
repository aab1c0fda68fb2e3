//! Message bus configuration
//!
//! ```rust
//! use playkit_message_core::bus::{DeliveryMode, MessageBusConfig};
//!
//! let config = MessageBusConfig::from_toml_str(r#"
//!     [delivery]
//!     mode = "queued"
//!     capacity = 256
//! "#).unwrap();
//!
//! assert_eq!(config.delivery, DeliveryMode::Queued { capacity: Some(256) });
//! assert!(config.catch_listener_panics);
//! ```
//!
//! Queued delivery always contains listener panics: a panic on the worker
//! task has no caller to reach, so [`MessageBusConfig::validate`] rejects
//! `catch_listener_panics = false` together with a queue.

use serde::{Deserialize, Serialize};

use crate::errors::{MessageError, Result};

/// How posted messages reach listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Run listeners synchronously on the posting thread before `post*` returns
    Immediate,
    /// Hand messages to a single tokio task that delivers them in post order.
    /// `capacity` bounds the queue; `None` leaves it unbounded.
    Queued { capacity: Option<usize> },
}

impl Default for DeliveryMode {
    fn default() -> Self {
        DeliveryMode::Immediate
    }
}

/// Configuration for a [`MessageBus`](super::MessageBus)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageBusConfig {
    /// Delivery model
    pub delivery: DeliveryMode,
    /// Contain a panicking listener and continue with the next one.
    /// When disabled the panic propagates to the poster, which is only
    /// possible with immediate delivery.
    pub catch_listener_panics: bool,
}

impl Default for MessageBusConfig {
    fn default() -> Self {
        Self {
            delivery: DeliveryMode::Immediate,
            catch_listener_panics: true,
        }
    }
}

impl MessageBusConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver through an unbounded queue
    pub fn queued(mut self) -> Self {
        self.delivery = DeliveryMode::Queued { capacity: None };
        self
    }

    /// Deliver through a queue holding at most `capacity` pending messages
    pub fn queued_with_capacity(mut self, capacity: usize) -> Self {
        self.delivery = DeliveryMode::Queued {
            capacity: Some(capacity),
        };
        self
    }

    pub fn with_delivery(mut self, delivery: DeliveryMode) -> Self {
        self.delivery = delivery;
        self
    }

    pub fn with_catch_listener_panics(mut self, catch: bool) -> Self {
        self.catch_listener_panics = catch;
        self
    }

    /// Check the configuration for values the bus cannot run with
    pub fn validate(&self) -> Result<()> {
        if let DeliveryMode::Queued { capacity } = self.delivery {
            if capacity == Some(0) {
                return Err(MessageError::Config(
                    "queue capacity must be greater than zero".to_string(),
                ));
            }
            if !self.catch_listener_panics {
                return Err(MessageError::Config(
                    "queued delivery requires catch_listener_panics".to_string(),
                ));
            }
        }
        Ok(())
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: MessageBusConfig = toml::from_str(input)
            .map_err(|e| MessageError::Config(format!("Failed to parse bus config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = MessageBusConfig::default();
        assert_eq!(config.delivery, DeliveryMode::Immediate);
        assert!(config.catch_listener_panics);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_methods() {
        let config = MessageBusConfig::new()
            .queued_with_capacity(32)
            .with_catch_listener_panics(false);
        assert_eq!(config.delivery, DeliveryMode::Queued { capacity: Some(32) });
        assert!(!config.catch_listener_panics);

        let config = config.queued();
        assert_eq!(config.delivery, DeliveryMode::Queued { capacity: None });

        let config = config.with_delivery(DeliveryMode::Immediate);
        assert_eq!(config.delivery, DeliveryMode::Immediate);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let config = MessageBusConfig::new().queued_with_capacity(0);
        assert!(matches!(config.validate(), Err(MessageError::Config(_))));
    }

    #[test]
    fn test_queued_without_panic_isolation_rejected() {
        let config = MessageBusConfig::new()
            .queued_with_capacity(8)
            .with_catch_listener_panics(false);
        assert_eq!(
            config.validate(),
            Err(MessageError::Config(
                "queued delivery requires catch_listener_panics".to_string()
            ))
        );

        let err = MessageBusConfig::from_toml_str(
            r#"
            catch_listener_panics = false

            [delivery]
            mode = "queued"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, MessageError::Config(_)));

        // Uncaught panics stay available with immediate delivery
        let config = MessageBusConfig::new().with_catch_listener_panics(false);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_empty_toml_gives_defaults() {
        let config = MessageBusConfig::from_toml_str("").unwrap();
        assert_eq!(config, MessageBusConfig::default());
    }

    #[test]
    fn test_unbounded_queue_from_toml() {
        let config = MessageBusConfig::from_toml_str(
            r#"
            [delivery]
            mode = "queued"
            "#,
        )
        .unwrap();
        assert_eq!(config.delivery, DeliveryMode::Queued { capacity: None });
        assert!(config.catch_listener_panics);
    }

    #[test]
    fn test_invalid_toml_reports_config_error() {
        let err = MessageBusConfig::from_toml_str(
            r#"
            [delivery]
            mode = "broadcast"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, MessageError::Config(_)));

        let err = MessageBusConfig::from_toml_str(
            r#"
            [delivery]
            mode = "queued"
            capacity = 0
            "#,
        )
        .unwrap_err();
        assert_eq!(
            err,
            MessageError::Config("queue capacity must be greater than zero".to_string())
        );
    }
}
