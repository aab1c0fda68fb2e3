//! # PlayKit Message Core
//!
//! Typed listener messages for the PlayKit player stack.
//!
//! Event producers (the player, the ad module) describe what should happen to
//! a listener as a [`PkMessage`] - usually a closure - and hand it to a
//! [`Poster`]. The poster decides when and against which listeners the
//! message runs. Player messages and ads messages travel through separate
//! entry points, so a message written for player listeners can never be run
//! against an ads listener.
//!
//! ## Modules
//!
//! - [`message`] - the [`PkMessage`] / [`Poster`] contract
//! - [`listener`] - [`PlayerListener`], [`AdsListener`] and [`EventListener`]
//! - [`events`] - player and ad event values and subscription filters
//! - [`bus`] - [`MessageBus`], the registry-backed [`Poster`]
//! - [`logging`] - `tracing` subscriber setup
//!
//! ## Quick Start
//!
//! ```rust
//! use playkit_message_core::prelude::*;
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! #[derive(Default)]
//! struct AdWatcher {
//!     started: AtomicBool,
//! }
//!
//! impl AdsListener for AdWatcher {
//!     fn on_ad_started(&self, _ad: &AdInfo) {
//!         self.started.store(true, Ordering::SeqCst);
//!     }
//! }
//!
//! let bus = MessageBus::new();
//! let watcher = Arc::new(AdWatcher::default());
//! bus.add_ads_listener(watcher.clone());
//!
//! let ad = AdInfo { ad_id: "preroll".into(), ..Default::default() };
//! bus.post_to_ads(move |listener| listener.on_ad_started(&ad)).unwrap();
//!
//! assert!(watcher.started.load(Ordering::SeqCst));
//! ```

pub mod bus;
pub mod errors;
pub mod events;
pub mod listener;
pub mod logging;
pub mod message;

pub use bus::{DeliveryMode, DeliveryStats, GroupId, ListenerId, MessageBus, MessageBusConfig};
pub use errors::{MessageError, Result};
pub use events::{AdEvent, EventFilter, PkEvent, PlayerEvent};
pub use listener::{AdsListener, EventListener, PlayerListener};
pub use message::{AdsMessage, PkMessage, PlayerMessage, Poster, PosterExt};

/// Common imports for producers and listeners
pub mod prelude {
    pub use crate::bus::{DeliveryMode, GroupId, ListenerId, MessageBus, MessageBusConfig};
    pub use crate::errors::{MessageError, Result};
    pub use crate::events::{
        AdError, AdErrorType, AdEvent, AdInfo, EventCategory, EventFilter, PkEvent, PlayerError,
        PlayerEvent, PlayerState,
    };
    pub use crate::listener::{AdsListener, EventListener, PlayerListener};
    pub use crate::message::{AdsMessage, PkMessage, PlayerMessage, Poster, PosterExt};
}
