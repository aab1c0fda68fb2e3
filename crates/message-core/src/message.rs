//! The message contract
//!
//! A [`PkMessage`] is a deferred action to run against a listener. Producers
//! describe *what* should happen to a listener without holding a reference to
//! any listener; a [`Poster`] decides *when* and *against which* listeners it
//! runs.
//!
//! Closures are messages:
//!
//! ```rust
//! use playkit_message_core::listener::PlayerListener;
//! use playkit_message_core::message::PlayerMessage;
//! use std::sync::atomic::{AtomicBool, Ordering};
//!
//! #[derive(Default)]
//! struct Flag(AtomicBool);
//!
//! impl PlayerListener for Flag {
//!     fn on_playing(&self) {
//!         self.0.store(true, Ordering::SeqCst);
//!     }
//! }
//!
//! let message: PlayerMessage =
//!     Box::new(|listener: &(dyn PlayerListener + 'static)| listener.on_playing());
//! let flag = Flag::default();
//! message.run(&flag);
//! assert!(flag.0.load(Ordering::SeqCst));
//! ```
//!
//! Call sites normally go through [`PosterExt`]:
//!
//! ```rust
//! use playkit_message_core::bus::MessageBus;
//! use playkit_message_core::message::PosterExt;
//!
//! let bus = MessageBus::new();
//! bus.post_to_players(|listener| listener.on_playing()).unwrap();
//! bus.post_to_ads(|listener| listener.on_ad_completed()).unwrap();
//! ```

use crate::errors::Result;
use crate::events::PkEvent;
use crate::listener::{AdsListener, PlayerListener};

/// A deferred action parameterized by the listener type it runs against
///
/// `run` borrows the message, so a dispatcher can run one posted message
/// against each of its registered listeners.
pub trait PkMessage<L: ?Sized>: Send + Sync + 'static {
    /// Execute the captured action against `listener`
    fn run(&self, listener: &L);
}

impl<L, F> PkMessage<L> for F
where
    L: ?Sized,
    F: Fn(&L) + Send + Sync + 'static,
{
    fn run(&self, listener: &L) {
        (self)(listener)
    }
}

/// A message for player listeners
pub type PlayerMessage = Box<dyn PkMessage<dyn PlayerListener>>;

/// A message for ads listeners
pub type AdsMessage = Box<dyn PkMessage<dyn AdsListener>>;

/// Dispatch capability for events and listener messages
///
/// The entry point that is called selects the listener registry; the payload
/// is never inspected to decide where it goes.
pub trait Poster: Send + Sync {
    /// Post a generic event to every generic event listener
    fn post(&self, event: PkEvent) -> Result<()>;

    /// Run `message` against every player listener
    fn post_player_event(&self, message: PlayerMessage) -> Result<()>;

    /// Run `message` against every ads listener
    fn post_ads_event(&self, message: AdsMessage) -> Result<()>;
}

/// Closure-friendly helpers available on every [`Poster`]
pub trait PosterExt: Poster {
    /// Post a closure as a player message
    fn post_to_players<F>(&self, action: F) -> Result<()>
    where
        F: Fn(&dyn PlayerListener) + Send + Sync + 'static,
    {
        self.post_player_event(Box::new(
            move |listener: &(dyn PlayerListener + 'static)| action(listener),
        ))
    }

    /// Post a closure as an ads message
    fn post_to_ads<F>(&self, action: F) -> Result<()>
    where
        F: Fn(&dyn AdsListener) + Send + Sync + 'static,
    {
        self.post_ads_event(Box::new(
            move |listener: &(dyn AdsListener + 'static)| action(listener),
        ))
    }
}

impl<P: Poster + ?Sized> PosterExt for P {}
