//! Listener capabilities that messages are run against
//!
//! Three kinds of listeners can be registered with a
//! [`MessageBus`](crate::bus::MessageBus):
//!
//! - [`PlayerListener`] - receives player-scoped messages
//! - [`AdsListener`] - receives ads-scoped messages
//! - [`EventListener`] - receives generic [`PkEvent`] values
//!
//! Every callback has an empty default body so implementations only override
//! what they care about.
//!
//! # Examples
//!
//! ```rust
//! use playkit_message_core::listener::PlayerListener;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//!
//! #[derive(Default)]
//! struct PlayCounter {
//!     plays: AtomicUsize,
//! }
//!
//! impl PlayerListener for PlayCounter {
//!     fn on_playing(&self) {
//!         self.plays.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let counter = PlayCounter::default();
//! counter.on_playing();
//! counter.on_pause(); // default no-op
//! assert_eq!(counter.plays.load(Ordering::SeqCst), 1);
//! ```

use crate::events::{AdError, AdInfo, PkEvent, PlayerError, PlayerState};

/// Callbacks for player playback events
///
/// Positions and durations are in milliseconds.
pub trait PlayerListener: Send + Sync {
    /// Playback was requested
    fn on_play(&self) {}

    /// Playback actually started rendering frames
    fn on_playing(&self) {}

    /// Playback was paused
    fn on_pause(&self) {}

    /// Enough media is buffered to start playback
    fn on_can_play(&self) {}

    /// Content reached its end
    fn on_ended(&self) {}

    /// A seek started
    fn on_seeking(&self, _current_position: u64, _target_position: u64) {}

    /// A seek completed
    fn on_seeked(&self) {}

    /// Periodic playhead report
    fn on_playhead_updated(&self, _position: u64, _buffer_position: u64, _duration: u64) {}

    /// Player state machine moved to a new state
    fn on_state_changed(&self, _old_state: PlayerState, _new_state: PlayerState) {}

    /// Playback error
    fn on_player_error(&self, _error: &PlayerError) {}
}

/// Callbacks for advertising events
pub trait AdsListener: Send + Sync {
    /// An ad tag was requested from the ad server
    fn on_ad_requested(&self, _ad_tag_url: &str) {}

    /// Ad metadata finished loading
    fn on_ad_loaded(&self, _ad: &AdInfo) {}

    /// Ad playback started
    fn on_ad_started(&self, _ad: &AdInfo) {}

    fn on_ad_paused(&self) {}

    fn on_ad_resumed(&self) {}

    fn on_ad_skipped(&self) {}

    fn on_ad_completed(&self) {}

    fn on_ad_first_quartile(&self) {}

    fn on_ad_midpoint(&self) {}

    fn on_ad_third_quartile(&self) {}

    fn on_ad_break_started(&self) {}

    fn on_ad_break_ended(&self) {}

    /// Every ad of every break has been played or failed
    fn on_all_ads_completed(&self) {}

    /// The ad module needs content playback paused
    fn on_content_pause_requested(&self) {}

    /// The ad module hands playback back to the content
    fn on_content_resume_requested(&self) {}

    /// Ad break positions changed. `0` is a pre-roll and `-1` a post-roll.
    fn on_cue_points_changed(&self, _cue_points: &[i64]) {}

    fn on_skippable_state_changed(&self) {}

    fn on_ad_clicked(&self, _click_through_url: Option<&str>) {}

    fn on_ad_error(&self, _error: &AdError) {}
}

/// Receiver for generic events posted through [`Poster::post`](crate::message::Poster::post)
pub trait EventListener: Send + Sync {
    /// Handle one event
    fn on_event(&self, event: &PkEvent);
}

impl<F> EventListener for F
where
    F: Fn(&PkEvent) + Send + Sync,
{
    fn on_event(&self, event: &PkEvent) {
        (self)(event)
    }
}
