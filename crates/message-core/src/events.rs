//! Player and advertising events
//!
//! Events are plain values. They reach listeners in two ways:
//!
//! - as a generic [`PkEvent`] posted with [`Poster::post`](crate::message::Poster::post)
//!   and delivered to every [`EventListener`](crate::listener::EventListener)
//! - as a typed message built with [`PlayerEvent::into_message`] or
//!   [`AdEvent::into_message`], which calls the matching callback on every
//!   registered player or ads listener
//!
//! # Event Types
//!
//! Each event has a stable string identifier such as `"player.ended"` or
//! `"ad.started"` that subscribers can filter on with [`EventFilter`].
//!
//! ```rust
//! use playkit_message_core::events::{AdEvent, EventCategory, EventFilter, PkEvent, PlayerEvent};
//!
//! let event = PkEvent::Player(PlayerEvent::Ended);
//! assert_eq!(event.event_type(), "player.ended");
//! assert_eq!(event.category(), EventCategory::Player);
//!
//! let filter = EventFilter::for_types(["ad.completed"]);
//! assert!(filter.accepts(&PkEvent::Ad(AdEvent::Completed)));
//! assert!(!filter.accepts(&event));
//! ```

use std::collections::HashSet;
use std::fmt;

use crate::listener::{AdsListener, PlayerListener};
use crate::message::{AdsMessage, PlayerMessage};

/// Stable identifier of an event kind, e.g. `"player.playhead_updated"`
pub type EventType = &'static str;

/// Which listener domain an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventCategory {
    /// Playback events
    Player,
    /// Advertising events
    Ad,
}

impl fmt::Display for EventCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EventCategory::Player => write!(f, "player"),
            EventCategory::Ad => write!(f, "ad"),
        }
    }
}

/// Player state machine states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PlayerState {
    Idle,
    Loading,
    Ready,
    Buffering,
}

/// Error reported by the playback engine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerError {
    /// Human readable description
    pub message: String,
    /// Whether playback cannot continue
    pub fatal: bool,
}

impl PlayerError {
    pub fn new(message: impl Into<String>, fatal: bool) -> Self {
        Self {
            message: message.into(),
            fatal,
        }
    }
}

/// Metadata about the ad currently loaded or playing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AdInfo {
    /// Ad identifier from the ad server
    pub ad_id: String,
    pub title: String,
    /// Ad duration in milliseconds
    pub duration_ms: u64,
    /// Position of the ad break in content, `0` for pre-roll, `-1` for post-roll
    pub ad_break_position_ms: i64,
    /// 1-based index of this ad within its pod
    pub pod_index: u32,
    /// Number of ads in the pod
    pub pod_count: u32,
    pub skippable: bool,
}

/// Categories of advertising failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AdErrorType {
    /// The ad tag request failed on the network
    RequestFailed,
    /// The ad server answered without a playable ad
    EmptyResponse,
    /// Loading the ad media timed out
    LoadTimeout,
    /// The ad media failed during playback
    VideoPlayError,
    /// Anything else raised by the ad module
    Internal,
}

/// Error reported by the ad module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdError {
    pub error_type: AdErrorType,
    pub message: String,
}

impl AdError {
    pub fn new(error_type: AdErrorType, message: impl Into<String>) -> Self {
        Self {
            error_type,
            message: message.into(),
        }
    }
}

/// Playback events
#[derive(Debug, Clone, PartialEq)]
pub enum PlayerEvent {
    Play,
    Playing,
    Pause,
    CanPlay,
    Ended,
    Seeking {
        current_position: u64,
        target_position: u64,
    },
    Seeked,
    PlayheadUpdated {
        position: u64,
        buffer_position: u64,
        duration: u64,
    },
    StateChanged {
        old_state: PlayerState,
        new_state: PlayerState,
    },
    Error(PlayerError),
}

impl PlayerEvent {
    /// Stable identifier for this kind of event
    pub fn event_type(&self) -> EventType {
        match self {
            PlayerEvent::Play => "player.play",
            PlayerEvent::Playing => "player.playing",
            PlayerEvent::Pause => "player.pause",
            PlayerEvent::CanPlay => "player.can_play",
            PlayerEvent::Ended => "player.ended",
            PlayerEvent::Seeking { .. } => "player.seeking",
            PlayerEvent::Seeked => "player.seeked",
            PlayerEvent::PlayheadUpdated { .. } => "player.playhead_updated",
            PlayerEvent::StateChanged { .. } => "player.state_changed",
            PlayerEvent::Error(_) => "player.error",
        }
    }

    /// Invoke the callback on `listener` that corresponds to this event
    pub fn notify(&self, listener: &dyn PlayerListener) {
        match self {
            PlayerEvent::Play => listener.on_play(),
            PlayerEvent::Playing => listener.on_playing(),
            PlayerEvent::Pause => listener.on_pause(),
            PlayerEvent::CanPlay => listener.on_can_play(),
            PlayerEvent::Ended => listener.on_ended(),
            PlayerEvent::Seeking {
                current_position,
                target_position,
            } => listener.on_seeking(*current_position, *target_position),
            PlayerEvent::Seeked => listener.on_seeked(),
            PlayerEvent::PlayheadUpdated {
                position,
                buffer_position,
                duration,
            } => listener.on_playhead_updated(*position, *buffer_position, *duration),
            PlayerEvent::StateChanged {
                old_state,
                new_state,
            } => listener.on_state_changed(*old_state, *new_state),
            PlayerEvent::Error(error) => listener.on_player_error(error),
        }
    }

    /// Turn this event into a message that notifies every player listener
    pub fn into_message(self) -> PlayerMessage {
        Box::new(move |listener: &(dyn PlayerListener + 'static)| self.notify(listener))
    }
}

/// Advertising events
#[derive(Debug, Clone, PartialEq)]
pub enum AdEvent {
    AdRequested { ad_tag_url: String },
    Loaded(AdInfo),
    Started(AdInfo),
    Paused,
    Resumed,
    Skipped,
    Completed,
    FirstQuartile,
    Midpoint,
    ThirdQuartile,
    AdBreakStarted,
    AdBreakEnded,
    AllAdsCompleted,
    ContentPauseRequested,
    ContentResumeRequested,
    CuePointsChanged { cue_points: Vec<i64> },
    SkippableStateChanged,
    AdClicked { click_through_url: Option<String> },
    Error(AdError),
}

impl AdEvent {
    /// Stable identifier for this kind of event
    pub fn event_type(&self) -> EventType {
        match self {
            AdEvent::AdRequested { .. } => "ad.requested",
            AdEvent::Loaded(_) => "ad.loaded",
            AdEvent::Started(_) => "ad.started",
            AdEvent::Paused => "ad.paused",
            AdEvent::Resumed => "ad.resumed",
            AdEvent::Skipped => "ad.skipped",
            AdEvent::Completed => "ad.completed",
            AdEvent::FirstQuartile => "ad.first_quartile",
            AdEvent::Midpoint => "ad.midpoint",
            AdEvent::ThirdQuartile => "ad.third_quartile",
            AdEvent::AdBreakStarted => "ad.break_started",
            AdEvent::AdBreakEnded => "ad.break_ended",
            AdEvent::AllAdsCompleted => "ad.all_completed",
            AdEvent::ContentPauseRequested => "ad.content_pause_requested",
            AdEvent::ContentResumeRequested => "ad.content_resume_requested",
            AdEvent::CuePointsChanged { .. } => "ad.cue_points_changed",
            AdEvent::SkippableStateChanged => "ad.skippable_state_changed",
            AdEvent::AdClicked { .. } => "ad.clicked",
            AdEvent::Error(_) => "ad.error",
        }
    }

    /// Invoke the callback on `listener` that corresponds to this event
    pub fn notify(&self, listener: &dyn AdsListener) {
        match self {
            AdEvent::AdRequested { ad_tag_url } => listener.on_ad_requested(ad_tag_url),
            AdEvent::Loaded(ad) => listener.on_ad_loaded(ad),
            AdEvent::Started(ad) => listener.on_ad_started(ad),
            AdEvent::Paused => listener.on_ad_paused(),
            AdEvent::Resumed => listener.on_ad_resumed(),
            AdEvent::Skipped => listener.on_ad_skipped(),
            AdEvent::Completed => listener.on_ad_completed(),
            AdEvent::FirstQuartile => listener.on_ad_first_quartile(),
            AdEvent::Midpoint => listener.on_ad_midpoint(),
            AdEvent::ThirdQuartile => listener.on_ad_third_quartile(),
            AdEvent::AdBreakStarted => listener.on_ad_break_started(),
            AdEvent::AdBreakEnded => listener.on_ad_break_ended(),
            AdEvent::AllAdsCompleted => listener.on_all_ads_completed(),
            AdEvent::ContentPauseRequested => listener.on_content_pause_requested(),
            AdEvent::ContentResumeRequested => listener.on_content_resume_requested(),
            AdEvent::CuePointsChanged { cue_points } => listener.on_cue_points_changed(cue_points),
            AdEvent::SkippableStateChanged => listener.on_skippable_state_changed(),
            AdEvent::AdClicked { click_through_url } => {
                listener.on_ad_clicked(click_through_url.as_deref())
            }
            AdEvent::Error(error) => listener.on_ad_error(error),
        }
    }

    /// Turn this event into a message that notifies every ads listener
    pub fn into_message(self) -> AdsMessage {
        Box::new(move |listener: &(dyn AdsListener + 'static)| self.notify(listener))
    }
}

/// Generic event value accepted by [`Poster::post`](crate::message::Poster::post)
#[derive(Debug, Clone, PartialEq)]
pub enum PkEvent {
    Player(PlayerEvent),
    Ad(AdEvent),
}

impl PkEvent {
    pub fn event_type(&self) -> EventType {
        match self {
            PkEvent::Player(event) => event.event_type(),
            PkEvent::Ad(event) => event.event_type(),
        }
    }

    pub fn category(&self) -> EventCategory {
        match self {
            PkEvent::Player(_) => EventCategory::Player,
            PkEvent::Ad(_) => EventCategory::Ad,
        }
    }
}

impl From<PlayerEvent> for PkEvent {
    fn from(event: PlayerEvent) -> Self {
        PkEvent::Player(event)
    }
}

impl From<AdEvent> for PkEvent {
    fn from(event: AdEvent) -> Self {
        PkEvent::Ad(event)
    }
}

/// Subscription filter for generic event listeners
///
/// A `None` field places no restriction. When both fields are set an event
/// must satisfy both.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventFilter {
    /// Only deliver events of these categories
    pub categories: Option<HashSet<EventCategory>>,
    /// Only deliver events with these identifiers
    pub event_types: Option<HashSet<EventType>>,
}

impl EventFilter {
    /// A filter that accepts every event
    pub fn all() -> Self {
        Self::default()
    }

    pub fn for_categories(categories: impl IntoIterator<Item = EventCategory>) -> Self {
        Self {
            categories: Some(categories.into_iter().collect()),
            event_types: None,
        }
    }

    pub fn for_types(event_types: impl IntoIterator<Item = EventType>) -> Self {
        Self {
            categories: None,
            event_types: Some(event_types.into_iter().collect()),
        }
    }

    /// Whether `event` passes this filter
    pub fn accepts(&self, event: &PkEvent) -> bool {
        if let Some(categories) = &self.categories {
            if !categories.contains(&event.category()) {
                return false;
            }
        }

        if let Some(event_types) = &self.event_types {
            if !event_types.contains(event.event_type()) {
                return false;
            }
        }

        true
    }
}
