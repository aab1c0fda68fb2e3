//! Drives a queued message bus the way a player and an ad module would
//!
//! Set `PLAYKIT_BUS_LOG=debug` to see bus internals and `PLAYKIT_LOG_JSON=1`
//! for JSON output.

use std::sync::Arc;

use playkit_message_core::logging::{log_welcome, parse_log_level, setup_logging, LoggingConfig};
use playkit_message_core::prelude::*;
use tracing::{info, Level};

struct ConsoleUi;

impl PlayerListener for ConsoleUi {
    fn on_playing(&self) {
        info!("UI: playing");
    }

    fn on_playhead_updated(&self, position: u64, _buffer_position: u64, duration: u64) {
        info!("UI: {} / {} ms", position, duration);
    }

    fn on_ended(&self) {
        info!("UI: ended");
    }
}

impl AdsListener for ConsoleUi {
    fn on_ad_started(&self, ad: &AdInfo) {
        info!("UI: ad {} ({} of {}) started", ad.ad_id, ad.pod_index, ad.pod_count);
    }

    fn on_content_resume_requested(&self) {
        info!("UI: back to content");
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let bus_level = match std::env::var("PLAYKIT_BUS_LOG") {
        Ok(level) => parse_log_level(&level)?,
        Err(_) => Level::INFO,
    };
    let mut logging = LoggingConfig::new(bus_level, "player-events").with_default_level(Level::INFO);
    if std::env::var_os("PLAYKIT_LOG_JSON").is_some() {
        logging = logging.with_json();
    }
    setup_logging(logging.clone())?;
    log_welcome(&logging, env!("CARGO_PKG_VERSION"));

    let bus = MessageBus::with_config(MessageBusConfig::new().queued_with_capacity(64))?;
    let ui = Arc::new(ConsoleUi);
    let owner = GroupId::new();
    bus.add_player_listener_to_group(owner, ui.clone());
    bus.add_ads_listener_to_group(owner, ui);
    bus.add_filtered_event_listener(
        EventFilter::for_categories([EventCategory::Ad]),
        Arc::new(|event: &PkEvent| info!("analytics: {}", event.event_type())),
    );

    let preroll = AdInfo {
        ad_id: "preroll-1".to_string(),
        duration_ms: 15_000,
        pod_index: 1,
        pod_count: 1,
        ..Default::default()
    };
    bus.publish(AdEvent::Started(preroll).into())?;
    bus.publish(AdEvent::ContentResumeRequested.into())?;

    bus.post_to_players(|listener| listener.on_playing())?;
    for position in [0, 10_000, 20_000] {
        bus.post_player_event(
            PlayerEvent::PlayheadUpdated {
                position,
                buffer_position: position + 5_000,
                duration: 20_000,
            }
            .into_message(),
        )?;
    }
    bus.publish(PlayerEvent::Ended.into())?;

    bus.flush().await?;
    info!("removed {} listeners", bus.remove_group(owner));
    info!("stats: {:?}", bus.stats());
    bus.shutdown().await;

    Ok(())
}
