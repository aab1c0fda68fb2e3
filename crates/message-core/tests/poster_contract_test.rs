//! Poster contract checks exercised through a `dyn Poster` handle, the way
//! event producers hold the bus

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use playkit_message_core::prelude::*;

#[derive(Default)]
struct PlayerTally {
    playing: AtomicUsize,
    ended: AtomicUsize,
    errors: AtomicUsize,
}

impl PlayerListener for PlayerTally {
    fn on_playing(&self) {
        self.playing.fetch_add(1, Ordering::SeqCst);
    }

    fn on_ended(&self) {
        self.ended.fetch_add(1, Ordering::SeqCst);
    }

    fn on_player_error(&self, _error: &PlayerError) {
        self.errors.fetch_add(1, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct AdsTally {
    invoked: AtomicUsize,
}

impl AdsTally {
    fn hit(&self) {
        self.invoked.fetch_add(1, Ordering::SeqCst);
    }
}

impl AdsListener for AdsTally {
    fn on_ad_started(&self, _ad: &AdInfo) {
        self.hit();
    }

    fn on_ad_completed(&self) {
        self.hit();
    }

    fn on_content_pause_requested(&self) {
        self.hit();
    }
}

fn poster_with_tallies() -> (Arc<MessageBus>, Arc<PlayerTally>, Arc<AdsTally>) {
    let bus = Arc::new(MessageBus::new());
    let player = Arc::new(PlayerTally::default());
    let ads = Arc::new(AdsTally::default());
    bus.add_player_listener(player.clone());
    bus.add_ads_listener(ads.clone());
    (bus, player, ads)
}

#[test]
fn test_playing_message_invokes_listener_exactly_once() {
    let (bus, player, ads) = poster_with_tallies();
    let poster: Arc<dyn Poster> = bus;

    poster.post_to_players(|listener| listener.on_playing()).unwrap();

    assert_eq!(player.playing.load(Ordering::SeqCst), 1);
    assert_eq!(ads.invoked.load(Ordering::SeqCst), 0);
}

#[test]
fn test_player_message_reaches_every_player_listener() {
    let bus = MessageBus::new();
    let tallies: Vec<Arc<PlayerTally>> = (0..4).map(|_| Arc::new(PlayerTally::default())).collect();
    for tally in &tallies {
        bus.add_player_listener(tally.clone());
    }

    bus.post_player_event(PlayerEvent::Ended.into_message()).unwrap();

    for tally in &tallies {
        assert_eq!(tally.ended.load(Ordering::SeqCst), 1);
    }
}

#[test]
fn test_ads_messages_never_reach_player_listeners() {
    let (bus, player, ads) = poster_with_tallies();
    let poster: &dyn Poster = &*bus;

    poster.post_ads_event(AdEvent::ContentPauseRequested.into_message()).unwrap();
    poster
        .post_ads_event(AdEvent::Started(AdInfo::default()).into_message())
        .unwrap();
    poster.post_to_ads(|listener| listener.on_ad_completed()).unwrap();

    assert_eq!(ads.invoked.load(Ordering::SeqCst), 3);
    assert_eq!(player.playing.load(Ordering::SeqCst), 0);
    assert_eq!(player.ended.load(Ordering::SeqCst), 0);
}

#[test]
fn test_generic_post_is_routed_by_entry_point_not_payload() {
    let (bus, player, ads) = poster_with_tallies();
    let received = Arc::new(AtomicUsize::new(0));
    let counter = received.clone();
    bus.add_event_listener(Arc::new(move |_event: &PkEvent| {
        counter.fetch_add(1, Ordering::SeqCst);
    }));

    // Payloads from both domains go only to generic listeners
    bus.post(PlayerEvent::Error(PlayerError::new("network", true)).into())
        .unwrap();
    bus.post(AdEvent::Completed.into()).unwrap();

    assert_eq!(received.load(Ordering::SeqCst), 2);
    assert_eq!(player.errors.load(Ordering::SeqCst), 0);
    assert_eq!(ads.invoked.load(Ordering::SeqCst), 0);
}

#[test]
fn test_message_captures_caller_state() {
    let (bus, _player, _ads) = poster_with_tallies();
    let seen_ad = Arc::new(parking_lot::Mutex::new(None));

    struct AdRecorder(Arc<parking_lot::Mutex<Option<String>>>);

    impl AdsListener for AdRecorder {
        fn on_ad_started(&self, ad: &AdInfo) {
            *self.0.lock() = Some(ad.ad_id.clone());
        }
    }

    bus.add_ads_listener(Arc::new(AdRecorder(seen_ad.clone())));

    let ad = AdInfo {
        ad_id: "postroll-3".to_string(),
        ad_break_position_ms: -1,
        pod_index: 1,
        pod_count: 1,
        ..Default::default()
    };
    bus.post_to_ads(move |listener| listener.on_ad_started(&ad)).unwrap();

    assert_eq!(seen_ad.lock().as_deref(), Some("postroll-3"));
}

#[test]
fn test_config_from_toml_builds_working_bus() {
    let config = MessageBusConfig::from_toml_str(
        r#"
        catch_listener_panics = true

        [delivery]
        mode = "immediate"
        "#,
    )
    .unwrap();
    let bus = MessageBus::with_config(config).unwrap();
    let player = Arc::new(PlayerTally::default());
    bus.add_player_listener(player.clone());

    bus.publish(PlayerEvent::Playing.into()).unwrap();

    assert_eq!(bus.delivery_mode(), DeliveryMode::Immediate);
    assert_eq!(player.playing.load(Ordering::SeqCst), 1);
}
