//! Listener registries
//!
//! One insertion-ordered registry per listener domain. Dispatch works on
//! snapshots so listeners are free to register or remove listeners while a
//! message is being delivered.

use std::fmt;
use std::sync::Arc;

use parking_lot::RwLock;
use uuid::Uuid;

use crate::events::EventFilter;
use crate::listener::{AdsListener, EventListener, PlayerListener};

/// Identifies one registered listener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(Uuid);

impl ListenerId {
    fn new() -> Self {
        ListenerId(Uuid::new_v4())
    }

    pub fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for ListenerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Owner tag shared by listeners that are removed together
///
/// A component that subscribes several listeners creates one group and later
/// drops all of them with [`MessageBus::remove_group`](super::MessageBus::remove_group).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupId(Uuid);

impl GroupId {
    pub fn new() -> Self {
        GroupId(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Number of listeners per registry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListenerCounts {
    pub player: usize,
    pub ads: usize,
    pub events: usize,
}

impl ListenerCounts {
    pub fn total(&self) -> usize {
        self.player + self.ads + self.events
    }
}

pub(crate) struct Registration<L: ?Sized> {
    pub(crate) id: ListenerId,
    pub(crate) group: Option<GroupId>,
    pub(crate) listener: Arc<L>,
}

impl<L: ?Sized> Clone for Registration<L> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            group: self.group,
            listener: self.listener.clone(),
        }
    }
}

#[derive(Clone)]
pub(crate) struct EventRegistration {
    pub(crate) registration: Registration<dyn EventListener>,
    pub(crate) filter: EventFilter,
}

#[derive(Default)]
pub(crate) struct ListenerRegistry {
    player: RwLock<Vec<Registration<dyn PlayerListener>>>,
    ads: RwLock<Vec<Registration<dyn AdsListener>>>,
    events: RwLock<Vec<EventRegistration>>,
}

impl ListenerRegistry {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_player(
        &self,
        group: Option<GroupId>,
        listener: Arc<dyn PlayerListener>,
    ) -> ListenerId {
        let id = ListenerId::new();
        self.player.write().push(Registration { id, group, listener });
        id
    }

    pub(crate) fn add_ads(&self, group: Option<GroupId>, listener: Arc<dyn AdsListener>) -> ListenerId {
        let id = ListenerId::new();
        self.ads.write().push(Registration { id, group, listener });
        id
    }

    pub(crate) fn add_event(
        &self,
        group: Option<GroupId>,
        filter: EventFilter,
        listener: Arc<dyn EventListener>,
    ) -> ListenerId {
        let id = ListenerId::new();
        self.events.write().push(EventRegistration {
            registration: Registration { id, group, listener },
            filter,
        });
        id
    }

    /// Remove one listener from whichever registry holds it
    pub(crate) fn remove(&self, id: ListenerId) -> bool {
        let mut player = self.player.write();
        if let Some(pos) = player.iter().position(|r| r.id == id) {
            player.remove(pos);
            return true;
        }
        drop(player);

        let mut ads = self.ads.write();
        if let Some(pos) = ads.iter().position(|r| r.id == id) {
            ads.remove(pos);
            return true;
        }
        drop(ads);

        let mut events = self.events.write();
        if let Some(pos) = events.iter().position(|r| r.registration.id == id) {
            events.remove(pos);
            return true;
        }

        false
    }

    /// Remove every listener tagged with `group`, returning how many were removed
    pub(crate) fn remove_group(&self, group: GroupId) -> usize {
        let matches = |g: &Option<GroupId>| *g == Some(group);
        let mut removed = 0;

        let mut player = self.player.write();
        let before = player.len();
        player.retain(|r| !matches(&r.group));
        removed += before - player.len();
        drop(player);

        let mut ads = self.ads.write();
        let before = ads.len();
        ads.retain(|r| !matches(&r.group));
        removed += before - ads.len();
        drop(ads);

        let mut events = self.events.write();
        let before = events.len();
        events.retain(|r| !matches(&r.registration.group));
        removed += before - events.len();

        removed
    }

    pub(crate) fn player_snapshot(&self) -> Vec<Registration<dyn PlayerListener>> {
        self.player.read().clone()
    }

    pub(crate) fn ads_snapshot(&self) -> Vec<Registration<dyn AdsListener>> {
        self.ads.read().clone()
    }

    pub(crate) fn event_snapshot(&self) -> Vec<EventRegistration> {
        self.events.read().clone()
    }

    pub(crate) fn counts(&self) -> ListenerCounts {
        ListenerCounts {
            player: self.player.read().len(),
            ads: self.ads.read().len(),
            events: self.events.read().len(),
        }
    }

    pub(crate) fn clear(&self) {
        self.player.write().clear();
        self.ads.write().clear();
        self.events.write().clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::PkEvent;

    struct Nop;
    impl PlayerListener for Nop {}
    impl AdsListener for Nop {}

    fn event_listener() -> Arc<dyn EventListener> {
        Arc::new(|_event: &PkEvent| {})
    }

    #[test]
    fn test_registration_preserves_insertion_order() {
        let registry = ListenerRegistry::new();
        let first = registry.add_player(None, Arc::new(Nop));
        let second = registry.add_player(None, Arc::new(Nop));
        let third = registry.add_player(None, Arc::new(Nop));

        let ids: Vec<_> = registry.player_snapshot().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[test]
    fn test_remove_finds_listener_in_any_registry() {
        let registry = ListenerRegistry::new();
        let player = registry.add_player(None, Arc::new(Nop));
        let ads = registry.add_ads(None, Arc::new(Nop));
        let events = registry.add_event(None, EventFilter::all(), event_listener());

        assert!(registry.remove(ads));
        assert_eq!(registry.counts(), ListenerCounts { player: 1, ads: 0, events: 1 });

        assert!(registry.remove(events));
        assert!(registry.remove(player));
        assert_eq!(registry.counts().total(), 0);

        assert!(!registry.remove(player));
    }

    #[test]
    fn test_remove_group_only_touches_group_members() {
        let registry = ListenerRegistry::new();
        let group = GroupId::new();
        let other = GroupId::new();

        registry.add_player(Some(group), Arc::new(Nop));
        registry.add_ads(Some(group), Arc::new(Nop));
        registry.add_event(Some(group), EventFilter::all(), event_listener());
        registry.add_player(Some(other), Arc::new(Nop));
        registry.add_ads(None, Arc::new(Nop));

        assert_eq!(registry.remove_group(group), 3);
        assert_eq!(registry.counts(), ListenerCounts { player: 1, ads: 1, events: 0 });
        assert_eq!(registry.remove_group(group), 0);
    }

    #[test]
    fn test_snapshot_is_detached_from_registry() {
        let registry = ListenerRegistry::new();
        let id = registry.add_player(None, Arc::new(Nop));

        let snapshot = registry.player_snapshot();
        registry.remove(id);

        assert_eq!(snapshot.len(), 1);
        assert_eq!(registry.counts().player, 0);
    }

    #[test]
    fn test_clear_empties_all_registries() {
        let registry = ListenerRegistry::new();
        registry.add_player(None, Arc::new(Nop));
        registry.add_ads(None, Arc::new(Nop));
        registry.add_event(None, EventFilter::all(), event_listener());

        registry.clear();

        assert_eq!(registry.counts(), ListenerCounts::default());
    }

    #[test]
    fn test_ids_are_unique() {
        let registry = ListenerRegistry::new();
        let a = registry.add_player(None, Arc::new(Nop));
        let b = registry.add_player(None, Arc::new(Nop));
        assert_ne!(a, b);
        assert_ne!(a.to_string(), b.to_string());
        assert_eq!(a.as_uuid().to_string(), a.to_string());
    }
}
