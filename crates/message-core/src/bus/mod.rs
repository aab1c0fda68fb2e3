//! Message bus
//!
//! [`MessageBus`] is the [`Poster`] implementation used by the player and ad
//! modules. It keeps one listener registry per domain and routes each post by
//! the entry point it came through:
//!
//! ```text
//!  post(event)               ──► generic event listeners (filtered by subscription)
//!  post_player_event(msg)    ──► msg.run(l) for every PlayerListener
//!  post_ads_event(msg)       ──► msg.run(l) for every AdsListener
//! ```
//!
//! # Delivery
//!
//! - [`DeliveryMode::Immediate`]: listeners run on the posting thread, in
//!   registration order, before the post returns.
//! - [`DeliveryMode::Queued`]: posts are queued and a single tokio task
//!   delivers them in post order. [`MessageBus::flush`] waits for everything
//!   posted so far.
//!
//! # Examples
//!
//! ```rust
//! use playkit_message_core::bus::MessageBus;
//! use playkit_message_core::listener::PlayerListener;
//! use playkit_message_core::message::PosterExt;
//! use std::sync::atomic::{AtomicUsize, Ordering};
//! use std::sync::Arc;
//!
//! #[derive(Default)]
//! struct Plays(AtomicUsize);
//!
//! impl PlayerListener for Plays {
//!     fn on_playing(&self) {
//!         self.0.fetch_add(1, Ordering::SeqCst);
//!     }
//! }
//!
//! let bus = MessageBus::new();
//! let plays = Arc::new(Plays::default());
//! bus.add_player_listener(plays.clone());
//!
//! bus.post_to_players(|listener| listener.on_playing()).unwrap();
//! assert_eq!(plays.0.load(Ordering::SeqCst), 1);
//! ```

pub mod config;
pub mod registry;

pub use config::{DeliveryMode, MessageBusConfig};
pub use registry::{GroupId, ListenerCounts, ListenerId};

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, trace};

use crate::errors::{MessageError, Result};
use crate::events::{EventFilter, PkEvent};
use crate::listener::{AdsListener, EventListener, PlayerListener};
use crate::message::{AdsMessage, PlayerMessage, Poster};
use self::registry::ListenerRegistry;

/// Delivery counters
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeliveryStats {
    /// Events and messages accepted by the bus
    pub posted: u64,
    /// Listener invocations that returned normally
    pub delivered: u64,
    /// Listener invocations that panicked and were contained
    pub panicked: u64,
}

/// Unit of work travelling from a post call to the dispatcher
enum Envelope {
    Event(PkEvent),
    Player(PlayerMessage),
    Ads(AdsMessage),
    /// Generic event plus its typed callback, delivered as one unit
    Publish(PkEvent),
    /// Completes once everything queued before it was delivered
    Flush(oneshot::Sender<()>),
}

#[derive(Default)]
struct Counters {
    posted: AtomicU64,
    delivered: AtomicU64,
    panicked: AtomicU64,
}

struct Dispatcher {
    registry: ListenerRegistry,
    catch_listener_panics: bool,
    counters: Counters,
}

impl Dispatcher {
    fn new(catch_listener_panics: bool) -> Self {
        Self {
            registry: ListenerRegistry::new(),
            catch_listener_panics,
            counters: Counters::default(),
        }
    }

    fn dispatch(&self, envelope: Envelope) {
        match envelope {
            Envelope::Event(event) => self.dispatch_event(&event),
            Envelope::Player(message) => {
                for entry in self.registry.player_snapshot() {
                    self.deliver(entry.id, || message.run(&*entry.listener));
                }
            }
            Envelope::Ads(message) => {
                for entry in self.registry.ads_snapshot() {
                    self.deliver(entry.id, || message.run(&*entry.listener));
                }
            }
            Envelope::Publish(event) => {
                self.dispatch_event(&event);
                match &event {
                    PkEvent::Player(event) => {
                        for entry in self.registry.player_snapshot() {
                            self.deliver(entry.id, || event.notify(&*entry.listener));
                        }
                    }
                    PkEvent::Ad(event) => {
                        for entry in self.registry.ads_snapshot() {
                            self.deliver(entry.id, || event.notify(&*entry.listener));
                        }
                    }
                }
            }
            Envelope::Flush(done) => {
                let _ = done.send(());
            }
        }
    }

    fn dispatch_event(&self, event: &PkEvent) {
        for entry in self.registry.event_snapshot() {
            if !entry.filter.accepts(event) {
                continue;
            }
            let listener = &entry.registration.listener;
            self.deliver(entry.registration.id, || listener.on_event(event));
        }
    }

    fn deliver<F: FnOnce()>(&self, id: ListenerId, invoke: F) {
        if !self.catch_listener_panics {
            invoke();
            self.counters.delivered.fetch_add(1, Ordering::Relaxed);
            return;
        }

        match panic::catch_unwind(AssertUnwindSafe(invoke)) {
            Ok(()) => {
                self.counters.delivered.fetch_add(1, Ordering::Relaxed);
            }
            Err(payload) => {
                self.counters.panicked.fetch_add(1, Ordering::Relaxed);
                error!(listener = %id, "Listener panicked: {}", panic_message(payload.as_ref()));
            }
        }
    }

    fn stats(&self) -> DeliveryStats {
        DeliveryStats {
            posted: self.counters.posted.load(Ordering::Relaxed),
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            panicked: self.counters.panicked.load(Ordering::Relaxed),
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "non-string panic payload"
    }
}

#[derive(Clone)]
enum QueueSender {
    Bounded {
        tx: mpsc::Sender<Envelope>,
        capacity: usize,
    },
    Unbounded(mpsc::UnboundedSender<Envelope>),
}

impl QueueSender {
    fn try_send(&self, envelope: Envelope) -> Result<()> {
        match self {
            QueueSender::Bounded { tx, capacity } => tx.try_send(envelope).map_err(|e| match e {
                mpsc::error::TrySendError::Full(_) => MessageError::QueueFull {
                    capacity: *capacity,
                },
                mpsc::error::TrySendError::Closed(_) => MessageError::BusClosed,
            }),
            QueueSender::Unbounded(tx) => tx.send(envelope).map_err(|_| MessageError::BusClosed),
        }
    }

    async fn send(&self, envelope: Envelope) -> Result<()> {
        match self {
            QueueSender::Bounded { tx, .. } => {
                tx.send(envelope).await.map_err(|_| MessageError::BusClosed)
            }
            QueueSender::Unbounded(tx) => tx.send(envelope).map_err(|_| MessageError::BusClosed),
        }
    }
}

enum QueueReceiver {
    Bounded(mpsc::Receiver<Envelope>),
    Unbounded(mpsc::UnboundedReceiver<Envelope>),
}

impl QueueReceiver {
    async fn recv(&mut self) -> Option<Envelope> {
        match self {
            QueueReceiver::Bounded(rx) => rx.recv().await,
            QueueReceiver::Unbounded(rx) => rx.recv().await,
        }
    }
}

fn queue(capacity: Option<usize>) -> (QueueSender, QueueReceiver) {
    match capacity {
        Some(capacity) => {
            let (tx, rx) = mpsc::channel(capacity);
            (QueueSender::Bounded { tx, capacity }, QueueReceiver::Bounded(rx))
        }
        None => {
            let (tx, rx) = mpsc::unbounded_channel();
            (QueueSender::Unbounded(tx), QueueReceiver::Unbounded(rx))
        }
    }
}

async fn run_worker(dispatcher: Arc<Dispatcher>, mut rx: QueueReceiver) {
    debug!("Message bus worker started");
    while let Some(envelope) = rx.recv().await {
        dispatcher.dispatch(envelope);
    }
    debug!("Message bus worker stopped");
}

/// Listener registries plus the dispatcher that feeds them
pub struct MessageBus {
    dispatcher: Arc<Dispatcher>,
    delivery: DeliveryMode,
    queue: Mutex<Option<QueueSender>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    closed: AtomicBool,
}

impl fmt::Debug for MessageBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MessageBus")
            .field("delivery", &self.delivery)
            .field("listeners", &self.listener_counts())
            .field("stats", &self.stats())
            .field("closed", &self.is_closed())
            .finish()
    }
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::new()
    }
}

impl MessageBus {
    /// Create a bus that delivers immediately on the posting thread
    pub fn new() -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new(true)),
            delivery: DeliveryMode::Immediate,
            queue: Mutex::new(None),
            worker: Mutex::new(None),
            closed: AtomicBool::new(false),
        }
    }

    /// Create a bus from `config`
    ///
    /// Queued delivery spawns its worker on the current tokio runtime and
    /// fails with [`MessageError::NoRuntime`] outside of one.
    pub fn with_config(config: MessageBusConfig) -> Result<Self> {
        config.validate()?;

        let dispatcher = Arc::new(Dispatcher::new(config.catch_listener_panics));
        let (sender, worker) = match config.delivery {
            DeliveryMode::Immediate => (None, None),
            DeliveryMode::Queued { capacity } => {
                let runtime = Handle::try_current().map_err(|_| MessageError::NoRuntime)?;
                let (tx, rx) = queue(capacity);
                let worker = runtime.spawn(run_worker(dispatcher.clone(), rx));
                (Some(tx), Some(worker))
            }
        };

        info!(
            delivery = ?config.delivery,
            catch_listener_panics = config.catch_listener_panics,
            "Message bus created"
        );

        Ok(Self {
            dispatcher,
            delivery: config.delivery,
            queue: Mutex::new(sender),
            worker: Mutex::new(worker),
            closed: AtomicBool::new(false),
        })
    }

    pub fn delivery_mode(&self) -> DeliveryMode {
        self.delivery
    }

    /// Register a player listener
    pub fn add_player_listener(&self, listener: Arc<dyn PlayerListener>) -> ListenerId {
        let id = self.dispatcher.registry.add_player(None, listener);
        debug!(listener = %id, "Added player listener");
        id
    }

    /// Register a player listener owned by `group`
    pub fn add_player_listener_to_group(
        &self,
        group: GroupId,
        listener: Arc<dyn PlayerListener>,
    ) -> ListenerId {
        let id = self.dispatcher.registry.add_player(Some(group), listener);
        debug!(listener = %id, group = %group, "Added player listener");
        id
    }

    /// Register an ads listener
    pub fn add_ads_listener(&self, listener: Arc<dyn AdsListener>) -> ListenerId {
        let id = self.dispatcher.registry.add_ads(None, listener);
        debug!(listener = %id, "Added ads listener");
        id
    }

    /// Register an ads listener owned by `group`
    pub fn add_ads_listener_to_group(
        &self,
        group: GroupId,
        listener: Arc<dyn AdsListener>,
    ) -> ListenerId {
        let id = self.dispatcher.registry.add_ads(Some(group), listener);
        debug!(listener = %id, group = %group, "Added ads listener");
        id
    }

    /// Register a generic event listener that receives every event
    pub fn add_event_listener(&self, listener: Arc<dyn EventListener>) -> ListenerId {
        self.add_filtered_event_listener(EventFilter::all(), listener)
    }

    /// Register a generic event listener that only receives events accepted by `filter`
    pub fn add_filtered_event_listener(
        &self,
        filter: EventFilter,
        listener: Arc<dyn EventListener>,
    ) -> ListenerId {
        let id = self.dispatcher.registry.add_event(None, filter, listener);
        debug!(listener = %id, "Added event listener");
        id
    }

    /// Register a filtered generic event listener owned by `group`
    pub fn add_event_listener_to_group(
        &self,
        group: GroupId,
        filter: EventFilter,
        listener: Arc<dyn EventListener>,
    ) -> ListenerId {
        let id = self.dispatcher.registry.add_event(Some(group), filter, listener);
        debug!(listener = %id, group = %group, "Added event listener");
        id
    }

    /// Remove one listener. Returns `false` if it was not registered.
    pub fn remove_listener(&self, id: ListenerId) -> bool {
        let removed = self.dispatcher.registry.remove(id);
        if removed {
            debug!(listener = %id, "Removed listener");
        }
        removed
    }

    /// Remove every listener registered under `group`
    pub fn remove_group(&self, group: GroupId) -> usize {
        let removed = self.dispatcher.registry.remove_group(group);
        debug!(group = %group, removed, "Removed listener group");
        removed
    }

    pub fn remove_all_listeners(&self) {
        self.dispatcher.registry.clear();
        debug!("Removed all listeners");
    }

    pub fn listener_counts(&self) -> ListenerCounts {
        self.dispatcher.registry.counts()
    }

    pub fn stats(&self) -> DeliveryStats {
        self.dispatcher.stats()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Deliver `event` to generic listeners, then its typed callback to the
    /// player or ads listeners.
    ///
    /// Both halves travel as a single post: either the whole event is
    /// accepted or none of it is, so a `QueueFull` can be retried safely.
    pub fn publish(&self, event: PkEvent) -> Result<()> {
        trace!(event_type = event.event_type(), "Publishing event");
        self.submit(Envelope::Publish(event))
    }

    /// Wait until everything posted before this call has been delivered
    ///
    /// Returns immediately in immediate mode. Fails with
    /// [`MessageError::BusClosed`] once the bus is closed, in either mode.
    pub async fn flush(&self) -> Result<()> {
        if self.is_closed() {
            return Err(MessageError::BusClosed);
        }
        if let DeliveryMode::Immediate = self.delivery {
            return Ok(());
        }

        let sender = self.queue.lock().clone().ok_or(MessageError::BusClosed)?;
        let (done_tx, done_rx) = oneshot::channel();
        sender.send(Envelope::Flush(done_tx)).await?;
        done_rx.await.map_err(|_| MessageError::BusClosed)
    }

    /// Stop accepting posts. Messages already queued are still delivered.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.queue.lock().take();
        info!("Message bus closed");
    }

    /// Close the bus and wait for the queue worker to deliver what is left
    pub async fn shutdown(&self) {
        self.close();

        let worker = self.worker.lock().take();
        if let Some(worker) = worker {
            if let Err(e) = worker.await {
                error!("Message bus worker failed: {}", e);
            }
        }
    }

    fn submit(&self, envelope: Envelope) -> Result<()> {
        if self.is_closed() {
            return Err(MessageError::BusClosed);
        }

        match self.delivery {
            DeliveryMode::Immediate => {
                self.dispatcher.counters.posted.fetch_add(1, Ordering::Relaxed);
                self.dispatcher.dispatch(envelope);
            }
            DeliveryMode::Queued { .. } => {
                let queue = self.queue.lock();
                let sender = queue.as_ref().ok_or(MessageError::BusClosed)?;
                // Counted before the send so the worker never sees delivered > posted
                self.dispatcher.counters.posted.fetch_add(1, Ordering::Relaxed);
                if let Err(e) = sender.try_send(envelope) {
                    self.dispatcher.counters.posted.fetch_sub(1, Ordering::Relaxed);
                    return Err(e);
                }
            }
        }
        Ok(())
    }
}

impl Poster for MessageBus {
    fn post(&self, event: PkEvent) -> Result<()> {
        trace!(event_type = event.event_type(), "Posting event");
        self.submit(Envelope::Event(event))
    }

    fn post_player_event(&self, message: PlayerMessage) -> Result<()> {
        trace!("Posting player message");
        self.submit(Envelope::Player(message))
    }

    fn post_ads_event(&self, message: AdsMessage) -> Result<()> {
        trace!("Posting ads message");
        self.submit(Envelope::Ads(message))
    }
}
