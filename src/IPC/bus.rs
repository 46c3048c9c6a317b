// src/IPC/bus.rs

use super::correlator::Correlator;
use super::stream::DEFAULT_CHUNK_SIZE;
use crate::Structs::{Message, MessageKind};
use crossbeam_utils::CachePadded;
use indexmap::IndexMap;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, trace};

/// A channel subscriber. Handlers get a borrowed message and must copy
/// anything they want to keep.
pub type Handler = Arc<dyn Fn(&Message) + Send + Sync>;

/// Opaque token returned by [`MessageBus::on`]; pass it to
/// [`MessageBus::off`] to remove exactly that registration.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriptionId(u64);

impl SubscriptionId {
    pub(crate) fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

#[derive(Clone)]
pub(crate) struct Subscriber {
    pub id: SubscriptionId,
    pub handler: Handler,
}

/// Named-channel publish/subscribe bus with request/response correlation.
///
/// ### Dispatch model:
/// - Every `send`, `request`, `broadcast` and `respond` runs all affected
///   handlers synchronously before returning.
/// - Handlers on a channel run in registration order.
/// - The subscriber list is snapshotted before handlers run and no lock is
///   held while they execute, so a handler may call back into the bus
///   (`send`, `on`, `off`, `respond`). Registry changes made during a pass
///   apply from the next dispatch on.
///
/// ### Identifiers:
/// Message ids start at 1 and strictly increase across `send`, `request`,
/// `broadcast` and stream writes. A response reuses the correlation id of the
/// request it answers instead of allocating a new one.
pub struct MessageBus {
    /// Channel name -> subscribers in registration order. Channels keep
    /// their insertion order, so `broadcast` visits them deterministically.
    pub(crate) registry: Mutex<IndexMap<String, Vec<Subscriber>>>,

    pub(crate) correlator: Correlator,

    /// Next message id. Padded to keep it off the subscription counter's line.
    pub(crate) next_id: CachePadded<AtomicU64>,

    pub(crate) next_subscription: CachePadded<AtomicU64>,

    /// Stamped onto every message this bus builds, when set.
    pub(crate) sender: Option<String>,

    /// Starting chunk size for stream writers bound to this bus.
    pub(crate) chunk_size: usize,
}

impl Default for MessageBus {
    fn default() -> Self {
        Self::with_parts(None, DEFAULT_CHUNK_SIZE)
    }
}

impl MessageBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn with_parts(sender: Option<String>, chunk_size: usize) -> Self {
        debug!(sender = ?sender, chunk_size, "Message bus initialized");
        Self {
            registry: Mutex::new(IndexMap::new()),
            correlator: Correlator::new(),
            next_id: CachePadded::new(AtomicU64::new(1)),
            next_subscription: CachePadded::new(AtomicU64::new(1)),
            sender,
            chunk_size,
        }
    }

    /// Subscribe `handler` to `channel`. Registering the same logic twice
    /// yields two subscriptions, and it then runs twice per dispatch.
    pub fn on<F>(&self, channel: impl Into<String>, handler: F) -> SubscriptionId
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.on_handler(channel, Arc::new(handler))
    }

    /// Subscribe an already shared handler.
    pub fn on_handler(&self, channel: impl Into<String>, handler: Handler) -> SubscriptionId {
        let channel = channel.into();
        let id = SubscriptionId(self.next_subscription.fetch_add(1, Ordering::Relaxed));
        trace!(channel = %channel, subscription = id.0, "Subscribing handler");
        self.registry
            .lock()
            .entry(channel)
            .or_default()
            .push(Subscriber { id, handler });
        id
    }

    /// Remove the subscription. Returns `false` (and does nothing) when the
    /// channel or subscription is unknown. The channel entry itself stays
    /// registered even when its last subscriber leaves.
    pub fn off(&self, channel: &str, subscription: SubscriptionId) -> bool {
        let mut registry = self.registry.lock();
        let Some(subscribers) = registry.get_mut(channel) else {
            return false;
        };
        match subscribers.iter().position(|s| s.id == subscription) {
            Some(index) => {
                subscribers.remove(index);
                trace!(channel, subscription = subscription.0, "Unsubscribed handler");
                true
            }
            None => false,
        }
    }

    /// Send an event on `channel`. Returns the id allocated for it; the id is
    /// consumed even when nobody is listening.
    pub fn send(&self, channel: &str, payload: impl AsRef<[u8]>) -> u64 {
        self.send_kind(channel, MessageKind::Event, payload.as_ref())
    }

    /// Send `payload` as an event on every registered channel. Returns the
    /// number of messages sent (one per channel).
    pub fn broadcast(&self, payload: impl AsRef<[u8]>) -> usize {
        let payload = payload.as_ref();
        let channels: Vec<String> = self.registry.lock().keys().cloned().collect();
        for channel in &channels {
            self.send_kind(channel, MessageKind::Event, payload);
        }
        debug!(channels = channels.len(), "Broadcast dispatched");
        channels.len()
    }

    /// Register `on_response` under a fresh id, then dispatch a request
    /// message on `channel`. The callback is registered before dispatch, so a
    /// subscriber may answer synchronously from inside its handler.
    pub fn request<F>(&self, channel: &str, payload: impl AsRef<[u8]>, on_response: F) -> u64
    where
        F: FnOnce(&Message) + Send + 'static,
    {
        let id = self.allocate_id();
        self.correlator
            .register(id, channel.to_string(), Box::new(on_response));
        let message = self.build(id, MessageKind::Request, channel, payload.as_ref());
        self.dispatch(&message);
        id
    }

    /// Answer the request with correlation id `id`. The callback runs at most
    /// once; returns `false` if no request is pending under `id`.
    pub fn respond(&self, id: u64, payload: impl AsRef<[u8]>) -> bool {
        let Some(pending) = self.correlator.take(id) else {
            trace!(id, "Respond for unknown correlation id ignored");
            return false;
        };
        let message = self.build(id, MessageKind::Response, &pending.channel, payload.as_ref());
        trace!(id, channel = %pending.channel, "Delivering response");
        (pending.callback)(&message);
        true
    }

    /// Drop a pending request without invoking its callback.
    pub fn cancel(&self, id: u64) -> bool {
        let removed = self.correlator.cancel(id);
        if removed {
            debug!(id, "Pending request cancelled");
        }
        removed
    }

    /// Dispatch an already built message (e.g. one held in a `MessageQueue`)
    /// on its own channel. No new id is allocated. Returns how many handlers ran.
    pub fn publish(&self, message: &Message) -> usize {
        self.dispatch(message)
    }

    pub fn subscriber_count(&self, channel: &str) -> usize {
        self.registry.lock().get(channel).map_or(0, Vec::len)
    }

    /// Registered channel names in registration order.
    pub fn channels(&self) -> Vec<String> {
        self.registry.lock().keys().cloned().collect()
    }

    pub fn pending_requests(&self) -> usize {
        self.correlator.len()
    }

    /// The most recently allocated message id, or 0 before the first one.
    pub fn last_id(&self) -> u64 {
        self.next_id.load(Ordering::Acquire) - 1
    }

    pub fn sender(&self) -> Option<&str> {
        self.sender.as_deref()
    }

    pub fn default_chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub(crate) fn send_kind(&self, channel: &str, kind: MessageKind, payload: &[u8]) -> u64 {
        let id = self.allocate_id();
        let message = self.build(id, kind, channel, payload);
        self.dispatch(&message);
        id
    }

    fn allocate_id(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::AcqRel)
    }

    fn build(&self, id: u64, kind: MessageKind, channel: &str, payload: &[u8]) -> Message {
        let message = Message::new(id, kind, channel, payload);
        match &self.sender {
            Some(sender) => message.with_sender(sender.clone()),
            None => message,
        }
    }

    fn dispatch(&self, message: &Message) -> usize {
        let subscribers: Vec<Subscriber> = match self.registry.lock().get(message.channel()) {
            Some(subscribers) => subscribers.clone(),
            None => return 0,
        };

        debug!(
            id = message.id(),
            kind = %message.kind(),
            channel = message.channel(),
            subscribers = subscribers.len(),
            "Dispatching message"
        );

        for subscriber in &subscribers {
            trace!(subscription = subscriber.id.0, "Invoking handler");
            (subscriber.handler)(message);
        }
        subscribers.len()
    }
}
