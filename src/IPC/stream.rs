// Chunked payload streaming over a bus channel.

use super::{MessageBus, SubscriptionId};
use crate::Structs::{Message, MessageKind};
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::{debug, trace};

/// Default chunk size for stream writers, in bytes.
pub const DEFAULT_CHUNK_SIZE: usize = 4096;

/// Writes payloads to one bus channel as a sequence of stream messages.
///
/// Payloads longer than `chunk_size` are split into `ceil(len / chunk_size)`
/// consecutive chunks, each sent as its own message (and its own dispatch
/// pass), in order. `close` sends the zero-length end-of-stream sentinel.
pub struct StreamWriter {
    bus: Arc<MessageBus>,
    channel: String,
    chunk_size: usize,
}

impl StreamWriter {
    /// Bind to `channel` using the bus's default chunk size.
    pub fn new(bus: Arc<MessageBus>, channel: impl Into<String>) -> Self {
        let chunk_size = bus.default_chunk_size();
        Self::with_chunk_size(bus, channel, chunk_size)
    }

    pub fn with_chunk_size(bus: Arc<MessageBus>, channel: impl Into<String>, chunk_size: usize) -> Self {
        Self {
            bus,
            channel: channel.into(),
            chunk_size,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Takes effect on the next `write`. Not validated; 0 disables splitting.
    pub fn set_chunk_size(&mut self, chunk_size: usize) {
        self.chunk_size = chunk_size;
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn bus(&self) -> &Arc<MessageBus> {
        &self.bus
    }

    /// Send `payload`, split into chunks if needed. Returns the number of
    /// messages sent. An empty payload sends nothing, since a zero-length
    /// stream message means "closed".
    pub fn write(&self, payload: impl AsRef<[u8]>) -> usize {
        let payload = payload.as_ref();
        if payload.is_empty() {
            trace!(channel = %self.channel, "Empty stream write skipped");
            return 0;
        }

        if self.chunk_size == 0 || payload.len() <= self.chunk_size {
            self.bus.send_kind(&self.channel, MessageKind::Stream, payload);
            return 1;
        }

        let mut sent = 0;
        for chunk in payload.chunks(self.chunk_size) {
            self.bus.send_kind(&self.channel, MessageKind::Stream, chunk);
            sent += 1;
        }
        debug!(
            channel = %self.channel,
            len = payload.len(),
            chunk_size = self.chunk_size,
            chunks = sent,
            "Stream payload written in chunks"
        );
        sent
    }

    /// Subscribe `handler` to the bound channel.
    pub fn on_data<F>(&self, handler: F) -> SubscriptionId
    where
        F: Fn(&Message) + Send + Sync + 'static,
    {
        self.bus.on(self.channel.clone(), handler)
    }

    /// Send the end-of-stream sentinel. Returns its message id.
    pub fn close(&self) -> u64 {
        debug!(channel = %self.channel, "Closing stream");
        self.bus.send_kind(&self.channel, MessageKind::Stream, &[])
    }
}

/// Reassembles a chunked stream.
///
/// Chunk payloads are appended in arrival order; when the end-of-stream
/// sentinel arrives the assembled bytes go to `on_complete` and a fresh
/// accumulation starts. Non-stream messages on the channel are ignored.
/// The subscription is removed when the collector is dropped.
pub struct StreamCollector {
    bus: Arc<MessageBus>,
    channel: String,
    subscription: SubscriptionId,
}

impl StreamCollector {
    pub fn attach<F>(bus: Arc<MessageBus>, channel: impl Into<String>, on_complete: F) -> Self
    where
        F: Fn(Vec<u8>) + Send + Sync + 'static,
    {
        let channel = channel.into();
        let buffer: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let subscription = bus.on(channel.clone(), move |message: &Message| {
            if message.kind() != MessageKind::Stream {
                return;
            }
            if message.is_end_of_stream() {
                let assembled = std::mem::take(&mut *buffer.lock());
                on_complete(assembled);
            } else {
                buffer.lock().extend_from_slice(message.payload());
            }
        });

        Self {
            bus,
            channel,
            subscription,
        }
    }

    pub fn channel(&self) -> &str {
        &self.channel
    }

    pub fn subscription(&self) -> SubscriptionId {
        self.subscription
    }
}

impl Drop for StreamCollector {
    fn drop(&mut self) {
        self.bus.off(&self.channel, self.subscription);
    }
}
