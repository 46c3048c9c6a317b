use super::stream::DEFAULT_CHUNK_SIZE;
use super::MessageBus;
use crate::config::BridgeConfig;
use std::sync::Arc;

#[derive(Debug)]
pub struct BusBuilder {
    sender: Option<String>,
    chunk_size: usize,
}

impl Default for BusBuilder {
    fn default() -> Self {
        Self {
            sender: None,
            chunk_size: DEFAULT_CHUNK_SIZE, // 4KB default
        }
    }
}

impl BusBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_config(config: &BridgeConfig) -> Self {
        Self {
            sender: config.sender.clone(),
            chunk_size: config.stream_chunk_size,
        }
    }

    /// Tag every message built by the bus with `sender`.
    pub fn with_sender(mut self, sender: impl Into<String>) -> Self {
        self.sender = Some(sender.into());
        self
    }

    /// Starting chunk size for stream writers created on the bus.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    pub fn build(self) -> MessageBus {
        MessageBus::with_parts(self.sender, self.chunk_size)
    }

    /// Build a bus ready to be shared with stream writers and RPC routers.
    pub fn build_shared(self) -> Arc<MessageBus> {
        Arc::new(self.build())
    }
}
