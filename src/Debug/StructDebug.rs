use std::fmt;
use crate::Core::alloc::SegmentAllocator;
use crate::Core::SharedMemory::SharedMemory;
use crate::IPC::{MessageBus, RpcRouter, StreamWriter};

/// Debug function for MessageBus
///
/// Handlers are closures, so only per-channel subscriber counts are shown,
/// along with the pending request count and the last allocated id.
pub fn debug_message_bus(bus: &MessageBus, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let channels: Vec<(String, usize)> = bus
        .registry
        .lock()
        .iter()
        .map(|(name, subscribers)| (name.clone(), subscribers.len()))
        .collect();

    f.debug_struct("MessageBus")
        .field("channels", &channels)
        .field("pending_requests", &bus.correlator.len())
        .field("last_id", &bus.last_id())
        .field("sender", &bus.sender)
        .field("chunk_size", &bus.chunk_size)
        .finish()
}

/// Debug function for RpcRouter
///
/// Shows procedure names and whether a bus is attached
pub fn debug_rpc_router(router: &RpcRouter, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("RpcRouter")
        .field("procedures", &router.procedures())
        .field("bus", &router.bus.is_some())
        .finish()
}

pub fn debug_stream_writer(writer: &StreamWriter, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("StreamWriter")
        .field("channel", &writer.channel())
        .field("chunk_size", &writer.chunk_size())
        .finish_non_exhaustive()
}

/// Debug function for SegmentAllocator
///
/// Segment buffers are never dereferenced here, only names and sizes
pub fn debug_segment_allocator(allocator: &SegmentAllocator, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SegmentAllocator")
        .field("segments", &allocator.names())
        .field("used_memory", &allocator.used_memory())
        .field("total_created", &allocator.total_created())
        .finish()
}

/// Debug function for SharedMemory
///
/// Shows name and capacity; the buffer contents stay opaque
pub fn debug_shared_memory(shm: &SharedMemory, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.debug_struct("SharedMemory")
        .field("name", &shm.name())
        .field("capacity", &shm.capacity())
        .field("buffer", &"<opaque>")
        .finish()
}
