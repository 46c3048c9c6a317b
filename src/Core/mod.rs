pub mod SharedMemory;
pub mod alloc;

pub use alloc::{SegmentAllocator, SegmentHandle};
