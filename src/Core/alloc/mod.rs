use crate::Core::SharedMemory::SharedMemory;
use crate::error::{BridgeError, Result};
use indexmap::IndexMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::debug;
mod debug;
mod getters;

// Use parking_lot's Mutex for better performance
use parking_lot::Mutex;

/// Shared handle to a registered segment. The segment lives as long as any
/// handle does, even after it is destroyed in the allocator.
pub type SegmentHandle = Arc<Mutex<SharedMemory>>;

/// Registry of named segments
pub struct SegmentAllocator {
    segments: Mutex<IndexMap<String, SegmentHandle>>,
    created: AtomicU64,
}

impl Default for SegmentAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl SegmentAllocator {
    pub fn new() -> Self {
        Self {
            segments: Mutex::new(IndexMap::new()),
            created: AtomicU64::new(0),
        }
    }

    /// Create a zero-filled segment named `name`. Names are unique within
    /// the allocator; creating an existing name fails with `SegmentExists`.
    pub fn create(&self, name: impl Into<String>, capacity: usize) -> Result<SegmentHandle> {
        let name = name.into();
        let mut segments = self.segments.lock();
        if segments.contains_key(&name) {
            return Err(BridgeError::SegmentExists(name));
        }

        let handle = Arc::new(Mutex::new(SharedMemory::create(name.clone(), capacity)));
        segments.insert(name.clone(), handle.clone());
        self.created.fetch_add(1, Ordering::Relaxed);
        debug!(segment = %name, capacity, "Segment created");
        Ok(handle)
    }

    /// Get a segment by name
    pub fn get(&self, name: &str) -> Option<SegmentHandle> {
        self.segments.lock().get(name).cloned()
    }

    /// Remove `name` from the registry. Outstanding handles keep their
    /// buffer until dropped.
    pub fn destroy(&self, name: &str) -> Result<()> {
        match self.segments.lock().shift_remove(name) {
            Some(_) => {
                debug!(segment = name, "Segment destroyed");
                Ok(())
            }
            None => Err(BridgeError::SegmentNotFound(name.to_string())),
        }
    }
}
