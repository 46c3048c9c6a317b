use super::*;

/// Introspection getters for SegmentAllocator
///
/// These are primarily used for debugging and monitoring.
impl SegmentAllocator {
    /// Number of live segments
    pub fn segment_count(&self) -> usize {
        self.segments.lock().len()
    }

    /// Total capacity of all live segments, in bytes
    pub fn used_memory(&self) -> usize {
        self.segments
            .lock()
            .values()
            .map(|segment| segment.lock().capacity())
            .sum()
    }

    /// Names of live segments in creation order
    pub fn names(&self) -> Vec<String> {
        self.segments.lock().keys().cloned().collect()
    }

    /// Segments created over the allocator's lifetime, destroyed ones included.
    ///
    /// Loaded with relaxed ordering since this is only used for monitoring.
    pub fn total_created(&self) -> u64 {
        self.created.load(Ordering::Relaxed)
    }
}
