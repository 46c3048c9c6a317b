// Pending-request table: correlation id -> one-shot response callback.

use crate::Structs::Message;
use parking_lot::Mutex;
use std::collections::HashMap;

pub(crate) type ResponseCallback = Box<dyn FnOnce(&Message) + Send>;

pub(crate) struct PendingRequest {
    /// Channel the request went out on; the response is tagged with it.
    pub channel: String,
    pub callback: ResponseCallback,
}

/// Entries are created by `request` and consumed by the first matching
/// `respond`. There is no expiry: an unanswered request stays until it is
/// answered or explicitly cancelled.
pub(crate) struct Correlator {
    pending: Mutex<HashMap<u64, PendingRequest>>,
}

impl Correlator {
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(HashMap::new()),
        }
    }

    pub fn register(&self, id: u64, channel: String, callback: ResponseCallback) {
        self.pending
            .lock()
            .insert(id, PendingRequest { channel, callback });
    }

    /// Remove and return the entry for `id`. The lock is released before the
    /// caller runs the callback, so a callback may issue further requests.
    pub fn take(&self, id: u64) -> Option<PendingRequest> {
        self.pending.lock().remove(&id)
    }

    pub fn cancel(&self, id: u64) -> bool {
        self.pending.lock().remove(&id).is_some()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.pending.lock().keys().copied().collect();
        ids.sort_unstable();
        ids
    }
}
