// src/IPC/queue.rs

use crate::Structs::Message;
use parking_lot::Mutex;
use std::collections::VecDeque;

/// Unbounded FIFO buffer of messages.
///
/// Nothing drains the queue automatically: callers decide when to push
/// (e.g. to hold outbound messages while a script context is not ready)
/// and when to pop. None of the operations block or fail.
#[derive(Debug, Default)]
pub struct MessageQueue {
    messages: Mutex<VecDeque<Message>>,
}

impl MessageQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append at the tail.
    pub fn push(&self, message: Message) {
        self.messages.lock().push_back(message);
    }

    /// Remove and return the head, or `None` if empty.
    pub fn pop(&self) -> Option<Message> {
        self.messages.lock().pop_front()
    }

    /// Return a copy of the head without removing it.
    pub fn peek(&self) -> Option<Message> {
        self.messages.lock().front().cloned()
    }

    pub fn clear(&self) {
        self.messages.lock().clear();
    }

    pub fn size(&self) -> usize {
        self.messages.lock().len()
    }

    pub fn len(&self) -> usize {
        self.size()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.lock().is_empty()
    }

    /// Remove every queued message, returned in FIFO order.
    pub fn drain(&self) -> Vec<Message> {
        self.messages.lock().drain(..).collect()
    }
}
