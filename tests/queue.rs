use dmxp_bridge::{Message, MessageBus, MessageKind, MessageQueue};
use parking_lot::Mutex;
use std::sync::Arc;

fn event(id: u64, payload: &str) -> Message {
    Message::new(id, MessageKind::Event, "q", payload)
}

#[test]
fn pop_returns_messages_in_push_order() {
    let queue = MessageQueue::new();
    queue.push(event(1, "a"));
    queue.push(event(2, "b"));
    queue.push(event(3, "c"));
    assert_eq!(queue.size(), 3);

    let popped: Vec<String> = (0..3)
        .map(|_| queue.pop().unwrap().payload_str().unwrap().to_string())
        .collect();
    assert_eq!(popped, vec!["a", "b", "c"]);
    assert!(queue.pop().is_none());
    assert!(queue.is_empty());
}

#[test]
fn peek_does_not_remove() {
    let queue = MessageQueue::new();
    assert!(queue.peek().is_none());

    queue.push(event(1, "head"));
    queue.push(event(2, "tail"));

    assert_eq!(queue.peek().unwrap().id(), 1);
    assert_eq!(queue.peek().unwrap().id(), 1);
    assert_eq!(queue.len(), 2);
    assert_eq!(queue.pop().unwrap().id(), 1);
    assert_eq!(queue.peek().unwrap().id(), 2);
}

#[test]
fn clear_empties_the_queue() {
    let queue = MessageQueue::new();
    for i in 0..10 {
        queue.push(event(i, "x"));
    }
    queue.clear();
    assert_eq!(queue.size(), 0);
    assert!(queue.pop().is_none());

    queue.push(event(11, "after"));
    assert_eq!(queue.pop().unwrap().id(), 11);
}

#[test]
fn drain_returns_everything_in_fifo_order() {
    let queue = MessageQueue::new();
    for i in 1..=4 {
        queue.push(event(i, "x"));
    }
    let ids: Vec<u64> = queue.drain().iter().map(Message::id).collect();
    assert_eq!(ids, vec![1, 2, 3, 4]);
    assert!(queue.is_empty());
}

#[test]
fn buffered_messages_can_be_replayed_later() {
    // A subscriber buffers traffic while the consumer is not ready...
    let bus = Arc::new(MessageBus::new());
    let queue = Arc::new(MessageQueue::new());
    let buffer = queue.clone();
    bus.on("outbound", move |m: &Message| buffer.push(m.clone()));

    bus.send("outbound", "first");
    bus.send("outbound", "second");
    assert_eq!(queue.size(), 2);

    // ...and the caller decides when to hand it on.
    let delivered = Arc::new(Mutex::new(Vec::new()));
    let sink = delivered.clone();
    let replay = MessageBus::new();
    replay.on("outbound", move |m: &Message| sink.lock().push(m.id()));
    while let Some(message) = queue.pop() {
        replay.publish(&message);
    }

    assert_eq!(*delivered.lock(), vec![1, 2]);
}
