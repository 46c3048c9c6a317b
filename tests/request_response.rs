use dmxp_bridge::{Message, MessageBus, MessageKind};
use parking_lot::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

#[test]
fn request_then_respond_invokes_callback_once() {
    let bus = MessageBus::new();
    let responses = Arc::new(Mutex::new(Vec::new()));

    let sink = responses.clone();
    let id = bus.request("c", "ping", move |m: &Message| sink.lock().push(m.clone()));
    assert_eq!(bus.pending_requests(), 1);

    assert!(bus.respond(id, "pong"));
    assert!(!bus.respond(id, "again"));

    let responses = responses.lock();
    assert_eq!(responses.len(), 1);
    let response = &responses[0];
    assert_eq!(response.kind(), MessageKind::Response);
    assert_eq!(response.id(), id);
    assert_eq!(response.channel(), "c");
    assert_eq!(response.payload(), b"pong");
    assert_eq!(bus.pending_requests(), 0);
}

#[test]
fn respond_to_unknown_id_does_nothing() {
    let bus = MessageBus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    bus.request("c", "ping", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(!bus.respond(9_999, "x"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert_eq!(bus.pending_requests(), 1);
}

#[test]
fn subscribers_see_the_outgoing_request() {
    let bus = MessageBus::new();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    bus.on("rpc", move |m: &Message| sink.lock().push((m.id(), m.kind())));

    let id = bus.request("rpc", "ping", |_| {});

    assert_eq!(*seen.lock(), vec![(id, MessageKind::Request)]);
}

#[test]
fn subscriber_may_answer_synchronously() {
    let bus = Arc::new(MessageBus::new());
    let responder = bus.clone();
    bus.on("echo", move |m: &Message| {
        if m.kind() == MessageKind::Request {
            let mut reply = m.payload().to_vec();
            reply.reverse();
            responder.respond(m.id(), reply);
        }
    });

    let answer = Arc::new(Mutex::new(None));
    let slot = answer.clone();
    bus.request("echo", "abc", move |m: &Message| {
        *slot.lock() = m.payload_str().map(str::to_string)
    });

    // Answered before `request` returned.
    assert_eq!(answer.lock().as_deref(), Some("cba"));
    assert_eq!(bus.pending_requests(), 0);
}

#[test]
fn response_callback_may_issue_another_request() {
    let bus = Arc::new(MessageBus::new());
    let second_id = Arc::new(Mutex::new(None));

    let chained = bus.clone();
    let slot = second_id.clone();
    let first = bus.request("c", "one", move |_| {
        let id = chained.request("c", "two", |_| {});
        *slot.lock() = Some(id);
    });

    assert!(bus.respond(first, "ok"));
    let second = second_id.lock().expect("chained request should be issued");
    assert!(second > first);
    assert_eq!(bus.pending_requests(), 1);
}

#[test]
fn cancel_drops_pending_request_without_invoking() {
    let bus = MessageBus::new();
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let id = bus.request("c", "ping", move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    assert!(bus.cancel(id));
    assert!(!bus.cancel(id));
    assert!(!bus.respond(id, "late"));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[test]
fn unanswered_requests_stay_pending() {
    let bus = MessageBus::new();
    for _ in 0..5 {
        bus.request("c", "ping", |_| {});
    }
    assert_eq!(bus.pending_requests(), 5);
}

#[test]
fn responses_are_routed_by_id() {
    let bus = MessageBus::new();
    let log = Arc::new(Mutex::new(Vec::new()));

    let a_log = log.clone();
    let a = bus.request("c", "a", move |m: &Message| {
        a_log.lock().push(format!("a<-{}", m.payload_str().unwrap()))
    });
    let b_log = log.clone();
    let b = bus.request("c", "b", move |m: &Message| {
        b_log.lock().push(format!("b<-{}", m.payload_str().unwrap()))
    });

    bus.respond(b, "2");
    bus.respond(a, "1");

    assert_eq!(*log.lock(), vec!["b<-2", "a<-1"]);
}
