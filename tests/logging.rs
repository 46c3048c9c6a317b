use dmxp_bridge::logging::init_tracing;
use dmxp_bridge::MessageBus;

#[test]
fn init_tracing_is_idempotent() {
    let _ = init_tracing();
    assert!(!init_tracing(), "A second install must be refused");

    // Dispatch with a live subscriber must not disturb delivery.
    let bus = MessageBus::new();
    bus.on("c", |_: &dmxp_bridge::Message| {});
    assert_eq!(bus.send("c", "x"), 1);
}
