// demos/stream_digest.rs
//
// Streams a generated payload across a bus channel in chunks, reassembles it
// on the other side and checks both SHA-256 digests match.
//
// Run: cargo run --example stream_digest -- <payload_bytes> [chunk_size]
// Set DMXP_LOG=debug to see per-dispatch tracing.

use dmxp_bridge::logging::init_tracing;
use dmxp_bridge::{BusBuilder, RpcRouter, StreamCollector, StreamWriter};
use parking_lot::Mutex;
use sha2::{Digest, Sha256};
use std::env;
use std::sync::Arc;

fn main() -> dmxp_bridge::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let payload_len: usize = args.get(1).and_then(|s| s.parse().ok()).unwrap_or(1 << 20);
    let chunk_size: usize = args.get(2).and_then(|s| s.parse().ok()).unwrap_or(4096);

    let bus = BusBuilder::new()
        .with_sender("demo-host")
        .with_chunk_size(chunk_size)
        .build_shared();

    let received = Arc::new(Mutex::new(None));
    let slot = received.clone();
    let _collector = StreamCollector::attach(bus.clone(), "file.transfer", move |bytes: Vec<u8>| {
        *slot.lock() = Some(bytes)
    });

    let payload: Vec<u8> = (0..payload_len).map(|i| (i % 251) as u8).collect();
    let expected = format!("{:x}", Sha256::digest(&payload));

    let writer = StreamWriter::new(bus.clone(), "file.transfer");
    let start = std::time::Instant::now();
    let chunks = writer.write(&payload);
    writer.close();
    let elapsed = start.elapsed();

    let assembled = received.lock().take().unwrap_or_default();
    let actual = format!("{:x}", Sha256::digest(&assembled));

    println!(
        "Streamed {} bytes in {} chunks of {} in {:.2?}",
        payload_len, chunks, chunk_size, elapsed
    );
    println!("sent     {expected}");
    println!("received {actual}");

    // Ask the host side for the digest over request/response, answered by RPC.
    let router = RpcRouter::with_bus(bus.clone());
    router.register("sha256", |args: &[u8]| format!("{:x}", Sha256::digest(args)).into_bytes());

    let answer = Arc::new(Mutex::new(String::new()));
    let answer_slot = answer.clone();
    let id = bus.request("host.digest", &assembled, move |m| {
        *answer_slot.lock() = m.payload_str().unwrap_or_default().to_string()
    });
    router.reply(id, "sha256", &assembled)?;
    println!("rpc      {}", answer.lock());

    if expected == actual && expected == *answer.lock() {
        println!("Digests match");
    } else {
        eprintln!("Digest mismatch");
        std::process::exit(1);
    }
    Ok(())
}
