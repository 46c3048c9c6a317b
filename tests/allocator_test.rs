// tests/allocator_test.rs

use dmxp_bridge::{BridgeError, SegmentAllocator};

#[test]
fn test_segment_allocator() -> dmxp_bridge::Result<()> {
    // Test 1: Create a new allocator
    let allocator = SegmentAllocator::new();
    assert!(allocator.get("frames").is_none());

    // Test 2: Create a segment
    let segment = allocator.create("frames", 1024)?;
    assert_eq!(segment.lock().capacity(), 1024);

    // Test 3: Get the segment back; both handles see the same bytes
    let again = allocator.get("frames").expect("Segment should exist");
    segment.lock().write(0, b"shared")?;
    assert_eq!(again.lock().read(0, 6)?, b"shared");

    // Test 4: Create multiple segments
    for i in 0..4 {
        allocator.create(format!("seg_{i}"), 256)?;
    }
    assert_eq!(allocator.segment_count(), 5);
    assert_eq!(allocator.used_memory(), 1024 + 4 * 256);

    // Test 5: Try to get non-existent segment
    assert!(allocator.get("missing").is_none());

    Ok(())
}

#[test]
fn test_duplicate_name_rejected() -> dmxp_bridge::Result<()> {
    let allocator = SegmentAllocator::new();
    allocator.create("dup", 8)?;

    match allocator.create("dup", 16) {
        Err(BridgeError::SegmentExists(name)) => assert_eq!(name, "dup"),
        other => panic!("expected SegmentExists, got {other:?}"),
    }
    // The original segment is untouched.
    assert_eq!(allocator.get("dup").unwrap().lock().capacity(), 8);
    Ok(())
}

#[test]
fn test_destroy_segment() -> dmxp_bridge::Result<()> {
    let allocator = SegmentAllocator::new();
    let handle = allocator.create("temp", 32)?;
    handle.lock().write(0, b"keep")?;

    allocator.destroy("temp")?;
    assert!(allocator.get("temp").is_none());
    assert_eq!(allocator.segment_count(), 0);
    assert_eq!(allocator.used_memory(), 0);

    // Outstanding handles keep working after destroy
    assert_eq!(handle.lock().read(0, 4)?, b"keep");

    // Test removing non-existent segment
    assert!(matches!(
        allocator.destroy("temp"),
        Err(BridgeError::SegmentNotFound(_))
    ));

    // The name can be reused
    let fresh = allocator.create("temp", 4)?;
    assert_eq!(fresh.lock().read(0, 4)?, vec![0; 4]);
    assert_eq!(allocator.total_created(), 2);
    Ok(())
}

#[test]
fn test_names_in_creation_order() -> dmxp_bridge::Result<()> {
    let allocator = SegmentAllocator::new();
    for name in ["c", "a", "b"] {
        allocator.create(name, 1)?;
    }
    allocator.destroy("a")?;
    assert_eq!(allocator.names(), vec!["c".to_string(), "b".to_string()]);

    let rendered = format!("{:?}", allocator);
    assert!(rendered.contains("SegmentAllocator"));
    Ok(())
}
