//! Ring buffer tests

use crate::helpers::dummy_context;
use sio::prelude::*;

#[test]
fn test_context_creates_ring_buffer() {
    let Some(ctx) = dummy_context() else { return };
    let mut rb = ctx.create_ring_buffer(4096).unwrap();
    assert!(rb.capacity() >= 4096);

    let frame = [1u8, 2, 3, 4, 5, 6, 7, 8];
    assert_eq!(rb.write(&frame), frame.len());
    let mut out = [0u8; 8];
    assert_eq!(rb.read(&mut out), 8);
    assert_eq!(out, frame);
}

#[test]
fn test_ring_buffer_outlives_context() {
    let Some(ctx) = dummy_context() else { return };
    let mut rb = ctx.create_ring_buffer(256).unwrap();
    drop(ctx);
    assert_eq!(rb.write(b"still here"), 10);
    assert_eq!(rb.read_region(), b"still here");
}

#[test]
fn test_wraparound_stays_contiguous() {
    let Some(ctx) = dummy_context() else { return };
    let mut rb = ctx.create_ring_buffer(1).unwrap();
    let capacity = rb.capacity();

    // Move the offsets near the end so the next write wraps.
    let filler = vec![0u8; capacity - 3];
    assert_eq!(rb.write(&filler), filler.len());
    let mut sink = vec![0u8; filler.len()];
    assert_eq!(rb.read(&mut sink), filler.len());

    assert_eq!(rb.write(b"wrapping"), 8);
    assert_eq!(rb.read_region(), b"wrapping");
}

#[test]
fn test_split_halves_share_counts() {
    let Some(ctx) = dummy_context() else { return };
    let rb = ctx.create_ring_buffer(1024).unwrap();
    let (mut producer, mut consumer) = rb.split();

    assert_eq!(producer.capacity(), consumer.capacity());
    let region = producer.write_region();
    region[..3].copy_from_slice(b"abc");
    producer.advance_write_ptr(3).unwrap();
    assert_eq!(consumer.fill_count(), 3);
    assert_eq!(consumer.read_region(), b"abc");

    consumer.advance_read_ptr(3).unwrap();
    assert!(matches!(consumer.advance_read_ptr(1), Err(Error::Invalid)));
    assert_eq!(producer.free_count(), producer.capacity());

    producer.write(b"xyz");
    producer.clear();
    assert_eq!(consumer.fill_count(), 0);
}
