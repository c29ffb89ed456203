//! Transfer-ID continuity scenarios against the shared registry.

use super::common::stack;
use anyhow::Result;
use std::time::Duration;
use tsync_common::{MonotonicTime, SyncError};
use tsync_transport::{MessageTypeId, TransferKey};

#[test]
fn test_transfer_id_wraps_over_many_cycles() -> Result<()> {
    let mut s = stack(1);

    // Steady 100ms cadence keeps the registry entry alive, so the counter
    // runs through its full width and wraps silently.
    for expected in [0_u8, 1, 2] {
        s.master.publish_cycle()?;
        let frame = s.master.transport_mut().take_sent().pop().unwrap();
        assert_eq!(frame.transfer_id.get(), expected);
        s.clock.advance(Duration::from_millis(100));
    }
    for _ in 3..32 {
        s.master.publish_cycle()?;
        s.clock.advance(Duration::from_millis(100));
    }

    s.master.publish_cycle()?;
    let frame = s.master.transport_mut().take_sent().pop().unwrap();
    assert_eq!(frame.transfer_id.get(), 0);
    Ok(())
}

#[test]
fn test_counter_restarts_after_long_silence() -> Result<()> {
    let mut s = stack(1);

    s.master.publish_cycle()?;
    s.clock.advance(Duration::from_millis(100));
    s.master.publish_cycle()?;
    let frame = s.master.transport_mut().take_sent().pop().unwrap();
    assert_eq!(frame.transfer_id.get(), 1);

    // Silence longer than the publisher timeout: receivers have forgotten
    // the stream, so continuing the old count would be meaningless.
    s.clock.advance(Duration::from_millis(3000));
    s.master.publish_cycle()?;
    let frame = s.master.transport_mut().take_sent().pop().unwrap();
    assert_eq!(frame.transfer_id.get(), 0);
    Ok(())
}

#[test]
fn test_registry_shared_with_other_streams() -> Result<()> {
    let mut s = stack(1);

    s.master.publish_cycle()?;

    // Another publisher on the node advances its own stream through the
    // same registry; the two counters never interfere.
    let other_key = TransferKey::broadcast(MessageTypeId::new(77));
    let now = MonotonicTime::from_millis(10_000);
    let deadline = MonotonicTime::from_millis(12_200);
    {
        let mut registry = s.registry.lock().unwrap();
        for expected in 0..3 {
            let tid = registry.fetch_and_advance(other_key, now, deadline).unwrap();
            assert_eq!(tid.get(), expected);
        }
    }

    s.clock.advance(Duration::from_millis(100));
    s.master.publish_cycle()?;
    let frame = s.master.transport_mut().take_sent().pop().unwrap();
    assert_eq!(frame.transfer_id.get(), 1);
    assert_eq!(s.registry.lock().unwrap().len(), 2);
    Ok(())
}

#[test]
fn test_registry_exhaustion_surfaces_out_of_memory() {
    let mut s = stack(1);

    // Fill the registry with other live streams before the master ever runs
    let now = MonotonicTime::from_millis(10_000);
    let deadline = MonotonicTime::from_millis(60_000);
    {
        let mut registry = s.registry.lock().unwrap();
        let capacity = registry.capacity();
        for raw in 0..capacity {
            let key = TransferKey::broadcast(MessageTypeId::new(1000 + raw as u16));
            registry.fetch_and_advance(key, now, deadline).unwrap();
        }
        assert_eq!(registry.len(), capacity);
    }

    assert_eq!(s.master.publish_cycle(), Err(SyncError::OutOfMemory));
    assert!(s.master.transport().sent_frames().is_empty());

    // The master's stream never claimed a slot
    let registry = s.registry.lock().unwrap();
    assert_eq!(registry.len(), registry.capacity());
}
