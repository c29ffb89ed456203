//! Multi-cycle publication scenarios over redundant interfaces.

use super::common::{decoded_timestamp, loopback, stack};
use anyhow::Result;
use std::time::Duration;
use tsync_common::SyncError;

#[test]
fn test_two_interface_sync_cycle() -> Result<()> {
    let mut s = stack(2);

    // Cycle 1: nothing captured yet, both interfaces publish the zero
    // sentinel under one transfer ID.
    s.master.publish_cycle()?;
    let first = s.master.transport_mut().take_sent();
    assert_eq!(first.len(), 2);
    assert_eq!(first[0].transfer_id, first[1].transfer_id);
    assert_eq!(decoded_timestamp(&first[0]), 0);
    assert_eq!(decoded_timestamp(&first[1]), 0);

    // Only interface 0's hardware reports its transmission instant
    s.master.handle_loopback_frame(&loopback(0, 1000));

    // Cycle 2: interface 0 carries the captured instant, interface 1 still
    // reports the sentinel, and both share the next transfer ID.
    s.clock.advance(Duration::from_millis(100));
    s.master.publish_cycle()?;
    let second = s.master.transport_mut().take_sent();
    assert_eq!(second.len(), 2);
    assert_eq!(decoded_timestamp(&second[0]), 1000);
    assert_eq!(decoded_timestamp(&second[1]), 0);
    assert_eq!(second[0].transfer_id, second[1].transfer_id);
    assert_ne!(second[0].transfer_id, first[0].transfer_id);

    assert_eq!(s.faults.count(), 0);
    Ok(())
}

#[test]
fn test_timestamp_chain_across_cycles() -> Result<()> {
    let mut s = stack(1);
    let mut tx_instant = 5_000_u64;

    s.master.publish_cycle()?;
    for _ in 0..5 {
        // The hardware echoes each frame back with its transmission instant
        s.master.handle_loopback_frame(&loopback(0, tx_instant));

        s.clock.advance(Duration::from_millis(100));
        s.master.publish_cycle()?;
        let frame = s.master.transport_mut().take_sent().pop().unwrap();
        assert_eq!(decoded_timestamp(&frame), tx_instant);

        tx_instant += 100_000;
    }
    Ok(())
}

#[test]
fn test_triggers_faster_than_min_period_are_throttled() -> Result<()> {
    let mut s = stack(1);

    // Trigger at a 10ms cadence; only every fourth trigger clears the 40ms
    // minimum publication period.
    for _ in 0..12 {
        s.master.publish_cycle()?;
        s.clock.advance(Duration::from_millis(10));
    }

    assert_eq!(s.master.transport().sent_frames().len(), 3);
    let stats = s.master.stats();
    assert_eq!(stats.cycles_published, 3);
    assert_eq!(stats.cycles_skipped, 9);
    Ok(())
}

#[test]
fn test_capture_discarded_after_long_publication_gap() -> Result<()> {
    let mut s = stack(1);

    s.master.publish_cycle()?;
    s.master.handle_loopback_frame(&loopback(0, 7_777));

    // The next trigger only arrives after the staleness window has passed;
    // receivers could not use a timestamp from that far back, so the
    // sentinel is published instead.
    s.clock.advance(Duration::from_millis(1200));
    s.master.publish_cycle()?;

    let frame = s.master.transport_mut().take_sent().pop().unwrap();
    assert_eq!(decoded_timestamp(&frame), 0);
    assert_eq!(s.faults.count(), 0);
    Ok(())
}

#[test]
fn test_conflicting_loopbacks_reported_once() -> Result<()> {
    let mut s = stack(1);

    s.master.publish_cycle()?;
    s.master.handle_loopback_frame(&loopback(0, 100));
    s.master.handle_loopback_frame(&loopback(0, 200));

    assert_eq!(
        s.faults.take(),
        vec!["time sync master publication conflict".to_string()]
    );

    // Neither conflicting timestamp survives into the next cycle
    s.clock.advance(Duration::from_millis(100));
    s.master.publish_cycle()?;
    let frame = s.master.transport_mut().take_sent().pop().unwrap();
    assert_eq!(decoded_timestamp(&frame), 0);
    Ok(())
}

#[test]
fn test_transport_outage_and_recovery() -> Result<()> {
    let mut s = stack(2);

    s.master.transport_mut().fail_sends_on_iface(Some(0));
    assert!(matches!(
        s.master.publish_cycle(),
        Err(SyncError::Transport(_))
    ));
    assert!(s.master.transport_mut().take_sent().is_empty());

    // Once the interface is healthy again, the next trigger publishes on
    // both interfaces without any manual reset.
    s.master.transport_mut().fail_sends_on_iface(None);
    s.clock.advance(Duration::from_millis(100));
    s.master.publish_cycle()?;

    let sent = s.master.transport_mut().take_sent();
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].transfer_id, sent[1].transfer_id);
    Ok(())
}

#[test]
fn test_foreign_traffic_does_not_disturb_captures() -> Result<()> {
    let mut s = stack(1);

    s.master.publish_cycle()?;
    s.master.handle_loopback_frame(&loopback(0, 4_242));

    // A frame from another node, even one carrying the right message type,
    // must not overwrite or conflict with the pending capture.
    let mut foreign = loopback(0, 9_999);
    foreign.source = tsync_transport::NodeId::new(7);
    s.master.handle_loopback_frame(&foreign);

    s.clock.advance(Duration::from_millis(100));
    s.master.publish_cycle()?;
    let frame = s.master.transport_mut().take_sent().pop().unwrap();
    assert_eq!(decoded_timestamp(&frame), 4_242);
    assert_eq!(s.master.stats().loopbacks_ignored, 1);
    assert_eq!(s.faults.count(), 0);
    Ok(())
}
