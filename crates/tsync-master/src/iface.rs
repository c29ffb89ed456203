//! Per-interface timestamp capture and publication.
//!
//! A synchronization frame must be physically transmitted before its own
//! transmission instant is known, so each interface publishes the timestamp
//! captured for the *previous* cycle's frame. This one-cycle lag is a
//! protocol invariant, not a defect.

use tracing::trace;
use tsync_common::{
    FaultSink, MonotonicDuration, MonotonicTime, SyncError, SyncResult, TimeSync, UtcTime,
};
use tsync_transport::{SenderHandle, TransferId, Transport};

/// Timestamp-capture state machine for one physical interface.
///
/// Written asynchronously by loopback delivery, consumed by the publication
/// scheduler on its next cycle. At most one unconsumed capture may exist at
/// a time; a second capture before consumption is a conflict that clears the
/// state entirely, because neither timestamp can be trusted for the cycle.
///
/// An interface that has never published and one that published long ago are
/// indistinguishable on the wire: both report the zero sentinel until a
/// fresh capture is consumed in time.
#[derive(Debug)]
pub struct IfaceMaster {
    iface_index: u8,
    sender: Option<SenderHandle>,
    prev_tx_utc: UtcTime,
    prev_pub_mono: MonotonicTime,
}

impl IfaceMaster {
    /// Create the capture unit for interface `iface_index`.
    #[must_use]
    pub fn new(iface_index: u8) -> Self {
        Self {
            iface_index,
            sender: None,
            prev_tx_utc: UtcTime::ZERO,
            prev_pub_mono: MonotonicTime::ZERO,
        }
    }

    /// Acquire a sender bound to exactly this interface, with hardware
    /// loopback reception enabled.
    ///
    /// Idempotent: once a sender exists, further calls are no-ops.
    ///
    /// # Errors
    ///
    /// Propagates the transport's allocation failure.
    pub fn init<T: Transport>(&mut self, transport: &mut T) -> SyncResult<()> {
        if self.sender.is_none() {
            self.sender = Some(transport.allocate_sender(1 << self.iface_index, true)?);
        }
        Ok(())
    }

    /// Record the hardware transmission timestamp reported by a loopback
    /// echo of this interface's synchronization frame.
    ///
    /// A zero timestamp is a driver error; a capture arriving while the
    /// previous one is still unconsumed is a publication conflict. Both are
    /// reported to the fault sink and leave the state empty.
    pub fn handle_tx_timestamp(&mut self, ts: UtcTime, faults: &dyn FaultSink) {
        if ts.is_zero() {
            faults.report_internal_fault("time sync master got zero UTC TX timestamp");
            return;
        }
        if !self.prev_tx_utc.is_zero() {
            // Two loopback events before one consumption: the driver is
            // misbehaving and neither timestamp can be trusted.
            self.prev_tx_utc = UtcTime::ZERO;
            faults.report_internal_fault("time sync master publication conflict");
            return;
        }
        self.prev_tx_utc = ts;
    }

    /// Transmit this cycle's synchronization message.
    ///
    /// The payload is the previously captured timestamp, unless the last
    /// publication on this interface is at least `max_publication_period`
    /// old; then the zero sentinel is substituted, since receivers cannot
    /// use a timestamp from a cycle that far back. The pending capture is
    /// cleared either way, and the last-publication time is set to `now`.
    ///
    /// # Errors
    ///
    /// Returns the transport error verbatim if the send fails; an interface
    /// that was never initialized fails with [`SyncError::Resource`].
    pub fn publish<T: Transport>(
        &mut self,
        transport: &mut T,
        transfer_id: TransferId,
        now: MonotonicTime,
        max_publication_period: MonotonicDuration,
    ) -> SyncResult<()> {
        let sender = self.sender.ok_or_else(|| {
            SyncError::Resource(format!("iface {} has no sender", self.iface_index))
        })?;

        let since_prev_pub = now - self.prev_pub_mono;
        self.prev_pub_mono = now;
        let long_period = since_prev_pub >= max_publication_period;

        let msg = if long_period {
            TimeSync::default()
        } else {
            TimeSync::from_timestamp(self.prev_tx_utc)
        };
        self.prev_tx_utc = UtcTime::ZERO;

        trace!(
            iface = self.iface_index,
            tid = transfer_id.get(),
            prev_utc_usec = msg.prev_tx_timestamp_usec,
            "publishing time sync"
        );
        transport.send(sender, &msg.encode(), transfer_id)
    }

    /// True while a captured timestamp awaits consumption.
    #[must_use]
    pub fn has_pending_capture(&self) -> bool {
        !self.prev_tx_utc.is_zero()
    }

    /// Index of the physical interface this unit drives.
    #[must_use]
    pub fn iface_index(&self) -> u8 {
        self.iface_index
    }
}
