//! Transport plane abstractions for the redundant broadcast bus.
//!
//! This crate provides:
//! - [`Transport`] trait for abstracting the frame transport consumed by
//!   publishing components
//! - [`frame`] module with protocol identity types and the loopback frame view
//! - [`data_types`] module with message type name resolution
//! - [`SimulatedTransport`] for testing without bus hardware
//!
//! The transport drives multiple redundant physical interfaces that carry
//! the same logical traffic. Senders are allocated with an interface mask so
//! a publisher can address exactly one interface, and with hardware loopback
//! so the true transmission instant of each frame is reported back
//! asynchronously.

pub mod data_types;
pub mod frame;

pub use data_types::*;
pub use frame::*;

use tracing::trace;
use tsync_common::{SyncError, SyncResult};

/// Maximum number of redundant physical interfaces a node can drive.
pub const MAX_IFACES: u8 = 3;

/// Handle to an allocated frame sender.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SenderHandle(u32);

impl SenderHandle {
    /// Construct from a raw transport-assigned value.
    #[must_use]
    pub const fn new(raw: u32) -> Self {
        Self(raw)
    }

    /// Raw transport-assigned value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

/// Frame transport over the redundant physical interfaces.
///
/// Send calls are fire-and-forget: completion of the physical transmission
/// is reported asynchronously through loopback frame delivery when the
/// sender was allocated with loopback enabled.
pub trait Transport: Send {
    /// Allocate a sender restricted to the interfaces set in `iface_mask`.
    ///
    /// With `loopback` enabled, the hardware echoes each transmitted frame
    /// back to the node together with its transmission timestamp.
    fn allocate_sender(&mut self, iface_mask: u8, loopback: bool) -> SyncResult<SenderHandle>;

    /// Queue a payload for transmission as a single-frame broadcast transfer.
    fn send(&mut self, sender: SenderHandle, payload: &[u8], transfer_id: TransferId)
        -> SyncResult<()>;

    /// Number of physical interfaces currently active.
    ///
    /// The count can change at runtime; callers must query it per cycle
    /// rather than cache it.
    fn iface_count(&self) -> u8;
}

/// Record of one frame accepted by the simulated transport.
#[derive(Debug, Clone)]
pub struct SentFrame {
    /// Interface the frame was queued on.
    pub iface_index: u8,
    /// Wire payload.
    pub payload: Vec<u8>,
    /// Transfer counter the frame was tagged with.
    pub transfer_id: TransferId,
    /// Whether the sender requested loopback reception.
    pub loopback: bool,
}

#[derive(Debug, Clone, Copy)]
struct SenderConfig {
    iface_mask: u8,
    loopback: bool,
}

/// In-memory transport for testing.
///
/// Records every accepted frame and supports failure injection for the
/// allocation and send paths. Loopback delivery is not modeled here; tests
/// fabricate [`RxFrame`] values and hand them to the component under test.
#[derive(Debug, Default)]
pub struct SimulatedTransport {
    iface_count: u8,
    senders: Vec<SenderConfig>,
    sent: Vec<SentFrame>,
    fail_allocation: bool,
    fail_send_on_iface: Option<u8>,
}

impl SimulatedTransport {
    /// Create a transport with the given number of active interfaces.
    #[must_use]
    pub fn new(iface_count: u8) -> Self {
        Self {
            iface_count,
            ..Self::default()
        }
    }

    /// Change the number of active interfaces at runtime.
    pub fn set_iface_count(&mut self, count: u8) {
        self.iface_count = count;
    }

    /// Make every subsequent sender allocation fail.
    pub fn fail_allocations(&mut self, fail: bool) {
        self.fail_allocation = fail;
    }

    /// Make sends on the given interface fail; `None` restores normal operation.
    pub fn fail_sends_on_iface(&mut self, iface: Option<u8>) {
        self.fail_send_on_iface = iface;
    }

    /// Frames accepted so far, in send order.
    #[must_use]
    pub fn sent_frames(&self) -> &[SentFrame] {
        &self.sent
    }

    /// Drain and return the accepted frames.
    pub fn take_sent(&mut self) -> Vec<SentFrame> {
        std::mem::take(&mut self.sent)
    }

    /// Number of senders allocated so far.
    #[must_use]
    pub fn sender_count(&self) -> usize {
        self.senders.len()
    }

    /// Interface mask and loopback flag of an allocated sender.
    #[must_use]
    pub fn sender_info(&self, sender: SenderHandle) -> Option<(u8, bool)> {
        self.senders
            .get(sender.raw() as usize)
            .map(|s| (s.iface_mask, s.loopback))
    }
}

impl Transport for SimulatedTransport {
    fn allocate_sender(&mut self, iface_mask: u8, loopback: bool) -> SyncResult<SenderHandle> {
        if self.fail_allocation {
            return Err(SyncError::Resource(
                "simulated sender allocation failure".into(),
            ));
        }
        let handle = SenderHandle::new(self.senders.len() as u32);
        self.senders.push(SenderConfig {
            iface_mask,
            loopback,
        });
        Ok(handle)
    }

    fn send(
        &mut self,
        sender: SenderHandle,
        payload: &[u8],
        transfer_id: TransferId,
    ) -> SyncResult<()> {
        let config = self
            .senders
            .get(sender.raw() as usize)
            .copied()
            .ok_or_else(|| SyncError::Resource("unknown sender handle".into()))?;

        let iface_index = config.iface_mask.trailing_zeros() as u8;
        if Some(iface_index) == self.fail_send_on_iface {
            return Err(SyncError::Transport(format!(
                "simulated send failure on iface {iface_index}"
            )));
        }

        trace!(
            iface = iface_index,
            tid = transfer_id.get(),
            len = payload.len(),
            "simulated send"
        );
        self.sent.push(SentFrame {
            iface_index,
            payload: payload.to_vec(),
            transfer_id,
            loopback: config.loopback,
        });
        Ok(())
    }

    fn iface_count(&self) -> u8 {
        self.iface_count
    }
}
