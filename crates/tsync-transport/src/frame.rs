//! Protocol identity types and the loopback frame view.
//!
//! These types describe which logical stream a frame belongs to: the message
//! type, the transfer pattern, the addressed destination, and the wrapping
//! transfer-ID counter shared by all redundant interfaces of one transfer.

use serde::{Deserialize, Serialize};
use tsync_common::UtcTime;

/// Node address on the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NodeId(u8);

impl NodeId {
    /// Pseudo-address meaning "all nodes".
    pub const BROADCAST: Self = Self(0);

    /// Construct from a raw node address.
    #[must_use]
    pub const fn new(id: u8) -> Self {
        Self(id)
    }

    /// Raw node address.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }
}

/// Identifier of a registered message type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageTypeId(u16);

impl MessageTypeId {
    /// Construct from a raw type identifier.
    #[must_use]
    pub const fn new(id: u16) -> Self {
        Self(id)
    }

    /// Raw type identifier.
    #[must_use]
    pub const fn get(self) -> u16 {
        self.0
    }
}

/// Per-stream transfer counter, 5 bits wide on this transport.
///
/// Increments by one per transfer and wraps silently; receivers use it to
/// recognize frames from different physical interfaces as one logical
/// transfer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TransferId(u8);

impl TransferId {
    /// Counter width defined by the transport.
    pub const WIDTH_BITS: u32 = 5;

    /// Largest representable counter value.
    pub const MAX: u8 = (1 << Self::WIDTH_BITS) - 1;

    /// Construct from a raw counter value, truncated to the counter width.
    #[must_use]
    pub const fn new(value: u8) -> Self {
        Self(value & Self::MAX)
    }

    /// Raw counter value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Advance by one, wrapping modulo the counter width.
    pub fn increment(&mut self) {
        self.0 = (self.0 + 1) & Self::MAX;
    }
}

/// Transfer pattern of a message stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransferKind {
    /// Message addressed to all nodes.
    MessageBroadcast,
    /// Message addressed to a single node.
    MessageUnicast,
}

/// Identity of an outgoing message stream.
///
/// Used only as a lookup key; immutable once constructed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TransferKey {
    /// Message type carried by the stream.
    pub message_type: MessageTypeId,
    /// Transfer pattern.
    pub kind: TransferKind,
    /// Destination node, [`NodeId::BROADCAST`] for broadcast streams.
    pub destination: NodeId,
}

impl TransferKey {
    /// Key of a broadcast stream for the given message type.
    #[must_use]
    pub const fn broadcast(message_type: MessageTypeId) -> Self {
        Self {
            message_type,
            kind: TransferKind::MessageBroadcast,
            destination: NodeId::BROADCAST,
        }
    }
}

/// Loopback view of a frame echoed back by the bus hardware.
///
/// The hardware timestamp is the instant the frame physically left the
/// transceiver of `iface_index`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RxFrame {
    /// Physical interface the frame was transmitted on.
    pub iface_index: u8,
    /// Message type of the transfer the frame belongs to.
    pub message_type: MessageTypeId,
    /// Transfer pattern of the transfer.
    pub kind: TransferKind,
    /// Node that transmitted the frame.
    pub source: NodeId,
    /// Whether this is the first frame of its transfer.
    pub first: bool,
    /// Whether this is the last frame of its transfer.
    pub last: bool,
    /// Hardware transmission timestamp.
    pub utc_timestamp: UtcTime,
}

impl RxFrame {
    /// True when the frame is a complete single-frame transfer.
    #[must_use]
    pub const fn is_single_frame(&self) -> bool {
        self.first && self.last
    }
}
