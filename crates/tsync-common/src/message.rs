//! Wire payload of the synchronization message.
//!
//! The message carries a single field: the hardware transmission timestamp of
//! the frame sent in the previous publication interval, in microseconds. Zero
//! means the previous timestamp is unknown or too old to be meaningful to
//! receivers. The field occupies 56 bits on the wire, little-endian, matching
//! the published schema of `protocol.TimeSync`.

use crate::time::UtcTime;

/// Full name under which the message type is registered.
pub const TIME_SYNC_TYPE_NAME: &str = "protocol.TimeSync";

/// Synchronization message payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TimeSync {
    /// Transmission timestamp of the previous interval's frame, or zero.
    pub prev_tx_timestamp_usec: u64,
}

impl TimeSync {
    /// Floor on the spacing between two publications, in milliseconds.
    /// Triggers arriving earlier are skipped, not failed.
    pub const MIN_PUBLICATION_PERIOD_MS: u64 = 40;

    /// Captured timestamps older than this are published as zero, in
    /// milliseconds. Receivers cannot use a timestamp from a cycle this old.
    pub const MAX_PUBLICATION_PERIOD_MS: u64 = 1100;

    /// Deadline window of the shared outgoing transfer registry entry, in
    /// milliseconds. A gap longer than this restarts the transfer-ID counter.
    pub const PUBLISHER_TIMEOUT_MS: u64 = 2200;

    /// Encoded payload size in bytes (one 56-bit field).
    pub const PAYLOAD_SIZE: usize = 7;

    const FIELD_MASK: u64 = (1 << 56) - 1;

    /// Build a message from a captured timestamp. The zero sentinel passes
    /// through unchanged.
    #[must_use]
    pub const fn from_timestamp(ts: UtcTime) -> Self {
        Self {
            prev_tx_timestamp_usec: ts.as_usec(),
        }
    }

    /// Serialize to the fixed 7-byte little-endian wire layout.
    ///
    /// Values wider than 56 bits are truncated, as the schema specifies.
    #[must_use]
    pub fn encode(&self) -> [u8; Self::PAYLOAD_SIZE] {
        let bits = (self.prev_tx_timestamp_usec & Self::FIELD_MASK).to_le_bytes();
        let mut out = [0u8; Self::PAYLOAD_SIZE];
        out.copy_from_slice(&bits[..Self::PAYLOAD_SIZE]);
        out
    }

    /// Deserialize from a wire payload.
    ///
    /// Returns `None` if the payload is shorter than the field.
    #[must_use]
    pub fn decode(payload: &[u8]) -> Option<Self> {
        if payload.len() < Self::PAYLOAD_SIZE {
            return None;
        }
        let mut bytes = [0u8; 8];
        bytes[..Self::PAYLOAD_SIZE].copy_from_slice(&payload[..Self::PAYLOAD_SIZE]);
        Some(Self {
            prev_tx_timestamp_usec: u64::from_le_bytes(bytes),
        })
    }
}
