//! Outgoing transfer-ID registry.
//!
//! A bounded associative store mapping message-stream identity to its
//! wrapping transfer counter. Entries carry an expiry deadline: an entry
//! whose deadline has lapsed is logically absent, so a publication gap
//! longer than the deadline window restarts the counter instead of
//! fabricating continuity across the gap. Expired entries are reclaimed
//! opportunistically on access; no background sweep is required.

use std::collections::HashMap;
use tracing::trace;
use tsync_common::{MasterConfig, MonotonicTime, SyncError, SyncResult};
use tsync_transport::{TransferId, TransferKey};

#[derive(Debug, Clone, Copy)]
struct TransferEntry {
    transfer_id: TransferId,
    deadline: MonotonicTime,
}

/// Bounded registry of outgoing transfer counters.
///
/// Shared across all publishers of a node; each publisher holds a non-owning
/// handle and accesses the registry once per transfer.
#[derive(Debug)]
pub struct OutgoingTransferRegistry {
    entries: HashMap<TransferKey, TransferEntry>,
    capacity: usize,
}

impl OutgoingTransferRegistry {
    /// Default bound on concurrently tracked streams.
    pub const DEFAULT_CAPACITY: usize = 64;

    /// Create a registry with the default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(Self::DEFAULT_CAPACITY)
    }

    /// Create a registry bounded to `capacity` streams (at least one).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: HashMap::new(),
            capacity: capacity.max(1),
        }
    }

    /// Create a registry sized from the master configuration.
    #[must_use]
    pub fn from_config(config: &MasterConfig) -> Self {
        Self::with_capacity(config.registry_capacity)
    }

    /// Return the current counter for `key` and advance it for the next
    /// caller.
    ///
    /// A live entry (deadline after `now`) is reused and its deadline
    /// refreshed to `new_deadline`. An absent or expired entry restarts the
    /// counter at its initial value.
    ///
    /// # Errors
    ///
    /// [`SyncError::OutOfMemory`] when a new entry is needed and the
    /// capacity bound is reached.
    pub fn fetch_and_advance(
        &mut self,
        key: TransferKey,
        now: MonotonicTime,
        new_deadline: MonotonicTime,
    ) -> SyncResult<TransferId> {
        self.evict_expired(now);

        if let Some(entry) = self.entries.get_mut(&key) {
            let current = entry.transfer_id;
            entry.transfer_id.increment();
            entry.deadline = new_deadline;
            return Ok(current);
        }

        if self.entries.len() >= self.capacity {
            return Err(SyncError::OutOfMemory);
        }

        let current = TransferId::default();
        let mut next = current;
        next.increment();
        self.entries.insert(
            key,
            TransferEntry {
                transfer_id: next,
                deadline: new_deadline,
            },
        );
        Ok(current)
    }

    fn evict_expired(&mut self, now: MonotonicTime) {
        let before = self.entries.len();
        self.entries.retain(|_, entry| entry.deadline > now);
        let evicted = before - self.entries.len();
        if evicted > 0 {
            trace!(evicted, "reclaimed expired transfer entries");
        }
    }

    /// Number of entries not yet reclaimed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no entries are tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Bound on concurrently tracked streams.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

impl Default for OutgoingTransferRegistry {
    fn default() -> Self {
        Self::new()
    }
}
