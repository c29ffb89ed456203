//! Publication scheduler for the time-synchronization master.
//!
//! One externally-triggered entry point, [`TimeSyncMaster::publish_cycle`],
//! runs a complete cycle: lazy all-or-nothing initialization, minimum-period
//! rate limiting, acquisition of one shared transfer ID, and fan-out over
//! every active interface. All interfaces of one cycle carry the identical
//! transfer ID, which is what lets receivers on different physical links
//! recognize the frames as one logical transfer.
//!
//! Loopback frames are delivered asynchronously between triggers through
//! [`TimeSyncMaster::handle_loopback_frame`]; the trigger and the loopback
//! callback are expected to run on the same execution context.

use crate::iface::IfaceMaster;
use crate::registry::OutgoingTransferRegistry;
use serde::Serialize;
use std::sync::{Arc, Mutex};
use tracing::{debug, trace};
use tsync_common::{
    Clock, FaultSink, LogFaultSink, MasterConfig, MonotonicDuration, MonotonicTime, SyncError,
    SyncResult, TIME_SYNC_TYPE_NAME,
};
use tsync_transport::{
    DataTypeTable, MessageTypeId, NodeId, RxFrame, TransferKey, TransferKind, Transport,
    MAX_IFACES,
};

/// Activity counters of the master, for diagnostics.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct MasterStats {
    /// Cycles that resulted in a fan-out.
    pub cycles_published: u64,
    /// Cycles skipped by the rate limiter.
    pub cycles_skipped: u64,
    /// Loopback frames routed to an interface's capture unit.
    pub loopbacks_delivered: u64,
    /// Loopback frames rejected by the identity filter.
    pub loopbacks_ignored: u64,
}

/// Time-synchronization master for a redundant multi-interface bus.
///
/// Owns the transport and clock; holds non-owning handles to the shared
/// transfer-ID registry and the data type table, which belong to the wider
/// messaging system.
pub struct TimeSyncMaster<T: Transport, C: Clock> {
    transport: T,
    clock: C,
    faults: Arc<dyn FaultSink>,
    types: Arc<DataTypeTable>,
    registry: Arc<Mutex<OutgoingTransferRegistry>>,
    config: MasterConfig,
    node_id: NodeId,
    message_type: Option<MessageTypeId>,
    ifaces: [Option<IfaceMaster>; MAX_IFACES as usize],
    prev_pub_mono: MonotonicTime,
    initialized: bool,
    stats: MasterStats,
}

impl<T: Transport, C: Clock> TimeSyncMaster<T, C> {
    /// Create a master with the default configuration and the logging fault
    /// sink. Nothing is allocated until the first publication cycle.
    pub fn new(
        transport: T,
        clock: C,
        types: Arc<DataTypeTable>,
        registry: Arc<Mutex<OutgoingTransferRegistry>>,
        node_id: NodeId,
    ) -> Self {
        Self {
            transport,
            clock,
            faults: Arc::new(LogFaultSink),
            types,
            registry,
            config: MasterConfig::default(),
            node_id,
            message_type: None,
            ifaces: [None, None, None],
            prev_pub_mono: MonotonicTime::ZERO,
            initialized: false,
            stats: MasterStats::default(),
        }
    }

    /// Replace the timing configuration.
    #[must_use]
    pub fn with_config(mut self, config: MasterConfig) -> Self {
        self.config = config;
        self
    }

    /// Replace the fault-reporting sink.
    #[must_use]
    pub fn with_fault_sink(mut self, faults: Arc<dyn FaultSink>) -> Self {
        self.faults = faults;
        self
    }

    /// Run one publication cycle now.
    ///
    /// Triggers arriving within the minimum publication period of the last
    /// successful cycle are skipped and return `Ok(())`; throttling is
    /// expected steady-state behavior. A failed cycle leaves the master
    /// usable: the next external trigger retries from scratch.
    ///
    /// # Errors
    ///
    /// Initialization, registry, or transport failures abort the cycle.
    /// Interfaces that already transmitted in an aborted fan-out are not
    /// rolled back.
    pub fn publish_cycle(&mut self) -> SyncResult<()> {
        self.ensure_initialized()?;

        let now = self.clock.monotonic_now();

        // Enforce max frequency
        let since_prev_pub = now - self.prev_pub_mono;
        if since_prev_pub < MonotonicDuration::from(self.config.min_publication_period) {
            trace!("publication skipped");
            self.stats.cycles_skipped += 1;
            return Ok(());
        }
        self.prev_pub_mono = now;

        // One transfer ID shared by every interface of this cycle, fixed
        // before any interface transmits
        let transfer_id = self.next_transfer_id(now)?;

        let max_period = MonotonicDuration::from(self.config.max_publication_period);
        for index in 0..self.active_iface_count() {
            if let Some(iface) = self.ifaces[index as usize].as_mut() {
                iface.publish(&mut self.transport, transfer_id, now, max_period)?;
            }
        }
        self.stats.cycles_published += 1;
        Ok(())
    }

    /// Route a loopback frame delivered by the transport.
    ///
    /// Frames that do not identify this node's own single-frame broadcast of
    /// the synchronization message are ignored. A frame arriving before
    /// initialization or for an out-of-range interface indicates a faulty
    /// driver; it is reported and dropped rather than treated as fatal.
    pub fn handle_loopback_frame(&mut self, frame: &RxFrame) {
        if !self.initialized || frame.iface_index >= MAX_IFACES {
            self.faults
                .report_internal_fault("time sync master got unexpected loopback frame");
            return;
        }

        let matches = self.message_type == Some(frame.message_type)
            && frame.kind == TransferKind::MessageBroadcast
            && frame.is_single_frame()
            && frame.source == self.node_id;
        if !matches {
            self.stats.loopbacks_ignored += 1;
            return;
        }

        if let Some(iface) = self.ifaces[frame.iface_index as usize].as_mut() {
            iface.handle_tx_timestamp(frame.utc_timestamp, self.faults.as_ref());
            self.stats.loopbacks_delivered += 1;
        }
    }

    /// Number of interfaces the next cycle would publish on.
    ///
    /// Queried live from the transport and clamped to the fixed slot array.
    #[must_use]
    pub fn active_iface_count(&self) -> u8 {
        self.transport.iface_count().min(MAX_IFACES)
    }

    /// Activity counters.
    #[must_use]
    pub fn stats(&self) -> MasterStats {
        self.stats
    }

    /// Shared access to the owned transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Exclusive access to the owned transport.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Lazy one-time setup: resolve the message type and bring up every
    /// interface slot. All-or-nothing; a failure leaves initialization to be
    /// retried, idempotently, on the next cycle.
    fn ensure_initialized(&mut self) -> SyncResult<()> {
        if self.initialized {
            return Ok(());
        }

        if self.message_type.is_none() {
            let id = self.types.resolve(TIME_SYNC_TYPE_NAME).ok_or_else(|| {
                SyncError::UnknownMessageType(TIME_SYNC_TYPE_NAME.to_string())
            })?;
            self.message_type = Some(id);
        }

        for index in 0..MAX_IFACES {
            let iface = self.ifaces[index as usize].get_or_insert_with(|| IfaceMaster::new(index));
            iface.init(&mut self.transport)?;
        }

        debug!(node = self.node_id.get(), "time sync master initialized");
        self.initialized = true;
        Ok(())
    }

    fn next_transfer_id(&mut self, now: MonotonicTime) -> SyncResult<tsync_transport::TransferId> {
        let message_type = self.message_type.ok_or_else(|| {
            SyncError::UnknownMessageType(TIME_SYNC_TYPE_NAME.to_string())
        })?;

        let key = TransferKey::broadcast(message_type);
        let deadline = now + MonotonicDuration::from(self.config.publisher_timeout);
        let mut registry = self.registry.lock().map_err(|_| {
            SyncError::Resource("outgoing transfer registry lock poisoned".into())
        })?;
        registry.fetch_and_advance(key, now, deadline)
    }
}
