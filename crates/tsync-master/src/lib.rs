//! Node-local time-synchronization master for a redundant broadcast bus.
//!
//! A single node periodically broadcasts a synchronization message that lets
//! every other node on the bus derive a common time base. The message payload
//! is the hardware transmission instant of the *previous* cycle's frame,
//! learned through loopback reception: a frame must be sent before its own
//! transmission instant is known, so every published value lags one cycle.
//!
//! This crate provides:
//! - [`registry`] module with the bounded, deadline-expiring transfer-ID
//!   registry shared across the node's outgoing message streams
//! - [`iface`] module with the per-interface timestamp-capture state machine
//! - [`master`] module with the publication scheduler that rate-limits
//!   cycles and fans one transfer ID out across all active interfaces
//!
//! Control flow per external trigger: the scheduler checks the minimum
//! publication period, obtains one shared transfer ID, then drives every
//! active interface to transmit and re-arm its loopback capture. Loopback
//! frames arrive asynchronously between triggers and are routed through
//! [`master::TimeSyncMaster::handle_loopback_frame`].

pub mod iface;
pub mod master;
pub mod registry;

pub use iface::*;
pub use master::*;
pub use registry::*;
