//! Common types shared across the timesync workspace.
//!
//! This crate provides:
//! - [`time`] module with monotonic/UTC time types and the [`Clock`] seam
//! - [`message`] module with the synchronization wire payload and its
//!   protocol constants
//! - [`error`] module with the shared error type and result alias
//! - [`fault`] module with the non-fatal fault reporting sink
//! - [`config`] module with TOML-backed master configuration

pub mod config;
pub mod error;
pub mod fault;
pub mod message;
pub mod time;

pub use config::*;
pub use error::*;
pub use fault::*;
pub use message::*;
pub use time::*;
