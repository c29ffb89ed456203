//! Integration tests for the time-synchronization master.
//!
//! Scenarios covered:
//! - Multi-cycle publication over redundant interfaces
//! - Transfer-ID continuity and restart after publication gaps
//! - Fault reporting and recovery paths

mod publication_test;
mod registry_test;
