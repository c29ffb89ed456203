//! Fault-reporting sink for non-fatal protocol anomalies.
//!
//! A duplicate loopback capture or a zero hardware timestamp means one
//! interface reports "unknown" for one cycle; neither should abort the
//! publication cycle. Such anomalies are routed to an observability-only
//! sink instead of being returned as errors.

use std::sync::Mutex;
use tracing::warn;

/// Observability-only sink for non-fatal internal faults.
pub trait FaultSink: Send + Sync {
    /// Record a non-fatal internal fault.
    fn report_internal_fault(&self, message: &str);
}

/// Sink that forwards faults to the `tracing` log at warn level.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogFaultSink;

impl FaultSink for LogFaultSink {
    fn report_internal_fault(&self, message: &str) {
        warn!(fault = message, "internal fault reported");
    }
}

/// Sink that records faults in memory for later inspection.
///
/// Intended for tests and diagnostics tooling.
#[derive(Debug, Default)]
pub struct RecordingFaultSink {
    faults: Mutex<Vec<String>>,
}

impl RecordingFaultSink {
    /// Create an empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of faults recorded so far.
    #[must_use]
    pub fn count(&self) -> usize {
        self.faults.lock().map(|v| v.len()).unwrap_or(0)
    }

    /// Drain and return all recorded fault messages.
    #[must_use]
    pub fn take(&self) -> Vec<String> {
        self.faults
            .lock()
            .map(|mut v| std::mem::take(&mut *v))
            .unwrap_or_default()
    }
}

impl FaultSink for RecordingFaultSink {
    fn report_internal_fault(&self, message: &str) {
        if let Ok(mut faults) = self.faults.lock() {
            faults.push(message.to_string());
        }
    }
}
