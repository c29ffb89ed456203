use thiserror::Error;

/// Error types surfaced by a publication cycle and its collaborators.
///
/// Protocol-level anomalies (conflicting loopback captures, zero hardware
/// timestamps) are deliberately absent: they degrade one interface for one
/// cycle and go to the fault sink instead of failing the cycle.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SyncError {
    /// The outgoing transfer registry cannot allocate another entry.
    #[error("outgoing transfer registry exhausted")]
    OutOfMemory,

    /// The message type name is not present in the data type table.
    #[error("unknown message type: {0}")]
    UnknownMessageType(String),

    /// Interface-specific transmit resources could not be acquired.
    #[error("resource acquisition failed: {0}")]
    Resource(String),

    /// The transport rejected a send call. The transport's own diagnostic
    /// is passed through verbatim.
    #[error("transport error: {0}")]
    Transport(String),
}

/// Convenience type alias for synchronization operations.
pub type SyncResult<T> = Result<T, SyncError>;
