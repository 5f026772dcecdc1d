//! Error types for the volatile state table.
//!
//! The error enum is `Clone` on purpose: a replication failure recorded for a
//! group must reach both the commit call that reported it and every waiter
//! holding that group's completion handle.

use thiserror::Error;

/// Error conditions surfaced by the state table.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WeftError {
    /// Commit was called with the reserved sequence number zero.
    #[error("invalid sequence number: 0 is reserved as unassigned")]
    InvalidSequenceNumber,

    /// Commit was called for a sequence number that was never prepared,
    /// or whose group already drained.
    #[error("no replication context registered for sequence number {seq}")]
    UnknownSequence { seq: u64 },

    /// The replicator reported a failure for a prepared group. None of the
    /// group's entries reach the committed view.
    #[error("replication failed: {reason}")]
    ReplicationFailed { reason: String },

    /// The completion signal was dropped before it fired. Only reachable
    /// when the table is torn down with commits still pending.
    #[error("commit completion signal was dropped before it fired")]
    SignalLost,
}

impl WeftError {
    /// Create a ReplicationFailed error with the given reason.
    pub fn replication_failed(reason: impl Into<String>) -> Self {
        Self::ReplicationFailed {
            reason: reason.into(),
        }
    }

    /// Check if this error carries a replicator-reported failure.
    pub fn is_replication_failure(&self) -> bool {
        matches!(self, Self::ReplicationFailed { .. })
    }
}

/// Result type using WeftError.
pub type WeftResult<T> = Result<T, WeftError>;
