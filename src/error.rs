//! Typed failures of a reconciliation run.
//!
//! Recoverable conditions (malformed lines, unresolved categories) never
//! reach this type; they are counted in `RunMetadata` instead.

use thiserror::Error;

/// Errors that abort a reconciliation run
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// An oracle delivered nothing; the run cannot produce a complete timeline
    #[error("Missing input: {0} is empty")]
    MissingInput(&'static str),

    #[error("Invalid ground truth record #{index}: {reason}")]
    InvalidGroundTruth { index: usize, reason: String },

    /// Internal invariant broken; indicates a bug, not bad input
    #[error("Consistency violation: {0}")]
    ConsistencyViolation(String),

    #[error("Extraction worker failed: {0}")]
    WorkerFailed(String),
}
