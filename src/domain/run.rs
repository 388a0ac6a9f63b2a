//! Run-scoped reconciliation state.
//!
//! A `ReconcileRun` is built by the reconciler for exactly one match and
//! handed back to the caller. Nothing about a run is kept process-wide.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::scorer::AccuracyReport;
use crate::core::validator::GoalVerdict;

use super::event::TimelineEntry;

/// Counters collected while a run executes
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunMetadata {
    /// Commentary segments received
    pub segments: usize,

    /// Ground-truth records loaded
    pub ground_truth_events: usize,

    /// Lines that carried a timestamp and produced an event
    pub parsed_lines: usize,

    /// Lines that looked like content but had no usable timestamp
    pub malformed_lines: usize,

    /// Blank lines, separators and section headers
    pub discarded_lines: usize,

    /// Parsed lines that matched no category rule
    pub unresolved_categories: usize,

    pub goals_validated: usize,

    pub goals_downgraded: usize,

    /// AI-only events promoted into the fused timeline
    pub extras_promoted: usize,

    /// AI-only events dropped as repeats of an already promoted extra
    pub extras_suppressed: usize,
}

/// The complete result of one reconciliation
#[derive(Debug, Clone, Serialize)]
pub struct ReconcileRun {
    /// Unique identifier for this run
    pub id: Uuid,

    pub started_at: DateTime<Utc>,

    pub completed_at: DateTime<Utc>,

    /// sha256 over the canonical JSON of both inputs
    pub input_digest: String,

    pub metadata: RunMetadata,

    /// Outcome of every AI goal claim, in commentary order
    pub goal_verdicts: Vec<GoalVerdict>,

    pub report: AccuracyReport,

    /// The deliverable: ground truth plus conservative AI extras
    pub timeline: Vec<TimelineEntry>,
}

impl ReconcileRun {
    /// Wall-clock duration of the run in milliseconds
    pub fn duration_ms(&self) -> i64 {
        (self.completed_at - self.started_at).num_milliseconds()
    }
}
