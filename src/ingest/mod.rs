//! Input boundary for the two oracles.
//!
//! Ground truth and commentary are produced elsewhere; this module only
//! reads them and maps ground-truth records into events.
//!
//! ```text
//! MatchFeed ──► GroundTruthRecord ──► load_ground_truth ──► Vec<Event>
//!           └─► SegmentObservation ──► (extract) ──────────► Vec<Event>
//! ```

pub mod feed;
pub mod ground_truth;

use anyhow::Result;
use async_trait::async_trait;

use crate::extract::SegmentObservation;

pub use feed::{read_json_array, JsonFileFeed};
pub use ground_truth::{load_ground_truth, GroundTruthRecord, RawTimestamp};

/// Source of one match's ground truth and AI commentary
#[async_trait]
pub trait MatchFeed: Send + Sync {
    /// Human-readable feed name
    fn name(&self) -> &str;

    /// Authoritative events, in any order
    async fn ground_truth(&self) -> Result<Vec<GroundTruthRecord>>;

    /// Per-segment commentary, in segment order
    async fn commentary(&self) -> Result<Vec<SegmentObservation>>;
}
