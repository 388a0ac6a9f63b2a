//! pitchline - Match-event timeline reconciliation
//!
//! Reconciles two imperfect views of one football match: an authoritative
//! ground-truth event feed and free-text AI commentary produced per video
//! segment. The result is a fused timeline plus an accuracy report for the
//! AI observer.
//!
//! # Architecture
//!
//! The system is built around ground-truth authority:
//! - Ground truth decides what happened and when
//! - AI commentary only adds descriptions and a few conservative extras
//! - AI goal claims must be confirmed by an opposing kickoff
//!
//! # Modules
//!
//! - `ingest`: Input feeds and ground-truth loading
//! - `extract`: Commentary parsing, categorisation, team attribution
//! - `core`: Matching, goal validation, scoring, fusion, Reconciler
//! - `domain`: Data structures (Event, TimelineEntry, ReconcileRun)
//! - `cli`: Command-line interface
//!
//! # Usage
//!
//! ```bash
//! # Reconcile a match and keep the outputs
//! pitchline reconcile -g ground_truth.json -c commentary.json --out run/
//!
//! # Inspect what the extractor sees
//! pitchline extract -c commentary.json
//! ```

pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod error;
pub mod extract;
pub mod ingest;

// Re-export main types at crate root for convenience
pub use core::{AccuracyReport, ReconcileSettings, Reconciler};
pub use domain::{Category, Event, Origin, ReconcileRun, Team, TimelineEntry};
pub use error::ReconcileError;
pub use extract::{Extractor, SegmentObservation, TimestampConvention};
pub use ingest::{GroundTruthRecord, JsonFileFeed, MatchFeed};
