//! Domain types for the reconciliation engine.
//!
//! This module contains the core data structures:
//! - Events: categories, teams, origins and timeline rows
//! - Run: run-scoped state and counters
//! - Time: match-clock parsing

pub mod event;
pub mod run;
pub mod time;

// Re-export commonly used types
pub use event::{Category, Event, Origin, Team, TimelineEntry};
pub use run::{ReconcileRun, RunMetadata};
pub use time::{format_clock, parse_clock};
