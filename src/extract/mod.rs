//! Event observation extraction from AI commentary.
//!
//! Three layers, leaves first:
//! - `lines`: recognizes timestamped lines and discards headers/separators
//! - `rules`: ordered category rules and the team keyword map
//! - `extractor`: per-segment parsing and the bounded parallel batch

pub mod extractor;
pub mod lines;
pub mod rules;

pub use extractor::{
    CommentaryLine, Extraction, ExtractionStats, Extractor, SegmentObservation,
    TimestampConvention,
};
pub use lines::{classify_line, LineKind};
pub use rules::{has_save_term, is_kickoff, CategoryRule, RuleTable, TeamMap};
