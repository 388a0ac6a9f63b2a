//! Turns per-segment commentary text into candidate events.
//!
//! Segment parsing is pure and independent, so batches are fanned out over
//! a bounded pool of tokio tasks. Results are stitched back together in
//! segment order before line indices are assigned, which keeps the output
//! identical to a sequential pass.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Semaphore;
use tracing::debug;

use crate::domain::{Category, Event, Team};
use crate::error::ReconcileError;

use super::lines::{classify_line, LineKind};
use super::rules::{RuleTable, TeamMap};

/// How line timestamps relate to the segment they appear in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TimestampConvention {
    /// Offsets from the segment start
    Relative,
    /// Whole-match clock values
    #[default]
    Absolute,
}

impl std::str::FromStr for TimestampConvention {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> anyhow::Result<Self> {
        match s.to_lowercase().as_str() {
            "relative" | "rel" => Ok(TimestampConvention::Relative),
            "absolute" | "abs" => Ok(TimestampConvention::Absolute),
            _ => anyhow::bail!("Unknown timestamp convention: {}", s),
        }
    }
}

/// One segment's unparsed AI output
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SegmentObservation {
    pub segment_start_abs_seconds: f64,
    pub text: String,
}

impl SegmentObservation {
    pub fn new(segment_start_abs_seconds: f64, text: impl Into<String>) -> Self {
        Self {
            segment_start_abs_seconds,
            text: text.into(),
        }
    }
}

/// A qualifying commentary line, in global commentary order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentaryLine {
    /// Position across the whole commentary
    pub index: usize,

    /// Segment the line came from
    pub segment: usize,

    pub abs_time_seconds: f64,

    pub text: String,

    pub team: Team,

    pub category: Category,
}

/// Line counts for one extraction pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExtractionStats {
    pub segments: usize,
    pub parsed_lines: usize,
    pub malformed_lines: usize,
    pub discarded_lines: usize,
    pub unresolved_categories: usize,
}

impl ExtractionStats {
    fn absorb(&mut self, other: &ExtractionStats) {
        self.segments += other.segments;
        self.parsed_lines += other.parsed_lines;
        self.malformed_lines += other.malformed_lines;
        self.discarded_lines += other.discarded_lines;
        self.unresolved_categories += other.unresolved_categories;
    }
}

/// Output of the extractor for a full commentary
#[derive(Debug, Clone, Default)]
pub struct Extraction {
    /// One AI event per commentary line, same order
    pub events: Vec<Event>,

    pub lines: Vec<CommentaryLine>,

    pub stats: ExtractionStats,
}

/// Lines of one segment before global indexing
#[derive(Debug, Clone)]
struct SegmentExtraction {
    segment: usize,
    lines: Vec<ParsedLine>,
    stats: ExtractionStats,
}

#[derive(Debug, Clone)]
struct ParsedLine {
    abs_time_seconds: f64,
    text: String,
    team: Team,
    category: Category,
}

/// Commentary extractor
#[derive(Debug, Clone)]
pub struct Extractor {
    rules: Arc<RuleTable>,
    teams: Arc<TeamMap>,
    convention: TimestampConvention,
}

impl Default for Extractor {
    fn default() -> Self {
        Self::new(RuleTable::default(), TeamMap::default(), TimestampConvention::default())
    }
}

impl Extractor {
    pub fn new(rules: RuleTable, teams: TeamMap, convention: TimestampConvention) -> Self {
        Self {
            rules: Arc::new(rules),
            teams: Arc::new(teams),
            convention,
        }
    }

    /// Same rules and teams, different timestamp convention
    pub fn with_convention(mut self, convention: TimestampConvention) -> Self {
        self.convention = convention;
        self
    }

    pub fn convention(&self) -> TimestampConvention {
        self.convention
    }

    pub fn teams(&self) -> &TeamMap {
        &self.teams
    }

    /// Parse every segment sequentially
    pub fn extract(&self, segments: &[SegmentObservation]) -> Extraction {
        let parts = segments
            .iter()
            .enumerate()
            .map(|(idx, segment)| self.extract_segment(idx, segment))
            .collect();
        Self::assemble(parts)
    }

    /// Parse segments on up to `max_workers` concurrent tasks
    pub async fn extract_parallel(
        &self,
        segments: Vec<SegmentObservation>,
        max_workers: usize,
    ) -> Result<Extraction, ReconcileError> {
        let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
        let mut tasks = Vec::with_capacity(segments.len());

        for (idx, segment) in segments.into_iter().enumerate() {
            let permit = semaphore
                .clone()
                .acquire_owned()
                .await
                .map_err(|e| ReconcileError::WorkerFailed(e.to_string()))?;
            let extractor = self.clone();

            tasks.push(tokio::spawn(async move {
                let part = extractor.extract_segment(idx, &segment);
                drop(permit);
                part
            }));
        }

        let mut parts = Vec::with_capacity(tasks.len());
        for task in tasks {
            let part = task
                .await
                .map_err(|e| ReconcileError::WorkerFailed(e.to_string()))?;
            parts.push(part);
        }

        Ok(Self::assemble(parts))
    }

    fn extract_segment(&self, segment_idx: usize, segment: &SegmentObservation) -> SegmentExtraction {
        let mut stats = ExtractionStats {
            segments: 1,
            ..Default::default()
        };
        let mut lines = Vec::new();

        for raw in segment.text.lines() {
            match classify_line(raw) {
                LineKind::Observation {
                    offset_seconds,
                    text,
                } => {
                    let abs_time_seconds = match self.convention {
                        TimestampConvention::Relative => {
                            segment.segment_start_abs_seconds + offset_seconds
                        }
                        TimestampConvention::Absolute => offset_seconds,
                    };

                    let category = match self.rules.classify(text) {
                        Some(category) => category,
                        None => {
                            stats.unresolved_categories += 1;
                            Category::Other
                        }
                    };
                    let team = if category == Category::Other {
                        Team::Unknown
                    } else {
                        self.teams.attribute(text)
                    };

                    stats.parsed_lines += 1;
                    lines.push(ParsedLine {
                        abs_time_seconds,
                        text: text.to_string(),
                        team,
                        category,
                    });
                }
                LineKind::Discarded => stats.discarded_lines += 1,
                LineKind::Malformed => {
                    debug!(segment = segment_idx, line = raw.trim(), "Skipping malformed line");
                    stats.malformed_lines += 1;
                }
            }
        }

        SegmentExtraction {
            segment: segment_idx,
            lines,
            stats,
        }
    }

    fn assemble(mut parts: Vec<SegmentExtraction>) -> Extraction {
        parts.sort_by_key(|p| p.segment);

        let mut extraction = Extraction::default();

        for part in parts {
            extraction.stats.absorb(&part.stats);

            for line in part.lines {
                let index = extraction.lines.len();
                extraction.events.push(Event::ai_detected(
                    line.abs_time_seconds,
                    line.category,
                    line.team,
                    line.text.clone(),
                    index,
                ));
                extraction.lines.push(CommentaryLine {
                    index,
                    segment: part.segment,
                    abs_time_seconds: line.abs_time_seconds,
                    text: line.text,
                    team: line.team,
                    category: line.category,
                });
            }
        }

        extraction
    }
}
