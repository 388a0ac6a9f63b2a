//! Ground-truth loading.
//!
//! Structural mapping only: one record in, one event out. No filtering,
//! no deduplication, no inference beyond parsing the label and clock.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{parse_clock, Category, Event, Team};
use crate::error::ReconcileError;
use crate::extract::TeamMap;

/// Timestamp as delivered by the feed: clock string or plain seconds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawTimestamp {
    Seconds(f64),
    Clock(String),
}

impl RawTimestamp {
    /// Whole-match seconds, if the value is usable
    pub fn to_seconds(&self) -> Option<f64> {
        let seconds = match self {
            RawTimestamp::Seconds(s) => Some(*s),
            RawTimestamp::Clock(s) => parse_clock(s).or_else(|| s.trim().parse::<f64>().ok()),
        }?;

        (seconds.is_finite() && seconds >= 0.0).then_some(seconds)
    }
}

/// One authoritative record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroundTruthRecord {
    pub event_type: String,

    pub timestamp: RawTimestamp,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl GroundTruthRecord {
    pub fn new(event_type: &str, timestamp: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            timestamp: RawTimestamp::Clock(timestamp.to_string()),
            team: None,
            description: None,
        }
    }

    pub fn with_team(mut self, team: &str) -> Self {
        self.team = Some(team.to_string());
        self
    }
}

/// Map feed records to ground-truth events, sorted by time
///
/// The sort is stable, so records sharing a timestamp keep feed order.
/// An unparseable timestamp fails the whole load: ground truth is never
/// silently dropped.
pub fn load_ground_truth(
    records: &[GroundTruthRecord],
    teams: &TeamMap,
) -> Result<Vec<Event>, ReconcileError> {
    if records.is_empty() {
        return Err(ReconcileError::MissingInput("ground truth"));
    }

    let mut events = Vec::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        let abs_time_seconds =
            record
                .timestamp
                .to_seconds()
                .ok_or_else(|| ReconcileError::InvalidGroundTruth {
                    index,
                    reason: format!("unusable timestamp {:?}", record.timestamp),
                })?;

        let category = record.event_type.parse::<Category>().unwrap_or_else(|_| {
            debug!(index, event_type = %record.event_type, "Unrecognized ground truth label");
            Category::Other
        });

        let team = record
            .team
            .as_deref()
            .map(|label| parse_team_label(label, teams))
            .unwrap_or(Team::Unknown);

        let description = record
            .description
            .clone()
            .unwrap_or_else(|| record.event_type.clone());

        events.push(Event::ground_truth(abs_time_seconds, category, team, description));
    }

    events.sort_by(|a, b| a.abs_time_seconds.total_cmp(&b.abs_time_seconds));

    Ok(events)
}

fn parse_team_label(label: &str, teams: &TeamMap) -> Team {
    match label.trim().to_lowercase().as_str() {
        "home" => Team::Home,
        "away" => Team::Away,
        _ => teams.attribute(label),
    }
}
