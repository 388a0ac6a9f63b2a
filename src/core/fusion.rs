//! Fusion of ground truth and AI observations into the deliverable timeline.
//!
//! Ground truth supplies every timestamp and category; AI commentary only
//! supplies descriptions and a few conservative extras. When in doubt an
//! AI event is left out rather than risk showing one moment twice.

use std::collections::{BTreeMap, HashSet};

use tracing::debug;

use crate::domain::{format_clock, Category, Event, Origin};
use crate::error::ReconcileError;

use super::matcher::{default_compatibility, match_events};

/// Default window for pairing ground truth with AI descriptions
pub const DEFAULT_FUSION_TOLERANCE: f64 = 30.0;

/// Default window inside which two extras count as the same moment
pub const DEFAULT_EXTRAS_DEDUP: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FusionSettings {
    pub tolerance_seconds: f64,
    pub extras_dedup_seconds: f64,
}

impl Default for FusionSettings {
    fn default() -> Self {
        Self {
            tolerance_seconds: DEFAULT_FUSION_TOLERANCE,
            extras_dedup_seconds: DEFAULT_EXTRAS_DEDUP,
        }
    }
}

/// Fused timeline plus bookkeeping
#[derive(Debug, Clone, Default)]
pub struct FusionOutcome {
    /// Ascending by time; ground truth before extras on ties
    pub timeline: Vec<Event>,

    pub extras_promoted: usize,

    pub extras_suppressed: usize,
}

/// Build the fused timeline
///
/// `downgraded_claims` lists AI event indices whose goal claim was
/// downgraded; they may surface as shot extras under the same window
/// rule as the unambiguous categories.
pub fn fuse(
    ground_truth: &[Event],
    ai_events: &[Event],
    downgraded_claims: &[usize],
    settings: &FusionSettings,
) -> FusionOutcome {
    let mut timeline = describe_ground_truth(ground_truth, ai_events, settings.tolerance_seconds);

    let downgraded: HashSet<usize> = downgraded_claims.iter().copied().collect();
    let mut extras: Vec<Event> = Vec::new();
    let mut suppressed = 0;

    for (idx, event) in ai_events.iter().enumerate() {
        if !(event.category.is_extra_eligible() || downgraded.contains(&idx)) {
            continue;
        }

        let near_ground_truth = ground_truth
            .iter()
            .any(|g| g.delta_to(event) <= settings.tolerance_seconds);
        if near_ground_truth {
            continue;
        }

        let repeat = extras.iter().any(|x| {
            x.category == event.category
                && x.team == event.team
                && x.delta_to(event) <= settings.extras_dedup_seconds
        });
        if repeat {
            debug!(
                at = %format_clock(event.abs_time_seconds),
                category = %event.category,
                "Suppressing repeated extra"
            );
            suppressed += 1;
            continue;
        }

        extras.push(event.clone());
    }

    let promoted = extras.len();
    timeline.extend(extras);
    timeline.sort_by(|a, b| {
        a.abs_time_seconds
            .total_cmp(&b.abs_time_seconds)
            .then(a.origin.tie_rank().cmp(&b.origin.tie_rank()))
    });

    FusionOutcome {
        timeline,
        extras_promoted: promoted,
        extras_suppressed: suppressed,
    }
}

/// One fused event per ground-truth event, in ground-truth order
fn describe_ground_truth(ground_truth: &[Event], ai_events: &[Event], tolerance: f64) -> Vec<Event> {
    // Group by category so each matcher call gets its own pool
    let mut by_category: BTreeMap<Category, Vec<usize>> = BTreeMap::new();
    for (idx, event) in ground_truth.iter().enumerate() {
        by_category.entry(event.category).or_default().push(idx);
    }

    let mut best: Vec<Option<&Event>> = vec![None; ground_truth.len()];

    for indices in by_category.values() {
        let reference: Vec<Event> = indices.iter().map(|&i| ground_truth[i].clone()).collect();
        let outcome = match_events(&reference, ai_events, tolerance, default_compatibility);

        for result in outcome.matched() {
            if let Some(cand_idx) = result.candidate_index {
                best[indices[result.reference_index]] = Some(&ai_events[cand_idx]);
            }
        }
    }

    ground_truth
        .iter()
        .zip(best)
        .map(|(gt, ai)| fused_event(gt, ai))
        .collect()
}

fn fused_event(gt: &Event, ai: Option<&Event>) -> Event {
    let team = match ai {
        Some(ai) if !gt.team.is_known() => ai.team,
        _ => gt.team,
    };

    let description = match ai {
        Some(ai) => ai.description.clone(),
        None if team.is_known() => format!("{} ({})", gt.category.generic_description(), team),
        None => gt.category.generic_description().to_string(),
    };

    Event {
        abs_time_seconds: gt.abs_time_seconds,
        category: gt.category,
        team,
        description,
        origin: Origin::Fused,
        validated: true,
        source_line: ai.and_then(|a| a.source_line),
    }
}

/// Check every ground-truth event appears exactly once, untouched in time
/// and category
pub fn verify_ground_truth_complete(ground_truth: &[Event], timeline: &[Event]) -> Result<(), ReconcileError> {
    let fused: Vec<&Event> = timeline.iter().filter(|e| e.origin == Origin::Fused).collect();

    if fused.len() != ground_truth.len() {
        return Err(ReconcileError::ConsistencyViolation(format!(
            "timeline holds {} ground truth events, expected {}",
            fused.len(),
            ground_truth.len()
        )));
    }

    let mut claimed = vec![false; fused.len()];
    for gt in ground_truth {
        let slot = fused.iter().enumerate().position(|(i, f)| {
            !claimed[i] && f.abs_time_seconds == gt.abs_time_seconds && f.category == gt.category
        });

        match slot {
            Some(i) => claimed[i] = true,
            None => {
                return Err(ReconcileError::ConsistencyViolation(format!(
                    "ground truth {} at {} missing from timeline",
                    gt.category,
                    format_clock(gt.abs_time_seconds)
                )))
            }
        }
    }

    Ok(())
}
