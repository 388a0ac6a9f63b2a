//! Time-window matching between a reference list and a candidate list.
//!
//! # Policy
//!
//! - **Greedy, first eligible**: references are visited in ascending time;
//!   each takes the first still-unmatched candidate (in candidate list
//!   order) that lies within the tolerance and passes the compatibility
//!   predicate. This is not nearest-in-time matching.
//! - **Consume on match**: a selected candidate leaves the pool at once, so
//!   every pairing is 1:1.
//! - **Inclusive window**: `|Δt| <= tolerance` matches.
//! - **Local pool**: each call owns its pool. Callers run one call per
//!   category rather than sharing a pool.

use serde::Serialize;

use crate::domain::{Category, Event};
use crate::error::ReconcileError;
use crate::extract::has_save_term;

/// One reference event and what (if anything) it was paired with
#[derive(Debug, Clone, Serialize)]
pub struct MatchResult {
    /// Position in the reference slice
    pub reference_index: usize,

    pub reference: Event,

    /// Position in the candidate slice
    pub candidate_index: Option<usize>,

    pub candidate: Option<Event>,

    /// `|candidate - reference|` in seconds
    pub delta_seconds: Option<f64>,
}

impl MatchResult {
    pub fn is_match(&self) -> bool {
        self.candidate_index.is_some()
    }
}

/// Output of one matcher invocation
#[derive(Debug, Clone, Default, Serialize)]
pub struct MatchOutcome {
    /// One entry per reference event, in processing (time) order
    pub results: Vec<MatchResult>,

    /// Candidate indices never selected, in original order
    pub unmatched_candidates: Vec<usize>,
}

impl MatchOutcome {
    pub fn matched(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(|r| r.is_match())
    }

    /// References nothing was paired with
    pub fn misses(&self) -> impl Iterator<Item = &MatchResult> {
        self.results.iter().filter(|r| !r.is_match())
    }
}

/// Pair references with candidates under a tolerance and a predicate
///
/// `compatible(reference, candidate)` decides category compatibility; the
/// time window is checked here.
pub fn match_events<F>(
    reference: &[Event],
    candidates: &[Event],
    tolerance_seconds: f64,
    compatible: F,
) -> MatchOutcome
where
    F: Fn(&Event, &Event) -> bool,
{
    let mut order: Vec<usize> = (0..reference.len()).collect();
    order.sort_by(|&a, &b| {
        reference[a]
            .abs_time_seconds
            .total_cmp(&reference[b].abs_time_seconds)
    });

    let mut pool: Vec<usize> = (0..candidates.len()).collect();
    let mut results = Vec::with_capacity(reference.len());

    for ref_idx in order {
        let r = &reference[ref_idx];

        let selected = pool.iter().position(|&cand_idx| {
            let c = &candidates[cand_idx];
            c.delta_to(r) <= tolerance_seconds && compatible(r, c)
        });

        let result = match selected {
            Some(pos) => {
                let cand_idx = pool.remove(pos);
                let c = &candidates[cand_idx];
                MatchResult {
                    reference_index: ref_idx,
                    reference: r.clone(),
                    candidate_index: Some(cand_idx),
                    candidate: Some(c.clone()),
                    delta_seconds: Some(c.delta_to(r)),
                }
            }
            None => MatchResult {
                reference_index: ref_idx,
                reference: r.clone(),
                candidate_index: None,
                candidate: None,
                delta_seconds: None,
            },
        };

        results.push(result);
    }

    MatchOutcome {
        results,
        unmatched_candidates: pool,
    }
}

/// Category a candidate counts toward when scoring
///
/// A shot whose description mentions a save is evidence of a save.
pub fn evaluation_category(candidate: &Event) -> Category {
    match candidate.category {
        Category::Shot if has_save_term(&candidate.description) => Category::Save,
        other => other,
    }
}

/// Default category compatibility between a reference and a candidate
///
/// - goal ↔ goal
/// - shot ↔ shot without a save term
/// - save ↔ save, or shot with a save term
/// - anything else only with itself
pub fn default_compatibility(reference: &Event, candidate: &Event) -> bool {
    match reference.category {
        Category::Goal => candidate.category == Category::Goal,
        Category::Shot => {
            candidate.category == Category::Shot && !has_save_term(&candidate.description)
        }
        Category::Save => {
            candidate.category == Category::Save
                || (candidate.category == Category::Shot && has_save_term(&candidate.description))
        }
        other => candidate.category == other,
    }
}

/// Check that no reference or candidate was used twice
pub fn verify_one_to_one(outcome: &MatchOutcome, candidate_count: usize) -> Result<(), ReconcileError> {
    let mut reference_seen = vec![false; outcome.results.len()];
    let mut candidate_seen = vec![false; candidate_count];

    for result in &outcome.results {
        match reference_seen.get_mut(result.reference_index) {
            Some(seen) if !*seen => *seen = true,
            _ => {
                return Err(ReconcileError::ConsistencyViolation(format!(
                    "reference {} matched more than once",
                    result.reference_index
                )))
            }
        }

        if let Some(cand_idx) = result.candidate_index {
            match candidate_seen.get_mut(cand_idx) {
                Some(seen) if !*seen => *seen = true,
                _ => {
                    return Err(ReconcileError::ConsistencyViolation(format!(
                        "candidate {} matched more than once",
                        cand_idx
                    )))
                }
            }
        }
    }

    for &cand_idx in &outcome.unmatched_candidates {
        if candidate_seen.get(cand_idx).copied().unwrap_or(true) {
            return Err(ReconcileError::ConsistencyViolation(format!(
                "candidate {} is both matched and unmatched",
                cand_idx
            )));
        }
    }

    Ok(())
}

/// Matcher output for one evaluated category
#[derive(Debug, Clone, Serialize)]
pub struct CategoryEvaluation {
    pub category: Category,

    pub outcome: MatchOutcome,

    /// Unmatched candidates whose evaluation category is this one
    pub false_positives: Vec<usize>,
}

/// Run the matcher once per category, each with its own candidate pool
pub fn match_by_category(
    ground_truth: &[Event],
    ai_events: &[Event],
    categories: &[Category],
    tolerance_seconds: f64,
) -> Vec<CategoryEvaluation> {
    categories
        .iter()
        .map(|&category| {
            let reference: Vec<Event> = ground_truth
                .iter()
                .filter(|e| e.category == category)
                .cloned()
                .collect();

            let outcome = match_events(&reference, ai_events, tolerance_seconds, default_compatibility);

            let false_positives = outcome
                .unmatched_candidates
                .iter()
                .copied()
                .filter(|&idx| evaluation_category(&ai_events[idx]) == category)
                .collect();

            CategoryEvaluation {
                category,
                outcome,
                false_positives,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Team;

    fn gt(time: f64, category: Category) -> Event {
        Event::ground_truth(time, category, Team::Unknown, category.to_string())
    }

    fn ai(time: f64, category: Category, text: &str) -> Event {
        Event::ai_detected(time, category, Team::Unknown, text.to_string(), 0)
    }

    fn any_category(_: &Event, _: &Event) -> bool {
        true
    }

    #[test]
    fn test_first_eligible_not_nearest() {
        let reference = vec![gt(100.0, Category::Goal)];
        let candidates = vec![
            ai(104.0, Category::Goal, "far"),
            ai(100.5, Category::Goal, "near"),
        ];

        let outcome = match_events(&reference, &candidates, 5.0, default_compatibility);
        assert_eq!(outcome.results[0].candidate_index, Some(0));
        assert_eq!(outcome.results[0].delta_seconds, Some(4.0));
        assert_eq!(outcome.unmatched_candidates, vec![1]);
    }

    #[test]
    fn test_boundary_inclusive() {
        let reference = vec![gt(100.0, Category::Goal)];

        let at_edge = vec![ai(102.0, Category::Goal, "edge")];
        let outcome = match_events(&reference, &at_edge, 2.0, default_compatibility);
        assert!(outcome.results[0].is_match());

        let past_edge = vec![ai(102.001, Category::Goal, "past")];
        let outcome = match_events(&reference, &past_edge, 2.0, default_compatibility);
        assert!(!outcome.results[0].is_match());
    }

    #[test]
    fn test_references_processed_in_time_order() {
        let reference = vec![gt(20.0, Category::Goal), gt(10.0, Category::Goal)];
        let candidates = vec![ai(15.0, Category::Goal, "between")];

        let outcome = match_events(&reference, &candidates, 5.0, default_compatibility);
        // The earlier reference (index 1) claims the shared candidate
        assert_eq!(outcome.results[0].reference_index, 1);
        assert_eq!(outcome.results[0].candidate_index, Some(0));
        assert!(!outcome.results[1].is_match());
    }

    #[test]
    fn test_empty_candidates() {
        let reference = vec![gt(1.0, Category::Goal), gt(2.0, Category::Goal)];
        let outcome = match_events(&reference, &[], 5.0, any_category);
        assert_eq!(outcome.misses().count(), 2);
        assert!(outcome.unmatched_candidates.is_empty());
    }

    #[test]
    fn test_empty_reference() {
        let candidates = vec![ai(1.0, Category::Goal, "a"), ai(2.0, Category::Shot, "b")];
        let outcome = match_events(&[], &candidates, 5.0, any_category);
        assert!(outcome.results.is_empty());
        assert_eq!(outcome.unmatched_candidates, vec![0, 1]);
    }

    #[test]
    fn test_default_compatibility() {
        let shot_ref = gt(0.0, Category::Shot);
        let save_ref = gt(0.0, Category::Save);
        let goal_ref = gt(0.0, Category::Goal);

        let plain_shot = ai(0.0, Category::Shot, "Red player shoots wide");
        let saved_shot = ai(0.0, Category::Shot, "Red shot, saved low");
        let save = ai(0.0, Category::Save, "Great save");
        let goal = ai(0.0, Category::Goal, "Red scores");

        assert!(default_compatibility(&shot_ref, &plain_shot));
        assert!(!default_compatibility(&shot_ref, &saved_shot));
        assert!(default_compatibility(&save_ref, &saved_shot));
        assert!(default_compatibility(&save_ref, &save));
        assert!(!default_compatibility(&save_ref, &plain_shot));
        assert!(default_compatibility(&goal_ref, &goal));
        assert!(!default_compatibility(&goal_ref, &plain_shot));
        assert!(default_compatibility(&gt(0.0, Category::Corner), &ai(0.0, Category::Corner, "c")));
        assert!(!default_compatibility(&gt(0.0, Category::Corner), &ai(0.0, Category::Foul, "f")));
    }

    #[test]
    fn test_evaluation_category() {
        assert_eq!(
            evaluation_category(&ai(0.0, Category::Shot, "shot saved")),
            Category::Save
        );
        assert_eq!(evaluation_category(&ai(0.0, Category::Shot, "shot wide")), Category::Shot);
        assert_eq!(evaluation_category(&ai(0.0, Category::Goal, "goal")), Category::Goal);
    }

    #[test]
    fn test_pools_are_independent_per_category() {
        let ground_truth = vec![gt(10.0, Category::Goal), gt(10.0, Category::Shot)];
        let ai_events = vec![ai(10.0, Category::Goal, "goal"), ai(11.0, Category::Shot, "shot")];

        let evaluations = match_by_category(
            &ground_truth,
            &ai_events,
            &[Category::Goal, Category::Shot, Category::Save],
            2.0,
        );

        assert_eq!(evaluations[0].outcome.results[0].candidate_index, Some(0));
        assert_eq!(evaluations[1].outcome.results[0].candidate_index, Some(1));
        assert!(evaluations.iter().all(|e| e.false_positives.is_empty()));
        assert!(evaluations[2].outcome.results.is_empty());
    }

    #[test]
    fn test_false_positives_filtered_by_category() {
        let ai_events = vec![
            ai(10.0, Category::Goal, "goal"),
            ai(20.0, Category::Corner, "corner"),
            ai(30.0, Category::Shot, "shot saved"),
        ];
        let evaluations = match_by_category(&[], &ai_events, &[Category::Goal, Category::Save], 2.0);

        assert_eq!(evaluations[0].false_positives, vec![0]);
        assert_eq!(evaluations[1].false_positives, vec![2]);
    }

    #[test]
    fn test_verify_one_to_one() {
        let reference = vec![gt(1.0, Category::Goal), gt(2.0, Category::Goal)];
        let candidates = vec![ai(1.0, Category::Goal, "a"), ai(2.0, Category::Goal, "b")];
        let mut outcome = match_events(&reference, &candidates, 5.0, default_compatibility);
        assert!(verify_one_to_one(&outcome, candidates.len()).is_ok());

        outcome.results[1].candidate_index = outcome.results[0].candidate_index;
        assert!(matches!(
            verify_one_to_one(&outcome, candidates.len()),
            Err(ReconcileError::ConsistencyViolation(_))
        ));
    }
}
