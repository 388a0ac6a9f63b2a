//! Kickoff-based validation of AI goal claims.
//!
//! A goal is followed by the conceding side kicking off. An AI goal claim
//! for team T is confirmed only if one of the next K commentary lines
//! reports a kickoff by T's opponent; otherwise the claim is downgraded to
//! a shot. Ground-truth goals never pass through here.
//!
//! ```text
//! Unvalidated ──kickoff by opponent within K lines──► Validated
//!      └────────window exhausted / team unknown─────► Downgraded
//! ```

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::domain::{format_clock, Category, Event, Origin, Team};
use crate::extract::{is_kickoff, CommentaryLine};

/// Default number of lines scanned after a goal claim
pub const DEFAULT_KICKOFF_WINDOW: usize = 5;

/// Validation state of a goal claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GoalState {
    Unvalidated,
    Validated,
    Downgraded,
}

impl GoalState {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GoalState::Unvalidated)
    }
}

/// Decision recorded for one AI goal claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GoalVerdict {
    /// Position in the AI event list
    pub event_index: usize,

    /// Commentary line that made the claim
    pub line_index: usize,

    pub abs_time_seconds: f64,

    pub team: Team,

    pub state: GoalState,

    /// Line whose kickoff confirmed the goal
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kickoff_line: Option<usize>,
}

/// Goal claim validator with a line-count window
#[derive(Debug, Clone, Copy)]
pub struct GoalValidator {
    window_lines: usize,
}

impl Default for GoalValidator {
    fn default() -> Self {
        Self::new(DEFAULT_KICKOFF_WINDOW)
    }
}

impl GoalValidator {
    pub fn new(window_lines: usize) -> Self {
        Self { window_lines }
    }

    pub fn window_lines(&self) -> usize {
        self.window_lines
    }

    /// Run the state machine for a claim made on `claim_line` by `team`
    ///
    /// Returns the terminal state and, when validated, the kickoff line.
    pub fn evaluate(
        &self,
        claim_line: usize,
        team: Team,
        lines: &[CommentaryLine],
    ) -> (GoalState, Option<usize>) {
        let mut state = GoalState::Unvalidated;
        let mut kickoff_line = None;

        let Some(opponent) = team.opposing() else {
            return (GoalState::Downgraded, None);
        };

        let start = claim_line.saturating_add(1);
        let end = claim_line
            .saturating_add(self.window_lines)
            .min(lines.len().saturating_sub(1));

        for line in lines.iter().take(end + 1).skip(start) {
            if is_kickoff(&line.text) && line.team == opponent {
                state = GoalState::Validated;
                kickoff_line = Some(line.index);
                break;
            }
        }

        if !state.is_terminal() {
            state = GoalState::Downgraded;
        }

        (state, kickoff_line)
    }

    /// Validate every AI goal in `events`, rewriting them in place
    ///
    /// Validated goals get `validated = true`; downgraded ones become
    /// `shot` with `validated = false`. Nothing is removed.
    pub fn validate(&self, events: &mut [Event], lines: &[CommentaryLine]) -> Vec<GoalVerdict> {
        let mut verdicts = Vec::new();

        for (event_index, event) in events.iter_mut().enumerate() {
            if event.origin != Origin::AiDetected || event.category != Category::Goal {
                continue;
            }
            let Some(line_index) = event.source_line else {
                continue;
            };

            let (state, kickoff_line) = self.evaluate(line_index, event.team, lines);

            match state {
                GoalState::Validated => {
                    event.validated = true;
                    debug!(
                        at = %format_clock(event.abs_time_seconds),
                        team = %event.team,
                        "Goal claim validated by kickoff"
                    );
                }
                GoalState::Downgraded => {
                    event.category = Category::Shot;
                    event.validated = false;
                    info!(
                        at = %format_clock(event.abs_time_seconds),
                        team = %event.team,
                        "Goal claim downgraded to shot: no opposing kickoff"
                    );
                }
                GoalState::Unvalidated => {}
            }

            verdicts.push(GoalVerdict {
                event_index,
                line_index,
                abs_time_seconds: event.abs_time_seconds,
                team: event.team,
                state,
                kickoff_line,
            });
        }

        verdicts
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::{Extractor, SegmentObservation};

    fn run(text: &str, window: usize) -> (Vec<Event>, Vec<GoalVerdict>) {
        let extraction = Extractor::default().extract(&[SegmentObservation::new(0.0, text)]);
        let mut events = extraction.events;
        let verdicts = GoalValidator::new(window).validate(&mut events, &extraction.lines);
        (events, verdicts)
    }

    #[test]
    fn test_opposing_kickoff_validates() {
        let (events, verdicts) = run("11:58 - Red team scores\n12:05 - Black kickoff", 5);
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].state, GoalState::Validated);
        assert_eq!(verdicts[0].kickoff_line, Some(1));
        assert_eq!(events[0].category, Category::Goal);
        assert!(events[0].validated);
    }

    #[test]
    fn test_play_resumes_counts_as_kickoff() {
        let (events, verdicts) = run("11:58 - Red team scores\n12:05 - Play resumes with Black", 5);
        assert_eq!(verdicts[0].state, GoalState::Validated);
        assert_eq!(verdicts[0].kickoff_line, Some(1));
        assert_eq!(events[1].category, Category::GameStart);
        assert_eq!(events[1].team, Team::Away);
    }

    #[test]
    fn test_restart_mentioning_goal_is_not_a_claim() {
        let text = "19:58 - Red shoots on goal and scores\n20:06 - Black kick off after the goal";
        let (events, verdicts) = run(text, 5);
        assert_eq!(verdicts.len(), 1);
        assert_eq!(verdicts[0].state, GoalState::Validated);
        assert_eq!(events[0].category, Category::Goal);
        assert_eq!(events[1].category, Category::GameStart);
    }

    #[test]
    fn test_same_team_kickoff_does_not_validate() {
        let (events, verdicts) = run("11:58 - Red team scores\n12:05 - Red kickoff", 5);
        assert_eq!(verdicts[0].state, GoalState::Downgraded);
        assert_eq!(events[0].category, Category::Shot);
        assert!(!events[0].validated);
    }

    #[test]
    fn test_kickoff_outside_window_downgrades() {
        let text = "10:00 - Red team scores\n\
                    10:05 - Black passes back\n\
                    10:10 - Black passes wide\n\
                    10:15 - Red tackle\n\
                    10:20 - Black kickoff";
        let (_, verdicts) = run(text, 2);
        assert_eq!(verdicts[0].state, GoalState::Downgraded);
        assert_eq!(GoalValidator::new(2).window_lines(), 2);
        assert_eq!(GoalValidator::default().window_lines(), DEFAULT_KICKOFF_WINDOW);

        let (_, verdicts) = run(text, 4);
        assert_eq!(verdicts[0].state, GoalState::Validated);
        assert_eq!(verdicts[0].kickoff_line, Some(4));
    }

    #[test]
    fn test_unknown_team_always_downgraded() {
        let (events, verdicts) = run("10:00 - What a goal!\n10:30 - Black kickoff", 5);
        assert_eq!(verdicts[0].team, Team::Unknown);
        assert_eq!(verdicts[0].state, GoalState::Downgraded);
        assert_eq!(events[0].category, Category::Shot);
    }

    #[test]
    fn test_claim_on_last_line() {
        let (_, verdicts) = run("10:00 - Black passes\n10:05 - Red team scores", 5);
        assert_eq!(verdicts[0].state, GoalState::Downgraded);
    }

    #[test]
    fn test_ground_truth_goals_skipped() {
        let mut events = vec![Event::ground_truth(10.0, Category::Goal, Team::Home, "goal".to_string())];
        let verdicts = GoalValidator::default().validate(&mut events, &[]);
        assert!(verdicts.is_empty());
        assert_eq!(events[0].category, Category::Goal);
    }

    #[test]
    fn test_deterministic() {
        let text = "10:00 - Red team scores\n10:20 - Black kickoff\n20:00 - Black scores";
        let first = run(text, 5);
        let second = run(text, 5);
        assert_eq!(first.1, second.1);
        assert_eq!(first.0, second.0);
    }
}
