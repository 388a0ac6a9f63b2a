//! Match event types shared by every stage of reconciliation.
//!
//! Categories, teams and origins are closed enums parsed once at the input
//! boundary; everything downstream matches on them exhaustively.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Closed set of match event categories
///
/// Declaration order is also the serialization order of report keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Goal,
    Shot,
    Save,
    Foul,
    Card,
    Corner,
    FreeKick,
    Penalty,
    Substitution,
    Tackle,
    Pass,
    Turnover,
    RefereeAction,
    GameStart,
    GeneralPlay,
    Other,
}

impl Category {
    /// Every category, in declaration order
    pub const ALL: [Category; 16] = [
        Category::Goal,
        Category::Shot,
        Category::Save,
        Category::Foul,
        Category::Card,
        Category::Corner,
        Category::FreeKick,
        Category::Penalty,
        Category::Substitution,
        Category::Tackle,
        Category::Pass,
        Category::Turnover,
        Category::RefereeAction,
        Category::GameStart,
        Category::GeneralPlay,
        Category::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Goal => "goal",
            Category::Shot => "shot",
            Category::Save => "save",
            Category::Foul => "foul",
            Category::Card => "card",
            Category::Corner => "corner",
            Category::FreeKick => "free_kick",
            Category::Penalty => "penalty",
            Category::Substitution => "substitution",
            Category::Tackle => "tackle",
            Category::Pass => "pass",
            Category::Turnover => "turnover",
            Category::RefereeAction => "referee_action",
            Category::GameStart => "game_start",
            Category::GeneralPlay => "general_play",
            Category::Other => "other",
        }
    }

    /// Categories unambiguous enough to be added to a fused timeline
    /// without ground-truth backing
    pub fn is_extra_eligible(&self) -> bool {
        matches!(
            self,
            Category::Foul
                | Category::Card
                | Category::Corner
                | Category::Substitution
                | Category::Penalty
        )
    }

    /// Fallback description used when no AI observation backs an event
    pub fn generic_description(&self) -> &'static str {
        match self {
            Category::Goal => "Goal scored",
            Category::Shot => "Shot attempt",
            Category::Save => "Save by the goalkeeper",
            Category::Foul => "Foul committed",
            Category::Card => "Card shown",
            Category::Corner => "Corner kick",
            Category::FreeKick => "Free kick awarded",
            Category::Penalty => "Penalty awarded",
            Category::Substitution => "Substitution",
            Category::Tackle => "Tackle",
            Category::Pass => "Pass",
            Category::Turnover => "Change of possession",
            Category::RefereeAction => "Referee decision",
            Category::GameStart => "Kickoff",
            Category::GeneralPlay => "General play",
            Category::Other => "Match event",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Category {
    type Err = anyhow::Error;

    /// Parse a feed label, accepting the common spellings ground-truth
    /// providers use
    fn from_str(s: &str) -> anyhow::Result<Self> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .map(|c| if c == ' ' || c == '-' { '_' } else { c })
            .collect();

        let category = match key.as_str() {
            "goal" | "goals" => Category::Goal,
            "shot" | "shots" | "shot_on_target" | "shot_off_target" => Category::Shot,
            "save" | "saves" => Category::Save,
            "foul" | "fouls" => Category::Foul,
            "card" | "yellow_card" | "red_card" | "booking" => Category::Card,
            "corner" | "corner_kick" => Category::Corner,
            "free_kick" | "freekick" => Category::FreeKick,
            "penalty" | "penalty_kick" => Category::Penalty,
            "substitution" | "sub" => Category::Substitution,
            "tackle" => Category::Tackle,
            "pass" => Category::Pass,
            "turnover" | "interception" => Category::Turnover,
            "referee_action" | "referee" | "offside" => Category::RefereeAction,
            "game_start" | "kickoff" | "kick_off" | "start" => Category::GameStart,
            "general_play" | "play" => Category::GeneralPlay,
            "other" => Category::Other,
            _ => anyhow::bail!("Unknown event category: {}", s),
        };

        Ok(category)
    }
}

/// Team attribution for an event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Team {
    Home,
    Away,
    #[default]
    Unknown,
}

impl Team {
    /// The other side; `Unknown` has no opponent
    pub fn opposing(&self) -> Option<Team> {
        match self {
            Team::Home => Some(Team::Away),
            Team::Away => Some(Team::Home),
            Team::Unknown => None,
        }
    }

    pub fn is_known(&self) -> bool {
        !matches!(self, Team::Unknown)
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Team::Home => write!(f, "home"),
            Team::Away => write!(f, "away"),
            Team::Unknown => write!(f, "unknown"),
        }
    }
}

/// Where an event came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// Authoritative feed
    GroundTruth,
    /// Parsed from AI commentary
    AiDetected,
    /// Ground-truth timing with an AI description
    Fused,
}

impl Origin {
    /// Sort rank for timestamp ties: anything carrying ground truth first
    pub fn tie_rank(&self) -> u8 {
        match self {
            Origin::GroundTruth | Origin::Fused => 0,
            Origin::AiDetected => 1,
        }
    }
}

/// A single match occurrence
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    /// Seconds since the start of the match
    pub abs_time_seconds: f64,

    pub category: Category,

    pub team: Team,

    /// Free-text description (AI line text or feed label)
    pub description: String,

    pub origin: Origin,

    /// True for ground truth and for AI goals confirmed by kickoff evidence
    pub validated: bool,

    /// Index into the run's commentary lines (AI events only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_line: Option<usize>,
}

impl Event {
    /// Create an authoritative event
    pub fn ground_truth(
        abs_time_seconds: f64,
        category: Category,
        team: Team,
        description: String,
    ) -> Self {
        Self {
            abs_time_seconds,
            category,
            team,
            description,
            origin: Origin::GroundTruth,
            validated: true,
            source_line: None,
        }
    }

    /// Create an event parsed from a commentary line
    pub fn ai_detected(
        abs_time_seconds: f64,
        category: Category,
        team: Team,
        description: String,
        source_line: usize,
    ) -> Self {
        Self {
            abs_time_seconds,
            category,
            team,
            description,
            origin: Origin::AiDetected,
            validated: false,
            source_line: Some(source_line),
        }
    }

    pub fn is_ground_truth(&self) -> bool {
        self.origin == Origin::GroundTruth
    }

    /// Absolute time distance to another event
    pub fn delta_to(&self, other: &Event) -> f64 {
        (self.abs_time_seconds - other.abs_time_seconds).abs()
    }
}

/// One row of the fused timeline as written to consumers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEntry {
    pub abs_time_seconds: i64,
    pub category: Category,
    pub team: Team,
    pub description: String,
    pub origin: Origin,
    pub validated: bool,
}

impl From<&Event> for TimelineEntry {
    fn from(event: &Event) -> Self {
        Self {
            abs_time_seconds: event.abs_time_seconds.round() as i64,
            category: event.category,
            team: event.team,
            description: event.description.clone(),
            origin: event.origin,
            validated: event.validated,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_aliases() {
        assert_eq!("Goal".parse::<Category>().unwrap(), Category::Goal);
        assert_eq!("free kick".parse::<Category>().unwrap(), Category::FreeKick);
        assert_eq!("Yellow-Card".parse::<Category>().unwrap(), Category::Card);
        assert_eq!("kick off".parse::<Category>().unwrap(), Category::GameStart);
        assert!("bicycle".parse::<Category>().is_err());
    }

    #[test]
    fn test_category_serializes_snake_case() {
        let json = serde_json::to_string(&Category::FreeKick).unwrap();
        assert_eq!(json, "\"free_kick\"");
        for category in Category::ALL {
            let json = serde_json::to_string(&category).unwrap();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn test_team_opposing() {
        assert_eq!(Team::Home.opposing(), Some(Team::Away));
        assert_eq!(Team::Away.opposing(), Some(Team::Home));
        assert_eq!(Team::Unknown.opposing(), None);
        assert_eq!(Team::default(), Team::Unknown);
    }

    #[test]
    fn test_extra_eligible_set() {
        let eligible: Vec<Category> = Category::ALL
            .into_iter()
            .filter(|c| c.is_extra_eligible())
            .collect();
        assert_eq!(
            eligible,
            vec![
                Category::Foul,
                Category::Card,
                Category::Corner,
                Category::Penalty,
                Category::Substitution
            ]
        );
    }

    #[test]
    fn test_timeline_entry_rounds_time() {
        let event = Event::ground_truth(720.4, Category::Goal, Team::Home, "goal".to_string());
        let entry = TimelineEntry::from(&event);
        assert_eq!(entry.abs_time_seconds, 720);
        assert!(entry.validated);
    }
}
