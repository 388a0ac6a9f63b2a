//! Ordered classification rules for commentary lines.
//!
//! The rule table is data, not control flow: each entry pairs a category
//! with a pattern, optional ignored phrases and an optional veto. Rules are
//! tried in table order and the first hit wins, so "shot ... saved" lands
//! on `save` because the save rule sits above the shot rule.

use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::domain::{Category, Team};

/// Restart phrases shared by the kickoff check and the game_start rule
macro_rules! restart_terms {
    () => {
        r"kick[- ]?off|kicks off|restart(s|ed)?|play resumes"
    };
}

/// One built-in rule: category, pattern, ignored spans, line veto
type RuleSpec = (Category, &'static str, Option<&'static str>, Option<&'static str>);

/// Precedence order of the built-in football rules
const FOOTBALL_RULES: &[RuleSpec] = &[
    (
        Category::Goal,
        r"\b(goal|goals|scores?|scored|scoring|finds the net|into the net|back of the net)\b",
        Some(concat!(
            r"\b(goal[- ]?kicks?|goal line|on goal|at goal|towards goal|wide of (the )?goal|over the goal",
            r"|(after|following|since) ([\w']+ ){0,2}(goal|goals|scores?|scored))\b",
        )),
        Some(r"\b(no goal|disallowed|ruled out|chalked off)\b"),
    ),
    (
        Category::Save,
        r"\b(save|saves|saved|saving|parr(y|ies|ied)|tips? (it )?(over|wide|round)|keeper (catches|collects|claims|blocks)|denied by)\b",
        None,
        None,
    ),
    (
        Category::Shot,
        r"\b(shot|shots|shoots?|shooting|strike|strikes|struck|effort|header|volley|attempt|fires?|curls?)\b",
        None,
        None,
    ),
    (Category::Penalty, r"\b(penalty|penalties|spot[- ]kick)\b", None, None),
    (
        Category::Card,
        r"\b((second )?yellow cards?|red cards?|booked|booking|cautioned|sent off)\b",
        None,
        None,
    ),
    (
        Category::Foul,
        r"\b(foul|fouls|fouled|trips?|tripped|handball|hand ball|shirt pull)\b",
        None,
        None,
    ),
    (Category::Corner, r"\b(corner|corners|corner kick)\b", None, None),
    (Category::FreeKick, r"\bfree[- ]?kicks?\b", None, None),
    (
        Category::Substitution,
        r"\b(substitut\w*|subbed (on|off)|comes? on for|replaced by)\b",
        None,
        None,
    ),
    (
        Category::Tackle,
        r"\b(tackle|tackles|tackled|tackling|challenges?|challenged)\b",
        None,
        None,
    ),
    (
        Category::Pass,
        r"\b(pass|passes|passed|passing|cross|crosses|crossed|through ball|long ball)\b",
        None,
        None,
    ),
    (
        Category::Turnover,
        r"\b(turnover|intercept\w*|loses? (the )?(ball|possession)|lost possession|dispossess\w*)\b",
        None,
        None,
    ),
    (
        Category::GameStart,
        concat!(r"\b(", restart_terms!(), r"|(match|game|half) (starts|begins|underway)|second half)\b"),
        None,
        None,
    ),
    (
        Category::RefereeAction,
        r"\b(referee|whistle|offside|var|stoppage|injury|added time)\b",
        None,
        None,
    ),
    (
        Category::GeneralPlay,
        r"\b(possession|build[- ]?up|dribbl\w*|midfield|attack\w*|counter[- ]?attack|press(es|ing)?|clearance|clears?|throw[- ]?in)\b",
        None,
        None,
    ),
];

static FOOTBALL_TABLE: Lazy<RuleTable> = Lazy::new(|| {
    let rules = FOOTBALL_RULES
        .iter()
        .map(|(category, pattern, ignore, veto)| {
            let rule = CategoryRule::new(*category, pattern, *ignore)?;
            match veto {
                Some(veto) => rule.with_veto(veto),
                None => Ok(rule),
            }
        })
        .collect::<Result<_, regex::Error>>()
        .expect("built-in rule pattern");
    RuleTable { rules }
});

static SAVE_TERMS: Lazy<Regex> = Lazy::new(|| {
    case_insensitive(r"\b(save|saves|saved|saving|parr(y|ies|ied)|tipped|denied by)\b")
        .expect("save pattern")
});

static KICKOFF: Lazy<Regex> = Lazy::new(|| {
    case_insensitive(concat!(r"\b(", restart_terms!(), r")\b"))
        .expect("kickoff pattern")
});

static CARD_PHRASES: Lazy<Regex> =
    Lazy::new(|| case_insensitive(r"\b(red|yellow)\s+cards?\b").expect("card phrase pattern"));

fn case_insensitive(pattern: &str) -> Result<Regex, regex::Error> {
    RegexBuilder::new(pattern).case_insensitive(true).build()
}

/// Does the text carry a goalkeeper-save term?
pub fn has_save_term(text: &str) -> bool {
    SAVE_TERMS.is_match(text)
}

/// Does the text describe a kickoff or restart?
pub fn is_kickoff(text: &str) -> bool {
    KICKOFF.is_match(text)
}

/// One row of the rule table
///
/// `ignore` phrases are blanked out before `pattern` is tested, so "shoots
/// on goal and scores" still finds "scores". A `veto` match rejects the
/// whole line.
#[derive(Debug, Clone)]
pub struct CategoryRule {
    pub category: Category,
    pattern: Regex,
    ignore: Option<Regex>,
    veto: Option<Regex>,
}

impl CategoryRule {
    pub fn new(category: Category, pattern: &str, ignore: Option<&str>) -> Result<Self, regex::Error> {
        Ok(Self {
            category,
            pattern: case_insensitive(pattern)?,
            ignore: ignore.map(case_insensitive).transpose()?,
            veto: None,
        })
    }

    /// Reject any line matching `veto`, wherever the pattern hits
    pub fn with_veto(mut self, veto: &str) -> Result<Self, regex::Error> {
        self.veto = Some(case_insensitive(veto)?);
        Ok(self)
    }

    pub fn matches(&self, text: &str) -> bool {
        if self.veto.as_ref().is_some_and(|v| v.is_match(text)) {
            return false;
        }
        match &self.ignore {
            Some(ignore) => self.pattern.is_match(&ignore.replace_all(text, " ")),
            None => self.pattern.is_match(text),
        }
    }
}

/// Ordered rule table; first matching rule decides the category
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<CategoryRule>,
}

impl Default for RuleTable {
    fn default() -> Self {
        FOOTBALL_TABLE.clone()
    }
}

impl RuleTable {
    /// Build a table from explicit rules, kept in the given order
    pub fn new(rules: Vec<CategoryRule>) -> Self {
        Self { rules }
    }

    /// First category whose rule matches, or `None` when nothing does
    pub fn classify(&self, text: &str) -> Option<Category> {
        self.rules
            .iter()
            .find(|rule| rule.matches(text))
            .map(|rule| rule.category)
    }

    /// Categories in precedence order
    pub fn precedence(&self) -> Vec<Category> {
        self.rules.iter().map(|r| r.category).collect()
    }
}

/// Closed keyword map from text mentions to teams
#[derive(Debug, Clone)]
pub struct TeamMap {
    home: Option<Regex>,
    away: Option<Regex>,
}

impl Default for TeamMap {
    fn default() -> Self {
        Self::from_keywords(
            &["red".to_string(), "home".to_string()],
            &["black".to_string(), "away".to_string()],
        )
        .expect("default team keywords")
    }
}

impl TeamMap {
    /// Build the map from keyword lists; keywords are matched as whole words
    pub fn from_keywords(home: &[String], away: &[String]) -> Result<Self, regex::Error> {
        Ok(Self {
            home: keyword_regex(home)?,
            away: keyword_regex(away)?,
        })
    }

    /// Team mentioned earliest in the text, ignoring card colours
    pub fn attribute(&self, text: &str) -> Team {
        let cleaned = CARD_PHRASES.replace_all(text, " ");

        let first = |re: &Option<Regex>| re.as_ref().and_then(|r| r.find(&cleaned)).map(|m| m.start());

        match (first(&self.home), first(&self.away)) {
            (Some(h), Some(a)) if h <= a => Team::Home,
            (Some(_), Some(_)) => Team::Away,
            (Some(_), None) => Team::Home,
            (None, Some(_)) => Team::Away,
            (None, None) => Team::Unknown,
        }
    }
}

fn keyword_regex(keywords: &[String]) -> Result<Option<Regex>, regex::Error> {
    let alternatives: Vec<String> = keywords
        .iter()
        .map(|k| k.trim())
        .filter(|k| !k.is_empty())
        .map(regex::escape)
        .collect();

    if alternatives.is_empty() {
        return Ok(None);
    }

    case_insensitive(&format!(r"\b(?:{})\b", alternatives.join("|"))).map(Some)
}
