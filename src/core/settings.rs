//! Tunable parameters for a reconciliation run.

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::domain::Category;
use crate::extract::TimestampConvention;

use super::fusion::{DEFAULT_EXTRAS_DEDUP, DEFAULT_FUSION_TOLERANCE};
use super::validator::DEFAULT_KICKOFF_WINDOW;

/// Parameters for one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconcileSettings {
    /// Scoring match window in seconds (default: 2.0)
    #[serde(default = "default_match_tolerance")]
    pub match_tolerance_seconds: f64,

    /// Description/extras window in seconds (default: 30.0)
    #[serde(default = "default_fusion_tolerance")]
    pub fusion_tolerance_seconds: f64,

    /// Lines scanned after a goal claim for a kickoff (default: 5)
    #[serde(default = "default_kickoff_window")]
    pub kickoff_window_lines: usize,

    /// Concurrent extraction workers (default: 30)
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    /// Repeat-suppression window for extras (default: 10.0)
    #[serde(default = "default_extras_dedup")]
    pub extras_dedup_seconds: f64,

    /// Categories scored against ground truth (default: goal, shot, save)
    #[serde(default = "default_evaluated_categories")]
    pub evaluated_categories: Vec<Category>,

    #[serde(default)]
    pub timestamp_convention: TimestampConvention,
}

fn default_match_tolerance() -> f64 {
    2.0
}
fn default_fusion_tolerance() -> f64 {
    DEFAULT_FUSION_TOLERANCE
}
fn default_kickoff_window() -> usize {
    DEFAULT_KICKOFF_WINDOW
}
fn default_max_workers() -> usize {
    30
}
fn default_extras_dedup() -> f64 {
    DEFAULT_EXTRAS_DEDUP
}
fn default_evaluated_categories() -> Vec<Category> {
    vec![Category::Goal, Category::Shot, Category::Save]
}

impl Default for ReconcileSettings {
    fn default() -> Self {
        Self {
            match_tolerance_seconds: default_match_tolerance(),
            fusion_tolerance_seconds: default_fusion_tolerance(),
            kickoff_window_lines: default_kickoff_window(),
            max_workers: default_max_workers(),
            extras_dedup_seconds: default_extras_dedup(),
            evaluated_categories: default_evaluated_categories(),
            timestamp_convention: TimestampConvention::default(),
        }
    }
}

impl ReconcileSettings {
    /// Reject settings a run could not honour
    pub fn validate(&self) -> Result<()> {
        for (name, value) in [
            ("match_tolerance_seconds", self.match_tolerance_seconds),
            ("fusion_tolerance_seconds", self.fusion_tolerance_seconds),
            ("extras_dedup_seconds", self.extras_dedup_seconds),
        ] {
            if !value.is_finite() || value < 0.0 {
                anyhow::bail!("{} must be a non-negative number, got {}", name, value);
            }
        }

        if self.max_workers == 0 {
            anyhow::bail!("max_workers must be at least 1");
        }

        if self.evaluated_categories.is_empty() {
            anyhow::bail!("evaluated_categories cannot be empty");
        }

        let mut seen = Vec::new();
        for category in &self.evaluated_categories {
            if seen.contains(category) {
                anyhow::bail!("evaluated_categories lists {} twice", category);
            }
            seen.push(*category);
        }

        Ok(())
    }
}
