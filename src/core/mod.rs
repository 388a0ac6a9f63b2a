//! Core reconciliation logic.
//!
//! This module contains:
//! - Matcher: Greedy one-to-one temporal matching
//! - Validator: Kickoff-based goal confirmation
//! - Scorer: Precision/recall per category
//! - Fusion: Ground truth plus AI descriptions and extras
//! - Reconciler: Main execution engine

pub mod fusion;
pub mod matcher;
pub mod reconciler;
pub mod scorer;
pub mod settings;
pub mod validator;

// Re-export commonly used types
pub use fusion::{fuse, verify_ground_truth_complete, FusionOutcome, FusionSettings};
pub use matcher::{
    default_compatibility, evaluation_category, match_by_category, match_events, verify_one_to_one,
    CategoryEvaluation, MatchOutcome, MatchResult,
};
pub use reconciler::Reconciler;
pub use scorer::{score, AccuracyReport, CategoryScore};
pub use settings::ReconcileSettings;
pub use validator::{GoalState, GoalValidator, GoalVerdict};
