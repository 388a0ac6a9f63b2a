//! Precision/recall over matcher output.
//!
//! Pure aggregation: the same evaluations always give the same report.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::domain::Category;

use super::matcher::CategoryEvaluation;

/// Counts and ratios for one category (or the totals row)
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct CategoryScore {
    pub tp: usize,
    pub fp: usize,
    #[serde(rename = "fn")]
    pub fn_: usize,
    pub precision: f64,
    pub recall: f64,
}

impl CategoryScore {
    /// Build a score from raw counts; zero denominators give 0.0
    pub fn from_counts(tp: usize, fp: usize, fn_: usize) -> Self {
        Self {
            tp,
            fp,
            fn_,
            precision: ratio(tp, tp + fp),
            recall: ratio(tp, tp + fn_),
        }
    }
}

fn ratio(numerator: usize, denominator: usize) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64
    }
}

/// Per-category scores plus micro-averaged totals
///
/// Serializes flat: `{"goal": {...}, "shot": {...}, "totals": {...}}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct AccuracyReport {
    #[serde(flatten)]
    pub categories: BTreeMap<Category, CategoryScore>,

    pub totals: CategoryScore,
}

impl AccuracyReport {
    pub fn category(&self, category: Category) -> Option<&CategoryScore> {
        self.categories.get(&category)
    }

    /// Unweighted mean of per-category (precision, recall)
    pub fn macro_average(&self) -> (f64, f64) {
        if self.categories.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.categories.len() as f64;
        let precision = self.categories.values().map(|s| s.precision).sum::<f64>() / n;
        let recall = self.categories.values().map(|s| s.recall).sum::<f64>() / n;
        (precision, recall)
    }
}

/// Aggregate matcher output into an accuracy report
pub fn score(evaluations: &[CategoryEvaluation]) -> AccuracyReport {
    let mut categories = BTreeMap::new();
    let (mut tp_total, mut fp_total, mut fn_total) = (0, 0, 0);

    for evaluation in evaluations {
        let tp = evaluation.outcome.matched().count();
        let fn_ = evaluation.outcome.misses().count();
        let fp = evaluation.false_positives.len();

        tp_total += tp;
        fp_total += fp;
        fn_total += fn_;

        categories.insert(evaluation.category, CategoryScore::from_counts(tp, fp, fn_));
    }

    AccuracyReport {
        categories,
        totals: CategoryScore::from_counts(tp_total, fp_total, fn_total),
    }
}
