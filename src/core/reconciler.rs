//! Main reconciliation engine.
//!
//! Drives one match through every stage, in order:
//!
//! ```text
//! ground truth ──► load ─────────────────────────────┐
//! commentary ──► extract ──► validate goals ──► match ──► score
//!                                          └──────────► fuse ──► verify
//! ```
//!
//! Each call owns its state; nothing is shared between runs.

use chrono::Utc;
use sha2::{Digest, Sha256};
use tracing::{error, info, instrument};
use uuid::Uuid;

use crate::domain::{ReconcileRun, RunMetadata, TimelineEntry};
use crate::error::ReconcileError;
use crate::extract::{Extractor, RuleTable, SegmentObservation, TeamMap};
use crate::ingest::{load_ground_truth, GroundTruthRecord, MatchFeed};

use super::fusion::{fuse, verify_ground_truth_complete, FusionSettings};
use super::matcher::{match_by_category, verify_one_to_one};
use super::scorer::score;
use super::settings::ReconcileSettings;
use super::validator::{GoalState, GoalValidator};

/// Reconciles ground truth with AI commentary for one match at a time
#[derive(Debug, Clone)]
pub struct Reconciler {
    settings: ReconcileSettings,
    extractor: Extractor,
}

impl Default for Reconciler {
    fn default() -> Self {
        Self::new(ReconcileSettings::default(), TeamMap::default())
    }
}

impl Reconciler {
    pub fn new(settings: ReconcileSettings, teams: TeamMap) -> Self {
        let extractor = Extractor::new(RuleTable::default(), teams, settings.timestamp_convention);
        Self { settings, extractor }
    }

    pub fn settings(&self) -> &ReconcileSettings {
        &self.settings
    }

    pub fn extractor(&self) -> &Extractor {
        &self.extractor
    }

    /// Run the full reconciliation for one match
    #[instrument(skip_all, fields(records = ground_truth.len(), segments = commentary.len()))]
    pub async fn reconcile(
        &self,
        ground_truth: &[GroundTruthRecord],
        commentary: Vec<SegmentObservation>,
    ) -> Result<ReconcileRun, ReconcileError> {
        let id = Uuid::new_v4();
        let started_at = Utc::now();
        info!(%id, "Starting reconciliation");

        if commentary.is_empty() {
            return Err(ReconcileError::MissingInput("commentary"));
        }

        let input_digest = digest_inputs(ground_truth, &commentary);
        let gt_events = load_ground_truth(ground_truth, self.extractor.teams())?;

        let extraction = self
            .extractor
            .extract_parallel(commentary, self.settings.max_workers)
            .await?;
        let mut ai_events = extraction.events;

        let verdicts =
            GoalValidator::new(self.settings.kickoff_window_lines).validate(&mut ai_events, &extraction.lines);
        let downgraded: Vec<usize> = verdicts
            .iter()
            .filter(|v| v.state == GoalState::Downgraded)
            .map(|v| v.event_index)
            .collect();

        let evaluations = match_by_category(
            &gt_events,
            &ai_events,
            &self.settings.evaluated_categories,
            self.settings.match_tolerance_seconds,
        );
        for evaluation in &evaluations {
            if let Err(e) = verify_one_to_one(&evaluation.outcome, ai_events.len()) {
                error!(category = %evaluation.category, error = %e, "Matcher broke one-to-one");
                return Err(e);
            }
        }
        let report = score(&evaluations);

        let fusion = fuse(
            &gt_events,
            &ai_events,
            &downgraded,
            &FusionSettings {
                tolerance_seconds: self.settings.fusion_tolerance_seconds,
                extras_dedup_seconds: self.settings.extras_dedup_seconds,
            },
        );
        if let Err(e) = verify_ground_truth_complete(&gt_events, &fusion.timeline) {
            error!(error = %e, "Fused timeline lost ground truth");
            return Err(e);
        }

        let metadata = RunMetadata {
            segments: extraction.stats.segments,
            ground_truth_events: gt_events.len(),
            parsed_lines: extraction.stats.parsed_lines,
            malformed_lines: extraction.stats.malformed_lines,
            discarded_lines: extraction.stats.discarded_lines,
            unresolved_categories: extraction.stats.unresolved_categories,
            goals_validated: verdicts.len() - downgraded.len(),
            goals_downgraded: downgraded.len(),
            extras_promoted: fusion.extras_promoted,
            extras_suppressed: fusion.extras_suppressed,
        };

        let (macro_precision, macro_recall) = report.macro_average();
        info!(
            %id,
            timeline = fusion.timeline.len(),
            extras = metadata.extras_promoted,
            downgraded = metadata.goals_downgraded,
            precision = report.totals.precision,
            recall = report.totals.recall,
            macro_precision,
            macro_recall,
            "Reconciliation complete"
        );

        Ok(ReconcileRun {
            id,
            started_at,
            completed_at: Utc::now(),
            input_digest,
            metadata,
            goal_verdicts: verdicts,
            report,
            timeline: fusion.timeline.iter().map(TimelineEntry::from).collect(),
        })
    }

    /// Pull both inputs from a feed and reconcile them
    pub async fn reconcile_feed(&self, feed: &dyn MatchFeed) -> anyhow::Result<ReconcileRun> {
        info!(feed = feed.name(), "Reading match feed");
        let ground_truth = feed.ground_truth().await?;
        let commentary = feed.commentary().await?;
        Ok(self.reconcile(&ground_truth, commentary).await?)
    }
}

/// sha256 over the JSON form of both inputs
fn digest_inputs(ground_truth: &[GroundTruthRecord], commentary: &[SegmentObservation]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(serde_json::to_vec(ground_truth).unwrap_or_default());
    hasher.update(serde_json::to_vec(commentary).unwrap_or_default());
    format!("sha256:{}", hex::encode(hasher.finalize()))
}
