//! Command-line interface for pitchline.
//!
//! Provides commands for reconciling a match, inspecting what the
//! extractor makes of a commentary file, and showing the resolved config.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;

use crate::config;
use crate::core::{GoalValidator, Reconciler, ReconcileSettings};
use crate::domain::{format_clock, ReconcileRun};
use crate::extract::{Extractor, RuleTable, SegmentObservation, TimestampConvention};
use crate::ingest::{read_json_array, JsonFileFeed};

/// pitchline - Match-event timeline reconciliation
#[derive(Parser, Debug)]
#[command(name = "pitchline")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reconcile ground truth with AI commentary for one match
    Reconcile {
        /// Ground truth JSON array file
        #[arg(short, long)]
        ground_truth: PathBuf,

        /// Commentary JSON array file (one object per segment)
        #[arg(short, long)]
        commentary: PathBuf,

        /// Write timeline.json, accuracy.json and run.json here
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Write outputs under the configured runs directory
        #[arg(long, conflicts_with = "out")]
        save: bool,

        /// How commentary timestamps relate to their segment
        #[arg(long, value_enum)]
        convention: Option<ConventionArg>,

        /// Scoring match tolerance in seconds
        #[arg(short, long)]
        tolerance: Option<f64>,

        /// Description/extras window in seconds
        #[arg(long)]
        fusion_tolerance: Option<f64>,
    },

    /// Print the events extracted from a commentary file
    Extract {
        /// Commentary JSON array file
        #[arg(short, long)]
        commentary: PathBuf,

        /// How commentary timestamps relate to their segment
        #[arg(long, value_enum)]
        convention: Option<ConventionArg>,
    },

    /// Show resolved configuration (debug)
    Config,
}

/// Timestamp convention for CLI (maps to TimestampConvention)
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum ConventionArg {
    /// Offsets from the segment start
    Relative,

    /// Whole-match clock values
    Absolute,
}

impl From<ConventionArg> for TimestampConvention {
    fn from(c: ConventionArg) -> Self {
        match c {
            ConventionArg::Relative => TimestampConvention::Relative,
            ConventionArg::Absolute => TimestampConvention::Absolute,
        }
    }
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Reconcile {
                ground_truth,
                commentary,
                out,
                save,
                convention,
                tolerance,
                fusion_tolerance,
            } => {
                let overrides = Overrides {
                    convention,
                    tolerance,
                    fusion_tolerance,
                };
                reconcile(&ground_truth, &commentary, out, save, overrides).await
            }
            Commands::Extract {
                commentary,
                convention,
            } => extract(&commentary, convention).await,
            Commands::Config => show_config().await,
        }
    }
}

/// Command-line values that take precedence over the config file
struct Overrides {
    convention: Option<ConventionArg>,
    tolerance: Option<f64>,
    fusion_tolerance: Option<f64>,
}

impl Overrides {
    fn apply(&self, mut settings: ReconcileSettings) -> Result<ReconcileSettings> {
        if let Some(convention) = self.convention {
            settings.timestamp_convention = convention.into();
        }
        if let Some(tolerance) = self.tolerance {
            settings.match_tolerance_seconds = tolerance;
        }
        if let Some(fusion_tolerance) = self.fusion_tolerance {
            settings.fusion_tolerance_seconds = fusion_tolerance;
        }
        settings.validate()?;
        Ok(settings)
    }
}

/// Reconcile one match and report the result
async fn reconcile(
    ground_truth: &Path,
    commentary: &Path,
    out: Option<PathBuf>,
    save: bool,
    overrides: Overrides,
) -> Result<()> {
    let cfg = config::config()?;
    let settings = overrides.apply(cfg.reconcile.clone())?;
    let reconciler = Reconciler::new(settings, cfg.teams.team_map()?);

    let feed = JsonFileFeed::new(ground_truth, commentary);
    let run = reconciler.reconcile_feed(&feed).await?;

    print_summary(&run);

    let out_dir = match out {
        Some(dir) => Some(dir),
        None if save => Some(cfg.runs_dir().join(run.id.to_string())),
        None => None,
    };

    if let Some(dir) = out_dir {
        write_outputs(&dir, &run)?;
        eprintln!("\n[Run {} written to {}]", run.id, dir.display());
    }

    Ok(())
}

fn print_summary(run: &ReconcileRun) {
    println!("Run ID:   {}", run.id);
    println!("Digest:   {}", run.input_digest);
    println!("Duration: {}ms", run.duration_ms());
    println!();
    println!(
        "Lines: {} parsed, {} malformed, {} discarded, {} uncategorised",
        run.metadata.parsed_lines,
        run.metadata.malformed_lines,
        run.metadata.discarded_lines,
        run.metadata.unresolved_categories
    );
    println!(
        "Goal claims: {} validated, {} downgraded",
        run.metadata.goals_validated, run.metadata.goals_downgraded
    );
    println!();
    println!("{:<10} {:>4} {:>4} {:>4} {:>10} {:>8}", "CATEGORY", "TP", "FP", "FN", "PRECISION", "RECALL");
    println!("{}", "-".repeat(45));
    for (category, s) in &run.report.categories {
        println!(
            "{:<10} {:>4} {:>4} {:>4} {:>10.3} {:>8.3}",
            category.as_str(),
            s.tp,
            s.fp,
            s.fn_,
            s.precision,
            s.recall
        );
    }
    let t = &run.report.totals;
    println!(
        "{:<10} {:>4} {:>4} {:>4} {:>10.3} {:>8.3}",
        "totals", t.tp, t.fp, t.fn_, t.precision, t.recall
    );
    println!();
    println!(
        "Timeline: {} events ({} ground truth, {} extras, {} suppressed)",
        run.timeline.len(),
        run.metadata.ground_truth_events,
        run.metadata.extras_promoted,
        run.metadata.extras_suppressed
    );
}

/// Persist the three output documents
fn write_outputs(dir: &Path, run: &ReconcileRun) -> Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create output directory: {}", dir.display()))?;

    write_json(&dir.join("timeline.json"), &run.timeline)?;
    write_json(&dir.join("accuracy.json"), &run.report)?;
    write_json(&dir.join("run.json"), &RunDocument::from(run))?;

    Ok(())
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let content = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    std::fs::write(path, content).with_context(|| format!("Failed to write {}", path.display()))
}

/// Run metadata without the timeline and report bodies
#[derive(Serialize)]
struct RunDocument<'a> {
    id: String,
    started_at: String,
    completed_at: String,
    duration_ms: i64,
    input_digest: &'a str,
    metadata: &'a crate::domain::RunMetadata,
    goal_verdicts: &'a [crate::core::GoalVerdict],
}

impl<'a> From<&'a ReconcileRun> for RunDocument<'a> {
    fn from(run: &'a ReconcileRun) -> Self {
        Self {
            id: run.id.to_string(),
            started_at: run.started_at.to_rfc3339(),
            completed_at: run.completed_at.to_rfc3339(),
            duration_ms: run.duration_ms(),
            input_digest: &run.input_digest,
            metadata: &run.metadata,
            goal_verdicts: &run.goal_verdicts,
        }
    }
}

/// Show what the extractor and goal validator make of a commentary file
async fn extract(commentary: &Path, convention: Option<ConventionArg>) -> Result<()> {
    let cfg = config::config()?;
    let convention = convention
        .map(TimestampConvention::from)
        .unwrap_or(cfg.reconcile.timestamp_convention);

    let segments: Vec<SegmentObservation> = read_json_array(commentary).await?;
    let extractor = Extractor::new(RuleTable::default(), cfg.teams.team_map()?, convention);
    let extraction = extractor
        .extract_parallel(segments, cfg.reconcile.max_workers)
        .await?;

    let mut events = extraction.events;
    let verdicts =
        GoalValidator::new(cfg.reconcile.kickoff_window_lines).validate(&mut events, &extraction.lines);

    println!(
        "{}",
        serde_json::to_string_pretty(&events).context("Failed to serialize events")?
    );

    eprintln!(
        "\n[{} events from {} segments; {} malformed, {} discarded lines]",
        events.len(),
        extraction.stats.segments,
        extraction.stats.malformed_lines,
        extraction.stats.discarded_lines
    );
    for verdict in &verdicts {
        eprintln!(
            "[goal claim at {} ({}): {:?}]",
            format_clock(verdict.abs_time_seconds),
            verdict.team,
            verdict.state
        );
    }

    Ok(())
}

/// Print the resolved configuration
async fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("pitchline configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Paths:");
    println!("  Home: {}", cfg.home.display());
    println!("  Runs: {}", cfg.runs_dir().display());
    println!();
    println!("Reconcile:");
    let r = &cfg.reconcile;
    println!("  Match tolerance:   {}s", r.match_tolerance_seconds);
    println!("  Fusion tolerance:  {}s", r.fusion_tolerance_seconds);
    println!("  Kickoff window:    {} lines", r.kickoff_window_lines);
    println!("  Extras dedup:      {}s", r.extras_dedup_seconds);
    println!("  Max workers:       {}", r.max_workers);
    println!("  Timestamps:        {:?}", r.timestamp_convention);
    let categories: Vec<&str> = r.evaluated_categories.iter().map(|c| c.as_str()).collect();
    println!("  Evaluated:         {}", categories.join(", "));
    println!();
    println!("Teams:");
    println!("  Home keywords: {}", cfg.teams.home_keywords.join(", "));
    println!("  Away keywords: {}", cfg.teams.away_keywords.join(", "));

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses_reconcile() {
        let cli = Cli::try_parse_from([
            "pitchline",
            "reconcile",
            "--ground-truth",
            "gt.json",
            "--commentary",
            "c.json",
            "--convention",
            "relative",
            "--tolerance",
            "3",
        ])
        .unwrap();

        match cli.command {
            Commands::Reconcile {
                convention,
                tolerance,
                out,
                ..
            } => {
                assert!(matches!(convention, Some(ConventionArg::Relative)));
                assert_eq!(tolerance, Some(3.0));
                assert!(out.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_out_conflicts_with_save() {
        let result = Cli::try_parse_from([
            "pitchline",
            "reconcile",
            "-g",
            "gt.json",
            "-c",
            "c.json",
            "--out",
            "dir",
            "--save",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_overrides_apply_and_validate() {
        let overrides = Overrides {
            convention: Some(ConventionArg::Relative),
            tolerance: Some(5.0),
            fusion_tolerance: None,
        };
        let settings = overrides.apply(ReconcileSettings::default()).unwrap();
        assert_eq!(settings.timestamp_convention, TimestampConvention::Relative);
        assert_eq!(settings.match_tolerance_seconds, 5.0);
        assert_eq!(settings.fusion_tolerance_seconds, 30.0);

        let bad = Overrides {
            convention: None,
            tolerance: Some(-1.0),
            fusion_tolerance: None,
        };
        assert!(bad.apply(ReconcileSettings::default()).is_err());
    }

    #[tokio::test]
    async fn test_write_outputs() {
        let temp = tempfile::TempDir::new().unwrap();
        let run = Reconciler::default()
            .reconcile(
                &[crate::ingest::GroundTruthRecord::new("goal", "12:00").with_team("home")],
                vec![SegmentObservation::new(0.0, "11:58 - Red team scores\n12:05 - Black kickoff")],
            )
            .await
            .unwrap();

        let dir = temp.path().join("out");
        write_outputs(&dir, &run).unwrap();

        let timeline: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("timeline.json")).unwrap()).unwrap();
        assert_eq!(timeline[0]["abs_time_seconds"], 720);
        assert_eq!(timeline[0]["origin"], "fused");

        let accuracy: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("accuracy.json")).unwrap()).unwrap();
        assert_eq!(accuracy["goal"]["tp"], 1);

        let meta: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(dir.join("run.json")).unwrap()).unwrap();
        assert_eq!(meta["metadata"]["goals_validated"], 1);
    }
}
