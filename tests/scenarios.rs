//! Reconciliation Scenario Tests
//!
//! End-to-end runs through the Reconciler for the canonical match
//! situations: a confirmed goal, a save described as a shot, an
//! unconfirmed goal claim and an exhausted candidate pool.

use pitchline::core::GoalState;
use pitchline::domain::{Category, Origin, Team};
use pitchline::ingest::{GroundTruthRecord, JsonFileFeed};
use pitchline::{Reconciler, ReconcileSettings, SegmentObservation, TimestampConvention};
use tempfile::TempDir;

fn lines(text: &[&str]) -> Vec<SegmentObservation> {
    vec![SegmentObservation::new(0.0, text.join("\n"))]
}

#[tokio::test]
async fn test_confirmed_goal_is_true_positive() {
    let ground_truth = vec![GroundTruthRecord::new("goal", "12:00")];
    let commentary = lines(&["11:58 - Red team scores", "12:05 - Black kickoff"]);

    let run = Reconciler::default().reconcile(&ground_truth, commentary).await.unwrap();

    let goal = run.report.category(Category::Goal).unwrap();
    assert_eq!(goal.tp, 1);
    assert_eq!(goal.fn_, 0);
    assert_eq!(goal.recall, 1.0);

    assert_eq!(run.goal_verdicts.len(), 1);
    assert_eq!(run.goal_verdicts[0].state, GoalState::Validated);

    // Ground-truth team is unknown, so the matched AI team fills in
    assert_eq!(run.timeline[0].team, Team::Home);
    assert_eq!(run.timeline[0].abs_time_seconds, 720);
}

#[tokio::test]
async fn test_saved_shot_counts_as_save() {
    let ground_truth = vec![GroundTruthRecord::new("save", "05:09")];
    let commentary = lines(&["05:10 - Red player shoots, ball saved by keeper"]);

    let run = Reconciler::default().reconcile(&ground_truth, commentary).await.unwrap();

    let save = run.report.category(Category::Save).unwrap();
    assert_eq!(save.tp, 1);
    assert_eq!(save.fp, 0);

    let shot = run.report.category(Category::Shot).unwrap();
    assert_eq!(shot.tp, 0);
    assert_eq!(shot.fp, 0);
}

#[tokio::test]
async fn test_unconfirmed_goal_downgraded_in_timeline() {
    let ground_truth = vec![
        GroundTruthRecord::new("game_start", "00:00"),
        GroundTruthRecord::new("corner", "60:00"),
    ];
    let commentary = lines(&[
        "30:00 - Red team scores",
        "30:10 - Black passes back",
        "30:20 - Black passes wide",
        "30:30 - Red tackle",
        "30:40 - Black passes forward",
        "30:50 - Red clears",
        "31:30 - Black kickoff",
    ]);

    let run = Reconciler::default().reconcile(&ground_truth, commentary).await.unwrap();

    assert_eq!(run.goal_verdicts[0].state, GoalState::Downgraded);
    assert_eq!(run.metadata.goals_downgraded, 1);

    let row = run
        .timeline
        .iter()
        .find(|e| e.abs_time_seconds == 1800)
        .expect("downgraded claim in timeline");
    assert_eq!(row.category, Category::Shot);
    assert!(!row.validated);
    assert_eq!(row.origin, Origin::AiDetected);
}

#[tokio::test]
async fn test_pool_exhaustion_leaves_false_negative() {
    let ground_truth = vec![
        GroundTruthRecord::new("goal", "10:00"),
        GroundTruthRecord::new("goal", "10:01"),
    ];
    let commentary = lines(&["10:00 - Red team scores", "10:10 - Black kickoff"]);

    let run = Reconciler::default().reconcile(&ground_truth, commentary).await.unwrap();

    let goal = run.report.category(Category::Goal).unwrap();
    assert_eq!(goal.tp, 1);
    assert_eq!(goal.fn_, 1);
    assert_eq!(goal.fp, 0);

    // Both ground-truth goals stay in the timeline
    let goals = run.timeline.iter().filter(|e| e.category == Category::Goal).count();
    assert_eq!(goals, 2);
}

#[tokio::test]
async fn test_goal_phrasing_and_restart_lines() {
    let ground_truth = vec![
        GroundTruthRecord::new("goal", "12:00"),
        GroundTruthRecord::new("goal", "20:00"),
    ];
    let commentary = lines(&[
        "11:58 - Red team scores",
        "12:05 - Play resumes with Black",
        "19:59 - Red shoots on goal and scores",
        "20:06 - Black kick off after the goal",
    ]);

    let run = Reconciler::default().reconcile(&ground_truth, commentary).await.unwrap();

    let states: Vec<GoalState> = run.goal_verdicts.iter().map(|v| v.state).collect();
    assert_eq!(states, vec![GoalState::Validated, GoalState::Validated]);

    let goal = run.report.category(Category::Goal).unwrap();
    assert_eq!((goal.tp, goal.fp, goal.fn_), (2, 0, 0));
    assert_eq!(goal.recall, 1.0);

    let shot = run.report.category(Category::Shot).unwrap();
    assert_eq!(shot.fp, 0);
}

#[tokio::test]
async fn test_relative_timestamps_offset_by_segment() {
    let ground_truth = vec![GroundTruthRecord::new("goal", "12:00")];
    let commentary = vec![
        SegmentObservation::new(0.0, "5s: Kick off, match starts"),
        SegmentObservation::new(690.0, "29s: Red team scores\n36s: Black kickoff"),
    ];

    let settings = ReconcileSettings {
        timestamp_convention: TimestampConvention::Relative,
        ..Default::default()
    };
    let reconciler = Reconciler::new(settings, Default::default());
    let run = reconciler.reconcile(&ground_truth, commentary).await.unwrap();

    assert_eq!(run.metadata.segments, 2);
    assert_eq!(run.goal_verdicts[0].abs_time_seconds, 719.0);
    assert_eq!(run.report.category(Category::Goal).unwrap().tp, 1);
}

#[tokio::test]
async fn test_reconcile_from_json_files() {
    let temp = TempDir::new().unwrap();
    let gt_path = temp.path().join("ground_truth.json");
    let commentary_path = temp.path().join("commentary.json");

    std::fs::write(
        &gt_path,
        r#"[
            {"event_type": "goal", "timestamp": "12:00", "team": "home"},
            {"event_type": "Yellow Card", "timestamp": 2400, "team": "away"}
        ]"#,
    )
    .unwrap();
    std::fs::write(
        &commentary_path,
        r#"[
            {"segment_start_abs_seconds": 0, "text": "=== Segment 1 ===\n11:58 - Red team scores\n12:05 - Black kickoff"},
            {"segment_start_abs_seconds": 2100, "text": "40:02 - Yellow card for Black\n55:00 - Corner for Red"}
        ]"#,
    )
    .unwrap();

    let feed = JsonFileFeed::new(&gt_path, &commentary_path);
    let run = Reconciler::default().reconcile_feed(&feed).await.unwrap();

    assert_eq!(run.metadata.ground_truth_events, 2);
    assert_eq!(run.metadata.extras_promoted, 1);

    let categories: Vec<Category> = run.timeline.iter().map(|e| e.category).collect();
    assert_eq!(categories, vec![Category::Goal, Category::Card, Category::Corner]);
    assert_eq!(run.timeline[1].description, "Yellow card for Black");
}

#[tokio::test]
async fn test_invalid_ground_truth_aborts() {
    let ground_truth = vec![GroundTruthRecord::new("goal", "soon")];
    let result = Reconciler::default()
        .reconcile(&ground_truth, lines(&["10:00 - Red team scores"]))
        .await;

    assert!(matches!(
        result,
        Err(pitchline::ReconcileError::InvalidGroundTruth { index: 0, .. })
    ));
}
