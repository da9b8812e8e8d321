// Diff engine tests over hand-built plans

use crate::config::Config;
use crate::models::{Buffers, PlanNode};
use crate::services::plan_analyzer::diff::{DiffError, DiffSeverity};
use crate::services::plan_analyzer::{DiffOptions, PlanAnalysis, compare};
use crate::tests::common::{analysis_of, analysis_with_time, hash_join_plan, scan};
use std::collections::BTreeSet;

/// Sort over a sequential scan; the sort's own time is `sort_self_ms`
fn sort_plan(sort_self_ms: f64, temp_blocks: i64) -> PlanNode {
    PlanNode::new("Sort")
        .with_plan_rows(1000.0)
        .with_actuals(3.0 + sort_self_ms, 1000.0, 1.0)
        .with_buffers(Buffers::temp(temp_blocks / 2, temp_blocks / 2))
        .with_child(scan("Seq Scan", "t", 3.0, 1000.0, 1000.0))
}

fn default_compare(base: &PlanAnalysis, target: &PlanAnalysis) -> crate::services::plan_analyzer::Report {
    compare(base, target, &DiffOptions::default(), &Config::default()).unwrap()
}

#[test]
fn test_self_time_regression() {
    let base = analysis_with_time(sort_plan(2.0, 0), 5.1);
    let target = analysis_with_time(sort_plan(12.0, 0), 15.2);
    let report = default_compare(&base, &target);

    assert_eq!(report.regressions.len(), 1);
    let entry = &report.regressions[0];
    assert_eq!(entry.signature, "Sort");
    assert!((entry.delta_self_ms - 10.0).abs() < 1e-9);
    assert!((entry.percent_change - 500.0).abs() < 1e-9);
    assert!(report.improvements.is_empty());

    assert_eq!(report.insights.len(), 1);
    assert_eq!(report.insights[0].severity, DiffSeverity::Critical);
    assert!(report.insights[0].message.starts_with("Sort self +10.00 ms (+500.0%)"));

    assert!((report.summary.delta_execution_ms - 10.0).abs() < 1e-9);
    assert!((report.summary.percent_execution - 200.0).abs() < 1e-9);
}

#[test]
fn test_direction_is_mirrored() {
    let slow = analysis_of(sort_plan(12.0, 0));
    let fast = analysis_of(sort_plan(2.0, 0));

    let forward = default_compare(&fast, &slow);
    let backward = default_compare(&slow, &fast);

    assert_eq!(forward.regressions.len(), backward.improvements.len());
    assert_eq!(forward.regressions[0].signature, backward.improvements[0].signature);
    assert!((forward.regressions[0].delta_self_ms + backward.improvements[0].delta_self_ms).abs() < 1e-9);
    assert_eq!(backward.insights[0].severity, DiffSeverity::Improvement);
    assert!(backward.insights[0].message.starts_with("Sort self -10.00 ms (-83.3%)"));
}

#[test]
fn test_regressions_and_improvements_are_disjoint() {
    let base = analysis_of(hash_join_plan());
    let target_root = PlanNode::new("Hash Join")
        .with_join_type("Inner")
        .with_plan_rows(100.0)
        .with_actuals(20.0, 200.0, 1.0)
        .with_child(scan("Seq Scan", "orders", 2.0, 5000.0, 5000.0))
        .with_child(
            PlanNode::new("Hash")
                .with_plan_rows(20.0)
                .with_actuals(16.0, 200.0, 1.0)
                .with_child(scan("Seq Scan", "users", 15.0, 200.0, 20.0)),
        );
    let report = default_compare(&base, &analysis_of(target_root));

    let regressed: BTreeSet<&str> = report.regressions.iter().map(|e| e.signature.as_str()).collect();
    let improved: BTreeSet<&str> = report.improvements.iter().map(|e| e.signature.as_str()).collect();
    assert!(regressed.is_disjoint(&improved));
    assert_eq!(regressed, BTreeSet::from(["Seq Scan · users"]));
    assert_eq!(improved, BTreeSet::from(["Hash Join · Inner", "Seq Scan · orders"]));

    // improvements: most negative delta first
    assert_eq!(report.improvements[0].signature, "Hash Join · Inner");
}

#[test]
fn test_thresholds_and_limit() {
    let base = analysis_of(sort_plan(2.0, 0));
    let target = analysis_of(sort_plan(3.5, 0));

    let report = default_compare(&base, &target);
    assert!(report.regressions.is_empty(), "1.5 ms is below the default 2 ms");

    let options = DiffOptions { min_self_delta_ms: 1.0, ..Default::default() };
    let report = compare(&base, &target, &options, &Config::default()).unwrap();
    assert_eq!(report.regressions.len(), 1);
    assert_eq!(report.options.min_self_delta_ms, 1.0);
    assert_eq!(report.options.max_items, 8);
    assert_eq!(report.insights[0].severity, DiffSeverity::Warning);

    let options = DiffOptions { min_self_delta_ms: 1.0, min_percent_change: 80.0, max_items: 0 };
    let report = compare(&base, &target, &options, &Config::default()).unwrap();
    assert!(report.regressions.is_empty(), "+75% is below the 80% floor");
}

#[test]
fn test_began_spilling() {
    let base = analysis_of(sort_plan(2.0, 0));
    let target = analysis_of(sort_plan(12.0, 200));
    let report = default_compare(&base, &target);

    assert_eq!(report.regressions[0].delta_temp_blocks, 200);
    assert!(report.insights[0].message.contains(", temp +"));
    let spill = report.insights.last().unwrap();
    assert_eq!(spill.severity, DiffSeverity::Warning);
    assert!(spill.message.starts_with("Sort began spilling to disk: 200 temp buffers"));
}

#[test]
fn test_json_marks_unbounded_factor() {
    let base = analysis_of(scan("Seq Scan", "t", 1.0, 10.0, 10.0));
    let target = analysis_of(scan("Seq Scan", "t", 9.0, 10.0, 0.0));
    let report = default_compare(&base, &target);

    let value: serde_json::Value = serde_json::from_str(&report.to_json().unwrap()).unwrap();
    let entry = &value["regressions"][0];
    assert_eq!(entry["signature"], "Seq Scan · t");
    assert_eq!(entry["target_row_factor"], "Infinity");
    assert_eq!(entry["base_row_factor"], 1.0);

    assert!(report.to_markdown().contains("10 (x1.00) → 10 (∞)"));
}

#[test]
fn test_empty_analysis_is_rejected() {
    let plan = analysis_of(scan("Seq Scan", "t", 1.0, 1.0, 1.0));
    let empty = PlanAnalysis::default();
    let config = Config::default();

    let err = compare(&empty, &plan, &DiffOptions::default(), &config).unwrap_err();
    assert!(matches!(err, DiffError::MissingBase));
    let err = compare(&plan, &empty, &DiffOptions::default(), &config).unwrap_err();
    assert!(matches!(err, DiffError::MissingTarget));
}
