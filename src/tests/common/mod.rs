// Common test utilities and helpers

use crate::config::Config;
use crate::models::{Buffers, Explain, PlanNode};
use crate::services::plan_analyzer::{PlanAnalysis, analyze};
use std::path::PathBuf;

/// Path to a fixture under `tests/fixtures/`
pub fn fixture_path(relative: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures").join(relative)
}

/// Scan node with actuals for a single loop
pub fn scan(node_type: &str, relation: &str, time_ms: f64, rows: f64, plan_rows: f64) -> PlanNode {
    PlanNode::new(node_type).with_relation(relation).with_plan_rows(plan_rows).with_actuals(time_ms, rows, 1.0)
}

/// Number every node and analyze the tree
pub fn analysis_of(mut root: PlanNode) -> PlanAnalysis {
    root.assign_ids("0");
    analyze(&Explain::new(root)).expect("Failed to analyze test plan")
}

/// Same as `analysis_of` with an execution time recorded
pub fn analysis_with_time(mut root: PlanNode, execution_ms: f64) -> PlanAnalysis {
    root.assign_ids("0");
    analyze(&Explain::new(root).with_execution_time(execution_ms)).expect("Failed to analyze test plan")
}

/// A three-level hash join:
///
/// ```text
/// Hash Join (20 ms, 200 rows, est 100)
/// |-- Seq Scan orders (8 ms, 5000 rows, est 5000, 600 blocks)
/// `-- Hash (4 ms)
///     `-- Seq Scan users (3 ms, 200 rows, est 20)
/// ```
pub fn hash_join_plan() -> PlanNode {
    PlanNode::new("Hash Join")
        .with_join_type("Inner")
        .with_plan_rows(100.0)
        .with_actuals(20.0, 200.0, 1.0)
        .with_child(scan("Seq Scan", "orders", 8.0, 5000.0, 5000.0).with_buffers(Buffers::shared(500, 100)))
        .with_child(
            PlanNode::new("Hash")
                .with_plan_rows(20.0)
                .with_actuals(4.0, 200.0, 1.0)
                .with_child(scan("Seq Scan", "users", 3.0, 200.0, 20.0)),
        )
}

/// Nested loop whose inner index scan runs `loops` times
pub fn nested_loop_plan(loops: f64) -> PlanNode {
    PlanNode::new("Nested Loop")
        .with_join_type("Inner")
        .with_plan_rows(loops)
        .with_actuals(30.0, loops, 1.0)
        .with_child(scan("Seq Scan", "orders", 2.0, loops, loops))
        .with_child(
            PlanNode::new("Index Scan")
                .with_relation("users")
                .with_index("users_pkey")
                .with_plan_rows(1.0)
                .with_actuals(0.01, 1.0, loops),
        )
}

pub fn default_config() -> Config {
    Config::default()
}
