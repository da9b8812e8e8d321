//! Per-node statistics
//!
//! Two passes over the plan: `build_stats` walks the tree once, filling the pre-order arena with
//! inclusive/exclusive times, row totals, estimate factors and warnings; `annotate_shares` then
//! divides every time by the root inclusive time.

use super::numeric::{self, EPSILON};
use super::selection;
use crate::models::{Explain, PlanNode};
use crate::services::plan_analyzer::models::{BufferTotals, NodeStats, PlanAnalysis};

/// Exclusive-time deficits below this are timer noise
const EXCLUSIVE_DEFICIT_TOLERANCE_MS: f64 = 1e-3;

// Fixed per-node warning thresholds
const WARN_SELF_SHARE: f64 = 0.20;
const WARN_FACTOR_HIGH: f64 = 2.0;
const WARN_FACTOR_LOW: f64 = 0.5;
const WARN_BUFFER_SHARE: f64 = 0.05;

/// Analyzer errors
#[derive(Debug, thiserror::Error)]
pub enum AnalyzeError {
    #[error("explain document has no plan")]
    MissingPlan,
}

/// Analyze a parsed plan
pub fn analyze(explain: &Explain) -> Result<PlanAnalysis, AnalyzeError> {
    let root = explain.plan.as_ref().ok_or(AnalyzeError::MissingPlan)?;

    let mut nodes = Vec::with_capacity(root.node_count());
    build_stats(root, None, 0, &mut nodes);

    let total_time_ms = nodes.first().map(|n| n.inclusive_time_ms).unwrap_or(0.0);
    annotate_shares(&mut nodes, total_time_ms);

    let hot_nodes = selection::select_hot_nodes(&nodes);
    let divergent_nodes = selection::select_divergent_nodes(&nodes);
    let buffer_heavy = selection::select_buffer_heavy(&nodes);

    tracing::debug!(
        "Analyzed plan: {} nodes, total {:.3} ms, {} hot, {} divergent, {} buffer-heavy",
        nodes.len(),
        total_time_ms,
        hot_nodes.len(),
        divergent_nodes.len(),
        buffer_heavy.len()
    );

    Ok(PlanAnalysis {
        node_count: nodes.len(),
        nodes,
        planning_time_ms: explain.planning_time_ms,
        execution_time_ms: explain.execution_time_ms,
        total_time_ms,
        hot_nodes,
        divergent_nodes,
        buffer_heavy,
    })
}

/// Bottom-up pass; pushes `node` and its subtree in pre-order and returns the node's index
pub fn build_stats(
    node: &PlanNode,
    parent: Option<usize>,
    depth: usize,
    arena: &mut Vec<NodeStats>,
) -> usize {
    let loops = if node.actual_loops > 0.0 { node.actual_loops } else { 1.0 };
    let inclusive = node.actual_total_time * loops;
    let index = arena.len();

    arena.push(NodeStats {
        index,
        parent,
        children: Vec::with_capacity(node.children.len()),
        depth,
        node: node.detached(),
        loops,
        inclusive_time_ms: inclusive,
        exclusive_time_ms: 0.0,
        exclusive_share: 0.0,
        inclusive_share: 0.0,
        actual_rows_total: node.actual_rows * loops,
        estimated_rows_total: node.plan_rows * loops,
        row_estimate_factor: 1.0,
        buffers: BufferTotals::from(&node.buffers),
        warnings: Vec::new(),
    });

    let mut children = Vec::with_capacity(node.children.len());
    let mut child_time = 0.0;
    for child in &node.children {
        let child_index = build_stats(child, Some(index), depth + 1, arena);
        child_time += arena[child_index].inclusive_time_ms;
        children.push(child_index);
    }

    let stats = &mut arena[index];
    stats.children = children;

    let raw_exclusive = inclusive - child_time;
    if raw_exclusive < -EXCLUSIVE_DEFICIT_TOLERANCE_MS {
        tracing::debug!(
            "Node {} ({}) children exceed inclusive time by {:.3} ms, clamping exclusive time",
            stats.node.id,
            stats.node.node_type,
            -raw_exclusive
        );
    }
    stats.exclusive_time_ms = raw_exclusive.max(0.0);
    stats.row_estimate_factor = numeric::ratio(stats.actual_rows_total, stats.estimated_rows_total);
    stats.warnings = derive_warnings(stats);

    index
}

/// Top-down pass; shares are fractions of one snapshot of the root inclusive time
///
/// Shares are not capped: parallel workers summed over loops can exceed the root, and the
/// ranking must still see which worker took longest.
pub fn annotate_shares(arena: &mut [NodeStats], total_time_ms: f64) {
    if total_time_ms <= EPSILON {
        return;
    }
    for stats in arena.iter_mut() {
        stats.exclusive_share = stats.exclusive_time_ms / total_time_ms;
        stats.inclusive_share = stats.inclusive_time_ms / total_time_ms;
    }
}

/// Heuristic warnings from the node's current values
pub fn derive_warnings(stats: &NodeStats) -> Vec<String> {
    let mut warnings = Vec::new();

    if stats.exclusive_share >= WARN_SELF_SHARE {
        warnings.push(format!("self time {:.1}% of plan", stats.exclusive_share * 100.0));
    }

    let factor = stats.row_estimate_factor;
    if factor.is_infinite() {
        warnings.push("rows ∞x higher than estimate".to_string());
    } else if factor >= WARN_FACTOR_HIGH {
        warnings.push(format!("rows {:.1}x higher than estimate", factor));
    } else if factor <= WARN_FACTOR_LOW {
        warnings.push(format!("rows {:.1}x lower than estimate", factor));
    }

    if stats.has_buffers() && stats.exclusive_share >= WARN_BUFFER_SHARE {
        warnings.push("heavy buffer usage".to_string());
    }

    warnings
}
