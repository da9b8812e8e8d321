//! Ranking of hotspot, estimate-divergence and buffer-heavy nodes
//!
//! All sorts are stable, so ties keep pre-order.

use super::numeric::divergence;
use crate::services::plan_analyzer::models::NodeStats;
use std::cmp::Ordering;

pub const MAX_HOT_NODES: usize = 5;
pub const HOT_SHARE_CUTOFF: f64 = 0.10;
pub const MAX_DIVERGENT_NODES: usize = 5;
pub const DIVERGENCE_HIGH: f64 = 2.0;
pub const DIVERGENCE_LOW: f64 = 0.5;
pub const MAX_BUFFER_HEAVY: usize = 5;

fn descending(a: f64, b: f64) -> Ordering {
    b.partial_cmp(&a).unwrap_or(Ordering::Equal)
}

/// Nodes with the largest exclusive share
///
/// Keeps the top candidates at or above the cutoff; when none qualify the top candidates are
/// returned as-is so a flat plan still names something.
pub fn select_hot_nodes(nodes: &[NodeStats]) -> Vec<usize> {
    let mut candidates: Vec<&NodeStats> = nodes.iter().filter(|n| n.exclusive_share > 0.0).collect();
    candidates.sort_by(|a, b| descending(a.exclusive_share, b.exclusive_share));
    candidates.truncate(MAX_HOT_NODES);

    let qualified: Vec<usize> = candidates
        .iter()
        .take_while(|n| n.exclusive_share >= HOT_SHARE_CUTOFF)
        .map(|n| n.index)
        .collect();

    if qualified.is_empty() {
        candidates.iter().map(|n| n.index).collect()
    } else {
        qualified
    }
}

/// Whether a node's row estimate is off by enough to report
pub fn is_divergent(stats: &NodeStats) -> bool {
    let factor = stats.row_estimate_factor;
    if factor.is_infinite() {
        return true;
    }
    (factor >= DIVERGENCE_HIGH || factor <= DIVERGENCE_LOW)
        && (stats.estimated_rows_total > 0.0 || stats.actual_rows_total > 0.0)
}

/// Nodes whose row estimate is furthest from the actual count, infinite factors first
pub fn select_divergent_nodes(nodes: &[NodeStats]) -> Vec<usize> {
    let mut out: Vec<&NodeStats> = nodes.iter().filter(|n| is_divergent(n)).collect();
    out.sort_by(|a, b| descending(divergence(a.row_estimate_factor), divergence(b.row_estimate_factor)));
    out.into_iter().take(MAX_DIVERGENT_NODES).map(|n| n.index).collect()
}

/// Nodes touching the most blocks
pub fn select_buffer_heavy(nodes: &[NodeStats]) -> Vec<usize> {
    let mut out: Vec<&NodeStats> = nodes.iter().filter(|n| n.has_buffers()).collect();
    out.sort_by(|a, b| b.buffers.total().cmp(&a.buffers.total()));
    out.into_iter().take(MAX_BUFFER_HEAVY).map(|n| n.index).collect()
}
