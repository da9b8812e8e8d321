//! Signature aggregation
//!
//! Nodes of one plan are grouped by a structural signature so two plans of the same query can
//! be compared without aligning their trees.

use crate::services::plan_analyzer::models::{NodeStats, PlanAnalysis};
use std::collections::{BTreeMap, BTreeSet};

const SIGNATURE_SEPARATOR: &str = " · ";

/// Totals of every node sharing one signature
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Aggregated {
    pub self_ms: f64,
    pub actual_rows: f64,
    pub estimated_rows: f64,
    pub buffers: i64,
    pub temp_blocks: i64,
}

/// `node type · relation · index · join type`, absent parts skipped
pub fn signature(stats: &NodeStats) -> String {
    let node = &stats.node;
    let mut parts = vec![node.node_type.as_str()];
    parts.extend(
        [&node.relation_name, &node.index_name, &node.join_type]
            .into_iter()
            .filter_map(|part| part.as_deref())
            .filter(|part| !part.is_empty()),
    );
    parts.join(SIGNATURE_SEPARATOR)
}

/// Sum self time, rows, buffers and temp blocks per signature
pub fn aggregate(analysis: &PlanAnalysis) -> BTreeMap<String, Aggregated> {
    let mut result: BTreeMap<String, Aggregated> = BTreeMap::new();
    for stats in &analysis.nodes {
        let entry = result.entry(signature(stats)).or_default();
        entry.self_ms += stats.exclusive_time_ms;
        entry.actual_rows += stats.actual_rows_total;
        entry.estimated_rows += stats.estimated_rows_total;
        entry.buffers = entry.buffers.saturating_add(stats.buffers.total());
        entry.temp_blocks = entry.temp_blocks.saturating_add(stats.buffers.temp_blocks());
    }
    result
}

/// Sorted union of both signature sets
pub fn union_keys<'a>(
    base: &'a BTreeMap<String, Aggregated>,
    target: &'a BTreeMap<String, Aggregated>,
) -> Vec<&'a str> {
    let keys: BTreeSet<&str> = base.keys().chain(target.keys()).map(String::as_str).collect();
    keys.into_iter().collect()
}
