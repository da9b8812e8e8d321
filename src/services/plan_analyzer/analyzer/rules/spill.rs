//! Disk spill rule (S001)

use super::*;
use crate::utils::format::humanize_buffers;

/// Temp blocks at or above this are critical
const SPILL_CRITICAL_BLOCKS: i64 = 20000;
/// Temp blocks below this are informational
const SPILL_INFO_BLOCKS: i64 = 2000;

/// S001: Sorts and hashes that wrote temp files
pub struct S001DiskSpill;

impl InsightRule for S001DiskSpill {
    fn id(&self) -> &str {
        "S001"
    }
    fn name(&self) -> &str {
        "Disk spill"
    }
    fn max_messages(&self) -> usize {
        2
    }

    fn applicable_to(&self, node: &NodeStats) -> bool {
        matches!(node.node_type(), "Sort" | "Incremental Sort" | "Hash" | "Hash Join")
    }

    fn evaluate(&self, context: &InsightContext) -> Vec<Insight> {
        let min_blocks = context.config.spill_new_blocks;
        let mut candidates: Vec<&NodeStats> = context
            .applicable_nodes(self)
            .into_iter()
            .filter(|n| n.buffers.temp_blocks() as f64 >= min_blocks)
            .collect();
        candidates.sort_by(|a, b| b.buffers.temp_blocks().cmp(&a.buffers.temp_blocks()));

        candidates
            .into_iter()
            .take(self.max_messages())
            .map(|node| {
                let temp = node.buffers.temp_blocks();
                let hint = match node.node_type() {
                    "Sort" | "Incremental Sort" => "consider increasing work_mem or adding a supporting index",
                    _ => "consider increasing work_mem or rewriting the join",
                };
                let text = format!(
                    "{} spilled to disk: {} used {} temp buffers (~{}); {}",
                    node.node_type(),
                    compact_label(node),
                    temp,
                    humanize_buffers(temp),
                    hint
                );
                let severity = if temp >= SPILL_CRITICAL_BLOCKS {
                    Severity::Critical
                } else if temp < SPILL_INFO_BLOCKS {
                    Severity::Info
                } else {
                    Severity::Warning
                };
                context.insight(self, severity, node, text)
            })
            .collect()
    }
}
