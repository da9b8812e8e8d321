//! Parallel gather under LIMIT rule (P001)

use super::*;

/// P001: A Gather under a Limit that reads far more rows than the Limit keeps
pub struct P001ParallelLimit;

impl InsightRule for P001ParallelLimit {
    fn id(&self) -> &str {
        "P001"
    }
    fn name(&self) -> &str {
        "Parallel limit"
    }

    fn applicable_to(&self, node: &NodeStats) -> bool {
        matches!(node.node_type(), "Gather" | "Gather Merge")
    }

    fn evaluate(&self, context: &InsightContext) -> Vec<Insight> {
        let keep_ratio = context.config.parallel_limit_keep_ratio;
        let candidate = context.applicable_nodes(self).into_iter().find(|node| {
            context.analysis.parent_of(node.index).is_some_and(|p| p.node_type() == "Limit")
                && node.estimated_rows_total > 0.0
                && node.actual_rows_total / node.estimated_rows_total < keep_ratio
        });

        let Some(node) = candidate else {
            return Vec::new();
        };

        let text = format!(
            "Parallel gather reads {:.0} rows but LIMIT keeps {:.0}; consider adding an index or reducing parallelism",
            node.estimated_rows_total, node.actual_rows_total
        );
        vec![context.insight(self, Severity::Warning, node, text)]
    }
}
