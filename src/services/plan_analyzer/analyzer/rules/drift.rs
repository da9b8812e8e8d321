//! Estimate drift rule (D001)

use super::*;
use crate::services::plan_analyzer::analyzer::numeric::format_factor;

/// D001: Row estimates far from the actual counts
/// Reports the two most divergent nodes
pub struct D001EstimateDrift;

impl InsightRule for D001EstimateDrift {
    fn id(&self) -> &str {
        "D001"
    }
    fn name(&self) -> &str {
        "Estimate drift"
    }
    fn max_messages(&self) -> usize {
        2
    }

    fn evaluate(&self, context: &InsightContext) -> Vec<Insight> {
        let cfg = context.config;
        context
            .analysis
            .divergent()
            .take(self.max_messages())
            .map(|node| {
                let factor = node.row_estimate_factor;
                let text = format!(
                    "Estimate drift: {} expected {:.0} got {:.0} ({}); update statistics (ANALYZE) or review estimates",
                    compact_label(node),
                    node.estimated_rows_total,
                    node.actual_rows_total,
                    format_factor(factor)
                );
                let severity = if factor >= cfg.row_estimate_critical_high
                    || factor <= cfg.row_estimate_critical_low
                {
                    Severity::Critical
                } else {
                    Severity::Warning
                };
                context.insight(self, severity, node, text)
            })
            .collect()
    }
}
