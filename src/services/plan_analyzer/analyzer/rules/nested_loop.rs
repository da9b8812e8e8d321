//! Nested loop amplification rule (N001)

use super::*;

/// N001: Nested Loop whose inner scan runs many times
/// Condition: child scan `Actual Loops` > `nested_loop_warn_loops`
pub struct N001NestedLoopAmplification;

impl InsightRule for N001NestedLoopAmplification {
    fn id(&self) -> &str {
        "N001"
    }
    fn name(&self) -> &str {
        "Nested loop amplification"
    }
    fn max_messages(&self) -> usize {
        2
    }

    fn applicable_to(&self, node: &NodeStats) -> bool {
        node.node_type() == "Nested Loop"
    }

    fn evaluate(&self, context: &InsightContext) -> Vec<Insight> {
        let cfg = context.config;
        let mut out = Vec::new();

        for join in context.applicable_nodes(self) {
            let amplified = context.analysis.children_of(join.index).find(|child| {
                child.node.actual_loops > cfg.nested_loop_warn_loops && child.node_type().contains("Scan")
            });
            let Some(child) = amplified else {
                continue;
            };

            let loops = child.node.actual_loops;
            let text = format!(
                "Nested Loop: {} invoked {} {:.0} times; consider adding an index or rewriting the join order",
                compact_label(join),
                compact_label(child),
                loops
            );
            let severity = if loops >= cfg.nested_loop_critical_loops {
                Severity::Critical
            } else if loops < cfg.nested_loop_warn_loops * 2.0 {
                Severity::Info
            } else {
                Severity::Warning
            };
            // anchored at the join, not the inner scan
            out.push(context.insight(self, severity, join, text));

            if out.len() >= self.max_messages() {
                break;
            }
        }
        out
    }
}
