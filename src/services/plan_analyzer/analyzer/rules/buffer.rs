//! Buffer churn rule (B001)

use super::*;
use crate::utils::format::humanize_buffers;

/// B001: The operator touching the most blocks
/// Prefers the top hotspot, then the heaviest node that does real work
pub struct B001BufferChurn;

impl B001BufferChurn {
    fn select_candidate<'a>(context: &InsightContext<'a>) -> Option<&'a NodeStats> {
        let analysis = context.analysis;
        let heaviest = analysis.heavy().next()?;

        if let Some(hot) = context.top_hotspot()
            && hot.has_buffers()
            && !is_wrapper_node(hot.node_type())
        {
            return Some(hot);
        }

        analysis
            .heavy()
            .find(|n| n.has_buffers() && !is_wrapper_node(n.node_type()))
            .or(Some(heaviest))
    }
}

impl InsightRule for B001BufferChurn {
    fn id(&self) -> &str {
        "B001"
    }
    fn name(&self) -> &str {
        "Buffer churn"
    }

    fn evaluate(&self, context: &InsightContext) -> Vec<Insight> {
        let Some(node) = Self::select_candidate(context) else {
            return Vec::new();
        };

        let cfg = context.config;
        let buffers = node.buffers.total();
        let text = format!(
            "Buffer churn: {} touched {} buffers (~{})",
            compact_label(node),
            buffers,
            humanize_buffers(buffers)
        );
        let severity = if buffers >= cfg.buffer_critical_blocks {
            Severity::Critical
        } else if buffers >= cfg.buffer_warning_blocks {
            Severity::Warning
        } else {
            Severity::Info
        };
        vec![context.insight(self, severity, node, text)]
    }
}
