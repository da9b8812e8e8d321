//! Hotspot rule (H001)

use super::*;
use crate::utils::format::humanize_buffers;

/// H001: The operator with the largest exclusive share
/// Severity by `hotspot_critical_share` / `hotspot_warning_share`
pub struct H001Hotspot;

impl H001Hotspot {
    fn severity(share: f64, config: &InsightConfig) -> Severity {
        if share >= config.hotspot_critical_share {
            Severity::Critical
        } else if share >= config.hotspot_warning_share {
            Severity::Warning
        } else {
            Severity::Info
        }
    }
}

impl InsightRule for H001Hotspot {
    fn id(&self) -> &str {
        "H001"
    }
    fn name(&self) -> &str {
        "Hot spot"
    }

    fn evaluate(&self, context: &InsightContext) -> Vec<Insight> {
        let Some(hot) = context.top_hotspot() else {
            return Vec::new();
        };

        let mut text = format!(
            "Hot spot: {} self {:.2} ms ({:.1}%)",
            compact_label(hot),
            hot.exclusive_time_ms,
            hot.exclusive_share * 100.0
        );

        let buffers = hot.buffers.total();
        if buffers > 0 {
            text.push_str(&format!(", buffers {} (~{})", buffers, humanize_buffers(buffers)));
        }
        if hot.node_type().contains("Seq Scan") && buffers > context.config.seq_scan_buffer_hint {
            text.push_str("; consider adding an index or tightening the filter");
        }

        let severity = Self::severity(hot.exclusive_share, context.config);
        vec![context.insight(self, severity, hot, text)]
    }
}
