//! Diff report model and its Markdown / JSON renderings

use super::{DiffError, DiffOptions};
use crate::services::plan_analyzer::models::serialize_factor;
use crate::utils::format::{signed_ms, signed_percent};
use serde::Serialize;
use std::fmt::Write;

// ============================================================================
// Report Model
// ============================================================================

/// Plan-level timing deltas
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SummaryDiff {
    pub base_execution_ms: f64,
    pub target_execution_ms: f64,
    pub delta_execution_ms: f64,
    pub percent_execution: f64,
    pub base_planning_ms: f64,
    pub target_planning_ms: f64,
    pub delta_planning_ms: f64,
    pub percent_planning: f64,
}

/// Delta for all nodes sharing one signature
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Entry {
    pub signature: String,
    pub base_self_ms: f64,
    pub target_self_ms: f64,
    pub delta_self_ms: f64,
    pub percent_change: f64,
    pub base_rows: f64,
    pub target_rows: f64,
    #[serde(serialize_with = "serialize_factor")]
    pub base_row_factor: f64,
    #[serde(serialize_with = "serialize_factor")]
    pub target_row_factor: f64,
    pub base_buffers: i64,
    pub target_buffers: i64,
    pub delta_buffers: i64,
    pub base_temp_blocks: i64,
    pub target_temp_blocks: i64,
    pub delta_temp_blocks: i64,
}

/// Classification of a diff insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DiffSeverity {
    Critical,
    Warning,
    Improvement,
}

impl DiffSeverity {
    pub fn icon(&self) -> &'static str {
        match self {
            DiffSeverity::Critical => "🔥",
            DiffSeverity::Warning => "⚠️",
            DiffSeverity::Improvement => "✅",
        }
    }
}

/// One line of the diff narrative
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DiffInsight {
    pub severity: DiffSeverity,
    pub icon: String,
    pub message: String,
}

impl DiffInsight {
    pub fn new(severity: DiffSeverity, message: String) -> Self {
        Self { severity, icon: severity.icon().to_string(), message }
    }
}

/// Result of comparing two analyses
#[derive(Debug, Clone, Default, Serialize)]
pub struct Report {
    pub summary: SummaryDiff,
    pub regressions: Vec<Entry>,
    pub improvements: Vec<Entry>,
    pub insights: Vec<DiffInsight>,
    /// Effective thresholds used to build this report
    #[serde(skip)]
    pub options: DiffOptions,
}

// ============================================================================
// Rendering
// ============================================================================

const TABLE_HEADER: &str =
    "| Operator | Base self (ms) | Target self (ms) | Δ self (ms) | Δ % | Rows (actual / est) |\n|---|---:|---:|---:|---:|---|\n";

impl Report {
    /// Render as a Markdown document
    pub fn to_markdown(&self) -> String {
        let s = &self.summary;
        let mut out = String::new();

        out.push_str("# plansight diff\n\n");
        out.push_str("## Summary\n");
        let _ = writeln!(
            out,
            "- Execution: {:.3} ms → {:.3} ms ({:+.3} ms, {:+.1}%)",
            s.base_execution_ms, s.target_execution_ms, s.delta_execution_ms, s.percent_execution
        );
        let _ = writeln!(
            out,
            "- Planning: {:.3} ms → {:.3} ms ({:+.3} ms, {:+.1}%)\n",
            s.base_planning_ms, s.target_planning_ms, s.delta_planning_ms, s.percent_planning
        );

        out.push_str("### Insights\n");
        if self.insights.is_empty() {
            out.push_str("- No notable plan changes detected\n");
        } else {
            for insight in &self.insights {
                let _ = writeln!(out, "- {} {}", insight.icon, insight.message);
            }
        }

        out.push_str("\n### Regressions\n");
        write_entries(&mut out, &self.regressions);

        out.push_str("\n### Improvements\n");
        write_entries(&mut out, &self.improvements);

        out
    }

    /// Render as pretty-printed JSON
    pub fn to_json(&self) -> Result<String, DiffError> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

fn write_entries(out: &mut String, entries: &[Entry]) {
    if entries.is_empty() {
        out.push_str("- None above threshold\n");
        return;
    }
    out.push_str(TABLE_HEADER);
    for entry in entries {
        let _ = writeln!(
            out,
            "| {} | {:.2} | {:.2} | {} | {} | {} |",
            entry.signature,
            entry.base_self_ms,
            entry.target_self_ms,
            signed_ms(entry.delta_self_ms),
            signed_percent(entry.percent_change),
            rows_summary(entry)
        );
    }
}

fn rows_summary(entry: &Entry) -> String {
    format!(
        "{} → {}",
        format_rows(entry.base_rows, entry.base_row_factor),
        format_rows(entry.target_rows, entry.target_row_factor)
    )
}

/// `120 (x2.00)`, `5 (∞)`, or `0` for an absent side
pub fn format_rows(rows: f64, factor: f64) -> String {
    if rows == 0.0 && (factor == 0.0 || factor.is_nan()) {
        return "0".to_string();
    }
    if factor.is_infinite() {
        return format!("{:.0} (∞)", rows);
    }
    format!("{:.0} (x{:.2})", rows, factor)
}
