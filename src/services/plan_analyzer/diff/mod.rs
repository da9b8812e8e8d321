//! Plan diff engine
//!
//! Aggregates two analyses by node signature and reports the operators whose self time moved
//! by more than the configured thresholds.

pub mod aggregate;
pub mod insights;
pub mod report;

pub use report::{DiffInsight, DiffSeverity, Entry, Report, SummaryDiff};

use super::analyzer::numeric::{percent_change, ratio};
use super::models::PlanAnalysis;
use crate::config::Config;
use aggregate::Aggregated;

/// Diff errors
#[derive(Debug, thiserror::Error)]
pub enum DiffError {
    #[error("diff: base analysis missing")]
    MissingBase,

    #[error("diff: target analysis missing")]
    MissingTarget,

    #[error("diff: serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Diff sensitivity; non-positive values fall back to the configuration
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DiffOptions {
    pub min_self_delta_ms: f64,
    pub min_percent_change: f64,
    pub max_items: usize,
}

impl DiffOptions {
    /// Fill unset thresholds from `config.diff`
    pub fn apply_defaults(self, config: &Config) -> Self {
        let cfg = &config.diff;
        Self {
            min_self_delta_ms: if self.min_self_delta_ms > 0.0 { self.min_self_delta_ms } else { cfg.min_self_delta_ms },
            min_percent_change: if self.min_percent_change > 0.0 {
                self.min_percent_change
            } else {
                cfg.min_percent_change
            },
            max_items: if self.max_items > 0 { self.max_items } else { cfg.max_items },
        }
    }

    pub fn is_regression(&self, entry: &Entry) -> bool {
        entry.delta_self_ms >= self.min_self_delta_ms && entry.percent_change >= self.min_percent_change
    }

    pub fn is_improvement(&self, entry: &Entry) -> bool {
        entry.delta_self_ms <= -self.min_self_delta_ms && entry.percent_change <= -self.min_percent_change
    }
}

/// Compare two analyses of the same query
pub fn compare(
    base: &PlanAnalysis,
    target: &PlanAnalysis,
    options: &DiffOptions,
    config: &Config,
) -> Result<Report, DiffError> {
    if base.root().is_none() {
        return Err(DiffError::MissingBase);
    }
    if target.root().is_none() {
        return Err(DiffError::MissingTarget);
    }

    let options = options.apply_defaults(config);
    let base_agg = aggregate::aggregate(base);
    let target_agg = aggregate::aggregate(target);

    let mut regressions = Vec::new();
    let mut improvements = Vec::new();

    for signature in aggregate::union_keys(&base_agg, &target_agg) {
        let b = base_agg.get(signature).copied().unwrap_or_default();
        let t = target_agg.get(signature).copied().unwrap_or_default();
        let entry = build_entry(signature, &b, &t);

        if options.is_regression(&entry) {
            regressions.push(entry);
        } else if options.is_improvement(&entry) {
            improvements.push(entry);
        }
    }

    regressions.sort_by(|a, b| b.delta_self_ms.total_cmp(&a.delta_self_ms));
    improvements.sort_by(|a, b| a.delta_self_ms.total_cmp(&b.delta_self_ms));
    regressions.truncate(options.max_items);
    improvements.truncate(options.max_items);

    let summary = SummaryDiff {
        base_execution_ms: base.total_time_ms,
        target_execution_ms: target.total_time_ms,
        delta_execution_ms: target.total_time_ms - base.total_time_ms,
        percent_execution: percent_change(base.total_time_ms, target.total_time_ms),
        base_planning_ms: base.planning_time_ms,
        target_planning_ms: target.planning_time_ms,
        delta_planning_ms: target.planning_time_ms - base.planning_time_ms,
        percent_planning: percent_change(base.planning_time_ms, target.planning_time_ms),
    };

    let insights = insights::synthesize(&regressions, &improvements, config);

    tracing::debug!(
        "Diff: {} regressions, {} improvements (min delta {} ms, min percent {}%)",
        regressions.len(),
        improvements.len(),
        options.min_self_delta_ms,
        options.min_percent_change
    );

    Ok(Report { summary, regressions, improvements, insights, options })
}

fn build_entry(signature: &str, base: &Aggregated, target: &Aggregated) -> Entry {
    Entry {
        signature: signature.to_string(),
        base_self_ms: base.self_ms,
        target_self_ms: target.self_ms,
        delta_self_ms: target.self_ms - base.self_ms,
        percent_change: percent_change(base.self_ms, target.self_ms),
        base_rows: base.actual_rows,
        target_rows: target.actual_rows,
        base_row_factor: ratio(base.actual_rows, base.estimated_rows),
        target_row_factor: ratio(target.actual_rows, target.estimated_rows),
        base_buffers: base.buffers,
        target_buffers: target.buffers,
        delta_buffers: target.buffers.saturating_sub(base.buffers),
        base_temp_blocks: base.temp_blocks,
        target_temp_blocks: target.temp_blocks,
        delta_temp_blocks: target.temp_blocks.saturating_sub(base.temp_blocks),
    }
}
