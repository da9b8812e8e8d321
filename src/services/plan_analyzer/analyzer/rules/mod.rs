//! Insight rules module
//!
//! Each rule inspects one [`PlanAnalysis`] and yields at most a handful of messages. Rules are
//! evaluated in registry order, so the output order is stable: H001, D001, B001, P001, S001, N001.

pub mod buffer;
pub mod common;
pub mod drift;
pub mod hotspot;
pub mod nested_loop;
pub mod parallel;
pub mod spill;

pub use common::{anchor_id, compact_label, is_wrapper_node, node_label};

use crate::config::InsightConfig;
use crate::services::plan_analyzer::models::{NodeStats, PlanAnalysis};
use serde::{Deserialize, Serialize};

// ============================================================================
// Rule Trait and Types
// ============================================================================

/// Severity level of an insight
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info = 0,
    Warning = 1,
    Critical = 2,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Critical => "critical",
        }
    }

    /// Marker used by text renderers
    pub fn icon(&self) -> &'static str {
        match self {
            Severity::Info => "ℹ️",
            Severity::Warning => "⚠️",
            Severity::Critical => "🔥",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One actionable observation about a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub rule_id: String,
    pub severity: Severity,
    pub text: String,
    /// Stable slug of the node label, usable as a link target
    pub anchor: String,
}

/// Inputs shared by all rules
pub struct InsightContext<'a> {
    pub analysis: &'a PlanAnalysis,
    pub config: &'a InsightConfig,
}

impl<'a> InsightContext<'a> {
    pub fn new(analysis: &'a PlanAnalysis, config: &'a InsightConfig) -> Self {
        Self { analysis, config }
    }

    /// Top hotspot, if any
    pub fn top_hotspot(&self) -> Option<&'a NodeStats> {
        self.analysis.hot().next()
    }

    /// Nodes in pre-order that the rule applies to
    pub fn applicable_nodes<R: InsightRule + ?Sized>(&self, rule: &R) -> Vec<&'a NodeStats> {
        self.analysis.nodes.iter().filter(|n| rule.applicable_to(n)).collect()
    }

    /// Build an insight anchored at `node`
    pub fn insight(&self, rule: &dyn InsightRule, severity: Severity, node: &NodeStats, text: String) -> Insight {
        Insight { rule_id: rule.id().to_string(), severity, text, anchor: anchor_id(node) }
    }
}

/// Insight rule trait
pub trait InsightRule: Send + Sync {
    /// Rule ID (e.g., "H001", "N001")
    fn id(&self) -> &str;

    /// Rule name
    fn name(&self) -> &str;

    /// Upper bound on messages this rule emits per plan
    fn max_messages(&self) -> usize {
        1
    }

    /// Check if rule applies to this node; plan-level rules accept everything
    fn applicable_to(&self, _node: &NodeStats) -> bool {
        true
    }

    /// Evaluate the rule and return its messages (already capped)
    fn evaluate(&self, context: &InsightContext) -> Vec<Insight>;
}

/// All insight rules in evaluation order
pub fn get_all_rules() -> Vec<Box<dyn InsightRule>> {
    vec![
        Box::new(hotspot::H001Hotspot),
        Box::new(drift::D001EstimateDrift),
        Box::new(buffer::B001BufferChurn),
        Box::new(parallel::P001ParallelLimit),
        Box::new(spill::S001DiskSpill),
        Box::new(nested_loop::N001NestedLoopAmplification),
    ]
}
