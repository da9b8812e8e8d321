//! Insight engine
//!
//! Runs the ordered rule list over one analysis and concatenates their messages.

use super::rules::{Insight, InsightContext, InsightRule, Severity, get_all_rules};
use crate::config::InsightConfig;
use crate::services::plan_analyzer::models::PlanAnalysis;

/// Insight engine over the registered rules
pub struct InsightEngine {
    rules: Vec<Box<dyn InsightRule>>,
    min_severity: Severity,
}

impl InsightEngine {
    /// Create an engine with all rules
    pub fn new() -> Self {
        Self { rules: get_all_rules(), min_severity: Severity::Info }
    }

    /// Create an engine over an explicit rule list (used in tests)
    pub fn with_rules(rules: Vec<Box<dyn InsightRule>>) -> Self {
        Self { rules, min_severity: Severity::Info }
    }

    /// Drop messages below `severity`
    pub fn with_min_severity(mut self, severity: Severity) -> Self {
        self.min_severity = severity;
        self
    }

    pub fn rule_ids(&self) -> Vec<&str> {
        self.rules.iter().map(|r| r.id()).collect()
    }

    /// Evaluate every rule in order
    pub fn build_messages(&self, analysis: &PlanAnalysis, config: &InsightConfig) -> Vec<Insight> {
        if analysis.is_empty() {
            return Vec::new();
        }

        let context = InsightContext::new(analysis, config);
        let mut out = Vec::new();

        for rule in &self.rules {
            let mut messages = rule.evaluate(&context);
            messages.truncate(rule.max_messages());
            if !messages.is_empty() {
                tracing::debug!("Rule {} ({}) produced {} message(s)", rule.id(), rule.name(), messages.len());
            }
            out.extend(messages.into_iter().filter(|m| m.severity >= self.min_severity));
        }

        out
    }
}

impl Default for InsightEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Build insight messages with the full rule set
pub fn build_messages(analysis: &PlanAnalysis, config: &InsightConfig) -> Vec<Insight> {
    InsightEngine::new().build_messages(analysis, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::plan_analyzer::analyzer::rules::hotspot::H001Hotspot;

    #[test]
    fn test_empty_analysis_has_no_messages() {
        let messages = build_messages(&PlanAnalysis::default(), &InsightConfig::default());
        assert!(messages.is_empty());
    }

    #[test]
    fn test_engine_rule_ids() {
        let engine = InsightEngine::default();
        assert_eq!(engine.rule_ids(), vec!["H001", "D001", "B001", "P001", "S001", "N001"]);
        let single = InsightEngine::with_rules(vec![Box::new(H001Hotspot)]);
        assert_eq!(single.rule_ids(), vec!["H001"]);
    }
}
