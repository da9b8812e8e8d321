//! Labels and anchors shared by the insight rules and renderers

use crate::services::plan_analyzer::models::NodeStats;
use crate::utils::StringExt;
use once_cell::sync::Lazy;
use regex::Regex;

/// Labels longer than this are shortened in inline summaries
pub const COMPACT_LABEL_MAX: usize = 60;

/// Runs of characters that are not allowed in an anchor
static ANCHOR_SEPARATOR_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").unwrap());

/// Node types that only pass rows through from their input
const WRAPPER_NODE_TYPES: &[&str] =
    &["Limit", "Sort", "Gather", "Gather Merge", "Incremental Sort", "Unique", "Materialize"];

/// Descriptive label: `Seq Scan orders (o)`
pub fn node_label(stats: &NodeStats) -> String {
    let node = &stats.node;
    let mut label = node.node_type.clone();
    match (&node.relation_name, &node.alias) {
        (Some(relation), alias) => {
            label.push(' ');
            label.push_str(relation);
            if let Some(alias) = alias
                && alias != relation
            {
                label.push_str(&format!(" ({})", alias));
            }
        },
        (None, Some(alias)) => label.push_str(&format!(" ({})", alias)),
        (None, None) => {},
    }
    label
}

/// Label shortened for inline summaries
pub fn compact_label(stats: &NodeStats) -> String {
    node_label(stats).ellipsize(COMPACT_LABEL_MAX)
}

/// Lower-cased label with every run of non-alphanumerics collapsed to one hyphen
pub fn anchor_id(stats: &NodeStats) -> String {
    let lower = node_label(stats).to_lowercase();
    ANCHOR_SEPARATOR_REGEX.replace_all(&lower, "-").trim_matches('-').to_string()
}

pub fn is_wrapper_node(node_type: &str) -> bool {
    WRAPPER_NODE_TYPES.contains(&node_type)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Explain, PlanNode};
    use crate::services::plan_analyzer::analyzer::analyze;

    fn single(node: PlanNode) -> NodeStats {
        analyze(&Explain::new(node)).unwrap().nodes.remove(0)
    }

    #[test]
    fn test_node_label_variants() {
        let plain = single(PlanNode::new("Hash"));
        assert_eq!(node_label(&plain), "Hash");

        let same_alias = single(PlanNode::new("Seq Scan").with_relation("users").with_alias("users"));
        assert_eq!(node_label(&same_alias), "Seq Scan users");

        let aliased = single(PlanNode::new("Index Scan").with_relation("orders").with_alias("o"));
        assert_eq!(node_label(&aliased), "Index Scan orders (o)");

        let alias_only = single(PlanNode::new("CTE Scan").with_alias("recent"));
        assert_eq!(node_label(&alias_only), "CTE Scan (recent)");
    }

    #[test]
    fn test_anchor_id() {
        let aliased = single(PlanNode::new("Index Scan").with_relation("orders").with_alias("o"));
        assert_eq!(anchor_id(&aliased), "index-scan-orders-o");

        let odd = single(PlanNode::new("Seq Scan").with_relation("public.Weird/Name"));
        assert_eq!(anchor_id(&odd), "seq-scan-public-weird-name");
    }

    #[test]
    fn test_compact_label_truncates() {
        let long = single(PlanNode::new("Seq Scan").with_relation("x".repeat(80)));
        let label = compact_label(&long);
        assert_eq!(label.chars().count(), COMPACT_LABEL_MAX);
        assert!(label.ends_with("..."));
    }

    #[test]
    fn test_wrapper_nodes() {
        assert!(is_wrapper_node("Gather Merge"));
        assert!(!is_wrapper_node("Seq Scan"));
    }
}
