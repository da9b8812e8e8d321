//! PostgreSQL `EXPLAIN (FORMAT JSON)` parser
//!
//! Accepts both the array form emitted by the server (`[{"Plan": {...}, ...}]`) and a bare
//! top-level object. Produces an [`Explain`] with path identifiers assigned to every node and
//! unknown fields preserved in `extra`.

use super::error::{ParseError, ParseResult};
use super::value_parser::ValueParser;
use crate::models::{Buffers, Explain, PlanNode};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::io::Read;

/// Top-level keys interpreted by the parser
const KNOWN_TOP_LEVEL_KEYS: &[&str] = &["Plan", "Planning Time", "Execution Time", "Settings"];

/// Per-node keys interpreted by the parser
const KNOWN_NODE_KEYS: &[&str] = &[
    "Node Type",
    "Relation Name",
    "Schema",
    "Alias",
    "Parent Relationship",
    "Startup Cost",
    "Total Cost",
    "Plan Rows",
    "Plan Width",
    "Actual Startup Time",
    "Actual Total Time",
    "Actual Rows",
    "Actual Loops",
    "Workers Planned",
    "Workers Launched",
    "Output",
    "Filter",
    "Join Type",
    "Index Name",
    "Hash Cond",
    "Merge Cond",
    "Sort Key",
    "Group Key",
    "Plans",
    "Shared Hit Blocks",
    "Shared Read Blocks",
    "Shared Dirtied Blocks",
    "Shared Written Blocks",
    "Local Hit Blocks",
    "Local Read Blocks",
    "Local Dirtied Blocks",
    "Local Written Blocks",
    "Temp Read Blocks",
    "Temp Written Blocks",
    "I/O Read Time",
    "I/O Write Time",
    "Block Read Time",
];

/// Parser for JSON execution plans
pub struct ExplainParser;

impl ExplainParser {
    /// Parse a plan document from text
    pub fn parse(text: &str) -> ParseResult<Explain> {
        let payload: Value = serde_json::from_str(text)?;
        Self::parse_value(&payload)
    }

    /// Parse a plan document from a reader
    pub fn parse_reader<R: Read>(mut reader: R) -> ParseResult<Explain> {
        let mut text = String::new();
        reader.read_to_string(&mut text)?;
        Self::parse(&text)
    }

    /// Parse an already decoded JSON payload
    pub fn parse_value(payload: &Value) -> ParseResult<Explain> {
        let entry = Self::pick_first_entry(payload)?;

        let plan_value = entry.get("Plan").ok_or(ParseError::MissingPlan)?;
        let plan_obj = plan_value.as_object().ok_or_else(|| ParseError::InvalidNode {
            path: "0".to_string(),
            reason: format!("expected object, got {}", json_type_name(plan_value)),
        })?;

        let root = Self::parse_node(plan_obj, "0")?;

        let extra = entry
            .iter()
            .filter(|(k, _)| !KNOWN_TOP_LEVEL_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        let explain = Explain {
            plan: Some(root),
            planning_time_ms: ValueParser::as_f64(entry.get("Planning Time")),
            execution_time_ms: ValueParser::as_f64(entry.get("Execution Time")),
            settings: Self::parse_settings(entry.get("Settings")),
            extra,
        };

        tracing::debug!(
            "Parsed plan: {} nodes, planning {:.3} ms, execution {:.3} ms",
            explain.plan.as_ref().map(PlanNode::node_count).unwrap_or(0),
            explain.planning_time_ms,
            explain.execution_time_ms
        );

        Ok(explain)
    }

    fn pick_first_entry(payload: &Value) -> ParseResult<&Map<String, Value>> {
        match payload {
            Value::Array(items) => {
                let first = items.first().ok_or(ParseError::EmptyPayload)?;
                first.as_object().ok_or_else(|| {
                    ParseError::UnexpectedTopLevel(format!("array of {}", json_type_name(first)))
                })
            },
            Value::Object(obj) => Ok(obj),
            other => Err(ParseError::UnexpectedTopLevel(json_type_name(other).to_string())),
        }
    }

    fn parse_node(data: &Map<String, Value>, path: &str) -> ParseResult<PlanNode> {
        let mut node = PlanNode {
            id: path.to_string(),
            node_type: ValueParser::as_string(data.get("Node Type")).unwrap_or_default(),
            relation_name: ValueParser::as_string(data.get("Relation Name")),
            schema: ValueParser::as_string(data.get("Schema")),
            alias: ValueParser::as_string(data.get("Alias")),
            parent_relationship: ValueParser::as_string(data.get("Parent Relationship")),
            join_type: ValueParser::as_string(data.get("Join Type")),
            index_name: ValueParser::as_string(data.get("Index Name")),
            filter: ValueParser::as_string(data.get("Filter")),
            hash_cond: ValueParser::as_string(data.get("Hash Cond")),
            merge_cond: ValueParser::as_string(data.get("Merge Cond")),
            startup_cost: ValueParser::as_f64(data.get("Startup Cost")),
            total_cost: ValueParser::as_f64(data.get("Total Cost")),
            plan_rows: ValueParser::as_f64(data.get("Plan Rows")),
            plan_width: ValueParser::as_f64(data.get("Plan Width")),
            actual_startup_time: ValueParser::as_f64(data.get("Actual Startup Time")),
            actual_total_time: ValueParser::as_f64(data.get("Actual Total Time")),
            actual_rows: ValueParser::as_f64(data.get("Actual Rows")),
            actual_loops: ValueParser::as_f64(data.get("Actual Loops")),
            workers_planned: ValueParser::as_f64(data.get("Workers Planned")),
            workers_launched: ValueParser::as_f64(data.get("Workers Launched")),
            output: ValueParser::as_string_list(data.get("Output")),
            sort_key: ValueParser::as_string_list(data.get("Sort Key")),
            group_key: ValueParser::as_string_list(data.get("Group Key")),
            buffers: Self::parse_buffers(data),
            extra: Map::new(),
            children: Vec::new(),
        };

        if let Some(plans) = data.get("Plans").and_then(Value::as_array) {
            for (i, child) in plans.iter().enumerate() {
                let child_path = format!("{}.{}", path, i);
                let child_obj = child.as_object().ok_or_else(|| ParseError::InvalidNode {
                    path: child_path.clone(),
                    reason: format!("expected object, got {}", json_type_name(child)),
                })?;
                node.children.push(Self::parse_node(child_obj, &child_path)?);
            }
        }

        node.extra = data
            .iter()
            .filter(|(k, _)| !KNOWN_NODE_KEYS.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();

        Ok(node)
    }

    fn parse_buffers(data: &Map<String, Value>) -> Buffers {
        Buffers {
            shared_hit: ValueParser::as_i64(data.get("Shared Hit Blocks")),
            shared_read: ValueParser::as_i64(data.get("Shared Read Blocks")),
            shared_dirtied: ValueParser::as_i64(data.get("Shared Dirtied Blocks")),
            shared_written: ValueParser::as_i64(data.get("Shared Written Blocks")),
            local_hit: ValueParser::as_i64(data.get("Local Hit Blocks")),
            local_read: ValueParser::as_i64(data.get("Local Read Blocks")),
            local_dirtied: ValueParser::as_i64(data.get("Local Dirtied Blocks")),
            local_written: ValueParser::as_i64(data.get("Local Written Blocks")),
            temp_read: ValueParser::as_i64(data.get("Temp Read Blocks")),
            temp_written: ValueParser::as_i64(data.get("Temp Written Blocks")),
            io_read_time_ms: ValueParser::as_f64(data.get("I/O Read Time")),
            io_write_time_ms: ValueParser::as_f64(data.get("I/O Write Time")),
            block_read_time_ms: ValueParser::as_f64(data.get("Block Read Time")),
        }
    }

    /// Settings come either as an object or as `[{"Name": .., "Setting": ..}]`
    fn parse_settings(value: Option<&Value>) -> BTreeMap<String, String> {
        let mut settings = BTreeMap::new();
        match value {
            Some(Value::Object(obj)) => {
                for (name, v) in obj {
                    if let Some(setting) = ValueParser::as_string(Some(v)) {
                        settings.insert(name.clone(), setting);
                    }
                }
            },
            Some(Value::Array(items)) => {
                for item in items.iter().filter_map(Value::as_object) {
                    let name = ValueParser::as_string(item.get("Name"))
                        .or_else(|| ValueParser::as_string(item.get("name")));
                    let setting = ValueParser::as_string(item.get("Setting"))
                        .or_else(|| ValueParser::as_string(item.get("value")));
                    if let (Some(name), Some(setting)) = (name, setting) {
                        settings.insert(name, setting);
                    }
                }
            },
            _ => {},
        }
        settings
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SIMPLE_PLAN: &str = r#"[
      {
        "Plan": {
          "Node Type": "Hash Join",
          "Join Type": "Inner",
          "Plan Rows": 120,
          "Actual Total Time": 8.5,
          "Actual Rows": 118,
          "Actual Loops": 1,
          "Hash Cond": "(o.user_id = u.id)",
          "Plans": [
            {
              "Node Type": "Seq Scan",
              "Relation Name": "orders",
              "Alias": "o",
              "Plan Rows": "1000",
              "Actual Rows": 1000,
              "Actual Loops": 1,
              "Shared Hit Blocks": 40,
              "Shared Read Blocks": 2,
              "Rows Removed by Filter": 12
            },
            {
              "Node Type": "Hash",
              "Plans": [
                { "Node Type": "Seq Scan", "Relation Name": "users", "Alias": "u" }
              ]
            }
          ]
        },
        "Planning Time": 0.42,
        "Execution Time": 9.1,
        "Settings": [{ "Name": "work_mem", "Setting": "64MB" }],
        "Triggers": []
      }
    ]"#;

    #[test]
    fn test_parse_array_form() {
        let explain = ExplainParser::parse(SIMPLE_PLAN).unwrap();
        let root = explain.plan.as_ref().unwrap();

        assert_eq!(root.id, "0");
        assert_eq!(root.node_type, "Hash Join");
        assert_eq!(root.join_type.as_deref(), Some("Inner"));
        assert_eq!(root.children.len(), 2);
        assert_eq!(root.children[1].children[0].id, "0.1.0");
        assert_eq!(explain.planning_time_ms, 0.42);
        assert_eq!(explain.execution_time_ms, 9.1);
        assert_eq!(explain.settings.get("work_mem").map(String::as_str), Some("64MB"));
    }

    #[test]
    fn test_parse_preserves_unknown_fields() {
        let explain = ExplainParser::parse(SIMPLE_PLAN).unwrap();
        let root = explain.plan.as_ref().unwrap();
        let orders = &root.children[0];

        assert!(explain.extra.contains_key("Triggers"));
        assert!(orders.extra.contains_key("Rows Removed by Filter"));
        assert!(!orders.extra.contains_key("Shared Hit Blocks"));
        assert_eq!(orders.plan_rows, 1000.0);
        assert_eq!(orders.buffers.shared_hit, 40);
        assert_eq!(orders.buffers.shared_read, 2);
    }

    #[test]
    fn test_parse_bare_object() {
        let explain = ExplainParser::parse(r#"{"Plan": {"Node Type": "Result"}}"#).unwrap();
        let root = explain.plan.unwrap();
        assert_eq!(root.node_type, "Result");
        assert_eq!(root.actual_loops, 0.0);
        assert!(!root.has_runtime_stats());
    }

    #[test]
    fn test_parse_errors() {
        assert!(matches!(ExplainParser::parse("[]"), Err(ParseError::EmptyPayload)));
        assert!(matches!(ExplainParser::parse(r#"[{"Foo": 1}]"#), Err(ParseError::MissingPlan)));
        assert!(matches!(ExplainParser::parse("42"), Err(ParseError::UnexpectedTopLevel(_))));
        assert!(matches!(ExplainParser::parse("{not json"), Err(ParseError::InvalidJson(_))));
        assert!(matches!(
            ExplainParser::parse(r#"{"Plan": {"Node Type": "Append", "Plans": [1]}}"#),
            Err(ParseError::InvalidNode { .. })
        ));
    }

    #[test]
    fn test_parse_settings_object_form() {
        let explain = ExplainParser::parse(
            r#"{"Plan": {"Node Type": "Result"}, "Settings": {"jit": "off", "work_mem": 4096}}"#,
        )
        .unwrap();
        assert_eq!(explain.settings.get("jit").map(String::as_str), Some("off"));
        assert_eq!(explain.settings.get("work_mem").map(String::as_str), Some("4096"));
    }
}
