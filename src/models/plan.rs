//! Execution plan model
//!
//! Typed, immutable representation of one `EXPLAIN` document. Produced by the plan parser and
//! consumed read-only by the analyzer. Every numeric field defaults to zero when the source
//! document does not carry it (plain `EXPLAIN` without `ANALYZE` has no runtime statistics).

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

// ============================================================================
// Explain Document
// ============================================================================

/// Root of a parsed execution plan document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Explain {
    /// Root plan node, `None` when the document had no usable `Plan`
    pub plan: Option<PlanNode>,
    /// Planning time in milliseconds
    pub planning_time_ms: f64,
    /// Execution time in milliseconds as reported by the database
    pub execution_time_ms: f64,
    /// Planner settings that differ from the server defaults
    pub settings: BTreeMap<String, String>,
    /// Top-level fields the parser does not interpret
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl Explain {
    /// Create a document around a root node
    pub fn new(root: PlanNode) -> Self {
        Self { plan: Some(root), ..Default::default() }
    }

    /// Set the planning time
    pub fn with_planning_time(mut self, ms: f64) -> Self {
        self.planning_time_ms = ms;
        self
    }

    /// Set the execution time
    pub fn with_execution_time(mut self, ms: f64) -> Self {
        self.execution_time_ms = ms;
        self
    }
}

// ============================================================================
// Plan Node
// ============================================================================

/// One operator of the execution plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PlanNode {
    /// Path identifier: "0" for the root, "0.1" for its second child, ...
    pub id: String,
    pub node_type: String,
    pub relation_name: Option<String>,
    pub schema: Option<String>,
    pub alias: Option<String>,
    pub parent_relationship: Option<String>,
    pub join_type: Option<String>,
    pub index_name: Option<String>,
    pub filter: Option<String>,
    pub hash_cond: Option<String>,
    pub merge_cond: Option<String>,

    pub startup_cost: f64,
    pub total_cost: f64,
    pub plan_rows: f64,
    pub plan_width: f64,

    pub actual_startup_time: f64,
    /// Time per loop in milliseconds
    pub actual_total_time: f64,
    /// Rows per loop
    pub actual_rows: f64,
    /// Zero when the plan carries no runtime statistics
    pub actual_loops: f64,

    pub workers_planned: f64,
    pub workers_launched: f64,

    pub output: Vec<String>,
    pub sort_key: Vec<String>,
    pub group_key: Vec<String>,

    pub buffers: Buffers,
    /// Per-node fields the parser does not interpret
    pub extra: serde_json::Map<String, serde_json::Value>,
    pub children: Vec<PlanNode>,
}

impl PlanNode {
    /// Create a node with the given operator name
    pub fn new(node_type: impl Into<String>) -> Self {
        Self { node_type: node_type.into(), ..Default::default() }
    }

    pub fn with_relation(mut self, relation: impl Into<String>) -> Self {
        self.relation_name = Some(relation.into());
        self
    }

    pub fn with_alias(mut self, alias: impl Into<String>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    pub fn with_index(mut self, index_name: impl Into<String>) -> Self {
        self.index_name = Some(index_name.into());
        self
    }

    pub fn with_join_type(mut self, join_type: impl Into<String>) -> Self {
        self.join_type = Some(join_type.into());
        self
    }

    /// Set the planner's row estimate
    pub fn with_plan_rows(mut self, rows: f64) -> Self {
        self.plan_rows = rows;
        self
    }

    /// Set runtime statistics (per-loop time in ms, per-loop rows, loop count)
    pub fn with_actuals(mut self, total_time_ms: f64, rows: f64, loops: f64) -> Self {
        self.actual_total_time = total_time_ms;
        self.actual_rows = rows;
        self.actual_loops = loops;
        self
    }

    pub fn with_buffers(mut self, buffers: Buffers) -> Self {
        self.buffers = buffers;
        self
    }

    /// Append a child node
    pub fn with_child(mut self, child: PlanNode) -> Self {
        self.children.push(child);
        self
    }

    /// Copy of this node without its subtree
    pub fn detached(&self) -> Self {
        Self {
            id: self.id.clone(),
            node_type: self.node_type.clone(),
            relation_name: self.relation_name.clone(),
            schema: self.schema.clone(),
            alias: self.alias.clone(),
            parent_relationship: self.parent_relationship.clone(),
            join_type: self.join_type.clone(),
            index_name: self.index_name.clone(),
            filter: self.filter.clone(),
            hash_cond: self.hash_cond.clone(),
            merge_cond: self.merge_cond.clone(),
            startup_cost: self.startup_cost,
            total_cost: self.total_cost,
            plan_rows: self.plan_rows,
            plan_width: self.plan_width,
            actual_startup_time: self.actual_startup_time,
            actual_total_time: self.actual_total_time,
            actual_rows: self.actual_rows,
            actual_loops: self.actual_loops,
            workers_planned: self.workers_planned,
            workers_launched: self.workers_launched,
            output: self.output.clone(),
            sort_key: self.sort_key.clone(),
            group_key: self.group_key.clone(),
            buffers: self.buffers.clone(),
            extra: self.extra.clone(),
            children: Vec::new(),
        }
    }

    /// Assign path identifiers to this subtree, starting from `id`
    pub fn assign_ids(&mut self, id: &str) {
        self.id = id.to_string();
        for (i, child) in self.children.iter_mut().enumerate() {
            child.assign_ids(&format!("{}.{}", id, i));
        }
    }

    /// Number of nodes in this subtree (including self)
    pub fn node_count(&self) -> usize {
        1 + self.children.iter().map(|c| c.node_count()).sum::<usize>()
    }

    /// Whether the node carries `EXPLAIN ANALYZE` runtime statistics
    pub fn has_runtime_stats(&self) -> bool {
        self.actual_loops > 0.0
    }
}

// ============================================================================
// Buffers
// ============================================================================

/// Buffer usage counters reported by `EXPLAIN (BUFFERS)`, in blocks
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Buffers {
    pub shared_hit: i64,
    pub shared_read: i64,
    pub shared_dirtied: i64,
    pub shared_written: i64,
    pub local_hit: i64,
    pub local_read: i64,
    pub local_dirtied: i64,
    pub local_written: i64,
    pub temp_read: i64,
    pub temp_written: i64,
    pub io_read_time_ms: f64,
    pub io_write_time_ms: f64,
    pub block_read_time_ms: f64,
}

impl Buffers {
    /// Shared buffers only (hit + read), the common case for table scans
    pub fn shared(hit: i64, read: i64) -> Self {
        Self { shared_hit: hit, shared_read: read, ..Default::default() }
    }

    /// Temp file traffic only
    pub fn temp(read: i64, written: i64) -> Self {
        Self { temp_read: read, temp_written: written, ..Default::default() }
    }
}
