//! Plan analysis data models
//!
//! Per-node statistics derived from one parsed plan, stored in a pre-order arena. Renderers and
//! the diff engine consume these read-only.

use crate::models::{Buffers, PlanNode};
use serde::{Serialize, Serializer};

// ============================================================================
// Serialization Helpers
// ============================================================================

/// Serialize a ratio that may be `+inf` as the string `"Infinity"`
pub fn serialize_factor<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.is_infinite() {
        serializer.serialize_str(if *value > 0.0 { "Infinity" } else { "-Infinity" })
    } else if value.is_nan() {
        serializer.serialize_f64(0.0)
    } else {
        serializer.serialize_f64(*value)
    }
}

// ============================================================================
// Buffer Totals
// ============================================================================

/// Block counters of one node
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BufferTotals {
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
}

impl BufferTotals {
    /// Sum of all ten counters, saturating at the i64 bounds
    pub fn total(&self) -> i64 {
        [
            self.shared_hit,
            self.shared_read,
            self.shared_dirtied,
            self.shared_written,
            self.local_hit,
            self.local_read,
            self.local_dirtied,
            self.local_written,
            self.temp_read,
            self.temp_written,
        ]
        .into_iter()
        .fold(0i64, i64::saturating_add)
    }

    /// Temp read + temp written
    pub fn temp_blocks(&self) -> i64 {
        self.temp_read.saturating_add(self.temp_written)
    }
}

impl From<&Buffers> for BufferTotals {
    fn from(b: &Buffers) -> Self {
        Self {
            shared_hit: b.shared_hit,
            shared_read: b.shared_read,
            shared_dirtied: b.shared_dirtied,
            shared_written: b.shared_written,
            local_hit: b.local_hit,
            local_read: b.local_read,
            local_dirtied: b.local_dirtied,
            local_written: b.local_written,
            temp_read: b.temp_read,
            temp_written: b.temp_written,
        }
    }
}

// ============================================================================
// Node Statistics
// ============================================================================

/// Derived statistics for one plan node
#[derive(Debug, Clone, Serialize)]
pub struct NodeStats {
    /// Pre-order position, also the node's identity inside the analysis
    pub index: usize,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
    pub depth: usize,
    /// The node's own fields, children detached
    pub node: PlanNode,
    pub loops: f64,
    pub inclusive_time_ms: f64,
    pub exclusive_time_ms: f64,
    /// Fraction of the root inclusive time, `[0, 1]`
    pub exclusive_share: f64,
    pub inclusive_share: f64,
    pub actual_rows_total: f64,
    pub estimated_rows_total: f64,
    #[serde(serialize_with = "serialize_factor")]
    pub row_estimate_factor: f64,
    pub buffers: BufferTotals,
    pub warnings: Vec<String>,
}

impl NodeStats {
    pub fn node_type(&self) -> &str {
        &self.node.node_type
    }

    pub fn has_buffers(&self) -> bool {
        self.buffers.total() > 0
    }
}

// ============================================================================
// Plan Analysis
// ============================================================================

/// Full analysis of one plan
#[derive(Debug, Clone, Default, Serialize)]
pub struct PlanAnalysis {
    /// Arena in pre-order, root at index 0
    pub nodes: Vec<NodeStats>,
    pub planning_time_ms: f64,
    /// Execution time as reported by the document
    pub execution_time_ms: f64,
    /// Root inclusive time
    pub total_time_ms: f64,
    pub node_count: usize,
    /// Ranked hotspot indices
    pub hot_nodes: Vec<usize>,
    /// Ranked estimate-divergence indices
    pub divergent_nodes: Vec<usize>,
    /// Ranked buffer-heavy indices
    pub buffer_heavy: Vec<usize>,
}

impl PlanAnalysis {
    pub fn root(&self) -> Option<&NodeStats> {
        self.nodes.first()
    }

    pub fn node(&self, index: usize) -> Option<&NodeStats> {
        self.nodes.get(index)
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn parent_of(&self, index: usize) -> Option<&NodeStats> {
        self.node(index)?.parent.and_then(|p| self.node(p))
    }

    pub fn children_of(&self, index: usize) -> impl Iterator<Item = &NodeStats> {
        self.node(index)
            .map(|n| n.children.as_slice())
            .unwrap_or_default()
            .iter()
            .filter_map(|&c| self.node(c))
    }

    /// Hotspot nodes in rank order
    pub fn hot(&self) -> impl Iterator<Item = &NodeStats> {
        self.hot_nodes.iter().filter_map(|&i| self.node(i))
    }

    /// Divergent nodes in rank order
    pub fn divergent(&self) -> impl Iterator<Item = &NodeStats> {
        self.divergent_nodes.iter().filter_map(|&i| self.node(i))
    }

    /// Buffer-heavy nodes in rank order
    pub fn heavy(&self) -> impl Iterator<Item = &NodeStats> {
        self.buffer_heavy.iter().filter_map(|&i| self.node(i))
    }

    /// Number of nodes in the subtree rooted at `index` (including itself)
    pub fn subtree_size(&self, index: usize) -> usize {
        1 + self
            .children_of(index)
            .map(|c| self.subtree_size(c.index))
            .sum::<usize>()
    }
}
