//! Plan analyzer
//!
//! Statistics pass, node ranking, numeric policy and the insight rule engine.

pub mod numeric;
pub mod rule_engine;
pub mod rules;
pub mod selection;
pub mod stats;

pub use rule_engine::{InsightEngine, build_messages};
pub use rules::{Insight, InsightRule, Severity};
pub use stats::{AnalyzeError, analyze};
