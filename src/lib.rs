//! plansight library
//!
//! PostgreSQL execution plan analysis: parsing `EXPLAIN (FORMAT JSON)` output, per-node
//! statistics, heuristic insights, plan-to-plan diffs and a terminal tree renderer.

pub mod config;
pub mod handlers;
pub mod logging;
pub mod models;
pub mod services;
pub mod utils;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use config::Config;
pub use models::{Explain, PlanNode};
pub use services::plan_analyzer::{
    Insight, PlanAnalysis, PlanError, PlanReport, Report, Severity, analyze, analyze_plan, compare,
};
pub use services::plan_loader::{LoadError, load_analysis, load_explain};
