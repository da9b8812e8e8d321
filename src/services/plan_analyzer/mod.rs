//! PostgreSQL Plan Analyzer
//!
//! Parses `EXPLAIN (ANALYZE, BUFFERS, FORMAT JSON)` output, derives per-node statistics,
//! produces heuristic insights and compares two plans of the same query.
//!
//! # Architecture
//!
//! ```text
//! plan document ──► parser ──► Explain ──► analyzer ──► PlanAnalysis ──┬──► rule engine ──► insights
//!                                                                     ├──► render::terminal
//!                            PlanAnalysis (base) + PlanAnalysis ──────┴──► diff ──► Report (md/json)
//! ```
//!
//! # Usage
//!
//! ```ignore
//! use plansight::config::Config;
//! use plansight::services::plan_analyzer::analyze_plan;
//!
//! let report = analyze_plan(plan_json, &Config::default())?;
//! for insight in &report.insights {
//!     println!("{} {}", insight.severity, insight.text);
//! }
//! ```

pub mod analyzer;
pub mod diff;
pub mod models;
pub mod parser;
pub mod render;


pub use analyzer::{AnalyzeError, Insight, InsightEngine, Severity, analyze, build_messages};
pub use diff::{DiffError, DiffOptions, Report, compare};
pub use models::*;
pub use parser::{ExplainParser, ParseError};

use crate::config::Config;
use serde::Serialize;

/// One analyzed plan together with its insights
#[derive(Debug, Clone, Serialize)]
pub struct PlanReport {
    pub analysis: PlanAnalysis,
    pub insights: Vec<Insight>,
}

/// Errors of the text-to-report pipeline
#[derive(Debug, thiserror::Error)]
pub enum PlanError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Analyze(#[from] AnalyzeError),
}

/// Parse, analyze and build insights for one plan document
pub fn analyze_plan(plan_text: &str, config: &Config) -> Result<PlanReport, PlanError> {
    let explain = ExplainParser::parse(plan_text)?;
    let analysis = analyze(&explain)?;
    let insights = build_messages(&analysis, &config.insights);
    Ok(PlanReport { analysis, insights })
}
