pub mod plan_analyzer;
pub mod plan_loader;

pub use plan_analyzer::{PlanReport, analyze_plan};
pub use plan_loader::{LoadError, load_analysis, load_explain};
