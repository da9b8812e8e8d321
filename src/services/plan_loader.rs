//! Plan loading service
//!
//! Reads a plan document from a file (or stdin for `-`), parses and analyzes it.

use crate::models::Explain;
use crate::services::plan_analyzer::{AnalyzeError, ExplainParser, ParseError, PlanAnalysis, analyze};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("open plan {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse plan {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("analyze plan {path}: {source}")]
    Analyze {
        path: PathBuf,
        #[source]
        source: AnalyzeError,
    },
}

fn is_stdin(path: &Path) -> bool {
    path.as_os_str() == "-"
}

/// Read and parse one plan document
pub fn load_explain(path: &Path) -> Result<Explain, LoadError> {
    let parsed = if is_stdin(path) {
        ExplainParser::parse_reader(std::io::stdin().lock())
    } else {
        let file = File::open(path).map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
        ExplainParser::parse_reader(BufReader::new(file))
    };
    parsed.map_err(|source| LoadError::Parse { path: path.to_path_buf(), source })
}

/// Plain `EXPLAIN` output carries estimates only, so every time and share is zero
fn lacks_runtime_stats(explain: &Explain) -> bool {
    explain.plan.as_ref().is_some_and(|root| !root.has_runtime_stats())
}

/// Read, parse and analyze one plan document
pub fn load_analysis(path: &Path) -> Result<PlanAnalysis, LoadError> {
    let explain = load_explain(path)?;
    if lacks_runtime_stats(&explain) {
        tracing::warn!("Plan {} has no runtime statistics; run EXPLAIN (ANALYZE, FORMAT JSON)", path.display());
    }
    let analysis =
        analyze(&explain).map_err(|source| LoadError::Analyze { path: path.to_path_buf(), source })?;
    tracing::info!("Loaded plan {} ({} nodes)", path.display(), analysis.node_count);
    Ok(analysis)
}
