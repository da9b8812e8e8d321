use crate::config::{Config, DiffArgs, DiffFormat};
use crate::services::plan_analyzer::{DiffOptions, compare};
use crate::services::plan_loader::load_analysis;
use anyhow::Context;

use super::write_output;

/// `plansight diff`: compare a base and a target plan
pub fn handle_diff(args: &DiffArgs, config: &Config) -> anyhow::Result<()> {
    let base = load_analysis(&args.base)?;
    let target = load_analysis(&args.target)?;

    let options = diff_options(args);
    let report = compare(&base, &target, &options, config).context("compare plans")?;

    tracing::info!(
        "Diff {} -> {}: {} regressions, {} improvements",
        args.base.display(),
        args.target.display(),
        report.regressions.len(),
        report.improvements.len()
    );

    let content = match args.format {
        DiffFormat::Md => report.to_markdown(),
        DiffFormat::Json => report.to_json().context("serialize diff")?,
    };
    write_output(args.out.as_deref(), &content)
}

/// Thresholds from the command line; unset flags fall back to the config
pub fn diff_options(args: &DiffArgs) -> DiffOptions {
    DiffOptions {
        min_self_delta_ms: args.min_delta.unwrap_or(0.0),
        min_percent_change: args.min_percent.unwrap_or(0.0),
        max_items: args.limit.unwrap_or(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn fixture(name: &str) -> PathBuf {
        PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/plans").join(name)
    }

    fn args(format: DiffFormat, out: PathBuf) -> DiffArgs {
        DiffArgs {
            base: fixture("nloop_base.json"),
            target: fixture("nloop_index.json"),
            format,
            out: Some(out),
            min_delta: None,
            min_percent: None,
            limit: None,
            config: None,
        }
    }

    fn out_path(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("plansight-diff-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir.join(name)
    }

    #[test]
    fn test_diff_options_fall_back_to_config() {
        let config = Config::default();
        let a = args(DiffFormat::Md, out_path("unused.md"));
        let options = diff_options(&a).apply_defaults(&config);
        assert_eq!(options.min_self_delta_ms, config.diff.min_self_delta_ms);
        assert_eq!(options.max_items, config.diff.max_items);

        let mut a = a;
        a.min_delta = Some(5.0);
        a.limit = Some(1);
        let options = diff_options(&a).apply_defaults(&config);
        assert_eq!(options.min_self_delta_ms, 5.0);
        assert_eq!(options.max_items, 1);
    }

    #[test]
    fn test_markdown_diff_to_file() {
        let out = out_path("diff.md");
        handle_diff(&args(DiffFormat::Md, out.clone()), &Config::default()).unwrap();
        let md = std::fs::read_to_string(&out).unwrap();
        assert!(md.starts_with("# plansight diff"));
        assert!(md.contains("Seq Scan · users"));
    }

    #[test]
    fn test_json_diff_to_file() {
        let out = out_path("diff.json");
        handle_diff(&args(DiffFormat::Json, out.clone()), &Config::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(&out).unwrap()).unwrap();
        assert_eq!(value["improvements"][0]["signature"], "Seq Scan · users");
        assert!(value["summary"]["delta_execution_ms"].as_f64().unwrap() < 0.0);
    }

    #[test]
    fn test_missing_base_fails() {
        let mut a = args(DiffFormat::Md, out_path("missing.md"));
        a.base = fixture("does_not_exist.json");
        let err = handle_diff(&a, &Config::default()).unwrap_err();
        assert!(err.to_string().contains("open plan"));
    }
}
