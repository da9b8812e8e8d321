use crate::config::{Config, ReportArgs, ReportMode};
use crate::services::plan_analyzer::render::{TerminalOptions, render};
use crate::services::plan_analyzer::{InsightEngine, PlanReport};
use crate::services::plan_loader::load_analysis;
use anyhow::Context;
use std::io::Write;

use super::open_output;

/// `plansight report`: analyze one plan and print it as a tree or JSON
pub fn handle_report(args: &ReportArgs, config: &Config) -> anyhow::Result<()> {
    let analysis = load_analysis(&args.input)?;
    let insights = InsightEngine::new()
        .with_min_severity(args.min_severity)
        .build_messages(&analysis, &config.insights);

    tracing::info!(
        "Report for {}: {} nodes, {} insights",
        args.input.display(),
        analysis.node_count,
        insights.len()
    );

    let mut out = open_output(args.out.as_deref())?;
    match args.mode {
        ReportMode::Text => {
            let options = terminal_options(args);
            render(&mut out, &analysis, &insights, &options).context("render plan tree")?;
        },
        ReportMode::Json => {
            let report = PlanReport { analysis, insights };
            serde_json::to_writer_pretty(&mut out, &report).context("serialize report")?;
            writeln!(out).context("write output")?;
        },
    }
    out.flush().context("flush output")?;
    Ok(())
}

/// Renderer options from the command line; colour is off when writing to a file
pub fn terminal_options(args: &ReportArgs) -> TerminalOptions {
    TerminalOptions {
        enable_color: !args.no_color && args.out.is_none(),
        max_depth: args.max_depth,
        show_warnings: !args.hide_warnings,
        ..Default::default()
    }
}
