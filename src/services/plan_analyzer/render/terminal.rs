//! Plain-text tree renderer
//!
//! Prints a header, the insight list and an ASCII tree where each operator line carries its
//! self time, share bar, row estimate and buffer usage.

use crate::services::plan_analyzer::analyzer::Insight;
use crate::services::plan_analyzer::analyzer::numeric::format_factor;
use crate::services::plan_analyzer::analyzer::rules::node_label;
use crate::services::plan_analyzer::models::{NodeStats, PlanAnalysis};
use crate::utils::format::humanize_buffers;
use std::io::Write;

pub const DEFAULT_BAR_WIDTH: usize = 20;

const ANSI_RED: &str = "\x1b[31m";
const ANSI_YELLOW: &str = "\x1b[33m";
const ANSI_CYAN: &str = "\x1b[36m";
const ANSI_RESET: &str = "\x1b[0m";

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("render: empty analysis")]
    EmptyAnalysis,

    #[error("render: {0}")]
    Io(#[from] std::io::Error),
}

/// Terminal renderer options
#[derive(Debug, Clone)]
pub struct TerminalOptions {
    pub enable_color: bool,
    /// Collapse subtrees below this depth; `None` renders everything
    pub max_depth: Option<usize>,
    pub show_warnings: bool,
    pub bar_width: usize,
}

impl Default for TerminalOptions {
    fn default() -> Self {
        Self { enable_color: true, max_depth: None, show_warnings: true, bar_width: DEFAULT_BAR_WIDTH }
    }
}

/// Render `analysis` and its insights to `w`
pub fn render<W: Write>(
    w: &mut W,
    analysis: &PlanAnalysis,
    insights: &[Insight],
    options: &TerminalOptions,
) -> Result<(), RenderError> {
    let root = analysis.root().ok_or(RenderError::EmptyAnalysis)?;
    let mut options = options.clone();
    if options.bar_width == 0 {
        options.bar_width = DEFAULT_BAR_WIDTH;
    }

    writeln!(w, "Execution time {:.3} ms (planning {:.3} ms)", analysis.total_time_ms, analysis.planning_time_ms)?;
    writeln!(
        w,
        "Nodes {} | Hot nodes >=10% runtime {} | Divergent estimates {}\n",
        analysis.node_count,
        analysis.hot_nodes.len(),
        analysis.divergent_nodes.len()
    )?;

    if !insights.is_empty() {
        writeln!(w, "Insights:")?;
        for insight in insights {
            writeln!(w, "  - {} {}", insight.severity.icon(), insight.text)?;
        }
        writeln!(w)?;
    }

    writeln!(w, "{}", render_line(root, &options))?;
    print_children(w, analysis, root, "", &options)?;
    Ok(())
}

fn print_children<W: Write>(
    w: &mut W,
    analysis: &PlanAnalysis,
    parent: &NodeStats,
    prefix: &str,
    options: &TerminalOptions,
) -> std::io::Result<()> {
    let count = parent.children.len();
    for (i, child) in analysis.children_of(parent.index).enumerate() {
        let is_last = i + 1 == count;
        let (connector, child_prefix) =
            if is_last { ("`-- ", format!("{}    ", prefix)) } else { ("|-- ", format!("{}|   ", prefix)) };

        writeln!(w, "{}{}{}", prefix, connector, render_line(child, options))?;

        if let Some(max_depth) = options.max_depth
            && child.depth >= max_depth
        {
            if !child.children.is_empty() {
                let hidden = analysis.subtree_size(child.index) - 1;
                writeln!(w, "{}`-- ... ({} more nodes)", child_prefix, hidden)?;
            }
            continue;
        }

        print_children(w, analysis, child, &child_prefix, options)?;
    }
    Ok(())
}

/// One tree line: `label | self X ms | share | bar | rows | buf` plus warnings
pub fn render_line(node: &NodeStats, options: &TerminalOptions) -> String {
    let mut parts = vec![
        node_label(node),
        format!("self {:.2} ms", node.exclusive_time_ms),
        format!("{:5.1}%", node.exclusive_share * 100.0),
    ];

    let bar = draw_bar(node.exclusive_share, options.bar_width);
    parts.push(match pick_color(node.exclusive_share).filter(|_| options.enable_color) {
        Some(color) => format!("{}{}{}", color, bar, ANSI_RESET),
        None => bar,
    });

    if node.estimated_rows_total > 0.0 || node.actual_rows_total > 0.0 {
        parts.push(format!(
            "rows {:.0}/{:.0} ({})",
            node.actual_rows_total,
            node.estimated_rows_total,
            format_factor(node.row_estimate_factor)
        ));
    }

    let buffers = node.buffers.total();
    if buffers > 0 {
        parts.push(format!("buf {} (~{})", buffers, humanize_buffers(buffers)));
    }

    let mut line = parts.join(" | ");
    if options.show_warnings && !node.warnings.is_empty() {
        let text = node.warnings.join("; ");
        if options.enable_color {
            line.push_str(&format!(" [{}{}{}]", ANSI_YELLOW, text, ANSI_RESET));
        } else {
            line.push_str(&format!(" [{}]", text));
        }
    }
    line
}

/// Proportional bar; any positive share gets at least one cell
pub fn draw_bar(share: f64, width: usize) -> String {
    if width == 0 {
        return String::new();
    }
    let clamped = share.clamp(0.0, 1.0);
    let mut fill = (clamped * width as f64).round() as usize;
    if clamped > 0.0 && fill == 0 {
        fill = 1;
    }
    let fill = fill.min(width);
    format!("{}{}", "#".repeat(fill), "-".repeat(width - fill))
}

fn pick_color(share: f64) -> Option<&'static str> {
    if share >= 0.40 {
        Some(ANSI_RED)
    } else if share >= 0.20 {
        Some(ANSI_YELLOW)
    } else if share >= 0.10 {
        Some(ANSI_CYAN)
    } else {
        None
    }
}
