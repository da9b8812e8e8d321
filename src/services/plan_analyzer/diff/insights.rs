//! Narrative lines for a diff report

use super::report::{DiffInsight, DiffSeverity, Entry};
use crate::config::Config;
use crate::utils::format::{humanize_blocks, humanize_buffers};

/// Regressions and improvements narrated per direction
const MAX_NARRATED: usize = 3;

/// Top regressions, top improvements, then newly spilling operators
pub fn synthesize(regressions: &[Entry], improvements: &[Entry], config: &Config) -> Vec<DiffInsight> {
    let mut out = Vec::new();

    for entry in regressions.iter().take(MAX_NARRATED) {
        let mut text = format!(
            "{} self +{:.2} ms (+{:.1}%)",
            entry.signature, entry.delta_self_ms, entry.percent_change
        );
        if entry.delta_temp_blocks > 0 {
            text.push_str(&format!(", temp +{}", humanize_blocks(entry.delta_temp_blocks)));
        } else if entry.delta_buffers > 0 {
            text.push_str(&format!(", buffers +{}", humanize_blocks(entry.delta_buffers)));
        }
        let severity = if entry.delta_self_ms >= config.diff.critical_delta_ms {
            DiffSeverity::Critical
        } else {
            DiffSeverity::Warning
        };
        out.push(DiffInsight::new(severity, text));
    }

    for entry in improvements.iter().take(MAX_NARRATED) {
        let mut text = format!(
            "{} self {:.2} ms ({:.1}%)",
            entry.signature, entry.delta_self_ms, entry.percent_change
        );
        if entry.delta_temp_blocks < 0 {
            text.push_str(&format!(", temp {}", humanize_blocks(entry.delta_temp_blocks)));
        } else if entry.delta_buffers < 0 {
            text.push_str(&format!(", buffers {}", humanize_blocks(entry.delta_buffers)));
        }
        out.push(DiffInsight::new(DiffSeverity::Improvement, text));
    }

    for entry in regressions {
        if entry.base_temp_blocks == 0 && entry.target_temp_blocks as f64 >= config.insights.spill_new_blocks {
            let text = format!(
                "{} began spilling to disk: {} temp buffers (~{})",
                entry.signature,
                entry.target_temp_blocks,
                humanize_buffers(entry.target_temp_blocks)
            );
            out.push(DiffInsight::new(DiffSeverity::Warning, text));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn regression(sig: &str, delta: f64) -> Entry {
        Entry {
            signature: sig.to_string(),
            base_self_ms: 1.0,
            target_self_ms: 1.0 + delta,
            delta_self_ms: delta,
            percent_change: delta * 100.0,
            ..Default::default()
        }
    }

    #[test]
    fn test_regression_severity_by_delta() {
        let config = Config::default();
        let insights = synthesize(&[regression("A", 12.0), regression("B", 6.0), regression("C", 2.5)], &[], &config);
        let severities: Vec<DiffSeverity> = insights.iter().map(|i| i.severity).collect();
        assert_eq!(severities, vec![DiffSeverity::Critical, DiffSeverity::Warning, DiffSeverity::Warning]);
        assert_eq!(insights[0].icon, "🔥");
        assert_eq!(insights[1].icon, "⚠️");
    }

    #[test]
    fn test_at_most_three_per_direction() {
        let config = Config::default();
        let regs: Vec<Entry> = (0..5).map(|i| regression(&format!("R{}", i), 20.0 - i as f64)).collect();
        let imps: Vec<Entry> = (0..5).map(|i| regression(&format!("I{}", i), -(5.0 + i as f64))).collect();
        let insights = synthesize(&regs, &imps, &config);
        assert_eq!(insights.len(), 6);
        assert_eq!(insights.iter().filter(|i| i.severity == DiffSeverity::Improvement).count(), 3);
    }

    #[test]
    fn test_began_spilling() {
        let config = Config::default();
        let mut entry = regression("Sort", 8.0);
        entry.target_temp_blocks = 256;
        entry.delta_temp_blocks = 256;
        let insights = synthesize(&[entry], &[], &config);

        assert_eq!(insights.len(), 2);
        assert_eq!(insights[0].message, "Sort self +8.00 ms (+800.0%), temp +2.00 MiB");
        assert_eq!(insights[1].severity, DiffSeverity::Warning);
        assert_eq!(insights[1].message, "Sort began spilling to disk: 256 temp buffers (~2.00 MiB)");
    }

    #[test]
    fn test_improvement_buffers_text() {
        let config = Config::default();
        let mut entry = regression("Seq Scan · users", -9.0);
        entry.delta_buffers = -128;
        let insights = synthesize(&[], &[entry], &config);
        assert_eq!(insights[0].message, "Seq Scan · users self -9.00 ms (-900.0%), buffers -1.00 MiB");
        assert_eq!(insights[0].icon, "✅");
    }
}
