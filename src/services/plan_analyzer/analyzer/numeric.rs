//! Zero-guarded numeric policy shared by the analyzer, insight rules and diff engine

/// Values at or below this magnitude count as zero
pub const EPSILON: f64 = 1e-9;

/// Ratio of actual to estimated rows
///
/// Nothing expected and nothing produced is a perfect estimate (1). Rows produced where none were
/// expected is an unbounded miss (`+inf`).
pub fn ratio(actual: f64, estimated: f64) -> f64 {
    if estimated <= EPSILON {
        if actual <= EPSILON { 1.0 } else { f64::INFINITY }
    } else {
        actual / estimated
    }
}

/// Percent change from `base` to `target`
pub fn percent_change(base: f64, target: f64) -> f64 {
    if base.abs() <= EPSILON {
        if target.abs() <= EPSILON {
            0.0
        } else if target > 0.0 {
            100.0
        } else {
            -100.0
        }
    } else {
        (target - base) / base * 100.0
    }
}

/// Distance of a factor from a perfect estimate, infinite factors rank first
pub fn divergence(factor: f64) -> f64 {
    if factor.is_infinite() { f64::INFINITY } else { (factor - 1.0).abs() }
}

/// Render a factor as `x2.00` or `∞`
pub fn format_factor(factor: f64) -> String {
    if factor.is_infinite() { "∞".to_string() } else { format!("x{:.2}", factor) }
}
