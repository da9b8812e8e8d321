//! Human-readable formatting of block counts and signed deltas

/// PostgreSQL block size
pub const BLOCK_SIZE_BYTES: i64 = 8192;

const KIB: f64 = 1024.0;
const MIB: f64 = 1024.0 * 1024.0;
const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// Render a block count as a byte size (`1.95 MiB`); non-positive counts render as `0`
pub fn humanize_buffers(blocks: i64) -> String {
    if blocks <= 0 {
        return "0".to_string();
    }
    let bytes = blocks.saturating_mul(BLOCK_SIZE_BYTES) as f64;
    if bytes >= GIB {
        format!("{:.2} GiB", bytes / GIB)
    } else if bytes >= MIB {
        format!("{:.2} MiB", bytes / MIB)
    } else if bytes >= KIB {
        format!("{:.2} KiB", bytes / KIB)
    } else {
        format!("{:.0} B", bytes)
    }
}

/// Signed block count as a byte size with units up to TiB, e.g. `-1.00 MiB`; zero is `0 B`
pub fn humanize_blocks(blocks: i64) -> String {
    if blocks == 0 {
        return "0 B".to_string();
    }
    const UNITS: &[&str] = &["B", "KiB", "MiB", "GiB", "TiB"];
    let sign = if blocks < 0 { "-" } else { "" };
    let mut size = blocks.unsigned_abs() as f64 * BLOCK_SIZE_BYTES as f64;
    let mut unit_index = 0;

    while size >= 1024.0 && unit_index < UNITS.len() - 1 {
        size /= 1024.0;
        unit_index += 1;
    }

    format!("{}{:.2} {}", sign, size, UNITS[unit_index])
}

/// Signed milliseconds with two decimals, e.g. `+10.00`
pub fn signed_ms(delta: f64) -> String {
    format!("{:+.2}", delta)
}

/// Signed percentage with one decimal, e.g. `+500.0%`
pub fn signed_percent(pct: f64) -> String {
    format!("{:+.1}%", pct)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_humanize_buffers_units() {
        assert_eq!(humanize_buffers(0), "0");
        assert_eq!(humanize_buffers(-3), "0");
        assert_eq!(humanize_buffers(1), "8.00 KiB");
        assert_eq!(humanize_buffers(128), "1.00 MiB");
        assert_eq!(humanize_buffers(131072), "1.00 GiB");
        assert_eq!(humanize_buffers(250), "1.95 MiB");
    }

    #[test]
    fn test_signed_helpers() {
        assert_eq!(signed_ms(10.0), "+10.00");
        assert_eq!(signed_ms(-2.5), "-2.50");
        assert_eq!(signed_percent(500.0), "+500.0%");
        assert_eq!(humanize_blocks(-128), "-1.00 MiB");
        assert_eq!(humanize_blocks(0), "0 B");
        assert_eq!(humanize_blocks(134_217_728), "1.00 TiB");
    }
}
