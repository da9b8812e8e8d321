//! Command handlers
//!
//! One handler per subcommand. Handlers receive the already-loaded [`Config`] and parsed
//! arguments, and report failures through `anyhow` with context attached.

pub mod diff;
pub mod report;
pub mod version;

pub use diff::handle_diff;
pub use report::handle_report;
pub use version::handle_version;

use anyhow::Context;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Open `--out` for writing, or stdout when unset
pub fn open_output(out: Option<&Path>) -> anyhow::Result<Box<dyn Write>> {
    match out {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("create output {}", path.display()))?;
            tracing::info!("Writing output to {}", path.display());
            Ok(Box::new(BufWriter::new(file)))
        },
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// Write a whole document to `--out` or stdout
pub fn write_output(out: Option<&Path>, content: &str) -> anyhow::Result<()> {
    let mut writer = open_output(out)?;
    writer.write_all(content.as_bytes()).context("write output")?;
    if !content.ends_with('\n') {
        writer.write_all(b"\n").context("write output")?;
    }
    writer.flush().context("flush output")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_output_appends_newline() {
        let dir = std::env::temp_dir().join(format!("plansight-out-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("out.md");

        write_output(Some(path.as_path()), "# title").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# title\n");

        write_output(Some(path.as_path()), "done\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "done\n");
    }

    #[test]
    fn test_open_output_missing_dir() {
        let path = Path::new("/nonexistent-plansight-dir/out.json");
        let err = open_output(Some(path)).err().unwrap();
        assert!(err.to_string().contains("create output"));
    }
}
