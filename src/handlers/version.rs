use crate::config::VersionArgs;

use super::write_output;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Short commit hash baked in by the build script, if git was available
pub const GIT_COMMIT: Option<&str> = option_env!("PLANSIGHT_GIT_COMMIT");

pub fn version_string(short: bool) -> String {
    if short {
        return VERSION.to_string();
    }
    match GIT_COMMIT {
        Some(commit) if !commit.is_empty() => format!("plansight {} ({})", VERSION, commit),
        _ => format!("plansight {}", VERSION),
    }
}

pub fn handle_version(args: &VersionArgs) -> anyhow::Result<()> {
    write_output(None, &version_string(args.short))
}
