use clap::Parser;
use plansight::config::{self, Command, CommandLineArgs, Config};
use plansight::{handlers, logging};

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let args = CommandLineArgs::parse();

    // Load configuration first
    let config_path = match &args.command {
        Command::Report(report) => report.config.as_deref(),
        Command::Diff(diff) => diff.config.as_deref(),
        Command::Version(_) => None,
    };
    let (config, overrides) = Config::load_with_overrides(config_path, args.log_level.as_deref())?;
    let config = config::use_config(config);

    // Keep the guard alive so buffered file logs are flushed on exit
    let _guard = logging::build(&config.logging).init(&config.logging.level);
    for note in &overrides {
        tracing::info!("Override {}", note);
    }
    tracing::debug!("Configuration loaded: {:?}", config);

    match &args.command {
        Command::Report(report) => handlers::handle_report(report, &config),
        Command::Diff(diff) => handlers::handle_diff(diff, &config),
        Command::Version(version) => handlers::handle_version(version),
    }
}
