//! Tracing setup for the command line binary
//!
//! Logs always go to stderr so stdout stays clean for reports. When `logging.file` is set a
//! daily rolling, non-blocking file layer is stacked on top.

use crate::config::LoggingConfig;
use std::path::Path;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;
use tracing_subscriber::layer::SubscriberExt;

/// Level used when the configured filter does not parse
pub const FALLBACK_LEVEL: &str = "warn";

/// A built subscriber, not yet installed
pub struct Logging {
    pub subscriber: Box<dyn tracing::Subscriber + Send + Sync>,
    /// Flushes buffered file logs on drop; keep it alive for the whole run
    pub guard: Option<WorkerGuard>,
    /// Parse error of the configured level, if it was replaced by the fallback
    pub rejected_level: Option<ParseError>,
}

impl Logging {
    /// Install as the global default; returns the file guard
    pub fn init(self, level: &str) -> Option<WorkerGuard> {
        if tracing::subscriber::set_global_default(self.subscriber).is_err() {
            return self.guard;
        }
        if let Some(e) = &self.rejected_level {
            tracing::warn!("Ignoring invalid log level {:?} ({}), using {:?}", level, e, FALLBACK_LEVEL);
        }
        self.guard
    }
}

/// Build the subscriber for `logging`
pub fn build(logging: &LoggingConfig) -> Logging {
    let (log_filter, rejected_level) = match EnvFilter::try_new(&logging.level) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(FALLBACK_LEVEL), Some(e)),
    };
    let registry = tracing_subscriber::registry().with(log_filter);

    let Some(log_file) = logging.file.as_deref().filter(|f| !f.trim().is_empty()) else {
        let subscriber =
            registry.with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false));
        return Logging { subscriber: Box::new(subscriber), guard: None, rejected_level };
    };

    let (log_dir, file_prefix) = split_log_path(Path::new(log_file));
    let _ = std::fs::create_dir_all(&log_dir);

    let file_appender = tracing_appender::rolling::daily(&log_dir, &file_prefix);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let subscriber = registry
        .with(tracing_subscriber::fmt::layer().with_writer(non_blocking).with_ansi(false))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).with_target(false));

    Logging { subscriber: Box::new(subscriber), guard: Some(guard), rejected_level }
}

/// Directory and file prefix for the rolling appender, which adds a date suffix
fn split_log_path(log_path: &Path) -> (String, String) {
    let log_dir = log_path
        .parent()
        .and_then(|p| p.to_str())
        .filter(|p| !p.is_empty())
        .unwrap_or(".")
        .to_string();
    let file_name = log_path.file_name().and_then(|n| n.to_str()).unwrap_or("plansight.log");
    let file_prefix = file_name.strip_suffix(".log").unwrap_or(file_name).to_string();
    (log_dir, file_prefix)
}
