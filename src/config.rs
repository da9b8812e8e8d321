use crate::services::plan_analyzer::Severity;
use clap::{Args, Parser, Subcommand, ValueEnum};
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, RwLock};

/// Environment variable naming the configuration document
pub const CONFIG_ENV: &str = "PLANSIGHT_CONFIG";
/// Environment variable overriding `logging.level`
pub const LOG_LEVEL_ENV: &str = "PLANSIGHT_LOG_LEVEL";
/// Environment variable overriding `logging.file`
pub const LOG_FILE_ENV: &str = "PLANSIGHT_LOG_FILE";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub insights: InsightConfig,
    pub diff: DiffConfig,
    pub logging: LoggingConfig,
}

/// Thresholds for the insight rules
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InsightConfig {
    /// Exclusive share at which the top hotspot is critical (fraction, not percent)
    #[serde(alias = "hotspot_critical_percent")]
    pub hotspot_critical_share: f64,
    #[serde(alias = "hotspot_warning_percent")]
    pub hotspot_warning_share: f64,
    /// Buffer count above which a hot sequential scan gets an index hint
    pub seq_scan_buffer_hint: i64,
    pub buffer_warning_blocks: i64,
    pub buffer_critical_blocks: i64,
    pub nested_loop_warn_loops: f64,
    pub nested_loop_critical_loops: f64,
    pub row_estimate_critical_high: f64,
    pub row_estimate_critical_low: f64,
    /// Temp blocks at which a sort/hash counts as spilling
    pub spill_new_blocks: f64,
    /// Fraction of gathered rows a LIMIT must keep before parallelism looks wasted
    pub parallel_limit_keep_ratio: f64,
}

/// Thresholds for plan-to-plan diffs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiffConfig {
    pub min_self_delta_ms: f64,
    pub min_percent_change: f64,
    pub max_items: usize,
    pub critical_delta_ms: f64,
    pub warning_delta_ms: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    /// Optional log file; rotated daily
    pub file: Option<String>,
}

impl Default for InsightConfig {
    fn default() -> Self {
        Self {
            hotspot_critical_share: 0.40,
            hotspot_warning_share: 0.20,
            seq_scan_buffer_hint: 5000,
            buffer_warning_blocks: 5000,
            buffer_critical_blocks: 50000,
            nested_loop_warn_loops: 100.0,
            nested_loop_critical_loops: 10000.0,
            row_estimate_critical_high: 5.0,
            row_estimate_critical_low: 0.2,
            spill_new_blocks: 100.0,
            parallel_limit_keep_ratio: 0.10,
        }
    }
}

impl Default for DiffConfig {
    fn default() -> Self {
        Self {
            min_self_delta_ms: 2.0,
            min_percent_change: 5.0,
            max_items: 8,
            critical_delta_ms: 10.0,
            warning_delta_ms: 5.0,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), file: None }
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("parse config {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// Command Line
// ============================================================================

/// Command line arguments
#[derive(Parser, Debug, Clone)]
#[command(name = "plansight")]
#[command(version, about = "plansight - execution plan analyzer and diff tool")]
pub struct CommandLineArgs {
    /// Logging level (overrides config file, e.g., "debug" or "plansight=trace")
    #[arg(long, global = true, value_name = "LEVEL")]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Analyze one plan and print hotspots, drift and insights
    Report(ReportArgs),
    /// Compare two plans of the same query
    Diff(DiffArgs),
    /// Print version information
    Version(VersionArgs),
}

#[derive(Args, Debug, Clone)]
pub struct ReportArgs {
    /// Plan document (EXPLAIN FORMAT JSON); "-" reads stdin
    #[arg(long, value_name = "PATH")]
    pub input: PathBuf,

    #[arg(long, value_enum, default_value_t = ReportMode::Text)]
    pub mode: ReportMode,

    /// Write output to a file instead of stdout
    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Disable ANSI colours
    #[arg(long)]
    pub no_color: bool,

    /// Collapse the tree below this depth
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,

    /// Omit per-node warnings from the tree
    #[arg(long)]
    pub hide_warnings: bool,

    /// Drop insights below this severity
    #[arg(long, value_enum, default_value_t = Severity::Info)]
    pub min_severity: Severity,

    /// Path to configuration file (TOML or JSON)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportMode {
    Text,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct DiffArgs {
    #[arg(long, value_name = "PATH")]
    pub base: PathBuf,

    #[arg(long, value_name = "PATH")]
    pub target: PathBuf,

    #[arg(long, value_enum, default_value_t = DiffFormat::Md)]
    pub format: DiffFormat,

    #[arg(long, value_name = "PATH")]
    pub out: Option<PathBuf>,

    /// Minimum self-time delta in ms (overrides config)
    #[arg(long, value_name = "MS")]
    pub min_delta: Option<f64>,

    /// Minimum percent change (overrides config)
    #[arg(long, value_name = "PCT")]
    pub min_percent: Option<f64>,

    /// Maximum regressions/improvements listed (overrides config)
    #[arg(long, value_name = "N")]
    pub limit: Option<usize>,

    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiffFormat {
    Md,
    Json,
}

#[derive(Args, Debug, Clone)]
pub struct VersionArgs {
    /// Print the bare version number only
    #[arg(long)]
    pub short: bool,
}

// ============================================================================
// Loading
// ============================================================================

impl Config {
    /// Load configuration with file, environment variable and command line support
    ///
    /// Loading order (priority from highest to lowest):
    /// 1. Command line arguments (`--log-level`)
    /// 2. Environment variables (`PLANSIGHT_LOG_LEVEL`, `PLANSIGHT_LOG_FILE`)
    /// 3. Configuration document (`--config`, else `$PLANSIGHT_CONFIG`)
    /// 4. Default values
    ///
    /// A blank path counts as unset.
    pub fn load(path: Option<&Path>, log_level: Option<&str>) -> Result<Self, ConfigError> {
        Self::load_with_overrides(path, log_level).map(|(config, _)| config)
    }

    /// Same as [`Config::load`], also returning one note per applied override
    ///
    /// Loading runs before tracing is installed, so callers log the notes afterwards.
    pub fn load_with_overrides(
        path: Option<&Path>,
        log_level: Option<&str>,
    ) -> Result<(Self, Vec<String>), ConfigError> {
        let env_path = std::env::var(CONFIG_ENV).ok().filter(|p| !p.trim().is_empty());
        let path = given_path(path).map(Path::to_path_buf).or_else(|| env_path.map(PathBuf::from));

        let mut config = match path {
            Some(path) => Self::from_path(&path)?,
            None => Config::default(),
        };

        let mut overrides = config.apply_env_overrides();

        if let Some(level) = log_level {
            config.logging.level = level.to_string();
            overrides.push(format!("logging.level from CLI: {}", config.logging.level));
        }

        config.validate()?;
        Ok((config, overrides))
    }

    /// Read a sparse document over the defaults; `.toml` is TOML, anything else JSON
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)
            .map_err(|source| ConfigError::Read { path: path.to_path_buf(), source })?;

        let is_toml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("toml"));

        let config: Config = if is_toml {
            toml::from_str(&content)
                .map_err(|source| ConfigError::Toml { path: path.to_path_buf(), source })?
        } else {
            serde_json::from_str(&content)
                .map_err(|source| ConfigError::Json { path: path.to_path_buf(), source })?
        };

        tracing::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Apply environment variable overrides
    ///
    /// - PLANSIGHT_LOG_LEVEL: logging level (e.g., "info,plansight=debug")
    /// - PLANSIGHT_LOG_FILE: log file path; empty disables file logging
    fn apply_env_overrides(&mut self) -> Vec<String> {
        let mut overrides = Vec::new();

        if let Ok(level) = std::env::var(LOG_LEVEL_ENV)
            && !level.trim().is_empty()
        {
            self.logging.level = level;
            overrides.push(format!("logging.level from env: {}", self.logging.level));
        }

        if let Ok(file) = std::env::var(LOG_FILE_ENV) {
            self.logging.file = Some(file).filter(|f| !f.trim().is_empty());
            overrides.push(format!("logging.file from env: {:?}", self.logging.file));
        }

        overrides
    }

    /// Validate thresholds
    pub fn validate(&self) -> Result<(), ConfigError> {
        let i = &self.insights;
        let d = &self.diff;

        for (name, share) in [
            ("insights.hotspot_critical_share", i.hotspot_critical_share),
            ("insights.hotspot_warning_share", i.hotspot_warning_share),
            ("insights.parallel_limit_keep_ratio", i.parallel_limit_keep_ratio),
        ] {
            if !(0.0..=1.0).contains(&share) {
                return Err(ConfigError::Invalid(format!("{} must be within [0, 1], got {}", name, share)));
            }
        }

        if i.hotspot_warning_share > i.hotspot_critical_share {
            return Err(ConfigError::Invalid(
                "insights.hotspot_warning_share must not exceed hotspot_critical_share".into(),
            ));
        }
        if i.buffer_warning_blocks > i.buffer_critical_blocks {
            return Err(ConfigError::Invalid(
                "insights.buffer_warning_blocks must not exceed buffer_critical_blocks".into(),
            ));
        }
        if i.nested_loop_warn_loops > i.nested_loop_critical_loops {
            return Err(ConfigError::Invalid(
                "insights.nested_loop_warn_loops must not exceed nested_loop_critical_loops".into(),
            ));
        }
        if i.row_estimate_critical_low > i.row_estimate_critical_high {
            return Err(ConfigError::Invalid(
                "insights.row_estimate_critical_low must not exceed row_estimate_critical_high".into(),
            ));
        }
        if d.warning_delta_ms > d.critical_delta_ms {
            return Err(ConfigError::Invalid(
                "diff.warning_delta_ms must not exceed critical_delta_ms".into(),
            ));
        }

        for (name, value) in [
            ("insights.seq_scan_buffer_hint", i.seq_scan_buffer_hint as f64),
            ("insights.buffer_warning_blocks", i.buffer_warning_blocks as f64),
            ("insights.nested_loop_warn_loops", i.nested_loop_warn_loops),
            ("insights.row_estimate_critical_low", i.row_estimate_critical_low),
            ("insights.spill_new_blocks", i.spill_new_blocks),
            ("diff.min_self_delta_ms", d.min_self_delta_ms),
            ("diff.min_percent_change", d.min_percent_change),
            ("diff.warning_delta_ms", d.warning_delta_ms),
        ] {
            if value < 0.0 {
                return Err(ConfigError::Invalid(format!("{} must not be negative, got {}", name, value)));
            }
        }

        Ok(())
    }
}

// ============================================================================
// Active Configuration
// ============================================================================

static ACTIVE: Lazy<RwLock<Arc<Config>>> = Lazy::new(|| RwLock::new(Arc::new(Config::default())));

/// Snapshot of the active configuration
pub fn active() -> Arc<Config> {
    ACTIVE.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
}

/// Replace the active configuration
pub fn use_config(config: Config) -> Arc<Config> {
    let config = Arc::new(config);
    *ACTIVE.write().unwrap_or_else(|poisoned| poisoned.into_inner()) = config.clone();
    config
}

/// Load `path` (or defaults when unset) and make it active; on error the previous value stays
pub fn apply(path: Option<&Path>) -> Result<Arc<Config>, ConfigError> {
    let config = match given_path(path) {
        Some(path) => {
            let config = Config::from_path(path)?;
            config.validate()?;
            config
        },
        None => Config::default(),
    };
    Ok(use_config(config))
}

/// `None` for an unset or blank path
fn given_path(path: Option<&Path>) -> Option<&Path> {
    path.filter(|p| !p.as_os_str().to_string_lossy().trim().is_empty())
}
