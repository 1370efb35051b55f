//! Structured logging setup for gordon-config
//!
//! Logging goes through the `tracing` ecosystem and is written to stderr, so
//! documents printed with `--print` stay machine-readable on stdout.
//!
//! The level is resolved in this order: explicit `--log-level`, `--verbose`
//! (debug), `--quiet` (error), `GORDON_CONFIG_LOG_LEVEL`, then `info`.
//! `GORDON_CONFIG_LOG_JSON=true` switches to one JSON object per line. A set
//! `RUST_LOG` replaces the computed filter entirely.
//!
//! # Example
//!
//! ```no_run
//! use gordon_config::util::logging;
//!
//! logging::init_from_env();
//!
//! use tracing::{debug, info};
//!
//! info!("Generating configuration");
//! debug!(stack = "app-prod", "Describing stack");
//! ```

use std::env;
use std::sync::Once;
use tracing::Level;
use tracing_subscriber::filter::Directive;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

static INIT: Once = Once::new();

const LEVEL_VAR: &str = "GORDON_CONFIG_LOG_LEVEL";
const JSON_VAR: &str = "GORDON_CONFIG_LOG_JSON";

/// AWS SDK and HTTP stack targets, capped at `warn` unless `RUST_LOG` says otherwise
const SDK_TARGETS: &[&str] = &[
    "aws_config",
    "aws_smithy_runtime",
    "aws_smithy_runtime_api",
    "hyper",
    "h2",
    "rustls",
];

/// Log line format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Level applied to this crate's targets
    pub level: Level,

    pub format: LogFormat,

    /// Include the module target (e.g., gordon_config::builder) in log lines
    pub include_target: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: Level::INFO,
            format: LogFormat::Text,
            include_target: true,
        }
    }
}

impl LoggingConfig {
    /// Reads `GORDON_CONFIG_LOG_LEVEL` and `GORDON_CONFIG_LOG_JSON`.
    pub fn from_env() -> Self {
        Self::resolve(None, false, false)
    }

    /// Resolves the level from command-line flags, falling back to the
    /// environment when none of them is given.
    pub fn resolve(log_level: Option<&str>, verbose: bool, quiet: bool) -> Self {
        let level = match log_level {
            Some(level) => parse_level(level),
            None if verbose => Level::DEBUG,
            None if quiet => Level::ERROR,
            None => env::var(LEVEL_VAR)
                .map(|level| parse_level(&level))
                .unwrap_or(Level::INFO),
        };

        let json = env::var(JSON_VAR)
            .ok()
            .and_then(|v| v.parse::<bool>().ok())
            .unwrap_or(false);

        Self {
            level,
            format: if json { LogFormat::Json } else { LogFormat::Text },
            ..Self::default()
        }
    }
}

/// Parses a log level, case-insensitively. Unknown levels fall back to INFO.
///
/// ```
/// use gordon_config::util::logging::parse_level;
/// use tracing::Level;
///
/// assert_eq!(parse_level("debug"), Level::DEBUG);
/// assert_eq!(parse_level("bogus"), Level::INFO);
/// ```
pub fn parse_level(level_str: &str) -> Level {
    level_str.trim().parse::<Level>().unwrap_or_else(|_| {
        eprintln!(
            "Invalid log level '{}', defaulting to INFO. Valid levels: trace, debug, info, warn, error",
            level_str
        );
        Level::INFO
    })
}

/// Filter directives used when `RUST_LOG` is not set
fn default_directives(level: Level) -> Vec<String> {
    std::iter::once(format!("gordon_config={}", level.as_str().to_lowercase()))
        .chain(SDK_TARGETS.iter().map(|target| format!("{}=warn", target)))
        .collect()
}

fn build_filter(level: Level) -> EnvFilter {
    if env::var("RUST_LOG").is_ok() {
        return EnvFilter::from_default_env();
    }

    default_directives(level)
        .iter()
        .filter_map(|directive| directive.parse::<Directive>().ok())
        .fold(EnvFilter::new("warn"), EnvFilter::add_directive)
}

/// Installs the global subscriber. Only the first call has an effect.
pub fn init_logging(config: LoggingConfig) {
    INIT.call_once(|| {
        let filter = build_filter(config.level);
        let registry = tracing_subscriber::registry().with(filter);

        match config.format {
            LogFormat::Json => registry
                .with(
                    fmt::layer()
                        .json()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target),
                )
                .init(),
            LogFormat::Text => registry
                .with(
                    fmt::layer()
                        .with_writer(std::io::stderr)
                        .with_target(config.include_target),
                )
                .init(),
        }
    });
}

pub fn init_default() {
    init_logging(LoggingConfig::default());
}

pub fn init_from_env() {
    init_logging(LoggingConfig::from_env());
}
