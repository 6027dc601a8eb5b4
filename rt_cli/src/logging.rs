//! Logging setup using `tracing` and `tracing-subscriber`.
//!
//! # Log Levels
//!
//! - `error`: command failures
//! - `warn`: discarded session data, unreadable stores
//! - `info`: saves and report output
//! - `debug`: computed aggregates for each calculation pass

use std::io::{self, IsTerminal};

use tracing::level_filters::LevelFilter;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable format with colors.
    #[default]
    Pretty,
    /// Compact single-line format.
    Compact,
    /// JSON format for machine parsing.
    Json,
}

#[derive(Debug, Clone)]
pub struct LogConfig {
    pub level_filter: LevelFilter,
    /// Let `RUST_LOG` decide when no level was given on the command line.
    pub use_env_filter: bool,
    pub with_ansi: bool,
    pub format: LogFormat,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level_filter: LevelFilter::WARN,
            use_env_filter: true,
            with_ansi: io::stderr().is_terminal(),
            format: LogFormat::default(),
        }
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays clean
/// for results and reports.
pub fn init_logging(config: &LogConfig) {
    let filter = build_env_filter(config);

    match config.format {
        LogFormat::Json => {
            tracing_subscriber::registry()
                .with(filter)
                .with(fmt::layer().json().with_writer(io::stderr).with_target(false))
                .init();
        }
        LogFormat::Compact => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .compact()
                        .with_writer(io::stderr)
                        .with_ansi(config.with_ansi)
                        .with_target(false)
                        .without_time(),
                )
                .init();
        }
        LogFormat::Pretty => {
            tracing_subscriber::registry()
                .with(filter)
                .with(
                    fmt::layer()
                        .with_writer(io::stderr)
                        .with_ansi(config.with_ansi)
                        .with_target(false)
                        .without_time(),
                )
                .init();
        }
    }
}

/// Filter for our crates at the configured level; other crates stay at warn.
fn build_env_filter(config: &LogConfig) -> EnvFilter {
    let explicit = || {
        let level = config.level_filter.to_string().to_lowercase();
        EnvFilter::new(format!("warn,rt_core={level},rt_cli={level}", level = level))
    };

    if config.use_env_filter {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| explicit())
    } else {
        explicit()
    }
}
