//! # RT Shot & Safety CLI
//!
//! Command-line front end for `rt_core`: calculate a snapshot, export the
//! report, or keep a session on disk and edit it one field at a time.

use std::process::ExitCode;

use clap::Parser;
use tracing::level_filters::LevelFilter;

use rt_cli::cli::{Cli, Command, LogFormatArg, LogLevelArg};
use rt_cli::commands::{engine_config, run_calc, run_isotopes, run_report, run_state};
use rt_cli::logging::{init_logging, LogConfig, LogFormat};

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(&log_config_from_cli(&cli));

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{:#}", error);
            eprintln!("error: {:#}", error);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let config = engine_config(&cli.engine)?;
    match &cli.command {
        Command::Calc(args) => run_calc(args, &config),
        Command::Report(args) => run_report(args, &config),
        Command::State(args) => run_state(args, &config),
        Command::Isotopes => {
            run_isotopes();
            Ok(())
        }
    }
}

/// Build logging configuration from CLI flags with consistent precedence.
fn log_config_from_cli(cli: &Cli) -> LogConfig {
    let mut config = LogConfig {
        level_filter: cli.verbosity.tracing_level_filter(),
        ..LogConfig::default()
    };
    config.use_env_filter = !(cli.verbosity.is_present() || cli.log_level.is_some());
    if let Some(level) = cli.log_level {
        config.level_filter = match level {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        };
    }
    config.format = match cli.log_format {
        LogFormatArg::Pretty => LogFormat::Pretty,
        LogFormatArg::Compact => LogFormat::Compact,
        LogFormatArg::Json => LogFormat::Json,
    };
    config
}
