//! CLI argument definitions for the RT shot & safety calculator.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use rt_core::{FormField, LayerField, ShotField};
use uuid::Uuid;

#[derive(Parser)]
#[command(
    name = "rt",
    version,
    about = "RT Shot & Safety Calculator - radiography boundaries, shot geometry and exposure time",
    long_about = "Plan industrial radiography shots.\n\n\
                  Computes 2 and 100 mR/hr boundary distances, per-shot unsharpness,\n\
                  magnification and blow-up, and the exposure time for a target intensity.\n\
                  Results are advisory only."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    #[command(flatten)]
    pub engine: EngineArgs,
}

/// Engine switches. A config file is read first, then flags override it.
#[derive(Args)]
pub struct EngineArgs {
    /// JSON engine configuration file.
    #[arg(long = "config", value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Include a collimator with this many half-value layers in all shielded results.
    #[arg(long = "collimator-hvl", value_name = "COUNT", global = true)]
    pub collimator_hvl: Option<f64>,

    /// Also fail shots whose blow-up exceeds 20%.
    #[arg(long = "check-blow-up", global = true)]
    pub check_blow_up: bool,

    /// Skip the focal-spot multiplier recommendation.
    #[arg(long = "no-multiplier", global = true)]
    pub no_multiplier: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Calculate results for a snapshot file.
    Calc(CalcArgs),

    /// Write the shot & safety report for a snapshot file.
    Report(ReportArgs),

    /// Inspect and edit the persisted session.
    State(StateArgs),

    /// List supported isotopes and their constants.
    Isotopes,
}

#[derive(Parser)]
pub struct CalcArgs {
    /// Snapshot JSON file.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Print the full result record as JSON.
    #[arg(long = "json")]
    pub json: bool,
}

#[derive(Parser)]
pub struct ReportArgs {
    /// Snapshot JSON file.
    #[arg(value_name = "SNAPSHOT")]
    pub snapshot: PathBuf,

    /// Output PDF path (default: RT_Shot_Safety_Report_v2.pdf).
    #[arg(short = 'o', long = "output", value_name = "PATH")]
    pub output: Option<PathBuf>,

    /// Print the report as plain text instead of writing a PDF.
    #[arg(long = "text")]
    pub text: bool,
}

#[derive(Parser)]
pub struct StateArgs {
    /// Session store file.
    #[arg(long = "store", value_name = "PATH", default_value = "rt-session.json")]
    pub store: PathBuf,

    #[command(subcommand)]
    pub action: StateAction,
}

#[derive(Subcommand)]
pub enum StateAction {
    /// Show the session inputs and results.
    Show {
        /// Print the snapshot as JSON.
        #[arg(long = "json")]
        json: bool,
    },

    /// Set one form field (e.g. `set focusSpot 0.1`).
    Set {
        field: FormField,
        value: String,
    },

    /// Record a draft value for a field without committing it.
    Draft {
        field: FormField,
        value: String,
    },

    /// Append a material layer.
    AddLayer,

    /// Edit a layer field (material, thickness, hvlCount).
    EditLayer {
        id: Uuid,
        field: LayerField,
        value: String,
    },

    /// Remove a material layer.
    RemoveLayer { id: Uuid },

    /// Append a shot card.
    AddShot,

    /// Edit a shot field (pdd, spd).
    EditShot {
        id: Uuid,
        field: ShotField,
        value: String,
    },

    /// Remove a shot card.
    RemoveShot { id: Uuid },

    /// Clear saved state and drafts.
    Reset,
}

/// CLI log level choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogLevelArg {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}
