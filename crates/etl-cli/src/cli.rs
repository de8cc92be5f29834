//! CLI argument definitions for the orders ETL.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{InfoLevel, Verbosity};
use colorchoice_clap::Color;

#[derive(Parser)]
#[command(
    name = "orders-etl",
    version,
    about = "Orders/users ETL - clean, join and summarise raw CSV exports",
    long_about = "Turn raw orders.csv and users.csv exports into typed Parquet tables.\n\n\
                  Quality gates abort the run on missing columns, empty inputs,\n\
                  duplicate keys, negative amounts and join explosions."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for debug, -vv for trace, -q for warnings only).
    #[command(flatten)]
    pub verbosity: Verbosity<InfoLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for humans, json for machine parsing).
    #[arg(long = "log-format", value_enum, default_value = "pretty", global = true)]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Read the raw CSVs, enforce schemas and write typed snapshots.
    Load(RunArgs),

    /// Gate the raw inputs, report missingness and write cleaned orders.
    Clean(RunArgs),

    /// Run the full pipeline: clean, join users, flag outliers, write metadata.
    Run(RunArgs),
}

#[derive(Args, Clone)]
pub struct RunArgs {
    /// Project root holding data/raw, data/processed and reports.
    #[arg(long = "root", value_name = "DIR", default_value = ".")]
    pub root: PathBuf,

    /// Raw orders CSV (default: <ROOT>/data/raw/orders.csv).
    #[arg(long = "orders", value_name = "CSV")]
    pub orders: Option<PathBuf>,

    /// Raw users CSV (default: <ROOT>/data/raw/users.csv).
    #[arg(long = "users", value_name = "CSV")]
    pub users: Option<PathBuf>,

    /// Directory for processed tables and run metadata (default: <ROOT>/data/processed).
    ///
    /// The missingness report is always written under <ROOT>/reports.
    #[arg(long = "out-dir", value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// Lower winsorizing percentile in [0, 1].
    #[arg(long = "winsor-lower", value_name = "P", default_value_t = 0.01)]
    pub winsor_lower: f64,

    /// Upper winsorizing percentile in [0, 1].
    #[arg(long = "winsor-upper", value_name = "P", default_value_t = 0.99)]
    pub winsor_upper: f64,

    /// IQR multiplier for the amount outlier flag.
    #[arg(long = "iqr-k", value_name = "K", default_value_t = etl_model::DEFAULT_IQR_K)]
    pub iqr_k: f64,

    /// Status mapping as a JSON object, e.g. '{"paid":"paid","refunded":"refund"}'.
    #[arg(long = "status-mapping", value_name = "JSON")]
    pub status_mapping: Option<String>,

    /// Cell value treated as missing (repeatable; replaces the default list).
    #[arg(long = "null-token", value_name = "TOKEN")]
    pub null_tokens: Vec<String>,

    /// Keep only the latest order per order_id before gating.
    #[arg(long = "dedupe")]
    pub dedupe: bool,
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
