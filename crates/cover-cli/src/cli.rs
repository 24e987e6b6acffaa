//! CLI argument definitions for the `cover` binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use clap_verbosity_flag::{Verbosity, WarnLevel};
use colorchoice_clap::Color;
use cover_cli::logging::LogFormat;
use cover_model::{LayoutType, Measure};
use tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(
    name = "cover",
    version,
    about = "Load published vaccination coverage sheets and rebuild their tables",
    long_about = "Load published vaccination coverage sheets into a normalized store.\n\n\
                  Each sheet replaces exactly the slice of data it publishes. Stored\n\
                  records can be rebuilt into the published table shapes."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Adjust log verbosity (-v for info, -vv for debug, -q for errors only).
    #[command(flatten)]
    pub verbosity: Verbosity<WarnLevel>,

    /// Control ANSI color output (auto, always, never).
    #[command(flatten)]
    pub color: Color,

    /// Explicit log level (overrides -v/-q flags).
    #[arg(long = "log-level", value_enum, global = true)]
    pub log_level: Option<LogLevelArg>,

    /// Log output format (pretty for human, json for machine parsing).
    #[arg(
        long = "log-format",
        value_enum,
        default_value = "pretty",
        global = true
    )]
    pub log_format: LogFormatArg,

    /// Write logs to a file instead of stderr.
    #[arg(long = "log-file", value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Command {
    /// Load a sheet, or every sheet in a directory, into the store.
    Load(LoadArgs),

    /// Rebuild a published table from the store.
    Show(ShowArgs),

    /// List the supported sheet layouts.
    Layouts,

    /// Print one reference data table.
    Reference(ReferenceArgs),
}

/// Options shared by commands that read reference data and the store.
#[derive(clap::Args)]
pub struct StoreArgs {
    /// SQLite database holding the loaded records.
    #[arg(long = "db", value_name = "PATH", default_value = "cover.db")]
    pub db: PathBuf,

    /// Reference data directory (default: bundled standards).
    #[arg(long = "standards", value_name = "DIR")]
    pub standards: Option<PathBuf>,
}

#[derive(Parser)]
pub struct LoadArgs {
    /// A CSV sheet or a directory of CSV sheets.
    #[arg(value_name = "PATH")]
    pub path: PathBuf,

    /// Counts sheet loaded together with a single percentage sheet.
    #[arg(long = "counts", value_name = "PATH")]
    pub counts: Option<PathBuf>,

    /// Period for snapshot sheets whose name carries no year range.
    #[arg(long = "period", value_name = "PERIOD")]
    pub period: Option<String>,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser)]
pub struct ShowArgs {
    /// Table shape to rebuild.
    #[arg(long = "layout", value_name = "LAYOUT", value_parser = parse_layout)]
    pub layout: LayoutType,

    /// Cohort name, e.g. "12 months".
    #[arg(long = "cohort")]
    pub cohort: Option<String>,

    /// Single-vaccine series to read instead of the main tables, e.g. "MMR1".
    #[arg(long = "series")]
    pub series: Option<String>,

    /// Period, e.g. "2024 to 2025".
    #[arg(long = "period")]
    pub period: Option<String>,

    /// Category code or published name; required where columns are areas or cohorts.
    #[arg(long = "category")]
    pub category: Option<String>,

    /// Keep only these area codes as rows.
    #[arg(long = "area", value_name = "CODE")]
    pub areas: Vec<String>,

    /// Keep only these category columns.
    #[arg(long = "columns", value_name = "CATEGORY", value_delimiter = ',')]
    pub columns: Vec<String>,

    /// Figure shown in unsuppressed cells.
    #[arg(long = "measure", value_enum, default_value = "percentage")]
    pub measure: MeasureArg,

    /// Output format.
    #[arg(long = "format", value_enum, default_value = "table")]
    pub format: TableFormatArg,

    #[command(flatten)]
    pub store: StoreArgs,
}

#[derive(Parser)]
pub struct ReferenceArgs {
    /// Which table to print.
    #[arg(value_enum)]
    pub table: ReferenceTableArg,

    /// Reference data directory (default: bundled standards).
    #[arg(long = "standards", value_name = "DIR")]
    pub standards: Option<PathBuf>,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum ReferenceTableArg {
    Areas,
    Categories,
    Cohorts,
    Periods,
    Markers,
}

#[derive(Clone, Copy, ValueEnum)]
pub enum MeasureArg {
    Percentage,
    Numerator,
    Denominator,
}

impl From<MeasureArg> for Measure {
    fn from(arg: MeasureArg) -> Self {
        match arg {
            MeasureArg::Percentage => Measure::Percentage,
            MeasureArg::Numerator => Measure::Numerator,
            MeasureArg::Denominator => Measure::Denominator,
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TableFormatArg {
    Table,
    Csv,
    Json,
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

impl From<LogLevelArg> for LevelFilter {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Error => LevelFilter::ERROR,
            LogLevelArg::Warn => LevelFilter::WARN,
            LogLevelArg::Info => LevelFilter::INFO,
            LogLevelArg::Debug => LevelFilter::DEBUG,
            LogLevelArg::Trace => LevelFilter::TRACE,
        }
    }
}

/// CLI log format choices.
#[derive(Clone, Copy, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Compact,
    Json,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Pretty => LogFormat::Pretty,
            LogFormatArg::Compact => LogFormat::Compact,
            LogFormatArg::Json => LogFormat::Json,
        }
    }
}

fn parse_layout(raw: &str) -> Result<LayoutType, String> {
    LayoutType::parse(raw).map_err(|error| {
        let known: Vec<&str> = LayoutType::ALL.into_iter().map(LayoutType::as_str).collect();
        format!("{error} (expected one of: {})", known.join(", "))
    })
}
