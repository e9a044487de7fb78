//! CLI argument definitions for Almanac.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `variation` | Recurrence offsets for every day of a series |
//! | `band` | Rows inside one day's tolerance band |
//! | `export` | Write recurrence records to CSV |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, ndjson, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Treat warnings as errors |
//! | `--stream` | `false` | Enable NDJSON streaming |
//! | `--log-level` | `warn` | Log verbosity on stderr (`ALMANAC_LOG` overrides) |
//!
//! # Examples
//!
//! ```bash
//! almanac variation spx.csv --tolerance 2.5 --symbol SPX --pretty
//! almanac band spx.csv --date 2020-03-23 --format table
//! almanac export spx.json --output variation.csv
//! ```

use std::path::PathBuf;

use almanac_core::SourceFormat;
use clap::{Args, Parser, Subcommand, ValueEnum};

/// Almanac - price-recurrence analysis for daily close series
#[derive(Debug, Parser)]
#[command(
    name = "almanac",
    author,
    version,
    about = "Price-recurrence analysis for daily close series",
    long_about = "Almanac finds, for every day of a price series, the nearest earlier and \
the nearest later day whose close falls within a percentage band of that day's close, \
and reports how many calendar days away each one is.\n\
\n\
Use 'almanac <command> --help' for command-specific help."
)]
pub struct Cli {
    /// Output format for results.
    ///
    /// - json: Single JSON object (default)
    /// - ndjson: One JSON object per line
    /// - table: Column table for terminals
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Treat warnings and errors as failures (exit code 5).
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Enable NDJSON streaming mode.
    ///
    /// Outputs events as newline-delimited JSON:
    /// - start: Command initiated
    /// - progress: Series loaded and scanned
    /// - chunk: Batches of result rows
    /// - end: Command completed
    /// - error: Error occurred
    #[arg(long, global = true, default_value_t = false)]
    pub stream: bool,

    /// Log verbosity written to stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Warn)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Column table for terminal display.
    Table,
    /// Single JSON object output.
    Json,
    /// Newline-delimited JSON (one object per line).
    Ndjson,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

/// Input file format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum InputFormat {
    /// Detect from the file extension, then from the content.
    Auto,
    Csv,
    Json,
}

impl From<InputFormat> for SourceFormat {
    fn from(value: InputFormat) -> Self {
        match value {
            InputFormat::Auto => SourceFormat::Auto,
            InputFormat::Csv => SourceFormat::Csv,
            InputFormat::Json => SourceFormat::Json,
        }
    }
}

/// Available CLI commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Recurrence offsets for every day of a series.
    ///
    /// For each day, reports the band bounds and the calendar days to the
    /// nearest earlier and later day whose close lies inside the band.
    ///
    /// # Examples
    ///
    ///   almanac variation spx.csv
    ///   almanac variation spx.csv --tolerance 0.5 --format table
    Variation(VariationArgs),

    /// Rows inside one day's tolerance band.
    ///
    /// Lists every day whose close lies in the band of the day given by
    /// --date, marked as before, reference, or after.
    ///
    /// # Examples
    ///
    ///   almanac band spx.csv --date 2020-03-23
    Band(BandArgs),

    /// Write recurrence records to a CSV file.
    ///
    /// # Examples
    ///
    ///   almanac export spx.json --output variation.csv --tolerance 2
    Export(ExportArgs),
}

/// Options shared by every command that analyses a series.
#[derive(Debug, Clone, Args)]
pub struct SeriesArgs {
    /// CSV or JSON file with daily bars.
    pub file: PathBuf,

    /// Band width as a percentage of each day's close.
    #[arg(long, default_value_t = almanac_core::Tolerance::DEFAULT_PERCENT)]
    pub tolerance: f64,

    /// Input file format.
    #[arg(long, value_enum, default_value_t = InputFormat::Auto)]
    pub input_format: InputFormat,

    /// Ticker label echoed in the output (SPX resolves to ^GSPC).
    #[arg(long)]
    pub symbol: Option<String>,
}

/// Arguments for the `variation` command.
#[derive(Debug, Args)]
pub struct VariationArgs {
    #[command(flatten)]
    pub series: SeriesArgs,
}

/// Arguments for the `band` command.
#[derive(Debug, Args)]
pub struct BandArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Date of the reference day, as it appears in the input.
    #[arg(long)]
    pub date: String,
}

/// Arguments for the `export` command.
#[derive(Debug, Args)]
pub struct ExportArgs {
    #[command(flatten)]
    pub series: SeriesArgs,

    /// Destination CSV file.
    #[arg(short, long)]
    pub output: PathBuf,
}
