//! Bar sources: where a raw series comes from before it is analysed.
//!
//! The analysis never fetches data itself. A [`BarSource`] hands it a full
//! `Vec<PriceBar>`; failures to obtain that vector are reported as
//! [`SourceError`]s, distinct from an analysis that simply found no match.

use std::fmt::{Display, Formatter};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use csv::{ReaderBuilder, Trim};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::{parse_price_cell, BarDate, PriceBar, ValidationError};

/// Identifier of the source that produced a series, recorded in envelopes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SourceId {
    Csv,
    Json,
    Memory,
}

impl SourceId {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Json => "json",
            Self::Memory => "memory",
        }
    }
}

impl Display for SourceId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Requested file format; `Auto` resolves from extension, then content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SourceFormat {
    #[default]
    Auto,
    Csv,
    Json,
}

impl FromStr for SourceFormat {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(ValidationError::InvalidSourceFormat {
                value: other.to_owned(),
            }),
        }
    }
}

/// Source error classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceErrorKind {
    NotFound,
    Io,
    Malformed,
}

/// Structured error for a series that could not be obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceError {
    kind: SourceErrorKind,
    origin: SourceId,
    message: String,
    retryable: bool,
}

impl SourceError {
    pub fn not_found(origin: SourceId, message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::NotFound, origin, message, false)
    }

    pub fn io(origin: SourceId, message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Io, origin, message, true)
    }

    pub fn malformed(origin: SourceId, message: impl Into<String>) -> Self {
        Self::new(SourceErrorKind::Malformed, origin, message, false)
    }

    fn new(
        kind: SourceErrorKind,
        origin: SourceId,
        message: impl Into<String>,
        retryable: bool,
    ) -> Self {
        Self {
            kind,
            origin,
            message: message.into(),
            retryable,
        }
    }

    pub const fn kind(&self) -> SourceErrorKind {
        self.kind
    }

    /// Source whose reader failed.
    pub const fn origin(&self) -> SourceId {
        self.origin
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn retryable(&self) -> bool {
        self.retryable
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            SourceErrorKind::NotFound => "source.not_found",
            SourceErrorKind::Io => "source.io",
            SourceErrorKind::Malformed => "source.malformed",
        }
    }
}

impl Display for SourceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for SourceError {}

/// A loaded series and the source that actually read it.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedBars {
    pub source: SourceId,
    pub bars: Vec<PriceBar>,
}

/// Supplies a complete raw series.
pub trait BarSource {
    /// Source as known before loading. A file in `Auto` mode without a known
    /// extension only settles on its format once the content is read, so
    /// [`LoadedBars::source`] is the authoritative value.
    fn id(&self) -> SourceId;
    fn load(&self) -> Result<LoadedBars, SourceError>;
}

/// Bars already held in memory.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemoryBarSource {
    bars: Vec<PriceBar>,
}

impl MemoryBarSource {
    pub fn new(bars: Vec<PriceBar>) -> Self {
        Self { bars }
    }
}

impl BarSource for MemoryBarSource {
    fn id(&self) -> SourceId {
        SourceId::Memory
    }

    fn load(&self) -> Result<LoadedBars, SourceError> {
        Ok(LoadedBars {
            source: SourceId::Memory,
            bars: self.bars.clone(),
        })
    }
}

/// Bars read from a CSV or JSON file.
///
/// CSV needs a header row with `date` (or `ts`/`timestamp`) and `close`
/// columns; matching is case-insensitive and other columns are optional.
/// JSON may be an array of bar objects, an object with a `bars` array, or a
/// `{ "columns": [...], "rows": [[...], ...] }` table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBarSource {
    path: PathBuf,
    format: SourceFormat,
}

impl FileBarSource {
    pub fn new(path: impl Into<PathBuf>, format: SourceFormat) -> Self {
        Self {
            path: path.into(),
            format,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn resolved_format(&self, contents: Option<&str>) -> SourceId {
        match self.format {
            SourceFormat::Csv => SourceId::Csv,
            SourceFormat::Json => SourceId::Json,
            SourceFormat::Auto => {
                let extension = self
                    .path
                    .extension()
                    .and_then(|ext| ext.to_str())
                    .map(str::to_ascii_lowercase);
                match extension.as_deref() {
                    Some("csv") => SourceId::Csv,
                    Some("json") => SourceId::Json,
                    _ => match contents.and_then(|text| text.trim_start().chars().next()) {
                        Some('[') | Some('{') => SourceId::Json,
                        _ => SourceId::Csv,
                    },
                }
            }
        }
    }
}

impl BarSource for FileBarSource {
    fn id(&self) -> SourceId {
        self.resolved_format(None)
    }

    fn load(&self) -> Result<LoadedBars, SourceError> {
        let contents = fs::read_to_string(&self.path).map_err(|error| {
            let message = format!("cannot read '{}': {error}", self.path.display());
            match error.kind() {
                io::ErrorKind::NotFound => SourceError::not_found(self.id(), message),
                _ => SourceError::io(self.id(), message),
            }
        })?;
        let contents = contents.trim_start_matches('\u{feff}');

        let source = self.resolved_format(Some(contents));
        let bars = match source {
            SourceId::Json => parse_json_bars(contents)?,
            _ => parse_csv_bars(contents)?,
        };

        debug!(
            path = %self.path.display(),
            format = %source,
            rows = bars.len(),
            "loaded bar file"
        );
        Ok(LoadedBars { source, bars })
    }
}

/// Parses bars from JSON text.
pub fn parse_json_bars(contents: &str) -> Result<Vec<PriceBar>, SourceError> {
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let value: Value = serde_json::from_str(contents)
        .map_err(|error| malformed_json(format!("invalid JSON: {error}")))?;

    match value {
        Value::Array(_) => bars_from_value(value),
        Value::Object(mut object) => {
            if let Some(bars) = object.remove("bars") {
                return bars_from_value(bars);
            }
            match (object.remove("columns"), object.remove("rows")) {
                (Some(columns), Some(rows)) => bars_from_table(&columns, &rows),
                _ => Err(malformed_json(
                    "JSON object must contain 'bars' or 'columns' and 'rows'",
                )),
            }
        }
        _ => Err(malformed_json("JSON input must be an array or an object")),
    }
}

fn malformed_json(message: impl Into<String>) -> SourceError {
    SourceError::malformed(SourceId::Json, message)
}

fn bars_from_value(value: Value) -> Result<Vec<PriceBar>, SourceError> {
    serde_json::from_value(value)
        .map_err(|error| malformed_json(format!("invalid bar record: {error}")))
}

fn bars_from_table(columns: &Value, rows: &Value) -> Result<Vec<PriceBar>, SourceError> {
    let names: Vec<String> = columns
        .as_array()
        .ok_or_else(|| malformed_json("'columns' must be an array"))?
        .iter()
        .map(|name| name.as_str().unwrap_or_default().trim().to_ascii_lowercase())
        .collect();
    let layout = ColumnLayout::from_names(&names).map_err(malformed_json)?;

    let rows = rows
        .as_array()
        .ok_or_else(|| malformed_json("'rows' must be an array"))?;

    rows.iter()
        .enumerate()
        .map(|(line, row)| {
            let cells = row
                .as_array()
                .ok_or_else(|| malformed_json(format!("row {line} must be an array")))?;
            let cell = |index: Option<usize>| index.and_then(|index| cells.get(index));
            let date = match cell(Some(layout.date)) {
                Some(Value::Number(number)) => number
                    .as_i64()
                    .map(BarDate::Millis)
                    .unwrap_or_else(|| BarDate::Text(number.to_string())),
                Some(Value::String(text)) => BarDate::Text(text.clone()),
                _ => BarDate::Text(String::new()),
            };
            Ok(PriceBar {
                date,
                open: cell(layout.open).and_then(parse_price_cell),
                high: cell(layout.high).and_then(parse_price_cell),
                low: cell(layout.low).and_then(parse_price_cell),
                close: cell(Some(layout.close)).and_then(parse_price_cell),
                volume: cell(layout.volume)
                    .and_then(parse_price_cell)
                    .filter(|volume| volume.is_finite() && *volume >= 0.0)
                    .map(|volume| volume.round() as u64),
            })
        })
        .collect()
}

/// Parses bars from CSV text with a header row.
///
/// Cells are trimmed, rows may be shorter or longer than the header, quoted
/// cells may span lines, and a leading UTF-8 byte order mark is ignored.
pub fn parse_csv_bars(contents: &str) -> Result<Vec<PriceBar>, SourceError> {
    let contents = contents.trim_start_matches('\u{feff}');
    if contents.trim().is_empty() {
        return Ok(Vec::new());
    }

    let mut reader = ReaderBuilder::new()
        .trim(Trim::All)
        .flexible(true)
        .from_reader(contents.as_bytes());

    let names: Vec<String> = reader
        .headers()
        .map_err(malformed_csv)?
        .iter()
        .map(str::to_ascii_lowercase)
        .collect();
    let layout = ColumnLayout::from_names(&names)
        .map_err(|message| SourceError::malformed(SourceId::Csv, message))?;

    let mut bars = Vec::new();
    for record in reader.records() {
        let record = record.map_err(malformed_csv)?;
        if record.iter().all(str::is_empty) {
            continue;
        }

        let cell = |index: Option<usize>| index.and_then(|index| record.get(index));
        let price = |index: Option<usize>| cell(index).and_then(|cell| cell.parse::<f64>().ok());

        if record.len() <= layout.date.max(layout.close) {
            debug!(
                line = record.position().map_or(0, |position| position.line()),
                "short CSV row, missing cells read as empty"
            );
        }

        bars.push(PriceBar {
            date: BarDate::Text(cell(Some(layout.date)).unwrap_or_default().to_owned()),
            open: price(layout.open),
            high: price(layout.high),
            low: price(layout.low),
            close: price(Some(layout.close)),
            volume: price(layout.volume)
                .filter(|volume| volume.is_finite() && *volume >= 0.0)
                .map(|volume| volume.round() as u64),
        });
    }

    Ok(bars)
}

fn malformed_csv(error: csv::Error) -> SourceError {
    SourceError::malformed(SourceId::Csv, format!("invalid CSV: {error}"))
}

/// Column positions resolved from a header.
struct ColumnLayout {
    date: usize,
    close: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    volume: Option<usize>,
}

impl ColumnLayout {
    fn from_names(names: &[String]) -> Result<Self, &'static str> {
        let find = |candidates: &[&str]| {
            names
                .iter()
                .position(|name| candidates.contains(&name.as_str()))
        };

        let date = find(&["date", "ts", "timestamp"]).ok_or("missing 'date' column")?;
        let close = find(&["close"]).ok_or("missing 'close' column")?;

        Ok(Self {
            date,
            close,
            open: find(&["open"]),
            high: find(&["high"]),
            low: find(&["low"]),
            volume: find(&["volume"]),
        })
    }
}
