mod band;
mod export;
mod variation;

use std::time::Instant;

use almanac_core::{
    BarSource, Envelope, EnvelopeError, FileBarSource, LoadedBars, OrderedSeries, SourceId,
    Symbol, Tolerance,
};
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::cli::{Cli, Command, SeriesArgs};
use crate::error::CliError;
use crate::metadata::Metadata;

#[derive(Debug)]
pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<EnvelopeError>,
    pub latency_ms: u64,
    pub source_chain: Vec<SourceId>,
    pub tolerance: Option<Tolerance>,
}

impl CommandResult {
    pub fn ok(data: Value, source_chain: Vec<SourceId>) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            source_chain,
            tolerance: None,
        }
    }

    pub fn with_warnings(mut self, warnings: Vec<String>) -> Self {
        self.warnings.extend(warnings);
        self
    }

    pub fn with_errors(mut self, errors: Vec<EnvelopeError>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = Some(tolerance);
        self
    }
}

pub fn run(cli: &Cli) -> Result<Envelope<Value>, CliError> {
    let command_result = match &cli.command {
        Command::Variation(args) => variation::run(args)?,
        Command::Band(args) => band::run(args)?,
        Command::Export(args) => export::run(args)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        source_chain,
        tolerance,
    } = command_result;

    let metadata = Metadata::new();
    debug!(
        request_id = %metadata.request_id,
        trace_id = %metadata.trace_id,
        sources = ?source_chain,
        latency_ms,
        "command finished"
    );

    let mut meta = metadata
        .into_envelope_meta(source_chain)?
        .with_latency(latency_ms)
        .with_warnings(warnings);
    if let Some(tolerance) = tolerance {
        meta = meta.with_tolerance(tolerance);
    }

    Ok(Envelope::new(meta, data, errors))
}

/// Validated inputs of a series command.
pub struct SeriesRequest {
    source: FileBarSource,
    pub tolerance: Tolerance,
    pub symbol: Option<Symbol>,
    started: Instant,
}

/// Outcome of loading the requested series.
pub enum LoadedSeries {
    Ready(LoadedBars),
    /// The series could not be obtained; carries the finished command result.
    Unavailable(CommandResult),
}

impl SeriesRequest {
    pub fn from_args(args: &SeriesArgs) -> Result<Self, CliError> {
        let tolerance = Tolerance::new(args.tolerance)?;
        let symbol = args.symbol.as_deref().map(Symbol::parse).transpose()?;

        Ok(Self {
            source: FileBarSource::new(&args.file, args.input_format.into()),
            tolerance,
            symbol,
            started: Instant::now(),
        })
    }

    pub fn symbol_value(&self) -> Value {
        self.symbol
            .as_ref()
            .map_or(Value::Null, |symbol| Value::String(symbol.to_string()))
    }

    pub fn elapsed_ms(&self) -> u64 {
        u64::try_from(self.started.elapsed().as_millis()).unwrap_or(u64::MAX)
    }

    /// Loads the bars, or builds the `series_unavailable` result on failure.
    pub fn load(&self, empty_data: Value) -> LoadedSeries {
        match self.source.load() {
            Ok(loaded) => LoadedSeries::Ready(loaded),
            Err(error) => {
                warn!(
                    path = %self.source.path().display(),
                    code = error.code(),
                    "series unavailable: {}",
                    error.message()
                );
                let result = self
                    .finish(empty_data, error.origin())
                    .with_errors(vec![EnvelopeError::series_unavailable(&error)]);
                LoadedSeries::Unavailable(result)
            }
        }
    }

    /// Result carrying this request's tolerance and elapsed time.
    pub fn finish(&self, data: Value, source: SourceId) -> CommandResult {
        CommandResult::ok(data, vec![source])
            .with_tolerance(self.tolerance)
            .with_latency(self.elapsed_ms())
    }

    /// Shared data fields echoed by every series command.
    pub fn header(&self) -> Value {
        json!({
            "symbol": self.symbol_value(),
            "source": self.source.path().display().to_string(),
            "tolerance_pct": self.tolerance.percent(),
        })
    }
}

/// Warnings about degenerate but valid input.
pub fn series_warnings(series: &OrderedSeries) -> Vec<String> {
    let mut warnings = Vec::new();

    if series.is_empty() {
        warnings.push(String::from("series is empty; no records produced"));
    }

    let synthesized = series.synthesized_count();
    if synthesized > 0 {
        warnings.push(format!(
            "{synthesized} row(s) had unparsable dates and were ordered by input position"
        ));
    }

    let missing = series.len() - series.finite_closes().count();
    if missing > 0 {
        warnings.push(format!(
            "{missing} row(s) had no finite close and were excluded from matching"
        ));
    }

    warnings
}

/// Merges `extra` fields into the request header object.
pub fn with_header(request: &SeriesRequest, extra: Value) -> Value {
    let mut data = request.header();
    if let (Value::Object(target), Value::Object(fields)) = (&mut data, extra) {
        target.extend(fields);
    }
    data
}
