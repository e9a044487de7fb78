pub mod stream_writer;

use std::io::{self, Write};

use almanac_core::Envelope;
use serde_json::{json, Map, Value};

use self::stream_writer::{NdjsonStreamWriter, Tally};
use crate::cli::OutputFormat;
use crate::error::CliError;

/// Rows per `chunk` event in stream mode.
pub const CHUNK_ROWS: usize = 250;

/// Data fields holding row arrays, in lookup order.
const ROW_FIELDS: [&str; 2] = ["records", "members"];

pub fn render(
    envelope: &Envelope<Value>,
    format: OutputFormat,
    pretty: bool,
) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();

    match format {
        OutputFormat::Json => {
            let payload = if pretty {
                serde_json::to_string_pretty(envelope)?
            } else {
                serde_json::to_string(envelope)?
            };
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Ndjson => {
            let payload = serde_json::to_string(envelope)?;
            writeln!(out, "{payload}")?;
        }
        OutputFormat::Table => write_table(&mut out, envelope)?,
    }

    Ok(())
}

pub fn render_stream(envelope: &Envelope<Value>) -> Result<(), CliError> {
    let stdout = io::stdout();
    let mut writer = NdjsonStreamWriter::new(stdout.lock());
    write_stream(&mut writer, envelope)
}

fn write_stream<W: Write>(
    writer: &mut NdjsonStreamWriter<W>,
    envelope: &Envelope<Value>,
) -> Result<(), CliError> {
    writer.start(&json!({
        "request_id": envelope.meta.request_id,
        "trace_id": envelope.meta.trace_id,
        "schema_version": envelope.meta.schema_version,
    }))?;

    let (summary, rows) = split_rows(&envelope.data);
    let tally = Tally {
        row_count: rows.map_or(0, |(_, rows)| rows.len()),
        warning_count: envelope.meta.warnings.len(),
        error_count: envelope.errors.len(),
    };
    writer.progress("command_complete", tally)?;

    writer.chunk(&json!({
        "meta": serde_json::to_value(&envelope.meta)?,
        "data": summary,
    }))?;

    if let Some((field, rows)) = rows {
        for (batch, chunk) in rows.chunks(CHUNK_ROWS).enumerate() {
            writer.chunk(&json!({
                "field": field,
                "offset": batch * CHUNK_ROWS,
                "rows": chunk,
            }))?;
        }
    }

    for error in &envelope.errors {
        writer.error(error)?;
    }

    writer.end(envelope.status(), tally)
}

/// Splits `data` into its scalar fields and the first row array, if any.
fn split_rows(data: &Value) -> (Value, Option<(&'static str, &[Value])>) {
    let Some(object) = data.as_object() else {
        return (data.clone(), None);
    };

    let rows = ROW_FIELDS.iter().find_map(|field| {
        object
            .get(*field)
            .and_then(Value::as_array)
            .map(|rows| (*field, rows.as_slice()))
    });

    let summary: Map<String, Value> = object
        .iter()
        .filter(|(key, _)| rows.map_or(true, |(field, _)| key.as_str() != field))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();

    (Value::Object(summary), rows)
}

fn write_table<W: Write>(out: &mut W, envelope: &Envelope<Value>) -> Result<(), CliError> {
    writeln!(out, "request_id  : {}", envelope.meta.request_id)?;
    writeln!(out, "trace_id    : {}", envelope.meta.trace_id)?;
    writeln!(out, "schema      : {}", envelope.meta.schema_version)?;
    writeln!(out, "generated_at: {}", envelope.meta.generated_at)?;
    writeln!(
        out,
        "sources     : {}",
        envelope
            .meta
            .source_chain
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(",")
    )?;
    if let Some(tolerance) = envelope.meta.tolerance {
        writeln!(out, "tolerance   : {tolerance}")?;
    }
    writeln!(out, "latency_ms  : {}", envelope.meta.latency_ms)?;

    if !envelope.meta.warnings.is_empty() {
        writeln!(out, "warnings:")?;
        for warning in &envelope.meta.warnings {
            writeln!(out, "  - {warning}")?;
        }
    }

    let (summary, rows) = split_rows(&envelope.data);
    writeln!(out, "data:")?;
    for line in serde_json::to_string_pretty(&summary)?.lines() {
        writeln!(out, "  {line}")?;
    }

    if let Some((field, rows)) = rows {
        let columns: &[&str] = match field {
            "members" => &["date", "close", "relation", "day_delta"],
            _ => &[
                "date",
                "close",
                "lower_bound",
                "upper_bound",
                "past_offset",
                "future_offset",
            ],
        };
        writeln!(out, "{field}:")?;
        write_columns(out, columns, rows)?;
    }

    if !envelope.errors.is_empty() {
        writeln!(out, "errors:")?;
        for error in &envelope.errors {
            writeln!(
                out,
                "  - {} [{}]: {}",
                error.code,
                error.source.as_str(),
                error.message
            )?;
        }
    }

    Ok(())
}

fn write_columns<W: Write>(out: &mut W, columns: &[&str], rows: &[Value]) -> io::Result<()> {
    let cells: Vec<Vec<String>> = rows
        .iter()
        .map(|row| columns.iter().map(|column| cell(&row[*column])).collect())
        .collect();

    let widths: Vec<usize> = columns
        .iter()
        .enumerate()
        .map(|(index, column)| {
            cells
                .iter()
                .map(|row| row[index].len())
                .chain(std::iter::once(column.len()))
                .max()
                .unwrap_or_default()
        })
        .collect();

    let line = |values: Vec<&str>| {
        values
            .iter()
            .zip(&widths)
            .map(|(value, width)| format!("{value:>width$}", width = *width))
            .collect::<Vec<_>>()
            .join("  ")
    };

    writeln!(out, "  {}", line(columns.to_vec()))?;
    for row in &cells {
        writeln!(out, "  {}", line(row.iter().map(String::as_str).collect()))?;
    }
    Ok(())
}

fn cell(value: &Value) -> String {
    match value {
        Value::Null => String::from("-"),
        Value::String(text) => text.clone(),
        Value::Number(number) => match number.as_f64() {
            Some(float) if number.is_f64() => format!("{float:.4}"),
            _ => number.to_string(),
        },
        other => other.to_string(),
    }
}
