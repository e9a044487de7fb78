//! Export recurrence records to CSV.

use std::io::Write;
use std::path::Path;

use almanac_core::{OrderedSeries, RecurrenceRecord, RecurrenceScanner};
use csv::Writer;
use serde_json::json;
use tracing::info;

use crate::cli::ExportArgs;
use crate::error::CliError;

use super::{series_warnings, with_header, CommandResult, LoadedSeries, SeriesRequest};

const HEADER: [&str; 6] = [
    "date",
    "close",
    "lower_bound",
    "upper_bound",
    "past_offset",
    "future_offset",
];

pub fn run(args: &ExportArgs) -> Result<CommandResult, CliError> {
    let request = SeriesRequest::from_args(&args.series)?;
    let output = args.output.display().to_string();
    let empty = with_header(
        &request,
        json!({ "output": output, "rows_exported": 0, "exported": false }),
    );
    let loaded = match request.load(empty) {
        LoadedSeries::Ready(loaded) => loaded,
        LoadedSeries::Unavailable(result) => return Ok(result),
    };

    let series = OrderedSeries::build(loaded.bars);
    let records = RecurrenceScanner::new(request.tolerance).scan(&series);
    export_csv(&args.output, &records)?;
    info!(rows = records.len(), output = %output, "exported recurrence records");

    let data = with_header(
        &request,
        json!({
            "format": "csv",
            "output": output,
            "rows_exported": records.len(),
            "exported": true,
        }),
    );

    Ok(request
        .finish(data, loaded.source)
        .with_warnings(series_warnings(&series)))
}

fn export_csv(output_path: &Path, records: &[RecurrenceRecord]) -> Result<(), CliError> {
    let mut writer = Writer::from_path(output_path)?;
    write_records(&mut writer, records)?;
    writer.flush()?;
    Ok(())
}

fn write_records<W: Write>(
    writer: &mut Writer<W>,
    records: &[RecurrenceRecord],
) -> csv::Result<()> {
    writer.write_record(HEADER)?;
    for record in records {
        writer.write_record([
            record.date.to_string(),
            number(record.close),
            number(record.lower_bound),
            number(record.upper_bound),
            record.past_offset.to_string(),
            record.future_offset.to_string(),
        ])?;
    }
    Ok(())
}

/// Empty cell for absent or non-finite values.
fn number(value: Option<f64>) -> String {
    value
        .filter(|value| value.is_finite())
        .map(|value| value.to_string())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use almanac_core::{analyze, PriceBar, Tolerance};

    use crate::cli::{InputFormat, SeriesArgs};

    #[test]
    fn writes_one_line_per_record() {
        let records = analyze(
            vec![
                PriceBar::new("2024-01-01", Some(100.0)),
                PriceBar::new("2024-01-02", None),
                PriceBar::new("2024-01-03", Some(100.0)),
            ],
            Tolerance::new(0.0).expect("valid"),
        );

        let text = written(&records);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines,
            vec![
                "date,close,lower_bound,upper_bound,past_offset,future_offset",
                "2024-01-01,100,100,100,0,2",
                "2024-01-02,,,,0,0",
                "2024-01-03,100,100,100,2,0",
            ]
        );
    }

    #[test]
    fn quotes_dates_that_need_it() {
        let records = analyze(
            vec![PriceBar::new(r#"Jan 2, "24"#, Some(1.0))],
            Tolerance::default(),
        );

        let text = written(&records);
        assert_eq!(text.lines().nth(1), Some(r#""Jan 2, ""24",1,0.99,1.01,0,0"#));
    }

    fn written(records: &[RecurrenceRecord]) -> String {
        let mut sink = Vec::new();
        {
            let mut writer = Writer::from_writer(&mut sink);
            write_records(&mut writer, records).expect("write");
            writer.flush().expect("flush");
        }
        String::from_utf8(sink).expect("utf8")
    }

    #[test]
    fn export_command_writes_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let input = dir.path().join("bars.csv");
        let output = dir.path().join("out.csv");
        std::fs::write(&input, "date,close\n2024-01-01,10\n2024-01-02,10\n").expect("write");

        let result = run(&ExportArgs {
            series: SeriesArgs {
                file: input,
                tolerance: 1.0,
                input_format: InputFormat::Csv,
                symbol: None,
            },
            output: output.clone(),
        })
        .expect("export runs");

        assert_eq!(result.data["rows_exported"], 2);
        let written = std::fs::read_to_string(output).expect("output exists");
        assert_eq!(written.lines().count(), 3);
    }
}
