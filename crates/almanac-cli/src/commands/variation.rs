//! Recurrence offsets for every day of a series.

use almanac_core::{OrderedSeries, RecurrenceScanner};
use serde_json::json;
use tracing::info;

use crate::cli::VariationArgs;
use crate::error::CliError;

use super::{series_warnings, with_header, CommandResult, LoadedSeries, SeriesRequest};

pub fn run(args: &VariationArgs) -> Result<CommandResult, CliError> {
    let request = SeriesRequest::from_args(&args.series)?;
    let empty = with_header(&request, json!({ "count": 0, "records": [] }));
    let loaded = match request.load(empty) {
        LoadedSeries::Ready(loaded) => loaded,
        LoadedSeries::Unavailable(result) => return Ok(result),
    };

    let series = OrderedSeries::build(loaded.bars);
    let records = RecurrenceScanner::new(request.tolerance).scan(&series);
    info!(
        rows = records.len(),
        tolerance = %request.tolerance,
        "variation computed"
    );

    let data = with_header(
        &request,
        json!({
            "count": records.len(),
            "records": serde_json::to_value(&records)?,
        }),
    );

    Ok(request
        .finish(data, loaded.source)
        .with_warnings(series_warnings(&series)))
}
