//! Rows inside the tolerance band of one reference day.

use almanac_core::{band_members, OrderedSeries, RecurrenceScanner, Relation};
use serde_json::{json, Value};
use tracing::info;

use crate::cli::BandArgs;
use crate::error::CliError;

use super::{series_warnings, with_header, CommandResult, LoadedSeries, SeriesRequest};

pub fn run(args: &BandArgs) -> Result<CommandResult, CliError> {
    let request = SeriesRequest::from_args(&args.series)?;
    let empty = with_header(
        &request,
        json!({ "date": args.date, "reference": Value::Null, "members": [] }),
    );
    let loaded = match request.load(empty) {
        LoadedSeries::Ready(loaded) => loaded,
        LoadedSeries::Unavailable(result) => return Ok(result),
    };

    let series = OrderedSeries::build(loaded.bars);
    let reference = series
        .find_date(&args.date)
        .ok_or_else(|| CliError::Command(format!("no row dated '{}' in the series", args.date)))?;

    let records = RecurrenceScanner::new(request.tolerance).scan(&series);
    let anchor = records.get(reference).ok_or_else(|| {
        CliError::Command(format!("row {reference} is outside the analysed series"))
    })?;
    let members = band_members(&records, reference);

    let mut warnings = series_warnings(&series);
    if anchor.lower_bound.is_none() {
        warnings.push(format!(
            "reference day '{}' has no finite close; its band is empty",
            args.date
        ));
    }

    let count = |relation: Relation| {
        members
            .iter()
            .filter(|member| member.relation == relation)
            .count()
    };
    info!(
        reference,
        members = members.len(),
        "band membership computed"
    );

    let data = with_header(
        &request,
        json!({
            "date": args.date,
            "reference": serde_json::to_value(anchor)?,
            "before": count(Relation::Before),
            "after": count(Relation::After),
            "members": serde_json::to_value(&members)?,
        }),
    );

    Ok(request.finish(data, loaded.source).with_warnings(warnings))
}
