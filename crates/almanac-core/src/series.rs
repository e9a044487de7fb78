//! Chronological normalization of raw bars.

use serde::Serialize;
use tracing::debug;

use crate::{BarDate, PriceBar, DAY_MS};

/// A bar reduced to what the recurrence scan reads, with its resolved timestamp.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesPoint {
    /// Index of the bar in the caller's input.
    pub position: usize,
    /// Resolved epoch milliseconds (synthesized when the date is unparsable).
    pub ts: i64,
    pub date: BarDate,
    pub close: Option<f64>,
}

impl SeriesPoint {
    pub fn finite_close(&self) -> Option<f64> {
        self.close.filter(|close| close.is_finite())
    }
}

/// Bars sorted ascending by resolved timestamp; ties keep input order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct OrderedSeries {
    points: Vec<SeriesPoint>,
    synthesized: usize,
}

impl OrderedSeries {
    /// Orders `rows` by date. A date that does not parse falls back to
    /// `position * DAY_MS`, so malformed input still has a total order.
    pub fn build(rows: impl IntoIterator<Item = PriceBar>) -> Self {
        let mut synthesized = 0;
        let mut points: Vec<SeriesPoint> = rows
            .into_iter()
            .enumerate()
            .map(|(position, bar)| {
                let ts = bar.date.resolve_millis().unwrap_or_else(|| {
                    synthesized += 1;
                    position as i64 * DAY_MS
                });
                SeriesPoint {
                    position,
                    ts,
                    date: bar.date,
                    close: bar.close,
                }
            })
            .collect();

        points.sort_by_key(|point| point.ts);

        if synthesized > 0 {
            debug!(
                rows = points.len(),
                synthesized, "unparsable dates ordered by input position"
            );
        }

        Self {
            points,
            synthesized,
        }
    }

    pub fn points(&self) -> &[SeriesPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Number of rows whose timestamp was synthesized from input position.
    pub fn synthesized_count(&self) -> usize {
        self.synthesized
    }

    pub fn finite_closes(&self) -> impl Iterator<Item = f64> + '_ {
        self.points.iter().filter_map(SeriesPoint::finite_close)
    }

    /// Chronological index of the first row matching `query`.
    ///
    /// A parsable query is compared by timestamp, anything else by the raw
    /// date text.
    pub fn find_date(&self, query: &str) -> Option<usize> {
        let query = query.trim();
        match BarDate::from(query).resolve_millis() {
            Some(ts) => self
                .points
                .iter()
                .position(|point| point.date.resolve_millis() == Some(ts)),
            None => self
                .points
                .iter()
                .position(|point| point.date.to_string() == query),
        }
    }
}
