//! Price-recurrence ("variation") scan.
//!
//! For each day the scanner finds the nearest earlier and the nearest later
//! day whose close lies in `[close*(1-p/100), close*(1+p/100)]`, and reports
//! the calendar-day distance to each. Two sweeps over the series, each backed
//! by its own [`ExtremaIndex`], make this O(n log n).
//!
//! ## Overwrite per rank
//!
//! Each sweep queries before it inserts the current row, then overwrites the
//! leaf at that row's rank. Within one sweep direction, the row last written
//! at a rank is the closest one to every row still to come. So a leaf never
//! needs a running max/min over time, and the tree only aggregates across
//! ranks. This holds for a single monotone sweep per index only. Feeding one
//! index from two sweeps, or reusing it across calls, breaks the argument.

use serde::Serialize;
use tracing::{debug, trace};

use crate::extrema::{Earliest, ExtremaIndex, Latest};
use crate::rank::DistinctValueAxis;
use crate::series::OrderedSeries;
use crate::{day_delta, BarDate, PriceBar, Tolerance};

/// Recurrence result for one day, in chronological order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecurrenceRecord {
    pub date: BarDate,
    /// Resolved epoch milliseconds.
    pub ts: i64,
    /// Index of the row in the caller's input.
    pub position: usize,
    pub close: Option<f64>,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
    /// Days since the nearest earlier match, 0 when none.
    pub past_offset: i64,
    /// Days until the nearest later match, 0 when none.
    pub future_offset: i64,
    /// Chronological index of the earlier match.
    pub past_match: Option<usize>,
    /// Chronological index of the later match.
    pub future_match: Option<usize>,
}

impl RecurrenceRecord {
    /// `true` when `close` is finite and inside this record's band.
    pub fn band_contains(&self, close: f64) -> bool {
        match (self.lower_bound, self.upper_bound) {
            (Some(low), Some(high)) => close.is_finite() && low <= close && close <= high,
            _ => false,
        }
    }
}

/// Drives the two recurrence sweeps for a fixed tolerance.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct RecurrenceScanner {
    tolerance: Tolerance,
}

/// Per-row scan input: rank on the axis and band ranks, absent for rows
/// without a finite close.
struct RowKey {
    rank: usize,
    band: Option<(usize, usize)>,
    bounds: (f64, f64),
}

impl RecurrenceScanner {
    pub fn new(tolerance: Tolerance) -> Self {
        Self { tolerance }
    }

    pub fn tolerance(&self) -> Tolerance {
        self.tolerance
    }

    /// Emits one record per row of `series`, in the same order.
    pub fn scan(&self, series: &OrderedSeries) -> Vec<RecurrenceRecord> {
        let points = series.points();
        let axis = DistinctValueAxis::build(series.finite_closes());

        let keys: Vec<Option<RowKey>> = points
            .iter()
            .map(|point| {
                let close = point.finite_close()?;
                let rank = axis.rank_of(close)?;
                let (low, high) = self.tolerance.band(close);
                Some(RowKey {
                    rank,
                    band: axis.band(low, high).map(|ranks| (*ranks.start(), *ranks.end())),
                    bounds: (low, high),
                })
            })
            .collect();

        let mut past = vec![None; points.len()];
        let mut latest = ExtremaIndex::<Latest>::new(axis.len());
        for (row, key) in keys.iter().enumerate() {
            let Some(key) = key else { continue };
            if let Some((low, high)) = key.band {
                past[row] = latest.query(low, high);
            }
            latest.update(key.rank, row);
        }

        let mut future = vec![None; points.len()];
        let mut earliest = ExtremaIndex::<Earliest>::new(axis.len());
        for (row, key) in keys.iter().enumerate().rev() {
            let Some(key) = key else { continue };
            if let Some((low, high)) = key.band {
                future[row] = earliest.query(low, high);
            }
            earliest.update(key.rank, row);
        }

        let records: Vec<RecurrenceRecord> = points
            .iter()
            .zip(&keys)
            .enumerate()
            .map(|(row, (point, key))| {
                let past_match = past[row];
                let future_match = future[row];
                RecurrenceRecord {
                    date: point.date.clone(),
                    ts: point.ts,
                    position: point.position,
                    close: point.close,
                    lower_bound: key.as_ref().map(|key| key.bounds.0),
                    upper_bound: key.as_ref().map(|key| key.bounds.1),
                    past_offset: past_match
                        .map_or(0, |other| day_delta(points[other].ts, point.ts)),
                    future_offset: future_match
                        .map_or(0, |other| day_delta(point.ts, points[other].ts)),
                    past_match,
                    future_match,
                }
            })
            .collect();

        trace!(
            distinct = axis.len(),
            past_hits = past.iter().flatten().count(),
            future_hits = future.iter().flatten().count(),
            "recurrence sweeps complete"
        );
        debug!(
            rows = records.len(),
            tolerance_pct = self.tolerance.percent(),
            "recurrence scan finished"
        );

        records
    }
}

/// Orders `bars` and scans them with `tolerance`.
pub fn analyze(
    bars: impl IntoIterator<Item = PriceBar>,
    tolerance: Tolerance,
) -> Vec<RecurrenceRecord> {
    let series = OrderedSeries::build(bars);
    RecurrenceScanner::new(tolerance).scan(&series)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pct(percent: f64) -> Tolerance {
        Tolerance::new(percent).expect("valid tolerance")
    }

    fn daily(closes: &[Option<f64>]) -> Vec<PriceBar> {
        closes
            .iter()
            .enumerate()
            .map(|(day, close)| PriceBar::new(format!("2024-03-{:02}", day + 1), *close))
            .collect()
    }

    #[test]
    fn empty_series_yields_no_records() {
        assert!(analyze(Vec::new(), Tolerance::default()).is_empty());
    }

    #[test]
    fn single_row_has_bounds_and_no_offsets() {
        let records = analyze(daily(&[Some(200.0)]), pct(1.0));
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].lower_bound, Some(198.0));
        assert_eq!(records[0].upper_bound, Some(202.0));
        assert_eq!(records[0].past_offset, 0);
        assert_eq!(records[0].future_offset, 0);
        assert_eq!(records[0].past_match, None);
    }

    #[test]
    fn nearest_match_wins_in_both_directions() {
        let records = analyze(
            daily(&[Some(100.0), Some(150.0), Some(100.2), Some(150.0), Some(99.9)]),
            pct(1.0),
        );

        assert_eq!(records[2].past_match, Some(0));
        assert_eq!(records[2].past_offset, 2);
        assert_eq!(records[2].future_match, Some(4));
        assert_eq!(records[2].future_offset, 2);
        assert_eq!(records[1].future_match, Some(3));
        assert_eq!(records[3].past_match, Some(1));
    }

    #[test]
    fn offsets_count_calendar_days_not_rows() {
        let bars = vec![
            PriceBar::new("2024-03-01", Some(50.0)),
            PriceBar::new("2024-03-04", Some(80.0)),
            PriceBar::new("2024-03-05", Some(50.0)),
        ];
        let records = analyze(bars, pct(0.0));
        assert_eq!(records[2].past_offset, 4);
        assert_eq!(records[0].future_offset, 4);
    }

    #[test]
    fn matching_is_not_symmetric() {
        let records = analyze(daily(&[Some(100.0), Some(90.5)]), pct(10.0));
        // 90.5 is inside [90, 110]; 100 is outside [81.45, 99.55].
        assert_eq!(records[0].future_match, Some(1));
        assert_eq!(records[1].past_match, None);
    }

    #[test]
    fn non_finite_close_is_a_placeholder_and_never_matched() {
        let records = analyze(
            daily(&[Some(10.0), None, Some(f64::INFINITY), Some(10.0)]),
            pct(5.0),
        );

        for placeholder in &records[1..3] {
            assert_eq!(placeholder.lower_bound, None);
            assert_eq!(placeholder.upper_bound, None);
            assert_eq!(placeholder.past_offset, 0);
            assert_eq!(placeholder.future_offset, 0);
        }
        assert_eq!(records[3].past_match, Some(0));
        assert_eq!(records[3].past_offset, 3);
    }

    #[test]
    fn record_band_contains_is_closed() {
        let records = analyze(daily(&[Some(100.0)]), pct(2.0));
        let low = records[0].lower_bound.expect("finite close has bounds");
        let high = records[0].upper_bound.expect("finite close has bounds");
        assert!(records[0].band_contains(low));
        assert!(records[0].band_contains(high));
        assert!(records[0].band_contains(99.0));
        assert!(!records[0].band_contains(102.5));
        assert!(!records[0].band_contains(f64::NAN));
    }

    #[test]
    fn extreme_epoch_millis_do_not_overflow_offsets() {
        let records = analyze(
            vec![
                PriceBar::new(i64::MIN, Some(1.0)),
                PriceBar::new(i64::MAX, Some(1.0)),
            ],
            Tolerance::default(),
        );

        assert_eq!(records[1].past_match, Some(0));
        assert_eq!(records[1].past_offset, 213_503_982_335);
        assert_eq!(records[0].future_offset, 213_503_982_335);
    }

    #[test]
    fn repeated_scans_are_identical() {
        let bars = daily(&[Some(3.0), Some(3.1), Some(2.9), Some(3.0), None, Some(3.05)]);
        let series = OrderedSeries::build(bars);
        let scanner = RecurrenceScanner::new(pct(3.0));
        assert_eq!(scanner.scan(&series), scanner.scan(&series));
    }
}
