//! Behavior tests for the recurrence scan on small hand-built series.
//!
//! These describe WHAT a user sees for typical and degenerate inputs.

use almanac_core::{band_members, Relation};
use almanac_tests::{analyze, daily_bars, pct, PriceBar, DAY_MS, EPOCH_2024};

// =============================================================================
// Reference scenarios
// =============================================================================

#[test]
fn nearest_earlier_match_wins_over_older_ones() {
    // Given: four consecutive days closing at 100, 101, 99, 100.5
    let bars = daily_bars(&[Some(100.0), Some(101.0), Some(99.0), Some(100.5)]);

    // When: the series is scanned with a 1% band
    let records = analyze(bars, pct(1.0));

    // Then: day 3 (band [99.495, 101.505]) looks back to day 1, not day 0
    assert_eq!(records[3].past_match, Some(1));
    assert_eq!(records[3].past_offset, 2);

    // And: day 0 (band [99, 101]) finds day 1 on the upper edge
    assert_eq!(records[0].future_match, Some(1));
    assert_eq!(records[0].future_offset, 1);

    // And: day 2 at 99 has nothing within [98.01, 99.99]
    assert_eq!(records[2].past_offset, 0);
    assert_eq!(records[2].future_offset, 0);
}

#[test]
fn single_row_reports_its_own_band_and_no_offsets() {
    // Given: a series with one day
    let records = analyze(daily_bars(&[Some(200.0)]), pct(1.0));

    // Then: one record, bounds from its own close, no matches
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].lower_bound, Some(198.0));
    assert_eq!(records[0].upper_bound, Some(202.0));
    assert_eq!((records[0].past_offset, records[0].future_offset), (0, 0));
}

#[test]
fn flat_series_matches_adjacent_days() {
    // Given: fifty days all closing at 100
    let records = analyze(daily_bars(&[Some(100.0); 50]), pct(1.0));

    // Then: every day points at its immediate neighbours
    for (row, record) in records.iter().enumerate() {
        let expected_past = if row == 0 { 0 } else { 1 };
        let expected_future = if row == 49 { 0 } else { 1 };
        assert_eq!(record.past_offset, expected_past, "row {row}");
        assert_eq!(record.future_offset, expected_future, "row {row}");
    }
}

#[test]
fn missing_close_is_skipped_by_neighbours() {
    // Given: a day without a close between two matching days
    let records = analyze(daily_bars(&[Some(10.0), None, Some(10.0)]), pct(1.0));

    // Then: the gap row has no bounds and no offsets
    assert_eq!(records[1].lower_bound, None);
    assert_eq!(records[1].upper_bound, None);
    assert_eq!((records[1].past_offset, records[1].future_offset), (0, 0));

    // And: its neighbours match each other across it
    assert_eq!(records[0].future_match, Some(2));
    assert_eq!(records[0].future_offset, 2);
    assert_eq!(records[2].past_match, Some(0));
}

// =============================================================================
// Calendar handling
// =============================================================================

#[test]
fn offsets_are_calendar_days_across_weekends() {
    // Given: Friday and the following Monday at the same close
    let bars = vec![
        PriceBar::new("2024-03-08", Some(42.0)),
        PriceBar::new("2024-03-11", Some(42.0)),
    ];

    // Then: the offset is three days, not one row
    let records = analyze(bars, pct(0.5));
    assert_eq!(records[1].past_offset, 3);
    assert_eq!(records[0].future_offset, 3);
}

#[test]
fn unsorted_input_is_reported_chronologically() {
    // Given: rows delivered newest first
    let bars = vec![
        PriceBar::new("2024-01-03", Some(5.0)),
        PriceBar::new("2024-01-02", Some(9.0)),
        PriceBar::new("2024-01-01", Some(5.0)),
    ];

    // Then: records are ascending by date and keep their input position
    let records = analyze(bars, pct(1.0));
    let positions: Vec<usize> = records.iter().map(|record| record.position).collect();
    assert_eq!(positions, vec![2, 1, 0]);
    assert_eq!(records[2].past_offset, 2);
}

#[test]
fn unparsable_dates_fall_back_to_input_position() {
    // Given: dates nobody can parse
    let bars = vec![
        PriceBar::new("first", Some(1.0)),
        PriceBar::new("second", Some(2.0)),
        PriceBar::new("third", Some(1.0)),
    ];

    // Then: rows stay in input order, one synthetic day apart
    let records = analyze(bars, pct(0.0));
    let ts: Vec<i64> = records.iter().map(|record| record.ts).collect();
    assert_eq!(ts, vec![0, DAY_MS, 2 * DAY_MS]);
    assert_eq!(records[2].past_offset, 2);
}

#[test]
fn mixed_date_representations_order_together() {
    // Given: the same calendar in millis, plain dates, and RFC3339
    let bars = vec![
        PriceBar::new("2024-01-03T00:00:00Z", Some(7.0)),
        PriceBar::new(EPOCH_2024, Some(7.0)),
        PriceBar::new("2024-01-02", Some(3.0)),
    ];

    // Then: they interleave by timestamp
    let records = analyze(bars, pct(1.0));
    assert_eq!(records[0].ts, EPOCH_2024);
    assert_eq!(records[2].past_match, Some(0));
    assert_eq!(records[2].past_offset, 2);
}

// =============================================================================
// Band highlight
// =============================================================================

#[test]
fn band_highlight_lists_rows_on_both_sides() {
    // Given: a reference day with matches before and after it
    let records = analyze(
        daily_bars(&[Some(99.5), Some(80.0), Some(100.0), Some(101.0), Some(120.0)]),
        pct(1.0),
    );

    // When: the band of day 2 is highlighted
    let members = band_members(&records, 2);

    // Then: day 0 precedes, day 3 follows, day 2 is the reference
    let relations: Vec<(usize, Relation)> =
        members.iter().map(|member| (member.index, member.relation)).collect();
    assert_eq!(
        relations,
        vec![
            (0, Relation::Before),
            (2, Relation::Reference),
            (3, Relation::After),
        ]
    );
    assert_eq!(members[0].day_delta, -2);
}
