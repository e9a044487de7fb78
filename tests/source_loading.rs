//! Behavior tests for loading bar series from files.

use std::fs;

use almanac_core::{
    BarSource, FileBarSource, MemoryBarSource, SourceErrorKind, SourceFormat, SourceId,
};
use almanac_tests::{analyze, pct, PriceBar};
use tempfile::tempdir;

#[test]
fn user_can_analyse_an_upstream_csv_export() {
    // Given: a CSV export with capitalised headers and extra columns
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("spx.csv");
    fs::write(
        &path,
        "Date,Open,High,Low,Close,Adj Close,Volume\n\
         2024-01-02,4745.2,4754.3,4722.6,4742.8,4742.8,3743050000\n\
         2024-01-03,4725.0,4729.2,4699.7,4704.8,4704.8,3950760000\n\
         2024-01-04,4697.4,4726.7,4687.5,4688.6,4688.6,3715480000\n\
         2024-01-05,4690.5,4721.4,4682.1,4697.2,4697.2,3844370000\n",
    )
    .expect("write fixture");

    // When: the file is loaded with format detection
    let source = FileBarSource::new(&path, SourceFormat::Auto);
    let loaded = source.load().expect("csv should load");
    let bars = loaded.bars;

    // Then: every row arrives with its close and volume
    assert_eq!(loaded.source, SourceId::Csv);
    assert_eq!(bars.len(), 4);
    assert_eq!(bars[0].close, Some(4742.8));
    assert_eq!(bars[3].volume, Some(3_844_370_000));

    // And: the series can be analysed directly
    let records = analyze(bars, pct(0.5));
    assert_eq!(records[3].past_match, Some(2));
    assert_eq!(records[3].past_offset, 1);
}

#[test]
fn user_can_analyse_a_dashboard_data_response() {
    // Given: the `{ columns, rows }` table the dashboard returns
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("spx.json");
    fs::write(
        &path,
        r#"{
            "columns": ["Date", "Open", "High", "Low", "Close", "Volume"],
            "rows": [
                ["2024-01-02", 1.0, 1.0, 1.0, 10.0, 100],
                ["2024-01-03", 1.0, 1.0, 1.0, null, 100],
                ["2024-01-04", 1.0, 1.0, 1.0, "10.05", 100]
            ]
        }"#,
    )
    .expect("write fixture");

    // When: it is loaded and analysed
    let bars = FileBarSource::new(&path, SourceFormat::Auto)
        .load()
        .expect("json should load")
        .bars;
    let records = analyze(bars, pct(1.0));

    // Then: the null close is a placeholder and the others match across it
    assert_eq!(records[1].lower_bound, None);
    assert_eq!(records[2].past_match, Some(0));
    assert_eq!(records[2].past_offset, 2);
}

#[test]
fn user_can_load_a_bar_series_document() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("series.json");
    fs::write(
        &path,
        r#"{
            "symbol": "AAPL",
            "interval": "1d",
            "bars": [
                {"ts": "2024-01-02T00:00:00Z", "open": 1, "high": 2, "low": 0.5, "close": 1.5, "volume": 10},
                {"ts": "2024-01-03T00:00:00Z", "open": 1, "high": 2, "low": 0.5, "close": 1.5, "volume": 10}
            ]
        }"#,
    )
    .expect("write fixture");

    let bars = FileBarSource::new(&path, SourceFormat::Json)
        .load()
        .expect("bars document should load")
        .bars;

    assert_eq!(bars.len(), 2);
    assert_eq!(analyze(bars, pct(0.0))[1].past_offset, 1);
}

#[test]
fn explicit_format_overrides_extension() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("bars.data");
    fs::write(&path, "date,close\n2024-01-02,3\n").expect("write fixture");

    let source = FileBarSource::new(&path, SourceFormat::Csv);
    assert_eq!(source.id(), SourceId::Csv);
    assert_eq!(source.load().expect("csv").bars.len(), 1);

    let err = FileBarSource::new(&path, SourceFormat::Json)
        .load()
        .expect_err("csv text is not json");
    assert_eq!(err.kind(), SourceErrorKind::Malformed);
}

#[test]
fn empty_file_is_an_empty_series_not_a_failure() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("empty.csv");
    fs::write(&path, "").expect("write fixture");

    let bars = FileBarSource::new(&path, SourceFormat::Auto)
        .load()
        .expect("empty file loads")
        .bars;
    assert!(bars.is_empty());
    assert!(analyze(bars, pct(1.0)).is_empty());
}

#[test]
fn missing_file_reports_not_found() {
    let dir = tempdir().expect("tempdir");
    let err = FileBarSource::new(dir.path().join("absent.json"), SourceFormat::Auto)
        .load()
        .expect_err("absent file must fail");

    assert_eq!(err.kind(), SourceErrorKind::NotFound);
    assert_eq!(err.code(), "source.not_found");
    assert!(err.message().contains("absent.json"));
}

#[test]
fn csv_without_required_columns_is_malformed() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("prices.csv");
    fs::write(&path, "day,price\n2024-01-02,3\n").expect("write fixture");

    let err = FileBarSource::new(&path, SourceFormat::Auto)
        .load()
        .expect_err("headers are wrong");
    assert_eq!(err.kind(), SourceErrorKind::Malformed);
    assert!(!err.retryable());
}

#[test]
fn memory_source_feeds_the_same_analysis() {
    let bars = vec![
        PriceBar::new("2024-01-02", Some(20.0)),
        PriceBar::new("2024-01-09", Some(20.1)),
    ];
    let source = MemoryBarSource::new(bars);

    let records = analyze(source.load().expect("memory").bars, pct(1.0));
    assert_eq!(records[1].past_offset, 7);
}

#[test]
fn spreadsheet_export_with_bom_and_quoted_notes_loads() {
    // Given: a BOM-prefixed export whose note column holds a quoted line break
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("notes.csv");
    fs::write(
        &path,
        "\u{feff}Date,Note,Close\n\
         2024-01-02,\"gap up\nthen faded\",10\n\
         2024-01-03,\"flat, quiet\",10.05\n",
    )
    .expect("write fixture");

    // When: the file is loaded and analysed
    let loaded = FileBarSource::new(&path, SourceFormat::Auto)
        .load()
        .expect("export should load");
    let records = analyze(loaded.bars, pct(1.0));

    // Then: each quoted record stays one bar and keeps its close
    assert_eq!(loaded.source, SourceId::Csv);
    assert_eq!(records.len(), 2);
    assert_eq!(records[0].close, Some(10.0));
    assert_eq!(records[1].past_offset, 1);
}

#[test]
fn extensionless_json_reports_json_as_its_source() {
    // Given: a JSON document saved without an extension
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("closes");
    fs::write(&path, r#"[{"date":"2024-01-02","close":5.0}]"#).expect("write fixture");

    // When: it is loaded with format detection
    let source = FileBarSource::new(&path, SourceFormat::Auto);
    let loaded = source.load().expect("json should load");

    // Then: the sniffed reader is the one reported
    assert_eq!(loaded.source, SourceId::Json);
    assert_eq!(loaded.bars.len(), 1);
}
