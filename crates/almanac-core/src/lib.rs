//! # Almanac Core
//!
//! Price-recurrence analysis for daily close series.
//!
//! ## Overview
//!
//! For every day of a series, the core finds the most recent earlier day and
//! the nearest later day whose close lies within a percentage band of that
//! day's close, and reports how many calendar days away each one is. The scan
//! runs in O(n log n): closes are rank-compressed once, and two sweeps over
//! time query a range-extremum index over those ranks.
//!
//! The crate never fetches market data. A [`BarSource`] supplies a complete
//! series; the analysis itself cannot fail.
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Bars, dates, tolerance, symbols, calendar arithmetic |
//! | [`series`] | Chronological ordering with positional date fallback |
//! | [`rank`] | Sorted distinct close axis with lower/upper bound lookups |
//! | [`extrema`] | Range max/min index over row indices |
//! | [`recurrence`] | Forward and backward recurrence sweeps |
//! | [`highlight`] | Rows inside one day's band |
//! | [`source`] | Bar sources (CSV, JSON, memory) and source errors |
//! | [`envelope`] | Response envelope, status, and `series_unavailable` errors |
//! | [`error`] | Validation errors |
//!
//! ## Quick Start
//!
//! ```rust
//! use almanac_core::{analyze, PriceBar, Tolerance};
//!
//! let bars = vec![
//!     PriceBar::new("2024-01-02", Some(100.0)),
//!     PriceBar::new("2024-01-03", Some(120.0)),
//!     PriceBar::new("2024-01-05", Some(100.5)),
//! ];
//!
//! let records = analyze(bars, Tolerance::default());
//! assert_eq!(records[2].past_offset, 3);
//! assert_eq!(records[0].future_offset, 3);
//! ```

pub mod domain;
pub mod envelope;
pub mod error;
pub mod extrema;
pub mod highlight;
pub mod rank;
pub mod recurrence;
pub mod series;
pub mod source;

// Domain models
pub use domain::{
    day_delta, parse_price_cell, BarDate, PriceBar, Symbol, Tolerance, UtcDateTime, DAY_MS,
};

// Envelope types
pub use envelope::{
    Envelope, EnvelopeError, EnvelopeMeta, EnvelopeStatus, SCHEMA_VERSION, SERIES_UNAVAILABLE,
};

// Error types
pub use error::ValidationError;

// Analysis
pub use extrema::{Earliest, ExtremaIndex, Extremum, Latest};
pub use highlight::{band_members, BandMember, Relation};
pub use rank::DistinctValueAxis;
pub use recurrence::{analyze, RecurrenceRecord, RecurrenceScanner};
pub use series::{OrderedSeries, SeriesPoint};

// Sources
pub use source::{
    BarSource, FileBarSource, LoadedBars, MemoryBarSource, SourceError, SourceErrorKind,
    SourceFormat, SourceId,
};
