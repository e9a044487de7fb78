//! # Domain Models
//!
//! Canonical input types for the recurrence analysis.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`PriceBar`] | Daily OHLCV row; only `date` and `close` are analysed |
//! | [`BarDate`] | Raw bar date (text or epoch milliseconds) |
//! | [`Tolerance`] | Validated band width in percent |
//! | [`Symbol`] | Normalized ticker label |
//! | [`UtcDateTime`] | UTC wall-clock stamp for envelopes and stream events |
//! | [`day_delta`] | Rounded calendar days between two epoch timestamps |
//!
//! Bars are deliberately permissive: absent closes and unparsable dates are
//! representable, and the series layer decides how to order and skip them.
//! Tolerance and symbol are validated at construction.

mod models;
mod symbol;
mod timestamp;

pub use models::{parse_price_cell, BarDate, PriceBar, Tolerance};
pub use symbol::Symbol;
pub use timestamp::{day_delta, UtcDateTime, DAY_MS};
