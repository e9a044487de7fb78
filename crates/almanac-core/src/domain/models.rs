use std::fmt::{Display, Formatter};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::timestamp::parse_bar_millis;
use crate::ValidationError;

/// Calendar date of a bar as delivered upstream.
///
/// Text dates are parsed lazily; a date that does not parse is kept verbatim
/// so the series can still order it by input position.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum BarDate {
    /// Epoch milliseconds.
    Millis(i64),
    /// `YYYY-MM-DD`, `YYYY-MM-DD HH:MM:SS`, or RFC3339.
    Text(String),
}

impl BarDate {
    /// Resolves the date to epoch milliseconds, `None` when unparsable.
    pub fn resolve_millis(&self) -> Option<i64> {
        match self {
            Self::Millis(millis) => Some(*millis),
            Self::Text(text) => parse_bar_millis(text.trim()),
        }
    }
}

impl Display for BarDate {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Millis(millis) => write!(f, "{millis}"),
            Self::Text(text) => f.write_str(text),
        }
    }
}

impl From<&str> for BarDate {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<String> for BarDate {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<i64> for BarDate {
    fn from(value: i64) -> Self {
        Self::Millis(value)
    }
}

/// Daily OHLCV row. Only `date` and `close` drive the recurrence analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    #[serde(alias = "Date", alias = "ts", alias = "timestamp")]
    pub date: BarDate,
    #[serde(default, alias = "Open", deserialize_with = "lenient_price")]
    pub open: Option<f64>,
    #[serde(default, alias = "High", deserialize_with = "lenient_price")]
    pub high: Option<f64>,
    #[serde(default, alias = "Low", deserialize_with = "lenient_price")]
    pub low: Option<f64>,
    #[serde(default, alias = "Close", deserialize_with = "lenient_price")]
    pub close: Option<f64>,
    #[serde(default, alias = "Volume", deserialize_with = "lenient_volume")]
    pub volume: Option<u64>,
}

impl PriceBar {
    pub fn new(date: impl Into<BarDate>, close: Option<f64>) -> Self {
        Self {
            date: date.into(),
            open: None,
            high: None,
            low: None,
            close,
            volume: None,
        }
    }

    /// Close price when present and finite.
    pub fn finite_close(&self) -> Option<f64> {
        self.close.filter(|close| close.is_finite())
    }
}

/// Parses a loosely typed price cell: numbers, numeric strings, `null`, or `""`.
pub fn parse_price_cell(value: &Value) -> Option<f64> {
    match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn lenient_price<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(parse_price_cell))
}

fn lenient_volume<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value
        .as_ref()
        .and_then(parse_price_cell)
        .filter(|volume| volume.is_finite() && *volume >= 0.0)
        .map(|volume| volume.round() as u64))
}

/// Width of the recurrence band, as a percentage of the reference close.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Tolerance(f64);

impl Tolerance {
    pub const DEFAULT_PERCENT: f64 = 1.0;

    pub fn new(percent: f64) -> Result<Self, ValidationError> {
        if !percent.is_finite() {
            return Err(ValidationError::NonFiniteTolerance {
                value: percent.to_string(),
            });
        }
        if percent < 0.0 {
            return Err(ValidationError::NegativeTolerance {
                value: percent.to_string(),
            });
        }
        Ok(Self(percent))
    }

    pub const fn percent(self) -> f64 {
        self.0
    }

    /// Closed band `[close*(1-p/100), close*(1+p/100)]`.
    pub fn band(self, close: f64) -> (f64, f64) {
        let ratio = self.0 / 100.0;
        (close * (1.0 - ratio), close * (1.0 + ratio))
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self(Self::DEFAULT_PERCENT)
    }
}

impl TryFrom<f64> for Tolerance {
    type Error = ValidationError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Tolerance> for f64 {
    fn from(value: Tolerance) -> Self {
        value.0
    }
}

impl Display for Tolerance {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}%", self.0)
    }
}
