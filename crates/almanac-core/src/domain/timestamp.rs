//! Calendar arithmetic on epoch milliseconds.

use std::fmt::{Display, Formatter};

use serde::{Serialize, Serializer};
use time::format_description::well_known::Rfc3339;
use time::macros::format_description;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// One calendar day in milliseconds.
pub const DAY_MS: i64 = 86_400_000;

/// Calendar days from `from` to `to`, rounded half up.
///
/// The difference is taken in `i128`, so any pair of `i64` timestamps is
/// accepted. `-2.5` days rounds to `-2`.
pub fn day_delta(from: i64, to: i64) -> i64 {
    let millis = i128::from(to) - i128::from(from);
    (millis as f64 / DAY_MS as f64 + 0.5).floor() as i64
}

/// Parses a bar date: RFC3339, `YYYY-MM-DD HH:MM:SS` (UTC) or `YYYY-MM-DD`.
pub(crate) fn parse_bar_millis(text: &str) -> Option<i64> {
    if text.is_empty() {
        return None;
    }

    let parsed = OffsetDateTime::parse(text, &Rfc3339)
        .ok()
        .or_else(|| {
            PrimitiveDateTime::parse(
                text,
                format_description!("[year]-[month]-[day] [hour]:[minute]:[second]"),
            )
            .ok()
            .map(PrimitiveDateTime::assume_utc)
        })
        .or_else(|| {
            Date::parse(text, format_description!("[year]-[month]-[day]"))
                .ok()
                .map(|date| date.midnight().assume_utc())
        })?;

    i64::try_from(parsed.unix_timestamp_nanos() / 1_000_000).ok()
}

/// Wall-clock instant in UTC, stamped on envelopes and stream events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct UtcDateTime(OffsetDateTime);

impl UtcDateTime {
    pub fn now() -> Self {
        Self(OffsetDateTime::now_utc())
    }
}

impl Display for UtcDateTime {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.0.format(&Rfc3339) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{}", self.0.unix_timestamp()),
        }
    }
}

impl Serialize for UtcDateTime {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_str(self)
    }
}
