//! Band membership around a reference day.
//!
//! Used by table renderers to mark every row whose close falls in one day's
//! tolerance band, split by whether it comes before or after that day.

use serde::Serialize;

use crate::recurrence::RecurrenceRecord;
use crate::{day_delta, BarDate};

/// Position of a band member relative to the reference day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relation {
    Before,
    Reference,
    After,
}

/// A row whose close lies inside the reference day's band.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BandMember {
    /// Chronological index into the records.
    pub index: usize,
    pub date: BarDate,
    pub close: f64,
    pub relation: Relation,
    /// Signed calendar days from the reference day (negative before it).
    pub day_delta: i64,
}

/// Rows of `records` whose finite close lies in `records[reference]`'s closed band.
///
/// Empty when `reference` is out of range or the reference row has no close.
pub fn band_members(records: &[RecurrenceRecord], reference: usize) -> Vec<BandMember> {
    let Some(anchor) = records.get(reference) else {
        return Vec::new();
    };

    records
        .iter()
        .enumerate()
        .filter_map(|(index, record)| {
            let close = record.close.filter(|close| anchor.band_contains(*close))?;
            let relation = match index.cmp(&reference) {
                std::cmp::Ordering::Less => Relation::Before,
                std::cmp::Ordering::Equal => Relation::Reference,
                std::cmp::Ordering::Greater => Relation::After,
            };
            Some(BandMember {
                index,
                date: record.date.clone(),
                close,
                relation,
                day_delta: day_delta(anchor.ts, record.ts),
            })
        })
        .collect()
}
