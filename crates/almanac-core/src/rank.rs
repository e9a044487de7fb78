//! Coordinate compression of close prices.
//!
//! The axis is a sorted, de-duplicated `Vec<f64>` searched with binary
//! search. Floats are never hashed: a band `[low, high]` maps to ranks through
//! ordered bounds, which stays exact for values sitting on the band edges.

use std::ops::RangeInclusive;

/// Sorted distinct finite close values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistinctValueAxis {
    values: Vec<f64>,
}

impl DistinctValueAxis {
    /// Builds the axis, dropping non-finite values and duplicates.
    pub fn build(closes: impl IntoIterator<Item = f64>) -> Self {
        let mut values: Vec<f64> = closes.into_iter().filter(|v| v.is_finite()).collect();
        values.sort_by(f64::total_cmp);
        values.dedup();
        Self { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// Smallest `i` with `axis[i] >= target`, or `len()` if none.
    pub fn lower_bound(&self, target: f64) -> usize {
        self.values.partition_point(|value| *value < target)
    }

    /// Smallest `i` with `axis[i] > target`, or `len()` if none.
    pub fn upper_bound(&self, target: f64) -> usize {
        self.values.partition_point(|value| *value <= target)
    }

    /// Rank of a value present on the axis.
    pub fn rank_of(&self, value: f64) -> Option<usize> {
        let rank = self.lower_bound(value);
        (self.values.get(rank) == Some(&value)).then_some(rank)
    }

    /// Ranks of every axis value inside the closed interval `[low, high]`.
    ///
    /// `None` when no value of the series lies in the band.
    pub fn band(&self, low: f64, high: f64) -> Option<RangeInclusive<usize>> {
        let first = self.lower_bound(low);
        let end = self.upper_bound(high);
        (end > first).then(|| first..=end - 1)
    }
}
