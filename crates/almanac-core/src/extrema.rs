//! Range-extremum index over row indices, keyed by rank.
//!
//! A flat segment tree: leaves live at `nodes[size..2 * size]`, node `i` has
//! children `2i` and `2i + 1`, and `nodes[0]` is unused. An empty leaf holds
//! `None`, which is also what a query returns when nothing in range was
//! inserted.

use std::fmt::Debug;
use std::marker::PhantomData;

/// Combine rule of an [`ExtremaIndex`].
pub trait Extremum: Debug {
    /// Picks the preferred of two row indices.
    fn pick(a: usize, b: usize) -> usize;
}

/// Keeps the largest row index: the most recent row of a forward sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Latest;

impl Extremum for Latest {
    fn pick(a: usize, b: usize) -> usize {
        a.max(b)
    }
}

/// Keeps the smallest row index: the nearest row of a backward sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Earliest;

impl Extremum for Earliest {
    fn pick(a: usize, b: usize) -> usize {
        a.min(b)
    }
}

/// Range max/min of row indices with point overwrite.
///
/// `update` replaces the leaf instead of folding into it, so a leaf always
/// holds the last row written at that rank.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtremaIndex<E: Extremum> {
    size: usize,
    nodes: Vec<Option<usize>>,
    _rule: PhantomData<E>,
}

impl<E: Extremum> ExtremaIndex<E> {
    /// Index over `ranks` leaves, rounded up to a power of two (at least 1).
    pub fn new(ranks: usize) -> Self {
        let size = ranks.max(1).next_power_of_two();
        Self {
            size,
            nodes: vec![None; 2 * size],
            _rule: PhantomData,
        }
    }

    /// Overwrites the leaf at `rank` with `row` and refreshes its ancestors.
    ///
    /// Ranks beyond the leaf count are ignored.
    pub fn update(&mut self, rank: usize, row: usize) {
        if rank >= self.size {
            return;
        }

        let mut node = rank + self.size;
        self.nodes[node] = Some(row);
        node >>= 1;
        while node >= 1 {
            self.nodes[node] = combine::<E>(self.nodes[2 * node], self.nodes[2 * node + 1]);
            node >>= 1;
        }
    }

    /// Extremum of the leaves with rank in `[low, high]`.
    ///
    /// `None` when the range is empty, inverted, or holds no rows yet.
    pub fn query(&self, low: usize, high: usize) -> Option<usize> {
        if high < low || low >= self.size {
            return None;
        }

        let mut acc = None;
        let mut left = low + self.size;
        let mut right = high.min(self.size - 1) + self.size + 1;
        while left < right {
            if left & 1 == 1 {
                acc = combine::<E>(acc, self.nodes[left]);
                left += 1;
            }
            if right & 1 == 1 {
                right -= 1;
                acc = combine::<E>(acc, self.nodes[right]);
            }
            left >>= 1;
            right >>= 1;
        }
        acc
    }
}

fn combine<E: Extremum>(a: Option<usize>, b: Option<usize>) -> Option<usize> {
    match (a, b) {
        (Some(a), Some(b)) => Some(E::pick(a, b)),
        (a, None) => a,
        (None, b) => b,
    }
}
