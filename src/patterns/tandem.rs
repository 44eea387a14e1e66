//! Tandem array detection.
//!
//! A tandem array is a window whose content, taken as a unit, repeats
//! back to back at least twice: `abcabcabc` is the unit `abc` repeated three
//! times. Arrays are emitted by increasing period, then increasing start
//! position; hierarchy construction downstream relies on this order.

use std::collections::HashSet;

use serde::Serialize;

use super::symbols::{collection_hash, Symbol};
use super::RepeatSpan;

/// A periodic window: `span` holds one unit, which repeats `repeat_count`
/// consecutive times starting at `span.first_pos`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TandemArray {
    pub span: RepeatSpan,
    pub repeat_count: usize,
}

impl TandemArray {
    /// `(first_pos, length, repeat_count)`
    pub fn dump(&self) -> (usize, usize, usize) {
        (self.span.first_pos, self.span.length, self.repeat_count)
    }

    /// Number of symbols covered by all repetitions.
    pub fn covered_length(&self) -> usize {
        self.span.length * self.repeat_count
    }
}

/// Find the maximal tandem arrays of one trace with periods in `[2, max_period)`.
pub fn find_maximal_tandem_arrays(trace: &[Symbol], max_period: usize) -> Vec<TandemArray> {
    find_tandem_arrays_with_min_period(trace, 2, max_period)
}

/// Find maximal tandem arrays with periods in `[min_period, max_period)`.
///
/// Windows are deduplicated by hash across all periods of the trace: once a
/// window content has been tried, later windows with the same hash are
/// skipped without a full comparison.
pub fn find_tandem_arrays_with_min_period(
    trace: &[Symbol],
    min_period: usize,
    max_period: usize,
) -> Vec<TandemArray> {
    let mut visited = HashSet::new();
    let mut arrays = Vec::new();

    for length in min_period.max(1)..max_period.min(trace.len()) {
        for start in 0..(trace.len() - length) {
            let window_hash = collection_hash(&trace[start..start + length]);
            if !visited.insert(window_hash) {
                continue;
            }

            if let Some(array) = try_extract_tandem_array(trace, start, length) {
                arrays.push(array);
            }
        }
    }

    arrays
}

/// Keep only the maximal arrays that are not themselves a repetition of a
/// shorter unit starting at the same position.
pub fn find_primitive_tandem_arrays(trace: &[Symbol], max_period: usize) -> Vec<TandemArray> {
    find_maximal_tandem_arrays(trace, max_period)
        .into_iter()
        .filter(|array| is_primitive(trace, array))
        .collect()
}

fn is_primitive(trace: &[Symbol], array: &TandemArray) -> bool {
    (2..=(array.span.length + 1) / 2)
        .all(|period| try_extract_tandem_array(trace, array.span.first_pos, period).is_none())
}

/// Greedily extend the unit `[start, start + length)` to the right.
fn try_extract_tandem_array(trace: &[Symbol], start: usize, length: usize) -> Option<TandemArray> {
    let unit = &trace[start..start + length];
    let mut current = start + length;
    let mut repeat_count = 1;

    while current + length <= trace.len() && &trace[current..current + length] == unit {
        repeat_count += 1;
        current += length;
    }

    if repeat_count > 1 {
        Some(TandemArray {
            span: RepeatSpan::new(start, length),
            repeat_count,
        })
    } else {
        None
    }
}
