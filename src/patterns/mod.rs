//! Pattern discovery over encoded traces.
//!
//! Traces are first turned into symbol sequences by the [`symbols`] codec;
//! every finder below works on plain `&[Symbol]` slices and knows nothing
//! about events.
//!
//! # Module Structure
//!
//! - [`symbols`] - Polynomial hashing of event classes into symbols
//! - [`tandem`] - Maximal and primitive tandem arrays
//! - [`index`] - Suffix array + LCP index used by the repeat finders
//! - [`repeats`] - Maximal, super-maximal and near-super-maximal repeats
//! - [`repeat_sets`] - Deduplication of spans into distinct symbol sets
//! - [`kind`] - Pattern kinds, discovery strategies and log-level entry points

pub mod index;
pub mod kind;
pub mod repeat_sets;
pub mod repeats;
pub mod symbols;
pub mod tandem;

use serde::{Deserialize, Serialize};

pub use kind::{
    find_patterns, find_repeat_sets, DiscoveryStrategy, PatternKind, RepeatKind,
    DEFAULT_MAX_TANDEM_LENGTH,
};
pub use repeat_sets::{build_repeat_sets, RepeatSet};
pub use repeats::{
    find_maximal_repeats, find_near_super_maximal_repeats, find_super_maximal_repeats,
    MaximalRepeat,
};
pub use symbols::{
    collection_hash, encode, encode_log, encode_with_decode_table, string_hash, DecodeTable,
    Symbol,
};
pub use tandem::{
    find_maximal_tandem_arrays, find_primitive_tandem_arrays, find_tandem_arrays_with_min_period,
    TandemArray,
};

/// Half-open window `[first_pos, first_pos + length)` into one trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RepeatSpan {
    pub first_pos: usize,
    pub length: usize,
}

impl RepeatSpan {
    pub fn new(first_pos: usize, length: usize) -> Self {
        Self { first_pos, length }
    }

    /// Exclusive end position.
    pub fn end(&self) -> usize {
        self.first_pos + self.length
    }

    /// The symbols this span covers.
    ///
    /// # Panics
    ///
    /// Panics if the span reaches past the end of `trace`.
    pub fn window<'a, T>(&self, trace: &'a [T]) -> &'a [T] {
        &trace[self.first_pos..self.end()]
    }

    /// True when `other` lies entirely inside this span.
    pub fn envelops(&self, other: &RepeatSpan) -> bool {
        other.first_pos >= self.first_pos && other.end() <= self.end()
    }
}
