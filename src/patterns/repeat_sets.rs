//! Deduplication of discovered spans into distinct symbol sets.

use std::collections::{BTreeSet, HashSet};

use serde::Serialize;

use super::symbols::{collection_hash, Symbol};
use super::RepeatSpan;

/// The distinct symbols of one discovered span, remembered together with
/// the span it was first seen at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RepeatSet {
    pub symbols: BTreeSet<Symbol>,
    pub span: RepeatSpan,
    pub trace_index: usize,
}

impl RepeatSet {
    pub fn new(trace: &[Symbol], trace_index: usize, span: RepeatSpan) -> Self {
        Self {
            symbols: span.window(trace).iter().copied().collect(),
            span,
            trace_index,
        }
    }

    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Hash of the sorted distinct symbols; equal sets hash equally.
    pub fn set_hash(&self) -> u64 {
        let sorted: Vec<Symbol> = self.symbols.iter().copied().collect();
        collection_hash(&sorted)
    }

    /// The representative window this set was built from.
    pub fn window<'a>(&self, traces: &'a [Vec<Symbol>]) -> &'a [Symbol] {
        self.span.window(&traces[self.trace_index])
    }
}

/// Build one set per span and keep the first set for every distinct hash,
/// in trace order then span order.
pub fn build_repeat_sets(traces: &[Vec<Symbol>], spans: &[Vec<RepeatSpan>]) -> Vec<RepeatSet> {
    let mut seen = HashSet::new();
    let mut sets = Vec::new();

    for (trace_index, (trace, trace_spans)) in traces.iter().zip(spans).enumerate() {
        for span in trace_spans {
            let set = RepeatSet::new(trace, trace_index, *span);
            if seen.insert(set.set_hash()) {
                sets.push(set);
            }
        }
    }

    sets
}
