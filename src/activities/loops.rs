//! Strict loop detection.
//!
//! A strict loop is a maximal tandem array, period one included, used
//! directly as an activity instance covering every repetition. Each loop
//! gets its own leaf node named `Loop[...]`.

use std::collections::{BTreeMap, BTreeSet};

use super::forest::{ActivityForest, ActivityNode, IdGenerator, UnderlyingPatternKind};
use super::instances::ActivityInstance;
use crate::patterns::{find_tandem_arrays_with_min_period, DecodeTable, RepeatSet, Symbol, TandemArray};

/// Find the non-overlapping strict loops of every trace.
///
/// Among loops starting at the same position the one covering the most
/// symbols wins (the shorter period on ties); loops are then taken by start
/// position, skipping any that overlap an already accepted loop.
pub fn find_strict_loops(
    traces: &[Vec<Symbol>],
    decode: &DecodeTable,
    max_period: usize,
    ids: &mut IdGenerator,
) -> (ActivityForest, Vec<Vec<ActivityInstance>>) {
    let mut forest = ActivityForest::new();
    let mut instances = Vec::with_capacity(traces.len());

    for (trace_index, trace) in traces.iter().enumerate() {
        let mut longest: BTreeMap<usize, TandemArray> = BTreeMap::new();
        for array in find_tandem_arrays_with_min_period(trace, 1, max_period) {
            let entry = longest.entry(array.span.first_pos).or_insert(array);
            if array.covered_length() > entry.covered_length() {
                *entry = array;
            }
        }

        let mut covered_until = 0;
        let mut trace_instances = Vec::new();
        for (start, array) in longest {
            if start < covered_until {
                continue;
            }

            let repeat_set = RepeatSet::new(trace, trace_index, array.span);
            let node = ActivityNode::from_repeat_set(
                &repeat_set,
                loop_name(&repeat_set.symbols, decode),
                0,
                UnderlyingPatternKind::StrictLoop,
                ids,
            );
            let id = forest.add_node(node);
            forest.add_root(id);

            covered_until = start + array.covered_length();
            trace_instances.push(ActivityInstance::new(id, start, array.covered_length()));
        }

        instances.push(trace_instances);
    }

    (forest, instances)
}

fn loop_name(symbols: &BTreeSet<Symbol>, decode: &DecodeTable) -> String {
    let names: BTreeSet<String> = symbols.iter().map(|&s| decode.name_or_code(s)).collect();
    format!("Loop[{}]", names.into_iter().collect::<Vec<_>>().join("::"))
}
