//! Activity hierarchy construction.
//!
//! Repeat sets are turned into activity nodes and nested so that every
//! child's symbol set is a strict subset of its parent's. Nodes are placed
//! largest first; a node attaches to the first container found, searching
//! the most recently completed size bucket first and the roots last.

use std::collections::BTreeSet;

use tracing::debug;

use super::forest::{ActivityForest, ActivityNode, IdGenerator, NodeId, UnderlyingPatternKind};
use crate::patterns::{DecodeTable, RepeatSet};

/// Name of an activity: the sorted distinct class names of its set,
/// joined with `::`.
pub fn default_activity_name(repeat_set: &RepeatSet, decode: &DecodeTable) -> String {
    let names: BTreeSet<String> = repeat_set
        .symbols
        .iter()
        .map(|&symbol| decode.name_or_code(symbol))
        .collect();

    names.into_iter().collect::<Vec<_>>().join("::")
}

/// Build the activity forest for the given repeat sets.
pub fn build_hierarchy<N>(
    repeat_sets: &[RepeatSet],
    level: usize,
    pattern_kind: UnderlyingPatternKind,
    namer: N,
    ids: &mut IdGenerator,
) -> ActivityForest
where
    N: Fn(&RepeatSet) -> String,
{
    let mut forest = ActivityForest::new();
    if repeat_sets.is_empty() {
        return forest;
    }

    let mut order: Vec<NodeId> = repeat_sets
        .iter()
        .map(|set| {
            forest.add_node(ActivityNode::from_repeat_set(
                set,
                namer(set),
                level,
                pattern_kind,
                ids,
            ))
        })
        .collect();

    // Stable: equal sizes keep discovery order.
    order.sort_by(|a, b| forest.node(*b).size().cmp(&forest.node(*a).size()));

    let max_size = forest.node(order[0]).size();
    let first_smaller = order
        .iter()
        .position(|&id| forest.node(id).size() != max_size)
        .unwrap_or(order.len());

    for &id in &order[..first_smaller] {
        forest.add_root(id);
    }

    let mut buckets: Vec<Vec<NodeId>> = vec![Vec::new()];
    let mut current_size = max_size;
    if let Some(&id) = order.get(first_smaller) {
        current_size = forest.node(id).size();
    }

    for &id in &order[first_smaller..] {
        let size = forest.node(id).size();
        if size < current_size {
            current_size = size;
            buckets.push(Vec::new());
        }

        let node = forest.node(id);
        let closed = &buckets[..buckets.len() - 1];
        let parent = closed
            .iter()
            .rev()
            .flat_map(|bucket| bucket.iter())
            .chain(forest.roots().iter())
            .copied()
            .find(|&candidate| forest.node(candidate).strictly_contains(node));

        match parent {
            Some(parent) => forest.attach(parent, id),
            None => forest.add_root(id),
        }

        if let Some(bucket) = buckets.last_mut() {
            bucket.push(id);
        }
    }

    debug!(
        nodes = forest.len(),
        roots = forest.roots().len(),
        level,
        "Built activity hierarchy"
    );
    forest
}
