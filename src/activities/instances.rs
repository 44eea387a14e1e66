//! Activity instance extraction.
//!
//! A single left-to-right pass per trace assigns activity nodes to maximal
//! non-overlapping spans. Symbols covered by no instance form gaps
//! ("undefined" stretches) that the rebuilder and the sub-log helpers deal
//! with.

use std::collections::{BTreeSet, VecDeque};
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::trace;

use super::forest::{ActivityForest, ActivityNode, NodeId};
use crate::error::{MiningError, MiningResult};
use crate::patterns::kind::normalize;
use crate::patterns::Symbol;

/// One occurrence of an activity inside a trace: `[start_pos, start_pos + length)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityInstance {
    pub node: NodeId,
    pub start_pos: usize,
    pub length: usize,
}

impl ActivityInstance {
    pub fn new(node: NodeId, start_pos: usize, length: usize) -> Self {
        Self {
            node,
            start_pos,
            length,
        }
    }

    pub fn end(&self) -> usize {
        self.start_pos + self.length
    }

    /// `(start, end)`
    pub fn dump(&self) -> (usize, usize) {
        (self.start_pos, self.end())
    }
}

/// Whether a closed instance is replaced by its most specific descendant.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum NarrowingKind {
    DontNarrow,
    #[default]
    NarrowDown,
}

impl FromStr for NarrowingKind {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "dontnarrow" => Ok(NarrowingKind::DontNarrow),
            "narrowdown" => Ok(NarrowingKind::NarrowDown),
            _ => Err(MiningError::invalid_config(format!(
                "unknown narrowing kind '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for NarrowingKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NarrowingKind::DontNarrow => f.write_str("DontNarrow"),
            NarrowingKind::NarrowDown => f.write_str("NarrowDown"),
        }
    }
}

/// Built-in instance filters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum InstanceFilterKind {
    NoFilter,
    #[default]
    DefaultFilter,
}

impl FromStr for InstanceFilterKind {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "nofilter" => Ok(InstanceFilterKind::NoFilter),
            "defaultfilter" => Ok(InstanceFilterKind::DefaultFilter),
            _ => Err(MiningError::invalid_config(format!(
                "unknown instance filter '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for InstanceFilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InstanceFilterKind::NoFilter => f.write_str("NoFilter"),
            InstanceFilterKind::DefaultFilter => f.write_str("DefaultFilter"),
        }
    }
}

/// Decides whether a just-closed instance is kept. Rejected instances
/// become part of a gap.
pub trait InstanceFilter: Sync {
    fn accept(&self, instance: &ActivityInstance, node: &ActivityNode) -> bool;
}

impl<F> InstanceFilter for F
where
    F: Fn(&ActivityInstance, &ActivityNode) -> bool + Sync,
{
    fn accept(&self, instance: &ActivityInstance, node: &ActivityNode) -> bool {
        self(instance, node)
    }
}

/// Filter selected by an [`InstanceFilterKind`].
#[derive(Debug, Clone, Copy)]
pub struct KindFilter {
    pub kind: InstanceFilterKind,
    pub min_events_in_activity: usize,
}

impl InstanceFilter for KindFilter {
    fn accept(&self, instance: &ActivityInstance, node: &ActivityNode) -> bool {
        match self.kind {
            InstanceFilterKind::NoFilter => true,
            InstanceFilterKind::DefaultFilter => {
                node.size() >= self.min_events_in_activity && instance.length > node.size() / 2
            }
        }
    }
}

/// Extraction settings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstanceSettings {
    pub narrowing: NarrowingKind,
    pub filter: InstanceFilterKind,
    pub min_events_in_activity: usize,
}

impl InstanceSettings {
    pub fn kind_filter(&self) -> KindFilter {
        KindFilter {
            kind: self.filter,
            min_events_in_activity: self.min_events_in_activity,
        }
    }
}

struct OpenInstance {
    node: NodeId,
    start: usize,
    classes: BTreeSet<Symbol>,
}

/// Per-forest extraction state shared by all traces.
pub struct InstanceExtractor<'f> {
    forest: &'f ActivityForest,
    /// Every node grouped by size, ascending; each bucket ordered by name
    /// then unique index.
    buckets: Vec<Vec<NodeId>>,
    narrowing: NarrowingKind,
}

impl<'f> InstanceExtractor<'f> {
    pub fn new(forest: &'f ActivityForest, narrowing: NarrowingKind) -> Self {
        let mut ids: Vec<NodeId> = forest.ids().collect();
        ids.sort_by(|a, b| {
            let (a, b) = (forest.node(*a), forest.node(*b));
            a.size()
                .cmp(&b.size())
                .then_with(|| a.name.cmp(&b.name))
                .then_with(|| a.unique_index.cmp(&b.unique_index))
        });

        let mut buckets: Vec<Vec<NodeId>> = Vec::new();
        for id in ids {
            let size = forest.node(id).size();
            match buckets.last_mut() {
                Some(bucket) if forest.node(bucket[0]).size() == size => bucket.push(id),
                _ => buckets.push(vec![id]),
            }
        }

        Self {
            forest,
            buckets,
            narrowing,
        }
    }

    /// Extract the instances of one trace.
    pub fn extract<F>(&self, trace: &[Symbol], filter: &F) -> Vec<ActivityInstance>
    where
        F: InstanceFilter + ?Sized,
    {
        let mut instances = Vec::new();
        let mut open: Option<OpenInstance> = None;
        let mut index = 0;

        while index < trace.len() {
            let symbol = trace[index];

            if open.is_none() {
                open = self.find_starting_node(symbol).map(|node| OpenInstance {
                    node,
                    start: index,
                    classes: BTreeSet::from([symbol]),
                });
                index += 1;
                continue;
            }

            if let Some(current) = open.as_mut() {
                if self.forest.node(current.node).contains(symbol) {
                    current.classes.insert(symbol);
                    index += 1;
                    continue;
                }

                if let Some(bigger) = self.find_growth_node(current, symbol) {
                    current.node = bigger;
                    current.classes.insert(symbol);
                    index += 1;
                    continue;
                }
            }

            // The failing symbol is evaluated again from the idle state.
            if let Some(closed) = open.take() {
                instances.extend(self.close(closed, index, filter));
            }
        }

        if let Some(closed) = open.take() {
            instances.extend(self.close(closed, trace.len(), filter));
        }

        instances
    }

    fn find_starting_node(&self, symbol: Symbol) -> Option<NodeId> {
        self.buckets
            .iter()
            .rev()
            .flat_map(|bucket| bucket.iter())
            .copied()
            .find(|&id| self.forest.node(id).contains(symbol))
    }

    fn find_growth_node(&self, open: &OpenInstance, symbol: Symbol) -> Option<NodeId> {
        let current_size = self.forest.node(open.node).size();
        self.buckets
            .iter()
            .filter(|bucket| self.forest.node(bucket[0]).size() >= current_size)
            .flat_map(|bucket| bucket.iter())
            .copied()
            .find(|&id| {
                let node = self.forest.node(id);
                node.contains(symbol) && node.contains_all(&open.classes)
            })
    }

    fn close<F>(&self, open: OpenInstance, end: usize, filter: &F) -> Option<ActivityInstance>
    where
        F: InstanceFilter + ?Sized,
    {
        let node = match self.narrowing {
            NarrowingKind::DontNarrow => open.node,
            NarrowingKind::NarrowDown => self.narrow(open.node, &open.classes),
        };

        let instance = ActivityInstance::new(node, open.start, end - open.start);
        filter
            .accept(&instance, self.forest.node(node))
            .then_some(instance)
    }

    /// Smallest descendant whose set still covers `classes`, first in
    /// breadth-first order on ties. The search only descends through
    /// matching nodes.
    pub fn narrow(&self, node: NodeId, classes: &BTreeSet<Symbol>) -> NodeId {
        let mut queue: VecDeque<NodeId> = self.forest.children(node).iter().copied().collect();
        let mut best: Option<NodeId> = None;

        while let Some(candidate) = queue.pop_front() {
            let candidate_node = self.forest.node(candidate);
            if !candidate_node.contains_all(classes) {
                continue;
            }

            let smaller = best.map_or(true, |b| candidate_node.size() < self.forest.node(b).size());
            if smaller {
                best = Some(candidate);
            }
            queue.extend(self.forest.children(candidate).iter().copied());
        }

        match best {
            Some(narrowed) => narrowed,
            None => {
                trace!(
                    node = %self.forest.node(node).name,
                    "No descendant covers the instance, keeping node"
                );
                node
            }
        }
    }
}

/// Extract instances for every trace using a built-in filter.
pub fn extract_activity_instances(
    traces: &[Vec<Symbol>],
    forest: &ActivityForest,
    settings: &InstanceSettings,
) -> Vec<Vec<ActivityInstance>> {
    extract_activity_instances_with_filter(traces, forest, settings.narrowing, &settings.kind_filter())
}

/// Extract instances for every trace using a caller-supplied filter.
pub fn extract_activity_instances_with_filter<F>(
    traces: &[Vec<Symbol>],
    forest: &ActivityForest,
    narrowing: NarrowingKind,
    filter: &F,
) -> Vec<Vec<ActivityInstance>>
where
    F: InstanceFilter + ?Sized,
{
    let extractor = InstanceExtractor::new(forest, narrowing);
    traces
        .par_iter()
        .map(|trace| extractor.extract(trace, filter))
        .collect()
}

/// A piece of a segmented trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubTraceKind<'a> {
    Attached(&'a ActivityInstance),
    /// Gap `[start, end)` covered by no instance
    Unattached(usize, usize),
}

/// Walk a trace's segmentation in order, calling `on_gap(start, end)` for
/// every non-empty gap and `on_activity` for every instance.
///
/// `instances` must be sorted by start position and must not overlap.
pub fn process_activities_in_trace<G, A>(
    trace_len: usize,
    instances: &[ActivityInstance],
    mut on_gap: G,
    mut on_activity: A,
) where
    G: FnMut(usize, usize),
    A: FnMut(&ActivityInstance),
{
    let mut index = 0;
    for instance in instances {
        if index < instance.start_pos {
            on_gap(index, instance.start_pos);
        }

        on_activity(instance);
        index = instance.end();
    }

    if index < trace_len {
        on_gap(index, trace_len);
    }
}

/// The segmentation of a trace as a list.
pub fn sub_traces(trace_len: usize, instances: &[ActivityInstance]) -> Vec<SubTraceKind<'_>> {
    let mut parts = Vec::new();
    let mut index = 0;
    for instance in instances {
        if index < instance.start_pos {
            parts.push(SubTraceKind::Unattached(index, instance.start_pos));
        }

        parts.push(SubTraceKind::Attached(instance));
        index = instance.end();
    }

    if index < trace_len {
        parts.push(SubTraceKind::Unattached(index, trace_len));
    }

    parts
}

/// Check that there is one instance list per trace and that every instance
/// fits inside its trace.
pub fn validate_instances(
    trace_lengths: &[usize],
    instances: &[Vec<ActivityInstance>],
) -> MiningResult<()> {
    if trace_lengths.len() != instances.len() {
        return Err(MiningError::TraceCountMismatch {
            expected: trace_lengths.len(),
            actual: instances.len(),
        });
    }

    for (trace_index, (&trace_len, trace_instances)) in
        trace_lengths.iter().zip(instances).enumerate()
    {
        if let Some(bad) = trace_instances.iter().find(|i| i.end() > trace_len) {
            return Err(MiningError::InstanceOutOfBounds {
                trace_index,
                start: bad.start_pos,
                end: bad.end(),
                trace_len,
            });
        }
    }

    Ok(())
}
