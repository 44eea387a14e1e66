//! In-memory event log model.
//!
//! The mining core never parses files itself; it consumes an [`EventLog`]
//! built by callers (or by the plain-text reader in [`text`]) and only the
//! log rebuilder produces new traces. Compound events created during
//! rebuilding own the events they replace, so any abstraction level can be
//! expanded back to the raw events.

mod extractor;
pub mod text;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use extractor::{ClassExtractor, NameClassExtractor, RegexClassExtractor};

/// A single event. Raw events have no underlying events; compound events
/// produced by the log rebuilder carry the events they stand for.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Declared event class (`concept:name` in XES terms)
    pub name: String,
    /// Events replaced by this compound event, in trace order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub underlying: Vec<Event>,
    /// Unique name of the activity covering this raw event, per hierarchy
    /// level. Filled in by the log rebuilder.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub hierarchy: BTreeMap<usize, String>,
}

impl Event {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            underlying: Vec::new(),
            hierarchy: BTreeMap::new(),
        }
    }

    pub fn compound(name: impl Into<String>, underlying: Vec<Event>) -> Self {
        Self {
            name: name.into(),
            underlying,
            hierarchy: BTreeMap::new(),
        }
    }

    /// Activity unique name recorded for `level`, if any.
    pub fn activity_at_level(&self, level: usize) -> Option<&str> {
        self.hierarchy.get(&level).map(String::as_str)
    }

    pub fn is_compound(&self) -> bool {
        !self.underlying.is_empty()
    }

    /// Collect the raw events below this one, depth first.
    ///
    /// A raw event yields itself.
    pub fn leaf_events(&self) -> Vec<&Event> {
        let mut leaves = Vec::new();
        self.collect_leaves(&mut leaves);
        leaves
    }

    fn collect_leaves<'a>(&'a self, leaves: &mut Vec<&'a Event>) {
        if self.underlying.is_empty() {
            leaves.push(self);
            return;
        }

        for event in &self.underlying {
            event.collect_leaves(leaves);
        }
    }

    /// Visit the raw events below this one mutably, depth first.
    pub fn for_each_leaf_mut(&mut self, visit: &mut impl FnMut(&mut Event)) {
        if self.underlying.is_empty() {
            visit(self);
            return;
        }

        for event in &mut self.underlying {
            event.for_each_leaf_mut(visit);
        }
    }

    fn for_each_event_mut(&mut self, visit: &mut impl FnMut(&mut Event)) {
        visit(self);
        for event in &mut self.underlying {
            event.for_each_event_mut(visit);
        }
    }

    fn max_hierarchy_level(&self) -> Option<usize> {
        let own = self.hierarchy.keys().next_back().copied();
        self.underlying
            .iter()
            .filter_map(Event::max_hierarchy_level)
            .chain(own)
            .max()
    }

    /// Number of raw events this event stands for.
    pub fn leaf_count(&self) -> usize {
        if self.underlying.is_empty() {
            1
        } else {
            self.underlying.iter().map(Event::leaf_count).sum()
        }
    }
}

/// An ordered sequence of events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Trace {
    pub events: Vec<Event>,
}

impl Trace {
    pub fn new(events: Vec<Event>) -> Self {
        Self { events }
    }

    /// Build a trace of raw events from their names.
    pub fn from_names<S: AsRef<str>>(names: &[S]) -> Self {
        Self {
            events: names.iter().map(|name| Event::new(name.as_ref())).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    pub fn push(&mut self, event: Event) {
        self.events.push(event);
    }

    /// Names of the top-level events.
    pub fn names(&self) -> Vec<&str> {
        self.events.iter().map(|e| e.name.as_str()).collect()
    }

    /// Replace every compound event by its raw events, recursively.
    pub fn expand(&self) -> Trace {
        let events = self
            .events
            .iter()
            .flat_map(|event| event.leaf_events().into_iter().cloned())
            .collect();

        Trace { events }
    }
}

/// An ordered collection of traces.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventLog {
    pub traces: Vec<Trace>,
}

impl EventLog {
    pub fn new(traces: Vec<Trace>) -> Self {
        Self { traces }
    }

    /// Build a log of raw events from per-trace event names.
    pub fn from_names<S: AsRef<str>>(traces: &[Vec<S>]) -> Self {
        Self {
            traces: traces.iter().map(|names| Trace::from_names(names)).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.traces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traces.is_empty()
    }

    pub fn push(&mut self, trace: Trace) {
        self.traces.push(trace);
    }

    /// Total number of top-level events.
    pub fn event_count(&self) -> usize {
        self.traces.iter().map(Trace::len).sum()
    }

    /// Total number of raw events, counting through compound events.
    pub fn count_underlying_events(&self) -> usize {
        self.traces
            .iter()
            .flat_map(|trace| trace.events.iter())
            .map(Event::leaf_count)
            .sum()
    }

    /// Highest hierarchy level recorded on any event, nested ones included.
    pub fn max_hierarchy_level(&self) -> Option<usize> {
        self.traces
            .iter()
            .flat_map(|trace| trace.events.iter())
            .filter_map(Event::max_hierarchy_level)
            .max()
    }

    /// Renumber hierarchy levels so the outermost activity is level 0:
    /// every level `l` becomes `max - l`.
    pub fn reverse_hierarchy_levels(&mut self) {
        let Some(max_level) = self.max_hierarchy_level() else {
            return;
        };

        for trace in &mut self.traces {
            for event in &mut trace.events {
                event.for_each_event_mut(&mut |event| {
                    if event.hierarchy.is_empty() {
                        return;
                    }

                    event.hierarchy = std::mem::take(&mut event.hierarchy)
                        .into_iter()
                        .map(|(level, name)| (max_level - level, name))
                        .collect();
                });
            }
        }
    }

    /// Names of every top-level event, per trace.
    pub fn to_names(&self) -> Vec<Vec<&str>> {
        self.traces.iter().map(Trace::names).collect()
    }
}
