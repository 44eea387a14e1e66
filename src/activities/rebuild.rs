//! Log reconstruction from activity instances.
//!
//! Every instance becomes one compound event that owns clones of the events
//! it covers; gaps are handled by the configured [`UndefinedStrategy`]. The
//! raw events below an instance record the node's unique name under the
//! node's level, so each raw event knows its activity at every level it was
//! abstracted at.

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::forest::{ActivityForest, NodeId};
use super::instances::{sub_traces, validate_instances, ActivityInstance, SubTraceKind};
use crate::error::{MiningError, MiningResult};
use crate::log::{Event, EventLog, Trace};
use crate::patterns::kind::normalize;

/// Name of the event standing for a whole gap.
pub const UNDEFINED_ACTIVITY_NAME: &str = "UNDEFINED_ACTIVITY";

/// What to put in the rebuilt trace for gaps between instances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum UndefinedStrategy {
    /// Drop gap events
    DontInsert,
    /// One `UNDEFINED_ACTIVITY` event per gap
    InsertAsSingleEvent,
    /// Copy gap events unchanged
    #[default]
    InsertAllEvents,
}

impl FromStr for UndefinedStrategy {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "dontinsert" => Ok(UndefinedStrategy::DontInsert),
            "insertassingleevent" => Ok(UndefinedStrategy::InsertAsSingleEvent),
            "insertallevents" => Ok(UndefinedStrategy::InsertAllEvents),
            _ => Err(MiningError::invalid_config(format!(
                "unknown undefined-activity strategy '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for UndefinedStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UndefinedStrategy::DontInsert => f.write_str("DontInsert"),
            UndefinedStrategy::InsertAsSingleEvent => f.write_str("InsertAsSingleEvent"),
            UndefinedStrategy::InsertAllEvents => f.write_str("InsertAllEvents"),
        }
    }
}

/// How compound events are named.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompoundNaming {
    /// The node's name, or its unique name when another node shares it
    #[default]
    NodeName,
    /// Always the node's unique name
    UniqueName,
}

impl FromStr for CompoundNaming {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "nodename" => Ok(CompoundNaming::NodeName),
            "uniquename" => Ok(CompoundNaming::UniqueName),
            _ => Err(MiningError::invalid_config(format!(
                "unknown compound naming '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for CompoundNaming {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CompoundNaming::NodeName => f.write_str("NodeName"),
            CompoundNaming::UniqueName => f.write_str("UniqueName"),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RebuildOptions {
    pub undefined: UndefinedStrategy,
    pub naming: CompoundNaming,
}

struct CompoundNamer<'f> {
    forest: &'f ActivityForest,
    duplicates: HashSet<&'f str>,
    naming: CompoundNaming,
}

impl<'f> CompoundNamer<'f> {
    fn new(forest: &'f ActivityForest, naming: CompoundNaming) -> Self {
        Self {
            forest,
            duplicates: forest.duplicate_names(),
            naming,
        }
    }

    fn name(&self, id: NodeId) -> String {
        let node = self.forest.node(id);
        match self.naming {
            CompoundNaming::NodeName if !self.duplicates.contains(node.name.as_str()) => {
                node.name.clone()
            }
            _ => node.unique_name(),
        }
    }
}

/// Rebuild one trace.
///
/// # Panics
///
/// Panics if an instance reaches past the end of `trace`; use
/// [`rebuild_log`] for checked input.
pub fn rebuild_trace(
    trace: &Trace,
    instances: &[ActivityInstance],
    forest: &ActivityForest,
    options: RebuildOptions,
) -> Trace {
    let namer = CompoundNamer::new(forest, options.naming);
    rebuild_with_namer(trace, instances, &namer, options.undefined)
}

fn rebuild_with_namer(
    trace: &Trace,
    instances: &[ActivityInstance],
    namer: &CompoundNamer<'_>,
    undefined: UndefinedStrategy,
) -> Trace {
    let mut events = Vec::with_capacity(instances.len());

    for part in sub_traces(trace.len(), instances) {
        match (part, undefined) {
            (SubTraceKind::Attached(instance), _) => {
                let node = namer.forest.node(instance.node);
                let unique_name = node.unique_name();
                let mut underlying = trace.events[instance.start_pos..instance.end()].to_vec();
                for event in &mut underlying {
                    event.for_each_leaf_mut(&mut |leaf| {
                        leaf.hierarchy.insert(node.level, unique_name.clone());
                    });
                }
                events.push(Event::compound(namer.name(instance.node), underlying));
            }
            (SubTraceKind::Unattached(..), UndefinedStrategy::DontInsert) => {}
            (SubTraceKind::Unattached(..), UndefinedStrategy::InsertAsSingleEvent) => {
                events.push(Event::new(UNDEFINED_ACTIVITY_NAME));
            }
            (SubTraceKind::Unattached(start, end), UndefinedStrategy::InsertAllEvents) => {
                events.extend(trace.events[start..end].iter().cloned());
            }
        }
    }

    Trace::new(events)
}

/// Rebuild every trace of `log` from its instances, in parallel.
pub fn rebuild_log(
    log: &EventLog,
    instances: &[Vec<ActivityInstance>],
    forest: &ActivityForest,
    options: RebuildOptions,
) -> MiningResult<EventLog> {
    let lengths: Vec<usize> = log.traces.iter().map(Trace::len).collect();
    validate_instances(&lengths, instances)?;

    let namer = CompoundNamer::new(forest, options.naming);
    let traces: Vec<Trace> = log
        .traces
        .par_iter()
        .zip(instances.par_iter())
        .map(|(trace, trace_instances)| {
            rebuild_with_namer(trace, trace_instances, &namer, options.undefined)
        })
        .collect();

    let rebuilt = EventLog::new(traces);
    debug!(
        events = log.event_count(),
        rebuilt_events = rebuilt.event_count(),
        strategy = %options.undefined,
        "Rebuilt log"
    );
    Ok(rebuilt)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::activities::forest::{ActivityNode, IdGenerator, UnderlyingPatternKind};

    fn forest_with(names: &[&str]) -> ActivityForest {
        let mut ids = IdGenerator::new();
        let mut forest = ActivityForest::new();
        for (i, name) in names.iter().enumerate() {
            let id = forest.add_node(ActivityNode::new(
                *name,
                [i as u64].into_iter().collect(),
                0,
                UnderlyingPatternKind::Unknown,
                &mut ids,
            ));
            forest.add_root(id);
        }
        forest
    }

    fn sample() -> (Trace, Vec<ActivityInstance>) {
        let trace = Trace::from_names(&["g", "d", "a", "b", "c", "f", "c", "a"]);
        let instances = vec![
            ActivityInstance::new(NodeId(0), 2, 3),
            ActivityInstance::new(NodeId(0), 6, 2),
        ];
        (trace, instances)
    }

    fn options(undefined: UndefinedStrategy) -> RebuildOptions {
        RebuildOptions {
            undefined,
            naming: CompoundNaming::NodeName,
        }
    }

    #[test]
    fn insert_all_events_keeps_gaps() {
        let (trace, instances) = sample();
        let forest = forest_with(&["a::b::c"]);
        let rebuilt = rebuild_trace(&trace, &instances, &forest, options(UndefinedStrategy::InsertAllEvents));
        assert_eq!(rebuilt.names(), vec!["g", "d", "a::b::c", "f", "a::b::c"]);
    }

    #[test]
    fn insert_as_single_event_collapses_gaps() {
        let (trace, instances) = sample();
        let forest = forest_with(&["a::b::c"]);
        let rebuilt = rebuild_trace(&trace, &instances, &forest, options(UndefinedStrategy::InsertAsSingleEvent));
        assert_eq!(
            rebuilt.names(),
            vec![UNDEFINED_ACTIVITY_NAME, "a::b::c", UNDEFINED_ACTIVITY_NAME, "a::b::c"]
        );
    }

    #[test]
    fn dont_insert_drops_gaps() {
        let (trace, instances) = sample();
        let forest = forest_with(&["a::b::c"]);
        let rebuilt = rebuild_trace(&trace, &instances, &forest, options(UndefinedStrategy::DontInsert));
        assert_eq!(rebuilt.names(), vec!["a::b::c", "a::b::c"]);
    }

    #[test]
    fn compound_events_own_underlying_events() {
        let (trace, instances) = sample();
        let forest = forest_with(&["a::b::c"]);
        let rebuilt = rebuild_trace(&trace, &instances, &forest, options(UndefinedStrategy::InsertAllEvents));
        let compound = &rebuilt.events[2];
        assert!(compound.is_compound());
        let names: Vec<_> = compound.underlying.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(rebuilt.expand().names(), trace.names());
    }

    #[test]
    fn covered_events_record_their_activity() {
        let (trace, instances) = sample();
        let forest = forest_with(&["a::b::c"]);
        let rebuilt = rebuild_trace(&trace, &instances, &forest, options(UndefinedStrategy::InsertAllEvents));

        let expanded = rebuilt.expand();
        let annotations: Vec<_> = expanded
            .events
            .iter()
            .map(|event| event.activity_at_level(0))
            .collect();
        assert_eq!(
            annotations,
            vec![
                None,
                None,
                Some("Activity_0"),
                Some("Activity_0"),
                Some("Activity_0"),
                None,
                Some("Activity_0"),
                Some("Activity_0"),
            ]
        );
        assert!(rebuilt.events[2].hierarchy.is_empty());
    }

    #[test]
    fn annotations_accumulate_across_levels() {
        let mut ids = IdGenerator::new();
        let mut lower = ActivityForest::new();
        let inner = lower.add_node(ActivityNode::new(
            "a::b",
            [0].into_iter().collect(),
            0,
            UnderlyingPatternKind::Unknown,
            &mut ids,
        ));
        lower.add_root(inner);

        let trace = Trace::from_names(&["a", "b", "c"]);
        let first = rebuild_trace(
            &trace,
            &[ActivityInstance::new(inner, 0, 2)],
            &lower,
            options(UndefinedStrategy::InsertAllEvents),
        );

        let mut upper = ActivityForest::new();
        let outer = upper.add_node(ActivityNode::new(
            "a::b::c",
            [1].into_iter().collect(),
            1,
            UnderlyingPatternKind::Unknown,
            &mut ids,
        ));
        upper.add_root(outer);

        let second = rebuild_trace(
            &first,
            &[ActivityInstance::new(outer, 0, 2)],
            &upper,
            options(UndefinedStrategy::InsertAllEvents),
        );

        let leaves = second.expand();
        assert_eq!(leaves.names(), vec!["a", "b", "c"]);
        assert_eq!(leaves.events[0].activity_at_level(0), Some("Activity_0"));
        assert_eq!(leaves.events[0].activity_at_level(1), Some("Activity_1"));
        assert_eq!(leaves.events[2].activity_at_level(0), None);
        assert_eq!(leaves.events[2].activity_at_level(1), Some("Activity_1"));
    }

    #[test]
    fn colliding_names_fall_back_to_unique_names() {
        let (trace, instances) = sample();
        let forest = forest_with(&["x", "x"]);
        let rebuilt = rebuild_trace(&trace, &instances, &forest, options(UndefinedStrategy::DontInsert));
        assert_eq!(rebuilt.names(), vec!["Activity_0", "Activity_0"]);
    }

    #[test]
    fn unique_naming_is_always_unique_name() {
        let (trace, instances) = sample();
        let forest = forest_with(&["a::b::c"]);
        let rebuilt = rebuild_trace(
            &trace,
            &instances,
            &forest,
            RebuildOptions {
                undefined: UndefinedStrategy::DontInsert,
                naming: CompoundNaming::UniqueName,
            },
        );
        assert_eq!(rebuilt.names(), vec!["Activity_0", "Activity_0"]);
    }

    #[test]
    fn rebuild_log_validates_instances() {
        let (trace, instances) = sample();
        let forest = forest_with(&["a::b::c"]);
        let log = EventLog::new(vec![trace]);

        let err = rebuild_log(&log, &[], &forest, RebuildOptions::default()).unwrap_err();
        assert!(matches!(err, MiningError::TraceCountMismatch { .. }));

        let too_long = vec![vec![ActivityInstance::new(NodeId(0), 6, 5)]];
        let err = rebuild_log(&log, &too_long, &forest, RebuildOptions::default()).unwrap_err();
        assert!(matches!(err, MiningError::InstanceOutOfBounds { trace_index: 0, .. }));

        let rebuilt = rebuild_log(&log, &[instances], &forest, RebuildOptions::default()).unwrap();
        assert_eq!(rebuilt.count_underlying_events(), log.event_count());
    }

    #[test]
    fn strategies_parse() {
        assert_eq!(
            "insert-as-single-event".parse::<UndefinedStrategy>().unwrap(),
            UndefinedStrategy::InsertAsSingleEvent
        );
        assert_eq!("UniqueName".parse::<CompoundNaming>().unwrap(), CompoundNaming::UniqueName);
        assert!("Skip".parse::<UndefinedStrategy>().is_err());
    }
}
