//! Logs derived from a segmentation: one log per activity, the log of
//! everything left unattached, and a second extraction pass over gaps.

use std::collections::BTreeMap;

use tracing::debug;

use super::forest::ActivityForest;
use super::instances::{
    extract_activity_instances, process_activities_in_trace, validate_instances, ActivityInstance,
    InstanceSettings,
};
use crate::error::MiningResult;
use crate::log::{EventLog, Trace};
use crate::patterns::Symbol;

/// One log per activity name: every instance of a node at `level` becomes a
/// trace holding copies of the events it covers.
pub fn create_logs_for_activities(
    log: &EventLog,
    instances: &[Vec<ActivityInstance>],
    forest: &ActivityForest,
    level: usize,
) -> MiningResult<BTreeMap<String, EventLog>> {
    let lengths: Vec<usize> = log.traces.iter().map(Trace::len).collect();
    validate_instances(&lengths, instances)?;

    let mut logs: BTreeMap<String, EventLog> = BTreeMap::new();
    for (trace, trace_instances) in log.traces.iter().zip(instances) {
        for instance in trace_instances {
            let node = forest.node(instance.node);
            if node.level != level {
                continue;
            }

            let window = trace.events[instance.start_pos..instance.end()].to_vec();
            logs.entry(node.name.clone())
                .or_default()
                .push(Trace::new(window));
        }
    }

    debug!(activities = logs.len(), level, "Created activity logs");
    Ok(logs)
}

/// One log per compound event name of an already rebuilt log; each compound
/// event contributes a trace of its leaf events.
pub fn create_logs_from_compound_events(log: &EventLog) -> BTreeMap<String, EventLog> {
    let mut logs: BTreeMap<String, EventLog> = BTreeMap::new();
    for event in log.traces.iter().flat_map(|trace| trace.events.iter()) {
        if event.is_compound() {
            logs.entry(event.name.clone())
                .or_default()
                .push(Trace::new(event.leaf_events().into_iter().cloned().collect()));
        }
    }

    logs
}

/// A log holding, per trace, only the events no instance covers.
pub fn create_log_from_unattached_events(
    log: &EventLog,
    instances: &[Vec<ActivityInstance>],
) -> MiningResult<EventLog> {
    let lengths: Vec<usize> = log.traces.iter().map(Trace::len).collect();
    validate_instances(&lengths, instances)?;

    let traces = log
        .traces
        .iter()
        .zip(instances)
        .map(|(trace, trace_instances)| {
            let mut events = Vec::new();
            process_activities_in_trace(
                trace.len(),
                trace_instances,
                |start, end| events.extend(trace.events[start..end].iter().cloned()),
                |_| {},
            );
            Trace::new(events)
        })
        .collect();

    Ok(EventLog::new(traces))
}

/// Run extraction again inside every gap of at least `min_gap_events`
/// symbols and merge what it finds with `existing`, sorted by start.
pub fn add_unattached_activities(
    traces: &[Vec<Symbol>],
    forest: &ActivityForest,
    existing: &[Vec<ActivityInstance>],
    min_gap_events: usize,
    settings: &InstanceSettings,
) -> MiningResult<Vec<Vec<ActivityInstance>>> {
    let lengths: Vec<usize> = traces.iter().map(Vec::len).collect();
    validate_instances(&lengths, existing)?;

    let mut merged = Vec::with_capacity(traces.len());
    let mut added = 0;

    for (trace, trace_instances) in traces.iter().zip(existing) {
        let mut gaps = Vec::new();
        process_activities_in_trace(
            trace.len(),
            trace_instances,
            |start, end| {
                if end - start >= min_gap_events {
                    gaps.push((start, end));
                }
            },
            |_| {},
        );

        let gap_traces: Vec<Vec<Symbol>> = gaps
            .iter()
            .map(|&(start, end)| trace[start..end].to_vec())
            .collect();
        let found = extract_activity_instances(&gap_traces, forest, settings);

        let mut combined = trace_instances.clone();
        for (&(offset, _), gap_instances) in gaps.iter().zip(found) {
            added += gap_instances.len();
            combined.extend(gap_instances.into_iter().map(|instance| {
                ActivityInstance::new(instance.node, offset + instance.start_pos, instance.length)
            }));
        }

        combined.sort_by_key(|instance| instance.start_pos);
        merged.push(combined);
    }

    debug!(added, min_gap_events, "Added activities found in gaps");
    Ok(merged)
}
