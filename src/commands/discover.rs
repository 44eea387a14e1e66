//! `actmine discover`

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};

use actmine::activities::{create_log_from_unattached_events, create_logs_for_activities};
use actmine::cli::{ActivityArgs, InputArgs, PatternArgs};
use actmine::files::filename::activity_log_filename;
use actmine::log::{text, EventLog};
use actmine::{ActivityDiscovery, DiscoveryOutcome};

use super::{load_config, read_log};

/// Optional outputs besides the report on stdout.
pub struct Outputs<'a> {
    pub activity_logs: Option<&'a Path>,
    pub unattached: Option<&'a Path>,
    pub json: bool,
}

pub fn handle(
    config_path: Option<&Path>,
    input: &InputArgs,
    patterns: &PatternArgs,
    activities: &ActivityArgs,
    outputs: Outputs<'_>,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    input.apply(&mut config);
    patterns.apply(&mut config);
    activities.apply(&mut config);

    let discovery = ActivityDiscovery::new(config.settings()?)?;
    let extractor = config.extractor()?;
    let log = read_log(input, &config)?;
    let outcome = discovery.discover(&log, extractor.as_ref())?;
    let separator = config.input.separator.as_str();

    if let Some(dir) = outputs.activity_logs {
        let level = discovery.settings().activity_level;
        write_activity_logs(dir, &log, &outcome, level, separator)?;
    }

    if let Some(path) = outputs.unattached {
        let unattached = create_log_from_unattached_events(&log, &outcome.instances)?;
        write_log(path, &unattached, separator)?;
    }

    if outputs.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        print_report(&outcome);
    }

    Ok(())
}

fn print_report(outcome: &DiscoveryOutcome) {
    let forest = &outcome.forest;

    println!("Activities:");
    forest.walk(|id, depth| {
        let node = forest.node(id);
        println!(
            "{}{} ({}, {} classes)",
            "  ".repeat(depth + 1),
            node.name,
            node.unique_name(),
            node.size()
        );
    });

    println!("Instances:");
    for (trace_index, instances) in outcome.instances.iter().enumerate() {
        let rendered: Vec<String> = instances
            .iter()
            .map(|instance| {
                format!(
                    "{} [{}, {})",
                    forest.node(instance.node).name,
                    instance.start_pos,
                    instance.end()
                )
            })
            .collect();
        println!("  trace {}: {}", trace_index, rendered.join(", "));
    }

    let stats = &outcome.stats;
    println!(
        "{} traces, {} events, {} patterns, {} activities, {} instances covering {} events",
        stats.traces,
        stats.events,
        stats.patterns,
        stats.nodes,
        stats.instances,
        stats.covered_events
    );
}

fn write_activity_logs(
    dir: &Path,
    log: &EventLog,
    outcome: &DiscoveryOutcome,
    level: usize,
    separator: &str,
) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;

    let logs = create_logs_for_activities(log, &outcome.instances, &outcome.forest, level)?;
    for (name, activity_log) in &logs {
        let id = outcome
            .forest
            .find_by_name(name)
            .with_context(|| format!("No activity named '{}'", name))?;
        let unique_name = outcome.forest.node(id).unique_name();
        let path = dir.join(activity_log_filename(name, &unique_name));
        write_log(&path, activity_log, separator)?;
    }

    Ok(())
}

fn write_log(path: &Path, log: &EventLog, separator: &str) -> Result<()> {
    let content = text::to_string(log, separator)?;
    fs::write(path, content).with_context(|| format!("Failed to write log: {}", path.display()))
}
