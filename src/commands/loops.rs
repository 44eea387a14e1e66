//! `actmine loops`

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use actmine::activities::{find_strict_loops, IdGenerator};
use actmine::cli::InputArgs;
use actmine::patterns::encode_with_decode_table;

use super::{load_config, read_log};

#[derive(Debug, Serialize)]
struct LoopEntry<'a> {
    trace: usize,
    name: &'a str,
    start_pos: usize,
    length: usize,
}

pub fn handle(
    config_path: Option<&Path>,
    input: &InputArgs,
    max_period: Option<usize>,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    input.apply(&mut config);

    let max_period = max_period.unwrap_or(config.patterns.max_tandem_length);
    let extractor = config.extractor()?;
    let log = read_log(input, &config)?;

    let (traces, decode) = encode_with_decode_table(&log, extractor.as_ref());
    let mut ids = IdGenerator::new();
    let (forest, instances) = find_strict_loops(&traces, &decode, max_period, &mut ids);

    let entries: Vec<LoopEntry<'_>> = instances
        .iter()
        .enumerate()
        .flat_map(|(trace, trace_instances)| {
            trace_instances.iter().map(move |instance| (trace, instance))
        })
        .map(|(trace, instance)| LoopEntry {
            trace,
            name: forest.node(instance.node).name.as_str(),
            start_pos: instance.start_pos,
            length: instance.length,
        })
        .collect();

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!(
            "trace {} [{}, {}) {}",
            entry.trace,
            entry.start_pos,
            entry.start_pos + entry.length,
            entry.name
        );
    }

    Ok(())
}
