//! `actmine patterns`

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use actmine::cli::{InputArgs, PatternArgs};
use actmine::patterns::{
    encode_with_decode_table, find_patterns, DecodeTable, RepeatSpan, Symbol,
};

use super::{load_config, read_log};

#[derive(Debug, Serialize)]
struct PatternEntry {
    trace: usize,
    first_pos: usize,
    length: usize,
    classes: Vec<String>,
}

fn collect(
    traces: &[Vec<Symbol>],
    spans: &[Vec<RepeatSpan>],
    decode: &DecodeTable,
) -> Vec<PatternEntry> {
    spans
        .iter()
        .enumerate()
        .flat_map(|(trace, trace_spans)| {
            trace_spans.iter().map(move |span| PatternEntry {
                trace,
                first_pos: span.first_pos,
                length: span.length,
                classes: span
                    .window(&traces[trace])
                    .iter()
                    .map(|&symbol| decode.name_or_code(symbol))
                    .collect(),
            })
        })
        .collect()
}

pub fn handle(
    config_path: Option<&Path>,
    input: &InputArgs,
    patterns: &PatternArgs,
    json: bool,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    input.apply(&mut config);
    patterns.apply(&mut config);

    let settings = config.settings()?;
    let extractor = config.extractor()?;
    let log = read_log(input, &config)?;

    let (traces, decode) = encode_with_decode_table(&log, extractor.as_ref());
    let spans = find_patterns(&traces, settings.pattern_kind, settings.strategy);
    let entries = collect(&traces, &spans, &decode);

    if json {
        println!("{}", serde_json::to_string_pretty(&entries)?);
        return Ok(());
    }

    for entry in &entries {
        println!(
            "trace {} [{}, {}) {}",
            entry.trace,
            entry.first_pos,
            entry.first_pos + entry.length,
            entry.classes.join(",")
        );
    }

    Ok(())
}
