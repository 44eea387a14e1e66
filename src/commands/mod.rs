//! Subcommand handlers.
//!
//! Handlers load the config, apply command-line overrides on top of it and
//! print their results to stdout. Diagnostics go through `tracing` on stderr.

pub mod completions;
pub mod config;
pub mod discover;
pub mod loops;
pub mod patterns;
pub mod rebuild;

use std::io::{self, BufReader};
use std::path::Path;

use anyhow::Result;
use tracing::debug;

use actmine::cli::InputArgs;
use actmine::log::{text, EventLog};
use actmine::Config;

/// The config file given with `--config`, or the user's default one.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => Config::load_from(path),
        None => Config::load(),
    }
}

/// Read the input log, `-` meaning stdin.
pub fn read_log(input: &InputArgs, config: &Config) -> Result<EventLog> {
    let separator = config.input.separator.as_str();
    let log = if input.log.as_os_str() == "-" {
        text::parse_reader(BufReader::new(io::stdin().lock()), separator)?
    } else {
        text::parse(&input.log, separator)?
    };

    debug!(
        traces = log.len(),
        events = log.event_count(),
        "Read log"
    );
    Ok(log)
}
