//! Shared helpers for integration tests.

use std::path::PathBuf;

use actmine::log::{text, EventLog};
use actmine::patterns::Symbol;

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn fixture_path(name: &str) -> PathBuf {
    fixtures_dir().join(name)
}

pub fn load_fixture(name: &str) -> EventLog {
    text::parse(fixture_path(name), text::DEFAULT_SEPARATOR).expect("fixture should parse")
}

/// One symbol per character, for tests that only care about structure.
pub fn char_trace(raw: &str) -> Vec<Symbol> {
    raw.chars().map(|c| c as Symbol).collect()
}

/// One event per character.
pub fn char_log(traces: &[&str]) -> EventLog {
    let names: Vec<Vec<String>> = traces
        .iter()
        .map(|t| t.chars().map(String::from).collect())
        .collect();
    EventLog::from_names(&names)
}
