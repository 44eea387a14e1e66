//! Plain-text event log format.
//!
//! One trace per line, event names separated by a separator string:
//!
//! ```text
//! register,check,check,approve
//! register,reject
//! ```
//!
//! Names are trimmed. A blank line is an empty trace, which is how traces
//! emptied by rebuilding or by the unattached-event log are written, so the
//! trace count survives a write and re-read. Compound events are written
//! by name only, so this format is for inspection and small fixtures, not for
//! round-tripping abstracted logs.

use std::fs;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{bail, Context, Result};

use super::{Event, EventLog, Trace};

/// Default separator between event names.
pub const DEFAULT_SEPARATOR: &str = ",";

/// Parse a log file from a path
pub fn parse<P: AsRef<Path>>(path: P, separator: &str) -> Result<EventLog> {
    let path = path.as_ref();
    let file = fs::File::open(path).with_context(|| format!("Failed to open log: {:?}", path))?;

    parse_reader(BufReader::new(file), separator)
}

/// Parse a log from a reader
pub fn parse_reader<R: BufRead>(reader: R, separator: &str) -> Result<EventLog> {
    if separator.is_empty() {
        bail!("Event separator must not be empty");
    }

    let mut log = EventLog::default();
    for (line_num, line_result) in reader.lines().enumerate() {
        let line = line_result.with_context(|| format!("Failed to read line {}", line_num + 1))?;

        let events = line
            .split(separator)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .map(Event::new)
            .collect();

        log.push(Trace::new(events));
    }

    Ok(log)
}

/// Parse a log from a string
pub fn parse_str(content: &str, separator: &str) -> Result<EventLog> {
    parse_reader(BufReader::new(content.as_bytes()), separator)
}

/// Write a log to a writer, one trace per line
pub fn write_to<W: Write>(log: &EventLog, writer: &mut W, separator: &str) -> Result<()> {
    for trace in &log.traces {
        writeln!(writer, "{}", trace.names().join(separator))?;
    }

    Ok(())
}

/// Render a log as a string
pub fn to_string(log: &EventLog, separator: &str) -> Result<String> {
    let mut buffer = Vec::new();
    write_to(log, &mut buffer, separator)?;
    Ok(String::from_utf8(buffer)?)
}
