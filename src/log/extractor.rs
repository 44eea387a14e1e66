//! Event class extraction.
//!
//! A class extractor decides which events are "the same symbol". Mining only
//! ever sees the extracted class, so swapping the extractor changes the
//! abstraction the patterns are found at.

use std::borrow::Cow;

use regex::Regex;

use super::Event;
use crate::error::{MiningError, MiningResult};

/// Maps an event to its class string.
pub trait ClassExtractor: Send + Sync {
    fn extract<'a>(&self, event: &'a Event) -> Cow<'a, str>;
}

/// Uses the event's declared name as its class.
#[derive(Debug, Clone, Copy, Default)]
pub struct NameClassExtractor;

impl ClassExtractor for NameClassExtractor {
    fn extract<'a>(&self, event: &'a Event) -> Cow<'a, str> {
        Cow::Borrowed(event.name.as_str())
    }
}

/// Uses the part of the event name matched by a regex as its class.
///
/// Only a match anchored at the start of the name is used; any other name
/// is taken whole. With `^[^.]+` the events `io.read` and `io.write` both
/// map to class `io`.
#[derive(Debug, Clone)]
pub struct RegexClassExtractor {
    regex: Regex,
}

impl RegexClassExtractor {
    pub fn new(pattern: &str) -> MiningResult<Self> {
        let regex = Regex::new(pattern).map_err(|e| {
            MiningError::invalid_config(format!("invalid class regex '{}': {}", pattern, e))
        })?;

        Ok(Self { regex })
    }

    pub fn pattern(&self) -> &str {
        self.regex.as_str()
    }
}

impl ClassExtractor for RegexClassExtractor {
    fn extract<'a>(&self, event: &'a Event) -> Cow<'a, str> {
        let name = event.name.as_str();
        match self.regex.find(name) {
            Some(m) if m.start() == 0 && m.end() > 0 => Cow::Borrowed(&name[..m.end()]),
            _ => Cow::Borrowed(name),
        }
    }
}

impl<F> ClassExtractor for F
where
    F: Fn(&Event) -> String + Send + Sync,
{
    fn extract<'a>(&self, event: &'a Event) -> Cow<'a, str> {
        Cow::Owned(self(event))
    }
}
