//! Symbol encoding.
//!
//! Every event is mapped to an integer symbol by hashing its extracted class
//! name with a polynomial hash. Equal class strings always produce equal
//! symbols, within and across traces; hash collisions are accepted as
//! identity.

use std::collections::HashMap;

use rayon::prelude::*;
use serde::Serialize;
use tracing::warn;

use crate::log::{ClassExtractor, EventLog, Trace};

/// Integer code of an event class.
pub type Symbol = u64;

const MODULUS: u64 = 1_000_000_007;
const BASE: u64 = 31;

/// Polynomial hash of a class name.
pub fn string_hash(value: &str) -> Symbol {
    let mut hash = 0;
    let mut power = 1;
    for c in value.chars() {
        hash = (hash + (1 + c as u64) * power) % MODULUS;
        power = (power * BASE) % MODULUS;
    }

    hash
}

/// Polynomial hash of a window or set of symbols. The empty slice hashes to 0.
pub fn collection_hash(items: &[Symbol]) -> u64 {
    if items.is_empty() {
        return 0;
    }

    let mut hash = 1;
    let mut power = 1;
    for item in items {
        hash = (hash + (1 + item % MODULUS) * power) % MODULUS;
        power = (power * BASE) % MODULUS;
    }

    hash
}

/// Encode one trace with the given class extractor.
pub fn encode<E>(trace: &Trace, extractor: &E) -> Vec<Symbol>
where
    E: ClassExtractor + ?Sized,
{
    trace
        .events
        .iter()
        .map(|event| string_hash(&extractor.extract(event)))
        .collect()
}

/// Encode every trace of a log, in parallel.
pub fn encode_log<E>(log: &EventLog, extractor: &E) -> Vec<Vec<Symbol>>
where
    E: ClassExtractor + ?Sized,
{
    log.traces
        .par_iter()
        .map(|trace| encode(trace, extractor))
        .collect()
}

/// Symbol to class name mapping for recovering readable names.
#[derive(Debug, Clone, Default, Serialize)]
pub struct DecodeTable {
    names: HashMap<Symbol, String>,
    collisions: usize,
}

impl DecodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records the name behind `symbol`. The first name wins; returns `false`
    /// when the symbol was already taken by a different name, i.e. two classes
    /// hash to the same symbol.
    pub fn insert(&mut self, symbol: Symbol, name: impl Into<String>) -> bool {
        let name = name.into();
        match self.names.get(&symbol) {
            Some(existing) if *existing == name => true,
            Some(existing) => {
                warn!(
                    symbol,
                    kept = %existing,
                    ignored = %name,
                    "Hash collision between event classes"
                );
                self.collisions += 1;
                false
            }
            None => {
                self.names.insert(symbol, name);
                true
            }
        }
    }

    /// Number of times a second class name mapped to an existing symbol.
    pub fn collisions(&self) -> usize {
        self.collisions
    }

    pub fn name(&self, symbol: Symbol) -> Option<&str> {
        self.names.get(&symbol).map(String::as_str)
    }

    /// Readable name, falling back to the numeric symbol.
    pub fn name_or_code(&self, symbol: Symbol) -> String {
        match self.name(symbol) {
            Some(name) => name.to_string(),
            None => symbol.to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Encode a log and record the class name behind every symbol.
pub fn encode_with_decode_table<E>(log: &EventLog, extractor: &E) -> (Vec<Vec<Symbol>>, DecodeTable)
where
    E: ClassExtractor + ?Sized,
{
    let mut table = DecodeTable::new();
    let mut traces = Vec::with_capacity(log.len());

    for trace in &log.traces {
        let mut symbols = Vec::with_capacity(trace.len());
        for event in &trace.events {
            let class = extractor.extract(event);
            let symbol = string_hash(&class);
            table.insert(symbol, class.into_owned());
            symbols.push(symbol);
        }

        traces.push(symbols);
    }

    (traces, table)
}
