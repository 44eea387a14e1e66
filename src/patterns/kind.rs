//! Pattern kinds and log-level pattern discovery.

use std::fmt;
use std::str::FromStr;

use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::index::{join_with_separators, Token};
use super::repeat_sets::{build_repeat_sets, RepeatSet};
use super::repeats::{
    find_maximal_repeats, find_near_super_maximal_repeats, find_super_maximal_repeats,
    MaximalRepeat,
};
use super::symbols::Symbol;
use super::tandem::{find_maximal_tandem_arrays, find_primitive_tandem_arrays, TandemArray};
use super::RepeatSpan;
use crate::error::{MiningError, MiningResult};

/// Default exclusive upper bound on tandem array periods.
pub const DEFAULT_MAX_TANDEM_LENGTH: usize = 20;

/// Which family of patterns to mine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PatternKind {
    PrimitiveTandemArrays(usize),
    MaximalTandemArrays(usize),
    MaximalRepeats,
    SuperMaximalRepeats,
    NearSuperMaximalRepeats,
}

impl PatternKind {
    /// Parse a kind name, giving tandem kinds the supplied maximum period.
    ///
    /// Names are matched ignoring case, `-` and `_`, so `MaximalRepeats`,
    /// `maximal-repeats` and `maximal_repeats` are the same kind.
    pub fn parse(name: &str, max_tandem_length: usize) -> MiningResult<Self> {
        let kind = match normalize(name).as_str() {
            "primitivetandemarrays" => PatternKind::PrimitiveTandemArrays(max_tandem_length),
            "maximaltandemarrays" => PatternKind::MaximalTandemArrays(max_tandem_length),
            "maximalrepeats" => PatternKind::MaximalRepeats,
            "supermaximalrepeats" => PatternKind::SuperMaximalRepeats,
            "nearsupermaximalrepeats" => PatternKind::NearSuperMaximalRepeats,
            _ => {
                return Err(MiningError::invalid_config(format!(
                    "unknown pattern kind '{}'",
                    name
                )))
            }
        };

        kind.validate()?;
        Ok(kind)
    }

    pub fn validate(&self) -> MiningResult<()> {
        match self {
            PatternKind::PrimitiveTandemArrays(0) | PatternKind::MaximalTandemArrays(0) => Err(
                MiningError::invalid_config("maximum tandem array length must be positive"),
            ),
            _ => Ok(()),
        }
    }

    pub fn is_tandem(&self) -> bool {
        self.repeat_kind().is_none()
    }

    /// The repeat family behind a repeat kind; `None` for tandem arrays.
    pub fn repeat_kind(&self) -> Option<RepeatKind> {
        match self {
            PatternKind::PrimitiveTandemArrays(_) | PatternKind::MaximalTandemArrays(_) => None,
            PatternKind::MaximalRepeats => Some(RepeatKind::Maximal),
            PatternKind::SuperMaximalRepeats => Some(RepeatKind::SuperMaximal),
            PatternKind::NearSuperMaximalRepeats => Some(RepeatKind::NearSuperMaximal),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            PatternKind::PrimitiveTandemArrays(_) => "PrimitiveTandemArrays",
            PatternKind::MaximalTandemArrays(_) => "MaximalTandemArrays",
            PatternKind::MaximalRepeats => "MaximalRepeats",
            PatternKind::SuperMaximalRepeats => "SuperMaximalRepeats",
            PatternKind::NearSuperMaximalRepeats => "NearSuperMaximalRepeats",
        }
    }
}

/// Repeat families mined from the suffix array index.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RepeatKind {
    Maximal,
    SuperMaximal,
    NearSuperMaximal,
}

impl RepeatKind {
    pub fn find<T: Ord + Copy>(self, text: &[T]) -> Vec<MaximalRepeat> {
        match self {
            RepeatKind::Maximal => find_maximal_repeats(text),
            RepeatKind::SuperMaximal => find_super_maximal_repeats(text),
            RepeatKind::NearSuperMaximal => find_near_super_maximal_repeats(text),
        }
    }
}

impl fmt::Display for PatternKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for PatternKind {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PatternKind::parse(s, DEFAULT_MAX_TANDEM_LENGTH)
    }
}

/// Whether repeats are mined per trace or once over all traces joined
/// together. Tandem arrays are always mined per trace.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscoveryStrategy {
    #[default]
    FromAllTraces,
    FromSingleMergedTrace,
}

impl fmt::Display for DiscoveryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DiscoveryStrategy::FromAllTraces => f.write_str("FromAllTraces"),
            DiscoveryStrategy::FromSingleMergedTrace => f.write_str("FromSingleMergedTrace"),
        }
    }
}

impl FromStr for DiscoveryStrategy {
    type Err = MiningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "fromalltraces" => Ok(DiscoveryStrategy::FromAllTraces),
            "fromsinglemergedtrace" => Ok(DiscoveryStrategy::FromSingleMergedTrace),
            _ => Err(MiningError::invalid_config(format!(
                "unknown discovery strategy '{}'",
                s
            ))),
        }
    }
}

pub(crate) fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '-' && *c != '_')
        .flat_map(char::to_lowercase)
        .collect()
}

/// Find the spans of the requested pattern kind, grouped per trace.
///
/// The outer vector always has one entry per input trace.
pub fn find_patterns(
    traces: &[Vec<Symbol>],
    kind: PatternKind,
    strategy: DiscoveryStrategy,
) -> Vec<Vec<RepeatSpan>> {
    let spans = match kind {
        PatternKind::PrimitiveTandemArrays(max) => per_trace(traces, |trace| {
            tandem_spans(find_primitive_tandem_arrays(trace, max))
        }),
        PatternKind::MaximalTandemArrays(max) => per_trace(traces, |trace| {
            tandem_spans(find_maximal_tandem_arrays(trace, max))
        }),
        PatternKind::MaximalRepeats => find_repeats(traces, RepeatKind::Maximal, strategy),
        PatternKind::SuperMaximalRepeats => {
            find_repeats(traces, RepeatKind::SuperMaximal, strategy)
        }
        PatternKind::NearSuperMaximalRepeats => {
            find_repeats(traces, RepeatKind::NearSuperMaximal, strategy)
        }
    };

    debug!(
        kind = %kind,
        strategy = %strategy,
        patterns = spans.iter().map(Vec::len).sum::<usize>(),
        "Found patterns"
    );
    spans
}

/// Find patterns and deduplicate them into repeat sets.
pub fn find_repeat_sets(
    traces: &[Vec<Symbol>],
    kind: PatternKind,
    strategy: DiscoveryStrategy,
) -> Vec<RepeatSet> {
    build_repeat_sets(traces, &find_patterns(traces, kind, strategy))
}

fn per_trace<F>(traces: &[Vec<Symbol>], find: F) -> Vec<Vec<RepeatSpan>>
where
    F: Fn(&[Symbol]) -> Vec<RepeatSpan> + Sync,
{
    traces.par_iter().map(|trace| find(trace)).collect()
}

fn tandem_spans(arrays: Vec<TandemArray>) -> Vec<RepeatSpan> {
    arrays.into_iter().map(|array| array.span).collect()
}

fn repeat_spans(repeats: Vec<MaximalRepeat>) -> Vec<RepeatSpan> {
    repeats.into_iter().map(|repeat| repeat.span).collect()
}

fn find_repeats(
    traces: &[Vec<Symbol>],
    kind: RepeatKind,
    strategy: DiscoveryStrategy,
) -> Vec<Vec<RepeatSpan>> {
    match strategy {
        DiscoveryStrategy::FromAllTraces => {
            per_trace(traces, |trace| repeat_spans(kind.find(trace)))
        }
        DiscoveryStrategy::FromSingleMergedTrace => from_merged_trace(traces, kind),
    }
}

/// Mine repeats once over all traces joined by unique separators, then map
/// every repeat to the trace holding its representative occurrence.
fn from_merged_trace(traces: &[Vec<Symbol>], kind: RepeatKind) -> Vec<Vec<RepeatSpan>> {
    let merged: Vec<Token> = join_with_separators(traces);

    let mut starts = Vec::with_capacity(traces.len());
    let mut offset = 0;
    for trace in traces {
        starts.push(offset);
        offset += trace.len() + 1;
    }

    let mut spans = vec![Vec::new(); traces.len()];
    for repeat in kind.find(&merged) {
        let position = repeat.span.first_pos;
        let trace_index = starts.partition_point(|&start| start <= position) - 1;
        spans[trace_index].push(RepeatSpan::new(
            position - starts[trace_index],
            repeat.span.length,
        ));
    }

    spans
}
