//! Command-line interface definitions.
//!
//! Lives in the library so that `xtask` can render man pages from the same
//! definitions the binary parses.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::config::Config;

/// Version string: the crate version plus the git SHA for dev builds.
#[cfg(not(feature = "release"))]
pub const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("VERGEN_GIT_SHA"), ")");

#[cfg(feature = "release")]
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Discover repeated patterns in event logs and abstract them into activities
#[derive(Debug, Parser)]
#[command(name = "actmine")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Only print errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Use this config file instead of the default one
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the patterns found in a log
    #[command(long_about = "List the patterns found in a log.

Prints one line per pattern: the trace it was found in, its position and its
content. Tandem array kinds are always mined trace by trace.

EXAMPLES:
    actmine patterns log.txt
    actmine patterns log.txt --kind maximal-repeats --strategy from-single-merged-trace")]
    Patterns {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        patterns: PatternArgs,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Discover activities and print the hierarchy and instances
    Discover {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        patterns: PatternArgs,

        #[command(flatten)]
        activities: ActivityArgs,

        /// Write one log per activity into this directory
        #[arg(long, value_name = "DIR")]
        activity_logs: Option<PathBuf>,

        /// Write the events covered by no activity to this file
        #[arg(long, value_name = "FILE")]
        unattached: Option<PathBuf>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Rebuild a log with activities replaced by compound events
    Rebuild {
        #[command(flatten)]
        input: InputArgs,

        #[command(flatten)]
        patterns: PatternArgs,

        #[command(flatten)]
        activities: ActivityArgs,

        /// Gap handling: DontInsert, InsertAsSingleEvent or InsertAllEvents
        #[arg(long, value_name = "STRATEGY")]
        undefined: Option<String>,

        /// Compound event names: NodeName or UniqueName
        #[arg(long, value_name = "NAMING")]
        naming: Option<String>,

        /// Number of abstraction levels to run
        #[arg(long, value_name = "N")]
        levels: Option<usize>,

        /// Keep mining and rebuilding until the log stops shrinking
        #[arg(long, conflicts_with = "levels")]
        until_stable: bool,

        /// Print the rebuilt log as JSON, with per-level activity annotations
        #[arg(long)]
        json: bool,

        /// Number hierarchy levels from the outermost activity down
        #[arg(long, requires = "json")]
        reverse_hierarchy: bool,

        /// Write the rebuilt log here instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Find strict loops (back-to-back repetitions, single events included)
    Loops {
        #[command(flatten)]
        input: InputArgs,

        /// Exclusive upper bound on loop periods
        #[arg(long, value_name = "N")]
        max_period: Option<usize>,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Show the effective configuration as TOML
    Show,
    /// Write a config file with default values
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the config file location
    Path,
}

/// Where the log comes from and how it is read.
#[derive(Debug, Clone, Args)]
pub struct InputArgs {
    /// Log file, one trace per line (`-` reads stdin)
    pub log: PathBuf,

    /// Separator between event names
    #[arg(short, long, value_name = "SEP")]
    pub separator: Option<String>,

    /// Use the leading match of this regex as the event class
    #[arg(long, value_name = "REGEX")]
    pub class_regex: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct PatternArgs {
    /// Pattern kind, e.g. primitive-tandem-arrays or super-maximal-repeats
    #[arg(short, long, value_name = "KIND")]
    pub kind: Option<String>,

    /// Exclusive upper bound on tandem array periods
    #[arg(long, value_name = "N")]
    pub max_tandem_length: Option<usize>,

    /// FromAllTraces or FromSingleMergedTrace
    #[arg(long, value_name = "STRATEGY")]
    pub strategy: Option<String>,
}

#[derive(Debug, Clone, Args)]
pub struct ActivityArgs {
    /// NarrowDown or DontNarrow
    #[arg(long, value_name = "KIND")]
    pub narrowing: Option<String>,

    /// DefaultFilter or NoFilter
    #[arg(long, value_name = "KIND")]
    pub filter: Option<String>,

    /// Smallest activity the default filter keeps
    #[arg(long, value_name = "N")]
    pub min_events: Option<usize>,

    /// Re-mine gaps of at least this many events
    #[arg(long, value_name = "N")]
    pub min_gap_events: Option<usize>,
}

impl InputArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(separator) = &self.separator {
            config.input.separator = separator.clone();
        }
        if let Some(regex) = &self.class_regex {
            config.input.class_regex = Some(regex.clone());
        }
    }
}

impl PatternArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(kind) = &self.kind {
            config.patterns.kind = kind.clone();
        }
        if let Some(max) = self.max_tandem_length {
            config.patterns.max_tandem_length = max;
        }
        if let Some(strategy) = &self.strategy {
            config.patterns.strategy = strategy.clone();
        }
    }
}

impl ActivityArgs {
    pub fn apply(&self, config: &mut Config) {
        if let Some(narrowing) = &self.narrowing {
            config.activities.narrowing = narrowing.clone();
        }
        if let Some(filter) = &self.filter {
            config.activities.filter = filter.clone();
        }
        if let Some(min_events) = self.min_events {
            config.activities.min_events_in_activity = min_events;
        }
        if let Some(min_gap_events) = self.min_gap_events {
            config.activities.min_gap_events = min_gap_events;
        }
    }
}
