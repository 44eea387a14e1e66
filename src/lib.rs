//! actmine - activity mining for event logs
//!
//! Finds repeated patterns (tandem arrays and maximal repeats) in traces of
//! events, organises them into a hierarchy of activities and rewrites the
//! log with every activity instance collapsed into one compound event.
//!
//! ```
//! use actmine::log::{EventLog, NameClassExtractor};
//! use actmine::{ActivityDiscovery, DiscoverySettings};
//!
//! let log = EventLog::from_names(&[vec!["a", "b", "a", "b", "c"]]);
//! let discovery = ActivityDiscovery::new(DiscoverySettings::default()).unwrap();
//! let (outcome, rebuilt) = discovery.discover_and_rebuild(&log, &NameClassExtractor).unwrap();
//!
//! assert_eq!(outcome.forest.nodes()[0].name, "a::b");
//! assert_eq!(rebuilt.to_names(), vec![vec!["a::b", "c"]]);
//! ```

pub mod activities;
pub mod cli;
pub mod config;
pub mod error;
pub mod files;
pub mod log;
pub mod patterns;
pub mod pipeline;

pub use config::Config;
pub use error::{MiningError, MiningResult};
pub use pipeline::{ActivityDiscovery, DiscoveryOutcome, DiscoverySettings, DiscoveryStats, LevelOutcome};
