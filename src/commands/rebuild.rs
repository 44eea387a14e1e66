//! `actmine rebuild`

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use actmine::cli::{ActivityArgs, InputArgs, PatternArgs};
use actmine::log::{text, ClassExtractor, EventLog};
use actmine::{ActivityDiscovery, Config};

use super::{load_config, read_log};

/// Rebuild-only flags.
pub struct RebuildArgs {
    pub undefined: Option<String>,
    pub naming: Option<String>,
    pub levels: Option<usize>,
    pub until_stable: bool,
    pub json: bool,
    pub reverse_hierarchy: bool,
    pub output: Option<PathBuf>,
}

impl RebuildArgs {
    fn apply(&self, config: &mut Config) {
        if let Some(undefined) = &self.undefined {
            config.activities.undefined = undefined.clone();
        }
        if let Some(naming) = &self.naming {
            config.activities.naming = naming.clone();
        }
        if let Some(levels) = self.levels {
            config.activities.levels = levels;
        }
    }
}

pub fn handle(
    config_path: Option<&Path>,
    input: &InputArgs,
    patterns: &PatternArgs,
    activities: &ActivityArgs,
    args: RebuildArgs,
) -> Result<()> {
    let mut config = load_config(config_path)?;
    input.apply(&mut config);
    patterns.apply(&mut config);
    activities.apply(&mut config);
    args.apply(&mut config);

    let discovery = ActivityDiscovery::new(config.settings()?)?;
    let extractor = config.extractor()?;
    let log = read_log(input, &config)?;

    let mut rebuilt = if args.until_stable {
        rebuild_until_stable(&discovery, &log, extractor.as_ref())?
    } else {
        rebuild(&discovery, &log, extractor.as_ref())?
    };
    if args.reverse_hierarchy {
        rebuilt.reverse_hierarchy_levels();
    }
    info!(
        events = log.event_count(),
        rebuilt_events = rebuilt.event_count(),
        "Rebuilt log"
    );

    let separator = config.input.separator.as_str();
    if args.json {
        let content = serde_json::to_string_pretty(&rebuilt)?;
        return match &args.output {
            Some(path) => fs::write(path, content)
                .with_context(|| format!("Failed to write log: {}", path.display())),
            None => {
                println!("{}", content);
                Ok(())
            }
        };
    }

    match &args.output {
        Some(path) => {
            let content = text::to_string(&rebuilt, separator)?;
            fs::write(path, content)
                .with_context(|| format!("Failed to write log: {}", path.display()))?;
        }
        None => {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            text::write_to(&rebuilt, &mut handle, separator)?;
            handle.flush()?;
        }
    }

    Ok(())
}

/// One level runs a plain rebuild; more levels reuse the same extractor at
/// every level and keep the last level's log.
fn rebuild(
    discovery: &ActivityDiscovery,
    log: &EventLog,
    extractor: &dyn ClassExtractor,
) -> Result<EventLog> {
    let levels = discovery.settings().levels;
    if levels == 1 {
        let (_, rebuilt) = discovery.discover_and_rebuild(log, extractor)?;
        return Ok(rebuilt);
    }

    let extractors = vec![extractor; levels];
    let outcomes = discovery.discover_levels(log, &extractors)?;
    Ok(outcomes
        .into_iter()
        .last()
        .map(|level| level.rebuilt)
        .unwrap_or_else(|| log.clone()))
}

/// Rebuild level after level until the log stops shrinking and keep the
/// last rebuilt log.
fn rebuild_until_stable(
    discovery: &ActivityDiscovery,
    log: &EventLog,
    extractor: &dyn ClassExtractor,
) -> Result<EventLog> {
    let outcomes = discovery.discover_until_stable(log, extractor)?;
    info!(levels = outcomes.len(), "Reached a stable log");
    Ok(outcomes
        .into_iter()
        .last()
        .map(|level| level.rebuilt)
        .unwrap_or_else(|| log.clone()))
}
