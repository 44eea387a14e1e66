//! Configuration file support.
//!
//! The config lives at `<config dir>/actmine/config.toml`. A missing file
//! means defaults; every section and field is optional.
//!
//! ```toml
//! [patterns]
//! kind = "PrimitiveTandemArrays"
//! max_tandem_length = 20
//! strategy = "FromAllTraces"
//!
//! [activities]
//! narrowing = "NarrowDown"
//! filter = "DefaultFilter"
//! min_events_in_activity = 0
//! undefined = "InsertAllEvents"
//! naming = "NodeName"
//! activity_level = 0
//! levels = 1
//! min_gap_events = 0
//!
//! [input]
//! separator = ","
//! ```
//!
//! Names are stored as plain strings and only turned into typed settings by
//! [`Config::settings`], so a bad value is reported once with a clear error.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::activities::{InstanceSettings, RebuildOptions};
use crate::error::MiningResult;
use crate::log::text::DEFAULT_SEPARATOR;
use crate::log::{ClassExtractor, NameClassExtractor, RegexClassExtractor};
use crate::patterns::{PatternKind, DEFAULT_MAX_TANDEM_LENGTH};
use crate::pipeline::DiscoverySettings;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub patterns: PatternsConfig,
    pub activities: ActivitiesConfig,
    pub input: InputConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternsConfig {
    pub kind: String,
    /// Exclusive upper bound on tandem array periods
    pub max_tandem_length: usize,
    pub strategy: String,
}

impl Default for PatternsConfig {
    fn default() -> Self {
        Self {
            kind: "PrimitiveTandemArrays".to_string(),
            max_tandem_length: DEFAULT_MAX_TANDEM_LENGTH,
            strategy: "FromAllTraces".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ActivitiesConfig {
    pub narrowing: String,
    pub filter: String,
    pub min_events_in_activity: usize,
    pub undefined: String,
    pub naming: String,
    pub activity_level: usize,
    pub levels: usize,
    /// Re-mine gaps of at least this many events; 0 turns it off
    pub min_gap_events: usize,
}

impl Default for ActivitiesConfig {
    fn default() -> Self {
        Self {
            narrowing: "NarrowDown".to_string(),
            filter: "DefaultFilter".to_string(),
            min_events_in_activity: 0,
            undefined: "InsertAllEvents".to_string(),
            naming: "NodeName".to_string(),
            activity_level: 0,
            levels: 1,
            min_gap_events: 0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Separator between event names on a trace line
    pub separator: String,
    /// Regex whose leading match is used as the event class
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_regex: Option<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            separator: DEFAULT_SEPARATOR.to_string(),
            class_regex: None,
        }
    }
}

impl Config {
    /// Load the user's config file, falling back to defaults when it does
    /// not exist.
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String> {
        toml::to_string_pretty(self).context("Failed to serialize config")
    }

    /// Save to the user's config file, creating its directory if needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_path()?;
        self.save_to(&path)?;
        Ok(path)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        fs::write(path, self.to_toml()?)
            .with_context(|| format!("Failed to write config file: {}", path.display()))
    }

    pub fn config_path() -> Result<PathBuf> {
        let dir = dirs::config_dir().context("Could not determine config directory")?;
        Ok(dir.join("actmine").join("config.toml"))
    }

    /// Turn the stored names into validated discovery settings.
    pub fn settings(&self) -> MiningResult<DiscoverySettings> {
        let patterns = &self.patterns;
        let activities = &self.activities;

        let settings = DiscoverySettings {
            pattern_kind: PatternKind::parse(&patterns.kind, patterns.max_tandem_length)?,
            strategy: patterns.strategy.parse()?,
            instances: InstanceSettings {
                narrowing: activities.narrowing.parse()?,
                filter: activities.filter.parse()?,
                min_events_in_activity: activities.min_events_in_activity,
            },
            rebuild: RebuildOptions {
                undefined: activities.undefined.parse()?,
                naming: activities.naming.parse()?,
            },
            activity_level: activities.activity_level,
            levels: activities.levels,
            min_gap_events: (activities.min_gap_events > 0).then_some(activities.min_gap_events),
        };

        settings.validate()?;
        Ok(settings)
    }

    /// The configured class extractor: the regex one when `class_regex` is
    /// set, the event name otherwise.
    pub fn extractor(&self) -> MiningResult<Box<dyn ClassExtractor>> {
        match &self.input.class_regex {
            Some(pattern) => Ok(Box::new(RegexClassExtractor::new(pattern)?)),
            None => Ok(Box::new(NameClassExtractor)),
        }
    }
}
