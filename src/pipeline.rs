//! End-to-end activity discovery.
//!
//! encode → patterns → repeat sets → hierarchy → instances → rebuild.
//! Per-trace stages run on the rayon pool; the repeat-set and hierarchy
//! stages are sequential reductions.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, info_span};

use crate::activities::{
    add_unattached_activities, build_hierarchy, default_activity_name, extract_activity_instances,
    rebuild_log, ActivityForest, ActivityInstance, IdGenerator, InstanceSettings, RebuildOptions,
    UndefinedStrategy, UnderlyingPatternKind,
};
use crate::error::{MiningError, MiningResult};
use crate::log::{ClassExtractor, EventLog};
use crate::patterns::{
    build_repeat_sets, encode_with_decode_table, find_patterns, DecodeTable, DiscoveryStrategy,
    PatternKind, Symbol, DEFAULT_MAX_TANDEM_LENGTH,
};

/// Validated knobs for one discovery run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoverySettings {
    pub pattern_kind: PatternKind,
    pub strategy: DiscoveryStrategy,
    pub instances: InstanceSettings,
    pub rebuild: RebuildOptions,
    /// Level assigned to the nodes of the first (or only) run
    pub activity_level: usize,
    /// Number of abstraction levels `discover_levels` expects
    pub levels: usize,
    /// Mine gaps of at least this many events a second time
    pub min_gap_events: Option<usize>,
}

impl Default for DiscoverySettings {
    fn default() -> Self {
        Self {
            pattern_kind: PatternKind::PrimitiveTandemArrays(DEFAULT_MAX_TANDEM_LENGTH),
            strategy: DiscoveryStrategy::default(),
            instances: InstanceSettings::default(),
            rebuild: RebuildOptions::default(),
            activity_level: 0,
            levels: 1,
            min_gap_events: None,
        }
    }
}

impl DiscoverySettings {
    pub fn validate(&self) -> MiningResult<()> {
        self.pattern_kind.validate()?;

        if self.levels == 0 {
            return Err(MiningError::invalid_config("number of levels must be positive"));
        }

        if self.min_gap_events == Some(0) {
            return Err(MiningError::invalid_config(
                "minimum gap size for unattached activities must be positive",
            ));
        }

        Ok(())
    }
}

/// Counters describing one discovery run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryStats {
    pub traces: usize,
    pub events: usize,
    pub patterns: usize,
    pub repeat_sets: usize,
    pub nodes: usize,
    pub instances: usize,
    pub covered_events: usize,
}

/// Everything a discovery run produces.
#[derive(Debug, Clone, Serialize)]
pub struct DiscoveryOutcome {
    pub forest: ActivityForest,
    pub instances: Vec<Vec<ActivityInstance>>,
    #[serde(skip)]
    pub traces: Vec<Vec<Symbol>>,
    #[serde(skip)]
    pub decode: DecodeTable,
    pub stats: DiscoveryStats,
}

/// One abstraction level of [`ActivityDiscovery::discover_levels`].
#[derive(Debug, Clone)]
pub struct LevelOutcome {
    pub level: usize,
    pub outcome: DiscoveryOutcome,
    pub rebuilt: EventLog,
}

pub struct ActivityDiscovery {
    settings: DiscoverySettings,
}

impl ActivityDiscovery {
    pub fn new(settings: DiscoverySettings) -> MiningResult<Self> {
        settings.validate()?;
        Ok(Self { settings })
    }

    pub fn settings(&self) -> &DiscoverySettings {
        &self.settings
    }

    /// Mine activities from `log` without rebuilding it.
    pub fn discover<E>(&self, log: &EventLog, extractor: &E) -> MiningResult<DiscoveryOutcome>
    where
        E: ClassExtractor + ?Sized,
    {
        self.discover_at_level(log, extractor, self.settings.activity_level, &mut IdGenerator::new())
    }

    /// Mine activities and rebuild `log` from them.
    pub fn discover_and_rebuild<E>(
        &self,
        log: &EventLog,
        extractor: &E,
    ) -> MiningResult<(DiscoveryOutcome, EventLog)>
    where
        E: ClassExtractor + ?Sized,
    {
        let outcome = self.discover(log, extractor)?;
        let rebuilt = rebuild_log(log, &outcome.instances, &outcome.forest, self.settings.rebuild)?;
        Ok((outcome, rebuilt))
    }

    /// Run discovery once per extractor, each level mining the log rebuilt
    /// by the previous one.
    ///
    /// Intermediate levels keep gap events so that the next level still sees
    /// the whole log; the last level uses the configured gap strategy.
    pub fn discover_levels(
        &self,
        log: &EventLog,
        extractors: &[&dyn ClassExtractor],
    ) -> MiningResult<Vec<LevelOutcome>> {
        if extractors.len() != self.settings.levels {
            return Err(MiningError::invalid_config(format!(
                "expected {} class extractors, got {}",
                self.settings.levels,
                extractors.len()
            )));
        }

        let mut ids = IdGenerator::new();
        let mut current = log.clone();
        let mut levels = Vec::with_capacity(extractors.len());

        for (offset, extractor) in extractors.iter().enumerate() {
            let level = self.settings.activity_level + offset;
            let outcome = self.discover_at_level(&current, *extractor, level, &mut ids)?;

            let mut options = self.settings.rebuild;
            if offset + 1 < extractors.len() {
                options.undefined = UndefinedStrategy::InsertAllEvents;
            }

            let rebuilt = rebuild_log(&current, &outcome.instances, &outcome.forest, options)?;
            current = rebuilt.clone();
            levels.push(LevelOutcome {
                level,
                outcome,
                rebuilt,
            });
        }

        Ok(levels)
    }

    /// Mine and rebuild repeatedly with one extractor until nothing changes.
    ///
    /// Each round mines the log rebuilt by the previous round, one level
    /// above it, with the configured gap strategy. The loop stops when a round
    /// finds no instances (that round is not returned) or when rebuilding no
    /// longer reduces the number of top-level events (that round is the last
    /// one returned). Rebuilding never adds events, so the loop terminates.
    pub fn discover_until_stable<E>(
        &self,
        log: &EventLog,
        extractor: &E,
    ) -> MiningResult<Vec<LevelOutcome>>
    where
        E: ClassExtractor + ?Sized,
    {
        let mut ids = IdGenerator::new();
        let mut current = log.clone();
        let mut levels = Vec::new();

        loop {
            let level = self.settings.activity_level + levels.len();
            let events = current.event_count();
            let outcome = self.discover_at_level(&current, extractor, level, &mut ids)?;

            if outcome.stats.instances == 0 {
                info!(level, "No more activity instances");
                break;
            }

            let rebuilt =
                rebuild_log(&current, &outcome.instances, &outcome.forest, self.settings.rebuild)?;
            let rebuilt_events = rebuilt.event_count();
            current = rebuilt.clone();
            levels.push(LevelOutcome {
                level,
                outcome,
                rebuilt,
            });

            if rebuilt_events >= events {
                info!(level, events, "Event count is stable");
                break;
            }
        }

        Ok(levels)
    }

    fn discover_at_level<E>(
        &self,
        log: &EventLog,
        extractor: &E,
        level: usize,
        ids: &mut IdGenerator,
    ) -> MiningResult<DiscoveryOutcome>
    where
        E: ClassExtractor + ?Sized,
    {
        let settings = &self.settings;
        let span = info_span!(
            "discover",
            kind = %settings.pattern_kind,
            strategy = %settings.strategy,
            activity_level = level
        );
        let _guard = span.enter();

        let (traces, decode) = encode_with_decode_table(log, extractor);
        debug!(traces = traces.len(), classes = decode.len(), "Encoded log");

        let spans = find_patterns(&traces, settings.pattern_kind, settings.strategy);
        let repeat_sets = build_repeat_sets(&traces, &spans);

        let forest = build_hierarchy(
            &repeat_sets,
            level,
            UnderlyingPatternKind::from(settings.pattern_kind),
            |set| default_activity_name(set, &decode),
            ids,
        );

        let mut instances = extract_activity_instances(&traces, &forest, &settings.instances);
        if let Some(min_gap_events) = settings.min_gap_events {
            instances = add_unattached_activities(
                &traces,
                &forest,
                &instances,
                min_gap_events,
                &settings.instances,
            )?;
        }

        let stats = DiscoveryStats {
            traces: traces.len(),
            events: log.event_count(),
            patterns: spans.iter().map(Vec::len).sum(),
            repeat_sets: repeat_sets.len(),
            nodes: forest.len(),
            instances: instances.iter().map(Vec::len).sum(),
            covered_events: instances.iter().flatten().map(|i| i.length).sum(),
        };

        info!(
            patterns = stats.patterns,
            activities = stats.nodes,
            instances = stats.instances,
            covered = stats.covered_events,
            "Discovered activities"
        );

        Ok(DiscoveryOutcome {
            forest,
            instances,
            traces,
            decode,
            stats,
        })
    }
}
