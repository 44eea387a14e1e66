//! End-to-end discovery and rebuild through `ActivityDiscovery`.

use actmine::activities::{
    create_log_from_unattached_events, create_logs_for_activities, CompoundNaming, RebuildOptions,
    UndefinedStrategy, UNDEFINED_ACTIVITY_NAME,
};
use actmine::log::{text, NameClassExtractor, RegexClassExtractor};
use actmine::patterns::{DiscoveryStrategy, PatternKind};
use actmine::{ActivityDiscovery, DiscoverySettings, MiningError};

use crate::helpers::{char_log, load_fixture};

fn discovery(settings: DiscoverySettings) -> ActivityDiscovery {
    ActivityDiscovery::new(settings).expect("settings should be valid")
}

fn with_undefined(undefined: UndefinedStrategy) -> DiscoverySettings {
    DiscoverySettings {
        rebuild: RebuildOptions {
            undefined,
            naming: CompoundNaming::NodeName,
        },
        ..DiscoverySettings::default()
    }
}

// ============================================================================
// Rebuild Strategies
// ============================================================================

#[test]
fn rebuild_inserting_all_events() {
    let log = load_fixture("scenario.txt");
    let (_, rebuilt) = discovery(with_undefined(UndefinedStrategy::InsertAllEvents))
        .discover_and_rebuild(&log, &NameClassExtractor)
        .unwrap();

    assert_eq!(
        text::to_string(&rebuilt, ",").unwrap(),
        "g,d,a::b::c,f,i,a::b::c\n"
    );
}

#[test]
fn rebuild_inserting_single_undefined_events() {
    let log = load_fixture("scenario.txt");
    let (_, rebuilt) = discovery(with_undefined(UndefinedStrategy::InsertAsSingleEvent))
        .discover_and_rebuild(&log, &NameClassExtractor)
        .unwrap();

    assert_eq!(
        rebuilt.to_names(),
        vec![vec![
            UNDEFINED_ACTIVITY_NAME,
            "a::b::c",
            UNDEFINED_ACTIVITY_NAME,
            "a::b::c"
        ]]
    );
}

#[test]
fn rebuild_dropping_gaps() {
    let log = load_fixture("scenario.txt");
    let (_, rebuilt) = discovery(with_undefined(UndefinedStrategy::DontInsert))
        .discover_and_rebuild(&log, &NameClassExtractor)
        .unwrap();

    assert_eq!(rebuilt.to_names(), vec![vec!["a::b::c", "a::b::c"]]);
    assert_eq!(rebuilt.count_underlying_events(), 15);
}

#[test]
fn unique_naming_uses_activity_ids() {
    let log = load_fixture("scenario.txt");
    let settings = DiscoverySettings {
        rebuild: RebuildOptions {
            undefined: UndefinedStrategy::DontInsert,
            naming: CompoundNaming::UniqueName,
        },
        ..DiscoverySettings::default()
    };
    let (_, rebuilt) = discovery(settings)
        .discover_and_rebuild(&log, &NameClassExtractor)
        .unwrap();

    assert_eq!(rebuilt.to_names(), vec![vec!["Activity_0", "Activity_0"]]);
}

// ============================================================================
// Hierarchies
// ============================================================================

#[test]
fn merged_maximal_repeats_build_a_hierarchy() {
    let log = load_fixture("claims.txt");
    let settings = DiscoverySettings {
        pattern_kind: PatternKind::MaximalRepeats,
        strategy: DiscoveryStrategy::FromSingleMergedTrace,
        ..DiscoverySettings::default()
    };
    let (outcome, rebuilt) = discovery(settings)
        .discover_and_rebuild(&log, &NameClassExtractor)
        .unwrap();

    let forest = &outcome.forest;
    let mut shape = Vec::new();
    forest.walk(|id, depth| shape.push((forest.node(id).name.clone(), depth)));
    assert_eq!(
        shape,
        vec![
            ("approve::check::register".to_string(), 0),
            ("check::register".to_string(), 1),
            ("check".to_string(), 2),
            ("approve::check".to_string(), 1),
        ]
    );

    assert_eq!(
        rebuilt.to_names(),
        vec![
            vec!["approve::check::register", "notify"],
            vec!["approve::check::register"],
            vec!["approve::check::register", "archive"],
        ]
    );
}

#[test]
fn activity_logs_and_unattached_log() {
    let log = load_fixture("claims.txt");
    let settings = DiscoverySettings {
        pattern_kind: PatternKind::MaximalRepeats,
        strategy: DiscoveryStrategy::FromSingleMergedTrace,
        ..DiscoverySettings::default()
    };
    let outcome = discovery(settings).discover(&log, &NameClassExtractor).unwrap();

    let logs = create_logs_for_activities(&log, &outcome.instances, &outcome.forest, 0).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(logs["approve::check::register"].len(), 3);

    let unattached = create_log_from_unattached_events(&log, &outcome.instances).unwrap();
    assert_eq!(
        unattached.to_names(),
        vec![vec!["notify"], vec![], vec!["archive"]]
    );
}

#[test]
fn class_regex_changes_the_alphabet() {
    let raw = "io.read,io.write,net.send,io.read,io.write,net.send\n";
    let log = text::parse_str(raw, ",").unwrap();
    let extractor = RegexClassExtractor::new("^[^.]+").unwrap();
    let outcome = discovery(DiscoverySettings::default())
        .discover(&log, &extractor)
        .unwrap();

    let names: Vec<_> = outcome.forest.nodes().iter().map(|n| n.name.as_str()).collect();
    assert_eq!(names, vec!["io::net"]);
    assert_eq!(outcome.stats.covered_events, 6);
}

// ============================================================================
// Levels and Determinism
// ============================================================================

#[test]
fn levels_count_must_match_extractors() {
    let settings = DiscoverySettings {
        levels: 3,
        ..DiscoverySettings::default()
    };
    let err = discovery(settings)
        .discover_levels(&char_log(&["abab"]), &[&NameClassExtractor])
        .unwrap_err();

    assert!(matches!(err, MiningError::InvalidConfiguration(_)));
}

#[test]
fn second_level_abstracts_first_level_activities() {
    let settings = DiscoverySettings {
        levels: 2,
        ..DiscoverySettings::default()
    };
    let log = char_log(&["ababxababx"]);
    let levels = discovery(settings)
        .discover_levels(&log, &[&NameClassExtractor, &NameClassExtractor])
        .unwrap();

    assert_eq!(levels[0].rebuilt.to_names(), vec![vec!["a::b", "x", "a::b", "x"]]);
    assert_eq!(levels[1].rebuilt.to_names(), vec![vec!["a::b::x"]]);
    assert_eq!(levels[1].rebuilt.count_underlying_events(), log.event_count());
}

#[test]
fn discovery_is_deterministic() {
    let traces: Vec<String> = (0..32)
        .map(|i| match i % 3 {
            0 => "abcabcxyxy".to_string(),
            1 => "xyabab".to_string(),
            _ => "cabcabq".to_string(),
        })
        .collect();
    let refs: Vec<&str> = traces.iter().map(String::as_str).collect();
    let log = char_log(&refs);

    let run = || {
        let (outcome, rebuilt) = discovery(DiscoverySettings::default())
            .discover_and_rebuild(&log, &NameClassExtractor)
            .unwrap();
        (
            serde_json::to_string(&outcome).unwrap(),
            text::to_string(&rebuilt, ",").unwrap(),
        )
    };

    assert_eq!(run(), run());
}
