//! Pattern and activity scenarios exercised through the public API.

use std::collections::BTreeSet;

use actmine::activities::{
    build_hierarchy, extract_activity_instances, ActivityForest, ActivityNode, IdGenerator,
    InstanceExtractor, InstanceSettings, NarrowingKind, UnderlyingPatternKind,
};
use actmine::patterns::{
    find_maximal_repeats, find_maximal_tandem_arrays, find_patterns, find_primitive_tandem_arrays,
    find_repeat_sets, DiscoveryStrategy, PatternKind, RepeatSpan, Symbol,
};

use crate::helpers::char_trace;

fn substrings(trace: &[Symbol], spans: impl IntoIterator<Item = RepeatSpan>) -> Vec<String> {
    spans
        .into_iter()
        .map(|span| {
            span.window(trace)
                .iter()
                .map(|&s| char::from_u32(s as u32).unwrap_or('?'))
                .collect()
        })
        .collect()
}

// ============================================================================
// Tandem Arrays
// ============================================================================

#[test]
fn tandem_arrays_of_repeated_unit() {
    let trace = char_trace("abcabcabcabc");
    let arrays: Vec<_> = find_maximal_tandem_arrays(&trace, 20)
        .iter()
        .map(|a| a.dump())
        .collect();

    assert_eq!(arrays, vec![(0, 3, 4), (1, 3, 3), (2, 3, 3), (0, 6, 2)]);
}

#[test]
fn tandem_arrays_inside_noise() {
    let trace = char_trace("gdabcabcabcabcafica");
    let arrays = find_maximal_tandem_arrays(&trace, 20);

    assert_eq!(
        substrings(&trace, arrays.iter().map(|a| a.span)),
        vec!["abc", "bca", "cab", "abcabc", "bcabca"]
    );
}

#[test]
fn primitive_tandem_arrays_drop_composite_units() {
    let trace = char_trace("gdabcabcabcabcafica");
    let arrays = find_primitive_tandem_arrays(&trace, 20);

    assert_eq!(
        substrings(&trace, arrays.iter().map(|a| a.span)),
        vec!["abc", "bca", "cab"]
    );
}

#[test]
fn max_tandem_length_is_exclusive() {
    let trace = char_trace("abcabc");
    assert!(find_maximal_tandem_arrays(&trace, 3).is_empty());
    assert_eq!(find_maximal_tandem_arrays(&trace, 4).len(), 1);
}

// ============================================================================
// Repeats
// ============================================================================

#[test]
fn maximal_repeat_with_distinct_contexts() {
    let trace = char_trace("abcdxabcyabcz");
    let repeats = find_maximal_repeats(&trace);

    assert_eq!(
        substrings(&trace, repeats.iter().map(|r| r.span)),
        vec!["abc"]
    );
    assert_eq!(repeats[0].positions, vec![0, 5, 9]);
}

#[test]
fn merged_strategy_finds_repeats_across_traces() {
    let traces = vec![char_trace("abcx"), char_trace("yabc")];

    let per_trace = find_patterns(
        &traces,
        PatternKind::MaximalRepeats,
        DiscoveryStrategy::FromAllTraces,
    );
    assert_eq!(per_trace, vec![vec![], vec![]]);

    let merged = find_patterns(
        &traces,
        PatternKind::MaximalRepeats,
        DiscoveryStrategy::FromSingleMergedTrace,
    );
    assert_eq!(merged, vec![vec![RepeatSpan::new(0, 3)], vec![]]);
}

#[test]
fn tandem_kinds_ignore_merged_strategy() {
    let traces = vec![char_trace("abab"), char_trace("cdcd")];
    let kind = PatternKind::PrimitiveTandemArrays(20);

    assert_eq!(
        find_patterns(&traces, kind, DiscoveryStrategy::FromAllTraces),
        find_patterns(&traces, kind, DiscoveryStrategy::FromSingleMergedTrace)
    );
}

#[test]
fn repeat_sets_deduplicate_by_class_set() {
    let traces = vec![char_trace("gdabcabcabcabcafica")];
    let sets = find_repeat_sets(
        &traces,
        PatternKind::PrimitiveTandemArrays(20),
        DiscoveryStrategy::FromAllTraces,
    );

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].span, RepeatSpan::new(2, 3));
    assert_eq!(sets[0].trace_index, 0);
}

// ============================================================================
// Activities
// ============================================================================

fn node(name: &str, classes: &str, ids: &mut IdGenerator) -> ActivityNode {
    let symbols: BTreeSet<Symbol> = char_trace(classes).into_iter().collect();
    ActivityNode::new(name, symbols, 0, UnderlyingPatternKind::Unknown, ids)
}

#[test]
fn narrowing_picks_the_covering_child() {
    let mut ids = IdGenerator::new();
    let mut forest = ActivityForest::new();
    let parent = forest.add_node(node("abc", "abc", &mut ids));
    let child = forest.add_node(node("ab", "ab", &mut ids));
    forest.add_root(parent);
    forest.attach(parent, child);

    let extractor = InstanceExtractor::new(&forest, NarrowingKind::NarrowDown);
    let classes: BTreeSet<Symbol> = char_trace("ab").into_iter().collect();
    assert_eq!(extractor.narrow(parent, &classes), child);

    let classes: BTreeSet<Symbol> = char_trace("ac").into_iter().collect();
    assert_eq!(extractor.narrow(parent, &classes), parent);
}

#[test]
fn scenario_instances_with_primitive_tandem_arrays() {
    let traces = vec![char_trace("gdabcabcabcabcafica")];
    let sets = find_repeat_sets(
        &traces,
        PatternKind::PrimitiveTandemArrays(20),
        DiscoveryStrategy::FromAllTraces,
    );
    let forest = build_hierarchy(
        &sets,
        0,
        UnderlyingPatternKind::PrimitiveTandemArray,
        |_| "abc".to_string(),
        &mut IdGenerator::new(),
    );

    let instances = extract_activity_instances(&traces, &forest, &InstanceSettings::default());
    let dumped: Vec<_> = instances[0]
        .iter()
        .map(|i| (i.start_pos, i.length))
        .collect();
    assert_eq!(dumped, vec![(2, 13), (17, 2)]);
}

#[test]
fn instances_never_overlap_and_stay_in_bounds() {
    let traces: Vec<_> = ["abcabdabcxxyab", "yxyxabcab", "", "q"]
        .iter()
        .map(|t| char_trace(t))
        .collect();
    let sets = find_repeat_sets(
        &traces,
        PatternKind::MaximalRepeats,
        DiscoveryStrategy::FromAllTraces,
    );
    let forest = build_hierarchy(
        &sets,
        0,
        UnderlyingPatternKind::MaximalRepeat,
        |set| format!("{:?}", set.symbols),
        &mut IdGenerator::new(),
    );

    let instances = extract_activity_instances(&traces, &forest, &InstanceSettings::default());
    assert_eq!(instances.len(), traces.len());
    for (trace, trace_instances) in traces.iter().zip(&instances) {
        let mut previous_end = 0;
        for instance in trace_instances {
            assert!(instance.start_pos >= previous_end);
            assert!(instance.end() <= trace.len());
            assert!(instance.length > 0);
            previous_end = instance.end();
        }
    }
}
