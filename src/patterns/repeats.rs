//! Maximal, super-maximal and near-super-maximal repeats.
//!
//! All finders are generic over the symbol type so the same code serves a
//! single trace (`Symbol`) and the merged log (`Token<Symbol>`).

use serde::Serialize;

use super::index::{join_with_separators, RepeatIndex, Token};
use super::RepeatSpan;

/// A maximal repeat with its representative span (smallest occurrence
/// position) and every occurrence position, ascending.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MaximalRepeat {
    pub span: RepeatSpan,
    pub positions: Vec<usize>,
}

impl MaximalRepeat {
    pub fn occurrences(&self) -> impl Iterator<Item = RepeatSpan> + '_ {
        self.positions
            .iter()
            .map(move |&position| RepeatSpan::new(position, self.span.length))
    }
}

/// Find every maximal repeat, sorted by first position then length.
pub fn find_maximal_repeats<T: Ord + Copy>(text: &[T]) -> Vec<MaximalRepeat> {
    let index = RepeatIndex::new(text.to_vec());
    let mut repeats: Vec<MaximalRepeat> = index
        .maximal_intervals()
        .into_iter()
        .filter_map(|interval| {
            let positions = index.positions(interval.suffixes);
            let first_pos = *positions.first()?;
            Some(MaximalRepeat {
                span: RepeatSpan::new(first_pos, interval.length),
                positions,
            })
        })
        .collect();

    repeats.sort_by_key(|repeat| (repeat.span.first_pos, repeat.span.length));
    repeats
}

/// Keep the maximal repeats whose content is not contained in any other
/// maximal repeat.
pub fn find_super_maximal_repeats<T: Ord + Copy>(text: &[T]) -> Vec<MaximalRepeat> {
    super_maximal_of(text, find_maximal_repeats(text))
}

fn super_maximal_of<T: Ord + Copy>(
    text: &[T],
    repeats: Vec<MaximalRepeat>,
) -> Vec<MaximalRepeat> {
    let contents: Vec<&[T]> = repeats.iter().map(|r| r.span.window(text)).collect();
    let index = RepeatIndex::new(join_with_separators::<T, _>(&contents));

    let keep: Vec<bool> = contents
        .iter()
        .map(|content| {
            let pattern: Vec<_> = content.iter().copied().map(Token::Sym).collect();
            index.count_occurrences(&pattern) == 1
        })
        .collect();

    repeats
        .into_iter()
        .zip(keep)
        .filter_map(|(repeat, keep)| keep.then_some(repeat))
        .collect()
}

/// Keep the maximal repeats that have at least one occurrence not enveloped
/// by an occurrence of a longer accepted repeat.
pub fn find_near_super_maximal_repeats<T: Ord + Copy>(text: &[T]) -> Vec<MaximalRepeat> {
    near_super_maximal_of(find_maximal_repeats(text))
}

struct Occurrence {
    span: RepeatSpan,
    repeat: usize,
}

fn near_super_maximal_of(repeats: Vec<MaximalRepeat>) -> Vec<MaximalRepeat> {
    let mut occurrences: Vec<Occurrence> = repeats
        .iter()
        .enumerate()
        .flat_map(|(repeat, r)| {
            r.occurrences()
                .map(move |span| Occurrence { span, repeat })
        })
        .collect();

    // Stable: equal lengths stay in discovery order.
    occurrences.sort_by(|a, b| b.span.length.cmp(&a.span.length));

    let mut absorbed = vec![false; occurrences.len()];
    let mut accepted = vec![false; repeats.len()];
    for i in 0..occurrences.len() {
        if absorbed[i] {
            continue;
        }

        let outer = &occurrences[i];
        accepted[outer.repeat] = true;
        for (j, inner) in occurrences.iter().enumerate() {
            if outer.span.envelops(&inner.span) {
                absorbed[j] = true;
            }
        }
    }

    repeats
        .into_iter()
        .zip(accepted)
        .filter_map(|(repeat, accepted)| accepted.then_some(repeat))
        .collect()
}
