//! Suffix array index over a symbol sequence.
//!
//! The index stands in for a suffix tree: the suffix array plus LCP table
//! exposes the same internal nodes as lcp-intervals, which is all maximal
//! repeat detection needs.

use std::cmp::Ordering;
use std::ops::Range;

use super::symbols::Symbol;

/// Element of an indexed text. Separators are unique, so no repeat can
/// ever span one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Token<T = Symbol> {
    Sym(T),
    Sep(usize),
}

impl<T: Copy> Token<T> {
    pub fn symbol(&self) -> Option<T> {
        match self {
            Token::Sym(value) => Some(*value),
            Token::Sep(_) => None,
        }
    }
}

/// Join sequences into one text, putting a distinct separator after each.
pub fn join_with_separators<T, S>(sequences: &[S]) -> Vec<Token<T>>
where
    T: Copy,
    S: AsRef<[T]>,
{
    let total: usize = sequences.iter().map(|s| s.as_ref().len() + 1).sum();
    let mut text = Vec::with_capacity(total);
    for (i, sequence) in sequences.iter().enumerate() {
        text.extend(sequence.as_ref().iter().copied().map(Token::Sym));
        text.push(Token::Sep(i));
    }

    text
}

/// A group of suffixes sharing a common prefix of `length` symbols; an
/// internal node of the implicit suffix tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LcpInterval {
    pub length: usize,
    pub suffixes: Range<usize>,
}

#[derive(Debug, Clone, Copy)]
enum LeftContext<T> {
    Empty,
    Single(T),
    Diverse,
}

impl<T: PartialEq + Copy> LeftContext<T> {
    /// `None` is the start of the text, which never matches anything.
    fn add(&mut self, left: Option<T>) {
        *self = match (*self, left) {
            (_, None) | (LeftContext::Diverse, _) => LeftContext::Diverse,
            (LeftContext::Empty, Some(c)) => LeftContext::Single(c),
            (LeftContext::Single(a), Some(c)) if a == c => LeftContext::Single(a),
            (LeftContext::Single(_), Some(_)) => LeftContext::Diverse,
        };
    }

    fn merge(&mut self, other: LeftContext<T>) {
        match other {
            LeftContext::Empty => {}
            LeftContext::Single(c) => self.add(Some(c)),
            LeftContext::Diverse => *self = LeftContext::Diverse,
        }
    }

    fn is_diverse(&self) -> bool {
        matches!(self, LeftContext::Diverse)
    }
}

struct OpenInterval<T> {
    length: usize,
    lb: usize,
    left: LeftContext<T>,
}

impl<T> OpenInterval<T> {
    fn new(length: usize, lb: usize) -> Self {
        Self {
            length,
            lb,
            left: LeftContext::Empty,
        }
    }
}

/// Suffix array and LCP table of a text.
#[derive(Debug, Clone)]
pub struct RepeatIndex<T> {
    text: Vec<T>,
    suffixes: Vec<usize>,
    lcp: Vec<usize>,
}

impl<T: Ord + Copy> RepeatIndex<T> {
    pub fn new(text: Vec<T>) -> Self {
        let suffixes = build_suffix_array(&text);
        let lcp = build_lcp(&text, &suffixes);
        Self {
            text,
            suffixes,
            lcp,
        }
    }

    pub fn text(&self) -> &[T] {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Text positions of the suffixes in `range`, ascending.
    pub fn positions(&self, range: Range<usize>) -> Vec<usize> {
        let mut positions = self.suffixes[range].to_vec();
        positions.sort_unstable();
        positions
    }

    /// Number of occurrences of `pattern` in the text.
    pub fn count_occurrences(&self, pattern: &[T]) -> usize {
        self.occurrence_range(pattern).len()
    }

    /// Text positions where `pattern` occurs, ascending.
    pub fn occurrences(&self, pattern: &[T]) -> Vec<usize> {
        self.positions(self.occurrence_range(pattern))
    }

    fn occurrence_range(&self, pattern: &[T]) -> Range<usize> {
        if pattern.is_empty() {
            return 0..0;
        }

        let head = |start: usize| {
            let suffix = &self.text[start..];
            &suffix[..pattern.len().min(suffix.len())]
        };
        let lower = self
            .suffixes
            .partition_point(|&s| head(s).cmp(pattern) == Ordering::Less);
        let upper = self
            .suffixes
            .partition_point(|&s| head(s).cmp(pattern) != Ordering::Greater);

        lower..upper
    }

    /// Left-diverse lcp-intervals, i.e. the maximal repeats of the text.
    ///
    /// An interval is left-diverse when its suffixes are preceded by at
    /// least two different symbols, or one of them starts the text.
    pub fn maximal_intervals(&self) -> Vec<LcpInterval> {
        let n = self.text.len();
        let mut found = Vec::new();
        if n == 0 {
            return found;
        }

        let mut stack = vec![OpenInterval::new(0, 0)];
        for i in 1..=n {
            let current = if i < n { self.lcp[i] } else { 0 };
            let mut lb = i - 1;
            let left = self.left_of(i - 1);
            if let Some(top) = stack.last_mut() {
                top.left.add(left);
            }

            let mut child: Option<OpenInterval<T>> = None;
            while let Some(top) = stack.last() {
                if current >= top.length {
                    break;
                }
                let Some(closed) = stack.pop() else { break };
                lb = closed.lb;
                if closed.left.is_diverse() {
                    found.push(LcpInterval {
                        length: closed.length,
                        suffixes: closed.lb..i,
                    });
                }

                match stack.last_mut() {
                    Some(parent) if current <= parent.length => {
                        parent.left.merge(closed.left);
                        child = None;
                    }
                    _ => child = Some(closed),
                }
            }

            let top_length = stack.last().map_or(0, |top| top.length);
            if current > top_length {
                let mut open = OpenInterval::new(current, lb);
                match child {
                    Some(child) => open.left.merge(child.left),
                    None => open.left.add(left),
                }
                stack.push(open);
            }
        }

        found
    }

    fn left_of(&self, rank: usize) -> Option<T> {
        let position = self.suffixes[rank];
        position.checked_sub(1).map(|p| self.text[p])
    }
}

/// Prefix doubling over ranks.
fn build_suffix_array<T: Ord>(text: &[T]) -> Vec<usize> {
    let n = text.len();
    let mut suffixes: Vec<usize> = (0..n).collect();
    if n == 0 {
        return suffixes;
    }

    suffixes.sort_by(|&a, &b| text[a].cmp(&text[b]));
    let mut rank = vec![0usize; n];
    for i in 1..n {
        let step = usize::from(text[suffixes[i]] != text[suffixes[i - 1]]);
        rank[suffixes[i]] = rank[suffixes[i - 1]] + step;
    }

    let mut next_rank = vec![0usize; n];
    let mut k = 1;
    while k < n && rank[suffixes[n - 1]] < n - 1 {
        let key = |rank: &[usize], i: usize| (rank[i], rank.get(i + k).copied());
        suffixes.sort_by_key(|&i| key(&rank, i));

        next_rank[suffixes[0]] = 0;
        for i in 1..n {
            let step = usize::from(key(&rank, suffixes[i]) != key(&rank, suffixes[i - 1]));
            next_rank[suffixes[i]] = next_rank[suffixes[i - 1]] + step;
        }
        std::mem::swap(&mut rank, &mut next_rank);
        k *= 2;
    }

    suffixes
}

/// Kasai's algorithm. `lcp[r]` is the common prefix length of the suffixes
/// ranked `r - 1` and `r`; `lcp[0]` is 0.
fn build_lcp<T: PartialEq>(text: &[T], suffixes: &[usize]) -> Vec<usize> {
    let n = text.len();
    let mut rank = vec![0usize; n];
    for (r, &position) in suffixes.iter().enumerate() {
        rank[position] = r;
    }

    let mut lcp = vec![0usize; n];
    let mut h = 0;
    for position in 0..n {
        if rank[position] == 0 {
            h = 0;
            continue;
        }

        let previous = suffixes[rank[position] - 1];
        while position + h < n && previous + h < n && text[position + h] == text[previous + h] {
            h += 1;
        }
        lcp[rank[position]] = h;
        h = h.saturating_sub(1);
    }

    lcp
}
