//! Arena-backed activity forest.
//!
//! Nodes live in one `Vec` and refer to each other through [`NodeId`]
//! indices. The forest is built once by the hierarchy builder (or the loop
//! finder) and is read-only afterwards, so it can be shared freely across
//! rayon workers.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::patterns::{PatternKind, RepeatSet, Symbol};

/// Index of a node inside its [`ActivityForest`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Pattern family an activity node was derived from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnderlyingPatternKind {
    StrictLoop,
    PrimitiveTandemArray,
    MaximalTandemArray,
    MaximalRepeat,
    SuperMaximalRepeat,
    NearSuperMaximalRepeat,
    Unknown,
}

impl From<PatternKind> for UnderlyingPatternKind {
    fn from(kind: PatternKind) -> Self {
        match kind {
            PatternKind::PrimitiveTandemArrays(_) => Self::PrimitiveTandemArray,
            PatternKind::MaximalTandemArrays(_) => Self::MaximalTandemArray,
            PatternKind::MaximalRepeats => Self::MaximalRepeat,
            PatternKind::SuperMaximalRepeats => Self::SuperMaximalRepeat,
            PatternKind::NearSuperMaximalRepeats => Self::NearSuperMaximalRepeat,
        }
    }
}

/// Hands out the unique indices behind [`ActivityNode::unique_name`].
///
/// One generator is threaded through every forest built for the same log,
/// so activity names stay unique across abstraction levels.
#[derive(Debug, Clone, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(next: u64) -> Self {
        Self { next }
    }

    pub fn next_id(&mut self) -> u64 {
        let id = self.next;
        self.next += 1;
        id
    }

    /// The id the next call to [`IdGenerator::next_id`] will return.
    pub fn peek(&self) -> u64 {
        self.next
    }
}

/// A reusable activity: a named set of symbols.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActivityNode {
    pub name: String,
    pub unique_index: u64,
    pub symbols: BTreeSet<Symbol>,
    pub level: usize,
    /// Repeat set the node was built from; absent for synthetic nodes
    pub repeat_set: Option<RepeatSet>,
    pub pattern_kind: UnderlyingPatternKind,
    pub children: Vec<NodeId>,
}

impl ActivityNode {
    pub fn new(
        name: impl Into<String>,
        symbols: BTreeSet<Symbol>,
        level: usize,
        pattern_kind: UnderlyingPatternKind,
        ids: &mut IdGenerator,
    ) -> Self {
        Self {
            name: name.into(),
            unique_index: ids.next_id(),
            symbols,
            level,
            repeat_set: None,
            pattern_kind,
            children: Vec::new(),
        }
    }

    pub fn from_repeat_set(
        repeat_set: &RepeatSet,
        name: impl Into<String>,
        level: usize,
        pattern_kind: UnderlyingPatternKind,
        ids: &mut IdGenerator,
    ) -> Self {
        let mut node = Self::new(name, repeat_set.symbols.clone(), level, pattern_kind, ids);
        node.repeat_set = Some(repeat_set.clone());
        node
    }

    /// Number of distinct symbols.
    pub fn size(&self) -> usize {
        self.symbols.len()
    }

    /// Serialization-safe name, unique within one [`IdGenerator`].
    pub fn unique_name(&self) -> String {
        format!("Activity_{}", self.unique_index)
    }

    pub fn contains(&self, symbol: Symbol) -> bool {
        self.symbols.contains(&symbol)
    }

    pub fn contains_all<'a>(&self, symbols: impl IntoIterator<Item = &'a Symbol>) -> bool {
        symbols.into_iter().all(|s| self.symbols.contains(s))
    }

    /// True when this node's set strictly contains `other`'s set.
    pub fn strictly_contains(&self, other: &ActivityNode) -> bool {
        self.symbols.len() > other.symbols.len() && self.symbols.is_superset(&other.symbols)
    }
}

/// Activity nodes plus the ordered list of roots.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ActivityForest {
    nodes: Vec<ActivityNode>,
    roots: Vec<NodeId>,
}

impl ActivityForest {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a detached node. It is neither a root nor anyone's child yet.
    pub fn add_node(&mut self, node: ActivityNode) -> NodeId {
        self.nodes.push(node);
        NodeId(self.nodes.len() - 1)
    }

    pub fn add_root(&mut self, id: NodeId) {
        self.roots.push(id);
    }

    pub fn attach(&mut self, parent: NodeId, child: NodeId) {
        self.nodes[parent.0].children.push(child);
    }

    /// # Panics
    ///
    /// Panics if `id` does not belong to this forest.
    pub fn node(&self, id: NodeId) -> &ActivityNode {
        &self.nodes[id.0]
    }

    pub fn get(&self, id: NodeId) -> Option<&ActivityNode> {
        self.nodes.get(id.0)
    }

    pub fn nodes(&self) -> &[ActivityNode] {
        &self.nodes
    }

    pub fn roots(&self) -> &[NodeId] {
        &self.roots
    }

    pub fn ids(&self) -> impl Iterator<Item = NodeId> {
        (0..self.nodes.len()).map(NodeId)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        &self.node(id).children
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.ids().find(|&id| self.node(id).name == name)
    }

    /// Names carried by more than one node.
    pub fn duplicate_names(&self) -> HashSet<&str> {
        let mut counts: HashMap<&str, usize> = HashMap::new();
        for node in &self.nodes {
            *counts.entry(node.name.as_str()).or_default() += 1;
        }

        counts
            .into_iter()
            .filter_map(|(name, count)| (count > 1).then_some(name))
            .collect()
    }

    /// Descendants of `id` in breadth-first order, excluding `id` itself.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut queue: VecDeque<NodeId> = self.children(id).iter().copied().collect();
        let mut visited = Vec::new();
        while let Some(current) = queue.pop_front() {
            visited.push(current);
            queue.extend(self.children(current).iter().copied());
        }

        visited
    }

    /// Depth-first pre-order walk from every root, with the depth of each
    /// visited node.
    pub fn walk(&self, mut visit: impl FnMut(NodeId, usize)) {
        let mut stack: Vec<(NodeId, usize)> = self.roots.iter().rev().map(|&id| (id, 0)).collect();
        while let Some((id, depth)) = stack.pop() {
            visit(id, depth);
            for &child in self.children(id).iter().rev() {
                stack.push((child, depth + 1));
            }
        }
    }

    /// Move every node of `other` into this forest, keeping its roots as roots.
    pub fn absorb(&mut self, other: ActivityForest) {
        let offset = self.nodes.len();
        for mut node in other.nodes {
            for child in &mut node.children {
                child.0 += offset;
            }
            self.nodes.push(node);
        }

        self.roots
            .extend(other.roots.into_iter().map(|id| NodeId(id.0 + offset)));
    }
}
