//! Bidirectional dependency graph.
//!
//! Stores a set of edges `(dependee, dependent)`, meaning the dependent's
//! value is computed from the dependee's. Both directions are indexed so
//! that "who reads me" and "who do I read" are O(1) lookups.
//!
//! Node names are interned into a dense arena of ids on first sight. Every
//! mutating method updates the forward and backward indices together, so the
//! two can never disagree: `v` is among the dependents of `u` exactly when
//! `u` is among the dependees of `v`.
//!
//! The graph knows nothing about cells or formulas. Unknown nodes simply
//! have no edges; self-loops are ordinary edges.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;

use super::CellName;

/// Dense index of an interned node.
pub(crate) type NodeId = usize;

/// A directed-edge set over node names.
#[derive(Clone, Debug)]
pub struct DependencyGraph<N = CellName> {
    names: Vec<N>,
    ids: HashMap<N, NodeId>,
    /// dependents[u] = { v | (u, v) is an edge }
    dependents: Vec<HashSet<NodeId>>,
    /// dependees[v] = { u | (u, v) is an edge }
    dependees: Vec<HashSet<NodeId>>,
    size: usize,
}

impl<N> Default for DependencyGraph<N> {
    fn default() -> Self {
        DependencyGraph {
            names: Vec::new(),
            ids: HashMap::new(),
            dependents: Vec::new(),
            dependees: Vec::new(),
            size: 0,
        }
    }
}

impl<N: Clone + Eq + Hash> DependencyGraph<N> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of distinct edges (not nodes).
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// True if some node depends on `node`.
    pub fn has_dependents(&self, node: &N) -> bool {
        self.id(node).is_some_and(|id| !self.dependents[id].is_empty())
    }

    /// True if `node` depends on some node.
    pub fn has_dependees(&self, node: &N) -> bool {
        self.id(node).is_some_and(|id| !self.dependees[id].is_empty())
    }

    /// Nodes that depend directly on `node`.
    pub fn dependents<'a>(&'a self, node: &N) -> impl Iterator<Item = &'a N> + use<'a, N> {
        let ids = self.id(node).map(|id| &self.dependents[id]);
        ids.into_iter().flatten().map(|&id| &self.names[id])
    }

    /// Nodes that `node` depends on directly.
    pub fn dependees<'a>(&'a self, node: &N) -> impl Iterator<Item = &'a N> + use<'a, N> {
        let ids = self.id(node).map(|id| &self.dependees[id]);
        ids.into_iter().flatten().map(|&id| &self.names[id])
    }

    /// Add the edge `(dependee, dependent)`. Adding an existing edge does nothing.
    pub fn add(&mut self, dependee: N, dependent: N) {
        let from = self.intern(dependee);
        let to = self.intern(dependent);
        self.link(from, to);
    }

    /// Remove the edge `(dependee, dependent)` if present.
    pub fn remove(&mut self, dependee: &N, dependent: &N) {
        if let (Some(from), Some(to)) = (self.id(dependee), self.id(dependent)) {
            self.unlink(from, to);
        }
    }

    /// Make `new_dependents` the complete set of nodes depending on `node`.
    pub fn replace_dependents<I>(&mut self, node: &N, new_dependents: I)
    where
        I: IntoIterator<Item = N>,
    {
        let from = self.intern(node.clone());
        let wanted: HashSet<NodeId> = new_dependents
            .into_iter()
            .map(|n| self.intern(n))
            .collect();

        let stale: Vec<NodeId> = self.dependents[from].difference(&wanted).copied().collect();
        for to in stale {
            self.unlink(from, to);
        }
        for to in wanted {
            self.link(from, to);
        }
    }

    /// Make `new_dependees` the complete set of nodes `node` depends on.
    pub fn replace_dependees<I>(&mut self, node: &N, new_dependees: I)
    where
        I: IntoIterator<Item = N>,
    {
        let to = self.intern(node.clone());
        let wanted: HashSet<NodeId> = new_dependees
            .into_iter()
            .map(|n| self.intern(n))
            .collect();

        let stale: Vec<NodeId> = self.dependees[to].difference(&wanted).copied().collect();
        for from in stale {
            self.unlink(from, to);
        }
        for from in wanted {
            self.link(from, to);
        }
    }

    pub(crate) fn id(&self, node: &N) -> Option<NodeId> {
        self.ids.get(node).copied()
    }

    pub(crate) fn name(&self, id: NodeId) -> &N {
        &self.names[id]
    }

    /// Direct dependents of `id` in ascending id (first-seen) order.
    pub(crate) fn sorted_dependent_ids(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids: Vec<NodeId> = self.dependents[id].iter().copied().collect();
        ids.sort_unstable();
        ids
    }

    fn intern(&mut self, node: N) -> NodeId {
        if let Some(&id) = self.ids.get(&node) {
            return id;
        }
        let id = self.names.len();
        self.names.push(node.clone());
        self.ids.insert(node, id);
        self.dependents.push(HashSet::new());
        self.dependees.push(HashSet::new());
        id
    }

    fn link(&mut self, from: NodeId, to: NodeId) {
        if self.dependents[from].insert(to) {
            self.dependees[to].insert(from);
            self.size += 1;
        }
    }

    fn unlink(&mut self, from: NodeId, to: NodeId) {
        if self.dependents[from].remove(&to) {
            self.dependees[to].remove(&from);
            self.size -= 1;
        }
    }
}
