//! Recalculation ordering and circular dependency detection.
//!
//! When a cell changes, it and every cell that transitively reads it must be
//! recomputed, each one after everything it reads. This module walks the
//! dependents of the changed cell depth-first and emits them in reverse
//! postorder. Reaching the changed cell again through a dependent edge means
//! the change closed a loop, and no order is produced.
//!
//! The walk keeps its own work stack rather than recursing, so long chains of
//! formulas cannot exhaust the native stack.

use std::collections::HashSet;
use std::fmt;
use std::hash::Hash;

use super::graph::{DependencyGraph, NodeId};

/// The node whose change would close a dependency loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CircularDependency<N> {
    pub start: N,
}

impl<N: fmt::Display> fmt::Display for CircularDependency<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "circular dependency through {}", self.start)
    }
}

impl<N: fmt::Debug + fmt::Display> std::error::Error for CircularDependency<N> {}

/// Compute the order in which `start` and everything depending on it must be
/// recomputed. `start` is always first.
pub fn recalculation_order<N>(
    graph: &DependencyGraph<N>,
    start: &N,
) -> Result<Vec<N>, CircularDependency<N>>
where
    N: Clone + Eq + Hash,
{
    let Some(start_id) = graph.id(start) else {
        // Never seen by the graph: nothing can depend on it.
        return Ok(vec![start.clone()]);
    };

    let mut visited: HashSet<NodeId> = HashSet::new();
    let mut postorder: Vec<NodeId> = Vec::new();
    // (node, its dependents, index of the next dependent to look at)
    let mut stack: Vec<(NodeId, Vec<NodeId>, usize)> = Vec::new();

    visited.insert(start_id);
    stack.push((start_id, graph.sorted_dependent_ids(start_id), 0));

    while let Some((node, dependents, next)) = stack.last_mut() {
        if let Some(&dependent) = dependents.get(*next) {
            *next += 1;
            if dependent == start_id {
                return Err(CircularDependency {
                    start: start.clone(),
                });
            }
            if visited.insert(dependent) {
                stack.push((dependent, graph.sorted_dependent_ids(dependent), 0));
            }
        } else {
            postorder.push(*node);
            stack.pop();
        }
    }

    Ok(postorder
        .into_iter()
        .rev()
        .map(|id| graph.name(id).clone())
        .collect())
}
