// src/dag/resolver.rs

//! Tiered topological ordering.
//!
//! A node's tier is `0` when it has no dependencies, otherwise one more than
//! the highest tier among its dependencies. The resolver walks the graph
//! depth-first, memoizing finalized tiers so no subgraph is visited twice,
//! and tracks the current path so a cycle can be reported concretely.

use std::collections::HashMap;
use std::fmt;

use thiserror::Error;
use tracing::debug;

/// Anything with an integer id and an ordered list of dependency ids.
pub trait DependencyNode {
    fn node_id(&self) -> u32;
    fn dependency_ids(&self) -> &[u32];
}

/// A node paired with its tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tiered<'a, N> {
    pub node: &'a N,
    pub tier: usize,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// `path` starts and ends with the same id.
    #[error("Circular dependency detected: {}", CyclePath(.path))]
    Cycle { path: Vec<u32> },

    #[error("{node} depends on {missing}, which does not exist")]
    MissingReference { node: u32, missing: u32 },
}

struct CyclePath<'a>(&'a [u32]);

impl fmt::Display for CyclePath<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(u32::to_string).collect();
        f.write_str(&parts.join(" -> "))
    }
}

#[derive(Debug, Clone, Copy)]
enum VisitState {
    InProgress,
    Done(usize),
}

struct Traversal<'a, N> {
    index: HashMap<u32, &'a N>,
    state: HashMap<u32, VisitState>,
    path: Vec<u32>,
}

impl<'a, N: DependencyNode> Traversal<'a, N> {
    /// Recursion depth equals the longest dependency chain. Task lists run to
    /// hundreds of entries at most, far below the default thread stack limit.
    fn visit(&mut self, id: u32) -> Result<usize, GraphError> {
        match self.state.get(&id) {
            Some(VisitState::Done(tier)) => return Ok(*tier),
            Some(VisitState::InProgress) => {
                // `id` is on the current path; everything after it forms the cycle.
                let start = self.path.iter().position(|p| *p == id).unwrap_or(0);
                let mut cycle = self.path[start..].to_vec();
                cycle.push(id);
                return Err(GraphError::Cycle { path: cycle });
            }
            None => {}
        }

        let node = self.index[&id];
        self.state.insert(id, VisitState::InProgress);
        self.path.push(id);

        let mut tier = 0;
        for dep in node.dependency_ids() {
            if !self.index.contains_key(dep) {
                return Err(GraphError::MissingReference {
                    node: id,
                    missing: *dep,
                });
            }
            tier = tier.max(self.visit(*dep)? + 1);
        }

        self.path.pop();
        self.state.insert(id, VisitState::Done(tier));
        Ok(tier)
    }
}

/// Resolve `nodes` into `(node, tier)` pairs sorted by tier, then id.
///
/// Every input node appears exactly once. The output does not depend on the
/// order of `nodes`. Ids are assumed unique; with duplicates, the last node
/// carrying an id wins.
pub fn resolve_order<N: DependencyNode>(nodes: &[N]) -> Result<Vec<Tiered<'_, N>>, GraphError> {
    let mut traversal = Traversal {
        index: nodes.iter().map(|n| (n.node_id(), n)).collect(),
        state: HashMap::with_capacity(nodes.len()),
        path: Vec::new(),
    };

    let mut roots: Vec<u32> = traversal.index.keys().copied().collect();
    roots.sort_unstable();

    let mut ordered = Vec::with_capacity(roots.len());
    for id in roots {
        let tier = traversal.visit(id)?;
        ordered.push(Tiered {
            node: traversal.index[&id],
            tier,
        });
    }

    ordered.sort_by_key(|t| (t.tier, t.node.node_id()));
    debug!(
        nodes = ordered.len(),
        max_tier = ordered.last().map(|t| t.tier),
        "resolved dependency order"
    );
    Ok(ordered)
}

/// Convenience: just the ids, in resolved order.
pub fn resolved_ids<N: DependencyNode>(nodes: &[N]) -> Result<Vec<u32>, GraphError> {
    Ok(resolve_order(nodes)?
        .into_iter()
        .map(|t| t.node.node_id())
        .collect())
}
