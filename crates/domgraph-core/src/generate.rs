//! Graph generators for benchmarks and tests.
//!
//! [`chain`] builds the classic chain family whose solved forms are counted
//! by the Catalan numbers. [`random_compact`] builds seeded random compact
//! graphs for property tests.

use std::collections::HashSet;

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::edge::EdgeKind;
use crate::error::CoreError;
use crate::graph::DomGraph;
use crate::id::NodeId;
use crate::node::{NodeKind, NodeLabels};

/// Builds a chain of length `length`.
///
/// The chain has `length` upper fragments `fi(xli, xri)` and `length + 1`
/// lower leaf fragments `ai`. Hole `xli` dominates `a(i-1)` and hole `xri`
/// dominates `ai`, so neighbouring upper fragments share a lower fragment.
/// A chain of length `n` has Catalan(n) solved forms.
pub fn chain(length: usize) -> Result<(DomGraph, NodeLabels), CoreError> {
    if length < 1 {
        return Err(CoreError::InvalidChainLength { length });
    }

    let mut graph = DomGraph::new();
    let mut labels = NodeLabels::new();

    let mut lower = graph.add_node("y0", NodeKind::Labelled)?;
    labels.add_label(lower, "a0");

    for i in 1..=length {
        let upper = graph.add_node(format!("x{i}"), NodeKind::Labelled)?;
        labels.add_label(upper, format!("f{i}"));
        let left = graph.add_node(format!("xl{i}"), NodeKind::Unlabelled)?;
        let right = graph.add_node(format!("xr{i}"), NodeKind::Unlabelled)?;
        graph.add_edge(upper, left, EdgeKind::Tree)?;
        graph.add_edge(upper, right, EdgeKind::Tree)?;
        graph.add_edge(left, lower, EdgeKind::Dominance)?;

        let next = graph.add_node(format!("y{i}"), NodeKind::Labelled)?;
        labels.add_label(next, format!("a{i}"));
        graph.add_edge(right, next, EdgeKind::Dominance)?;
        lower = next;
    }

    Ok((graph, labels))
}

/// Shape parameters for [`random_compact`].
#[derive(Debug, Clone)]
pub struct RandomGraphConfig {
    /// Number of fragments.
    pub fragments: usize,
    /// Upper bound on holes per fragment.
    pub max_holes: usize,
    /// Number of attempts to place a dominance edge. Duplicates and edges
    /// within one fragment are skipped.
    pub dominance_edges: usize,
}

impl Default for RandomGraphConfig {
    fn default() -> Self {
        RandomGraphConfig {
            fragments: 6,
            max_holes: 2,
            dominance_edges: 6,
        }
    }
}

/// Builds a random compact, weakly normal and well-formed graph.
///
/// The same `config` and `seed` always give the same graph. The result need
/// not be solvable.
pub fn random_compact(config: &RandomGraphConfig, seed: u64) -> Result<DomGraph, CoreError> {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut graph = DomGraph::new();

    let mut roots: Vec<NodeId> = Vec::with_capacity(config.fragments);
    // (hole, index of its fragment)
    let mut holes: Vec<(NodeId, usize)> = Vec::new();

    for i in 0..config.fragments {
        let root = graph.add_node(format!("r{i}"), NodeKind::Labelled)?;
        roots.push(root);
        let hole_count = rng.gen_range(0..=config.max_holes);
        for j in 0..hole_count {
            let hole = graph.add_node(format!("h{i}_{j}"), NodeKind::Unlabelled)?;
            graph.add_edge(root, hole, EdgeKind::Tree)?;
            holes.push((hole, i));
        }
    }

    let mut placed: HashSet<(NodeId, NodeId)> = HashSet::new();
    for _ in 0..config.dominance_edges {
        let Some(&(hole, fragment)) = holes.choose(&mut rng) else {
            break;
        };
        let target = rng.gen_range(0..roots.len());
        if target == fragment {
            continue;
        }
        if placed.insert((hole, roots[target])) {
            graph.add_edge(hole, roots[target], EdgeKind::Dominance)?;
        }
    }

    Ok(graph)
}
