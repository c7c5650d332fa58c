//! Split sources: which splits of a subgraph the solver gets to see.
//!
//! [`SplitSource::Complete`] yields every split, which is what enumeration
//! and counting need. [`SplitSource::First`] stops after the first split; a
//! subgraph is solvable iff it has at least one split whose components are
//! solvable, and any free root will do, so this suffices to decide
//! solvability.

use domgraph_core::{DomGraph, NodeId, Subgraph};
use serde::{Deserialize, Serialize};

use crate::split::Split;
use crate::split_computer::SplitComputer;

/// Strategy for producing the splits of a subgraph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SplitSource {
    /// Every split, one per free root.
    #[default]
    Complete,
    /// At most one split.
    First,
}

impl SplitSource {
    /// Lazily computes the splits of `subgraph`.
    pub fn compute_splits<'a>(self, graph: &'a DomGraph, subgraph: &'a Subgraph) -> Splits<'a> {
        Splits {
            computer: SplitComputer::new(graph),
            subgraph,
            candidates: potential_free_roots(graph, subgraph).into_iter(),
            stop_after_first: self == SplitSource::First,
            exhausted: false,
        }
    }
}

/// Nodes of `subgraph` without incoming edges from inside `subgraph`, in
/// ascending order. Every free root is among them; whether a candidate is
/// actually free is decided by [`SplitComputer::compute_split`].
pub fn potential_free_roots(graph: &DomGraph, subgraph: &Subgraph) -> Vec<NodeId> {
    subgraph
        .iter()
        .filter(|&node| graph.in_degree_within(node, None, subgraph) == 0)
        .collect()
}

/// Iterator over the splits of one subgraph, see
/// [`SplitSource::compute_splits`].
pub struct Splits<'a> {
    computer: SplitComputer<'a>,
    subgraph: &'a Subgraph,
    candidates: std::vec::IntoIter<NodeId>,
    stop_after_first: bool,
    exhausted: bool,
}

impl Iterator for Splits<'_> {
    type Item = Split;

    fn next(&mut self) -> Option<Split> {
        if self.exhausted {
            return None;
        }
        for root in self.candidates.by_ref() {
            if let Some(split) = self.computer.compute_split(root, self.subgraph) {
                self.exhausted = self.stop_after_first;
                return Some(split);
            }
        }
        self.exhausted = true;
        None
    }
}
