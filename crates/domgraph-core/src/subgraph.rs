//! Subgraphs as sorted node-index sets.
//!
//! A [`Subgraph`] is the unit of memoization in the chart, so it needs cheap
//! hashing and equality. It is kept as a sorted, deduplicated vector of
//! [`NodeId`]s; membership is a binary search.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// A set of nodes of one dominance graph.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Subgraph(Vec<NodeId>);

impl Subgraph {
    pub fn new() -> Self {
        Subgraph(Vec::new())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        self.0.binary_search(&node).is_ok()
    }

    /// Inserts `node`, returning `false` if it was already present.
    pub fn insert(&mut self, node: NodeId) -> bool {
        match self.0.binary_search(&node) {
            Ok(_) => false,
            Err(pos) => {
                self.0.insert(pos, node);
                true
            }
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates the nodes in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.0.iter().copied()
    }

    pub fn as_slice(&self) -> &[NodeId] {
        &self.0
    }

    /// Returns the nodes of `self` that are not in `other`.
    pub fn difference(&self, other: &Subgraph) -> Subgraph {
        Subgraph(self.iter().filter(|n| !other.contains(*n)).collect())
    }
}

impl FromIterator<NodeId> for Subgraph {
    fn from_iter<I: IntoIterator<Item = NodeId>>(iter: I) -> Self {
        let mut nodes: Vec<NodeId> = iter.into_iter().collect();
        nodes.sort_unstable();
        nodes.dedup();
        Subgraph(nodes)
    }
}

impl<'a> IntoIterator for &'a Subgraph {
    type Item = NodeId;
    type IntoIter = std::iter::Copied<std::slice::Iter<'a, NodeId>>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter().copied()
    }
}

impl fmt::Display for Subgraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{{")?;
        for (i, node) in self.0.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}", node)?;
        }
        write!(f, "}}")
    }
}
