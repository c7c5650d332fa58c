//! Edge kinds and plain dominance-edge values.
//!
//! A dominance graph has two kinds of edges: [`EdgeKind::Tree`] edges build
//! the elementary trees (fragments), [`EdgeKind::Dominance`] edges constrain
//! how fragments may be stacked. A [`DomEdge`] is a free-standing dominance
//! edge, the unit in which solved forms are reported.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// Edge kinds of a dominance graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    /// Parent to child inside one fragment. Tree edges out of a node are
    /// ordered by insertion.
    Tree,
    /// The source's subtree must eventually dominate the target's subtree.
    #[serde(alias = "dom")]
    Dominance,
}

impl EdgeKind {
    /// Returns `true` if this is a tree edge.
    pub fn is_tree(self) -> bool {
        matches!(self, EdgeKind::Tree)
    }

    /// Returns `true` if this is a dominance edge.
    pub fn is_dominance(self) -> bool {
        matches!(self, EdgeKind::Dominance)
    }
}

/// A dominance edge detached from any graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct DomEdge {
    pub src: NodeId,
    pub tgt: NodeId,
}

impl DomEdge {
    pub fn new(src: NodeId, tgt: NodeId) -> Self {
        DomEdge { src, tgt }
    }
}

impl fmt::Display for DomEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "dom({}, {})", self.src, self.tgt)
    }
}
