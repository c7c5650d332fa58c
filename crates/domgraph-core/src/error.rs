//! Core error types for domgraph-core.
//!
//! Uses `thiserror` for structured, matchable error variants covering the
//! failure modes of graph construction and transformation.

use thiserror::Error;

use crate::classes::ClassViolation;
use crate::id::NodeId;

/// Core errors produced by the domgraph-core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A node with this name already exists in the graph.
    #[error("duplicate node: '{name}'")]
    DuplicateNode { name: String },

    /// An edge endpoint does not exist in the graph.
    #[error("dangling edge: node {id} does not exist")]
    DanglingEdge { id: NodeId },

    /// A node name was not found in the graph.
    #[error("unknown node: '{name}'")]
    UnknownNode { name: String },

    /// A node index was not found in the graph.
    #[error("node not found: NodeId({id})", id = id.0)]
    NodeNotFound { id: NodeId },

    /// The graph cannot be compactified.
    #[error("graph is not compactifiable: {violation}")]
    NotCompactifiable { violation: ClassViolation },

    /// Chains have at least one upper fragment.
    #[error("invalid chain length {length}: must be at least 1")]
    InvalidChainLength { length: usize },
}
