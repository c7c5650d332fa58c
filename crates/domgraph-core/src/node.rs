//! Node payloads and the node label table.
//!
//! The graph itself only records whether a node is labelled or a hole
//! ([`NodeKind`]); the actual label strings live in a separate [`NodeLabels`]
//! table that codecs fill alongside the graph.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::id::NodeId;

/// Whether a node bears a semantic label or is a hole.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Labelled,
    #[serde(alias = "hole")]
    Unlabelled,
}

/// The weight stored on every node of a [`DomGraph`](crate::graph::DomGraph).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeData {
    /// Codec-level name, unique within a graph.
    pub name: String,
    pub kind: NodeKind,
}

impl NodeData {
    pub fn new(name: impl Into<String>, kind: NodeKind) -> Self {
        NodeData {
            name: name.into(),
            kind,
        }
    }

    /// Returns `true` for unlabelled nodes.
    pub fn is_hole(&self) -> bool {
        self.kind == NodeKind::Unlabelled
    }
}

/// Labels of the labelled nodes of one graph.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeLabels {
    labels: HashMap<NodeId, String>,
}

impl NodeLabels {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the label of `node`, returning the previous label if any.
    pub fn add_label(&mut self, node: NodeId, label: impl Into<String>) -> Option<String> {
        self.labels.insert(node, label.into())
    }

    pub fn label(&self, node: NodeId) -> Option<&str> {
        self.labels.get(&node).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
