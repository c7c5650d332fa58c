//! JSON graph documents.
//!
//! ```json
//! {
//!   "nodes": [{"name": "x1", "kind": "labelled", "label": "every"},
//!             {"name": "xl1", "kind": "unlabelled"}],
//!   "edges": [{"src": "x1", "tgt": "xl1", "kind": "tree"}]
//! }
//! ```

use std::path::{Path, PathBuf};

use domgraph_core::{CoreError, DomGraph, EdgeKind, NodeKind, NodeLabels};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NodeSpec {
    pub name: String,
    pub kind: NodeKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub src: String,
    pub tgt: String,
    pub kind: EdgeKind,
}

/// A dominance graph as read from disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GraphDocument {
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
    #[serde(default)]
    pub edges: Vec<EdgeSpec>,
}

/// Failure to turn a file into a graph.
#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("failed to read '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid graph document: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("malformed graph: {0}")]
    Graph(#[from] CoreError),
}

impl LoadError {
    /// Process exit code: 3 for I/O and parse errors, 1 for malformed graphs.
    pub fn exit_code(&self) -> i32 {
        match self {
            LoadError::Io { .. } | LoadError::Parse(_) => 3,
            LoadError::Graph(_) => 1,
        }
    }
}

impl GraphDocument {
    pub fn from_json(text: &str) -> Result<Self, LoadError> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn read(path: &Path) -> Result<Self, LoadError> {
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text)
    }

    /// Builds the graph and its label table. Nodes are added in document
    /// order, then edges in document order.
    pub fn to_graph(&self) -> Result<(DomGraph, NodeLabels), CoreError> {
        let mut graph = DomGraph::new();
        let mut labels = NodeLabels::new();
        for node in &self.nodes {
            let id = graph.add_node(node.name.as_str(), node.kind)?;
            if let Some(label) = &node.label {
                labels.add_label(id, label.as_str());
            }
        }
        for edge in &self.edges {
            graph.add_edge_by_name(&edge.src, &edge.tgt, edge.kind)?;
        }
        Ok((graph, labels))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_QUANTIFIERS: &str = r#"{
        "nodes": [
            {"name": "x", "kind": "labelled", "label": "every"},
            {"name": "xr", "kind": "unlabelled"},
            {"name": "y", "kind": "labelled", "label": "some"},
            {"name": "yr", "kind": "hole"},
            {"name": "z", "kind": "labelled", "label": "love"}
        ],
        "edges": [
            {"src": "x", "tgt": "xr", "kind": "tree"},
            {"src": "y", "tgt": "yr", "kind": "tree"},
            {"src": "xr", "tgt": "z", "kind": "dominance"},
            {"src": "yr", "tgt": "z", "kind": "dom"}
        ]
    }"#;

    #[test]
    fn document_builds_graph_and_labels() {
        let doc = GraphDocument::from_json(TWO_QUANTIFIERS).unwrap();
        let (graph, labels) = doc.to_graph().unwrap();

        assert_eq!(graph.node_count(), 5);
        assert_eq!(graph.edge_count(), 4);
        assert_eq!(labels.len(), 3);
        let y = graph.node_id("y").unwrap();
        assert_eq!(labels.label(y), Some("some"));
        assert!(graph.is_hole(graph.node_id("yr").unwrap()));
        assert!(graph.is_compact());
    }

    #[test]
    fn unknown_edge_endpoint_is_malformed() {
        let doc = GraphDocument::from_json(
            r#"{"nodes": [{"name": "a", "kind": "labelled"}],
                "edges": [{"src": "a", "tgt": "b", "kind": "tree"}]}"#,
        )
        .unwrap();
        let err = LoadError::from(doc.to_graph().unwrap_err());
        assert!(matches!(err, LoadError::Graph(CoreError::UnknownNode { .. })));
        assert_eq!(err.exit_code(), 1);
    }

    #[test]
    fn bad_json_is_a_parse_error() {
        let err = GraphDocument::from_json("{\"nodes\": [").unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
        assert_eq!(err.exit_code(), 3);
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let err = GraphDocument::read(Path::new("/nonexistent/graph.json")).unwrap_err();
        assert_eq!(err.exit_code(), 3);
    }
}
