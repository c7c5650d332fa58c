pub mod id;
pub mod edge;
pub mod node;
pub mod subgraph;
pub mod error;
pub mod graph;
pub mod classes;
pub mod compact;
pub mod generate;

// Re-export commonly used types
pub use id::{NodeId, EdgeId};
pub use edge::{DomEdge, EdgeKind};
pub use node::{NodeData, NodeKind, NodeLabels};
pub use subgraph::Subgraph;
pub use error::CoreError;
pub use graph::{DomGraph, EdgeList, GraphEdge};
pub use classes::ClassViolation;
pub use generate::{chain, random_compact, RandomGraphConfig};
