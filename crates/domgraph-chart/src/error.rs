//! Error types for chart maintenance and solving.
//!
//! Unsolvability is not an error: the solver reports it as `Ok(false)`.
//! These errors cover malformed input graphs and edits that would break the
//! chart's reference-count invariants.

use domgraph_core::{ClassViolation, CoreError, Subgraph};
use thiserror::Error;

/// Errors from editing or querying a [`Chart`](crate::chart::Chart).
///
/// A failed edit leaves the chart unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChartError {
    #[error("no splits recorded for subgraph {subgraph}")]
    UnknownSubgraph { subgraph: Subgraph },

    #[error("subgraph {subgraph} is still referenced {references} times; its last split may not be removed")]
    EmptySplitSet { subgraph: Subgraph, references: usize },

    #[error("subgraph {subgraph} is still referenced {references} times")]
    StillReferenced { subgraph: Subgraph, references: usize },
}

/// Errors from [`solve`](crate::solver::solve) and friends.
#[derive(Debug, Error)]
pub enum SolveError {
    #[error("graph is not weakly normal: {violation}")]
    NotWeaklyNormal { violation: ClassViolation },

    #[error("graph is not compact: {violation}")]
    NotCompact { violation: ClassViolation },

    #[error("chart already holds {subgraphs} subgraphs and {toplevel} top-level subgraphs")]
    ChartNotEmpty { subgraphs: usize, toplevel: usize },

    #[error(transparent)]
    Core(#[from] CoreError),
}
