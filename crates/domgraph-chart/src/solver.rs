//! The chart solver.
//!
//! Fills a [`Chart`] with the splits of every subgraph reachable from the
//! weakly connected components of a compact, weakly normal graph. A subgraph
//! is solvable iff it consists of a single fragment, or it has a free root
//! and every component of the induced split is solvable. Once some subgraph
//! has no free root the whole graph is unsolvable and solving stops.

use domgraph_core::{DomGraph, Subgraph};
use serde::{Deserialize, Serialize};

use crate::chart::Chart;
use crate::error::SolveError;
use crate::split_source::SplitSource;

/// Solver configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Which splits are entered into the chart.
    pub split_source: SplitSource,
}

/// Solves `graph` into `chart` with every split of every subgraph.
///
/// See [`solve_with`].
pub fn solve(graph: &DomGraph, chart: &mut Chart) -> Result<bool, SolveError> {
    solve_with(graph, chart, &SolverConfig::default())
}

/// Solves `graph` into `chart`.
///
/// Returns `Ok(false)` if the graph is unsolvable; the chart is then marked
/// unsolvable, holds no entries and counts zero solved forms. Fails with
/// [`SolveError::NotWeaklyNormal`], [`SolveError::NotCompact`] or
/// [`SolveError::ChartNotEmpty`] before touching the chart.
pub fn solve_with(graph: &DomGraph, chart: &mut Chart, config: &SolverConfig) -> Result<bool, SolveError> {
    graph
        .check_weakly_normal()
        .map_err(|violation| SolveError::NotWeaklyNormal { violation })?;
    graph
        .check_compact()
        .map_err(|violation| SolveError::NotCompact { violation })?;
    if !chart.is_empty() {
        return Err(SolveError::ChartNotEmpty {
            subgraphs: chart.subgraph_count(),
            toplevel: chart.toplevel_subgraphs().len(),
        });
    }

    tracing::debug!(
        nodes = graph.node_count(),
        edges = graph.edge_count(),
        split_source = ?config.split_source,
        "solving dominance graph"
    );

    if !graph.is_well_formed() {
        tracing::debug!("graph is not well-formed");
        chart.mark_unsolvable();
        return Ok(false);
    }

    let mut solver = ChartSolver {
        graph,
        chart,
        roots: graph.all_roots(),
        split_source: config.split_source,
    };

    for wcc in graph.wccs() {
        solver.chart.add_toplevel_subgraph(wcc.clone());
        if !solver.solve_subgraph(&wcc) {
            tracing::debug!(splits = solver.chart.size(), "graph is unsolvable");
            solver.chart.mark_unsolvable();
            return Ok(false);
        }
    }

    tracing::debug!(
        splits = solver.chart.size(),
        subgraphs = solver.chart.subgraph_count(),
        "graph is solvable"
    );
    Ok(true)
}

/// Decides solvability of a weakly normal, compactifiable graph.
///
/// Compactifies the graph if needed and solves it with
/// [`SplitSource::First`] into a scratch chart.
pub fn is_solvable(graph: &DomGraph) -> Result<bool, SolveError> {
    graph
        .check_weakly_normal()
        .map_err(|violation| SolveError::NotWeaklyNormal { violation })?;
    let compact = graph.compactify()?;

    let config = SolverConfig {
        split_source: SplitSource::First,
    };
    solve_with(&compact, &mut Chart::new(), &config)
}

struct ChartSolver<'a> {
    graph: &'a DomGraph,
    chart: &'a mut Chart,
    roots: Subgraph,
    split_source: SplitSource,
}

impl ChartSolver<'_> {
    fn solve_subgraph(&mut self, subgraph: &Subgraph) -> bool {
        if self.chart.contains_split_for(subgraph) {
            return true;
        }

        // A single fragment is solved as it stands. It gets no entry of its
        // own; the parent's split refers to it.
        let root_count = subgraph.iter().filter(|&n| self.roots.contains(n)).count();
        if root_count == 1 {
            return true;
        }

        tracing::trace!(subgraph = %subgraph, "computing splits");
        let mut splits = self
            .split_source
            .compute_splits(self.graph, subgraph)
            .peekable();
        if splits.peek().is_none() {
            tracing::trace!(subgraph = %subgraph, "no free root");
            return false;
        }

        for split in splits {
            for wcc in split.all_subgraphs() {
                if !self.solve_subgraph(wcc) {
                    return false;
                }
            }
            self.chart.add_split(subgraph.clone(), split);
        }
        true
    }
}
