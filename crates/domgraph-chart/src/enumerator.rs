//! Lazy enumeration of the solved forms represented by a chart.
//!
//! A solved form is determined by choosing one split for every non-terminal
//! subgraph met while unfolding the chart from the top-level subgraphs. The
//! cursor records these choices in depth-first pre-order and advances them
//! like an odometer: the innermost choice that can still move is
//! incremented, every later choice is dropped and the unfolding resumes from
//! there with first splits. Earlier choices fix which subgraphs come later,
//! so each choice vector yields a distinct solved form.

use std::iter::FusedIterator;

use domgraph_core::{CoreError, DomEdge, DomGraph, NodeId, Subgraph};
use serde::{Deserialize, Serialize};

use crate::chart::Chart;

/// One solved form, as the dominance edges that replace the graph's own.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SolvedForm {
    edges: Vec<DomEdge>,
}

impl SolvedForm {
    pub fn edges(&self) -> &[DomEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.edges.len()
    }

    pub fn is_empty(&self) -> bool {
        self.edges.is_empty()
    }

    /// The solved form as a graph: `graph`'s tree edges plus these
    /// dominance edges.
    pub fn to_graph(&self, graph: &DomGraph) -> Result<DomGraph, CoreError> {
        graph.with_dominance_edges(&self.edges)
    }
}

#[derive(Debug, Clone, Copy)]
struct Choice {
    split_count: usize,
    index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CursorState {
    Fresh,
    Active,
    Done,
}

/// Odometer over the split choices of one chart.
#[derive(Debug, Clone)]
struct Cursor<'a> {
    chart: &'a Chart,
    graph: &'a DomGraph,
    choices: Vec<Choice>,
    state: CursorState,
}

impl<'a> Cursor<'a> {
    fn new(chart: &'a Chart, graph: &'a DomGraph) -> Self {
        Cursor {
            chart,
            graph,
            choices: Vec::new(),
            state: CursorState::Fresh,
        }
    }

    fn reset(&mut self) {
        self.choices.clear();
        self.state = CursorState::Fresh;
    }

    fn next_form(&mut self) -> Option<SolvedForm> {
        match self.state {
            CursorState::Fresh if self.chart.is_unsolvable() => {
                self.state = CursorState::Done;
                None
            }
            CursorState::Fresh => {
                self.state = CursorState::Active;
                Some(self.unfold())
            }
            CursorState::Active => {
                let Some(pos) = self
                    .choices
                    .iter()
                    .rposition(|c| c.index + 1 < c.split_count)
                else {
                    self.state = CursorState::Done;
                    return None;
                };
                self.choices.truncate(pos + 1);
                self.choices[pos].index += 1;
                Some(self.unfold())
            }
            CursorState::Done => None,
        }
    }

    /// Unfolds the chart under the recorded choices, extending them with
    /// first splits where they run out.
    fn unfold(&mut self) -> SolvedForm {
        let mut edges = Vec::new();
        let mut agenda: Vec<(Option<NodeId>, &'a Subgraph)> = self
            .chart
            .toplevel_subgraphs()
            .iter()
            .rev()
            .filter(|s| !s.is_empty())
            .map(|s| (None, s))
            .collect();
        let mut depth = 0;

        while let Some((dominator, subgraph)) = agenda.pop() {
            let splits = match self.chart.splits_for(subgraph) {
                Ok(splits) if !splits.is_empty() => splits,
                _ => {
                    // Terminal: a single fragment goes directly below its
                    // dominator.
                    if let (Some(dom), Some(&root)) =
                        (dominator, self.graph.roots_in(subgraph).first())
                    {
                        edges.push(DomEdge::new(dom, root));
                    }
                    continue;
                }
            };

            if depth == self.choices.len() {
                self.choices.push(Choice {
                    split_count: splits.len(),
                    index: 0,
                });
            }
            let split = &splits[self.choices[depth].index];
            depth += 1;

            if let Some(dom) = dominator {
                edges.push(DomEdge::new(dom, split.root()));
            }
            let components: Vec<_> = split.components().collect();
            for (dom, component) in components.into_iter().rev() {
                agenda.push((Some(dom), component));
            }
        }

        SolvedForm { edges }
    }
}

/// Restartable iterator over the solved forms of a solved chart.
///
/// Yields exactly [`Chart::count_solved_forms`] distinct solved forms when
/// the chart was filled by a solve of `graph`, and nothing when that solve
/// failed.
#[derive(Debug, Clone)]
pub struct SolvedFormIterator<'a> {
    cursor: Cursor<'a>,
    /// Independent cursor feeding `cache` for random access.
    cache_cursor: Cursor<'a>,
    cache: Vec<SolvedForm>,
}

impl<'a> SolvedFormIterator<'a> {
    pub fn new(chart: &'a Chart, graph: &'a DomGraph) -> Self {
        SolvedFormIterator {
            cursor: Cursor::new(chart, graph),
            cache_cursor: Cursor::new(chart, graph),
            cache: Vec::new(),
        }
    }

    /// Rewinds to the first solved form.
    pub fn restart(&mut self) {
        self.cursor.reset();
    }

    /// The `index`-th solved form in enumeration order, or `None` past the
    /// end. Does not move the iterator itself.
    pub fn solved_form(&mut self, index: usize) -> Option<&SolvedForm> {
        while self.cache.len() <= index {
            let form = self.cache_cursor.next_form()?;
            self.cache.push(form);
        }
        self.cache.get(index)
    }

    pub fn chart(&self) -> &'a Chart {
        self.cursor.chart
    }
}

impl Iterator for SolvedFormIterator<'_> {
    type Item = SolvedForm;

    fn next(&mut self) -> Option<SolvedForm> {
        self.cursor.next_form()
    }
}

impl FusedIterator for SolvedFormIterator<'_> {}
