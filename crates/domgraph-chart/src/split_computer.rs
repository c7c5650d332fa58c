//! Computing the split induced by a free root.
//!
//! One depth-first search from the candidate root visits the root fragment,
//! then every component reachable through the fragment's dominance edges.
//! Each node outside the fragment remembers the dominance edge through which
//! its component was entered. If a component can also be entered from a
//! different hole, the candidate is not free: no placement of the fragment
//! would put the component below both holes.
//!
//! The search runs in O(n + m) for a subgraph with n nodes and m edges.

use std::collections::{HashMap, HashSet};

use domgraph_core::{DomEdge, DomGraph, EdgeKind, EdgeList, NodeId, Subgraph};
use indexmap::IndexMap;

use crate::split::Split;

/// Reusable split computation for one graph.
///
/// Scratch buffers survive between calls to avoid reallocating them for
/// every candidate root; results depend only on the arguments.
pub struct SplitComputer<'g> {
    graph: &'g DomGraph,
    root: NodeId,
    root_fragment: HashSet<NodeId>,
    /// Node outside the root fragment -> dominance edge its component was
    /// entered through.
    dom_edge_for_node: HashMap<NodeId, DomEdge>,
    /// Dominator -> (entering dominance edge -> component nodes).
    split_map: IndexMap<NodeId, IndexMap<DomEdge, Vec<NodeId>>>,
    visited: HashSet<NodeId>,
    /// (node, adjacent edges, next edge position)
    stack: Vec<(NodeId, EdgeList, usize)>,
}

impl<'g> SplitComputer<'g> {
    pub fn new(graph: &'g DomGraph) -> Self {
        SplitComputer {
            graph,
            root: NodeId(0),
            root_fragment: HashSet::new(),
            dom_edge_for_node: HashMap::new(),
            split_map: IndexMap::new(),
            visited: HashSet::new(),
            stack: Vec::new(),
        }
    }

    /// Computes the split of `subgraph` induced by `root`.
    ///
    /// `root` should have no incoming edges from inside `subgraph`. Returns
    /// `None` if `root` is not in `subgraph` or its fragment is not free.
    pub fn compute_split(&mut self, root: NodeId, subgraph: &Subgraph) -> Option<Split> {
        if !subgraph.contains(root) {
            return None;
        }

        self.root = root;
        self.root_fragment.clear();
        self.root_fragment.insert(root);
        self.root_fragment
            .extend(self.graph.children(root, Some(EdgeKind::Tree)));
        self.dom_edge_for_node.clear();
        self.split_map.clear();
        self.visited.clear();
        self.stack.clear();

        if !self.dfs(root, subgraph) {
            return None;
        }

        let mut split = Split::new(root);
        for (dominator, wccs) in self.split_map.drain(..) {
            for (_, nodes) in wccs {
                split.add_wcc(dominator, nodes.into_iter().collect());
            }
        }
        Some(split)
    }

    /// Returns `false` as soon as a component turns out to be reachable from
    /// two different holes of the root fragment.
    fn dfs(&mut self, start: NodeId, subgraph: &Subgraph) -> bool {
        self.enter(start, subgraph);

        while let Some((node, edges, pos)) = self.stack.last_mut() {
            let node = *node;
            let Some(edge) = edges.get(*pos).copied() else {
                self.stack.pop();
                continue;
            };
            *pos += 1;

            let neighbour = edge.opposite(node);
            if self.root_fragment.contains(&neighbour) && !self.root_fragment.contains(&node) {
                // A dominance edge from the root fragment into this
                // component. Never traversed; it must leave the root or the
                // hole the component was entered through.
                let entered_from = self.dom_edge_for_node.get(&node).map(|e| e.src);
                if neighbour != self.root && Some(neighbour) != entered_from {
                    return false;
                }
            } else if !self.visited.contains(&neighbour) {
                self.update_dom_edge(neighbour, node, edge.src, edge.tgt, edge.kind);
                self.enter(neighbour, subgraph);
            }
        }
        true
    }

    /// Marks `node` visited and schedules its edges. Nodes outside
    /// `subgraph` are ignored.
    fn enter(&mut self, node: NodeId, subgraph: &Subgraph) {
        if !subgraph.contains(node) {
            return;
        }
        self.visited.insert(node);
        if !self.root_fragment.contains(&node) {
            self.assign_to_wcc(node);
        }

        // Tree edges first, then dominance edges.
        let mut edges = self.graph.adjacent_edges(node, Some(EdgeKind::Tree));
        edges.extend(self.graph.adjacent_edges(node, Some(EdgeKind::Dominance)));
        self.stack.push((node, edges, 0));
    }

    fn update_dom_edge(&mut self, neighbour: NodeId, node: NodeId, src: NodeId, tgt: NodeId, kind: EdgeKind) {
        if kind.is_dominance() && src == node && self.root_fragment.contains(&src) {
            // Leaving the root fragment: this edge opens a new component.
            // Further edges from the same hole into the same component find
            // their target already visited.
            self.dom_edge_for_node.insert(tgt, DomEdge::new(src, tgt));
        } else if !self.root_fragment.contains(&neighbour) {
            if let Some(&inherited) = self.dom_edge_for_node.get(&node) {
                self.dom_edge_for_node.insert(neighbour, inherited);
            }
        }
    }

    fn assign_to_wcc(&mut self, node: NodeId) {
        let Some(&edge) = self.dom_edge_for_node.get(&node) else {
            return;
        };
        self.split_map
            .entry(edge.src)
            .or_default()
            .entry(edge)
            .or_default()
            .push(node);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domgraph_core::NodeKind;

    fn sub(nodes: &[NodeId]) -> Subgraph {
        nodes.iter().copied().collect()
    }

    /// `f(h1, h2)` and `g(h3)` above leaves `a`, `b`:
    /// `h1 -> a`, `h2 -> b`, `h3 -> a`.
    fn shared_leaf_graph() -> (DomGraph, [NodeId; 7]) {
        let mut g = DomGraph::new();
        let f = g.add_node("f", NodeKind::Labelled).unwrap();
        let h1 = g.add_node("h1", NodeKind::Unlabelled).unwrap();
        let h2 = g.add_node("h2", NodeKind::Unlabelled).unwrap();
        let gg = g.add_node("g", NodeKind::Labelled).unwrap();
        let h3 = g.add_node("h3", NodeKind::Unlabelled).unwrap();
        let a = g.add_node("a", NodeKind::Labelled).unwrap();
        let b = g.add_node("b", NodeKind::Labelled).unwrap();
        g.add_edge(f, h1, EdgeKind::Tree).unwrap();
        g.add_edge(f, h2, EdgeKind::Tree).unwrap();
        g.add_edge(gg, h3, EdgeKind::Tree).unwrap();
        g.add_edge(h1, a, EdgeKind::Dominance).unwrap();
        g.add_edge(h2, b, EdgeKind::Dominance).unwrap();
        g.add_edge(h3, a, EdgeKind::Dominance).unwrap();
        (g, [f, h1, h2, gg, h3, a, b])
    }

    #[test]
    fn split_assigns_components_to_holes() {
        let (g, [f, h1, h2, gg, h3, a, b]) = shared_leaf_graph();
        let all = g.all_nodes();
        let mut computer = SplitComputer::new(&g);

        let split = computer.compute_split(f, &all).unwrap();
        assert_eq!(split.root(), f);
        assert_eq!(split.wccs(h1), &[sub(&[gg, h3, a])]);
        assert_eq!(split.wccs(h2), &[sub(&[b])]);
        assert_eq!(split.component_count(), 2);
    }

    #[test]
    fn split_below_single_hole() {
        let (g, [f, h1, h2, gg, h3, a, b]) = shared_leaf_graph();
        let all = g.all_nodes();
        let mut computer = SplitComputer::new(&g);

        let split = computer.compute_split(gg, &all).unwrap();
        assert_eq!(split.wccs(h3), &[sub(&[f, h1, h2, a, b])]);
        assert_eq!(split.dominators().collect::<Vec<_>>(), vec![h3]);
    }

    #[test]
    fn root_with_component_under_two_holes_is_not_free() {
        // f(h1, h2) with h1 -> a and h2 -> a.
        let mut g = DomGraph::new();
        let f = g.add_node("f", NodeKind::Labelled).unwrap();
        let h1 = g.add_node("h1", NodeKind::Unlabelled).unwrap();
        let h2 = g.add_node("h2", NodeKind::Unlabelled).unwrap();
        let a = g.add_node("a", NodeKind::Labelled).unwrap();
        g.add_edge(f, h1, EdgeKind::Tree).unwrap();
        g.add_edge(f, h2, EdgeKind::Tree).unwrap();
        g.add_edge(h1, a, EdgeKind::Dominance).unwrap();
        g.add_edge(h2, a, EdgeKind::Dominance).unwrap();

        let mut computer = SplitComputer::new(&g);
        assert_eq!(computer.compute_split(f, &g.all_nodes()), None);
    }

    #[test]
    fn split_restricted_to_subgraph() {
        let (g, [f, h1, h2, _, _, a, b]) = shared_leaf_graph();
        let part = sub(&[f, h1, h2, a, b]);
        let mut computer = SplitComputer::new(&g);

        let split = computer.compute_split(f, &part).unwrap();
        assert_eq!(split.wccs(h1), &[sub(&[a])]);
        assert_eq!(split.wccs(h2), &[sub(&[b])]);
    }

    #[test]
    fn root_outside_subgraph_has_no_split() {
        let (g, [f, _, _, _, _, a, b]) = shared_leaf_graph();
        let mut computer = SplitComputer::new(&g);
        assert_eq!(computer.compute_split(f, &sub(&[a, b])), None);
    }

    #[test]
    fn single_fragment_split_is_empty() {
        let (g, [_, _, _, _, _, a, _]) = shared_leaf_graph();
        let mut computer = SplitComputer::new(&g);
        let split = computer.compute_split(a, &sub(&[a])).unwrap();
        assert_eq!(split.component_count(), 0);
    }

    #[test]
    fn computer_is_reusable() {
        let (g, [f, h1, _, gg, h3, a, _]) = shared_leaf_graph();
        let all = g.all_nodes();
        let mut computer = SplitComputer::new(&g);

        let first = computer.compute_split(f, &all).unwrap();
        let _ = computer.compute_split(gg, &all).unwrap();
        let again = computer.compute_split(f, &all).unwrap();
        assert_eq!(first, again);
        assert_eq!(again.wccs(h1), &[sub(&[gg, h3, a])]);
    }
}
