//! DomGraph: the dominance graph container.
//!
//! [`DomGraph`] stores nodes (labelled nodes and holes) and two kinds of
//! edges in a single petgraph `StableGraph`. Tree edges build fragments
//! (elementary trees); dominance edges constrain how fragments may be stacked
//! on top of each other.
//!
//! # Terminology
//!
//! - A **root** is a node without incoming tree edges.
//! - A **leaf** is a node without outgoing tree edges.
//! - A **hole** is an unlabelled node.
//! - A **fragment** is a maximal set of nodes connected by tree edges.
//! - A **subgraph** is any set of nodes, see [`Subgraph`].
//!
//! All mutation happens during construction (`add_node`, `add_edge`). Every
//! query below is read-only; the graph-class predicates live in
//! [`crate::classes`] and compactification in [`crate::compact`].

use std::collections::{HashMap, HashSet, VecDeque};

use petgraph::stable_graph::StableGraph;
use petgraph::visit::EdgeRef;
use petgraph::{Directed, Direction};
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::edge::{DomEdge, EdgeKind};
use crate::error::CoreError;
use crate::id::{EdgeId, NodeId};
use crate::node::{NodeData, NodeKind};
use crate::subgraph::Subgraph;

/// Adjacency lists returned by the edge queries. Most nodes of a dominance
/// graph have very few incident edges.
pub type EdgeList = SmallVec<[GraphEdge; 4]>;

/// One edge of a [`DomGraph`] together with its true orientation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge {
    pub id: EdgeId,
    pub src: NodeId,
    pub tgt: NodeId,
    pub kind: EdgeKind,
}

impl GraphEdge {
    /// Returns the endpoint of this edge that is not `node`.
    pub fn opposite(&self, node: NodeId) -> NodeId {
        if self.src == node {
            self.tgt
        } else {
            self.src
        }
    }
}

/// A dominance graph.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomGraph {
    pub(crate) graph: StableGraph<NodeData, EdgeKind, Directed, u32>,
    /// Node name -> NodeId, for codecs.
    pub(crate) names: HashMap<String, NodeId>,
}

impl DomGraph {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Construction
    // -----------------------------------------------------------------------

    /// Adds a node with the given name and kind.
    ///
    /// Errors with [`CoreError::DuplicateNode`] if the name is taken.
    pub fn add_node(&mut self, name: impl Into<String>, kind: NodeKind) -> Result<NodeId, CoreError> {
        let name = name.into();
        if self.names.contains_key(&name) {
            return Err(CoreError::DuplicateNode { name });
        }
        let idx = self.graph.add_node(NodeData::new(name.clone(), kind));
        let id = NodeId::from(idx);
        self.names.insert(name, id);
        Ok(id)
    }

    /// Adds an edge of the given kind from `src` to `tgt`.
    ///
    /// Both nodes must exist, otherwise [`CoreError::DanglingEdge`] names the
    /// missing endpoint.
    pub fn add_edge(&mut self, src: NodeId, tgt: NodeId, kind: EdgeKind) -> Result<EdgeId, CoreError> {
        for id in [src, tgt] {
            if !self.contains_node(id) {
                return Err(CoreError::DanglingEdge { id });
            }
        }
        let idx = self.graph.add_edge(src.into(), tgt.into(), kind);
        Ok(EdgeId::from(idx))
    }

    /// Adds an edge between two nodes given by name.
    pub fn add_edge_by_name(&mut self, src: &str, tgt: &str, kind: EdgeKind) -> Result<EdgeId, CoreError> {
        let src_id = self.require_name(src)?;
        let tgt_id = self.require_name(tgt)?;
        self.add_edge(src_id, tgt_id, kind)
    }

    fn require_name(&self, name: &str) -> Result<NodeId, CoreError> {
        self.node_id(name).ok_or_else(|| CoreError::UnknownNode {
            name: name.to_string(),
        })
    }

    // -----------------------------------------------------------------------
    // Node accessors
    // -----------------------------------------------------------------------

    pub fn contains_node(&self, id: NodeId) -> bool {
        self.graph.contains_node(id.into())
    }

    /// Looks up a node by name.
    pub fn node_id(&self, name: &str) -> Option<NodeId> {
        self.names.get(name).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&NodeData> {
        self.graph.node_weight(id.into())
    }

    /// Returns the node's data or [`CoreError::NodeNotFound`].
    pub fn require_node(&self, id: NodeId) -> Result<&NodeData, CoreError> {
        self.node(id).ok_or(CoreError::NodeNotFound { id })
    }

    pub fn name(&self, id: NodeId) -> Option<&str> {
        self.node(id).map(|n| n.name.as_str())
    }

    pub fn kind(&self, id: NodeId) -> Option<NodeKind> {
        self.node(id).map(|n| n.kind)
    }

    /// Returns `true` if `id` is an unlabelled node.
    pub fn is_hole(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Unlabelled)
    }

    pub fn is_labelled(&self, id: NodeId) -> bool {
        self.kind(id) == Some(NodeKind::Labelled)
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// All nodes of the graph, in ascending id order.
    pub fn all_nodes(&self) -> Subgraph {
        self.graph.node_indices().map(NodeId::from).collect()
    }

    // -----------------------------------------------------------------------
    // Edge accessors
    // -----------------------------------------------------------------------

    fn collect_edges(&self, node: NodeId, dir: Direction, kind: Option<EdgeKind>) -> EdgeList {
        let mut edges: EdgeList = self
            .graph
            .edges_directed(node.into(), dir)
            .filter(|e| kind.map_or(true, |k| *e.weight() == k))
            .filter_map(|e| {
                let (src, tgt) = self.graph.edge_endpoints(e.id())?;
                Some(GraphEdge {
                    id: EdgeId::from(e.id()),
                    src: NodeId::from(src),
                    tgt: NodeId::from(tgt),
                    kind: *e.weight(),
                })
            })
            .collect();
        // Insertion order is the surface order of tree children.
        edges.sort_by_key(|e| e.id.0);
        edges
    }

    /// Incoming edges of `node`, restricted to `kind` unless `None`.
    pub fn in_edges(&self, node: NodeId, kind: Option<EdgeKind>) -> EdgeList {
        self.collect_edges(node, Direction::Incoming, kind)
    }

    /// Outgoing edges of `node`, restricted to `kind` unless `None`.
    pub fn out_edges(&self, node: NodeId, kind: Option<EdgeKind>) -> EdgeList {
        self.collect_edges(node, Direction::Outgoing, kind)
    }

    /// Incoming followed by outgoing edges of `node`.
    pub fn adjacent_edges(&self, node: NodeId, kind: Option<EdgeKind>) -> EdgeList {
        let mut edges = self.in_edges(node, kind);
        edges.extend(self.out_edges(node, kind));
        edges
    }

    pub fn parents(&self, node: NodeId, kind: Option<EdgeKind>) -> SmallVec<[NodeId; 4]> {
        self.in_edges(node, kind).iter().map(|e| e.src).collect()
    }

    /// Children of `node`, tree children in surface order.
    pub fn children(&self, node: NodeId, kind: Option<EdgeKind>) -> SmallVec<[NodeId; 4]> {
        self.out_edges(node, kind).iter().map(|e| e.tgt).collect()
    }

    pub fn in_degree(&self, node: NodeId, kind: Option<EdgeKind>) -> usize {
        self.graph
            .edges_directed(node.into(), Direction::Incoming)
            .filter(|e| kind.map_or(true, |k| *e.weight() == k))
            .count()
    }

    pub fn out_degree(&self, node: NodeId, kind: Option<EdgeKind>) -> usize {
        self.graph
            .edges_directed(node.into(), Direction::Outgoing)
            .filter(|e| kind.map_or(true, |k| *e.weight() == k))
            .count()
    }

    /// Counts the incoming edges of `node` whose source lies in `subgraph`.
    pub fn in_degree_within(&self, node: NodeId, kind: Option<EdgeKind>, subgraph: &Subgraph) -> usize {
        self.in_edges(node, kind)
            .iter()
            .filter(|e| subgraph.contains(e.src))
            .count()
    }

    /// All dominance edges of the graph, sorted.
    pub fn dominance_edges(&self) -> Vec<DomEdge> {
        let mut edges: Vec<DomEdge> = self
            .graph
            .edge_indices()
            .filter(|&e| self.graph[e] == EdgeKind::Dominance)
            .filter_map(|e| self.graph.edge_endpoints(e))
            .map(|(src, tgt)| DomEdge::new(src.into(), tgt.into()))
            .collect();
        edges.sort();
        edges
    }

    /// Returns a copy of this graph whose dominance edges are replaced by
    /// `edges`. The graph itself is not modified.
    pub fn with_dominance_edges(&self, edges: &[DomEdge]) -> Result<DomGraph, CoreError> {
        let mut ret = self.clone();
        let dominance: Vec<_> = ret
            .graph
            .edge_indices()
            .filter(|&e| ret.graph[e] == EdgeKind::Dominance)
            .collect();
        for e in dominance {
            ret.graph.remove_edge(e);
        }
        for edge in edges {
            ret.add_edge(edge.src, edge.tgt, EdgeKind::Dominance)?;
        }
        Ok(ret)
    }

    // -----------------------------------------------------------------------
    // Fragments, roots and holes
    // -----------------------------------------------------------------------

    /// Returns `true` if `node` has no incoming tree edges.
    pub fn is_root(&self, node: NodeId) -> bool {
        self.in_degree(node, Some(EdgeKind::Tree)) == 0
    }

    /// Returns `true` if `node` has no outgoing tree edges. Holes are leaves
    /// in every weakly normal graph.
    pub fn is_leaf(&self, node: NodeId) -> bool {
        self.out_degree(node, Some(EdgeKind::Tree)) == 0
    }

    /// All roots of the graph.
    pub fn all_roots(&self) -> Subgraph {
        self.graph
            .node_indices()
            .map(NodeId::from)
            .filter(|&n| self.is_root(n))
            .collect()
    }

    /// The roots among the nodes of `subgraph`, ascending.
    pub fn roots_in(&self, subgraph: &Subgraph) -> Vec<NodeId> {
        subgraph.iter().filter(|&n| self.is_root(n)).collect()
    }

    /// Follows tree edges upwards to the root of `node`'s fragment. Returns
    /// `None` if the walk runs into a tree cycle.
    pub fn root_of(&self, node: NodeId) -> Option<NodeId> {
        let mut visited = HashSet::new();
        let mut current = node;
        loop {
            if !visited.insert(current) {
                return None;
            }
            match self.parents(current, Some(EdgeKind::Tree)).first() {
                Some(&parent) => current = parent,
                None => return Some(current),
            }
        }
    }

    /// The fragment of `node`: all nodes connected to it via tree edges.
    pub fn fragment_of(&self, node: NodeId) -> Subgraph {
        let mut fragment = Subgraph::new();
        let mut stack = vec![node];
        while let Some(current) = stack.pop() {
            if !fragment.insert(current) {
                continue;
            }
            for edge in self.adjacent_edges(current, Some(EdgeKind::Tree)) {
                let neighbour = edge.opposite(current);
                if !fragment.contains(neighbour) {
                    stack.push(neighbour);
                }
            }
        }
        fragment
    }

    /// The holes among `nodes`.
    pub fn holes_of(&self, nodes: &Subgraph) -> Vec<NodeId> {
        nodes.iter().filter(|&n| self.is_hole(n)).collect()
    }

    /// Holes of `node`'s fragment without any outgoing edges.
    pub fn open_holes(&self, node: NodeId) -> Vec<NodeId> {
        self.holes_of(&self.fragment_of(node))
            .into_iter()
            .filter(|&h| self.out_degree(h, None) == 0)
            .collect()
    }

    // -----------------------------------------------------------------------
    // Elementary graph algorithms
    // -----------------------------------------------------------------------

    /// Returns `true` if there is a directed path from `upper` to `lower`
    /// over edges of any kind.
    pub fn reachable(&self, upper: NodeId, lower: NodeId) -> bool {
        // In-degrees are typically smaller than out-degrees, so search
        // backwards from `lower`.
        let mut visited = HashSet::new();
        let mut stack = vec![lower];
        while let Some(node) = stack.pop() {
            if node == upper {
                return true;
            }
            if !visited.insert(node) {
                continue;
            }
            stack.extend(self.parents(node, None));
        }
        false
    }

    /// Returns `true` if there is a hypernormal path between `source` and
    /// `target` that avoids every node in `avoid`.
    ///
    /// A hypernormal path is an undirected path that never enters a hole
    /// upwards through one dominance edge and leaves it downwards through
    /// another.
    pub fn hypernormally_reachable(&self, source: NodeId, target: NodeId, avoid: &HashSet<NodeId>) -> bool {
        // Depth-first over simple paths; each node is entered at most once.
        let mut visited = avoid.clone();
        // (node, entered through an upward dominance edge, edges, next edge)
        let mut stack: Vec<(NodeId, bool, EdgeList, usize)> = Vec::new();

        if visited.contains(&source) {
            return false;
        }
        if source == target {
            return true;
        }
        visited.insert(source);
        stack.push((source, false, self.adjacent_edges(source, None), 0));

        while let Some((node, came_up_dom, edges, pos)) = stack.last_mut() {
            let Some(edge) = edges.get(*pos).copied() else {
                stack.pop();
                continue;
            };
            *pos += 1;
            let (node, came_up_dom) = (*node, *came_up_dom);

            let is_dom = edge.kind.is_dominance();
            let is_out = edge.src == node;
            if is_dom && is_out && came_up_dom {
                continue;
            }
            let neighbour = edge.opposite(node);
            if visited.contains(&neighbour) {
                continue;
            }
            if neighbour == target {
                return true;
            }
            visited.insert(neighbour);
            let neighbour_edges = self.adjacent_edges(neighbour, None);
            stack.push((neighbour, is_dom && !is_out, neighbour_edges, 0));
        }
        false
    }

    /// The weakly connected components of `subgraph`, i.e. the maximal
    /// subsets connected via edges of any kind and direction without leaving
    /// `subgraph`. Components are ordered by their smallest node.
    pub fn weakly_connected_components(&self, subgraph: &Subgraph) -> Vec<Subgraph> {
        let mut visited: HashSet<NodeId> = HashSet::new();
        let mut components = Vec::new();

        for start in subgraph.iter() {
            if visited.contains(&start) {
                continue;
            }
            let mut component = Vec::new();
            let mut queue = VecDeque::from([start]);
            visited.insert(start);
            while let Some(node) = queue.pop_front() {
                component.push(node);
                for edge in self.adjacent_edges(node, None) {
                    let neighbour = edge.opposite(node);
                    if subgraph.contains(neighbour) && visited.insert(neighbour) {
                        queue.push_back(neighbour);
                    }
                }
            }
            components.push(component.into_iter().collect());
        }
        components
    }

    /// The weakly connected components of the whole graph.
    pub fn wccs(&self) -> Vec<Subgraph> {
        self.weakly_connected_components(&self.all_nodes())
    }

    /// Returns `true` if the nodes of `subgraph` (or of the whole graph)
    /// contain a directed cycle over edges of `kind` (or of any kind).
    pub fn has_cycle(&self, subgraph: Option<&Subgraph>, kind: Option<EdgeKind>) -> bool {
        #[derive(Clone, Copy, PartialEq)]
        enum Mark {
            Active,
            Done,
        }

        let nodes = match subgraph {
            Some(s) => s.clone(),
            None => self.all_nodes(),
        };
        let mut marks: HashMap<NodeId, Mark> = HashMap::new();

        for start in nodes.iter() {
            if marks.contains_key(&start) {
                continue;
            }
            // (node, children, next child position)
            let mut stack: Vec<(NodeId, SmallVec<[NodeId; 4]>, usize)> = Vec::new();
            marks.insert(start, Mark::Active);
            stack.push((start, self.children(start, kind), 0));

            while let Some((node, children, pos)) = stack.last_mut() {
                if *pos == children.len() {
                    marks.insert(*node, Mark::Done);
                    stack.pop();
                    continue;
                }
                let child = children[*pos];
                *pos += 1;
                if !nodes.contains(child) {
                    continue;
                }
                match marks.get(&child) {
                    Some(Mark::Active) => return true,
                    Some(Mark::Done) => {}
                    None => {
                        marks.insert(child, Mark::Active);
                        let grandchildren = self.children(child, kind);
                        stack.push((child, grandchildren, 0));
                    }
                }
            }
        }
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Builds `f(h1, h2)` with `h1 -> a`, `h2 -> b`.
    fn two_hole_graph() -> (DomGraph, [NodeId; 5]) {
        let mut g = DomGraph::new();
        let f = g.add_node("f", NodeKind::Labelled).unwrap();
        let h1 = g.add_node("h1", NodeKind::Unlabelled).unwrap();
        let h2 = g.add_node("h2", NodeKind::Unlabelled).unwrap();
        let a = g.add_node("a", NodeKind::Labelled).unwrap();
        let b = g.add_node("b", NodeKind::Labelled).unwrap();
        g.add_edge(f, h1, EdgeKind::Tree).unwrap();
        g.add_edge(f, h2, EdgeKind::Tree).unwrap();
        g.add_edge(h1, a, EdgeKind::Dominance).unwrap();
        g.add_edge(h2, b, EdgeKind::Dominance).unwrap();
        (g, [f, h1, h2, a, b])
    }

    #[test]
    fn add_node_rejects_duplicate_name() {
        let mut g = DomGraph::new();
        g.add_node("x", NodeKind::Labelled).unwrap();
        match g.add_node("x", NodeKind::Unlabelled) {
            Err(CoreError::DuplicateNode { name }) => assert_eq!(name, "x"),
            other => panic!("expected DuplicateNode, got {:?}", other),
        }
        assert_eq!(g.node_count(), 1);
    }

    #[test]
    fn add_edge_rejects_missing_endpoint() {
        let mut g = DomGraph::new();
        let x = g.add_node("x", NodeKind::Labelled).unwrap();
        match g.add_edge(x, NodeId(17), EdgeKind::Tree) {
            Err(CoreError::DanglingEdge { id }) => assert_eq!(id, NodeId(17)),
            other => panic!("expected DanglingEdge, got {:?}", other),
        }
        assert_eq!(g.edge_count(), 0);
    }

    #[test]
    fn add_edge_by_name_resolves_names() {
        let mut g = DomGraph::new();
        g.add_node("x", NodeKind::Labelled).unwrap();
        g.add_node("y", NodeKind::Unlabelled).unwrap();
        g.add_edge_by_name("x", "y", EdgeKind::Tree).unwrap();
        assert!(matches!(
            g.add_edge_by_name("x", "z", EdgeKind::Tree),
            Err(CoreError::UnknownNode { .. })
        ));
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn roots_holes_and_fragments() {
        let (g, [f, h1, h2, a, b]) = two_hole_graph();

        assert_eq!(g.all_roots().as_slice(), &[f, a, b]);
        assert_eq!(g.fragment_of(h2).as_slice(), &[f, h1, h2]);
        assert_eq!(g.holes_of(&g.fragment_of(f)), vec![h1, h2]);
        assert_eq!(g.root_of(h1), Some(f));
        assert_eq!(g.root_of(a), Some(a));
        assert!(g.is_leaf(h1));
        assert!(!g.is_leaf(f));
        assert!(g.open_holes(f).is_empty());
    }

    #[test]
    fn tree_children_keep_insertion_order() {
        let (g, [f, h1, h2, _, _]) = two_hole_graph();
        assert_eq!(g.children(f, Some(EdgeKind::Tree)).as_slice(), &[h1, h2]);
    }

    #[test]
    fn degrees_by_kind_and_within_subgraph() {
        let (g, [f, h1, _, a, b]) = two_hole_graph();
        assert_eq!(g.out_degree(f, Some(EdgeKind::Tree)), 2);
        assert_eq!(g.out_degree(f, Some(EdgeKind::Dominance)), 0);
        assert_eq!(g.in_degree(a, None), 1);

        let without_hole: Subgraph = [f, a, b].into_iter().collect();
        assert_eq!(g.in_degree_within(a, None, &without_hole), 0);
        let with_hole: Subgraph = [h1, a].into_iter().collect();
        assert_eq!(g.in_degree_within(a, Some(EdgeKind::Dominance), &with_hole), 1);
    }

    #[test]
    fn reachability_follows_edge_direction() {
        let (g, [f, h1, h2, a, b]) = two_hole_graph();
        assert!(g.reachable(f, a));
        assert!(g.reachable(h2, b));
        assert!(!g.reachable(a, f));
        assert!(!g.reachable(h1, b));
        assert!(g.reachable(a, a));
    }

    #[test]
    fn hypernormal_paths_do_not_turn_at_holes() {
        let mut g = DomGraph::new();
        let f = g.add_node("f", NodeKind::Labelled).unwrap();
        let h = g.add_node("h", NodeKind::Unlabelled).unwrap();
        let a = g.add_node("a", NodeKind::Labelled).unwrap();
        let b = g.add_node("b", NodeKind::Labelled).unwrap();
        g.add_edge(f, h, EdgeKind::Tree).unwrap();
        g.add_edge(h, a, EdgeKind::Dominance).unwrap();
        g.add_edge(h, b, EdgeKind::Dominance).unwrap();

        let none = HashSet::new();
        assert!(g.hypernormally_reachable(f, a, &none));
        assert!(g.hypernormally_reachable(a, f, &none));
        // a -> h (up) -> b (down) turns at the hole.
        assert!(!g.hypernormally_reachable(a, b, &none));

        let avoid_h: HashSet<NodeId> = [h].into_iter().collect();
        assert!(!g.hypernormally_reachable(f, a, &avoid_h));
    }

    #[test]
    fn wccs_respect_subgraph_boundary() {
        let (g, [_, h1, h2, a, b]) = two_hole_graph();
        assert_eq!(g.wccs().len(), 1);

        let without_root_fragment: Subgraph = [a, b].into_iter().collect();
        let comps = g.weakly_connected_components(&without_root_fragment);
        assert_eq!(comps.len(), 2);
        assert_eq!(comps[0].as_slice(), &[a]);
        assert_eq!(comps[1].as_slice(), &[b]);

        let with_holes: Subgraph = [h1, h2, a, b].into_iter().collect();
        assert_eq!(g.weakly_connected_components(&with_holes).len(), 2);
    }

    #[test]
    fn cycle_detection_by_kind() {
        let mut g = DomGraph::new();
        let x = g.add_node("x", NodeKind::Labelled).unwrap();
        let y = g.add_node("y", NodeKind::Labelled).unwrap();
        g.add_edge(x, y, EdgeKind::Tree).unwrap();
        assert!(!g.has_cycle(None, None));

        g.add_edge(y, x, EdgeKind::Dominance).unwrap();
        assert!(g.has_cycle(None, None));
        assert!(!g.has_cycle(None, Some(EdgeKind::Tree)));

        let only_x: Subgraph = [x].into_iter().collect();
        assert!(!g.has_cycle(Some(&only_x), None));
    }

    #[test]
    fn with_dominance_edges_replaces_only_dominance() {
        let (g, [f, h1, h2, a, b]) = two_hole_graph();
        let swapped = g
            .with_dominance_edges(&[DomEdge::new(h1, b), DomEdge::new(h2, a)])
            .unwrap();

        assert_eq!(
            swapped.dominance_edges(),
            vec![DomEdge::new(h1, b), DomEdge::new(h2, a)]
        );
        assert_eq!(swapped.children(f, Some(EdgeKind::Tree)).len(), 2);
        // Original untouched.
        assert_eq!(
            g.dominance_edges(),
            vec![DomEdge::new(h1, a), DomEdge::new(h2, b)]
        );
    }

    #[test]
    fn serde_roundtrip_preserves_structure() {
        let (g, [f, _, _, a, _]) = two_hole_graph();
        let json = serde_json::to_string(&g).unwrap();
        let back: DomGraph = serde_json::from_str(&json).unwrap();

        assert_eq!(back.node_count(), g.node_count());
        assert_eq!(back.edge_count(), g.edge_count());
        assert_eq!(back.node_id("a"), Some(a));
        assert!(back.reachable(f, a));
    }
}
