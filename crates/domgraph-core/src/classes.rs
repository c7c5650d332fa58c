//! Graph-class predicates.
//!
//! Each class comes as a `check_*` method returning the first violation found
//! and an `is_*` convenience wrapper. The classes build on each other: every
//! class except well-formedness and simple solved forms presupposes weak
//! normality, and hypernormal connectedness presupposes normality.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::edge::EdgeKind;
use crate::graph::{DomGraph, EdgeList};
use crate::id::NodeId;

/// Why a graph fails to belong to some class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ClassViolation {
    #[error("hole {node} has outgoing tree edges")]
    HoleNotLeaf { node: NodeId },

    #[error("node {node} has {parents} incoming tree edges")]
    MultipleTreeParents { node: NodeId, parents: usize },

    #[error("tree edges form a cycle")]
    TreeCycle,

    #[error("dominance edge {src} -> {tgt} does not point into a root")]
    DominanceIntoNonRoot { src: NodeId, tgt: NodeId },

    #[error("dominance edge {src} -> {tgt} does not start at a hole")]
    DominanceFromLabelled { src: NodeId, tgt: NodeId },

    #[error("dominance edge {src} -> {tgt} starts at an inner node")]
    DominanceFromInnerNode { src: NodeId, tgt: NodeId },

    #[error("labelled node {node} has an incoming tree edge")]
    LabelledNonRoot { node: NodeId },

    #[error("hole {node} has no outgoing dominance edge")]
    OpenHole { node: NodeId },

    #[error("no hypernormal path between {from} and {to}")]
    NotHypernormallyConnected { from: NodeId, to: NodeId },

    #[error("labelled leaf {node} is the source of an edge")]
    LabelledLeafWithEdge { node: NodeId },

    #[error("graph contains a directed cycle")]
    Cycle,

    #[error("node {node} has {in_degree} incoming edges")]
    MultipleParents { node: NodeId, in_degree: usize },

    #[error("node {node} has {out_degree} outgoing dominance edges")]
    MultipleDominanceChildren { node: NodeId, out_degree: usize },
}

impl DomGraph {
    /// Holes are leaves, no node has two tree parents, tree edges are
    /// acyclic and dominance edges point into roots.
    pub fn check_weakly_normal(&self) -> Result<(), ClassViolation> {
        for node in self.all_nodes().iter() {
            if self.is_hole(node) && !self.is_leaf(node) {
                return Err(ClassViolation::HoleNotLeaf { node });
            }
            let parents = self.in_degree(node, Some(EdgeKind::Tree));
            if parents > 1 {
                return Err(ClassViolation::MultipleTreeParents { node, parents });
            }
        }
        if self.has_cycle(None, Some(EdgeKind::Tree)) {
            return Err(ClassViolation::TreeCycle);
        }
        for edge in self.dominance_edges() {
            if !self.is_root(edge.tgt) {
                return Err(ClassViolation::DominanceIntoNonRoot {
                    src: edge.src,
                    tgt: edge.tgt,
                });
            }
        }
        Ok(())
    }

    pub fn is_weakly_normal(&self) -> bool {
        self.check_weakly_normal().is_ok()
    }

    /// Weakly normal, and every dominance edge starts at a hole.
    pub fn check_normal(&self) -> Result<(), ClassViolation> {
        self.check_weakly_normal()?;
        for edge in self.dominance_edges() {
            if !self.is_hole(edge.src) {
                return Err(ClassViolation::DominanceFromLabelled {
                    src: edge.src,
                    tgt: edge.tgt,
                });
            }
        }
        Ok(())
    }

    pub fn is_normal(&self) -> bool {
        self.check_normal().is_ok()
    }

    /// Weakly normal, and every fragment consists of its root plus holes.
    pub fn check_compact(&self) -> Result<(), ClassViolation> {
        self.check_weakly_normal()?;
        for node in self.all_nodes().iter() {
            if self.is_labelled(node) && !self.is_root(node) {
                return Err(ClassViolation::LabelledNonRoot { node });
            }
        }
        Ok(())
    }

    pub fn is_compact(&self) -> bool {
        self.check_compact().is_ok()
    }

    /// Weakly normal, and dominance edges only leave holes or roots.
    pub fn check_compactifiable(&self) -> Result<(), ClassViolation> {
        self.check_weakly_normal()?;
        for edge in self.dominance_edges() {
            if !self.is_hole(edge.src) && !self.is_root(edge.src) {
                return Err(ClassViolation::DominanceFromInnerNode {
                    src: edge.src,
                    tgt: edge.tgt,
                });
            }
        }
        Ok(())
    }

    pub fn is_compactifiable(&self) -> bool {
        self.check_compactifiable().is_ok()
    }

    /// Weakly normal, and every hole has an outgoing dominance edge.
    pub fn check_leaf_labelled(&self) -> Result<(), ClassViolation> {
        self.check_weakly_normal()?;
        for node in self.all_nodes().iter() {
            if self.is_hole(node) && self.out_degree(node, Some(EdgeKind::Dominance)) == 0 {
                return Err(ClassViolation::OpenHole { node });
            }
        }
        Ok(())
    }

    pub fn is_leaf_labelled(&self) -> bool {
        self.check_leaf_labelled().is_ok()
    }

    /// Normal, and every pair of nodes is connected by a hypernormal path.
    ///
    /// Quadratic in the number of nodes; see
    /// [`is_hypernormally_connected_fast`](Self::is_hypernormally_connected_fast).
    pub fn check_hypernormally_connected(&self) -> Result<(), ClassViolation> {
        self.check_normal()?;
        let nodes = self.all_nodes();
        let none = HashSet::new();
        // Hypernormal paths read the same backwards, so unordered pairs do.
        for (i, from) in nodes.iter().enumerate() {
            for to in nodes.iter().skip(i + 1) {
                if !self.hypernormally_reachable(from, to, &none) {
                    return Err(ClassViolation::NotHypernormallyConnected { from, to });
                }
            }
        }
        Ok(())
    }

    pub fn is_hypernormally_connected(&self) -> bool {
        self.check_hypernormally_connected().is_ok()
    }

    /// Linear-time hypernormal connectedness test.
    ///
    /// A single depth-first search that uses at most one outgoing dominance
    /// edge per hole. The answer agrees with
    /// [`is_hypernormally_connected`](Self::is_hypernormally_connected) on
    /// solvable graphs and may be wrong otherwise.
    pub fn is_hypernormally_connected_fast(&self) -> bool {
        if !self.is_normal() {
            return false;
        }
        let nodes = self.all_nodes();
        let Some(start) = nodes.iter().next() else {
            return true;
        };

        struct Frame {
            node: NodeId,
            came_via_dom: bool,
            edges: EdgeList,
            pos: usize,
            used_out_dom: bool,
        }

        let mut visited: HashSet<NodeId> = HashSet::from([start]);
        let mut stack = vec![Frame {
            node: start,
            came_via_dom: false,
            edges: self.adjacent_edges(start, None),
            pos: 0,
            used_out_dom: false,
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(edge) = frame.edges.get(frame.pos).copied() else {
                stack.pop();
                continue;
            };
            frame.pos += 1;

            let is_dom = edge.kind.is_dominance();
            if is_dom && edge.src == frame.node {
                if frame.came_via_dom || frame.used_out_dom {
                    continue;
                }
                frame.used_out_dom = true;
            }

            let neighbour = edge.opposite(frame.node);
            if visited.insert(neighbour) {
                stack.push(Frame {
                    node: neighbour,
                    came_via_dom: is_dom,
                    edges: self.adjacent_edges(neighbour, None),
                    pos: 0,
                    used_out_dom: false,
                });
            }
        }

        visited.len() == nodes.len()
    }

    /// No labelled leaf is the source of any edge. Only meaningful for
    /// compact graphs.
    pub fn check_well_formed(&self) -> Result<(), ClassViolation> {
        for node in self.all_nodes().iter() {
            if self.is_labelled(node) && self.is_leaf(node) && self.out_degree(node, None) > 0 {
                return Err(ClassViolation::LabelledLeafWithEdge { node });
            }
        }
        Ok(())
    }

    pub fn is_well_formed(&self) -> bool {
        self.check_well_formed().is_ok()
    }

    /// Acyclic, every node has at most one parent and at most one outgoing
    /// dominance edge.
    pub fn check_simple_solved_form(&self) -> Result<(), ClassViolation> {
        if self.has_cycle(None, None) {
            return Err(ClassViolation::Cycle);
        }
        for node in self.all_nodes().iter() {
            let in_degree = self.in_degree(node, None);
            if in_degree > 1 {
                return Err(ClassViolation::MultipleParents { node, in_degree });
            }
            let out_degree = self.out_degree(node, Some(EdgeKind::Dominance));
            if out_degree > 1 {
                return Err(ClassViolation::MultipleDominanceChildren { node, out_degree });
            }
        }
        Ok(())
    }

    pub fn is_simple_solved_form(&self) -> bool {
        self.check_simple_solved_form().is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::NodeKind;

    fn node(g: &mut DomGraph, name: &str, kind: NodeKind) -> NodeId {
        g.add_node(name, kind).unwrap()
    }

    /// `f(h1, h2)`, `g(h3)`, `a`, `b` with `h1 -> g`, `h3 -> a`, `h2 -> b`.
    fn normal_graph() -> DomGraph {
        let mut g = DomGraph::new();
        let f = node(&mut g, "f", NodeKind::Labelled);
        let h1 = node(&mut g, "h1", NodeKind::Unlabelled);
        let h2 = node(&mut g, "h2", NodeKind::Unlabelled);
        let gg = node(&mut g, "g", NodeKind::Labelled);
        let h3 = node(&mut g, "h3", NodeKind::Unlabelled);
        let a = node(&mut g, "a", NodeKind::Labelled);
        let b = node(&mut g, "b", NodeKind::Labelled);
        g.add_edge(f, h1, EdgeKind::Tree).unwrap();
        g.add_edge(f, h2, EdgeKind::Tree).unwrap();
        g.add_edge(gg, h3, EdgeKind::Tree).unwrap();
        g.add_edge(h1, gg, EdgeKind::Dominance).unwrap();
        g.add_edge(h3, a, EdgeKind::Dominance).unwrap();
        g.add_edge(h2, b, EdgeKind::Dominance).unwrap();
        g
    }

    #[test]
    fn normal_graph_belongs_to_all_classes() {
        let g = normal_graph();
        assert!(g.is_weakly_normal());
        assert!(g.is_normal());
        assert!(g.is_compact());
        assert!(g.is_compactifiable());
        assert!(g.is_leaf_labelled());
        assert!(g.is_hypernormally_connected());
        assert!(g.is_hypernormally_connected_fast());
        assert!(g.is_well_formed());
        assert!(g.is_simple_solved_form());
    }

    #[test]
    fn empty_graph_is_trivially_in_every_class() {
        let g = DomGraph::new();
        assert!(g.is_normal());
        assert!(g.is_compact());
        assert!(g.is_hypernormally_connected());
        assert!(g.is_hypernormally_connected_fast());
    }

    #[test]
    fn hole_with_tree_child_is_not_weakly_normal() {
        let mut g = DomGraph::new();
        let h = node(&mut g, "h", NodeKind::Unlabelled);
        let x = node(&mut g, "x", NodeKind::Labelled);
        g.add_edge(h, x, EdgeKind::Tree).unwrap();
        assert_eq!(
            g.check_weakly_normal(),
            Err(ClassViolation::HoleNotLeaf { node: h })
        );
    }

    #[test]
    fn two_tree_parents_is_not_weakly_normal() {
        let mut g = DomGraph::new();
        let p = node(&mut g, "p", NodeKind::Labelled);
        let q = node(&mut g, "q", NodeKind::Labelled);
        let x = node(&mut g, "x", NodeKind::Labelled);
        g.add_edge(p, x, EdgeKind::Tree).unwrap();
        g.add_edge(q, x, EdgeKind::Tree).unwrap();
        assert_eq!(
            g.check_weakly_normal(),
            Err(ClassViolation::MultipleTreeParents { node: x, parents: 2 })
        );
    }

    #[test]
    fn tree_cycle_is_not_weakly_normal() {
        let mut g = DomGraph::new();
        let p = node(&mut g, "p", NodeKind::Labelled);
        let q = node(&mut g, "q", NodeKind::Labelled);
        g.add_edge(p, q, EdgeKind::Tree).unwrap();
        g.add_edge(q, p, EdgeKind::Tree).unwrap();
        assert_eq!(g.check_weakly_normal(), Err(ClassViolation::TreeCycle));
    }

    #[test]
    fn dominance_into_inner_node_is_not_weakly_normal() {
        let mut g = DomGraph::new();
        let f = node(&mut g, "f", NodeKind::Labelled);
        let x = node(&mut g, "x", NodeKind::Labelled);
        let h = node(&mut g, "h", NodeKind::Unlabelled);
        g.add_edge(f, x, EdgeKind::Tree).unwrap();
        g.add_edge(h, x, EdgeKind::Dominance).unwrap();
        assert_eq!(
            g.check_weakly_normal(),
            Err(ClassViolation::DominanceIntoNonRoot { src: h, tgt: x })
        );
    }

    #[test]
    fn dominance_from_root_is_compactifiable_but_not_normal() {
        let mut g = DomGraph::new();
        let f = node(&mut g, "f", NodeKind::Labelled);
        let a = node(&mut g, "a", NodeKind::Labelled);
        g.add_edge(f, a, EdgeKind::Dominance).unwrap();

        assert_eq!(
            g.check_normal(),
            Err(ClassViolation::DominanceFromLabelled { src: f, tgt: a })
        );
        assert!(g.is_compactifiable());
        // f is a labelled leaf with an outgoing edge.
        assert_eq!(
            g.check_well_formed(),
            Err(ClassViolation::LabelledLeafWithEdge { node: f })
        );
    }

    #[test]
    fn inner_labelled_node_breaks_compactness() {
        let mut g = DomGraph::new();
        let f = node(&mut g, "f", NodeKind::Labelled);
        let x = node(&mut g, "x", NodeKind::Labelled);
        let h = node(&mut g, "h", NodeKind::Unlabelled);
        let a = node(&mut g, "a", NodeKind::Labelled);
        g.add_edge(f, x, EdgeKind::Tree).unwrap();
        g.add_edge(x, h, EdgeKind::Tree).unwrap();
        g.add_edge(h, a, EdgeKind::Dominance).unwrap();

        assert!(g.is_normal());
        assert_eq!(
            g.check_compact(),
            Err(ClassViolation::LabelledNonRoot { node: x })
        );
        assert!(g.is_compactifiable());

        g.add_edge(x, a, EdgeKind::Dominance).unwrap();
        assert_eq!(
            g.check_compactifiable(),
            Err(ClassViolation::DominanceFromInnerNode { src: x, tgt: a })
        );
    }

    #[test]
    fn open_hole_is_not_leaf_labelled() {
        let mut g = DomGraph::new();
        let f = node(&mut g, "f", NodeKind::Labelled);
        let h = node(&mut g, "h", NodeKind::Unlabelled);
        g.add_edge(f, h, EdgeKind::Tree).unwrap();
        assert_eq!(
            g.check_leaf_labelled(),
            Err(ClassViolation::OpenHole { node: h })
        );
    }

    #[test]
    fn disconnected_graph_is_not_hypernormally_connected() {
        let mut g = DomGraph::new();
        let a = node(&mut g, "a", NodeKind::Labelled);
        let b = node(&mut g, "b", NodeKind::Labelled);
        assert_eq!(
            g.check_hypernormally_connected(),
            Err(ClassViolation::NotHypernormallyConnected { from: a, to: b })
        );
        assert!(!g.is_hypernormally_connected_fast());
    }

    #[test]
    fn fork_below_one_hole_is_not_hypernormally_connected() {
        // f(h) with h -> a and h -> b: a and b only meet by turning at h.
        let mut g = DomGraph::new();
        let f = node(&mut g, "f", NodeKind::Labelled);
        let h = node(&mut g, "h", NodeKind::Unlabelled);
        let a = node(&mut g, "a", NodeKind::Labelled);
        let b = node(&mut g, "b", NodeKind::Labelled);
        g.add_edge(f, h, EdgeKind::Tree).unwrap();
        g.add_edge(h, a, EdgeKind::Dominance).unwrap();
        g.add_edge(h, b, EdgeKind::Dominance).unwrap();

        assert!(g.is_normal());
        assert!(!g.is_hypernormally_connected());
        assert!(!g.is_hypernormally_connected_fast());
    }

    #[test]
    fn simple_solved_form_violations() {
        let mut g = DomGraph::new();
        let f = node(&mut g, "f", NodeKind::Labelled);
        let h = node(&mut g, "h", NodeKind::Unlabelled);
        let a = node(&mut g, "a", NodeKind::Labelled);
        let b = node(&mut g, "b", NodeKind::Labelled);
        g.add_edge(f, h, EdgeKind::Tree).unwrap();
        g.add_edge(h, a, EdgeKind::Dominance).unwrap();
        assert!(g.is_simple_solved_form());

        g.add_edge(h, b, EdgeKind::Dominance).unwrap();
        assert_eq!(
            g.check_simple_solved_form(),
            Err(ClassViolation::MultipleDominanceChildren { node: h, out_degree: 2 })
        );

        let mut cyclic = DomGraph::new();
        let x = node(&mut cyclic, "x", NodeKind::Unlabelled);
        let y = node(&mut cyclic, "y", NodeKind::Unlabelled);
        cyclic.add_edge(x, y, EdgeKind::Dominance).unwrap();
        cyclic.add_edge(y, x, EdgeKind::Dominance).unwrap();
        assert_eq!(cyclic.check_simple_solved_form(), Err(ClassViolation::Cycle));
    }

    #[test]
    fn violation_messages_name_the_nodes() {
        let v = ClassViolation::MultipleTreeParents {
            node: NodeId(3),
            parents: 2,
        };
        assert_eq!(v.to_string(), "node 3 has 2 incoming tree edges");
    }
}
