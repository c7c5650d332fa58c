//! Compactification.
//!
//! A compact graph consists of fragment roots and holes only: every fragment
//! is a root with tree edges straight to its holes. Compactifying a
//! compactifiable graph drops the inner labelled nodes and reconnects each
//! root to the holes of its fragment, keeping them in left-to-right order.
//! Node ids survive compactification, so solved forms of the compact graph
//! name nodes of the original graph.

use crate::edge::EdgeKind;
use crate::error::CoreError;
use crate::graph::DomGraph;
use crate::id::NodeId;

impl DomGraph {
    /// Returns the compact version of this graph.
    ///
    /// Compact graphs are returned as a plain copy. Graphs that are not
    /// compactifiable fail with [`CoreError::NotCompactifiable`].
    pub fn compactify(&self) -> Result<DomGraph, CoreError> {
        if self.is_compact() {
            return Ok(self.clone());
        }
        self.check_compactifiable()
            .map_err(|violation| CoreError::NotCompactifiable { violation })?;

        let roots = self.all_roots();
        let plugs: Vec<(NodeId, Vec<NodeId>)> = roots
            .iter()
            .map(|root| (root, self.holes_in_order(root)))
            .collect();
        let dominance = self.dominance_edges();

        let mut ret = self.clone();
        // Fresh edge storage, so new tree edges are numbered in the order
        // they are added below.
        ret.graph.clear_edges();
        for node in self.all_nodes().iter() {
            if !roots.contains(node) && !self.is_hole(node) {
                ret.graph.remove_node(node.into());
                if let Some(name) = self.name(node) {
                    ret.names.remove(name);
                }
            }
        }
        for (root, holes) in plugs {
            for hole in holes {
                ret.add_edge(root, hole, EdgeKind::Tree)?;
            }
        }
        for edge in dominance {
            ret.add_edge(edge.src, edge.tgt, EdgeKind::Dominance)?;
        }
        Ok(ret)
    }

    /// Holes below `root` in depth-first, left-to-right order.
    fn holes_in_order(&self, root: NodeId) -> Vec<NodeId> {
        let mut holes = Vec::new();
        let mut stack = vec![root];
        while let Some(node) = stack.pop() {
            if self.is_hole(node) {
                if node != root {
                    holes.push(node);
                }
                continue;
            }
            let children = self.children(node, Some(EdgeKind::Tree));
            stack.extend(children.into_iter().rev());
        }
        holes
    }
}
