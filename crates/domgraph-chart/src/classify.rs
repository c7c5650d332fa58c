//! One-shot classification of a graph against every graph class.

use domgraph_core::DomGraph;
use serde::{Deserialize, Serialize};

use crate::solver::is_solvable;

/// Membership of one graph in each graph class.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphClasses {
    pub weakly_normal: bool,
    pub normal: bool,
    pub compact: bool,
    pub compactifiable: bool,
    pub leaf_labelled: bool,
    pub hypernormally_connected: bool,
    pub well_formed: bool,
    pub simple_solved_form: bool,
    /// `None` when solvability is undefined because the graph is not weakly
    /// normal or not compactifiable.
    pub solvable: Option<bool>,
}

/// Classifies `graph`.
///
/// Hypernormal connectedness uses the linear-time test on solvable graphs
/// and the pairwise test on all others.
pub fn classify(graph: &DomGraph) -> GraphClasses {
    let solvable = is_solvable(graph).ok();
    let hypernormally_connected = if solvable == Some(true) {
        graph.is_hypernormally_connected_fast()
    } else {
        graph.is_hypernormally_connected()
    };

    GraphClasses {
        weakly_normal: graph.is_weakly_normal(),
        normal: graph.is_normal(),
        compact: graph.is_compact(),
        compactifiable: graph.is_compactifiable(),
        leaf_labelled: graph.is_leaf_labelled(),
        hypernormally_connected,
        well_formed: graph.is_well_formed(),
        simple_solved_form: graph.is_simple_solved_form(),
        solvable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use domgraph_core::{chain, ClassViolation, EdgeKind, NodeKind};

    #[test]
    fn classify_chain() {
        let (g, _) = chain(3).unwrap();
        insta::assert_json_snapshot!(classify(&g), @r###"
        {
          "weakly_normal": true,
          "normal": true,
          "compact": true,
          "compactifiable": true,
          "leaf_labelled": true,
          "hypernormally_connected": true,
          "well_formed": true,
          "simple_solved_form": false,
          "solvable": true
        }
        "###);
    }

    /// `f(h1, h2)` with both holes above the leaf `a`.
    fn two_holes_over_one_leaf() -> DomGraph {
        let mut g = DomGraph::new();
        let f = g.add_node("f", NodeKind::Labelled).unwrap();
        let h1 = g.add_node("h1", NodeKind::Unlabelled).unwrap();
        let h2 = g.add_node("h2", NodeKind::Unlabelled).unwrap();
        let a = g.add_node("a", NodeKind::Labelled).unwrap();
        g.add_edge(f, h1, EdgeKind::Tree).unwrap();
        g.add_edge(f, h2, EdgeKind::Tree).unwrap();
        g.add_edge(h1, a, EdgeKind::Dominance).unwrap();
        g.add_edge(h2, a, EdgeKind::Dominance).unwrap();
        g
    }

    #[test]
    fn classify_unsolvable_normal_graph() {
        let g = two_holes_over_one_leaf();
        insta::assert_json_snapshot!(classify(&g), @r###"
        {
          "weakly_normal": true,
          "normal": true,
          "compact": true,
          "compactifiable": true,
          "leaf_labelled": true,
          "hypernormally_connected": true,
          "well_formed": true,
          "simple_solved_form": false,
          "solvable": false
        }
        "###);
    }

    #[test]
    fn unsolvable_graph_with_isolated_fragment_is_not_connected() {
        let mut g = two_holes_over_one_leaf();
        let b = g.add_node("b", NodeKind::Labelled).unwrap();

        let classes = classify(&g);
        assert_eq!(classes.solvable, Some(false));
        assert!(classes.normal);
        assert!(!classes.hypernormally_connected);
        assert_eq!(
            g.check_hypernormally_connected(),
            Err(ClassViolation::NotHypernormallyConnected {
                from: g.node_id("f").unwrap(),
                to: b,
            })
        );
    }

    #[test]
    fn classify_graph_with_two_tree_parents() {
        let mut g = DomGraph::new();
        let p = g.add_node("p", NodeKind::Labelled).unwrap();
        let q = g.add_node("q", NodeKind::Labelled).unwrap();
        let x = g.add_node("x", NodeKind::Unlabelled).unwrap();
        g.add_edge(p, x, EdgeKind::Tree).unwrap();
        g.add_edge(q, x, EdgeKind::Tree).unwrap();

        let classes = classify(&g);
        assert!(!classes.weakly_normal);
        assert!(!classes.compact);
        assert_eq!(classes.solvable, None);
    }
}
