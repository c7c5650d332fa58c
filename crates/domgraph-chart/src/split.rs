//! Splits: one way of decomposing a subgraph around a free fragment.

use std::fmt;

use domgraph_core::{NodeId, Subgraph};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

/// The decomposition of a subgraph induced by one of its free roots.
///
/// Removing the root fragment from the subgraph leaves weakly connected
/// components. Each component is assigned to the *dominator* (a hole of the
/// root fragment, or the root itself) whose dominance edge reached it.
/// Dominators are kept in discovery order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Split {
    root: NodeId,
    wccs: IndexMap<NodeId, SmallVec<[Subgraph; 1]>>,
}

impl Split {
    /// A split with root fragment `root` and no components yet.
    pub fn new(root: NodeId) -> Self {
        Split {
            root,
            wccs: IndexMap::new(),
        }
    }

    /// Assigns `wcc` to `dominator`.
    pub fn add_wcc(&mut self, dominator: NodeId, wcc: Subgraph) {
        self.wccs.entry(dominator).or_default().push(wcc);
    }

    /// The root of the split's root fragment.
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Components below `dominator`, empty if it dominates nothing.
    pub fn wccs(&self, dominator: NodeId) -> &[Subgraph] {
        match self.wccs.get(&dominator) {
            Some(w) => w.as_slice(),
            None => &[],
        }
    }

    pub fn dominators(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.wccs.keys().copied()
    }

    /// All components, grouped by dominator.
    pub fn all_subgraphs(&self) -> impl Iterator<Item = &Subgraph> + '_ {
        self.wccs.values().flat_map(|w| w.iter())
    }

    /// `(dominator, component)` pairs in the order of
    /// [`all_subgraphs`](Self::all_subgraphs).
    pub fn components(&self) -> impl Iterator<Item = (NodeId, &Subgraph)> + '_ {
        self.wccs
            .iter()
            .flat_map(|(&dom, w)| w.iter().map(move |s| (dom, s)))
    }

    pub fn component_count(&self) -> usize {
        self.wccs.values().map(|w| w.len()).sum()
    }
}

impl fmt::Display for Split {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{} {{", self.root)?;
        for (i, (dom, wccs)) in self.wccs.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{}=[", dom)?;
            for (j, wcc) in wccs.iter().enumerate() {
                if j > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}", wcc)?;
            }
            write!(f, "]")?;
        }
        write!(f, "}}>")
    }
}
