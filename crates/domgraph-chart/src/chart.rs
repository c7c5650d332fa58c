//! The chart: a memo table from subgraphs to their splits.
//!
//! A chart represents all solved forms of a graph at once, sharing the
//! decompositions of subgraphs that occur below many different splits. Every
//! subgraph carries a reference count: one per split component that names it,
//! plus one for each top-level registration. Edits keep the counts exact and
//! delete subgraphs nobody refers to any more.
//!
//! Subgraphs consisting of a single fragment have no entry; they count as
//! having exactly one solved form. A chart whose solve failed is marked
//! unsolvable: it holds no entries and represents no solved forms.

use std::collections::HashMap;
use std::fmt;

use domgraph_core::Subgraph;
use indexmap::IndexMap;
use num_bigint::BigUint;

use crate::error::ChartError;
use crate::split::Split;

/// Subgraph -> splits, plus top-level subgraphs and reference counts.
#[derive(Debug, Clone, Default)]
pub struct Chart {
    splits: IndexMap<Subgraph, Vec<Split>>,
    refcount: HashMap<Subgraph, usize>,
    toplevel: Vec<Subgraph>,
    size: usize,
    unsolvable: bool,
}

impl Chart {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Building
    // -----------------------------------------------------------------------

    /// Registers a top-level subgraph, normally a weakly connected component
    /// of the whole graph. The registration counts as one reference.
    pub fn add_toplevel_subgraph(&mut self, subgraph: Subgraph) {
        *self.refcount.entry(subgraph.clone()).or_insert(0) += 1;
        self.toplevel.push(subgraph);
    }

    /// Appends `split` to the splits of `subgraph`.
    ///
    /// Structurally identical splits are not merged; see
    /// [`remove_duplicate_splits`](Self::remove_duplicate_splits).
    pub fn add_split(&mut self, subgraph: Subgraph, split: Split) {
        for component in split.all_subgraphs() {
            *self.refcount.entry(component.clone()).or_insert(0) += 1;
        }
        self.splits.entry(subgraph).or_default().push(split);
        self.size += 1;
    }

    /// Replaces all splits of `subgraph` by `splits`.
    ///
    /// Fails with [`ChartError::UnknownSubgraph`] if the chart has no entry
    /// for `subgraph`, and with [`ChartError::EmptySplitSet`] if `splits` is
    /// empty while `subgraph` is still referenced. Component subgraphs that
    /// are no longer referenced afterwards are deleted, recursively. An empty
    /// `splits` for an unreferenced subgraph deletes it.
    pub fn set_splits_for_subgraph(&mut self, subgraph: &Subgraph, splits: Vec<Split>) -> Result<(), ChartError> {
        if !self.splits.contains_key(subgraph) {
            return Err(ChartError::UnknownSubgraph {
                subgraph: subgraph.clone(),
            });
        }
        let references = self.references(subgraph);
        if splits.is_empty() {
            if references > 0 {
                return Err(ChartError::EmptySplitSet {
                    subgraph: subgraph.clone(),
                    references,
                });
            }
            return self.delete_subgraph(subgraph);
        }

        let old = self
            .splits
            .insert(subgraph.clone(), Vec::new())
            .unwrap_or_default();
        self.size -= old.len();

        let mut released = Vec::new();
        for split in &old {
            for component in split.all_subgraphs() {
                self.release(component);
                released.push(component.clone());
            }
        }
        for split in splits {
            self.add_split(subgraph.clone(), split);
        }
        for component in released {
            if self.references(&component) == 0 {
                self.remove_unreferenced(component);
            }
        }
        Ok(())
    }

    /// Deletes `subgraph` and its splits.
    ///
    /// Fails with [`ChartError::StillReferenced`] while any split or top-level
    /// registration refers to it, and with [`ChartError::UnknownSubgraph`] if
    /// it has no entry. Components that become unreferenced are deleted too.
    pub fn delete_subgraph(&mut self, subgraph: &Subgraph) -> Result<(), ChartError> {
        let references = self.references(subgraph);
        if references > 0 {
            return Err(ChartError::StillReferenced {
                subgraph: subgraph.clone(),
                references,
            });
        }
        if !self.splits.contains_key(subgraph) {
            return Err(ChartError::UnknownSubgraph {
                subgraph: subgraph.clone(),
            });
        }
        self.remove_unreferenced(subgraph.clone());
        Ok(())
    }

    /// Merges structurally identical splits of each subgraph, keeping the
    /// first occurrence. Returns the number of splits removed.
    pub fn remove_duplicate_splits(&mut self) -> usize {
        let mut removed: Vec<Split> = Vec::new();
        for splits in self.splits.values_mut() {
            let mut kept: Vec<Split> = Vec::with_capacity(splits.len());
            for split in splits.drain(..) {
                if kept.contains(&split) {
                    removed.push(split);
                } else {
                    kept.push(split);
                }
            }
            *splits = kept;
        }
        // The kept duplicate still references every component, so no count
        // drops to zero here.
        for split in &removed {
            for component in split.all_subgraphs() {
                self.release(component);
            }
        }
        self.size -= removed.len();
        removed.len()
    }

    /// Drops every entry and registration and marks the chart as the result
    /// of a failed solve.
    pub(crate) fn mark_unsolvable(&mut self) {
        self.splits.clear();
        self.refcount.clear();
        self.toplevel.clear();
        self.size = 0;
        self.unsolvable = true;
    }

    fn references(&self, subgraph: &Subgraph) -> usize {
        self.refcount.get(subgraph).copied().unwrap_or(0)
    }

    fn release(&mut self, subgraph: &Subgraph) {
        if let Some(count) = self.refcount.get_mut(subgraph) {
            *count = count.saturating_sub(1);
        }
    }

    /// Removes an unreferenced subgraph and cascades into its components.
    fn remove_unreferenced(&mut self, subgraph: Subgraph) {
        let mut worklist = vec![subgraph];
        while let Some(current) = worklist.pop() {
            self.refcount.remove(&current);
            let Some(splits) = self.splits.shift_remove(&current) else {
                continue;
            };
            tracing::debug!(subgraph = %current, splits = splits.len(), "deleting unreferenced subgraph");
            self.size -= splits.len();
            for split in &splits {
                for component in split.all_subgraphs() {
                    self.release(component);
                    if self.references(component) == 0 {
                        worklist.push(component.clone());
                    }
                }
            }
        }
    }

    // -----------------------------------------------------------------------
    // Queries
    // -----------------------------------------------------------------------

    /// `true` for a fresh chart: no entries, no top-level subgraphs and no
    /// failed solve.
    pub fn is_empty(&self) -> bool {
        self.splits.is_empty() && self.toplevel.is_empty() && !self.unsolvable
    }

    /// `true` if the solve that filled this chart found no solved form.
    pub fn is_unsolvable(&self) -> bool {
        self.unsolvable
    }

    /// Returns `true` if the chart has an entry for `subgraph`.
    pub fn contains_split_for(&self, subgraph: &Subgraph) -> bool {
        self.splits.contains_key(subgraph)
    }

    pub fn splits_for(&self, subgraph: &Subgraph) -> Result<&[Split], ChartError> {
        self.splits
            .get(subgraph)
            .map(Vec::as_slice)
            .ok_or_else(|| ChartError::UnknownSubgraph {
                subgraph: subgraph.clone(),
            })
    }

    /// Number of splits in the whole chart.
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of subgraphs with an entry.
    pub fn subgraph_count(&self) -> usize {
        self.splits.len()
    }

    pub fn toplevel_subgraphs(&self) -> &[Subgraph] {
        &self.toplevel
    }

    /// Iterates over all entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&Subgraph, &[Split])> + '_ {
        self.splits.iter().map(|(s, splits)| (s, splits.as_slice()))
    }

    // -----------------------------------------------------------------------
    // Counting
    // -----------------------------------------------------------------------

    /// Number of solved forms the chart represents: the product of the
    /// counts of the top-level subgraphs.
    ///
    /// Zero for a chart marked unsolvable.
    pub fn count_solved_forms(&self) -> BigUint {
        if self.unsolvable {
            return BigUint::from(0u32);
        }
        let mut memo = HashMap::new();
        self.toplevel
            .iter()
            .map(|s| self.count_with_memo(s, &mut memo))
            .product()
    }

    /// Number of solved forms of one subgraph: the sum over its splits of
    /// the product of the component counts.
    pub fn count_solved_forms_for(&self, subgraph: &Subgraph) -> BigUint {
        if self.unsolvable {
            return BigUint::from(0u32);
        }
        self.count_with_memo(subgraph, &mut HashMap::new())
    }

    fn count_with_memo<'c>(&'c self, subgraph: &'c Subgraph, memo: &mut HashMap<&'c Subgraph, BigUint>) -> BigUint {
        // Post-order over the split hierarchy: (subgraph, children counted).
        let mut stack: Vec<(&Subgraph, bool)> = vec![(subgraph, false)];
        while let Some((current, expanded)) = stack.pop() {
            if memo.contains_key(current) {
                continue;
            }
            let Some(splits) = self.splits.get(current) else {
                memo.insert(current, BigUint::from(1u32));
                continue;
            };
            if expanded {
                let total: BigUint = splits
                    .iter()
                    .map(|split| {
                        split
                            .all_subgraphs()
                            .map(|c| memo.get(c).cloned().unwrap_or_else(|| BigUint::from(1u32)))
                            .product::<BigUint>()
                    })
                    .sum();
                memo.insert(current, total);
            } else {
                stack.push((current, true));
                for split in splits {
                    for component in split.all_subgraphs() {
                        if !memo.contains_key(component) {
                            stack.push((component, false));
                        }
                    }
                }
            }
        }
        memo.get(subgraph)
            .cloned()
            .unwrap_or_else(|| BigUint::from(1u32))
    }
}

impl fmt::Display for Chart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (subgraph, splits) in &self.splits {
            for split in splits {
                writeln!(f, "{} -> {}", subgraph, split)?;
            }
        }
        Ok(())
    }
}
