//! Chart-based solver for dominance graphs.
//!
//! [`solver::solve`] fills a [`Chart`] with the splits of a compact, weakly
//! normal graph; the chart then counts its solved forms
//! ([`Chart::count_solved_forms`]) or enumerates them lazily
//! ([`SolvedFormIterator`]).

pub mod chart;
pub mod classify;
pub mod enumerator;
pub mod error;
pub mod solver;
pub mod split;
pub mod split_computer;
pub mod split_source;

pub use chart::Chart;
pub use classify::{classify, GraphClasses};
pub use enumerator::{SolvedForm, SolvedFormIterator};
pub use error::{ChartError, SolveError};
pub use solver::{is_solvable, solve, solve_with, SolverConfig};
pub use split::Split;
pub use split_computer::SplitComputer;
pub use split_source::{potential_free_roots, SplitSource, Splits};
