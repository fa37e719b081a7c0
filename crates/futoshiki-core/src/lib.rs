//! Core Futoshiki engine.
//!
//! A Futoshiki is an n×n Latin-square puzzle with sparse less-than /
//! greater-than clues between orthogonally adjacent cells. This crate
//! decides whether a partially filled grid is still satisfiable, computes
//! a satisfying completion, and recommends the easiest next move for a
//! human solver, ranked by a fixed hierarchy of deduction rules with a
//! refutation-difficulty fallback.
//!
//! ```
//! use futoshiki_core::{Grid, Relation, Solver};
//!
//! let grid = Grid::empty(4).set_across(0, 0, Relation::Less);
//! let solver = Solver::new();
//! assert!(solver.is_consistent(&grid));
//! let solution = solver.solve(&grid).unwrap();
//! assert!(solution.is_filled());
//! ```

mod grid;
mod solver;

pub use grid::{Grid, ParseError, Relation};
pub use solver::{Hint, Rule, Solver};
