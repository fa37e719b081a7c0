//! Solver orchestrator.
//!
//! Exposes the four primitives built on the constraint model: consistency
//! checking (partial encoding), solving (full encoding), refutation scoring
//! (full encoding, one incremental session), and the ordered hint engine
//! that consumes all three.

mod model;
mod session;
mod types;

use log::debug;

use crate::grid::Grid;
use model::{Constraint, Model};
use session::{Outcome, Session};

pub use types::{Hint, Rule};

/// Unit struct solver — stateless, all state is per-call.
pub struct Solver;

impl Default for Solver {
    fn default() -> Self {
        Self::new()
    }
}

impl Solver {
    /// Create a new solver.
    pub fn new() -> Self {
        Self
    }

    /// Whether the grid is still logically satisfiable.
    ///
    /// Uses the partial encoding: filled cells must be distinct within
    /// their row and column, and every inequality must be satisfiable by
    /// some legal value of its (possibly unfilled) endpoints. A consistent
    /// grid is not necessarily completable; see [`Solver::solve`].
    pub fn is_consistent(&self, grid: &Grid) -> bool {
        Session::new(Model::partial(grid)).check().is_sat()
    }

    /// Compute one satisfying completion, or `None` if none exists.
    pub fn solve(&self, grid: &Grid) -> Option<Grid> {
        let model = Model::full(grid);
        match Session::new(model).check() {
            Outcome::Sat(witness) => Some(grid.with_values(witness)),
            Outcome::Unsat { .. } => None,
        }
    }

    /// Refutation score for every cell.
    ///
    /// For each unfilled cell and each candidate value in ascending order,
    /// temporarily fix the value on one shared full-encoding session and
    /// check satisfiability; infeasible candidates contribute their
    /// refutation certificate size to the cell's score. Filled cells score
    /// zero, as do unfilled cells with no refutable candidate — callers
    /// distinguish the two by inspecting the grid.
    ///
    /// A low nonzero score marks a cell whose wrong candidates are all easy
    /// to rule out by elimination.
    pub fn refutation_scores(&self, grid: &Grid) -> Vec<Vec<u32>> {
        let n = grid.size();
        let model = Model::full(grid);
        let cells = model.cells.clone();
        let mut session = Session::new(model);

        let mut scores = vec![vec![0u32; n]; n];
        for r in 0..n {
            for c in 0..n {
                if grid.value(r, c).is_some() {
                    continue;
                }
                let var = cells[r * n + c].expect("full encoding declares every cell");
                let mut total = 0;
                for v in 1..=n as u8 {
                    session.push(Constraint::Fixed(var, v));
                    if let Outcome::Unsat { steps } = session.check() {
                        total += steps;
                    }
                    session.pop();
                }
                scores[r][c] = total;
            }
        }
        scores
    }

    /// Values the cell (r, c) can still hold without making the grid
    /// inconsistent, in ascending order.
    pub fn candidates(&self, grid: &Grid, r: usize, c: usize) -> Vec<u8> {
        let n = grid.size();
        (1..=n as u8)
            .filter(|&v| self.is_consistent(&grid.set(r, c, v)))
            .collect()
    }

    /// Recommend the easiest next move.
    ///
    /// Tries four rules in fixed priority and returns the first that fires:
    /// exclusion (a cell with one remaining value), row inclusion (a value
    /// with one remaining cell in a row), column inclusion (likewise for a
    /// column), and finally the minimum nonzero refutation score, which
    /// names a cell to focus on without resolving its value. Returns `None`
    /// when no rule yields a signal.
    pub fn get_hint(&self, grid: &Grid) -> Option<Hint> {
        let hint = self
            .find_exclusion(grid)
            .or_else(|| self.find_row_inclusion(grid))
            .or_else(|| self.find_column_inclusion(grid))
            .or_else(|| self.find_min_refutation(grid));
        if let Some(h) = &hint {
            debug!("hint: {} at ({}, {})", h.rule, h.row, h.col);
        }
        hint
    }

    /// Stage 1: a cell with exactly one consistent value.
    fn find_exclusion(&self, grid: &Grid) -> Option<Hint> {
        let n = grid.size();
        for r in 0..n {
            for c in 0..n {
                if grid.value(r, c).is_some() {
                    continue;
                }
                let candidates = self.candidates(grid, r, c);
                if let [v] = candidates[..] {
                    return Some(Hint {
                        row: r,
                        col: c,
                        value: Some(v),
                        rule: Rule::Exclusion,
                        explanation: format!(
                            "{} is the only value that can go in cell ({}, {}).",
                            v,
                            r + 1,
                            c + 1
                        ),
                    });
                }
            }
        }
        None
    }

    /// Stage 2: a value with exactly one consistent cell in some row.
    fn find_row_inclusion(&self, grid: &Grid) -> Option<Hint> {
        let n = grid.size();
        for r in 0..n {
            for v in 1..=n as u8 {
                let cells: Vec<usize> = (0..n)
                    .filter(|&c| {
                        grid.value(r, c).is_none() && self.is_consistent(&grid.set(r, c, v))
                    })
                    .collect();
                if let [c] = cells[..] {
                    return Some(Hint {
                        row: r,
                        col: c,
                        value: Some(v),
                        rule: Rule::RowInclusion,
                        explanation: format!(
                            "In row {}, the value {} can only go in column {}.",
                            r + 1,
                            v,
                            c + 1
                        ),
                    });
                }
            }
        }
        None
    }

    /// Stage 3: a value with exactly one consistent cell in some column.
    fn find_column_inclusion(&self, grid: &Grid) -> Option<Hint> {
        let n = grid.size();
        for c in 0..n {
            for v in 1..=n as u8 {
                let rows: Vec<usize> = (0..n)
                    .filter(|&r| {
                        grid.value(r, c).is_none() && self.is_consistent(&grid.set(r, c, v))
                    })
                    .collect();
                if let [r] = rows[..] {
                    return Some(Hint {
                        row: r,
                        col: c,
                        value: Some(v),
                        rule: Rule::ColumnInclusion,
                        explanation: format!(
                            "In column {}, the value {} can only go in row {}.",
                            c + 1,
                            v,
                            r + 1
                        ),
                    });
                }
            }
        }
        None
    }

    /// Stage 4: the unfilled cell with the smallest nonzero refutation
    /// score, ties broken in row-major order. Names a cell, not a value.
    fn find_min_refutation(&self, grid: &Grid) -> Option<Hint> {
        let n = grid.size();
        let scores = self.refutation_scores(grid);
        let mut best: Option<(u32, usize, usize)> = None;
        for r in 0..n {
            for c in 0..n {
                let score = scores[r][c];
                if score == 0 {
                    continue;
                }
                if best.map_or(true, |(s, _, _)| score < s) {
                    best = Some((score, r, c));
                }
            }
        }
        best.map(|(_, r, c)| Hint {
            row: r,
            col: c,
            value: None,
            rule: Rule::Refutation,
            explanation: format!(
                "Work on cell ({}, {}): all but one of its candidates can be shown impossible.",
                r + 1,
                c + 1
            ),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grid::Relation;

    /// Uniquely solvable 4×4 puzzle with two givens and two down clues.
    const UNIQUE: &str = "\
·   ·   ·   ·

·   ·   ·   ·
^
2   ·   ·   ·
    ^
·   ·   ·   4";

    fn assert_valid_completion(solution: &Grid, original: &Grid) {
        let n = original.size();
        for r in 0..n {
            for c in 0..n {
                if let Some(v) = original.value(r, c) {
                    assert_eq!(solution.value(r, c), Some(v), "given at ({r}, {c}) changed");
                }
            }
        }
        for r in 0..n {
            let mut row: Vec<u8> = (0..n).map(|c| solution.value(r, c).unwrap()).collect();
            row.sort_unstable();
            assert_eq!(row, (1..=n as u8).collect::<Vec<_>>(), "row {r} not a permutation");
        }
        for c in 0..n {
            let mut col: Vec<u8> = (0..n).map(|r| solution.value(r, c).unwrap()).collect();
            col.sort_unstable();
            assert_eq!(col, (1..=n as u8).collect::<Vec<_>>(), "column {c} not a permutation");
        }
        for r in 0..n {
            for c in 0..n - 1 {
                let (a, b) = (solution.value(r, c).unwrap(), solution.value(r, c + 1).unwrap());
                match original.across(r, c) {
                    Relation::Less => assert!(a < b, "across clue at ({r}, {c}) violated"),
                    Relation::Greater => assert!(a > b, "across clue at ({r}, {c}) violated"),
                    Relation::None => {}
                }
            }
        }
        for r in 0..n - 1 {
            for c in 0..n {
                let (a, b) = (solution.value(r, c).unwrap(), solution.value(r + 1, c).unwrap());
                match original.down(r, c) {
                    Relation::Less => assert!(a < b, "down clue at ({r}, {c}) violated"),
                    Relation::Greater => assert!(a > b, "down clue at ({r}, {c}) violated"),
                    Relation::None => {}
                }
            }
        }
    }

    #[test]
    fn test_solve_unique_puzzle() {
        let grid = Grid::parse(UNIQUE).unwrap();
        let solution = Solver::new().solve(&grid).unwrap();
        let expected = [
            [4, 3, 2, 1],
            [1, 4, 3, 2],
            [2, 1, 4, 3],
            [3, 2, 1, 4],
        ];
        for r in 0..4 {
            for c in 0..4 {
                assert_eq!(solution.value(r, c), Some(expected[r][c]));
            }
        }
        assert_valid_completion(&solution, &grid);
    }

    #[test]
    fn test_solve_guardian_puzzle_soundness() {
        // Guardian 2020-02-20 Easy.
        let text = "\
· > ·   ·   ·   ·
^   v
4   ·   · < ·   ·
v       ^
2   4   ·   ·   ·
        ^       ^
·   ·   · > · < ·
            ^   v
·   ·   ·   · > ·";
        let grid = Grid::parse(text).unwrap();
        let solver = Solver::new();
        assert!(solver.is_consistent(&grid));
        let solution = solver.solve(&grid).expect("published puzzle must solve");
        assert!(solution.is_filled());
        assert_valid_completion(&solution, &grid);
    }

    #[test]
    fn test_solve_rejects_unsatisfiable_grid() {
        // Two equal values in one row cannot be completed.
        let grid = Grid::empty(4).set(0, 0, 2).set(0, 2, 2);
        assert!(Solver::new().solve(&grid).is_none());
    }

    #[test]
    fn test_is_consistent_rejects_duplicates() {
        let solver = Solver::new();
        let row_dup = Grid::empty(4).set(0, 0, 2).set(0, 2, 2);
        assert!(!solver.is_consistent(&row_dup));
        let col_dup = Grid::empty(4).set(0, 1, 3).set(2, 1, 3);
        assert!(!solver.is_consistent(&col_dup));
    }

    #[test]
    fn test_is_consistent_rejects_violated_clue_between_filled_cells() {
        let grid = Grid::empty(4)
            .set_across(0, 0, Relation::Greater)
            .set(0, 0, 2)
            .set(0, 1, 3);
        assert!(!Solver::new().is_consistent(&grid));
    }

    #[test]
    fn test_is_consistent_checks_clues_against_unfilled_neighbors() {
        // A cell fixed to the maximum with a '<' toward an empty neighbor
        // leaves no legal value for that neighbor.
        let grid = Grid::empty(4)
            .set_across(0, 0, Relation::Less)
            .set(0, 0, 4);
        assert!(!Solver::new().is_consistent(&grid));
    }

    #[test]
    fn test_empty_grid_with_sparse_clue_is_consistent_and_solvable() {
        let grid = Grid::empty(4).set_across(0, 0, Relation::Less);
        let solver = Solver::new();
        assert!(solver.is_consistent(&grid));
        let solution = solver.solve(&grid).unwrap();
        assert_valid_completion(&solution, &grid);
    }

    #[test]
    fn test_inconsistency_is_monotone_under_set() {
        let solver = Solver::new();
        let grid = Grid::empty(4).set(1, 0, 3).set(1, 3, 3);
        assert!(!solver.is_consistent(&grid));
        for (r, c) in grid.empty_positions() {
            for v in 1..=4 {
                assert!(
                    !solver.is_consistent(&grid.set(r, c, v)),
                    "adding ({r}, {c}) = {v} must not repair an inconsistent grid"
                );
            }
        }
    }

    #[test]
    fn test_refutation_scores_zero_for_filled_cells() {
        let grid = Grid::parse(UNIQUE).unwrap();
        let scores = Solver::new().refutation_scores(&grid);
        assert_eq!(scores[2][0], 0);
        assert_eq!(scores[3][3], 0);
    }

    #[test]
    fn test_refutation_scores_locate_refutable_candidates() {
        // Empty grid with one '<': only (0,0)=4 and (0,1)=1 are infeasible.
        let grid = Grid::empty(4).set_across(0, 0, Relation::Less);
        let scores = Solver::new().refutation_scores(&grid);
        assert!(scores[0][0] > 0);
        assert!(scores[0][1] > 0);
        for r in 0..4 {
            for c in 0..4 {
                if (r, c) != (0, 0) && (r, c) != (0, 1) {
                    assert_eq!(scores[r][c], 0, "unexpected score at ({r}, {c})");
                }
            }
        }
    }

    #[test]
    fn test_hint_exclusion_fires_first() {
        // Row 1 leaves exactly one value for (1, 0); the down clue keeps
        // (0, 0) ambiguous so the scan must pass it by.
        let grid = Grid::empty(4)
            .set_down(0, 0, Relation::Greater)
            .set(1, 1, 2)
            .set(1, 2, 3)
            .set(1, 3, 4)
            .set(2, 3, 1);
        let hint = Solver::new().get_hint(&grid).unwrap();
        assert_eq!(hint.rule.name(), "exclusion");
        assert_eq!((hint.row, hint.col), (1, 0));
        assert_eq!(hint.value, Some(1));
    }

    #[test]
    fn test_hint_row_inclusion() {
        // No cell has a unique candidate, but 1 fits only column 0 of row 0.
        let grid = Grid::empty(4).set(1, 1, 1).set(2, 2, 1).set(3, 3, 1);
        let hint = Solver::new().get_hint(&grid).unwrap();
        assert_eq!(hint.rule, Rule::RowInclusion);
        assert_eq!((hint.row, hint.col), (0, 0));
        assert_eq!(hint.value, Some(1));
    }

    #[test]
    fn test_hint_column_inclusion() {
        // The '<' blocks (0,0)=4 and the givens block rows 1 and 3, so 4
        // fits only row 2 of column 0; no row yields a unique cell first.
        let grid = Grid::empty(4)
            .set_across(0, 0, Relation::Less)
            .set(1, 2, 4)
            .set(3, 0, 2);
        let hint = Solver::new().get_hint(&grid).unwrap();
        assert_eq!(hint.rule, Rule::ColumnInclusion);
        assert_eq!((hint.row, hint.col), (2, 0));
        assert_eq!(hint.value, Some(4));
    }

    #[test]
    fn test_hint_refutation_fallback() {
        // A lone '<' on an otherwise empty grid gives no unique candidate
        // anywhere; the fallback points at one of the clue's endpoints.
        let grid = Grid::empty(4).set_across(0, 0, Relation::Less);
        let hint = Solver::new().get_hint(&grid).unwrap();
        assert_eq!(hint.rule, Rule::Refutation);
        assert_eq!(hint.value, None);
        assert_eq!(hint.row, 0);
        assert!(hint.col <= 1);
    }

    #[test]
    fn test_hint_none_when_no_signal() {
        let solver = Solver::new();
        // Fully solved grid: nothing left to deduce.
        let solved = solver.solve(&Grid::parse(UNIQUE).unwrap()).unwrap();
        assert!(solver.get_hint(&solved).is_none());
        // Unconstrained empty grid: nothing refutable either.
        assert!(solver.get_hint(&Grid::empty(4)).is_none());
    }

    #[test]
    fn test_candidates_narrow_with_clues() {
        let solver = Solver::new();
        let grid = Grid::empty(4).set_across(0, 0, Relation::Less);
        assert_eq!(solver.candidates(&grid, 0, 0), vec![1, 2, 3]);
        assert_eq!(solver.candidates(&grid, 0, 1), vec![2, 3, 4]);
        assert_eq!(solver.candidates(&grid, 3, 3), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_hint_serializes() {
        let grid = Grid::empty(4).set(1, 1, 1).set(2, 2, 1).set(3, 3, 1);
        let hint = Solver::new().get_hint(&grid).unwrap();
        let json = serde_json::to_string(&hint).unwrap();
        let back: Hint = serde_json::from_str(&json).unwrap();
        assert_eq!(back, hint);
    }
}
