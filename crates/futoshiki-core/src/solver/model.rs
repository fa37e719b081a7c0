//! Constraint model builder.
//!
//! Translates a [`Grid`] into a bounded-integer satisfiability problem in
//! one of two encodings. The *full* encoding declares a variable for every
//! cell with whole-row/column distinctness; it backs solving and refutation
//! scoring. The *partial* encoding only constrains what is already known:
//! distinctness spans filled cells, and unfilled cells referenced by an
//! inequality get a fresh domain-bounded placeholder. It backs consistency
//! checking of incomplete grids.

use crate::grid::{Grid, Relation};

/// Index of a variable in a session's domain table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct VarId(pub(crate) usize);

/// A constraint over cell variables. Domain bounds are implicit: every
/// declared variable starts with domain [1, n].
#[derive(Debug, Clone)]
pub(crate) enum Constraint {
    /// All variables in scope take pairwise distinct values.
    AllDifferent(Vec<VarId>),
    /// The first variable is strictly less than the second.
    Less(VarId, VarId),
    /// The variable equals the given value.
    Fixed(VarId, u8),
}

/// A built constraint model: variable declarations plus the constraint set,
/// with a handle from each grid cell to its variable (where one exists).
#[derive(Debug)]
pub(crate) struct Model {
    pub(crate) n: usize,
    pub(crate) var_count: usize,
    /// Row-major cell-to-variable map. In the partial encoding, cells that
    /// are neither filled nor touched by an inequality have no variable.
    pub(crate) cells: Vec<Option<VarId>>,
    pub(crate) constraints: Vec<Constraint>,
}

impl Model {
    /// Build the full encoding: one variable per cell, row/column
    /// distinctness, every declared inequality, and an equality for every
    /// filled cell.
    pub(crate) fn full(grid: &Grid) -> Model {
        let n = grid.size();
        let cells: Vec<Option<VarId>> = (0..n * n).map(|i| Some(VarId(i))).collect();
        let var = |r: usize, c: usize| VarId(r * n + c);

        let mut constraints = Vec::new();
        for r in 0..n {
            constraints.push(Constraint::AllDifferent((0..n).map(|c| var(r, c)).collect()));
        }
        for c in 0..n {
            constraints.push(Constraint::AllDifferent((0..n).map(|r| var(r, c)).collect()));
        }
        for r in 0..n {
            for c in 0..n {
                if let Some(v) = grid.value(r, c) {
                    constraints.push(Constraint::Fixed(var(r, c), v));
                }
            }
        }
        push_inequalities(grid, &mut constraints, var);

        Model {
            n,
            var_count: n * n,
            cells,
            constraints,
        }
    }

    /// Build the partial encoding: variables only for filled cells and for
    /// unfilled cells referenced by an inequality. Distinctness spans the
    /// filled cells of each row/column (omitted below two variables);
    /// placeholder variables never join a distinctness constraint.
    pub(crate) fn partial(grid: &Grid) -> Model {
        let n = grid.size();
        let mut cells: Vec<Option<VarId>> = vec![None; n * n];
        let mut var_count = 0;
        let mut constraints = Vec::new();

        for r in 0..n {
            for c in 0..n {
                if let Some(v) = grid.value(r, c) {
                    let id = VarId(var_count);
                    var_count += 1;
                    cells[r * n + c] = Some(id);
                    constraints.push(Constraint::Fixed(id, v));
                }
            }
        }
        for r in 0..n {
            let filled: Vec<VarId> = (0..n).filter_map(|c| cells[r * n + c]).collect();
            if filled.len() >= 2 {
                constraints.push(Constraint::AllDifferent(filled));
            }
        }
        for c in 0..n {
            let filled: Vec<VarId> = (0..n).filter_map(|r| cells[r * n + c]).collect();
            if filled.len() >= 2 {
                constraints.push(Constraint::AllDifferent(filled));
            }
        }
        push_inequalities(grid, &mut constraints, |r, c| {
            let slot = &mut cells[r * n + c];
            match *slot {
                Some(id) => id,
                None => {
                    let id = VarId(var_count);
                    var_count += 1;
                    *slot = Some(id);
                    id
                }
            }
        });

        Model {
            n,
            var_count,
            cells,
            constraints,
        }
    }
}

/// Emit a `Less` constraint for every non-`None` adjacency.
fn push_inequalities(
    grid: &Grid,
    constraints: &mut Vec<Constraint>,
    mut var_for: impl FnMut(usize, usize) -> VarId,
) {
    let n = grid.size();
    for r in 0..n {
        for c in 0..n - 1 {
            match grid.across(r, c) {
                Relation::None => {}
                Relation::Less => {
                    let (a, b) = (var_for(r, c), var_for(r, c + 1));
                    constraints.push(Constraint::Less(a, b));
                }
                Relation::Greater => {
                    let (a, b) = (var_for(r, c), var_for(r, c + 1));
                    constraints.push(Constraint::Less(b, a));
                }
            }
        }
    }
    for r in 0..n - 1 {
        for c in 0..n {
            match grid.down(r, c) {
                Relation::None => {}
                Relation::Less => {
                    let (a, b) = (var_for(r, c), var_for(r + 1, c));
                    constraints.push(Constraint::Less(a, b));
                }
                Relation::Greater => {
                    let (a, b) = (var_for(r, c), var_for(r + 1, c));
                    constraints.push(Constraint::Less(b, a));
                }
            }
        }
    }
}
