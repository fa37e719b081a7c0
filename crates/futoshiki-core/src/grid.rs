//! Grid representation and textual encoding.
//!
//! A [`Grid`] is an immutable snapshot: cell values live in a value matrix
//! owned by each instance, while the inequality clues (the across/down
//! relation matrices) are shared between all grids derived from the same
//! puzzle. Updates go through [`Grid::set`], which returns a new grid.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// An ordering clue between two orthogonally adjacent cells.
///
/// For an across relation the pair is (r, c) and (r, c+1); for a down
/// relation it is (r, c) and (r+1, c). `Less` means the first cell holds
/// the smaller value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Relation {
    Less,
    None,
    Greater,
}

/// The fixed clue structure of a puzzle: board size plus both relation
/// matrices. Shared by reference between derived grids.
#[derive(Debug, PartialEq, Eq)]
struct Clues {
    n: usize,
    /// Row-major, n rows of n-1 across relations.
    across: Vec<Relation>,
    /// Row-major, n-1 rows of n down relations.
    down: Vec<Relation>,
}

/// Error raised when a grid's textual form cannot be decoded.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("empty grid text")]
    Empty,
    #[error("expected an odd number of lines, got {0}")]
    BadLineCount(usize),
    #[error("grids larger than 9x9 are not supported (got {0})")]
    TooLarge(usize),
    #[error("line {line} is {got} characters wide, expected at most {want}")]
    LineTooLong { line: usize, got: usize, want: usize },
    #[error("line {line}: invalid value character {ch:?}")]
    BadValueChar { line: usize, ch: char },
    #[error("line {line}: value {value} out of range for a {n}x{n} grid")]
    ValueOutOfRange { line: usize, value: u8, n: usize },
    #[error("line {line}: invalid relation character {ch:?}")]
    BadRelationChar { line: usize, ch: char },
}

/// An n×n Futoshiki grid.
#[derive(Debug, Clone)]
pub struct Grid {
    /// Row-major cell values, 0 = empty.
    values: Vec<u8>,
    clues: Arc<Clues>,
}

impl Grid {
    /// Create a blank n×n grid with no relations. Panics if `n` is not in 1..=9.
    pub fn empty(n: usize) -> Self {
        assert!((1..=9).contains(&n), "grid size must be in 1..=9");
        Grid {
            values: vec![0; n * n],
            clues: Arc::new(Clues {
                n,
                across: vec![Relation::None; n * (n - 1)],
                down: vec![Relation::None; (n - 1) * n],
            }),
        }
    }

    /// Board size n.
    pub fn size(&self) -> usize {
        self.clues.n
    }

    /// Value at (r, c), or `None` if the cell is empty.
    pub fn value(&self, r: usize, c: usize) -> Option<u8> {
        let n = self.clues.n;
        match self.values[r * n + c] {
            0 => None,
            v => Some(v),
        }
    }

    /// Relation between (r, c) and (r, c+1). Requires `c < n - 1`.
    pub fn across(&self, r: usize, c: usize) -> Relation {
        let n = self.clues.n;
        self.clues.across[r * (n - 1) + c]
    }

    /// Relation between (r, c) and (r+1, c). Requires `r < n - 1`.
    pub fn down(&self, r: usize, c: usize) -> Relation {
        let n = self.clues.n;
        self.clues.down[r * n + c]
    }

    /// Return a new grid with (r, c) set to `v` (0 clears the cell).
    ///
    /// The clue structure is shared with `self`, so probing hypothetical
    /// placements is cheap.
    pub fn set(&self, r: usize, c: usize, v: u8) -> Grid {
        let n = self.clues.n;
        assert!(r < n && c < n, "cell ({r}, {c}) out of bounds");
        assert!(v as usize <= n, "value {v} out of range for a {n}x{n} grid");
        let mut values = self.values.clone();
        values[r * n + c] = v;
        Grid {
            values,
            clues: Arc::clone(&self.clues),
        }
    }

    /// Return a new grid with the across relation at (r, c)-(r, c+1) replaced.
    ///
    /// Unlike [`Grid::set`], this edits the clue structure, so the result is
    /// a fresh puzzle instance that no longer shares clues with `self`.
    pub fn set_across(&self, r: usize, c: usize, rel: Relation) -> Grid {
        let n = self.clues.n;
        assert!(r < n && c < n - 1, "across relation ({r}, {c}) out of bounds");
        let mut across = self.clues.across.clone();
        across[r * (n - 1) + c] = rel;
        Grid {
            values: self.values.clone(),
            clues: Arc::new(Clues {
                n,
                across,
                down: self.clues.down.clone(),
            }),
        }
    }

    /// Return a new grid with the down relation at (r, c)-(r+1, c) replaced.
    pub fn set_down(&self, r: usize, c: usize, rel: Relation) -> Grid {
        let n = self.clues.n;
        assert!(r < n - 1 && c < n, "down relation ({r}, {c}) out of bounds");
        let mut down = self.clues.down.clone();
        down[r * n + c] = rel;
        Grid {
            values: self.values.clone(),
            clues: Arc::new(Clues {
                n,
                across: self.clues.across.clone(),
                down,
            }),
        }
    }

    /// True if every cell holds a value.
    pub fn is_filled(&self) -> bool {
        self.values.iter().all(|&v| v != 0)
    }

    /// Number of filled cells.
    pub fn filled_count(&self) -> usize {
        self.values.iter().filter(|&&v| v != 0).count()
    }

    /// Number of empty cells.
    pub fn empty_count(&self) -> usize {
        self.values.len() - self.filled_count()
    }

    /// All empty positions in row-major order.
    pub fn empty_positions(&self) -> Vec<(usize, usize)> {
        let n = self.clues.n;
        (0..n * n)
            .filter(|i| self.values[*i] == 0)
            .map(|i| (i / n, i % n))
            .collect()
    }

    /// Replace the whole value matrix, keeping the shared clue structure.
    pub(crate) fn with_values(&self, values: Vec<u8>) -> Grid {
        debug_assert_eq!(values.len(), self.values.len());
        Grid {
            values,
            clues: Arc::clone(&self.clues),
        }
    }

    /// Decode a grid from its textual form.
    ///
    /// A puzzle of size n spans `2n - 1` lines of width `4n - 3`. Even lines
    /// carry values (`·` = empty) with ` < ` / ` > ` fields between them; odd
    /// lines carry `^` / `v` down relations under each value column. `^`
    /// means the upper cell is less than the lower, `v` the reverse. Short
    /// lines are padded with spaces before decoding.
    pub fn parse(text: &str) -> Result<Grid, ParseError> {
        let mut lines: Vec<&str> = text.lines().collect();
        while lines.first().is_some_and(|l| l.trim().is_empty()) {
            lines.remove(0);
        }
        while lines.last().is_some_and(|l| l.trim().is_empty()) {
            lines.pop();
        }
        if lines.is_empty() {
            return Err(ParseError::Empty);
        }
        if lines.len() % 2 == 0 {
            return Err(ParseError::BadLineCount(lines.len()));
        }
        let n = (lines.len() + 1) / 2;
        if n > 9 {
            return Err(ParseError::TooLarge(n));
        }
        let width = 4 * n - 3;

        let mut rows: Vec<Vec<char>> = Vec::with_capacity(lines.len());
        for (i, line) in lines.iter().enumerate() {
            let mut chars: Vec<char> = line.trim_end().chars().collect();
            if chars.len() > width {
                return Err(ParseError::LineTooLong {
                    line: i + 1,
                    got: chars.len(),
                    want: width,
                });
            }
            chars.resize(width, ' ');
            rows.push(chars);
        }

        let mut values = vec![0u8; n * n];
        let mut across = vec![Relation::None; n * (n - 1)];
        let mut down = vec![Relation::None; (n - 1) * n];

        for r in 0..n {
            let line = &rows[2 * r];
            for c in 0..n {
                values[r * n + c] = match line[4 * c] {
                    '·' => 0,
                    ch @ '1'..='9' => {
                        let v = ch as u8 - b'0';
                        if v as usize > n {
                            return Err(ParseError::ValueOutOfRange {
                                line: 2 * r + 1,
                                value: v,
                                n,
                            });
                        }
                        v
                    }
                    ch => return Err(ParseError::BadValueChar { line: 2 * r + 1, ch }),
                };
                if c + 1 < n {
                    across[r * (n - 1) + c] = match line[4 * c + 2] {
                        ' ' => Relation::None,
                        '<' => Relation::Less,
                        '>' => Relation::Greater,
                        ch => return Err(ParseError::BadRelationChar { line: 2 * r + 1, ch }),
                    };
                }
            }
        }
        for r in 0..n - 1 {
            let line = &rows[2 * r + 1];
            for c in 0..n {
                down[r * n + c] = match line[4 * c] {
                    ' ' => Relation::None,
                    '^' => Relation::Less,
                    'v' => Relation::Greater,
                    ch => return Err(ParseError::BadRelationChar { line: 2 * r + 2, ch }),
                };
            }
        }

        Ok(Grid {
            values,
            clues: Arc::new(Clues { n, across, down }),
        })
    }
}

impl PartialEq for Grid {
    fn eq(&self, other: &Self) -> bool {
        self.values == other.values
            && (Arc::ptr_eq(&self.clues, &other.clues) || *self.clues == *other.clues)
    }
}

impl Eq for Grid {}

impl FromStr for Grid {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Grid::parse(s)
    }
}

impl fmt::Display for Grid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.clues.n;
        for r in 0..n {
            let mut line = String::new();
            for c in 0..n {
                match self.value(r, c) {
                    Some(v) => line.push((b'0' + v) as char),
                    None => line.push('·'),
                }
                if c + 1 < n {
                    line.push_str(match self.across(r, c) {
                        Relation::Less => " < ",
                        Relation::None => "   ",
                        Relation::Greater => " > ",
                    });
                }
            }
            write!(f, "{}", line.trim_end())?;
            if r + 1 < n {
                writeln!(f)?;
                let mut rel = String::new();
                for c in 0..n {
                    rel.push(match self.down(r, c) {
                        Relation::Less => '^',
                        Relation::None => ' ',
                        Relation::Greater => 'v',
                    });
                    if c + 1 < n {
                        rel.push_str("   ");
                    }
                }
                writeln!(f, "{}", rel.trim_end())?;
            }
        }
        Ok(())
    }
}
