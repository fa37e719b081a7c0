use serde::{Deserialize, Serialize};

/// Deduction rule that produced a hint, in priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Rule {
    /// Exactly one value can go in the cell.
    Exclusion,
    /// Exactly one cell in a row can hold the value.
    RowInclusion,
    /// Exactly one cell in a column can hold the value.
    ColumnInclusion,
    /// Fallback: the cell whose wrong candidates are cheapest to refute.
    Refutation,
}

impl Rule {
    /// Stable rule name used by front ends.
    pub fn name(&self) -> &'static str {
        match self {
            Rule::Exclusion => "exclusion",
            Rule::RowInclusion => "row inclusion",
            Rule::ColumnInclusion => "column inclusion",
            Rule::Refutation => "refutation",
        }
    }
}

impl std::fmt::Display for Rule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A hint for the player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hint {
    /// Cell the hint points at.
    pub row: usize,
    pub col: usize,
    /// The deduced value. `None` for the refutation fallback, which only
    /// names the next cell worth working on.
    pub value: Option<u8>,
    /// The rule that fired.
    pub rule: Rule,
    /// Human-readable justification.
    pub explanation: String,
}
