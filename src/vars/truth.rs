//! Truth table: sparse existence of (entity, variable) value cells.
//!
//! Row-major boolean matrix: rows are a kind's entities in index order,
//! columns its variables, with the variable index varying fastest. A false
//! cell must never be read or written.

use crate::exchange_error::MeshExchangeError;
use serde::{Deserialize, Serialize};

/// Boolean existence matrix for one variable family.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TruthTable {
    rows: usize,
    cols: usize,
    /// Row-major flags, `rows * cols` entries.
    flags: Vec<bool>,
}

impl TruthTable {
    /// Fully-defined table: every (entity, variable) cell exists.
    pub fn all_true(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            flags: vec![true; rows * cols],
        }
    }

    /// Builds a table from row-major flags, validating the shape.
    pub fn from_flags(
        rows: usize,
        cols: usize,
        flags: &[bool],
    ) -> Result<Self, MeshExchangeError> {
        if flags.len() != rows * cols {
            return Err(MeshExchangeError::ShapeMismatch {
                context: "truth table",
                expected: rows * cols,
                found: flags.len(),
            });
        }
        Ok(Self {
            rows,
            cols,
            flags: flags.to_vec(),
        })
    }

    /// Number of entity rows.
    #[inline]
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of variable columns.
    #[inline]
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Row-major flags.
    #[inline]
    pub fn flags(&self) -> &[bool] {
        &self.flags
    }

    /// Whether the cell at (0-based row, 0-based column) is defined.
    #[inline]
    pub fn is_defined(&self, row: usize, col: usize) -> bool {
        debug_assert!(row < self.rows && col < self.cols);
        self.flags[row * self.cols + col]
    }

    /// Appends `added` columns, defined for every row.
    ///
    /// Used by the copy engine when schema additions introduce variables
    /// into an existing family.
    pub fn extend_columns(&mut self, added: usize) {
        if added == 0 {
            return;
        }
        let new_cols = self.cols + added;
        let mut flags = Vec::with_capacity(self.rows * new_cols);
        for row in 0..self.rows {
            flags.extend_from_slice(&self.flags[row * self.cols..(row + 1) * self.cols]);
            flags.extend(std::iter::repeat_n(true, added));
        }
        self.cols = new_cols;
        self.flags = flags;
    }
}
