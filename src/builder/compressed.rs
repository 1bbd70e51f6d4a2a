//! Owned and borrowed compressed-row forms.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::backend::RowStorage;
use crate::error::{Result, SparseError};
use crate::scalar::Scalar;

/// Owned compressed-row buffers, one-based like the backend sees them.
///
/// `column_indices` and `values` may be longer than the number of stored
/// entries; the tail up to the reservation is unused.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompressedForm<T> {
    /// `order + 1` one-based row boundaries
    pub row_offsets: Vec<usize>,
    /// One-based column per slot
    pub column_indices: Vec<usize>,
    /// Coefficient per slot
    pub values: Vec<T>,
}

impl<T: Scalar> CompressedForm<T> {
    /// Matrix order implied by the row offsets.
    pub fn order(&self) -> usize {
        self.row_offsets.len().saturating_sub(1)
    }

    /// Checks that the buffers form a finalized compressed-row structure.
    ///
    /// # Errors
    /// - `InvalidDimensions` if the order or the slot count is zero
    /// - `DimensionMismatch` if columns and values differ in length
    /// - `MalformedStructure` for bad offsets, out-of-range columns, or
    ///   columns not strictly increasing within a row
    pub fn validate(&self) -> Result<()> {
        let order = self.order();
        let capacity = self.column_indices.len();
        if order == 0 || capacity == 0 {
            return Err(SparseError::InvalidDimensions {
                order,
                reserved_non_zeros: capacity,
            });
        }
        if self.values.len() != capacity {
            return Err(SparseError::DimensionMismatch {
                expected: capacity,
                got: self.values.len(),
            });
        }
        if self.row_offsets[0] != 1 {
            return Err(SparseError::MalformedStructure {
                reason: "row offsets must start at 1",
            });
        }
        if self.row_offsets.windows(2).any(|w| w[0] > w[1]) {
            return Err(SparseError::MalformedStructure {
                reason: "row offsets must be non-decreasing",
            });
        }
        if self.row_offsets[order] - 1 > capacity {
            return Err(SparseError::MalformedStructure {
                reason: "row offsets run past the column buffer",
            });
        }
        for w in self.row_offsets.windows(2) {
            let row = &self.column_indices[w[0] - 1..w[1] - 1];
            if row.iter().any(|&col| col == 0 || col > order) {
                return Err(SparseError::MalformedStructure {
                    reason: "column index out of range",
                });
            }
            if row.windows(2).any(|pair| pair[0] >= pair[1]) {
                return Err(SparseError::MalformedStructure {
                    reason: "column indices must be strictly increasing within a row",
                });
            }
        }
        Ok(())
    }
}

/// Read-only view of a finalized builder's buffers.
///
/// Borrowing the builder for the view's lifetime means no mutating call can
/// run while it is alive.
#[derive(Debug, Clone, Copy)]
pub struct CompressedRows<'a, T> {
    storage: &'a RowStorage<T>,
}

impl<'a, T: Scalar> CompressedRows<'a, T> {
    pub(crate) fn new(storage: &'a RowStorage<T>) -> Self {
        Self { storage }
    }

    /// Matrix order.
    pub fn order(&self) -> usize {
        self.storage.order()
    }

    /// Number of stored entries.
    pub fn nnz(&self) -> usize {
        self.storage.stored()
    }

    /// `order + 1` one-based row boundaries.
    pub fn row_offsets(&self) -> &'a [usize] {
        self.storage.row_offsets()
    }

    /// One-based column indices, one per reserved slot.
    pub fn column_indices(&self) -> &'a [usize] {
        self.storage.column_indices()
    }

    /// Coefficients, one per reserved slot.
    pub fn values(&self) -> &'a [T] {
        self.storage.values()
    }

    /// Zero-based `(column, value)` pairs stored in `row`, in column order.
    ///
    /// # Panics
    /// Panics if `row >= self.order()`.
    pub fn row(&self, row: usize) -> impl Iterator<Item = (usize, T)> + 'a {
        assert!(row < self.order(), "row {row} out of bounds");
        let range = self.storage.row_range(row);
        self.storage.column_indices()[range.clone()]
            .iter()
            .zip(&self.storage.values()[range])
            .map(|(&col, &value)| (col - 1, value))
    }

    /// Copies the buffers, reservation included, into an owned form.
    pub fn to_owned_form(&self) -> CompressedForm<T> {
        CompressedForm {
            row_offsets: self.row_offsets().to_vec(),
            column_indices: self.column_indices().to_vec(),
            values: self.values().to_vec(),
        }
    }
}

impl<T: Scalar> fmt::Display for CompressedRows<'_, T> {
    /// Three lines: row offsets, then column indices and values over every slot.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_line(f, self.row_offsets())?;
        write_line(f, self.column_indices())?;
        write_line(f, self.values())
    }
}

fn write_line<V: fmt::Debug>(f: &mut fmt::Formatter<'_>, items: &[V]) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(" ")?;
        }
        write!(f, "{item:?}")?;
    }
    writeln!(f)
}
