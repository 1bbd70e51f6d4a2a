//! Matrix-vector and matrix-matrix products over the compact form.

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::trace;

use super::SparseMatrixBuilder;
use crate::backend::{CompressedRowBackend, RowStorage};
use crate::error::{Result, SparseError};
use crate::scalar::Scalar;

impl<T: Scalar, B: CompressedRowBackend<T>> SparseMatrixBuilder<T, B> {
    /// Returns `self * vector`, finalizing first if needed.
    ///
    /// # Errors
    /// `DimensionMismatch` if `vector.len() != self.order()`.
    pub fn multiply(&mut self, vector: &[T]) -> Result<Vec<T>> {
        let mut result = vec![T::zero(); self.order()];
        self.multiply_into(vector, &mut result)?;
        Ok(result)
    }

    /// Writes `self * vector` into `result`, finalizing first if needed.
    ///
    /// Every entry of `result` is overwritten. A builder without storage
    /// yields the zero vector.
    ///
    /// # Errors
    /// `DimensionMismatch` if either slice length differs from the order.
    pub fn multiply_into(&mut self, vector: &[T], result: &mut [T]) -> Result<()> {
        check_len(self.order(), vector.len())?;
        check_len(self.order(), result.len())?;

        self.ensure_finalized();
        match self.finalized_storage() {
            Some(storage) => rows_times_vector(storage, vector, result),
            None => result.fill(T::zero()),
        }
        Ok(())
    }

    /// Computes `self * right` and stores every non-zero entry into `result`
    /// with `set`.
    ///
    /// Both operands are finalized once up front. Coordinates whose sum is
    /// zero are skipped, so `result` gains no explicit zeros and keeps
    /// whatever it held there before.
    ///
    /// A `Finalized` result is reopened by its first `set` and is left in the
    /// `Building` phase whenever the product has a non-zero entry.
    ///
    /// # Errors
    /// - `DimensionMismatch` if `right` or `result` has a different order
    /// - anything `result.set` reports, such as `CapacityExceeded`
    pub fn multiply_matrix<R, O>(
        &mut self,
        right: &mut SparseMatrixBuilder<T, R>,
        result: &mut SparseMatrixBuilder<T, O>,
    ) -> Result<()>
    where
        R: CompressedRowBackend<T>,
        O: CompressedRowBackend<T>,
    {
        let order = self.order();
        check_len(order, right.order())?;
        check_len(order, result.order())?;

        self.ensure_finalized();
        right.ensure_finalized();

        let Some(storage) = self.finalized_storage() else {
            return Ok(());
        };
        for row in 0..order {
            let range = storage.row_range(row);
            let columns = &storage.column_indices()[range.clone()];
            let values = &storage.values()[range];
            for col in 0..order {
                let mut summed = T::zero();
                for (&k, &value) in columns.iter().zip(values) {
                    summed = summed + value * right.get_finalized(k - 1, col)?;
                }
                if summed != T::zero() {
                    result.set(row, col, summed)?;
                }
            }
        }

        trace!(order, nnz = result.nnz(), "computed sparse matrix product");
        Ok(())
    }
}

fn check_len(expected: usize, got: usize) -> Result<()> {
    if expected == got {
        Ok(())
    } else {
        Err(SparseError::DimensionMismatch { expected, got })
    }
}

#[inline]
fn row_dot<T: Scalar>(storage: &RowStorage<T>, row: usize, vector: &[T]) -> T {
    let range = storage.row_range(row);
    storage.column_indices()[range.clone()]
        .iter()
        .zip(&storage.values()[range])
        .fold(T::zero(), |acc, (&col, &value)| acc + value * vector[col - 1])
}

#[cfg(not(feature = "parallel"))]
fn rows_times_vector<T: Scalar>(storage: &RowStorage<T>, vector: &[T], result: &mut [T]) {
    for (row, out) in result.iter_mut().enumerate() {
        *out = row_dot(storage, row, vector);
    }
}

#[cfg(feature = "parallel")]
fn rows_times_vector<T: Scalar>(storage: &RowStorage<T>, vector: &[T], result: &mut [T]) {
    result
        .par_iter_mut()
        .enumerate()
        .for_each(|(row, out)| *out = row_dot(storage, row, vector));
}
