//! Scatter-add of dense element matrices into a global builder.
//!
//! A finite-element assembler computes one small dense matrix per element
//! and adds it into the global matrix at the element's degrees of freedom.
//! Both helpers here go through [`SparseMatrixBuilder::add`], so zero
//! contributions never create stored entries.

use crate::backend::CompressedRowBackend;
use crate::builder::SparseMatrixBuilder;
use crate::error::{Result, SparseError};
use crate::scalar::Scalar;

/// Adds a row-major `dofs.len() x dofs.len()` element matrix into `builder`.
///
/// Local entry `(a, b)` lands at global `(dofs[a], dofs[b])`.
///
/// # Errors
/// - `DimensionMismatch` if `element_matrix.len() != dofs.len()²`
/// - anything [`SparseMatrixBuilder::add`] reports; entries added before the
///   failure stay in place
pub fn assemble_element<T, B>(
    builder: &mut SparseMatrixBuilder<T, B>,
    dofs: &[usize],
    element_matrix: &[T],
) -> Result<()>
where
    T: Scalar,
    B: CompressedRowBackend<T>,
{
    let n = dofs.len();
    if element_matrix.len() != n * n {
        return Err(SparseError::DimensionMismatch {
            expected: n * n,
            got: element_matrix.len(),
        });
    }
    if n == 0 {
        return Ok(());
    }

    for (&global_row, local_row) in dofs.iter().zip(element_matrix.chunks_exact(n)) {
        for (&global_col, &value) in dofs.iter().zip(local_row) {
            builder.add(global_row, global_col, value)?;
        }
    }
    Ok(())
}

/// Assembles every `(dofs, element_matrix)` pair in order, stopping at the
/// first error.
///
/// # Errors
/// The first error [`assemble_element`] reports.
pub fn assemble_elements<'a, T, B, I>(builder: &mut SparseMatrixBuilder<T, B>, elements: I) -> Result<()>
where
    T: Scalar,
    B: CompressedRowBackend<T>,
    I: IntoIterator<Item = (&'a [usize], &'a [T])>,
{
    elements
        .into_iter()
        .try_for_each(|(dofs, matrix)| assemble_element(builder, dofs, matrix))
}
