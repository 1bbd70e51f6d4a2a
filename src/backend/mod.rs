//! The compressed-row storage backend and the buffers it operates on.
//!
//! A backend owns no memory. It is handed a [`RowStorage`] (row offsets,
//! column indices, values and a workspace, all fixed-size) and rewrites those
//! buffers in place through four entry points:
//!
//! | Entry point | Effect | Status |
//! |-------------|--------|--------|
//! | [`initialize`](CompressedRowBackend::initialize) | prepares the build form | none |
//! | [`finalize`](CompressedRowBackend::finalize) | compacts, sorts and renumbers | none |
//! | [`reopen`](CompressedRowBackend::reopen) | compact form back to build form | [`Status`] |
//! | [`insert`](CompressedRowBackend::insert) | writes or accumulates one entry | [`Status`] |
//!
//! Row and column numbers crossing this boundary are one-based. Both the
//! build form and the compact form keep `row_offsets[order] - 1` equal to the
//! number of stored entries.

pub mod linked;
pub mod status;

pub use linked::LinkedRowBackend;
pub use status::{Status, StatusKind};

use core::ops::Range;

use serde::{Deserialize, Serialize};

use crate::builder::CompressedForm;
use crate::scalar::Scalar;

/// How an insert treats an entry that is already stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum InsertMode {
    /// Overwrite the stored value.
    Replace,
    /// Add to the stored value.
    #[default]
    Accumulate,
}

/// How chatty a backend should be about the calls it serves.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticLevel {
    /// No events.
    #[default]
    Silent,
    /// Fatal statuses only.
    Errors,
    /// Every call.
    Verbose,
}

impl DiagnosticLevel {
    /// Returns `true` if fatal statuses should be reported.
    #[inline]
    pub fn reports_errors(self) -> bool {
        self >= Self::Errors
    }

    /// Returns `true` if every call should be reported.
    #[inline]
    pub fn reports_calls(self) -> bool {
        self >= Self::Verbose
    }
}

/// One entry handed to [`CompressedRowBackend::insert`], in one-based numbering.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BackendEntry<T> {
    /// One-based row
    pub row: usize,
    /// One-based column
    pub col: usize,
    /// Coefficient
    pub value: T,
}

/// The four buffers of a compressed-row matrix.
///
/// Sizes are fixed at construction: `order + 1` row offsets and `capacity`
/// slots in each of the other three buffers. Backends receive mutable
/// slices only, so they can rewrite contents but never resize.
#[derive(Debug, Clone, PartialEq)]
pub struct RowStorage<T> {
    row_offsets: Vec<usize>,
    column_indices: Vec<usize>,
    values: Vec<T>,
    workspace: Vec<usize>,
}

/// Mutable view of all four buffers at once.
#[derive(Debug)]
pub struct RowStorageMut<'a, T> {
    /// `order + 1` row boundaries (or list heads in a build form)
    pub row_offsets: &'a mut [usize],
    /// One-based column per slot
    pub column_indices: &'a mut [usize],
    /// Coefficient per slot
    pub values: &'a mut [T],
    /// Backend scratch, one word per slot
    pub workspace: &'a mut [usize],
}

impl<T: Scalar> RowStorage<T> {
    /// Allocates zero-filled buffers for a matrix of `order` with `capacity` slots.
    pub fn zeroed(order: usize, capacity: usize) -> Self {
        Self {
            row_offsets: vec![0; order + 1],
            column_indices: vec![0; capacity],
            values: vec![T::zero(); capacity],
            workspace: vec![0; capacity],
        }
    }

    /// Wraps an already compact structure. The caller has validated it.
    pub(crate) fn from_compressed(form: CompressedForm<T>) -> Self {
        let workspace = vec![0; form.column_indices.len()];
        Self {
            row_offsets: form.row_offsets,
            column_indices: form.column_indices,
            values: form.values,
            workspace,
        }
    }

    pub(crate) fn into_compressed(self) -> CompressedForm<T> {
        CompressedForm {
            row_offsets: self.row_offsets,
            column_indices: self.column_indices,
            values: self.values,
        }
    }
}

impl<T> RowStorage<T> {
    /// Matrix order.
    #[inline]
    pub fn order(&self) -> usize {
        // `row_offsets` is length `order + 1` by construction.
        self.row_offsets.len().saturating_sub(1)
    }

    /// Number of slots, i.e. the reserved non-zero capacity.
    #[inline]
    pub fn capacity(&self) -> usize {
        self.column_indices.len()
    }

    /// Number of stored entries.
    #[inline]
    pub fn stored(&self) -> usize {
        self.row_offsets
            .last()
            .map_or(0, |&free| free.saturating_sub(1))
    }

    /// Zero-based slot range of `row` in the compact form.
    ///
    /// Meaningless while the storage is in a build form.
    #[inline]
    pub fn row_range(&self, row: usize) -> Range<usize> {
        let start = self.row_offsets[row].saturating_sub(1);
        let end = self.row_offsets[row + 1].saturating_sub(1);
        start..end
    }

    /// Row boundaries.
    #[inline]
    pub fn row_offsets(&self) -> &[usize] {
        &self.row_offsets
    }

    /// One-based column indices, one per slot.
    #[inline]
    pub fn column_indices(&self) -> &[usize] {
        &self.column_indices
    }

    /// Coefficients, one per slot.
    #[inline]
    pub fn values(&self) -> &[T] {
        &self.values
    }

    /// Backend scratch words.
    #[inline]
    pub fn workspace(&self) -> &[usize] {
        &self.workspace
    }

    /// Borrows every buffer mutably.
    #[inline]
    pub fn parts_mut(&mut self) -> RowStorageMut<'_, T> {
        RowStorageMut {
            row_offsets: &mut self.row_offsets,
            column_indices: &mut self.column_indices,
            values: &mut self.values,
            workspace: &mut self.workspace,
        }
    }
}

/// The call contract a compressed-row backend must honour.
///
/// Implementations are expected to be cheap, in-memory and bounded; the
/// builder never retries a call.
pub trait CompressedRowBackend<T: Scalar> {
    /// Prepares freshly zeroed buffers for insertion.
    fn initialize(&mut self, storage: &mut RowStorage<T>);

    /// Converts a build form into the compact form: each row contiguous,
    /// columns sorted and unique, `row_offsets` authoritative.
    fn finalize(&mut self, storage: &mut RowStorage<T>);

    /// Converts a compact form back into a build form.
    ///
    /// Any status above zero is fatal.
    fn reopen(&mut self, storage: &mut RowStorage<T>, diagnostics: DiagnosticLevel) -> Status;

    /// Stores or accumulates one entry of a build form.
    ///
    /// Statuses up to [`Status::ENTRY_UPDATED`] are successes.
    fn insert(
        &mut self,
        storage: &mut RowStorage<T>,
        entry: BackendEntry<T>,
        mode: InsertMode,
        diagnostics: DiagnosticLevel,
    ) -> Status;
}
