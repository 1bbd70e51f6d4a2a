//! `SparseMatrixBuilder`: incremental assembly of a square compressed-row matrix.
//!
//! The builder moves through three phases:
//!
//! ```text
//!            initialize / first set|add            finalize / first read
//!   Empty  ----------------------------->  Building  ------------------>  Finalized
//!     ^                                      ^                              |
//!     |               clear                  |     unfinalize / set|add     |
//!     +--------------------------------------+------------------------------+
//! ```
//!
//! Insertions (`set`, `add`) need a build form and reopen a finalized matrix
//! on their own. Reads (`get`, compressed-form accessors, multiplies) need the
//! compact form and finalize on their own. The explicit `finalize` and
//! `unfinalize` calls are strict about the phase they start from; the
//! implicit transitions are idempotent.
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `set` / `add` | \(O(\text{row nnz})\) | Plus a reopen when finalized |
//! | `get` | \(O(\text{row nnz})\) | Plus a finalize when building |
//! | `multiply` | \(O(n + m)\) | Row-parallel with feature `parallel` |
//! | `multiply_matrix` | \(O(n^2 \cdot \bar{r} \cdot \bar{r}')\) | Dense sweep over result coordinates |

mod compressed;
mod multiply;
mod state;

pub use compressed::{CompressedForm, CompressedRows};
pub use state::{AssemblyStats, StorageState};

use tracing::{debug, warn};

use self::state::Phase;
use crate::backend::{
    BackendEntry, CompressedRowBackend, DiagnosticLevel, InsertMode, LinkedRowBackend, RowStorage,
    Status, StatusKind,
};
use crate::config::BuilderConfig;
use crate::error::{Result, SparseError};
use crate::scalar::Scalar;

/// An incrementally assembled square sparse matrix.
///
/// Owns the compressed-row buffers exclusively; they are allocated together
/// on `initialize` (or the first insertion) and released together on
/// `clear` or drop.
#[derive(Debug, Clone)]
pub struct SparseMatrixBuilder<T = f64, B = LinkedRowBackend> {
    order: usize,
    reserved_non_zeros: usize,
    phase: Phase<T>,
    insert_mode: InsertMode,
    diagnostics: DiagnosticLevel,
    stats: AssemblyStats,
    backend: B,
}

impl<T: Scalar, B: CompressedRowBackend<T> + Default> SparseMatrixBuilder<T, B> {
    /// Creates an empty builder with no dimensions.
    pub fn new() -> Self {
        Self::with_backend(0, 0, B::default())
    }

    /// Creates a builder of the given order. Storage stays unallocated until
    /// the reservation is known as well.
    pub fn with_order(order: usize) -> Self {
        Self::with_backend(order, 0, B::default())
    }

    /// Records both dimensions. Allocation is still deferred.
    pub fn with_capacity(order: usize, reserved_non_zeros: usize) -> Self {
        Self::with_backend(order, reserved_non_zeros, B::default())
    }

    /// Creates a builder described by `config`.
    pub fn from_config(config: &BuilderConfig) -> Self {
        let mut builder = Self::with_capacity(config.order, config.reserved_non_zeros);
        builder.diagnostics = config.diagnostics;
        builder
    }
}

impl<T: Scalar, B: CompressedRowBackend<T> + Default> Default for SparseMatrixBuilder<T, B> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Scalar, B: CompressedRowBackend<T>> SparseMatrixBuilder<T, B> {
    /// Creates a builder that drives `backend`.
    pub fn with_backend(order: usize, reserved_non_zeros: usize, backend: B) -> Self {
        Self {
            order,
            reserved_non_zeros,
            phase: Phase::Empty,
            insert_mode: InsertMode::default(),
            diagnostics: DiagnosticLevel::default(),
            stats: AssemblyStats::default(),
            backend,
        }
    }

    /// Matrix order.
    #[inline]
    pub fn order(&self) -> usize {
        self.order
    }

    /// Reserved non-zero capacity.
    #[inline]
    pub fn reserved_non_zeros(&self) -> usize {
        self.reserved_non_zeros
    }

    /// Current storage phase.
    #[inline]
    pub fn state(&self) -> StorageState {
        self.phase.state()
    }

    /// Mode used by the most recent insertion.
    #[inline]
    pub fn insert_mode(&self) -> InsertMode {
        self.insert_mode
    }

    /// Number of stored entries, whatever the phase.
    pub fn nnz(&self) -> usize {
        self.phase.storage().map_or(0, RowStorage::stored)
    }

    /// Per-instance counters.
    #[inline]
    pub fn stats(&self) -> AssemblyStats {
        self.stats
    }

    /// Diagnostic level forwarded to backend calls.
    #[inline]
    pub fn diagnostic_level(&self) -> DiagnosticLevel {
        self.diagnostics
    }

    /// Sets the diagnostic level forwarded to backend calls.
    pub fn set_diagnostic_level(&mut self, level: DiagnosticLevel) {
        self.diagnostics = level;
    }

    /// The backend driven by this builder.
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Changes the order of a builder without storage.
    ///
    /// # Errors
    /// `InvalidStateTransition` once storage exists.
    pub fn set_order(&mut self, order: usize) -> Result<()> {
        self.require_empty("set order")?;
        self.order = order;
        Ok(())
    }

    /// Changes the reservation of a builder without storage.
    ///
    /// # Errors
    /// `InvalidStateTransition` once storage exists.
    pub fn set_reserved_non_zeros(&mut self, reserved_non_zeros: usize) -> Result<()> {
        self.require_empty("set reserved non-zeros")?;
        self.reserved_non_zeros = reserved_non_zeros;
        Ok(())
    }

    /// Allocates zeroed buffers and hands them to the backend's initializer.
    ///
    /// Any existing storage is released first, so this also discards every
    /// stored entry.
    ///
    /// # Errors
    /// `InvalidDimensions` if the order or the reservation is zero.
    pub fn initialize(&mut self) -> Result<()> {
        if self.order == 0 || self.reserved_non_zeros == 0 {
            return Err(SparseError::InvalidDimensions {
                order: self.order,
                reserved_non_zeros: self.reserved_non_zeros,
            });
        }

        // Release the old buffers before allocating their replacement.
        self.phase = Phase::Empty;
        let mut storage = RowStorage::zeroed(self.order, self.reserved_non_zeros);
        self.backend.initialize(&mut storage);
        self.phase = Phase::Building(storage);
        self.stats = AssemblyStats::default();

        debug!(
            order = self.order,
            reserved_non_zeros = self.reserved_non_zeros,
            "initialized sparse storage"
        );
        Ok(())
    }

    /// Releases all storage and resets every setting to its default.
    pub fn clear(&mut self) {
        self.order = 0;
        self.reserved_non_zeros = 0;
        self.phase = Phase::Empty;
        self.insert_mode = InsertMode::default();
        self.diagnostics = DiagnosticLevel::default();
        self.stats = AssemblyStats::default();
    }

    /// Compacts the build form into the query-ready form.
    ///
    /// # Errors
    /// `InvalidStateTransition` unless the builder is `Building`.
    pub fn finalize(&mut self) -> Result<()> {
        if self.state() != StorageState::Building {
            return Err(self.invalid_transition("finalize"));
        }
        self.ensure_finalized();
        Ok(())
    }

    /// Reopens a finalized matrix for insertion.
    ///
    /// # Errors
    /// - `InvalidStateTransition` unless the builder is `Finalized`
    /// - `CapacityExceeded` if the backend cannot fit the structure back into
    ///   the reservation; the builder then stays `Finalized`
    pub fn unfinalize(&mut self) -> Result<()> {
        let Phase::Finalized(storage) = &mut self.phase else {
            return Err(self.invalid_transition("unfinalize"));
        };
        let status = self.backend.reopen(storage, self.diagnostics);
        match status.classify_reopen() {
            StatusKind::Success => {}
            StatusKind::CapacityTooSmall => {
                return Err(self.capacity_exceeded("unfinalize", status));
            }
            _ => {
                return Err(SparseError::UnrecognizedStatus {
                    operation: "unfinalize",
                    code: status.code(),
                })
            }
        }
        self.phase.unseal();
        debug!(nnz = self.nnz(), "reopened sparse storage");
        Ok(())
    }

    /// Writes `value` at `(row, col)`, replacing any stored value.
    ///
    /// Allocates storage on first use and reopens a finalized matrix.
    ///
    /// # Errors
    /// - `InvalidDimensions` if storage must be allocated but cannot be
    /// - `InvalidIndex` if `row` or `col` is not below the order
    /// - `CapacityExceeded` if the reservation has no room for a new entry
    pub fn set(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        self.insert(row, col, value, InsertMode::Replace, "set")?;
        self.stats.sets += 1;
        Ok(())
    }

    /// Adds `value` to the entry at `(row, col)`.
    ///
    /// Adding exactly zero returns immediately without touching storage, so
    /// it never creates an explicit zero entry.
    ///
    /// # Errors
    /// Same as [`set`](Self::set).
    pub fn add(&mut self, row: usize, col: usize, value: T) -> Result<()> {
        if value == T::zero() {
            return Ok(());
        }
        self.insert(row, col, value, InsertMode::Accumulate, "add")?;
        self.stats.adds += 1;
        Ok(())
    }

    /// Reads the entry at `(row, col)`, finalizing first if needed.
    ///
    /// A builder without storage is the zero matrix and answers zero for
    /// every coordinate. Should a row ever hold the same column twice, the
    /// last slot in the row wins.
    ///
    /// # Errors
    /// `InvalidIndex` if storage exists and the coordinate is out of range.
    pub fn get(&mut self, row: usize, col: usize) -> Result<T> {
        self.ensure_finalized();
        self.get_finalized(row, col)
    }

    /// Reads the entry at `(row, col)` without changing phase.
    ///
    /// This is the read path for shared borrows of a finalized matrix.
    ///
    /// # Errors
    /// - `InvalidStateTransition` while the builder is `Building`
    /// - `InvalidIndex` if the coordinate is out of range
    pub fn get_finalized(&self, row: usize, col: usize) -> Result<T> {
        let storage = match &self.phase {
            Phase::Empty => return Ok(T::zero()),
            Phase::Building(_) => return Err(self.invalid_transition("read")),
            Phase::Finalized(storage) => storage,
        };
        if row >= self.order || col >= self.order {
            return Err(SparseError::InvalidIndex {
                row,
                col,
                order: self.order,
            });
        }

        let range = storage.row_range(row);
        let one_based = col + 1;
        // Scanning from the back makes the last duplicate win.
        Ok(storage.column_indices()[range.clone()]
            .iter()
            .zip(&storage.values()[range])
            .rfind(|&(&c, _)| c == one_based)
            .map_or_else(T::zero, |(_, &value)| value))
    }

    /// Finalizes if needed and returns a view of the compressed form, or
    /// `None` when no storage exists.
    pub fn compressed_rows(&mut self) -> Option<CompressedRows<'_, T>> {
        self.ensure_finalized();
        self.phase.finalized().map(CompressedRows::new)
    }

    /// Finalizes if needed and returns the `order + 1` row offsets.
    pub fn row_offsets(&mut self) -> Option<&[usize]> {
        self.compressed_rows().map(|rows| rows.row_offsets())
    }

    /// Finalizes if needed and returns the one-based column indices.
    pub fn column_indices(&mut self) -> Option<&[usize]> {
        self.compressed_rows().map(|rows| rows.column_indices())
    }

    /// Finalizes if needed and returns the coefficients.
    pub fn values(&mut self) -> Option<&[T]> {
        self.compressed_rows().map(|rows| rows.values())
    }

    /// Adopts an externally assembled compressed form as a finalized matrix.
    ///
    /// The builder takes exclusive ownership of the buffers. The order
    /// becomes `row_offsets.len() - 1` and the reservation becomes
    /// `column_indices.len()`. Previous storage is released.
    ///
    /// # Errors
    /// Whatever [`CompressedForm::validate`] reports; the builder is
    /// unchanged in that case.
    pub fn set_compressed_form(&mut self, form: CompressedForm<T>) -> Result<()> {
        form.validate()?;
        self.order = form.order();
        self.reserved_non_zeros = form.column_indices.len();
        self.phase = Phase::Finalized(RowStorage::from_compressed(form));
        self.stats = AssemblyStats::default();
        debug!(order = self.order, nnz = self.nnz(), "adopted compressed form");
        Ok(())
    }

    /// Finalizes if needed and moves the buffers out, or `None` when no
    /// storage exists.
    pub fn into_compressed_form(mut self) -> Option<CompressedForm<T>> {
        self.ensure_finalized();
        match self.phase.take() {
            Phase::Finalized(storage) => Some(storage.into_compressed()),
            _ => None,
        }
    }

    /// Finalizes a `Building` matrix; a no-op in every other phase.
    pub(crate) fn ensure_finalized(&mut self) {
        if let Phase::Building(storage) = &mut self.phase {
            self.backend.finalize(storage);
            self.phase.seal();
            debug!(nnz = self.nnz(), "finalized sparse storage");
        }
    }

    pub(crate) fn finalized_storage(&self) -> Option<&RowStorage<T>> {
        self.phase.finalized()
    }

    fn insert(
        &mut self,
        row: usize,
        col: usize,
        value: T,
        mode: InsertMode,
        operation: &'static str,
    ) -> Result<()> {
        match self.state() {
            StorageState::Empty => self.initialize()?,
            StorageState::Finalized => self.unfinalize()?,
            StorageState::Building => {}
        }
        self.insert_mode = mode;

        let entry = BackendEntry {
            row: row.saturating_add(1),
            col: col.saturating_add(1),
            value,
        };
        let Phase::Building(storage) = &mut self.phase else {
            return Err(self.invalid_transition(operation));
        };
        let status = self.backend.insert(storage, entry, mode, self.diagnostics);

        match status.classify_insert() {
            StatusKind::Success => {
                self.stats.new_entries += 1;
                Ok(())
            }
            StatusKind::Informational => Ok(()),
            StatusKind::ImproperIndex => Err(SparseError::InvalidIndex {
                row,
                col,
                order: self.order,
            }),
            StatusKind::CapacityTooSmall => Err(self.capacity_exceeded(operation, status)),
            StatusKind::Unrecognized => Err(SparseError::UnrecognizedStatus {
                operation,
                code: status.code(),
            }),
        }
    }

    fn capacity_exceeded(&self, operation: &'static str, status: Status) -> SparseError {
        warn!(
            operation,
            %status,
            reserved_non_zeros = self.reserved_non_zeros,
            stats = %self.stats,
            "reserved non-zero capacity exhausted"
        );
        SparseError::CapacityExceeded {
            operation,
            reserved_non_zeros: self.reserved_non_zeros,
            stats: self.stats,
        }
    }

    fn invalid_transition(&self, operation: &'static str) -> SparseError {
        SparseError::InvalidStateTransition {
            operation,
            state: self.state(),
        }
    }

    fn require_empty(&self, operation: &'static str) -> Result<()> {
        match self.state() {
            StorageState::Empty => Ok(()),
            _ => Err(self.invalid_transition(operation)),
        }
    }
}
