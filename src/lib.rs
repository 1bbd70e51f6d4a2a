//! # `fem-sparse` - Incremental Compressed-Row Matrix Builder
//!
//! Assembles large, mostly-zero square matrices (finite-element stiffness
//! matrices and the like) one coefficient at a time, then exposes them in
//! compressed-row form for lookups and products.
//!
//! ## Guarantees
//!
//! ### Storage
//! - **Fixed reservation**: the number of stored entries is bounded by a
//!   reservation made before allocation. Running out is reported as
//!   [`SparseError::CapacityExceeded`], never papered over by a silent grow
//!   or a dropped entry.
//! - **All-or-nothing buffers**: row offsets, column indices, values and the
//!   backend workspace are allocated together and released together.
//! - **Phase safety**: storage is either empty, building or finalized.
//!   Buffers are only ever exposed in the finalized phase, and views borrow
//!   the builder so they cannot outlive a later mutation.
//!
//! ### Errors
//! - **Closed taxonomy**: every backend status code is classified at a single
//!   boundary ([`backend::status`]); callers never match on magic numbers.
//! - **No silent recovery**: out-of-range indices and size mismatches in
//!   multiplies are errors, not undefined reads.
//!
//! ## Architecture
//!
//! 1. **Backend contract** ([`CompressedRowBackend`]):
//!    - initialize / finalize / reopen / insert over fixed-size buffers
//!    - one-based row and column numbers
//!    - [`LinkedRowBackend`] is the native implementation
//!
//! 2. **Builder** ([`SparseMatrixBuilder`]):
//!    - explicit `Empty → Building → Finalized` phases
//!    - implicit, idempotent transitions on insert and read
//!    - matrix-vector and matrix-matrix products
//!
//! 3. **Assembly** ([`assembly`]):
//!    - scatter-add of dense element matrices
//!
//! ## Example
//!
//! ```rust
//! use fem_sparse::SparseMatrixBuilder;
//!
//! let mut matrix: SparseMatrixBuilder = SparseMatrixBuilder::with_capacity(3, 9);
//! for i in 0..3 {
//!     matrix.set(i, i, 1.0).unwrap();
//! }
//! matrix.add(0, 2, 0.5).unwrap();
//!
//! assert_eq!(matrix.get(0, 2).unwrap(), 0.5);
//! assert_eq!(matrix.multiply(&[2.0, 3.0, 4.0]).unwrap(), vec![4.0, 3.0, 4.0]);
//! ```

#![warn(missing_docs, clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]

pub mod assembly;
pub mod backend;
pub mod builder;
pub mod config;
pub mod error;
pub mod scalar;

pub use backend::{
    BackendEntry, CompressedRowBackend, DiagnosticLevel, InsertMode, LinkedRowBackend, RowStorage,
    Status, StatusKind,
};
pub use builder::{AssemblyStats, CompressedForm, CompressedRows, SparseMatrixBuilder, StorageState};
pub use config::BuilderConfig;
pub use error::{Result, SparseError};
pub use scalar::Scalar;

// Compile-time assertions for layout claims made in the docs.
const _: () = {
    use core::mem;

    // The native backend carries no state of its own.
    assert!(mem::size_of::<LinkedRowBackend>() == 0);

    // Status codes are a plain word.
    assert!(mem::size_of::<Status>() == mem::size_of::<u32>());
};
