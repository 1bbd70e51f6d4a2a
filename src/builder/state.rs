//! Storage phases and per-instance counters.

use core::fmt;
use core::mem;

use serde::{Deserialize, Serialize};

use crate::backend::RowStorage;

/// Observable phase of a builder's storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageState {
    /// No buffers are allocated.
    Empty,
    /// Buffers hold a build form and accept insertions.
    Building,
    /// Buffers hold the compact, query-ready form.
    Finalized,
}

impl fmt::Display for StorageState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Building => "building",
            Self::Finalized => "finalized",
        })
    }
}

/// Buffers tagged with the phase they are in.
///
/// Carrying the storage inside the variant makes "finalized but not
/// initialized" and "half the buffers allocated" unrepresentable.
#[derive(Debug, Clone)]
pub(crate) enum Phase<T> {
    Empty,
    Building(RowStorage<T>),
    Finalized(RowStorage<T>),
}

impl<T> Phase<T> {
    pub(crate) fn state(&self) -> StorageState {
        match self {
            Self::Empty => StorageState::Empty,
            Self::Building(_) => StorageState::Building,
            Self::Finalized(_) => StorageState::Finalized,
        }
    }

    pub(crate) fn storage(&self) -> Option<&RowStorage<T>> {
        match self {
            Self::Empty => None,
            Self::Building(storage) | Self::Finalized(storage) => Some(storage),
        }
    }

    pub(crate) fn finalized(&self) -> Option<&RowStorage<T>> {
        match self {
            Self::Finalized(storage) => Some(storage),
            _ => None,
        }
    }

    /// `Building` → `Finalized`; other phases are left alone.
    pub(crate) fn seal(&mut self) {
        *self = match mem::replace(self, Self::Empty) {
            Self::Building(storage) => Self::Finalized(storage),
            other => other,
        };
    }

    /// `Finalized` → `Building`; other phases are left alone.
    pub(crate) fn unseal(&mut self) {
        *self = match mem::replace(self, Self::Empty) {
            Self::Finalized(storage) => Self::Building(storage),
            other => other,
        };
    }

    pub(crate) fn take(&mut self) -> Self {
        mem::replace(self, Self::Empty)
    }
}

/// Counters kept by each builder instance.
///
/// Reset by `initialize` and `clear`. Zero-valued `add` calls are not
/// counted, since they do not touch the builder at all.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AssemblyStats {
    /// Successful `set` calls.
    pub sets: usize,
    /// Successful `add` calls.
    pub adds: usize,
    /// Calls that created a new stored entry.
    pub new_entries: usize,
}

impl fmt::Display for AssemblyStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} sets, {} adds, {} entries created",
            self.sets, self.adds, self.new_entries
        )
    }
}
