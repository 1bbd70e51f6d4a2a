//! A native backend that builds rows as singly linked slot lists.
//!
//! Build form:
//! - `row_offsets[r]` (for `r < order`): one-based slot of row `r`'s list head, `0` if empty
//! - `row_offsets[order]`: next free one-based slot
//! - slot `k`: column `column_indices[k]`, value `values[k]`, next link `workspace[k]`
//!
//! Insertion pushes new slots onto the front of a row's list, so the build
//! form never moves stored data. Finalization gathers each list, sorts it by
//! column, merges duplicate columns by summation and writes the compact
//! form back into the same buffers.
//!
//! ### Performance Characteristics
//! | Operation | Complexity | Notes |
//! |-----------|------------|-------|
//! | `insert` | \(O(\text{row nnz})\) | Scans the row list for an existing column |
//! | `finalize` | \(O(n + m \log m)\) | One scratch buffer of `m` entries |
//! | `reopen` | \(O(n + m)\) | Relinks slots in place |

use tracing::{debug, trace, warn};

use super::{BackendEntry, CompressedRowBackend, DiagnosticLevel, InsertMode, RowStorage, Status};
use crate::scalar::Scalar;

/// Linked-row build form with an in-place compact form.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LinkedRowBackend;

impl<T: Scalar> CompressedRowBackend<T> for LinkedRowBackend {
    fn initialize(&mut self, storage: &mut RowStorage<T>) {
        let order = storage.order();
        let parts = storage.parts_mut();
        parts.row_offsets.fill(0);
        parts.row_offsets[order] = 1;
        parts.column_indices.fill(0);
        parts.values.fill(T::zero());
        parts.workspace.fill(0);
    }

    fn finalize(&mut self, storage: &mut RowStorage<T>) {
        let order = storage.order();
        let stored = storage.stored();
        let parts = storage.parts_mut();

        let mut entries: Vec<(usize, T)> = Vec::with_capacity(stored);
        let mut bounds = Vec::with_capacity(order + 1);
        bounds.push(0);

        for row in 0..order {
            let start = entries.len();
            let mut link = parts.row_offsets[row];
            while link != 0 {
                let slot = link - 1;
                entries.push((parts.column_indices[slot], parts.values[slot]));
                link = parts.workspace[slot];
            }
            entries[start..].sort_unstable_by_key(|&(col, _)| col);
            merge_sorted_run(&mut entries, start);
            bounds.push(entries.len());
        }

        parts.column_indices.fill(0);
        parts.values.fill(T::zero());
        parts.workspace.fill(0);
        for (slot, &(col, value)) in entries.iter().enumerate() {
            parts.column_indices[slot] = col;
            parts.values[slot] = value;
        }
        for (offset, bound) in parts.row_offsets.iter_mut().zip(bounds) {
            *offset = bound + 1;
        }

        trace!(order, stored = entries.len(), "compacted linked rows");
    }

    fn reopen(&mut self, storage: &mut RowStorage<T>, diagnostics: DiagnosticLevel) -> Status {
        let order = storage.order();
        let capacity = storage.capacity();
        let stored = storage.stored();

        if stored > capacity {
            report_rejection(diagnostics, Status::REOPEN_CAPACITY, "reopen", order, capacity);
            return Status::REOPEN_CAPACITY;
        }

        let parts = storage.parts_mut();
        parts.workspace.fill(0);
        for row in 0..order {
            // `row_offsets[row + 1]` is still the compact boundary here; only
            // `row_offsets[row]` is rewritten on this iteration.
            let start = parts.row_offsets[row].saturating_sub(1);
            let end = parts.row_offsets[row + 1].saturating_sub(1);
            parts.row_offsets[row] = if start < end { start + 1 } else { 0 };
            for slot in start..end {
                parts.workspace[slot] = if slot + 1 < end { slot + 2 } else { 0 };
            }
        }
        parts.row_offsets[order] = stored + 1;

        if diagnostics.reports_calls() {
            debug!(order, stored, "reopened compact rows for insertion");
        }
        Status::OK
    }

    fn insert(
        &mut self,
        storage: &mut RowStorage<T>,
        entry: BackendEntry<T>,
        mode: InsertMode,
        diagnostics: DiagnosticLevel,
    ) -> Status {
        let order = storage.order();
        let capacity = storage.capacity();
        let BackendEntry { row, col, value } = entry;

        if row == 0 || row > order || col == 0 || col > order {
            report_rejection(diagnostics, Status::IMPROPER_INDEX, "insert", order, capacity);
            return Status::IMPROPER_INDEX;
        }

        let parts = storage.parts_mut();
        let mut link = parts.row_offsets[row - 1];
        while link != 0 {
            let slot = link - 1;
            if parts.column_indices[slot] == col {
                parts.values[slot] = match mode {
                    InsertMode::Replace => value,
                    InsertMode::Accumulate => parts.values[slot] + value,
                };
                if diagnostics.reports_calls() {
                    trace!(row, col, ?mode, "updated existing entry");
                }
                return Status::ENTRY_UPDATED;
            }
            link = parts.workspace[slot];
        }

        let free = parts.row_offsets[order];
        if free > capacity {
            report_rejection(diagnostics, Status::INSERT_CAPACITY, "insert", order, capacity);
            return Status::INSERT_CAPACITY;
        }

        let slot = free - 1;
        parts.column_indices[slot] = col;
        parts.values[slot] = value;
        parts.workspace[slot] = parts.row_offsets[row - 1];
        parts.row_offsets[row - 1] = free;
        parts.row_offsets[order] = free + 1;

        if diagnostics.reports_calls() {
            trace!(row, col, slot = free, "stored new entry");
        }
        Status::OK
    }
}

/// Folds equal adjacent columns of `entries[start..]` into one entry.
fn merge_sorted_run<T: Scalar>(entries: &mut Vec<(usize, T)>, start: usize) {
    let mut write = start;
    for read in start..entries.len() {
        if write > start && entries[write - 1].0 == entries[read].0 {
            entries[write - 1].1 = entries[write - 1].1 + entries[read].1;
        } else {
            entries[write] = entries[read];
            write += 1;
        }
    }
    entries.truncate(write);
}

fn report_rejection(
    diagnostics: DiagnosticLevel,
    status: Status,
    call: &'static str,
    order: usize,
    capacity: usize,
) {
    if diagnostics.reports_errors() {
        warn!(%status, call, order, capacity, "compressed-row backend rejected call");
    }
}
