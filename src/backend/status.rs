//! Backend status codes and the one table that classifies them.
//!
//! | Code | Meaning |
//! |------|---------|
//! | 0 | success, new entry |
//! | 1..=700 | success with a note (700: existing entry updated) |
//! | 701 | improper row or column index |
//! | 702 | reservation too small to insert |
//! | 703 | reservation too small to reopen |
//! | >703 | unrecognized |

use core::fmt;

/// Raw numeric result of a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Status(u32);

/// What a [`Status`] means to the builder.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusKind {
    /// The call succeeded and created state.
    Success,
    /// The call succeeded; the code carries a note.
    Informational,
    /// Row or column outside the matrix.
    ImproperIndex,
    /// The reservation is too small.
    CapacityTooSmall,
    /// A fatal code the table does not know.
    Unrecognized,
}

impl Status {
    /// Success.
    pub const OK: Self = Self(0);
    /// An existing entry was replaced or accumulated into.
    pub const ENTRY_UPDATED: Self = Self(700);
    /// Row or column index out of range.
    pub const IMPROPER_INDEX: Self = Self(701);
    /// No free slot left for a new entry.
    pub const INSERT_CAPACITY: Self = Self(702);
    /// The compact structure does not fit the reservation.
    pub const REOPEN_CAPACITY: Self = Self(703);

    /// Wraps a raw code.
    #[inline]
    pub const fn new(code: u32) -> Self {
        Self(code)
    }

    /// The raw code.
    #[inline]
    pub const fn code(self) -> u32 {
        self.0
    }

    /// Classifies the result of an insert call. Codes up to 700 succeed.
    pub const fn classify_insert(self) -> StatusKind {
        match self.0 {
            0 => StatusKind::Success,
            1..=700 => StatusKind::Informational,
            _ => self.classify_fatal(),
        }
    }

    /// Classifies the result of a reopen call. Every non-zero code fails.
    pub const fn classify_reopen(self) -> StatusKind {
        match self.0 {
            0 => StatusKind::Success,
            _ => self.classify_fatal(),
        }
    }

    const fn classify_fatal(self) -> StatusKind {
        match self.0 {
            701 => StatusKind::ImproperIndex,
            702 | 703 => StatusKind::CapacityTooSmall,
            _ => StatusKind::Unrecognized,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self.0 {
            0 => "ok",
            700 => "existing entry updated",
            701 => "improper index of matrix",
            702 | 703 => "reserved non-zero capacity is too small",
            1..=699 => "note",
            _ => "unknown status",
        };
        write!(f, "{} ({})", text, self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_codes_up_to_700_succeed() {
        assert_eq!(Status::OK.classify_insert(), StatusKind::Success);
        assert_eq!(Status::new(1).classify_insert(), StatusKind::Informational);
        assert_eq!(Status::ENTRY_UPDATED.classify_insert(), StatusKind::Informational);
    }

    #[test]
    fn test_fatal_codes_are_classified() {
        assert_eq!(Status::IMPROPER_INDEX.classify_insert(), StatusKind::ImproperIndex);
        assert_eq!(Status::INSERT_CAPACITY.classify_insert(), StatusKind::CapacityTooSmall);
        assert_eq!(Status::REOPEN_CAPACITY.classify_reopen(), StatusKind::CapacityTooSmall);
        assert_eq!(Status::new(799).classify_insert(), StatusKind::Unrecognized);
    }

    #[test]
    fn test_reopen_treats_any_nonzero_as_fatal() {
        assert_eq!(Status::OK.classify_reopen(), StatusKind::Success);
        assert_eq!(Status::new(5).classify_reopen(), StatusKind::Unrecognized);
        assert_eq!(Status::ENTRY_UPDATED.classify_reopen(), StatusKind::Unrecognized);
    }

    #[test]
    fn test_display_names_the_condition() {
        assert_eq!(Status::IMPROPER_INDEX.to_string(), "improper index of matrix (701)");
        assert_eq!(Status::new(900).to_string(), "unknown status (900)");
    }
}
