//! Serializable builder settings.

use serde::{Deserialize, Serialize};

use crate::backend::DiagnosticLevel;
use crate::error::{Result, SparseError};

/// Dimensions and diagnostics for a [`SparseMatrixBuilder`](crate::SparseMatrixBuilder).
///
/// ```
/// use fem_sparse::{BuilderConfig, DiagnosticLevel};
///
/// let config = BuilderConfig::from_json(
///     r#"{ "order": 100, "reserved_non_zeros": 500, "diagnostics": "errors" }"#,
/// ).unwrap();
/// assert_eq!(config.order, 100);
/// assert_eq!(config.diagnostics, DiagnosticLevel::Errors);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BuilderConfig {
    /// Matrix order
    pub order: usize,
    /// Upper bound on stored entries
    pub reserved_non_zeros: usize,
    /// Level forwarded to backend calls
    #[serde(default)]
    pub diagnostics: DiagnosticLevel,
}

impl BuilderConfig {
    /// Creates a silent configuration.
    pub fn new(order: usize, reserved_non_zeros: usize) -> Self {
        Self {
            order,
            reserved_non_zeros,
            diagnostics: DiagnosticLevel::Silent,
        }
    }

    /// Returns a copy with a different diagnostic level.
    #[must_use]
    pub fn with_diagnostics(mut self, diagnostics: DiagnosticLevel) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// Parses a JSON description.
    ///
    /// # Errors
    /// `Config` if the text is not a valid description.
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Serializes to pretty-printed JSON.
    ///
    /// # Errors
    /// `Config` if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Checks that storage could be allocated from this configuration.
    ///
    /// # Errors
    /// `InvalidDimensions` if either dimension is zero.
    pub fn validate(&self) -> Result<()> {
        if self.order == 0 || self.reserved_non_zeros == 0 {
            return Err(SparseError::InvalidDimensions {
                order: self.order,
                reserved_non_zeros: self.reserved_non_zeros,
            });
        }
        Ok(())
    }
}
