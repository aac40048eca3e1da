//! Error types
//!
//! Only loading can fail. Per-row resolution failures are data, see
//! [`crate::resolver::Reason`].

use crate::reference::SheetKind;
use thiserror::Error;

/// A reference table cannot be loaded.
///
/// Fatal to the load that raised it; the previously active snapshot stays in
/// place.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    /// One or more required columns are absent from a sheet
    #[error("{sheet} sheet is missing required columns: {}", .missing.join(", "))]
    MissingColumns {
        sheet: SheetKind,
        missing: Vec<&'static str>,
    },
}

/// Matching configuration is unreadable or out of range.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// A threshold lies outside the 0-100 score range
    #[error("threshold '{name}' must be in range [0, 100], got {value}")]
    InvalidThreshold { name: &'static str, value: f64 },

    /// A weight set has a negative member or does not sum to 1
    #[error("weights '{name}' must be non-negative and sum to 1.0, got sum {sum}")]
    InvalidWeights { name: &'static str, sum: f64 },

    #[error("'{name}' must be a finite non-negative number, got {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

/// Batch input headers lack a required address column.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ColumnLayoutError {
    #[error("input is missing required columns: {}", .missing.join(", "))]
    MissingColumns { missing: Vec<&'static str> },
}
