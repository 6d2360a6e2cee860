//! Error types for the health calculators
//!
//! None of these reach the end user: input errors become a silent
//! rejection and storage errors are logged by the persistence adapter.

use crate::units::UnitSystem;
use thiserror::Error;

/// Reasons a piece of user-entered text is not accepted into the input state
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InputError {
    #[error("Malformed numeric input: {0:?}")]
    Malformed(String),

    #[error("Value is not a finite number")]
    NonFinite,

    #[error("{field} must be within {min}..{max}, got {value}")]
    OutOfRange {
        field: &'static str,
        value: f64,
        min: f64,
        max: f64,
    },

    #[error("{field} is not an input in {unit_system} mode")]
    InactiveField {
        field: &'static str,
        unit_system: UnitSystem,
    },
}

/// Storage port error types
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Storage quota exceeded for key {0}")]
    QuotaExceeded(String),

    #[error("Storage IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
