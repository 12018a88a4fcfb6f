//! Error types for calibration, simulation and the file loaders

use thiserror::Error;

/// Errors raised by the scenario generator
#[derive(Debug, Error)]
pub enum EsgError {
    /// Malformed or degenerate data or parameters
    #[error("Invalid input: {field} - {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl EsgError {
    /// Shorthand for building an `InvalidInput` error
    pub fn invalid(field: impl Into<String>, reason: impl Into<String>) -> Self {
        EsgError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// True for the `InvalidInput` variant
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, EsgError::InvalidInput { .. })
    }
}

pub type EsgResult<T> = Result<T, EsgError>;
