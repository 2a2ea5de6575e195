//! Domain error model.

use thiserror::Error;

/// Result type used across the domain layer.
pub type DomainResult<T> = Result<T, DomainError>;

/// Domain-level error.
///
/// Keep this focused on deterministic failures (validation, parsing).
/// Transport and service failures belong to the client crate.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// A value failed validation (e.g. blank ingredient text).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A routine label could not be parsed.
    #[error("invalid routine: {0}")]
    InvalidRoutine(String),
}

impl DomainError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn invalid_routine(msg: impl Into<String>) -> Self {
        Self::InvalidRoutine(msg.into())
    }
}
