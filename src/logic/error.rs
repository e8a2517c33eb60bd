//! Error handling

use thiserror::Error;

pub type HealthResult<T> = Result<T, HealthError>;

#[derive(Debug, Error)]
pub enum HealthError {
    /// Malformed sample or invalid parameter
    #[error("Validation error: {0}")]
    Validation(String),

    /// Batch too small to normalize or score
    #[error("Insufficient data: need at least {required} samples, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// No history log for the requested subject
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A history row could not be read or written
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

impl HealthError {
    pub fn validation(msg: impl Into<String>) -> Self {
        HealthError::Validation(msg.into())
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, HealthError::NotFound(_))
    }
}
