//! Error types for PRISM core operations

use thiserror::Error;

/// Invalid input to a core operation.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum PrismError {
    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: &'static str,
        value: f64,
        reason: &'static str,
    },
}

pub type PrismResult<T> = Result<T, PrismError>;
