use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid hex string: {0}")]
    InvalidHex(String),

    #[error("invalid byte length: expected {expected}, got {actual}")]
    InvalidLength { expected: usize, actual: usize },

    #[error("amount overflow: {left} + {right} exceeds the representable range")]
    AmountOverflow { left: u64, right: u64 },

    #[error("amount underflow: {left} - {right} is negative")]
    AmountUnderflow { left: u64, right: u64 },

    #[error("invalid amount literal: {0}")]
    InvalidAmount(String),
}
