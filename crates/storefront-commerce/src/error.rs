//! Commerce error types.

use thiserror::Error;

/// Errors raised at the input boundary of the domain layer.
///
/// The pure helpers in this crate never fail on odd data; they clamp or
/// ignore it. These errors are for inputs that must be rejected before
/// they reach any state.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommerceError {
    /// Quantity that cannot be sent to the cart.
    #[error("Invalid quantity: {0}")]
    InvalidQuantity(i64),

    /// Serialization error.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// Rejected input, such as an inverted price range.
    #[error("Validation error: {0}")]
    ValidationError(String),
}

impl From<serde_json::Error> for CommerceError {
    fn from(e: serde_json::Error) -> Self {
        CommerceError::SerializationError(e.to_string())
    }
}
