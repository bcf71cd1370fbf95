//! Domain error types
//!
//! Validation failures raised before any request reaches the vendor API.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Purchase quantity must be at least one
    #[error("Invalid quantity: {0} (must be a positive number)")]
    InvalidQuantity(u32),

    /// Number of SMS to show is outside the allowed range
    #[error("Invalid SMS count: {count} (must be between 1 and {max})")]
    InvalidSmsCount {
        /// The requested count
        count: usize,
        /// Upper bound accepted
        max: usize,
    },

    /// Search query is blank after trimming
    #[error("Empty search query")]
    EmptyQuery,

    /// Lookup found nothing matching the query
    #[error("Number not found: {0}")]
    NumberNotFound(String),
}
