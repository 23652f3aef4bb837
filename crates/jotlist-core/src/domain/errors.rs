//! Domain error types
//!
//! Validation failures for identifiers, records, and the working list.

use thiserror::Error;

/// Errors that can occur in domain operations
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Invalid item identifier format
    #[error("Invalid item id: {0}")]
    InvalidId(String),

    /// A local record whose version went backwards relative to its base
    #[error("Invalid record: version {version} is below base version {base_version}")]
    VersionBelowBase {
        /// The remote version the record is derived from
        base_version: u64,
        /// The record's own version counter
        version: u64,
    },

    /// An id was inserted twice into the working list
    #[error("Duplicate item id in working list: {0}")]
    DuplicateId(String),

    /// Generic validation failure
    #[error("Validation failed: {0}")]
    ValidationFailed(String),
}
