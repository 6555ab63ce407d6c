//! Error types for the ledger.
//!
//! Every failure is a rejected operation: validation runs before any
//! mutation, so the ledger is unchanged when one of these is returned.

use crate::models::{ProcessId, ResourceId};
use thiserror::Error;

/// Result type alias for ledger operations.
pub type Result<T> = std::result::Result<T, LedgerError>;

/// Errors raised by entity lookups and argument validation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// No process with this id is registered.
    #[error("process {0} not found")]
    ProcessNotFound(ProcessId),

    /// No resource with this id is registered.
    #[error("resource {0} not found")]
    ResourceNotFound(ResourceId),

    /// An argument was outside its valid range.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl LedgerError {
    /// Returns `true` for unknown-process and unknown-resource errors.
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::ProcessNotFound(_) | Self::ResourceNotFound(_))
    }
}
