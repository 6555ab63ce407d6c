//! Error types for the waitgraph engine.

use thiserror::Error;
use waitgraph_ledger::LedgerError;

/// Broad classification of a [`SimulatorError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unknown process or resource id.
    NotFound,
    /// Argument outside its valid range.
    InvalidArgument,
    /// Bad configuration.
    Config,
    /// Malformed or inconsistent scenario.
    Scenario,
    /// Filesystem failure while loading input.
    Io,
}

/// Core error type for engine operations.
#[derive(Debug, Error)]
pub enum SimulatorError {
    /// Lookup or validation failure from the ledger.
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Scenario error.
    #[error("Scenario error: {0}")]
    Scenario(String),

    /// I/O error while reading a file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl SimulatorError {
    /// Classifies the error.
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Ledger(e) if e.is_not_found() => ErrorKind::NotFound,
            Self::Ledger(_) => ErrorKind::InvalidArgument,
            Self::Config(_) => ErrorKind::Config,
            Self::Scenario(_) => ErrorKind::Scenario,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use waitgraph_ledger::ResourceId;

    #[test]
    fn test_kind_from_ledger() {
        let err: SimulatorError = LedgerError::ResourceNotFound(ResourceId::new()).into();
        assert_eq!(err.kind(), ErrorKind::NotFound);

        let err: SimulatorError = LedgerError::InvalidArgument("units".to_string()).into();
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);
        assert!(err.to_string().contains("units"));
    }

    #[test]
    fn test_config_display() {
        let err = SimulatorError::Config("lab_type is empty".to_string());
        assert_eq!(err.kind(), ErrorKind::Config);
        assert!(err.to_string().contains("lab_type"));
    }
}
