//! Error taxonomy for scenario execution.
//!
//! Only configuration errors found while wiring a plan abort a run; every other
//! variant stays local to the scenario that raised it.
use thiserror::Error;

/// Failure raised while building, sending, or checking a scenario request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HarnessError {
    /// Malformed scenario wiring: unresolved path parameter, duplicate output
    /// key, dangling prerequisite.
    #[error("configuration error: {0}")]
    Configuration(String),
    /// The transport could not produce a complete response.
    #[error(transparent)]
    Transport(#[from] TransportError),
    /// Status or field assertion mismatch.
    #[error("contract violation: {0}")]
    ContractViolation(String),
    /// A prerequisite scenario did not pass or a shared value is missing.
    #[error("prerequisite unmet: {0}")]
    PrerequisiteUnmet(String),
}

impl HarnessError {
    pub fn configuration(message: impl Into<String>) -> Self {
        HarnessError::Configuration(message.into())
    }

    pub fn contract(message: impl Into<String>) -> Self {
        HarnessError::ContractViolation(message.into())
    }

    pub fn prerequisite(message: impl Into<String>) -> Self {
        HarnessError::PrerequisiteUnmet(message.into())
    }
}

/// Transport failure classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportErrorKind {
    Connect,
    Timeout,
    Protocol,
}

impl TransportErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransportErrorKind::Connect => "connect",
            TransportErrorKind::Timeout => "timeout",
            TransportErrorKind::Protocol => "protocol",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("transport error ({}): {message}", kind.as_str())]
pub struct TransportError {
    pub kind: TransportErrorKind,
    pub message: String,
}

impl TransportError {
    pub fn new(kind: TransportErrorKind, message: impl Into<String>) -> Self {
        TransportError {
            kind,
            message: message.into(),
        }
    }
}
