//! Error types shared by the configuration loader, the API client, and the URL generator.
//!
//! Every remote-call wrapper returns an [`OperationResult`], so callers only ever match on
//! a value and never have to catch anything for an expected failure mode.

use std::fmt;

/// A required configuration value was absent when it was needed.
///
/// The message names every missing environment variable, not just the first.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Missing required environment variables: {}", .missing.join(", "))]
pub struct ConfigError {
    /// Environment variable names, in the order they were checked.
    pub missing: Vec<&'static str>,
}

/// Which part of the system rejected an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A required configuration value is missing. Raised before any network attempt.
    Configuration,
    /// The remote service answered with a non-2xx status, or the request never completed.
    RemoteRequest,
    /// Locally detected bad input, such as an empty id or a missing customer code.
    InputValidation,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "configuration"),
            Self::RemoteRequest => write!(f, "remote request"),
            Self::InputValidation => write!(f, "input validation"),
        }
    }
}

/// The failure half of an [`OperationResult`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{message}")]
pub struct OperationError {
    pub kind: ErrorKind,
    pub message: String,
}

impl OperationError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn remote(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::RemoteRequest, message)
    }

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InputValidation, message)
    }
}

impl From<ConfigError> for OperationError {
    fn from(e: ConfigError) -> Self {
        Self::new(ErrorKind::Configuration, e.to_string())
    }
}

/// Uniform result of every remote-call wrapper.
pub type OperationResult<T> = Result<T, OperationError>;
