//! Error types for the E2E harness
//!
//! `Error` covers faults that end a run outright: malformed workflows,
//! configuration problems and I/O. Network-level failures of individual
//! requests are `TransportError`s; the step executor classifies those into
//! step outcomes and they never surface as `Error`.

use thiserror::Error;

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the harness
#[derive(Error, Debug)]
pub enum Error {
    // === Workflow Authoring Errors ===
    #[error("Workflow reads state key '{key}' before any step writes it")]
    MissingState { key: String },

    #[error("Invalid workflow: {0}")]
    InvalidWorkflow(String),

    #[error("Invalid template: {0}")]
    InvalidTemplate(String),

    // === Configuration Errors ===
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration file: {0}")]
    ConfigParse(String),

    #[error("Failed to parse scenario: {0}")]
    ScenarioParse(String),

    // === HTTP Setup Errors ===
    #[error("Failed to build HTTP client: {0}")]
    HttpClientBuild(String),

    // === IO Errors ===
    #[error("Failed to read file '{path}': {error}")]
    FileRead { path: String, error: String },

    // === Internal Errors ===
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Create a missing state error for a context key
    pub fn missing_state(key: &str) -> Self {
        Self::MissingState {
            key: key.to_string(),
        }
    }

    /// Create a file read error
    pub fn file_read(path: &std::path::Path, error: impl std::fmt::Display) -> Self {
        Self::FileRead {
            path: path.display().to_string(),
            error: error.to_string(),
        }
    }

    /// Whether this error means the workflow definition itself is broken
    pub fn is_authoring_bug(&self) -> bool {
        matches!(
            self,
            Error::MissingState { .. } | Error::InvalidWorkflow(_) | Error::InvalidTemplate(_)
        )
    }
}

/// Failure to obtain any HTTP response at all
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),

    #[error("failed to read response body: {0}")]
    Body(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            TransportError::Timeout(e.to_string())
        } else if e.is_connect() {
            TransportError::Connect(e.to_string())
        } else if e.is_body() || e.is_decode() {
            TransportError::Body(e.to_string())
        } else {
            TransportError::Request(e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_state_message_names_key() {
        let err = Error::missing_state("expenseId");
        assert_eq!(
            err.to_string(),
            "Workflow reads state key 'expenseId' before any step writes it"
        );
        assert!(err.is_authoring_bug());
    }

    #[test]
    fn test_config_errors_are_not_authoring_bugs() {
        assert!(!Error::Config("bad".into()).is_authoring_bug());
        assert!(!Error::HttpClientBuild("tls".into()).is_authoring_bug());
    }

    #[test]
    fn test_transport_error_display() {
        let err = TransportError::Connect("Connection refused".into());
        assert_eq!(err.to_string(), "connection failed: Connection refused");
    }

    #[test]
    fn test_file_read_names_the_path() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "No such file");
        let err = Error::file_read(std::path::Path::new("/tmp/journey.yaml"), io);
        assert_eq!(
            err.to_string(),
            "Failed to read file '/tmp/journey.yaml': No such file"
        );
        assert!(!err.is_authoring_bug());
    }
}
