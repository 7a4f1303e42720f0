//! Application-level errors

use ai_speech::SpeechError;
use domain::DomainError;
use thiserror::Error;

/// Errors that can occur in the application layer
///
/// Every error is scoped to a single conversion cycle; none of them leaves
/// the context unusable.
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Empty, mismatched or out-of-range input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A speech, media or validation collaborator failed
    #[error("Backend '{backend}' failed: {message}")]
    BackendFailure {
        /// Name of the failing collaborator
        backend: String,
        /// Failure reported by the collaborator
        message: String,
    },

    /// Recovery attempts are exhausted; a human must validate
    #[error("Drift cascade limit exceeded after {attempts} recovery attempts")]
    DriftCascadeLimitExceeded {
        /// Attempts made before escalation was forced
        attempts: u8,
    },

    /// Entity not found
    #[error("Not found: {0}")]
    NotFound(String),

    /// Entity already exists
    #[error("Already exists: {0}")]
    Duplicate(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Operation not valid in the current state
    #[error("Invalid operation: {0}")]
    InvalidOperation(String),
}

impl ApplicationError {
    /// Create a backend failure error
    pub fn backend_failure(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendFailure {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Whether the caller must route the cycle to a human
    pub const fn is_mandatory_escalation(&self) -> bool {
        matches!(self, Self::DriftCascadeLimitExceeded { .. })
    }
}

impl From<SpeechError> for ApplicationError {
    fn from(err: SpeechError) -> Self {
        match err {
            SpeechError::InvalidInput(msg) => Self::InvalidInput(msg),
            SpeechError::BackendFailure { backend, message } => {
                Self::BackendFailure { backend, message }
            },
            SpeechError::NotAvailable(name) => Self::NotFound(format!("speech backend {name}")),
            SpeechError::Registration(msg) | SpeechError::Configuration(msg) => {
                Self::Configuration(msg)
            },
            SpeechError::AudioProcessing(message) => Self::BackendFailure {
                backend: "media".to_string(),
                message,
            },
        }
    }
}
