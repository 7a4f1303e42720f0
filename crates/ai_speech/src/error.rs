//! Speech processing errors

use domain::DomainError;
use thiserror::Error;

/// Errors that can occur during speech processing
#[derive(Debug, Error)]
pub enum SpeechError {
    /// Empty, mismatched or out-of-range input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A speech backend or media collaborator failed
    #[error("Backend '{backend}' failed: {message}")]
    BackendFailure {
        /// Name of the failing backend
        backend: String,
        /// Failure reported by the backend
        message: String,
    },

    /// Backend not registered or lacking the requested capability
    #[error("Backend not available: {0}")]
    NotAvailable(String),

    /// Backend registration rejected
    #[error("Registration rejected: {0}")]
    Registration(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Audio processing/decoding failed
    #[error("Audio processing failed: {0}")]
    AudioProcessing(String),
}

impl SpeechError {
    /// Create a backend failure error
    pub fn backend_failure(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::BackendFailure {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}

impl From<DomainError> for SpeechError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidInput(msg) | DomainError::ValidationError(msg) => {
                Self::InvalidInput(msg)
            },
            other => Self::InvalidInput(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_error_message() {
        let err = SpeechError::invalid_input("empty sample buffer");
        assert_eq!(err.to_string(), "Invalid input: empty sample buffer");
    }

    #[test]
    fn backend_failure_error_message() {
        let err = SpeechError::backend_failure("whisper", "model crashed");
        assert_eq!(err.to_string(), "Backend 'whisper' failed: model crashed");
    }

    #[test]
    fn not_available_error_message() {
        let err = SpeechError::NotAvailable("piper".to_string());
        assert_eq!(err.to_string(), "Backend not available: piper");
    }

    #[test]
    fn registration_error_message() {
        let err = SpeechError::Registration("duplicate name: whisper".to_string());
        assert_eq!(err.to_string(), "Registration rejected: duplicate name: whisper");
    }

    #[test]
    fn configuration_error_message() {
        let err = SpeechError::Configuration("sample rate is zero".to_string());
        assert_eq!(err.to_string(), "Configuration error: sample rate is zero");
    }

    #[test]
    fn audio_processing_error_message() {
        let err = SpeechError::AudioProcessing("ffmpeg exited with 1".to_string());
        assert_eq!(err.to_string(), "Audio processing failed: ffmpeg exited with 1");
    }

    #[test]
    fn domain_invalid_input_keeps_message() {
        let err: SpeechError = DomainError::invalid_input("NaN coordinate").into();
        assert_eq!(err.to_string(), "Invalid input: NaN coordinate");
    }
}
