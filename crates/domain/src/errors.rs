//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DomainError {
    /// Null, empty, non-finite or out-of-range input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),

    /// Entity not found
    #[error("{entity_type} not found: {id}")]
    NotFound { entity_type: String, id: String },

    /// Entity already exists
    #[error("{entity_type} already exists: {id}")]
    Duplicate { entity_type: String, id: String },
}

impl DomainError {
    /// Create a not found error
    pub fn not_found(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::NotFound {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create a duplicate error
    pub fn duplicate(entity_type: impl Into<String>, id: impl Into<String>) -> Self {
        Self::Duplicate {
            entity_type: entity_type.into(),
            id: id.into(),
        }
    }

    /// Create an invalid input error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::InvalidInput(reason.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_creates_correct_error() {
        let err = DomainError::not_found("Service", "stt/transcribe");
        match err {
            DomainError::NotFound { entity_type, id } => {
                assert_eq!(entity_type, "Service");
                assert_eq!(id, "stt/transcribe");
            },
            _ => unreachable!("Expected NotFound error"),
        }
    }

    #[test]
    fn not_found_error_message_is_correct() {
        let err = DomainError::not_found("Service", "stt/transcribe");
        assert_eq!(err.to_string(), "Service not found: stt/transcribe");
    }

    #[test]
    fn duplicate_error_message_is_correct() {
        let err = DomainError::duplicate("Backend", "whisper");
        assert_eq!(err.to_string(), "Backend already exists: whisper");
    }

    #[test]
    fn invalid_input_error_message() {
        let err = DomainError::invalid_input("empty sample buffer");
        assert_eq!(err.to_string(), "Invalid input: empty sample buffer");
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("tolerance out of range".to_string());
        assert_eq!(err.to_string(), "Validation failed: tolerance out of range");
    }
}
