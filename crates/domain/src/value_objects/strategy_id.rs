//! Identifier of a processing strategy selected by service discovery

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Name of a backend strategy, resolved to an implementation by the registry
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct StrategyId(String);

impl StrategyId {
    /// Maximum length of a strategy name in bytes
    pub const MAX_LEN: usize = 64;

    /// Create a strategy identifier
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the name is blank or too long.
    pub fn new(name: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(DomainError::invalid_input("strategy name is empty"));
        }
        if trimmed.len() > Self::MAX_LEN {
            return Err(DomainError::invalid_input(format!(
                "strategy name exceeds {} bytes",
                Self::MAX_LEN
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The strategy name
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for StrategyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<String> for StrategyId {
    type Error = DomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<StrategyId> for String {
    fn from(id: StrategyId) -> Self {
        id.0
    }
}

impl AsRef<str> for StrategyId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trims_whitespace() {
        let id = StrategyId::new("  whisper ").unwrap();
        assert_eq!(id.as_str(), "whisper");
    }

    #[test]
    fn rejects_blank() {
        assert!(StrategyId::new("").is_err());
        assert!(StrategyId::new("   ").is_err());
    }

    #[test]
    fn rejects_overlong() {
        let name = "a".repeat(StrategyId::MAX_LEN + 1);
        assert!(StrategyId::new(name).is_err());
        assert!(StrategyId::new("a".repeat(StrategyId::MAX_LEN)).is_ok());
    }

    #[test]
    fn deserialization_validates() {
        let ok: StrategyId = serde_json::from_str("\"piper\"").unwrap();
        assert_eq!(ok.to_string(), "piper");
        assert!(serde_json::from_str::<StrategyId>("\"\"").is_err());
    }
}
