//! Key identifying a registered service operation

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Maximum length of either key component in bytes
const MAX_COMPONENT_LEN: usize = 64;

/// `(service, operation)` pair ordering the discovery tree
///
/// Ordering is lexicographic on the service name, then the operation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ServiceKey {
    service: String,
    operation: String,
}

impl ServiceKey {
    /// Create a service key
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if either component is empty or
    /// longer than 64 bytes.
    pub fn new(
        service: impl Into<String>,
        operation: impl Into<String>,
    ) -> Result<Self, DomainError> {
        let service = service.into();
        let operation = operation.into();
        validate_component("service", &service)?;
        validate_component("operation", &operation)?;
        Ok(Self { service, operation })
    }

    /// Service name
    #[must_use]
    pub fn service(&self) -> &str {
        &self.service
    }

    /// Operation name
    #[must_use]
    pub fn operation(&self) -> &str {
        &self.operation
    }
}

fn validate_component(what: &str, value: &str) -> Result<(), DomainError> {
    if value.is_empty() {
        return Err(DomainError::invalid_input(format!("{what} name is empty")));
    }
    if value.len() > MAX_COMPONENT_LEN {
        return Err(DomainError::invalid_input(format!(
            "{what} name exceeds {MAX_COMPONENT_LEN} bytes"
        )));
    }
    Ok(())
}

impl fmt::Display for ServiceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.service, self.operation)
    }
}
