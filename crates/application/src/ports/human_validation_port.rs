//! Human validation port - Interface for routing escalated cycles to a reviewer

use async_trait::async_trait;
use domain::HumanFeedback;
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// A reviewer's answer to an escalation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "decision", content = "text")]
pub enum ValidationResponse {
    /// The output stands as produced
    Confirmed,
    /// The output is replaced by the given text
    Corrected(String),
    /// The cycle is dropped without releasing output
    Abandoned,
}

impl ValidationResponse {
    /// Apply this response to an escalation request
    ///
    /// Returns `None` when the reviewer abandoned the cycle.
    #[must_use]
    pub fn resolve(self, feedback: HumanFeedback) -> Option<HumanFeedback> {
        match self {
            Self::Confirmed => Some(feedback),
            Self::Corrected(text) => Some(feedback.with_correction(text)),
            Self::Abandoned => None,
        }
    }
}

/// Port for obtaining human validation of a suspended cycle
///
/// Implementations decide how the reviewer is reached and how long to wait;
/// a timeout should surface as [`ValidationResponse::Abandoned`].
#[cfg_attr(test, automock)]
#[async_trait]
pub trait HumanValidationPort: Send + Sync {
    /// Ask a reviewer to validate an escalated interpretation
    async fn request_validation(
        &self,
        feedback: HumanFeedback,
    ) -> Result<ValidationResponse, ApplicationError>;
}
