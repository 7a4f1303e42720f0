//! Human feedback record produced on escalation

use serde::{Deserialize, Serialize};

/// A request for, and eventually the answer to, human validation
///
/// Created when a cycle escalates, consumed once when incorporated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HumanFeedback {
    /// Whether the reviewer must confirm before output is released
    pub requires_confirmation: bool,
    /// Coherence threshold in force when the escalation was raised
    pub confidence_threshold: f32,
    /// Correction offered by the reviewer, if any
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggested_correction: Option<String>,
    /// What the system produced before asking for help
    pub original_interpretation: String,
}

impl HumanFeedback {
    /// Build an escalation request for an interpretation
    pub fn escalation(original_interpretation: impl Into<String>, confidence_threshold: f32) -> Self {
        Self {
            requires_confirmation: true,
            confidence_threshold,
            suggested_correction: None,
            original_interpretation: original_interpretation.into(),
        }
    }

    /// Attach a reviewer correction
    #[must_use]
    pub fn with_correction(mut self, correction: impl Into<String>) -> Self {
        self.suggested_correction = Some(correction.into());
        self
    }

    /// The correction, if one was supplied and it is not blank
    #[must_use]
    pub fn correction(&self) -> Option<&str> {
        self.suggested_correction
            .as_deref()
            .filter(|c| !c.trim().is_empty())
    }

    /// Whether incorporation will move the coordinate
    #[must_use]
    pub fn has_correction(&self) -> bool {
        self.correction().is_some()
    }

    /// Text to release once the feedback is resolved
    ///
    /// The correction when there is one, otherwise the original.
    #[must_use]
    pub fn resolved_text(&self) -> &str {
        self.correction().unwrap_or(&self.original_interpretation)
    }
}
