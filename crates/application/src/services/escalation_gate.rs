//! Escalation gate - decides when a human has to look at the output
//!
//! The gate compares backend confidence against a fixed confirmation
//! threshold, builds the feedback request on escalation, and folds a
//! reviewer's answer back into the context.

use domain::HumanFeedback;
use tracing::{debug, info};

use super::conversion_context::ConversionContext;
use super::drift_service::DriftService;
use crate::error::ApplicationError;

/// Confidence gate in front of every released output
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EscalationGate {
    confirmation_threshold: f32,
}

impl Default for EscalationGate {
    fn default() -> Self {
        Self {
            confirmation_threshold: Self::DEFAULT_CONFIRMATION_THRESHOLD,
        }
    }
}

impl EscalationGate {
    /// Confidence below which confirmation is required
    pub const DEFAULT_CONFIRMATION_THRESHOLD: f32 = 0.85;

    /// Create a gate with a custom threshold
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidInput` if the threshold is outside
    /// `[0, 1]`.
    pub fn new(confirmation_threshold: f32) -> Result<Self, ApplicationError> {
        if !(0.0..=1.0).contains(&confirmation_threshold) {
            return Err(ApplicationError::InvalidInput(format!(
                "confirmation threshold {confirmation_threshold} must be within [0, 1]"
            )));
        }
        Ok(Self {
            confirmation_threshold,
        })
    }

    /// Threshold in force
    #[must_use]
    pub const fn confirmation_threshold(&self) -> f32 {
        self.confirmation_threshold
    }

    /// Whether `confidence` is too low to release without a human
    ///
    /// A confidence that is not a number always requires confirmation.
    #[must_use]
    pub fn requires_confirmation(&self, confidence: f32) -> bool {
        confidence.is_nan() || confidence < self.confirmation_threshold
    }

    /// Build the feedback request for an escalated interpretation
    ///
    /// The request carries the drift state's coherence threshold as it was
    /// at escalation time.
    #[must_use]
    pub fn escalate(&self, original_interpretation: &str, drift: &DriftService) -> HumanFeedback {
        let threshold = drift.coherence_threshold();
        debug!(threshold, "Escalating to human validation");
        HumanFeedback::escalation(original_interpretation, threshold)
    }

    /// Fold a reviewer's answer into the context
    ///
    /// A non-blank correction moves the coordinate towards formality and
    /// evolution. Drift magnitude and recovery attempts are always reset.
    /// Returns whether a correction was applied.
    pub fn incorporate(&self, ctx: &ConversionContext, feedback: &HumanFeedback) -> bool {
        let corrected = feedback.has_correction();
        if corrected {
            let coordinate = ctx.nudge_coordinate();
            info!(coordinate = %coordinate, "Incorporated human correction");
        }
        ctx.drift().reset_after_feedback();
        corrected
    }
}
