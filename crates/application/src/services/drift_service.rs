//! Drift service - serializes drift observations for one context
//!
//! Each observation updates the drift state under a mutex and commands the
//! directory's tree mode from the resulting transition.

use domain::{DriftPolicy, DriftState, DriftTransition, FailureZone};
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::discovery::ServiceDirectory;
use crate::error::ApplicationError;

/// Drift state of a conversion context
#[derive(Debug, Default)]
pub struct DriftService {
    state: Mutex<DriftState>,
}

impl DriftService {
    /// Create a drift service in the green zone
    ///
    /// # Errors
    ///
    /// Returns a domain error if the policy's thresholds are out of range.
    pub fn new(policy: DriftPolicy) -> Result<Self, ApplicationError> {
        policy.validate()?;
        Ok(Self {
            state: Mutex::new(DriftState::new(policy)),
        })
    }

    /// Observe one cycle's drift and command the tree mode
    ///
    /// # Errors
    ///
    /// Returns a domain `InvalidInput` error if `drift` is outside `[0, 1]`;
    /// neither the state nor the directory is touched in that case.
    pub fn observe(
        &self,
        drift: f32,
        directory: &ServiceDirectory,
    ) -> Result<DriftTransition, ApplicationError> {
        let mut state = self.state.lock();
        let transition = state.observe(drift)?;
        // zone and tree mode change under one guard
        directory.set_mode(transition.tree_mode);
        drop(state);

        if transition.cascade_limit_exceeded {
            warn!(
                drift,
                attempts = transition.recovery_attempts,
                "Recovery attempts exhausted, escalating to human validation"
            );
        } else if transition.zone != transition.previous_zone {
            info!(
                drift,
                from = %transition.previous_zone,
                to = %transition.zone,
                tree_mode = %transition.tree_mode,
                "Failure zone changed"
            );
        }
        Ok(transition)
    }

    /// Clear magnitude and recovery attempts after feedback
    pub fn reset_after_feedback(&self) {
        let mut state = self.state.lock();
        state.reset_after_feedback();
        info!(zone = %state.zone(), "Drift reset after human feedback");
    }

    /// Copy of the current state
    pub fn snapshot(&self) -> DriftState {
        self.state.lock().clone()
    }

    /// Coherence threshold currently in force
    pub fn coherence_threshold(&self) -> f32 {
        self.state.lock().coherence_threshold()
    }

    /// Current zone
    pub fn zone(&self) -> FailureZone {
        self.state.lock().zone()
    }

    /// Recovery attempts made since the last feedback
    pub fn recovery_attempts(&self) -> u8 {
        self.state.lock().recovery_attempts()
    }
}
