//! Drift state machine
//!
//! One [`DriftState`] exists per conversion context. Each cycle feeds it a
//! drift magnitude; the resulting [`DriftTransition`] tells the caller which
//! tree mode to command and whether a human has to validate the output.
//!
//! Recovery attempts only ever grow until feedback is incorporated. Once the
//! cap is reached, every further stressed cycle is escalated to a human.

use serde::{Deserialize, Serialize};

use crate::{
    errors::DomainError,
    value_objects::{DEFAULT_COHERENCE_THRESHOLD, FailureZone, TreeMode},
};

/// Tunables of the drift state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftPolicy {
    /// Threshold restored in the green zone
    pub coherence_threshold: f32,
    /// Threshold applied while the automated side is under stress
    pub ai_stress_threshold: f32,
    /// Automatic recovery attempts allowed before escalation is forced
    pub recovery_cap: u8,
}

impl DriftPolicy {
    /// Default threshold applied in the AI stress zone
    pub const DEFAULT_AI_STRESS_THRESHOLD: f32 = 0.85;
    /// Default recovery attempt cap
    pub const DEFAULT_RECOVERY_CAP: u8 = 3;

    /// Check thresholds are within `[0, 1]`
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` naming the offending field.
    pub fn validate(&self) -> Result<(), DomainError> {
        if !(0.0..=1.0).contains(&self.coherence_threshold) {
            return Err(DomainError::ValidationError(
                "coherence_threshold must be within [0, 1]".to_string(),
            ));
        }
        if !(0.0..=1.0).contains(&self.ai_stress_threshold) {
            return Err(DomainError::ValidationError(
                "ai_stress_threshold must be within [0, 1]".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for DriftPolicy {
    fn default() -> Self {
        Self {
            coherence_threshold: DEFAULT_COHERENCE_THRESHOLD,
            ai_stress_threshold: Self::DEFAULT_AI_STRESS_THRESHOLD,
            recovery_cap: Self::DEFAULT_RECOVERY_CAP,
        }
    }
}

/// Outcome of feeding one drift observation into the state machine
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DriftTransition {
    /// Zone before the observation
    pub previous_zone: FailureZone,
    /// Zone after the observation, including forced escalation
    pub zone: FailureZone,
    /// `drift * 24 - 12`
    pub failure_magnitude: f32,
    /// Tree mode the caller should command
    pub tree_mode: TreeMode,
    /// Coherence threshold after the observation
    pub coherence_threshold: f32,
    /// An automatic recovery attempt was started
    pub cascade: bool,
    /// Attempts were exhausted and escalation was forced
    pub cascade_limit_exceeded: bool,
    /// Output of this cycle must be validated by a human
    pub requires_human_validation: bool,
    /// Recovery attempts after the observation
    pub recovery_attempts: u8,
}

/// Drift bookkeeping for one conversion context
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DriftState {
    magnitude: f32,
    coherence_threshold: f32,
    zone: FailureZone,
    recovery_attempts: u8,
    policy: DriftPolicy,
}

impl DriftState {
    /// Create a drift state in the green zone
    #[must_use]
    pub const fn new(policy: DriftPolicy) -> Self {
        Self {
            magnitude: 0.0,
            coherence_threshold: policy.coherence_threshold,
            zone: FailureZone::Green,
            recovery_attempts: 0,
            policy,
        }
    }

    /// Last observed drift magnitude
    #[must_use]
    pub const fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// Coherence threshold currently in force
    #[must_use]
    pub const fn coherence_threshold(&self) -> f32 {
        self.coherence_threshold
    }

    /// Current zone
    #[must_use]
    pub const fn zone(&self) -> FailureZone {
        self.zone
    }

    /// Automatic recovery attempts since the last incorporated feedback
    #[must_use]
    pub const fn recovery_attempts(&self) -> u8 {
        self.recovery_attempts
    }

    /// Policy in force
    #[must_use]
    pub const fn policy(&self) -> &DriftPolicy {
        &self.policy
    }

    /// Feed one drift observation into the state machine
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if `drift` is NaN or outside
    /// `[0, 1]`. The state is left untouched in that case.
    pub fn observe(&mut self, drift: f32) -> Result<DriftTransition, DomainError> {
        if !(0.0..=1.0).contains(&drift) {
            return Err(DomainError::invalid_input(format!(
                "drift magnitude must be within [0, 1], got {drift}"
            )));
        }

        let previous_zone = self.zone;
        let failure_magnitude = FailureZone::failure_magnitude(drift);
        let mut cascade = false;
        let mut cascade_limit_exceeded = false;

        let (zone, tree_mode) = match FailureZone::classify(drift) {
            FailureZone::AiStress => {
                self.coherence_threshold = self.policy.ai_stress_threshold;
                if self.recovery_attempts < self.policy.recovery_cap {
                    cascade = true;
                    self.recovery_attempts += 1;
                    (FailureZone::AiStress, TreeMode::Relaxed)
                } else {
                    cascade_limit_exceeded = true;
                    (FailureZone::HumanStress, TreeMode::Strict)
                }
            },
            FailureZone::HumanStress => (FailureZone::HumanStress, TreeMode::Strict),
            FailureZone::Green => {
                self.coherence_threshold = self.policy.coherence_threshold;
                (FailureZone::Green, TreeMode::Hybrid)
            },
        };

        self.magnitude = drift;
        self.zone = zone;

        Ok(DriftTransition {
            previous_zone,
            zone,
            failure_magnitude,
            tree_mode,
            coherence_threshold: self.coherence_threshold,
            cascade,
            cascade_limit_exceeded,
            requires_human_validation: zone.requires_human(),
            recovery_attempts: self.recovery_attempts,
        })
    }

    /// Clear drift bookkeeping after human feedback was incorporated
    ///
    /// Resets the magnitude and the recovery attempts. Zone and threshold
    /// are re-derived on the next observation.
    pub fn reset_after_feedback(&mut self) {
        self.magnitude = 0.0;
        self.recovery_attempts = 0;
    }
}

impl Default for DriftState {
    fn default() -> Self {
        Self::new(DriftPolicy::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_green_with_default_threshold() {
        let state = DriftState::default();
        assert_eq!(state.zone(), FailureZone::Green);
        assert_eq!(state.recovery_attempts(), 0);
        assert!((state.coherence_threshold() - 0.954).abs() < f32::EPSILON);
    }

    #[test]
    fn green_observation_selects_hybrid_and_restores_threshold() {
        let mut state = DriftState::default();
        state.observe(0.1).unwrap();
        let t = state.observe(0.5).unwrap();
        assert_eq!(t.previous_zone, FailureZone::AiStress);
        assert_eq!(t.zone, FailureZone::Green);
        assert_eq!(t.tree_mode, TreeMode::Hybrid);
        assert!((t.coherence_threshold - 0.954).abs() < f32::EPSILON);
        assert!(!t.requires_human_validation);
        assert_eq!(state.recovery_attempts(), 1);
    }

    #[test]
    fn ai_stress_cascades_and_lowers_threshold() {
        let mut state = DriftState::default();
        let t = state.observe(0.2).unwrap();
        assert_eq!(t.zone, FailureZone::AiStress);
        assert_eq!(t.tree_mode, TreeMode::Relaxed);
        assert!(t.cascade);
        assert!(!t.cascade_limit_exceeded);
        assert!(!t.requires_human_validation);
        assert_eq!(t.recovery_attempts, 1);
        assert!((state.coherence_threshold() - 0.85).abs() < f32::EPSILON);
        assert!((state.magnitude() - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn human_stress_requires_validation_without_cascade() {
        let mut state = DriftState::default();
        let t = state.observe(0.9).unwrap();
        assert_eq!(t.zone, FailureZone::HumanStress);
        assert_eq!(t.tree_mode, TreeMode::Strict);
        assert!(!t.cascade);
        assert!(t.requires_human_validation);
        assert_eq!(t.recovery_attempts, 0);
        assert!((t.coherence_threshold - 0.954).abs() < f32::EPSILON);
    }

    #[test]
    fn fourth_stressed_cycle_forces_human_stress() {
        let mut state = DriftState::default();
        let attempts: Vec<u8> = (0..3)
            .map(|_| state.observe(0.0).unwrap().recovery_attempts)
            .collect();
        assert_eq!(attempts, vec![1, 2, 3]);

        let t = state.observe(0.0).unwrap();
        assert_eq!(t.zone, FailureZone::HumanStress);
        assert_eq!(t.tree_mode, TreeMode::Strict);
        assert!(!t.cascade);
        assert!(t.cascade_limit_exceeded);
        assert!(t.requires_human_validation);
        assert_eq!(t.recovery_attempts, 3);
    }

    #[test]
    fn attempts_never_decay_without_feedback() {
        let mut state = DriftState::default();
        state.observe(0.0).unwrap();
        state.observe(0.5).unwrap();
        state.observe(0.9).unwrap();
        assert_eq!(state.recovery_attempts(), 1);
    }

    #[test]
    fn feedback_resets_magnitude_and_attempts() {
        let mut state = DriftState::default();
        for _ in 0..4 {
            state.observe(0.1).unwrap();
        }
        state.reset_after_feedback();
        assert_eq!(state.recovery_attempts(), 0);
        assert!(state.magnitude().abs() < f32::EPSILON);

        let t = state.observe(0.1).unwrap();
        assert!(t.cascade);
        assert_eq!(t.recovery_attempts, 1);
    }

    #[test]
    fn out_of_range_drift_is_rejected_without_mutation() {
        let mut state = DriftState::default();
        state.observe(0.2).unwrap();
        let before = state.clone();
        assert!(state.observe(1.5).is_err());
        assert!(state.observe(-0.01).is_err());
        assert!(state.observe(f32::NAN).is_err());
        assert_eq!(state, before);
    }

    #[test]
    fn custom_cap_is_respected() {
        let policy = DriftPolicy {
            recovery_cap: 1,
            ..DriftPolicy::default()
        };
        let mut state = DriftState::new(policy);
        assert!(state.observe(0.0).unwrap().cascade);
        assert!(state.observe(0.0).unwrap().cascade_limit_exceeded);
    }

    #[test]
    fn policy_validation() {
        assert!(DriftPolicy::default().validate().is_ok());
        let bad = DriftPolicy {
            ai_stress_threshold: 1.2,
            ..DriftPolicy::default()
        };
        assert!(bad.validate().is_err());
    }
}
