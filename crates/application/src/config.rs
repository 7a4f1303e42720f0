//! Configuration for conversion cycles

use domain::{DEFAULT_COHERENCE_THRESHOLD, DriftPolicy, PhoneticProfile, TreeMode};
use serde::{Deserialize, Serialize};

use crate::discovery::DEFAULT_HYBRID_READ_BIAS;
use crate::error::ApplicationError;

/// Tunables of the conversion pipeline and its decision core
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Coherence threshold restored in the green zone
    #[serde(default = "default_coherence_threshold")]
    pub coherence_threshold: f32,

    /// Confidence below which a human must confirm the output
    #[serde(default = "default_confirmation_threshold")]
    pub confirmation_threshold: f32,

    /// Coherence threshold applied while the automated side is stressed
    #[serde(default = "default_ai_stress_threshold")]
    pub ai_stress_threshold: f32,

    /// Automatic recovery attempts before escalation is forced
    #[serde(default = "default_recovery_cap")]
    pub recovery_cap: u8,

    /// Balancing mode of a fresh discovery tree
    #[serde(default)]
    pub initial_tree_mode: TreeMode,

    /// Read share at or above which hybrid mode balances strictly
    #[serde(default = "default_hybrid_read_bias")]
    pub hybrid_read_bias: f32,

    /// Share of the original signal kept by normalization (1.0 = untouched)
    #[serde(default = "default_preservation_factor")]
    pub preservation_factor: f32,

    /// Variation score above which audio is normalized before mapping
    #[serde(default = "default_normalization_trigger")]
    pub normalization_trigger: f32,

    /// Variation tolerance of a fresh phonetic profile
    #[serde(default = "default_variation_tolerance")]
    pub variation_tolerance: f32,
}

const fn default_coherence_threshold() -> f32 {
    DEFAULT_COHERENCE_THRESHOLD
}

const fn default_confirmation_threshold() -> f32 {
    0.85
}

const fn default_ai_stress_threshold() -> f32 {
    DriftPolicy::DEFAULT_AI_STRESS_THRESHOLD
}

const fn default_recovery_cap() -> u8 {
    DriftPolicy::DEFAULT_RECOVERY_CAP
}

const fn default_hybrid_read_bias() -> f32 {
    DEFAULT_HYBRID_READ_BIAS
}

const fn default_preservation_factor() -> f32 {
    0.7
}

const fn default_normalization_trigger() -> f32 {
    0.5
}

const fn default_variation_tolerance() -> f32 {
    PhoneticProfile::DEFAULT_VARIATION_TOLERANCE
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            coherence_threshold: default_coherence_threshold(),
            confirmation_threshold: default_confirmation_threshold(),
            ai_stress_threshold: default_ai_stress_threshold(),
            recovery_cap: default_recovery_cap(),
            initial_tree_mode: TreeMode::default(),
            hybrid_read_bias: default_hybrid_read_bias(),
            preservation_factor: default_preservation_factor(),
            normalization_trigger: default_normalization_trigger(),
            variation_tolerance: default_variation_tolerance(),
        }
    }
}

impl ConversionConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error naming the first field outside `[0, 1]`.
    pub fn validate(&self) -> Result<(), String> {
        let unit_fields = [
            ("coherence_threshold", self.coherence_threshold),
            ("confirmation_threshold", self.confirmation_threshold),
            ("ai_stress_threshold", self.ai_stress_threshold),
            ("hybrid_read_bias", self.hybrid_read_bias),
            ("preservation_factor", self.preservation_factor),
            ("variation_tolerance", self.variation_tolerance),
        ];
        for (name, value) in unit_fields {
            if !(0.0..=1.0).contains(&value) {
                return Err(format!("{name} must be between 0.0 and 1.0"));
            }
        }
        if !self.normalization_trigger.is_finite() {
            return Err("normalization_trigger must be a finite number".to_string());
        }
        Ok(())
    }

    /// Drift policy derived from this configuration
    #[must_use]
    pub const fn drift_policy(&self) -> DriftPolicy {
        DriftPolicy {
            coherence_threshold: self.coherence_threshold,
            ai_stress_threshold: self.ai_stress_threshold,
            recovery_cap: self.recovery_cap,
        }
    }

    /// Phonetic profile a new context starts with
    ///
    /// # Errors
    ///
    /// Returns a domain error if the configured tolerance is out of range.
    pub fn initial_profile(&self) -> Result<PhoneticProfile, ApplicationError> {
        Ok(PhoneticProfile::new().with_variation_tolerance(self.variation_tolerance)?)
    }
}
