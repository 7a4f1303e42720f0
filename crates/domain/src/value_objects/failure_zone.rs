//! Failure zones derived from drift magnitude

use std::fmt;

use serde::{Deserialize, Serialize};

/// Scale applied to a drift magnitude before centring
const FAILURE_SCALE: f32 = 24.0;
/// Offset that centres the failure magnitude on zero
const FAILURE_OFFSET: f32 = 12.0;
/// Failure magnitudes beyond this bound leave the green zone
const ZONE_BOUND: f32 = 3.0;

/// Zone the system is operating in after a drift observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureZone {
    /// Nominal operation
    #[default]
    Green,
    /// The automated side is drifting; automatic recovery is attempted
    AiStress,
    /// Human validation is mandatory
    HumanStress,
}

impl FailureZone {
    /// Map a drift magnitude in `[0, 1]` onto `[-12, 12]`
    #[must_use]
    pub fn failure_magnitude(drift: f32) -> f32 {
        drift.mul_add(FAILURE_SCALE, -FAILURE_OFFSET)
    }

    /// Arithmetic zone for a drift magnitude, before any cascade limit applies
    #[must_use]
    pub fn classify(drift: f32) -> Self {
        let failure = Self::failure_magnitude(drift);
        if failure < -ZONE_BOUND {
            Self::AiStress
        } else if failure > ZONE_BOUND {
            Self::HumanStress
        } else {
            Self::Green
        }
    }

    /// Whether a human must validate output produced in this zone
    #[must_use]
    pub const fn requires_human(&self) -> bool {
        matches!(self, Self::HumanStress)
    }
}

impl fmt::Display for FailureZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Green => write!(f, "green"),
            Self::AiStress => write!(f, "ai_stress"),
            Self::HumanStress => write!(f, "human_stress"),
        }
    }
}
