//! Conversion coordinate value object
//!
//! Summarises the character of a conversion on three axes:
//!
//! - `x`: coherence spectrum, expressive (-1) to factual (+1)
//! - `y`: formality, informal (-1) to formal (+1)
//! - `z`: evolution, static (0) to dynamic (1)
//!
//! plus a confidence scalar. The confidence is always derived by the
//! coordinate mapper; callers cannot set it directly.

use std::fmt;

use serde::Serialize;

use crate::errors::DomainError;

/// Coherence threshold the system starts from and returns to in the green zone
pub const DEFAULT_COHERENCE_THRESHOLD: f32 = 0.954;

/// A point in coherence/formality/evolution space with its confidence
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    x: f32,
    y: f32,
    z: f32,
    confidence: f32,
}

impl Coordinate {
    /// Formality step applied when a human supplies a correction
    pub const CORRECTION_FORMALITY_STEP: f32 = 0.1;
    /// Evolution step applied when a human supplies a correction
    pub const CORRECTION_EVOLUTION_STEP: f32 = 0.05;

    /// The neutral starting position: centred, mid-evolution, default confidence
    #[must_use]
    pub const fn neutral() -> Self {
        Self {
            x: 0.0,
            y: 0.0,
            z: 0.5,
            confidence: DEFAULT_COHERENCE_THRESHOLD,
        }
    }

    /// Build a coordinate from freshly computed axes
    ///
    /// Each axis is clamped into its range (`x`, `y` to [-1, 1], `z` and
    /// `confidence` to [0, 1]).
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if any component is NaN.
    pub fn project(x: f32, y: f32, z: f32, confidence: f32) -> Result<Self, DomainError> {
        if [x, y, z, confidence].iter().any(|v| v.is_nan()) {
            return Err(DomainError::invalid_input(
                "coordinate components must be numbers",
            ));
        }
        Ok(Self {
            x: x.clamp(-1.0, 1.0),
            y: y.clamp(-1.0, 1.0),
            z: z.clamp(0.0, 1.0),
            confidence: confidence.clamp(0.0, 1.0),
        })
    }

    /// Coherence axis
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Formality axis
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Evolution axis
    #[must_use]
    pub const fn z(&self) -> f32 {
        self.z
    }

    /// Epistemic confidence of the current position
    #[must_use]
    pub const fn confidence(&self) -> f32 {
        self.confidence
    }

    /// Move the coordinate after a human correction was accepted
    ///
    /// Formality and evolution both increase and are capped at 1.0. The
    /// confidence is left as computed.
    #[must_use]
    pub fn nudged_by_correction(self) -> Self {
        Self {
            y: (self.y + Self::CORRECTION_FORMALITY_STEP).min(1.0),
            z: (self.z + Self::CORRECTION_EVOLUTION_STEP).min(1.0),
            ..self
        }
    }
}

impl Default for Coordinate {
    fn default() -> Self {
        Self::neutral()
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "({:.3}, {:.3}, {:.3}) @ {:.3}",
            self.x, self.y, self.z, self.confidence
        )
    }
}
