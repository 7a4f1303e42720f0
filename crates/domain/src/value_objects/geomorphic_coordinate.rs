//! Geomorphic coordinate used to place services in the discovery tree
//!
//! Independent of the conversion [`Coordinate`](super::Coordinate): the three
//! axes are functional, organizational and geographic positions of a
//! processing strategy.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::{ConversionDirection, Coordinate};

/// Resolution used when quantizing conversion axes onto geomorphic axes
const AXIS_RESOLUTION: f32 = 1000.0;

/// A functional/organizational/geographic position
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GeomorphicCoordinate {
    /// Functional dimension
    pub functional: u64,
    /// Organizational dimension
    pub organizational: u64,
    /// Geographical dimension
    pub geographic: u64,
}

impl GeomorphicCoordinate {
    /// Create a new geomorphic coordinate
    #[must_use]
    pub const fn new(functional: u64, organizational: u64, geographic: u64) -> Self {
        Self {
            functional,
            organizational,
            geographic,
        }
    }

    /// Place a strategy for a conversion direction
    ///
    /// The functional axis is set to the direction's anchor so strategies for
    /// different directions stay far apart.
    #[must_use]
    pub const fn for_direction(
        direction: ConversionDirection,
        organizational: u64,
        geographic: u64,
    ) -> Self {
        Self::new(direction.functional_anchor(), organizational, geographic)
    }

    /// Project a conversion coordinate into geomorphic space
    ///
    /// Formality maps to the organizational axis (`round((y + 1) * 1000)`)
    /// and evolution to the geographic axis (`round(z * 1000)`).
    #[must_use]
    pub fn project(direction: ConversionDirection, coordinate: &Coordinate) -> Self {
        let organizational = ((coordinate.y() + 1.0) * AXIS_RESOLUTION).round() as u64;
        let geographic = (coordinate.z() * AXIS_RESOLUTION).round() as u64;
        Self::for_direction(direction, organizational, geographic)
    }

    /// Squared Euclidean distance over the three axes
    ///
    /// Computed in 128-bit integers, so it is exact for all inputs.
    #[must_use]
    pub const fn distance_squared(&self, other: &Self) -> u128 {
        let df = self.functional.abs_diff(other.functional) as u128;
        let dorg = self.organizational.abs_diff(other.organizational) as u128;
        let dgeo = self.geographic.abs_diff(other.geographic) as u128;
        // 3 * (2^64)^2 exceeds u128, saturate instead of wrapping
        df.saturating_mul(df)
            .saturating_add(dorg.saturating_mul(dorg))
            .saturating_add(dgeo.saturating_mul(dgeo))
    }
}

impl fmt::Display for GeomorphicCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}, {}, {}]",
            self.functional, self.organizational, self.geographic
        )
    }
}
