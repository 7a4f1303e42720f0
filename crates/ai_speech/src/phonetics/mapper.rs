//! Projection of acoustic features into the conversion coordinate space

use domain::Coordinate;

use super::features::{AudioFeatures, FEATURE_BINS};
use crate::error::SpeechError;

/// Share of confidence a unit of variation removes
const VARIATION_CONFIDENCE_PENALTY: f32 = 0.1;

/// Maps pitch and energy contours plus a variation score onto a [`Coordinate`]
///
/// - `x = 1 - 2 * tanh(pitch_variance)`: a steady pitch reads as factual
/// - `y = tanh(2 * mean(energy))`: sustained energy reads as formal
/// - `z = variation_score`
/// - `confidence = coherence_threshold * (1 - 0.1 * variation_score)`
///
/// The threshold is the drift state's current one, not a constant.
#[derive(Debug, Clone, Copy, Default)]
pub struct CoordinateMapper;

impl CoordinateMapper {
    /// Create a mapper
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Map raw contours
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidInput` if the contours differ in length,
    /// are not 256 bins long, or any scalar is not a number in range.
    pub fn map(
        &self,
        pitch_contour: &[f32],
        energy_envelope: &[f32],
        variation_score: f32,
        coherence_threshold: f32,
    ) -> Result<Coordinate, SpeechError> {
        if pitch_contour.len() != energy_envelope.len() {
            return Err(SpeechError::invalid_input(format!(
                "mismatched contours: {} pitch bins, {} energy bins",
                pitch_contour.len(),
                energy_envelope.len()
            )));
        }
        if pitch_contour.len() != FEATURE_BINS {
            return Err(SpeechError::invalid_input(format!(
                "contours must have {FEATURE_BINS} bins, got {}",
                pitch_contour.len()
            )));
        }
        if !variation_score.is_finite() {
            return Err(SpeechError::invalid_input("variation score must be finite"));
        }
        if !(0.0..=1.0).contains(&coherence_threshold) {
            return Err(SpeechError::invalid_input(format!(
                "coherence threshold must be within [0, 1], got {coherence_threshold}"
            )));
        }

        let x = 2.0f32.mul_add(-pitch_variance(pitch_contour).tanh(), 1.0);
        let mean_energy = energy_envelope.iter().sum::<f32>() / FEATURE_BINS as f32;
        let y = (2.0 * mean_energy).tanh();
        let confidence =
            coherence_threshold * VARIATION_CONFIDENCE_PENALTY.mul_add(-variation_score, 1.0);

        Coordinate::project(x, y, variation_score, confidence).map_err(SpeechError::from)
    }

    /// Map a summarized buffer
    ///
    /// # Errors
    ///
    /// See [`CoordinateMapper::map`].
    pub fn map_features(
        &self,
        features: &AudioFeatures,
        variation_score: f32,
        coherence_threshold: f32,
    ) -> Result<Coordinate, SpeechError> {
        self.map(
            &features.pitch_contour,
            &features.energy_envelope,
            variation_score,
            coherence_threshold,
        )
    }
}

/// Sum of squared successive differences, divided by the bin count
pub fn pitch_variance(pitch_contour: &[f32]) -> f32 {
    let sum: f32 = pitch_contour
        .windows(2)
        .map(|pair| {
            let diff = pair[1] - pair[0];
            diff * diff
        })
        .sum();
    sum / pitch_contour.len().max(1) as f32
}
