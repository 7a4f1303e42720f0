//! Phonetic normalization
//!
//! Reshapes audio toward clearer articulation in place. The preservation
//! factor is the dial: 0 applies full correction, 1 leaves the buffer
//! bit-for-bit unchanged.

use domain::PhoneticProfile;
use tracing::debug;

use crate::error::SpeechError;

/// Moving-average window of the stutter smoother
pub const SMOOTHING_WINDOW: usize = 512;
/// Samples at each end the smoother never touches
const SMOOTHING_MARGIN: usize = SMOOTHING_WINDOW / 2;
/// Strength of the first-difference damper at zero preservation
const LISP_DAMPING: f32 = 0.2;

/// Which passes a normalization run applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NormalizationPasses {
    /// The first-difference damper ran
    pub lisp: bool,
    /// The moving-average smoother ran
    pub stutter: bool,
}

/// In-place phonetic normalizer
#[derive(Debug, Clone, Copy, Default)]
pub struct PhoneticNormalizer;

impl PhoneticNormalizer {
    /// Create a normalizer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Normalize `samples` according to the flags of `profile`
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidInput` for an empty buffer or a
    /// preservation factor outside `[0, 1]`.
    pub fn apply(
        &self,
        samples: &mut [f32],
        profile: &PhoneticProfile,
        preservation_factor: f32,
    ) -> Result<NormalizationPasses, SpeechError> {
        if samples.is_empty() {
            return Err(SpeechError::invalid_input("sample buffer is empty"));
        }
        if !(0.0..=1.0).contains(&preservation_factor) {
            return Err(SpeechError::invalid_input(format!(
                "preservation factor must be within [0, 1], got {preservation_factor}"
            )));
        }

        let mut passes = NormalizationPasses::default();
        if preservation_factor >= 1.0 {
            return Ok(passes);
        }

        if profile.lisp_mitigation {
            dampen_first_difference(samples, preservation_factor);
            passes.lisp = true;
        }
        if profile.stutter_detection && samples.len() >= SMOOTHING_WINDOW {
            smooth_interior(samples, preservation_factor);
            passes.stutter = true;
        }

        debug!(
            len = samples.len(),
            preservation_factor,
            lisp = passes.lisp,
            stutter = passes.stutter,
            "Applied phonetic normalization"
        );
        Ok(passes)
    }
}

/// Running damper: each sample moves toward its already-processed predecessor
fn dampen_first_difference(samples: &mut [f32], preservation_factor: f32) {
    let strength = LISP_DAMPING * (1.0 - preservation_factor);
    for i in 1..samples.len() {
        let diff = samples[i] - samples[i - 1];
        samples[i] -= diff * strength;
    }
}

/// Blend every interior sample with the mean of its pre-pass neighbourhood
///
/// The mean for sample `i` covers the original values in
/// `[i - 256, i + 256)`. Originals that were already overwritten are kept in
/// a ring of one margin's length so blends never feed later averages.
fn smooth_interior(samples: &mut [f32], preservation_factor: f32) {
    let len = samples.len();
    let mut overwritten = [0.0f32; SMOOTHING_MARGIN];
    let mut sum: f64 = samples[..SMOOTHING_WINDOW]
        .iter()
        .copied()
        .map(f64::from)
        .sum();

    for i in SMOOTHING_MARGIN..len - SMOOTHING_MARGIN {
        let slot = i % SMOOTHING_MARGIN;
        // original value leaving the window once we slide past i
        let outgoing = if i >= SMOOTHING_WINDOW {
            overwritten[slot]
        } else {
            samples[i - SMOOTHING_MARGIN]
        };

        let original = samples[i];
        overwritten[slot] = original;
        let mean = (sum / SMOOTHING_WINDOW as f64) as f32;
        samples[i] = preservation_factor.mul_add(original, (1.0 - preservation_factor) * mean);

        let incoming = i + SMOOTHING_MARGIN;
        if incoming < len {
            sum += f64::from(samples[incoming]) - f64::from(outgoing);
        }
    }
}
