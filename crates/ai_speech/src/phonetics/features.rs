//! Acoustic feature summarization
//!
//! Condenses a PCM buffer into fixed-size contours the coordinate mapper
//! consumes.

use tracing::trace;

use super::variation::zero_crossing_rate;
use crate::error::SpeechError;

/// Number of bins in every feature contour
pub const FEATURE_BINS: usize = 256;

/// Fixed-size acoustic summary of a buffer
#[derive(Debug, Clone, PartialEq)]
pub struct AudioFeatures {
    /// Per-segment zero-crossing rate, a pitch proxy in `[0, 1]`
    pub pitch_contour: [f32; FEATURE_BINS],
    /// Per-segment RMS energy
    pub energy_envelope: [f32; FEATURE_BINS],
}

/// Splits a buffer into equal segments and summarizes each
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureSummarizer;

impl FeatureSummarizer {
    /// Create a summarizer
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Summarize `samples` into pitch and energy contours
    ///
    /// Segment `k` covers `[k * len / 256, (k + 1) * len / 256)`, so every
    /// sample lands in exactly one segment.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidInput` if the buffer holds fewer than
    /// 256 samples.
    pub fn summarize(&self, samples: &[f32]) -> Result<AudioFeatures, SpeechError> {
        if samples.len() < FEATURE_BINS {
            return Err(SpeechError::invalid_input(format!(
                "feature summarization needs at least {FEATURE_BINS} samples, got {}",
                samples.len()
            )));
        }

        let len = samples.len();
        let mut pitch_contour = [0.0f32; FEATURE_BINS];
        let mut energy_envelope = [0.0f32; FEATURE_BINS];

        for bin in 0..FEATURE_BINS {
            let segment = &samples[bin * len / FEATURE_BINS..(bin + 1) * len / FEATURE_BINS];
            pitch_contour[bin] = zero_crossing_rate(segment);
            energy_envelope[bin] = rms(segment);
        }

        trace!(len, "Summarized audio features");
        Ok(AudioFeatures {
            pitch_contour,
            energy_envelope,
        })
    }
}

fn rms(segment: &[f32]) -> f32 {
    let energy: f64 = segment.iter().map(|&s| f64::from(s) * f64::from(s)).sum();
    (energy / segment.len() as f64).sqrt() as f32
}
