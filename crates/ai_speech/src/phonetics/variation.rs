//! Speech variation detection
//!
//! Scores raw audio for lisp and stutter indicators and updates the speaker
//! profile accordingly. Audio is only read, never modified.

use domain::PhoneticProfile;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::SpeechError;

/// Length of a self-similarity window in samples
pub const ANALYSIS_WINDOW: usize = 1024;
/// Distance between consecutive window starts
const ANALYSIS_STRIDE: usize = ANALYSIS_WINDOW / 2;
/// Zero-crossing rate above which fricatives suggest a lisp
const LISP_ZCR_THRESHOLD: f32 = 0.4;
/// Normalized correlation above which a window repeats its predecessor
const REPETITION_CORRELATION: f32 = 0.8;
/// Repetitions needed before the stutter flag is raised
const STUTTER_REPETITIONS: u32 = 3;
/// Score above which identity-bearing accent traits are protected
const IDENTITY_SCORE_THRESHOLD: f32 = 0.5;
/// Phenomenological integrity above which accent traits are protected
const IDENTITY_INTEGRITY_THRESHOLD: f32 = 0.9;

const ZCR_WEIGHT: f32 = 0.3;
const REPETITION_WEIGHT: f32 = 0.1;
const TOLERANCE_WEIGHT: f32 = 0.6;

/// Which terms contributed to a variation score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoringMode {
    /// Zero-crossing, repetition and tolerance terms
    Full,
    /// Buffer shorter than one window; the repetition term is omitted
    Reduced,
}

/// Outcome of one detection pass
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct VariationReport {
    /// Composite variation score, roughly within `[0, 1]`
    pub score: f32,
    /// Sign changes per sample over the whole buffer
    pub zero_crossing_rate: f32,
    /// Windows strongly correlated with the window one length earlier
    pub repetition_count: u32,
    /// Whether the repetition term was computed
    pub mode: ScoringMode,
}

/// Detects lisp and stutter indicators in PCM audio
#[derive(Debug, Clone, Copy, Default)]
pub struct VariationDetector;

impl VariationDetector {
    /// Create a detector
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Score `samples` and update the flags of `profile`
    ///
    /// Flags are only ever raised by detection, except the accent flag which
    /// is cleared when a strongly varying voice must keep its identity.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidInput` for an empty buffer or a zero
    /// sample rate.
    pub fn detect(
        &self,
        samples: &[f32],
        sample_rate: u32,
        profile: &mut PhoneticProfile,
    ) -> Result<VariationReport, SpeechError> {
        if samples.is_empty() {
            return Err(SpeechError::invalid_input("sample buffer is empty"));
        }
        if sample_rate == 0 {
            return Err(SpeechError::invalid_input("sample rate must be positive"));
        }

        let zero_crossing_rate = zero_crossing_rate(samples);
        if zero_crossing_rate > LISP_ZCR_THRESHOLD {
            profile.lisp_mitigation = true;
        }

        let tolerance_term = TOLERANCE_WEIGHT * profile.variation_tolerance();
        let zcr_term = ZCR_WEIGHT * zero_crossing_rate;

        let (score, repetition_count, mode) = if samples.len() < ANALYSIS_WINDOW {
            (zcr_term + tolerance_term, 0, ScoringMode::Reduced)
        } else {
            let repetitions = count_repetitions(samples);
            if repetitions > STUTTER_REPETITIONS {
                profile.stutter_detection = true;
            }
            let repetition_term = REPETITION_WEIGHT * repetitions as f32;
            (
                zcr_term + repetition_term + tolerance_term,
                repetitions,
                ScoringMode::Full,
            )
        };

        if score > IDENTITY_SCORE_THRESHOLD
            && profile.phenomenological_integrity() > IDENTITY_INTEGRITY_THRESHOLD
        {
            profile.accent_normalization = false;
        }

        debug!(
            score,
            zero_crossing_rate,
            repetition_count,
            ?mode,
            lisp = profile.lisp_mitigation,
            stutter = profile.stutter_detection,
            "Detected speech variation"
        );

        Ok(VariationReport {
            score,
            zero_crossing_rate,
            repetition_count,
            mode,
        })
    }
}

/// Sign changes of `sample > 0` divided by the buffer length
pub(crate) fn zero_crossing_rate(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let crossings = samples
        .windows(2)
        .filter(|pair| (pair[0] > 0.0) != (pair[1] > 0.0))
        .count();
    crossings as f32 / samples.len() as f32
}

/// Count windows that repeat the window one length earlier
fn count_repetitions(samples: &[f32]) -> u32 {
    let mut repetitions = 0;
    let mut start = ANALYSIS_WINDOW;
    while start + ANALYSIS_WINDOW <= samples.len() {
        let current = &samples[start..start + ANALYSIS_WINDOW];
        let previous = &samples[start - ANALYSIS_WINDOW..start];
        if normalized_correlation(current, previous) > REPETITION_CORRELATION {
            repetitions += 1;
        }
        start += ANALYSIS_STRIDE;
    }
    repetitions
}

/// Cosine similarity of two equally long windows, 0 when either is silent
fn normalized_correlation(a: &[f32], b: &[f32]) -> f32 {
    let (dot, norm_a, norm_b) = a.iter().zip(b).fold(
        (0.0f64, 0.0f64, 0.0f64),
        |(dot, na, nb), (&x, &y)| {
            let (x, y) = (f64::from(x), f64::from(y));
            (x.mul_add(y, dot), x.mul_add(x, na), y.mul_add(y, nb))
        },
    );
    let denominator = (norm_a * norm_b).sqrt();
    if denominator <= f64::EPSILON {
        return 0.0;
    }
    (dot / denominator) as f32
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tone(len: usize, period: usize) -> Vec<f32> {
        (0..len)
            .map(|i| (std::f32::consts::TAU * (i % period) as f32 / period as f32).sin())
            .collect()
    }

    #[test]
    fn empty_buffer_is_invalid() {
        let mut profile = PhoneticProfile::new();
        let err = VariationDetector::new()
            .detect(&[], 16_000, &mut profile)
            .unwrap_err();
        assert!(matches!(err, SpeechError::InvalidInput(_)));
    }

    #[test]
    fn zero_sample_rate_is_invalid() {
        let mut profile = PhoneticProfile::new();
        assert!(
            VariationDetector::new()
                .detect(&[0.1; 16], 0, &mut profile)
                .is_err()
        );
    }

    #[test]
    fn alternating_signal_raises_lisp_flag() {
        let samples: Vec<f32> = (0..256)
            .map(|i| if i % 2 == 0 { 0.5 } else { -0.5 })
            .collect();
        let mut profile = PhoneticProfile::new();
        profile.lisp_mitigation = false;
        let report = VariationDetector::new()
            .detect(&samples, 16_000, &mut profile)
            .unwrap();
        assert!(report.zero_crossing_rate > 0.99 - f32::EPSILON);
        assert!(profile.lisp_mitigation);
    }

    #[test]
    fn short_buffer_uses_reduced_mode() {
        let mut profile = PhoneticProfile::new();
        profile.stutter_detection = false;
        let report = VariationDetector::new()
            .detect(&[0.25; 512], 16_000, &mut profile)
            .unwrap();
        assert_eq!(report.mode, ScoringMode::Reduced);
        assert_eq!(report.repetition_count, 0);
        assert!(report.zero_crossing_rate.abs() < f32::EPSILON);
        // 0.6 * 0.7, no repetition term
        assert!((report.score - 0.42).abs() < 1e-6);
        assert!(!profile.stutter_detection);
    }

    #[test]
    fn periodic_signal_counts_repetitions_and_raises_stutter_flag() {
        // A 64-sample period divides the window, so every window repeats
        let samples = tone(8 * ANALYSIS_WINDOW, 64);
        let mut profile = PhoneticProfile::new();
        profile.stutter_detection = false;
        let report = VariationDetector::new()
            .detect(&samples, 16_000, &mut profile)
            .unwrap();
        assert_eq!(report.mode, ScoringMode::Full);
        // starts 1024, 1536, ..., 7168
        assert_eq!(report.repetition_count, 13);
        assert!(profile.stutter_detection);
        let expected = 0.3 * report.zero_crossing_rate + 0.1 * 13.0 + 0.6 * 0.7;
        assert!((report.score - expected).abs() < 1e-5);
    }

    #[test]
    fn silence_has_no_repetitions() {
        let mut profile = PhoneticProfile::new();
        let report = VariationDetector::new()
            .detect(&vec![0.0; 4 * ANALYSIS_WINDOW], 16_000, &mut profile)
            .unwrap();
        assert_eq!(report.mode, ScoringMode::Full);
        assert_eq!(report.repetition_count, 0);
    }

    #[test]
    fn high_score_with_high_integrity_clears_accent_flag() {
        let mut profile = PhoneticProfile::new().with_variation_tolerance(1.0).unwrap();
        profile.accent_normalization = true;
        VariationDetector::new()
            .detect(&[0.1; 128], 16_000, &mut profile)
            .unwrap();
        assert!(!profile.accent_normalization);
    }

    #[test]
    fn low_integrity_keeps_accent_flag() {
        let mut profile = PhoneticProfile::new()
            .with_variation_tolerance(1.0)
            .and_then(|p| p.with_integrity(0.5, 0.5))
            .unwrap();
        profile.accent_normalization = true;
        VariationDetector::new()
            .detect(&[0.1; 128], 16_000, &mut profile)
            .unwrap();
        assert!(profile.accent_normalization);
    }

    #[test]
    fn detection_does_not_touch_audio() {
        let samples = tone(2048, 50);
        let copy = samples.clone();
        let mut profile = PhoneticProfile::new();
        VariationDetector::new()
            .detect(&samples, 16_000, &mut profile)
            .unwrap();
        assert_eq!(samples, copy);
    }

    #[test]
    fn correlation_of_identical_windows_is_one() {
        let w = tone(256, 32);
        assert!((normalized_correlation(&w, &w) - 1.0).abs() < 1e-6);
    }
}
