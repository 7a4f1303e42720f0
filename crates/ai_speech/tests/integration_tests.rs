//! Integration tests for ai_speech crate
//!
//! Runs the phonetic pipeline end to end and checks its invariants over
//! random buffers.

use ai_speech::phonetics::{
    CoordinateMapper, FEATURE_BINS, FeatureSummarizer, PhoneticNormalizer, ScoringMode,
    VariationDetector, analyze_chunks,
};
use ai_speech::{PcmAudio, SpeechError};
use domain::{DEFAULT_COHERENCE_THRESHOLD, PhoneticProfile};
use proptest::prelude::*;

/// A voiced-looking test signal: a decaying tone with a stuttered onset
fn stuttered_speech(len: usize) -> Vec<f32> {
    (0..len)
        .map(|i| {
            let phase = (i % 2048) as f32 / 2048.0;
            let tone = (std::f32::consts::TAU * 220.0 * i as f32 / 16_000.0).sin();
            tone * (1.0 - phase) * 0.8
        })
        .collect()
}

#[test]
fn pipeline_produces_bounded_coordinate() {
    let mut samples = stuttered_speech(16_000);
    let mut profile = PhoneticProfile::new();

    let report = VariationDetector::new()
        .detect(&samples, 16_000, &mut profile)
        .unwrap();
    assert_eq!(report.mode, ScoringMode::Full);

    PhoneticNormalizer::new()
        .apply(&mut samples, &profile, 0.7)
        .unwrap();
    let features = FeatureSummarizer::new().summarize(&samples).unwrap();
    let coordinate = CoordinateMapper::new()
        .map_features(&features, report.score, DEFAULT_COHERENCE_THRESHOLD)
        .unwrap();

    assert!((-1.0..=1.0).contains(&coordinate.x()));
    assert!((-1.0..=1.0).contains(&coordinate.y()));
    assert!((0.0..=1.0).contains(&coordinate.z()));
    assert!(coordinate.confidence() <= DEFAULT_COHERENCE_THRESHOLD);
}

#[tokio::test]
async fn chunk_analysis_matches_sequential_analysis() {
    let samples = stuttered_speech(12_000);
    let chunks: Vec<PcmAudio> = samples
        .chunks(3_000)
        .map(|c| PcmAudio::new(c.to_vec(), 16_000).unwrap())
        .collect();
    let profile = PhoneticProfile::new();

    let parallel = analyze_chunks(chunks.clone(), &profile).await.unwrap();

    for (chunk, analysis) in chunks.iter().zip(&parallel) {
        let mut sequential_profile = profile.clone();
        let report = VariationDetector::new()
            .detect(chunk.samples(), chunk.sample_rate(), &mut sequential_profile)
            .unwrap();
        let features = FeatureSummarizer::new().summarize(chunk.samples()).unwrap();
        assert_eq!(analysis.report, report);
        assert_eq!(analysis.features, features);
        assert_eq!(analysis.profile, sequential_profile);
    }
}

#[test]
fn mismatched_contours_surface_as_invalid_input() {
    let err = CoordinateMapper::new()
        .map(&[0.0; FEATURE_BINS], &[0.0; 10], 0.5, 0.954)
        .unwrap_err();
    assert!(matches!(err, SpeechError::InvalidInput(_)));
}

proptest! {
    #[test]
    fn factor_one_never_changes_audio(
        samples in prop::collection::vec(-1.0f32..1.0f32, 1..4096),
        lisp in any::<bool>(),
        stutter in any::<bool>()
    ) {
        let mut profile = PhoneticProfile::new();
        profile.lisp_mitigation = lisp;
        profile.stutter_detection = stutter;
        let mut buffer = samples.clone();
        PhoneticNormalizer::new().apply(&mut buffer, &profile, 1.0).unwrap();
        prop_assert_eq!(buffer, samples);
    }

    #[test]
    fn normalization_keeps_samples_within_input_range(
        samples in prop::collection::vec(-1.0f32..1.0f32, 1..3000),
        factor in 0.0f32..1.0f32
    ) {
        let mut buffer = samples;
        PhoneticNormalizer::new()
            .apply(&mut buffer, &PhoneticProfile::new(), factor)
            .unwrap();
        prop_assert!(buffer.iter().all(|s| s.is_finite() && s.abs() <= 1.0 + 1e-4));
    }

    #[test]
    fn score_has_tolerance_floor(
        samples in prop::collection::vec(-1.0f32..1.0f32, 1..3000)
    ) {
        let mut profile = PhoneticProfile::new();
        let report = VariationDetector::new().detect(&samples, 16_000, &mut profile).unwrap();
        prop_assert!(report.score >= 0.6 * profile.variation_tolerance() - 1e-6);
        prop_assert!((0.0..=1.0).contains(&report.zero_crossing_rate));
        let expected_mode = if samples.len() < 1024 { ScoringMode::Reduced } else { ScoringMode::Full };
        prop_assert_eq!(report.mode, expected_mode);
    }

    #[test]
    fn constant_contour_always_maps_to_factual(
        level in 0.0f32..1.0f32,
        score in 0.0f32..2.0f32
    ) {
        let coordinate = CoordinateMapper::new()
            .map(&[level; FEATURE_BINS], &[0.1; FEATURE_BINS], score, 0.954)
            .unwrap();
        prop_assert_eq!(coordinate.x(), 1.0);
    }
}
