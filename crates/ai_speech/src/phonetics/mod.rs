//! Phonetic analysis
//!
//! The decision-relevant signal processing of a conversion cycle: variation
//! detection, normalization, feature summarization and the projection into
//! coordinate space.

mod analysis;
mod features;
mod mapper;
mod normalizer;
mod variation;

pub use analysis::{ChunkAnalysis, analyze_chunks};
pub use features::{AudioFeatures, FEATURE_BINS, FeatureSummarizer};
pub use mapper::{CoordinateMapper, pitch_variance};
pub use normalizer::{NormalizationPasses, PhoneticNormalizer, SMOOTHING_WINDOW};
pub use variation::{ANALYSIS_WINDOW, ScoringMode, VariationDetector, VariationReport};
