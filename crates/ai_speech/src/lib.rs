//! AI Speech - speech collaborator ports and phonetic analysis
//!
//! Provides the seams between the conversion core and the outside world:
//! - `SpeechToText` / `TextToSpeech` - model inference backends
//! - `MediaDecoder` - container demuxing and resampling
//! - `BackendRegistry` - resolves strategy identifiers to backends
//!
//! and the signal processing the core decides on:
//! - `phonetics` - variation detection, normalization, feature
//!   summarization and coordinate mapping
//!
//! # Example
//!
//! ```ignore
//! use ai_speech::phonetics::{CoordinateMapper, FeatureSummarizer, VariationDetector};
//!
//! let report = VariationDetector::new().detect(audio.samples(), audio.sample_rate(), &mut profile)?;
//! let features = FeatureSummarizer::new().summarize(audio.samples())?;
//! let coordinate = CoordinateMapper::new().map_features(&features, report.score, threshold)?;
//! ```

pub mod config;
pub mod error;
pub mod phonetics;
pub mod ports;
pub mod registry;
pub mod types;

pub use config::SpeechConfig;
pub use error::SpeechError;
pub use ports::{BackendCapabilities, MediaDecoder, SpeechBackend, SpeechToText, TextToSpeech};
pub use registry::BackendRegistry;
pub use types::{AudioFormat, PcmAudio, Synthesis, Transcription};
