//! Types for speech processing
//!
//! Contains media formats, decoded PCM audio and the payloads returned by
//! speech backends.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SpeechError;

/// Media container formats accepted by the decoder
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AudioFormat {
    /// WAV (RIFF) container
    Wav,
    /// MP4 container
    Mp4,
    /// M4A/AAC audio
    M4a,
    /// MP3 stream
    Mp3,
    /// OGG container (typically with Opus or Vorbis)
    Ogg,
    /// FLAC (lossless)
    Flac,
    /// WebM container
    Webm,
}

impl AudioFormat {
    /// File extension for this format
    #[must_use]
    pub const fn extension(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            Self::Mp4 => "mp4",
            Self::M4a => "m4a",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
            Self::Webm => "webm",
        }
    }

    /// Demuxer name understood by FFmpeg's `-f` flag
    #[must_use]
    pub const fn demuxer(&self) -> &'static str {
        match self {
            Self::Wav => "wav",
            // FFmpeg handles both through the mov/mp4 demuxer
            Self::Mp4 | Self::M4a => "mov",
            Self::Mp3 => "mp3",
            Self::Ogg => "ogg",
            Self::Flac => "flac",
            // WebM is read by the Matroska demuxer
            Self::Webm => "matroska",
        }
    }

    /// Guess the format from a file extension (case-insensitive, dot optional)
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.trim_start_matches('.').to_lowercase().as_str() {
            "wav" | "wave" => Some(Self::Wav),
            "mp4" => Some(Self::Mp4),
            "m4a" | "aac" => Some(Self::M4a),
            "mp3" => Some(Self::Mp3),
            "ogg" | "opus" | "oga" => Some(Self::Ogg),
            "flac" => Some(Self::Flac),
            "webm" => Some(Self::Webm),
            _ => None,
        }
    }
}

impl fmt::Display for AudioFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.extension())
    }
}

/// Decoded mono PCM audio
#[derive(Debug, Clone, PartialEq)]
pub struct PcmAudio {
    samples: Vec<f32>,
    sample_rate: u32,
}

impl PcmAudio {
    /// Wrap decoded samples
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::InvalidInput` for an empty buffer or a zero
    /// sample rate.
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Result<Self, SpeechError> {
        if samples.is_empty() {
            return Err(SpeechError::invalid_input("sample buffer is empty"));
        }
        if sample_rate == 0 {
            return Err(SpeechError::invalid_input("sample rate must be positive"));
        }
        Ok(Self {
            samples,
            sample_rate,
        })
    }

    /// Samples in `[-1, 1]` nominal range
    #[must_use]
    pub fn samples(&self) -> &[f32] {
        &self.samples
    }

    /// Mutable access for in-place normalization
    pub fn samples_mut(&mut self) -> &mut [f32] {
        &mut self.samples
    }

    /// Consume and return the samples
    #[must_use]
    pub fn into_samples(self) -> Vec<f32> {
        self.samples
    }

    /// Sample rate in Hz
    #[must_use]
    pub const fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Number of samples
    #[must_use]
    pub fn len(&self) -> usize {
        self.samples.len()
    }

    /// Always false; empty audio cannot be constructed
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    /// Duration in milliseconds
    #[must_use]
    pub fn duration_ms(&self) -> u64 {
        (self.samples.len() as u64).saturating_mul(1000) / u64::from(self.sample_rate)
    }
}

/// Result of speech-to-text transcription
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transcription {
    /// Transcribed text
    pub text: String,
    /// Backend confidence (0.0 - 1.0)
    pub confidence: f32,
    /// Detected language (ISO 639-1 code)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

impl Transcription {
    /// Create a transcription with its confidence
    #[must_use]
    pub fn new(text: impl Into<String>, confidence: f32) -> Self {
        Self {
            text: text.into(),
            confidence,
            language: None,
        }
    }

    /// Set the detected language
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    /// Check if transcription is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.trim().is_empty()
    }
}

/// Result of text-to-speech synthesis
#[derive(Debug, Clone, PartialEq)]
pub struct Synthesis {
    /// Synthesized audio
    pub audio: PcmAudio,
    /// Backend confidence (0.0 - 1.0)
    pub confidence: f32,
}

impl Synthesis {
    /// Create a synthesis result
    #[must_use]
    pub const fn new(audio: PcmAudio, confidence: f32) -> Self {
        Self { audio, confidence }
    }
}
