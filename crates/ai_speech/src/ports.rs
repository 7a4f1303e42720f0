//! Port definitions for speech processing
//!
//! Defines the traits (ports) that speech collaborators must implement.
//! Model inference and container demuxing live behind these traits; the
//! conversion core only consumes payloads and confidences.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::SpeechError;
use crate::types::{AudioFormat, PcmAudio, Synthesis, Transcription};

/// Port for Speech-to-Text (STT) implementations
///
/// # Example
///
/// ```ignore
/// use ai_speech::{PcmAudio, SpeechToText};
///
/// async fn transcribe_clip(stt: &impl SpeechToText, audio: &PcmAudio) -> Result<String, SpeechError> {
///     let transcription = stt.transcribe(audio).await?;
///     Ok(transcription.text)
/// }
/// ```
#[async_trait]
pub trait SpeechToText: Send + Sync {
    /// Transcribe audio to text
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if transcription fails.
    async fn transcribe(&self, audio: &PcmAudio) -> Result<Transcription, SpeechError>;
}

/// Port for Text-to-Speech (TTS) implementations
#[async_trait]
pub trait TextToSpeech: Send + Sync {
    /// Convert text to speech
    ///
    /// # Errors
    ///
    /// Returns `SpeechError` if synthesis fails.
    async fn synthesize(&self, text: &str) -> Result<Synthesis, SpeechError>;
}

/// Port for turning media containers into mono PCM
#[async_trait]
pub trait MediaDecoder: Send + Sync {
    /// Decode a media container into mono PCM samples
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::AudioProcessing` if decoding fails.
    async fn decode(&self, bytes: &[u8], format: AudioFormat) -> Result<PcmAudio, SpeechError>;
}

/// Capabilities a backend declares when it is registered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BackendCapabilities {
    /// Decodes speech into text
    pub transcription: bool,
    /// Encodes text into speech
    pub synthesis: bool,
    /// Reports a confidence with every result
    pub confidence_reporting: bool,
}

impl BackendCapabilities {
    /// Capabilities of a transcription-only backend
    #[must_use]
    pub const fn transcription() -> Self {
        Self {
            transcription: true,
            synthesis: false,
            confidence_reporting: true,
        }
    }

    /// Capabilities of a synthesis-only backend
    #[must_use]
    pub const fn synthesis() -> Self {
        Self {
            transcription: false,
            synthesis: true,
            confidence_reporting: true,
        }
    }

    /// Capabilities of a backend handling both directions
    #[must_use]
    pub const fn duplex() -> Self {
        Self {
            transcription: true,
            synthesis: true,
            confidence_reporting: true,
        }
    }
}

/// A named speech backend as seen by the registry
///
/// A backend exposes one or both directions through the `as_*` accessors.
/// The declared [`BackendCapabilities`] must agree with what is exposed;
/// the registry checks this at registration time.
pub trait SpeechBackend: Send + Sync {
    /// Unique backend name, used as the strategy identifier
    fn name(&self) -> &str;

    /// Declared capabilities
    fn capabilities(&self) -> BackendCapabilities;

    /// Transcription side, if supported
    fn as_speech_to_text(&self) -> Option<&dyn SpeechToText> {
        None
    }

    /// Synthesis side, if supported
    fn as_text_to_speech(&self) -> Option<&dyn TextToSpeech> {
        None
    }
}
