//! Configuration for speech processing

use serde::{Deserialize, Serialize};

/// Configuration for speech collaborators
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeechConfig {
    /// Backend used for transcription when no strategy matches
    #[serde(default = "default_stt_backend")]
    pub default_stt_backend: String,

    /// Backend used for synthesis when no strategy matches
    #[serde(default = "default_tts_backend")]
    pub default_tts_backend: String,

    /// Sample rate media is decoded to, in Hz
    #[serde(default = "default_sample_rate")]
    pub sample_rate: u32,

    /// Largest buffer accepted for a single cycle
    #[serde(default = "default_max_samples_per_cycle")]
    pub max_samples_per_cycle: usize,

    /// FFmpeg binary path
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,
}

fn default_stt_backend() -> String {
    "whisper".to_string()
}

fn default_tts_backend() -> String {
    "piper".to_string()
}

const fn default_sample_rate() -> u32 {
    16_000
}

const fn default_max_samples_per_cycle() -> usize {
    16_000 * 600 // ten minutes at the default rate
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

impl Default for SpeechConfig {
    fn default() -> Self {
        Self {
            default_stt_backend: default_stt_backend(),
            default_tts_backend: default_tts_backend(),
            sample_rate: default_sample_rate(),
            max_samples_per_cycle: default_max_samples_per_cycle(),
            ffmpeg_path: default_ffmpeg_path(),
        }
    }
}

impl SpeechConfig {
    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.default_stt_backend.trim().is_empty() {
            return Err("Default STT backend must not be empty".to_string());
        }
        if self.default_tts_backend.trim().is_empty() {
            return Err("Default TTS backend must not be empty".to_string());
        }
        if self.sample_rate == 0 {
            return Err("Sample rate must be greater than 0".to_string());
        }
        if self.max_samples_per_cycle == 0 {
            return Err("Max samples per cycle must be greater than 0".to_string());
        }
        if self.ffmpeg_path.trim().is_empty() {
            return Err("FFmpeg path must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_has_expected_values() {
        let config = SpeechConfig::default();

        assert_eq!(config.default_stt_backend, "whisper");
        assert_eq!(config.default_tts_backend, "piper");
        assert_eq!(config.sample_rate, 16_000);
        assert_eq!(config.max_samples_per_cycle, 9_600_000);
        assert_eq!(config.ffmpeg_path, "ffmpeg");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn validate_fails_with_zero_sample_rate() {
        let config = SpeechConfig {
            sample_rate: 0,
            ..SpeechConfig::default()
        };
        assert_eq!(
            config.validate().unwrap_err(),
            "Sample rate must be greater than 0"
        );
    }

    #[test]
    fn validate_fails_with_blank_backend() {
        let config = SpeechConfig {
            default_tts_backend: "  ".to_string(),
            ..SpeechConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn validate_fails_with_zero_max_samples() {
        let config = SpeechConfig {
            max_samples_per_cycle: 0,
            ..SpeechConfig::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_deserializes_from_toml() {
        let toml = r#"
            default_stt_backend = "vosk"
            sample_rate = 22050
            ffmpeg_path = "/usr/local/bin/ffmpeg"
        "#;

        let config: SpeechConfig = toml::from_str(toml).unwrap();

        assert_eq!(config.default_stt_backend, "vosk");
        assert_eq!(config.default_tts_backend, "piper");
        assert_eq!(config.sample_rate, 22_050);
        assert_eq!(config.ffmpeg_path, "/usr/local/bin/ffmpeg");
    }
}
