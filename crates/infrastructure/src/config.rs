//! Application configuration
//!
//! Layers, lowest precedence first:
//! - built-in defaults of every section
//! - an optional `config.toml` in the working directory
//! - `PARLEY_*` environment variables, sections separated by `__`
//!   (e.g. `PARLEY_CONVERSION__CONFIRMATION_THRESHOLD=0.9`)

use std::sync::Arc;

use ai_speech::{BackendRegistry, SpeechConfig};
use application::{ApplicationError, ConversionConfig, ConversionService};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::adapters::FfmpegMediaDecoder;
use crate::telemetry::TelemetryConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "PARLEY";

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    /// Conversion pipeline and decision core
    #[serde(default)]
    pub conversion: ConversionConfig,

    /// Speech collaborators
    #[serde(default)]
    pub speech: SpeechConfig,

    /// Logging
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and the environment
    ///
    /// # Errors
    ///
    /// Returns `config::ConfigError` if a source cannot be read or parsed,
    /// or if the merged configuration fails validation.
    pub fn load() -> Result<Self, config::ConfigError> {
        Self::load_from("config")
    }

    /// Load configuration from a specific file (extension optional) and the
    /// environment
    ///
    /// # Errors
    ///
    /// See [`AppConfig::load`].
    pub fn load_from(file: &str) -> Result<Self, config::ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::with_name(file).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate().map_err(config::ConfigError::Message)?;
        info!(file, "Configuration loaded");
        debug!(?config, "Effective configuration");
        Ok(config)
    }

    /// Parse and validate a TOML document
    ///
    /// # Errors
    ///
    /// Returns `config::ConfigError` if the document does not parse or fails
    /// validation.
    pub fn from_toml_str(toml: &str) -> Result<Self, config::ConfigError> {
        let config: Self = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?
            .try_deserialize()?;
        config.validate().map_err(config::ConfigError::Message)?;
        Ok(config)
    }

    /// Validate every section
    ///
    /// # Errors
    ///
    /// Returns the first section error, prefixed with the section name.
    pub fn validate(&self) -> Result<(), String> {
        self.conversion
            .validate()
            .map_err(|e| format!("conversion: {e}"))?;
        self.speech.validate().map_err(|e| format!("speech: {e}"))?;
        self.telemetry
            .validate()
            .map_err(|e| format!("telemetry: {e}"))?;
        Ok(())
    }

    /// Build a conversion service over `registry`, decoding media with FFmpeg
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if the conversion or speech
    /// section is invalid.
    pub fn conversion_service(
        &self,
        registry: Arc<BackendRegistry>,
    ) -> Result<ConversionService, ApplicationError> {
        let decoder = FfmpegMediaDecoder::from_config(&self.speech);
        Ok(
            ConversionService::new(registry, self.conversion.clone(), self.speech.clone())?
                .with_decoder(Arc::new(decoder)),
        )
    }
}
