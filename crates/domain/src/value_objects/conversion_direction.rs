//! Direction of a conversion cycle

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which modality a cycle converts into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionDirection {
    /// Speech to text
    Transcribe,
    /// Text to speech
    Synthesize,
}

impl ConversionDirection {
    /// Service name strategies for this direction are registered under
    #[must_use]
    pub const fn service(&self) -> &'static str {
        match self {
            Self::Transcribe => "stt",
            Self::Synthesize => "tts",
        }
    }

    /// Operation name strategies for this direction are registered under
    #[must_use]
    pub const fn operation(&self) -> &'static str {
        match self {
            Self::Transcribe => "transcribe",
            Self::Synthesize => "synthesize",
        }
    }

    /// Position of this direction on the functional geomorphic axis
    #[must_use]
    pub const fn functional_anchor(&self) -> u64 {
        match self {
            Self::Transcribe => 0,
            Self::Synthesize => 1 << 32,
        }
    }

    /// The opposite direction
    #[must_use]
    pub const fn inverse(&self) -> Self {
        match self {
            Self::Transcribe => Self::Synthesize,
            Self::Synthesize => Self::Transcribe,
        }
    }
}

impl fmt::Display for ConversionDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.operation())
    }
}
