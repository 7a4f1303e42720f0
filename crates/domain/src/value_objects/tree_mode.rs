//! Balancing mode of the service discovery tree

use std::fmt;

use serde::{Deserialize, Serialize};

/// How the discovery tree keeps itself balanced
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TreeMode {
    /// Height-balanced, tuned for read-heavy traffic such as synthesis
    Strict,
    /// Colour-balanced, tuned for write-heavy traffic such as transcription
    Relaxed,
    /// Picks Strict or Relaxed from the observed read/write mix
    #[default]
    Hybrid,
}

impl fmt::Display for TreeMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Strict => write!(f, "strict"),
            Self::Relaxed => write!(f, "relaxed"),
            Self::Hybrid => write!(f, "hybrid"),
        }
    }
}

impl std::str::FromStr for TreeMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "strict" | "avl" => Ok(Self::Strict),
            "relaxed" | "rb" | "red-black" => Ok(Self::Relaxed),
            "hybrid" | "auto" => Ok(Self::Hybrid),
            _ => Err(format!(
                "Invalid tree mode: {s}. Use 'strict', 'relaxed' or 'hybrid'"
            )),
        }
    }
}
