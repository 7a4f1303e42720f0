//! Phonetic profile of a speaker
//!
//! Holds the accessibility flags the variation detector updates and the
//! normalizer reads, together with the scalars that bound how far
//! normalization may move away from the speaker's own voice.

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Speaker-specific variation handling settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhoneticProfile {
    /// Dampen fricative energy associated with lisps
    pub lisp_mitigation: bool,
    /// Smooth repeated onsets associated with stutters
    pub stutter_detection: bool,
    /// Normalize accent traits (off by default to preserve identity)
    pub accent_normalization: bool,
    variation_tolerance: f32,
    dialect_markers: Vec<String>,
    phenomenological_integrity: f32,
    experiential_integrity: f32,
}

impl PhoneticProfile {
    /// Maximum number of dialect markers a profile carries
    pub const MAX_DIALECT_MARKERS: usize = 16;
    /// Default variation tolerance
    pub const DEFAULT_VARIATION_TOLERANCE: f32 = 0.7;
    /// Default value of both integrity scalars
    pub const DEFAULT_INTEGRITY: f32 = 0.95;

    /// Create a profile with default settings
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the variation tolerance
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if the value is outside `[0, 1]`.
    pub fn with_variation_tolerance(mut self, tolerance: f32) -> Result<Self, DomainError> {
        self.variation_tolerance = unit_interval("variation tolerance", tolerance)?;
        Ok(self)
    }

    /// Set the phenomenological and experiential integrity scalars
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` if either value is outside `[0, 1]`.
    pub fn with_integrity(
        mut self,
        phenomenological: f32,
        experiential: f32,
    ) -> Result<Self, DomainError> {
        self.phenomenological_integrity =
            unit_interval("phenomenological integrity", phenomenological)?;
        self.experiential_integrity = unit_interval("experiential integrity", experiential)?;
        Ok(self)
    }

    /// Record a dialect marker for the speaker
    ///
    /// Duplicate markers are ignored.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidInput` for a blank marker and
    /// `DomainError::ValidationError` when the profile is full.
    pub fn add_dialect_marker(&mut self, marker: impl Into<String>) -> Result<(), DomainError> {
        let marker = marker.into();
        let marker = marker.trim();
        if marker.is_empty() {
            return Err(DomainError::invalid_input("dialect marker is empty"));
        }
        if self.dialect_markers.iter().any(|m| m == marker) {
            return Ok(());
        }
        if self.dialect_markers.len() >= Self::MAX_DIALECT_MARKERS {
            return Err(DomainError::ValidationError(format!(
                "at most {} dialect markers are supported",
                Self::MAX_DIALECT_MARKERS
            )));
        }
        self.dialect_markers.push(marker.to_string());
        Ok(())
    }

    /// Variation tolerance in `[0, 1]`
    #[must_use]
    pub const fn variation_tolerance(&self) -> f32 {
        self.variation_tolerance
    }

    /// Dialect markers in insertion order
    #[must_use]
    pub fn dialect_markers(&self) -> &[String] {
        &self.dialect_markers
    }

    /// How strongly the speaker's perceived identity must be preserved
    #[must_use]
    pub const fn phenomenological_integrity(&self) -> f32 {
        self.phenomenological_integrity
    }

    /// How strongly the speaker's lived delivery must be preserved
    #[must_use]
    pub const fn experiential_integrity(&self) -> f32 {
        self.experiential_integrity
    }

    /// Check that every scalar is in range and the marker list is bounded
    ///
    /// Useful after deserializing a profile from untrusted input.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::ValidationError` describing the first violation.
    pub fn validate(&self) -> Result<(), DomainError> {
        for (name, value) in [
            ("variation tolerance", self.variation_tolerance),
            ("phenomenological integrity", self.phenomenological_integrity),
            ("experiential integrity", self.experiential_integrity),
        ] {
            unit_interval(name, value)
                .map_err(|e| DomainError::ValidationError(e.to_string()))?;
        }
        if self.dialect_markers.len() > Self::MAX_DIALECT_MARKERS {
            return Err(DomainError::ValidationError(format!(
                "at most {} dialect markers are supported",
                Self::MAX_DIALECT_MARKERS
            )));
        }
        Ok(())
    }
}

impl Default for PhoneticProfile {
    fn default() -> Self {
        Self {
            lisp_mitigation: true,
            stutter_detection: true,
            accent_normalization: false,
            variation_tolerance: Self::DEFAULT_VARIATION_TOLERANCE,
            dialect_markers: Vec::new(),
            phenomenological_integrity: Self::DEFAULT_INTEGRITY,
            experiential_integrity: Self::DEFAULT_INTEGRITY,
        }
    }
}

fn unit_interval(name: &str, value: f32) -> Result<f32, DomainError> {
    if (0.0..=1.0).contains(&value) {
        Ok(value)
    } else {
        Err(DomainError::invalid_input(format!(
            "{name} must be within [0, 1], got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_preserve_accent() {
        let profile = PhoneticProfile::default();
        assert!(profile.lisp_mitigation);
        assert!(profile.stutter_detection);
        assert!(!profile.accent_normalization);
        assert!((profile.variation_tolerance() - 0.7).abs() < f32::EPSILON);
        assert!((profile.phenomenological_integrity() - 0.95).abs() < f32::EPSILON);
        assert!((profile.experiential_integrity() - 0.95).abs() < f32::EPSILON);
        assert!(profile.validate().is_ok());
    }

    #[test]
    fn tolerance_must_be_in_unit_interval() {
        assert!(PhoneticProfile::new().with_variation_tolerance(1.5).is_err());
        assert!(PhoneticProfile::new().with_variation_tolerance(-0.1).is_err());
        assert!(PhoneticProfile::new().with_variation_tolerance(f32::NAN).is_err());
        let profile = PhoneticProfile::new().with_variation_tolerance(0.2).unwrap();
        assert!((profile.variation_tolerance() - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn integrity_error_message() {
        let err = PhoneticProfile::new().with_integrity(0.5, 2.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid input: experiential integrity must be within [0, 1], got 2"
        );
    }

    #[test]
    fn dialect_markers_are_bounded_and_deduplicated() {
        let mut profile = PhoneticProfile::new();
        profile.add_dialect_marker("rhotic").unwrap();
        profile.add_dialect_marker(" rhotic ").unwrap();
        assert_eq!(profile.dialect_markers(), ["rhotic".to_string()]);

        for i in 1..PhoneticProfile::MAX_DIALECT_MARKERS {
            profile.add_dialect_marker(format!("marker-{i}")).unwrap();
        }
        assert_eq!(
            profile.dialect_markers().len(),
            PhoneticProfile::MAX_DIALECT_MARKERS
        );
        let err = profile.add_dialect_marker("one-too-many").unwrap_err();
        assert!(matches!(err, DomainError::ValidationError(_)));
    }

    #[test]
    fn blank_marker_is_rejected() {
        let mut profile = PhoneticProfile::new();
        assert!(profile.add_dialect_marker("  ").is_err());
    }

    #[test]
    fn validate_catches_deserialized_out_of_range_values() {
        let json = r#"{
            "lisp_mitigation": true,
            "stutter_detection": false,
            "accent_normalization": false,
            "variation_tolerance": 3.0,
            "dialect_markers": [],
            "phenomenological_integrity": 0.9,
            "experiential_integrity": 0.9
        }"#;
        let profile: PhoneticProfile = serde_json::from_str(json).unwrap();
        assert!(matches!(
            profile.validate(),
            Err(DomainError::ValidationError(_))
        ));
    }
}
