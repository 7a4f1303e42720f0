//! Conversion cycle requests and outcomes

use ai_speech::PcmAudio;
use ai_speech::phonetics::{NormalizationPasses, VariationReport};
use chrono::{DateTime, Utc};
use domain::{
    ConversionDirection, Coordinate, CycleId, DriftTransition, HumanFeedback, StrategyId,
};
use serde::Serialize;

use super::escalation_gate::EscalationGate;
use crate::error::ApplicationError;

/// Audio to transcribe, with the drift observed for this cycle
#[derive(Debug, Clone, PartialEq)]
pub struct TranscriptionRequest {
    /// Decoded mono audio
    pub audio: PcmAudio,
    /// Drift magnitude in `[0, 1]`
    pub drift_magnitude: f32,
}

impl TranscriptionRequest {
    /// Create a transcription request
    #[must_use]
    pub const fn new(audio: PcmAudio, drift_magnitude: f32) -> Self {
        Self {
            audio,
            drift_magnitude,
        }
    }
}

/// Text to synthesize, with the drift observed for this cycle
#[derive(Debug, Clone, PartialEq)]
pub struct SynthesisRequest {
    /// Text to speak
    pub text: String,
    /// Drift magnitude in `[0, 1]`
    pub drift_magnitude: f32,
}

impl SynthesisRequest {
    /// Create a synthesis request
    #[must_use]
    pub fn new(text: impl Into<String>, drift_magnitude: f32) -> Self {
        Self {
            text: text.into(),
            drift_magnitude,
        }
    }
}

/// Either direction of conversion
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionRequest {
    /// Speech to text
    Transcribe(TranscriptionRequest),
    /// Text to speech
    Synthesize(SynthesisRequest),
}

impl ConversionRequest {
    /// Direction of the request
    #[must_use]
    pub const fn direction(&self) -> ConversionDirection {
        match self {
            Self::Transcribe(_) => ConversionDirection::Transcribe,
            Self::Synthesize(_) => ConversionDirection::Synthesize,
        }
    }
}

/// What a cycle produced
#[derive(Debug, Clone, PartialEq)]
pub enum ConversionOutput {
    /// Transcribed text
    Text(String),
    /// Synthesized audio
    Audio(PcmAudio),
}

impl ConversionOutput {
    /// The text, for transcription output
    #[must_use]
    pub fn text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            Self::Audio(_) => None,
        }
    }

    /// The audio, for synthesis output
    #[must_use]
    pub const fn audio(&self) -> Option<&PcmAudio> {
        match self {
            Self::Text(_) => None,
            Self::Audio(audio) => Some(audio),
        }
    }
}

/// Everything known about a finished (or pending) cycle
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Cycle identifier
    pub id: CycleId,
    /// Conversion direction
    pub direction: ConversionDirection,
    /// Backend that produced the output
    pub strategy: StrategyId,
    /// Converted payload
    pub output: ConversionOutput,
    /// Text side of the conversion: the transcript, or the synthesized text
    pub interpretation: String,
    /// Backend confidence
    pub confidence: f32,
    /// Context coordinate after the cycle
    pub coordinate: Coordinate,
    /// Drift transition of the cycle
    pub transition: DriftTransition,
    /// Variation analysis, for transcription
    pub variation: Option<VariationReport>,
    /// Normalization passes applied, for transcription
    pub normalization: NormalizationPasses,
    /// A reviewer validated the output
    pub human_validated: bool,
    /// The reviewer replaced the output
    pub corrected: bool,
}

/// Why a cycle is waiting for a human
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "snake_case", tag = "kind")]
pub enum SuspensionReason {
    /// Recovery attempts are exhausted
    CascadeLimitExceeded {
        /// Attempts made
        attempts: u8,
    },
    /// Drift is in the human stress zone
    HumanStress,
    /// Backend confidence fell below the confirmation threshold
    LowConfidence {
        /// Reported confidence
        confidence: f32,
        /// Threshold it was compared against
        threshold: f32,
    },
}

impl SuspensionReason {
    /// Decide whether a cycle must wait for a human, and why
    ///
    /// Drift escalation takes precedence over the confidence gate.
    #[must_use]
    pub fn evaluate(
        transition: &DriftTransition,
        confidence: f32,
        gate: &EscalationGate,
    ) -> Option<Self> {
        if transition.cascade_limit_exceeded {
            Some(Self::CascadeLimitExceeded {
                attempts: transition.recovery_attempts,
            })
        } else if transition.requires_human_validation {
            Some(Self::HumanStress)
        } else if gate.requires_confirmation(confidence) {
            Some(Self::LowConfidence {
                confidence,
                threshold: gate.confirmation_threshold(),
            })
        } else {
            None
        }
    }

    /// The mandatory-escalation error, for callers that treat it as one
    #[must_use]
    pub const fn as_error(&self) -> Option<ApplicationError> {
        match self {
            Self::CascadeLimitExceeded { attempts } => {
                Some(ApplicationError::DriftCascadeLimitExceeded {
                    attempts: *attempts,
                })
            },
            Self::HumanStress | Self::LowConfidence { .. } => None,
        }
    }
}

/// A cycle paused until a reviewer answers
///
/// Nothing times out at this layer: the caller either resumes the cycle
/// with a response or abandons it.
#[derive(Debug, Clone, PartialEq)]
pub struct SuspendedCycle {
    pub(crate) pending: CycleReport,
    pub(crate) feedback: HumanFeedback,
    pub(crate) reason: SuspensionReason,
    pub(crate) suspended_at: DateTime<Utc>,
}

impl SuspendedCycle {
    pub(crate) fn new(
        pending: CycleReport,
        feedback: HumanFeedback,
        reason: SuspensionReason,
    ) -> Self {
        Self {
            pending,
            feedback,
            reason,
            suspended_at: Utc::now(),
        }
    }

    /// Cycle identifier
    #[must_use]
    pub const fn id(&self) -> CycleId {
        self.pending.id
    }

    /// Output awaiting validation
    #[must_use]
    pub const fn pending(&self) -> &CycleReport {
        &self.pending
    }

    /// Request to put in front of the reviewer
    #[must_use]
    pub const fn feedback(&self) -> &HumanFeedback {
        &self.feedback
    }

    /// Why the cycle was suspended
    #[must_use]
    pub const fn reason(&self) -> SuspensionReason {
        self.reason
    }

    /// When the cycle was suspended
    #[must_use]
    pub const fn suspended_at(&self) -> DateTime<Utc> {
        self.suspended_at
    }
}

/// Result of running one cycle
#[derive(Debug, Clone, PartialEq)]
pub enum CycleOutcome {
    /// Output released
    Completed(CycleReport),
    /// Output held for human validation
    Suspended(SuspendedCycle),
}

impl CycleOutcome {
    /// Whether the cycle is waiting for a human
    #[must_use]
    pub const fn is_suspended(&self) -> bool {
        matches!(self, Self::Suspended(_))
    }

    /// The report, if the cycle completed
    #[must_use]
    pub const fn completed(&self) -> Option<&CycleReport> {
        match self {
            Self::Completed(report) => Some(report),
            Self::Suspended(_) => None,
        }
    }

    /// The suspension, if the cycle is waiting
    #[must_use]
    pub const fn suspended(&self) -> Option<&SuspendedCycle> {
        match self {
            Self::Completed(_) => None,
            Self::Suspended(suspended) => Some(suspended),
        }
    }
}

#[cfg(test)]
mod tests {
    use domain::{FailureZone, TreeMode};

    use super::*;

    fn transition(zone: FailureZone, cascade_limit_exceeded: bool) -> DriftTransition {
        DriftTransition {
            previous_zone: FailureZone::Green,
            zone,
            failure_magnitude: 0.0,
            tree_mode: TreeMode::Hybrid,
            coherence_threshold: 0.954,
            cascade: false,
            cascade_limit_exceeded,
            requires_human_validation: zone.requires_human(),
            recovery_attempts: 3,
        }
    }

    #[test]
    fn confident_green_cycle_is_released() {
        let gate = EscalationGate::default();
        let reason = SuspensionReason::evaluate(&transition(FailureZone::Green, false), 0.9, &gate);
        assert!(reason.is_none());
    }

    #[test]
    fn low_confidence_suspends() {
        let gate = EscalationGate::default();
        let reason =
            SuspensionReason::evaluate(&transition(FailureZone::Green, false), 0.84, &gate).unwrap();
        assert!(matches!(reason, SuspensionReason::LowConfidence { .. }));
        assert!(reason.as_error().is_none());
    }

    #[test]
    fn cascade_limit_takes_precedence() {
        let gate = EscalationGate::default();
        let reason =
            SuspensionReason::evaluate(&transition(FailureZone::HumanStress, true), 0.1, &gate)
                .unwrap();
        assert_eq!(reason, SuspensionReason::CascadeLimitExceeded { attempts: 3 });
        assert!(reason.as_error().unwrap().is_mandatory_escalation());
    }

    #[test]
    fn human_stress_suspends_confident_output() {
        let gate = EscalationGate::default();
        let reason =
            SuspensionReason::evaluate(&transition(FailureZone::HumanStress, false), 0.99, &gate);
        assert_eq!(reason, Some(SuspensionReason::HumanStress));
    }

    #[test]
    fn reason_serializes_with_kind() {
        let json = serde_json::to_string(&SuspensionReason::HumanStress).unwrap();
        assert_eq!(json, r#"{"kind":"human_stress"}"#);
    }

    #[test]
    fn output_accessors() {
        let text = ConversionOutput::Text("hi".to_string());
        assert_eq!(text.text(), Some("hi"));
        assert!(text.audio().is_none());
        let audio = ConversionOutput::Audio(PcmAudio::new(vec![0.0; 4], 16_000).unwrap());
        assert!(audio.text().is_none());
        assert_eq!(audio.audio().unwrap().len(), 4);
    }
}
