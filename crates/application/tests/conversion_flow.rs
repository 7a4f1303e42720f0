//! End-to-end tests of conversion cycles
//!
//! Wires in-memory backends and a scripted reviewer into the conversion
//! service and drives full cycles through drift, discovery and escalation.

use std::sync::Arc;

use ai_speech::{
    BackendCapabilities, BackendRegistry, PcmAudio, SpeechBackend, SpeechConfig, SpeechError,
    SpeechToText, Synthesis, TextToSpeech, Transcription,
};
use application::{
    ApplicationError, ConversionConfig, ConversionContext, ConversionRequest, ConversionService,
    HumanValidationPort, ServiceDirectory, SuspensionReason, SynthesisRequest,
    TranscriptionRequest, ValidationResponse,
};
use async_trait::async_trait;
use domain::{
    ConversionDirection, FailureZone, GeomorphicCoordinate, HumanFeedback, ServiceKey,
    ServiceRegistration, StrategyId, TreeMode,
};
use parking_lot::Mutex;

struct EchoBackend {
    name: &'static str,
    confidence: f32,
}

#[async_trait]
impl SpeechToText for EchoBackend {
    async fn transcribe(&self, audio: &PcmAudio) -> Result<Transcription, SpeechError> {
        Ok(Transcription::new(
            format!("{} heard {} samples", self.name, audio.len()),
            self.confidence,
        ))
    }
}

#[async_trait]
impl TextToSpeech for EchoBackend {
    async fn synthesize(&self, text: &str) -> Result<Synthesis, SpeechError> {
        let audio = PcmAudio::new(vec![0.25; text.len() * 8], 16_000)?;
        Ok(Synthesis::new(audio, self.confidence))
    }
}

impl SpeechBackend for EchoBackend {
    fn name(&self) -> &str {
        self.name
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::duplex()
    }

    fn as_speech_to_text(&self) -> Option<&dyn SpeechToText> {
        Some(self)
    }

    fn as_text_to_speech(&self) -> Option<&dyn TextToSpeech> {
        Some(self)
    }
}

/// Reviewer answering from a script and remembering what it was shown
#[derive(Default)]
struct ScriptedReviewer {
    script: Mutex<Vec<ValidationResponse>>,
    shown: Mutex<Vec<HumanFeedback>>,
}

impl ScriptedReviewer {
    fn answering(responses: Vec<ValidationResponse>) -> Self {
        let mut script = responses;
        script.reverse();
        Self {
            script: Mutex::new(script),
            shown: Mutex::default(),
        }
    }
}

#[async_trait]
impl HumanValidationPort for ScriptedReviewer {
    async fn request_validation(
        &self,
        feedback: HumanFeedback,
    ) -> Result<ValidationResponse, ApplicationError> {
        self.shown.lock().push(feedback);
        self.script
            .lock()
            .pop()
            .ok_or_else(|| ApplicationError::backend_failure("reviewer", "script exhausted"))
    }
}

fn registry(confidence: f32) -> Arc<BackendRegistry> {
    let mut registry = BackendRegistry::new();
    for name in ["whisper", "piper", "whisper-large"] {
        registry
            .register(Arc::new(EchoBackend { name, confidence }))
            .unwrap();
    }
    Arc::new(registry)
}

fn service(confidence: f32) -> ConversionService {
    ConversionService::new(
        registry(confidence),
        ConversionConfig::default(),
        SpeechConfig::default(),
    )
    .unwrap()
}

fn speech(len: usize) -> PcmAudio {
    let samples = (0..len)
        .map(|i| {
            let t = i as f32 / 16_000.0;
            (std::f32::consts::TAU * 180.0 * t).sin() * 0.6
        })
        .collect();
    PcmAudio::new(samples, 16_000).unwrap()
}

#[tokio::test]
async fn cascade_is_escalated_and_reset_by_reviewer() {
    let service = service(0.99);
    let ctx = ConversionContext::with_own_directory(service.config()).unwrap();
    let reviewer = ScriptedReviewer::answering(vec![ValidationResponse::Corrected(
        "good morning".to_string(),
    )]);

    for attempt in 1..=3 {
        let report = service
            .run_with_validation(
                &ctx,
                ConversionRequest::Synthesize(SynthesisRequest::new("good mornin", 0.1)),
                &reviewer,
            )
            .await
            .unwrap()
            .unwrap();
        assert_eq!(report.transition.zone, FailureZone::AiStress);
        assert_eq!(report.transition.recovery_attempts, attempt);
        assert!(!report.human_validated);
    }
    assert_eq!(ctx.directory().mode(), TreeMode::Relaxed);

    let report = service
        .run_with_validation(
            &ctx,
            ConversionRequest::Synthesize(SynthesisRequest::new("good mornin", 0.1)),
            &reviewer,
        )
        .await
        .unwrap()
        .unwrap();

    assert!(report.transition.cascade_limit_exceeded);
    assert!(report.human_validated);
    assert!(report.corrected);
    assert_eq!(report.interpretation, "good morning");
    assert_eq!(report.output.audio().unwrap().len(), "good morning".len() * 8);
    assert_eq!(ctx.directory().mode(), TreeMode::Strict);
    assert_eq!(ctx.drift().recovery_attempts(), 0);

    let shown = reviewer.shown.lock();
    assert_eq!(shown.len(), 1);
    assert_eq!(shown[0].original_interpretation, "good mornin");
    assert!((shown[0].confidence_threshold - 0.85).abs() < f32::EPSILON);
}

#[tokio::test]
async fn reviewer_failure_surfaces_as_error() {
    let service = service(0.3);
    let ctx = ConversionContext::with_own_directory(service.config()).unwrap();
    let reviewer = ScriptedReviewer::default();

    let err = service
        .run_with_validation(
            &ctx,
            ConversionRequest::Transcribe(TranscriptionRequest::new(speech(4096), 0.5)),
            &reviewer,
        )
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Backend 'reviewer' failed: script exhausted");
}

#[tokio::test]
async fn registered_strategies_are_selected_per_direction() {
    let service = service(0.99);
    let directory = Arc::new(ServiceDirectory::new(TreeMode::Hybrid));
    directory
        .register(ServiceRegistration::new(
            ServiceKey::new("stt", "transcribe-large").unwrap(),
            GeomorphicCoordinate::for_direction(ConversionDirection::Transcribe, 500, 500),
            StrategyId::new("whisper-large").unwrap(),
        ))
        .unwrap();
    directory
        .register(ServiceRegistration::new(
            ServiceKey::new("tts", "synthesize-default").unwrap(),
            GeomorphicCoordinate::for_direction(ConversionDirection::Synthesize, 500, 500),
            StrategyId::new("piper").unwrap(),
        ))
        .unwrap();
    let ctx = ConversionContext::new(service.config(), Arc::clone(&directory)).unwrap();

    let outcome = service
        .revoice(&ctx, TranscriptionRequest::new(speech(8000), 0.5))
        .await
        .unwrap();

    let report = outcome.completed().unwrap();
    assert_eq!(report.direction, ConversionDirection::Synthesize);
    assert_eq!(report.strategy.as_str(), "piper");
    assert_eq!(report.interpretation, "whisper-large heard 8000 samples");

    let large = directory
        .lookup(&ServiceKey::new("stt", "transcribe-large").unwrap())
        .unwrap();
    // one selection plus this lookup
    assert_eq!(large.access_frequency, 2);
    assert!(directory.verify().is_ok());
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn contexts_share_a_directory_concurrently() {
    let service = Arc::new(service(0.99));
    let directory = Arc::new(ServiceDirectory::new(TreeMode::Hybrid));
    directory
        .register(ServiceRegistration::new(
            ServiceKey::new("stt", "transcribe-default").unwrap(),
            GeomorphicCoordinate::for_direction(ConversionDirection::Transcribe, 500, 500),
            StrategyId::new("whisper").unwrap(),
        ))
        .unwrap();

    let mut handles = Vec::new();
    for worker in 0..8 {
        let service = Arc::clone(&service);
        let ctx = ConversionContext::new(service.config(), Arc::clone(&directory)).unwrap();
        handles.push(tokio::spawn(async move {
            let outcome = service
                .transcribe(&ctx, TranscriptionRequest::new(speech(2048 + worker * 64), 0.5))
                .await?;
            Ok::<_, ApplicationError>(outcome.is_suspended())
        }));
    }
    for handle in handles {
        assert!(!handle.await.unwrap().unwrap());
    }

    let entry = directory.entries().pop().unwrap();
    assert_eq!(entry.access_frequency, 8);
    assert!(directory.verify().is_ok());
}

#[tokio::test]
async fn human_stress_cycle_can_be_abandoned() {
    let service = service(0.99);
    let ctx = ConversionContext::with_own_directory(service.config()).unwrap();

    let outcome = service
        .transcribe(&ctx, TranscriptionRequest::new(speech(4096), 0.95))
        .await
        .unwrap();
    let suspended = outcome.suspended().unwrap().clone();
    assert_eq!(suspended.reason(), SuspensionReason::HumanStress);
    // entering human stress directly keeps the green threshold
    assert!((suspended.feedback().confidence_threshold - 0.954).abs() < f32::EPSILON);

    let id = suspended.id();
    assert_eq!(service.abandon(suspended), id);
    assert_eq!(ctx.drift().zone(), FailureZone::HumanStress);
}
