//! Conversion cycles answered by a reviewer over the channel adapter

use std::sync::Arc;

use ai_speech::{
    BackendCapabilities, BackendRegistry, PcmAudio, SpeechBackend, SpeechError, Synthesis,
    TextToSpeech,
};
use application::{ConversionContext, ConversionRequest, SynthesisRequest};
use async_trait::async_trait;
use infrastructure::{AppConfig, ChannelValidationAdapter};

/// Synthesis backend that is never sure of itself
struct HesitantVoice;

#[async_trait]
impl TextToSpeech for HesitantVoice {
    async fn synthesize(&self, text: &str) -> Result<Synthesis, SpeechError> {
        Ok(Synthesis::new(
            PcmAudio::new(vec![0.1; text.len() * 4], 16_000)?,
            0.4,
        ))
    }
}

impl SpeechBackend for HesitantVoice {
    fn name(&self) -> &str {
        "piper"
    }

    fn capabilities(&self) -> BackendCapabilities {
        BackendCapabilities::synthesis()
    }

    fn as_text_to_speech(&self) -> Option<&dyn TextToSpeech> {
        Some(self)
    }
}

fn registry() -> Arc<BackendRegistry> {
    let mut registry = BackendRegistry::new();
    registry.register(Arc::new(HesitantVoice)).unwrap();
    Arc::new(registry)
}

#[tokio::test]
async fn reviewer_correction_completes_the_cycle() {
    let config = AppConfig::from_toml_str("[conversion]\nconfirmation_threshold = 0.5").unwrap();
    let service = config.conversion_service(registry()).unwrap();
    let ctx = ConversionContext::with_own_directory(&config.conversion).unwrap();
    let (adapter, mut reviewer) = ChannelValidationAdapter::channel(1);

    let review = tokio::spawn(async move {
        let request = reviewer.next_request().await.unwrap();
        let shown = request.feedback().original_interpretation.clone();
        assert!(request.correct("see you tomorrow"));
        shown
    });

    let report = service
        .run_with_validation(
            &ctx,
            ConversionRequest::Synthesize(SynthesisRequest::new("see you tomorow", 0.5)),
            &adapter,
        )
        .await
        .unwrap()
        .unwrap();

    assert_eq!(review.await.unwrap(), "see you tomorow");
    assert!(report.human_validated);
    assert!(report.corrected);
    assert_eq!(report.interpretation, "see you tomorrow");
    assert_eq!(report.output.audio().unwrap().len(), "see you tomorrow".len() * 4);
}

#[tokio::test]
async fn reviewer_abandonment_yields_no_report() {
    let config = AppConfig::default();
    let service = config.conversion_service(registry()).unwrap();
    let ctx = ConversionContext::with_own_directory(&config.conversion).unwrap();
    let (adapter, mut reviewer) = ChannelValidationAdapter::channel(1);

    let review = tokio::spawn(async move {
        let request = reviewer.next_request().await.unwrap();
        assert!(request.abandon());
    });

    let report = service
        .run_with_validation(
            &ctx,
            ConversionRequest::Synthesize(SynthesisRequest::new("hello", 0.5)),
            &adapter,
        )
        .await
        .unwrap();

    review.await.unwrap();
    assert!(report.is_none());
}
