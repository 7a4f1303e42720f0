//! Conversion service - runs speech/text conversion cycles
//!
//! A transcription cycle:
//! 1. Detect speaker variation and update the profile
//! 2. Normalize the audio when the variation is high enough
//! 3. Summarize and map the audio into a coordinate
//! 4. Select the nearest strategy and run its backend
//! 5. Observe drift and pass the result through the escalation gate
//!
//! Synthesis skips the acoustic steps and selects from the context's current
//! coordinate. A cycle that needs a human is returned suspended; the caller
//! resumes or abandons it.

use std::{fmt, sync::Arc};

use ai_speech::phonetics::{
    ChunkAnalysis, CoordinateMapper, FeatureSummarizer, NormalizationPasses, PhoneticNormalizer,
    VariationDetector, VariationReport, analyze_chunks,
};
use ai_speech::{AudioFormat, BackendRegistry, MediaDecoder, PcmAudio, SpeechConfig};
use domain::{ConversionDirection, CycleId, StrategyId};
use tracing::{debug, info, instrument, warn};

use super::conversion_context::ConversionContext;
use super::cycle::{
    ConversionOutput, ConversionRequest, CycleOutcome, CycleReport, SuspendedCycle,
    SuspensionReason, SynthesisRequest, TranscriptionRequest,
};
use super::escalation_gate::EscalationGate;
use crate::config::ConversionConfig;
use crate::error::ApplicationError;
use crate::ports::{HumanValidationPort, ValidationResponse};

/// Orchestrates conversion cycles over explicit contexts
pub struct ConversionService {
    registry: Arc<BackendRegistry>,
    decoder: Option<Arc<dyn MediaDecoder>>,
    config: ConversionConfig,
    speech: SpeechConfig,
    gate: EscalationGate,
    detector: VariationDetector,
    normalizer: PhoneticNormalizer,
    summarizer: FeatureSummarizer,
    mapper: CoordinateMapper,
}

impl fmt::Debug for ConversionService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConversionService")
            .field("registry", &self.registry)
            .field("has_decoder", &self.decoder.is_some())
            .field("config", &self.config)
            .field("speech", &self.speech)
            .finish_non_exhaustive()
    }
}

/// Analysis half of a transcription cycle, computed without awaiting
struct Analysis {
    audio: PcmAudio,
    report: VariationReport,
    passes: NormalizationPasses,
}

impl ConversionService {
    /// Create a conversion service
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if either configuration is
    /// invalid.
    pub fn new(
        registry: Arc<BackendRegistry>,
        config: ConversionConfig,
        speech: SpeechConfig,
    ) -> Result<Self, ApplicationError> {
        config.validate().map_err(ApplicationError::Configuration)?;
        speech.validate().map_err(ApplicationError::Configuration)?;
        let gate = EscalationGate::new(config.confirmation_threshold)?;
        Ok(Self {
            registry,
            decoder: None,
            config,
            speech,
            gate,
            detector: VariationDetector::new(),
            normalizer: PhoneticNormalizer::new(),
            summarizer: FeatureSummarizer::new(),
            mapper: CoordinateMapper::new(),
        })
    }

    /// Attach a media decoder for [`ConversionService::transcribe_media`]
    #[must_use]
    pub fn with_decoder(mut self, decoder: Arc<dyn MediaDecoder>) -> Self {
        self.decoder = Some(decoder);
        self
    }

    /// Conversion configuration in force
    #[must_use]
    pub const fn config(&self) -> &ConversionConfig {
        &self.config
    }

    /// Escalation gate in force
    #[must_use]
    pub const fn gate(&self) -> &EscalationGate {
        &self.gate
    }

    /// Transcribe audio to text
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidInput` for an out-of-range drift,
    /// oversized or too-short audio, `NotFound` if the selected backend is not
    /// registered, or the backend's failure unchanged.
    #[instrument(skip(self, ctx, request), fields(
        samples = request.audio.len(),
        drift = request.drift_magnitude
    ))]
    pub async fn transcribe(
        &self,
        ctx: &ConversionContext,
        request: TranscriptionRequest,
    ) -> Result<CycleOutcome, ApplicationError> {
        let id = CycleId::new();
        check_drift(request.drift_magnitude)?;
        if request.audio.len() > self.speech.max_samples_per_cycle {
            return Err(ApplicationError::InvalidInput(format!(
                "{} samples exceed the per-cycle limit of {}",
                request.audio.len(),
                self.speech.max_samples_per_cycle
            )));
        }

        let analysis = self.analyze(ctx, request.audio)?;
        let coordinate = ctx.coordinate();
        let strategy = self.select(ctx, ConversionDirection::Transcribe)?;

        let stt = self.registry.speech_to_text(strategy.as_str())?;
        let transcription = stt.transcribe(&analysis.audio).await?;
        debug!(
            strategy = %strategy,
            confidence = transcription.confidence,
            "Transcription complete"
        );

        let transition = ctx
            .drift()
            .observe(request.drift_magnitude, ctx.directory())?;

        let report = CycleReport {
            id,
            direction: ConversionDirection::Transcribe,
            strategy,
            interpretation: transcription.text.clone(),
            output: ConversionOutput::Text(transcription.text),
            confidence: transcription.confidence,
            coordinate,
            transition,
            variation: Some(analysis.report),
            normalization: analysis.passes,
            human_validated: false,
            corrected: false,
        };
        Ok(self.gate_cycle(ctx, report))
    }

    /// Synthesize text to audio
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::InvalidInput` for blank text or an
    /// out-of-range drift, `NotFound` if the selected backend is not
    /// registered, or the backend's failure unchanged.
    #[instrument(skip(self, ctx, request), fields(
        text_len = request.text.len(),
        drift = request.drift_magnitude
    ))]
    pub async fn synthesize(
        &self,
        ctx: &ConversionContext,
        request: SynthesisRequest,
    ) -> Result<CycleOutcome, ApplicationError> {
        let id = CycleId::new();
        check_drift(request.drift_magnitude)?;
        if request.text.trim().is_empty() {
            return Err(ApplicationError::InvalidInput(
                "text to synthesize is empty".to_string(),
            ));
        }

        let coordinate = ctx.coordinate();
        let strategy = self.select(ctx, ConversionDirection::Synthesize)?;

        let tts = self.registry.text_to_speech(strategy.as_str())?;
        let synthesis = tts.synthesize(&request.text).await?;
        debug!(
            strategy = %strategy,
            confidence = synthesis.confidence,
            duration_ms = synthesis.audio.duration_ms(),
            "Synthesis complete"
        );

        let transition = ctx
            .drift()
            .observe(request.drift_magnitude, ctx.directory())?;

        let report = CycleReport {
            id,
            direction: ConversionDirection::Synthesize,
            strategy,
            interpretation: request.text,
            output: ConversionOutput::Audio(synthesis.audio),
            confidence: synthesis.confidence,
            coordinate,
            transition,
            variation: None,
            normalization: NormalizationPasses::default(),
            human_validated: false,
            corrected: false,
        };
        Ok(self.gate_cycle(ctx, report))
    }

    /// Decode a media container and transcribe it
    ///
    /// # Errors
    ///
    /// Returns `ApplicationError::Configuration` if no decoder is attached,
    /// a backend failure if decoding fails, or see
    /// [`ConversionService::transcribe`].
    #[instrument(skip(self, ctx, bytes), fields(bytes = bytes.len(), format = %format))]
    pub async fn transcribe_media(
        &self,
        ctx: &ConversionContext,
        bytes: &[u8],
        format: AudioFormat,
        drift_magnitude: f32,
    ) -> Result<CycleOutcome, ApplicationError> {
        let decoder = self.decoder.as_ref().ok_or_else(|| {
            ApplicationError::Configuration("no media decoder configured".to_string())
        })?;
        let audio = decoder.decode(bytes, format).await?;
        debug!(
            samples = audio.len(),
            sample_rate = audio.sample_rate(),
            "Decoded media"
        );
        self.transcribe(ctx, TranscriptionRequest::new(audio, drift_magnitude))
            .await
    }

    /// Transcribe audio and speak the transcript back
    ///
    /// Each half is a full cycle. A suspended transcription is returned as
    /// is, without synthesizing.
    ///
    /// # Errors
    ///
    /// See [`ConversionService::transcribe`] and
    /// [`ConversionService::synthesize`].
    #[instrument(skip(self, ctx, request), fields(samples = request.audio.len()))]
    pub async fn revoice(
        &self,
        ctx: &ConversionContext,
        request: TranscriptionRequest,
    ) -> Result<CycleOutcome, ApplicationError> {
        let drift = request.drift_magnitude;
        let transcript = match self.transcribe(ctx, request).await? {
            CycleOutcome::Completed(report) => report.interpretation,
            suspended @ CycleOutcome::Suspended(_) => return Ok(suspended),
        };
        self.synthesize(ctx, SynthesisRequest::new(transcript, drift))
            .await
    }

    /// Complete a suspended cycle with a reviewer's response
    ///
    /// Returns `None` when the reviewer abandoned the cycle. A correction
    /// replaces a transcript directly; for synthesis the corrected text is
    /// synthesized again with the same backend.
    ///
    /// # Errors
    ///
    /// Returns the backend's failure if re-synthesis fails; the context is
    /// left as it was before the call.
    #[instrument(skip(self, ctx, suspended), fields(cycle = %suspended.id()))]
    pub async fn resume(
        &self,
        ctx: &ConversionContext,
        suspended: SuspendedCycle,
        response: ValidationResponse,
    ) -> Result<Option<CycleReport>, ApplicationError> {
        let Some(feedback) = response.resolve(suspended.feedback.clone()) else {
            self.abandon(suspended);
            return Ok(None);
        };

        let mut report = suspended.pending;
        // the context is only touched once the corrected output exists
        if let Some(correction) = feedback.correction() {
            match report.direction {
                ConversionDirection::Transcribe => {
                    report.output = ConversionOutput::Text(correction.to_string());
                },
                ConversionDirection::Synthesize => {
                    let tts = self.registry.text_to_speech(report.strategy.as_str())?;
                    let synthesis = tts.synthesize(correction).await?;
                    report.output = ConversionOutput::Audio(synthesis.audio);
                    report.confidence = synthesis.confidence;
                },
            }
            report.interpretation = correction.to_string();
        }

        let corrected = self.gate.incorporate(ctx, &feedback);
        report.human_validated = true;
        report.corrected = corrected;
        report.coordinate = ctx.coordinate();

        info!(
            cycle = %report.id,
            corrected,
            "Resumed cycle after human validation"
        );
        Ok(Some(report))
    }

    /// End a suspended cycle without incorporating anything
    pub fn abandon(&self, suspended: SuspendedCycle) -> CycleId {
        warn!(
            cycle = %suspended.id(),
            reason = ?suspended.reason(),
            suspended_at = %suspended.suspended_at(),
            "Abandoned suspended cycle"
        );
        suspended.id()
    }

    /// Run a cycle and, if it suspends, wait for a reviewer through `port`
    ///
    /// # Errors
    ///
    /// Returns the cycle's error, the port's error, or see
    /// [`ConversionService::resume`].
    pub async fn run_with_validation(
        &self,
        ctx: &ConversionContext,
        request: ConversionRequest,
        port: &dyn HumanValidationPort,
    ) -> Result<Option<CycleReport>, ApplicationError> {
        let outcome = match request {
            ConversionRequest::Transcribe(request) => self.transcribe(ctx, request).await?,
            ConversionRequest::Synthesize(request) => self.synthesize(ctx, request).await?,
        };
        match outcome {
            CycleOutcome::Completed(report) => Ok(Some(report)),
            CycleOutcome::Suspended(suspended) => {
                let response = port.request_validation(suspended.feedback().clone()).await?;
                self.resume(ctx, suspended, response).await
            },
        }
    }

    /// Analyze independent chunks in parallel against the context's profile
    ///
    /// The context itself is not modified.
    ///
    /// # Errors
    ///
    /// Returns the first chunk failure in input order.
    pub async fn analyze_chunks(
        &self,
        ctx: &ConversionContext,
        chunks: Vec<PcmAudio>,
    ) -> Result<Vec<ChunkAnalysis>, ApplicationError> {
        Ok(analyze_chunks(chunks, &ctx.profile()).await?)
    }

    /// Detect, normalize, summarize and map, updating profile and coordinate
    fn analyze(
        &self,
        ctx: &ConversionContext,
        audio: PcmAudio,
    ) -> Result<Analysis, ApplicationError> {
        let sample_rate = audio.sample_rate();
        let report = ctx.update_profile(|profile| {
            self.detector
                .detect(audio.samples(), sample_rate, profile)
        })?;

        let mut samples = audio.into_samples();
        let passes = if report.score > self.config.normalization_trigger {
            let profile = ctx.profile();
            self.normalizer
                .apply(&mut samples, &profile, self.config.preservation_factor)?
        } else {
            NormalizationPasses::default()
        };

        let features = self.summarizer.summarize(&samples)?;
        let coordinate = self.mapper.map_features(
            &features,
            report.score,
            ctx.drift().coherence_threshold(),
        )?;
        ctx.set_coordinate(coordinate);
        debug!(
            score = report.score,
            lisp = passes.lisp,
            stutter = passes.stutter,
            coordinate = %coordinate,
            "Mapped audio"
        );

        Ok(Analysis {
            audio: PcmAudio::new(samples, sample_rate)?,
            report,
            passes,
        })
    }

    /// Nearest strategy for the context's coordinate, or the default backend
    fn select(
        &self,
        ctx: &ConversionContext,
        direction: ConversionDirection,
    ) -> Result<StrategyId, ApplicationError> {
        if let Some(hit) = ctx.directory().select(direction, &ctx.coordinate()) {
            return Ok(hit.strategy);
        }
        let fallback = match direction {
            ConversionDirection::Transcribe => &self.speech.default_stt_backend,
            ConversionDirection::Synthesize => &self.speech.default_tts_backend,
        };
        debug!(%direction, backend = %fallback, "No strategy matched, using default backend");
        Ok(StrategyId::new(fallback.as_str())?)
    }

    /// Release the report or suspend it for a human
    fn gate_cycle(&self, ctx: &ConversionContext, report: CycleReport) -> CycleOutcome {
        let Some(reason) =
            SuspensionReason::evaluate(&report.transition, report.confidence, &self.gate)
        else {
            info!(
                cycle = %report.id,
                direction = %report.direction,
                strategy = %report.strategy,
                zone = %report.transition.zone,
                "Cycle completed"
            );
            return CycleOutcome::Completed(report);
        };

        let feedback = self.gate.escalate(&report.interpretation, ctx.drift());
        info!(
            cycle = %report.id,
            direction = %report.direction,
            reason = ?reason,
            "Cycle suspended for human validation"
        );
        CycleOutcome::Suspended(SuspendedCycle::new(report, feedback, reason))
    }
}

fn check_drift(drift: f32) -> Result<(), ApplicationError> {
    if (0.0..=1.0).contains(&drift) {
        Ok(())
    } else {
        Err(ApplicationError::InvalidInput(format!(
            "drift magnitude must be within [0, 1], got {drift}"
        )))
    }
}
