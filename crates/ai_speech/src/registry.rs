//! Typed registry of named speech backends
//!
//! Service discovery returns a strategy identifier; this registry resolves it
//! to an implementation. Every backend is checked when it is registered, so
//! resolution never hands out a backend that cannot do what it claims.

use std::{collections::BTreeMap, fmt, sync::Arc};

use tracing::{debug, info};

use crate::error::SpeechError;
use crate::ports::{SpeechBackend, SpeechToText, TextToSpeech};

/// Name-to-backend registry, validated at registration time
#[derive(Default)]
pub struct BackendRegistry {
    backends: BTreeMap<String, Arc<dyn SpeechBackend>>,
}

impl fmt::Debug for BackendRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackendRegistry")
            .field("backends", &self.backends.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl BackendRegistry {
    /// Create an empty registry
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a backend under its own name
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Registration` if the name is blank or taken, the
    /// backend exposes neither direction, its declared capabilities disagree
    /// with the sides it exposes, or it does not report confidence.
    pub fn register(&mut self, backend: Arc<dyn SpeechBackend>) -> Result<(), SpeechError> {
        let name = backend.name().trim().to_string();
        if name.is_empty() {
            return Err(SpeechError::Registration("backend name is empty".to_string()));
        }
        if self.backends.contains_key(&name) {
            return Err(SpeechError::Registration(format!("duplicate name: {name}")));
        }

        let caps = backend.capabilities();
        let exposes_stt = backend.as_speech_to_text().is_some();
        let exposes_tts = backend.as_text_to_speech().is_some();

        if !caps.transcription && !caps.synthesis {
            return Err(SpeechError::Registration(format!(
                "{name} declares neither transcription nor synthesis"
            )));
        }
        if caps.transcription != exposes_stt {
            return Err(SpeechError::Registration(format!(
                "{name} transcription capability does not match its implementation"
            )));
        }
        if caps.synthesis != exposes_tts {
            return Err(SpeechError::Registration(format!(
                "{name} synthesis capability does not match its implementation"
            )));
        }
        if !caps.confidence_reporting {
            return Err(SpeechError::Registration(format!(
                "{name} must report confidence"
            )));
        }

        info!(
            backend = %name,
            transcription = caps.transcription,
            synthesis = caps.synthesis,
            "Registered speech backend"
        );
        self.backends.insert(name, backend);
        Ok(())
    }

    /// Remove a backend, returning it if it was registered
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn SpeechBackend>> {
        let removed = self.backends.remove(name);
        if removed.is_some() {
            debug!(backend = %name, "Unregistered speech backend");
        }
        removed
    }

    /// Look up a backend by name
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::NotAvailable` if no backend has that name.
    pub fn resolve(&self, name: &str) -> Result<Arc<dyn SpeechBackend>, SpeechError> {
        self.backends
            .get(name)
            .cloned()
            .ok_or_else(|| SpeechError::NotAvailable(name.to_string()))
    }

    /// Resolve the transcription side of a backend
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::NotAvailable` if the backend is unknown or does
    /// not transcribe.
    pub fn speech_to_text(&self, name: &str) -> Result<&dyn SpeechToText, SpeechError> {
        self.backends
            .get(name)
            .and_then(|b| b.as_speech_to_text())
            .ok_or_else(|| SpeechError::NotAvailable(format!("{name} (transcription)")))
    }

    /// Resolve the synthesis side of a backend
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::NotAvailable` if the backend is unknown or does
    /// not synthesize.
    pub fn text_to_speech(&self, name: &str) -> Result<&dyn TextToSpeech, SpeechError> {
        self.backends
            .get(name)
            .and_then(|b| b.as_text_to_speech())
            .ok_or_else(|| SpeechError::NotAvailable(format!("{name} (synthesis)")))
    }

    /// Registered names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.backends.keys().map(String::as_str)
    }

    /// Number of registered backends
    #[must_use]
    pub fn len(&self) -> usize {
        self.backends.len()
    }

    /// Check if no backend is registered
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.backends.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;

    use super::*;
    use crate::ports::BackendCapabilities;
    use crate::types::{PcmAudio, Synthesis, Transcription};

    struct TestBackend {
        name: &'static str,
        caps: BackendCapabilities,
        stt: bool,
        tts: bool,
    }

    impl TestBackend {
        const fn stt(name: &'static str) -> Self {
            Self {
                name,
                caps: BackendCapabilities::transcription(),
                stt: true,
                tts: false,
            }
        }

        const fn tts(name: &'static str) -> Self {
            Self {
                name,
                caps: BackendCapabilities::synthesis(),
                stt: false,
                tts: true,
            }
        }
    }

    #[async_trait]
    impl SpeechToText for TestBackend {
        async fn transcribe(&self, _audio: &PcmAudio) -> Result<Transcription, SpeechError> {
            Ok(Transcription::new(self.name, 0.9))
        }
    }

    #[async_trait]
    impl TextToSpeech for TestBackend {
        async fn synthesize(&self, _text: &str) -> Result<Synthesis, SpeechError> {
            Ok(Synthesis::new(PcmAudio::new(vec![0.0; 8], 16_000)?, 0.9))
        }
    }

    impl SpeechBackend for TestBackend {
        fn name(&self) -> &str {
            self.name
        }

        fn capabilities(&self) -> BackendCapabilities {
            self.caps
        }

        fn as_speech_to_text(&self) -> Option<&dyn SpeechToText> {
            self.stt.then_some(self as &dyn SpeechToText)
        }

        fn as_text_to_speech(&self) -> Option<&dyn TextToSpeech> {
            self.tts.then_some(self as &dyn TextToSpeech)
        }
    }

    #[test]
    fn register_and_resolve() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(TestBackend::stt("whisper"))).unwrap();
        registry.register(Arc::new(TestBackend::tts("piper"))).unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.names().collect::<Vec<_>>(), vec!["piper", "whisper"]);
        assert_eq!(registry.resolve("whisper").unwrap().name(), "whisper");
        assert!(registry.speech_to_text("whisper").is_ok());
        assert!(registry.text_to_speech("piper").is_ok());
    }

    #[test]
    fn duplicate_name_rejected() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(TestBackend::stt("whisper"))).unwrap();
        let err = registry
            .register(Arc::new(TestBackend::tts("whisper")))
            .unwrap_err();
        assert_eq!(err.to_string(), "Registration rejected: duplicate name: whisper");
    }

    #[test]
    fn blank_name_rejected() {
        let mut registry = BackendRegistry::new();
        assert!(registry.register(Arc::new(TestBackend::stt("  "))).is_err());
    }

    #[test]
    fn backend_without_capability_rejected() {
        let mut registry = BackendRegistry::new();
        let backend = TestBackend {
            caps: BackendCapabilities::default(),
            stt: false,
            ..TestBackend::stt("mute")
        };
        let err = registry.register(Arc::new(backend)).unwrap_err();
        assert!(err.to_string().contains("neither transcription nor synthesis"));
    }

    #[test]
    fn declared_capability_must_match_implementation() {
        let mut registry = BackendRegistry::new();
        let backend = TestBackend {
            caps: BackendCapabilities::duplex(),
            ..TestBackend::stt("liar")
        };
        let err = registry.register(Arc::new(backend)).unwrap_err();
        assert!(err.to_string().contains("synthesis capability"));
    }

    #[test]
    fn confidence_reporting_required() {
        let mut registry = BackendRegistry::new();
        let backend = TestBackend {
            caps: BackendCapabilities {
                confidence_reporting: false,
                ..BackendCapabilities::transcription()
            },
            ..TestBackend::stt("silent")
        };
        assert!(registry.register(Arc::new(backend)).is_err());
        assert!(registry.is_empty());
    }

    #[test]
    fn wrong_direction_is_not_available() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(TestBackend::stt("whisper"))).unwrap();
        let err = registry.text_to_speech("whisper").err().unwrap();
        assert!(matches!(err, SpeechError::NotAvailable(_)));
        assert!(registry.resolve("missing").is_err());
    }

    #[test]
    fn unregister_removes_backend() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(TestBackend::stt("whisper"))).unwrap();
        assert!(registry.unregister("whisper").is_some());
        assert!(registry.unregister("whisper").is_none());
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn resolved_side_is_callable() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(TestBackend::stt("whisper"))).unwrap();
        let stt = registry.speech_to_text("whisper").unwrap();
        let audio = PcmAudio::new(vec![0.1; 32], 16_000).unwrap();
        assert_eq!(stt.transcribe(&audio).await.unwrap().text, "whisper");
    }

    #[test]
    fn debug_lists_names() {
        let mut registry = BackendRegistry::new();
        registry.register(Arc::new(TestBackend::stt("whisper"))).unwrap();
        assert!(format!("{registry:?}").contains("whisper"));
    }
}
