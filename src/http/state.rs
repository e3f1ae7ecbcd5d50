use crate::config::Config;
use crate::recognizer::SpeechBackend;
use crate::report::ReportSynthesizer;
use crate::session::SessionRegistry;
use crate::transcript::InMemoryTranscriptStore;
use std::sync::Arc;

/// Shared application state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub registry: Arc<SessionRegistry>,
    pub speech_backend: Arc<dyn SpeechBackend>,
    pub synthesizer: Arc<ReportSynthesizer>,
    pub store: Arc<InMemoryTranscriptStore>,
}

impl AppState {
    pub fn new(
        config: Arc<Config>,
        speech_backend: Arc<dyn SpeechBackend>,
        synthesizer: Arc<ReportSynthesizer>,
        store: Arc<InMemoryTranscriptStore>,
    ) -> Self {
        Self {
            config,
            registry: Arc::new(SessionRegistry::new()),
            speech_backend,
            synthesizer,
            store,
        }
    }
}
