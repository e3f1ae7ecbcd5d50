use super::client::{RecognitionConfig, SpeechBackend};
use super::fragment::{fragment_from_result, BackendEvent, TranscriptFragment};
use crate::error::PipelineResult;
use crate::ingest::AudioChunks;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::timeout;
use tracing::{debug, error, info, warn};

/// Silence on the response stream for this long is treated as end of
/// stream, not as an error.
pub const RESPONSE_IDLE_TIMEOUT: Duration = Duration::from_secs(30);

/// Update emitted by the recognizer toward the session.
#[derive(Debug)]
pub enum RecognizerUpdate {
    Fragment(TranscriptFragment),
    /// Unrecoverable stream failure. The transcript accumulated before the
    /// failure is preserved for later inspection.
    Failed(String),
}

/// Drives one session's audio chunk sequence through a speech backend and
/// yields transcript fragments in backend emission order.
pub struct StreamingRecognizer {
    backend: Arc<dyn SpeechBackend>,
}

impl StreamingRecognizer {
    pub fn new(backend: Arc<dyn SpeechBackend>) -> Self {
        Self { backend }
    }

    /// Open the backend stream and start pumping.
    ///
    /// Fatal configuration/auth errors surface from this call; everything
    /// after that flows through the returned receiver, which closes once the
    /// chunk sequence has been fully drained and the backend has finished
    /// responding.
    pub async fn run(
        &self,
        config: RecognitionConfig,
        mut chunks: AudioChunks,
    ) -> PipelineResult<mpsc::Receiver<RecognizerUpdate>> {
        let default_language = config.primary_language.clone();
        let (audio_tx, mut events) = self.backend.start_stream(config).await?;

        let (update_tx, update_rx) = mpsc::channel::<RecognizerUpdate>(64);

        // Feeder: pull coalesced chunks into the backend until the ingest
        // adapter ends the sequence, then drop the sender so the backend
        // finalizes.
        tokio::spawn(async move {
            while let Some(chunk) = chunks.next().await {
                if audio_tx.send(chunk).await.is_err() {
                    break;
                }
            }
            debug!("Audio chunk sequence drained");
        });

        // Mapper: backend events -> fragments.
        tokio::spawn(async move {
            loop {
                let event = match timeout(RESPONSE_IDLE_TIMEOUT, events.recv()).await {
                    Err(_) => {
                        info!(
                            idle_secs = RESPONSE_IDLE_TIMEOUT.as_secs(),
                            "No recognizer data within timeout, treating as stream end"
                        );
                        break;
                    }
                    Ok(None) => break,
                    Ok(Some(event)) => event,
                };

                match event {
                    BackendEvent::Result(result) => {
                        match fragment_from_result(result, &default_language) {
                            Some(fragment) => {
                                if update_tx
                                    .send(RecognizerUpdate::Fragment(fragment))
                                    .await
                                    .is_err()
                                {
                                    break;
                                }
                            }
                            // No alternatives: dropped, not yielded.
                            None => debug!("Dropping recognition result with no alternatives"),
                        }
                    }
                    BackendEvent::TransientError(e) => {
                        warn!(error = %e, "Transient recognizer error, stream continues");
                    }
                    BackendEvent::FatalError(e) => {
                        error!(error = %e, "Fatal recognizer error");
                        let _ = update_tx.send(RecognizerUpdate::Failed(e)).await;
                        break;
                    }
                }
            }
            debug!("Recognizer mapper finished");
        });

        Ok(update_rx)
    }
}
