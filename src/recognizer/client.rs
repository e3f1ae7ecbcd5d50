use super::fragment::{BackendEvent, RecognitionResult};
use super::vocabulary::clinical_boost_phrases;
use crate::config::SpeechConfig;
use crate::error::{PipelineError, PipelineResult};
use crate::ingest::AUDIO_QUEUE_CAPACITY;
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio_tungstenite::{connect_async, tungstenite::Message};
use tracing::{debug, error, info, warn};

/// Per-session recognition configuration, fixed at session creation and sent
/// as the first message of the request stream.
#[derive(Debug, Clone, Serialize)]
pub struct RecognitionConfig {
    pub primary_language: String,
    /// Up to two alternates; the backend auto-detects per utterance
    pub alternate_languages: Vec<String>,
    pub sample_rate_hertz: u32,
    pub encoding: String,
    pub interim_results: bool,
    /// Domain phrases biasing recognition accuracy
    pub vocabulary: Vec<String>,
}

impl RecognitionConfig {
    pub fn from_speech_config(cfg: &SpeechConfig) -> Self {
        Self {
            primary_language: cfg.primary_language.clone(),
            alternate_languages: cfg.alternate_languages.clone(),
            sample_rate_hertz: cfg.sample_rate,
            encoding: cfg.encoding.clone(),
            interim_results: true,
            vocabulary: clinical_boost_phrases(),
        }
    }
}

/// Streaming speech recognition backend.
///
/// `start_stream` opens one logical request stream: the configuration goes
/// first, each audio chunk follows, and recognition results come back on the
/// returned receiver until the stream ends.
#[async_trait::async_trait]
pub trait SpeechBackend: Send + Sync {
    async fn start_stream(
        &self,
        config: RecognitionConfig,
    ) -> PipelineResult<(mpsc::Sender<Vec<u8>>, mpsc::Receiver<BackendEvent>)>;
}

/// First message of the request stream: credentials plus the session config.
#[derive(Serialize)]
struct StreamStart<'a> {
    api_key: &'a str,
    #[serde(flatten)]
    config: &'a RecognitionConfig,
}

/// One message of the backend's response stream.
#[derive(Debug, Default, Deserialize)]
struct StreamResponse {
    #[serde(default)]
    result: Option<RecognitionResult>,
    #[serde(default)]
    finished: bool,
    #[serde(default)]
    error_code: Option<u16>,
    #[serde(default)]
    error_message: Option<String>,
}

/// Cloud streaming recognizer client speaking a config-then-audio WebSocket
/// protocol.
pub struct CloudSpeechClient {
    endpoint: String,
    api_key: String,
}

impl CloudSpeechClient {
    pub fn new(cfg: &SpeechConfig) -> Self {
        Self {
            endpoint: cfg.endpoint.clone(),
            api_key: cfg.api_key.clone(),
        }
    }
}

#[async_trait::async_trait]
impl SpeechBackend for CloudSpeechClient {
    async fn start_stream(
        &self,
        config: RecognitionConfig,
    ) -> PipelineResult<(mpsc::Sender<Vec<u8>>, mpsc::Receiver<BackendEvent>)> {
        info!(endpoint = %self.endpoint, "Connecting to speech recognition service");

        // Connection/handshake failures are fatal for the session: they are
        // configuration or auth problems, not per-request noise.
        let (stream, _response) = connect_async(&self.endpoint)
            .await
            .map_err(|e| PipelineError::RecognitionService(e.to_string()))?;

        let (mut ws_tx, mut ws_rx) = stream.split();

        let start = StreamStart {
            api_key: &self.api_key,
            config: &config,
        };
        let start_json = serde_json::to_string(&start)
            .map_err(|e| PipelineError::RecognitionService(e.to_string()))?;
        ws_tx
            .send(Message::Text(start_json))
            .await
            .map_err(|e| PipelineError::RecognitionService(e.to_string()))?;

        info!(
            primary = %config.primary_language,
            alternates = ?config.alternate_languages,
            vocabulary_terms = config.vocabulary.len(),
            "Recognition stream configured"
        );

        let (audio_tx, mut audio_rx) = mpsc::channel::<Vec<u8>>(AUDIO_QUEUE_CAPACITY);
        let (event_tx, event_rx) = mpsc::channel::<BackendEvent>(64);

        // Writer: every request after the first wraps one audio chunk.
        tokio::spawn(async move {
            while let Some(chunk) = audio_rx.recv().await {
                if let Err(e) = ws_tx.send(Message::Binary(chunk)).await {
                    warn!(error = %e, "Failed to send audio chunk to recognizer");
                    break;
                }
            }
            // Signal end of audio so the backend finalizes pending results.
            let _ = ws_tx
                .send(Message::Text("{\"type\":\"end_of_audio\"}".to_string()))
                .await;
            let _ = ws_tx.send(Message::Close(None)).await;
            debug!("Recognizer audio writer finished");
        });

        // Reader: map backend responses onto events.
        tokio::spawn(async move {
            while let Some(msg) = ws_rx.next().await {
                let text = match msg {
                    Ok(Message::Text(t)) => t,
                    Ok(Message::Close(_)) => break,
                    Ok(_) => continue,
                    Err(e) => {
                        error!(error = %e, "Recognizer stream error");
                        let _ = event_tx.send(BackendEvent::FatalError(e.to_string())).await;
                        break;
                    }
                };

                let response = match serde_json::from_str::<StreamResponse>(&text) {
                    Ok(r) => r,
                    Err(e) => {
                        let _ = event_tx
                            .send(BackendEvent::TransientError(format!(
                                "unparseable response: {e}"
                            )))
                            .await;
                        continue;
                    }
                };

                if let Some(code) = response.error_code {
                    let message = response.error_message.unwrap_or_default();
                    // 401/403 mean the stream's credentials are bad; nothing
                    // after this point can succeed.
                    let event = if code == 401 || code == 403 {
                        BackendEvent::FatalError(format!("auth error {code}: {message}"))
                    } else {
                        BackendEvent::TransientError(format!("error {code}: {message}"))
                    };
                    let fatal = matches!(event, BackendEvent::FatalError(_));
                    if event_tx.send(event).await.is_err() || fatal {
                        break;
                    }
                    continue;
                }

                if let Some(result) = response.result {
                    if event_tx.send(BackendEvent::Result(result)).await.is_err() {
                        break;
                    }
                }

                if response.finished {
                    debug!("Recognizer reported stream finished");
                    break;
                }
            }
            debug!("Recognizer response reader finished");
        });

        Ok((audio_tx, event_rx))
    }
}
