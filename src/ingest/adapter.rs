use super::messages::{ControlMessage, InboundFrame, SessionEvent};
use chrono::{DateTime, TimeZone, Utc};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Capacity of the bounded audio queue between the channel receive loop and
/// the recognizer. Producers block (backpressure) when the recognizer lags.
pub const AUDIO_QUEUE_CAPACITY: usize = 200;

/// Liveness counters updated on every accepted audio chunk. Exposed through
/// session status for idle-session detection by the surrounding service.
#[derive(Debug, Default)]
pub struct IngestStats {
    chunks_received: AtomicUsize,
    last_activity_ms: AtomicI64,
}

impl IngestStats {
    fn record_chunk(&self) {
        self.chunks_received.fetch_add(1, Ordering::SeqCst);
        self.last_activity_ms
            .store(Utc::now().timestamp_millis(), Ordering::SeqCst);
    }

    pub fn chunks_received(&self) -> usize {
        self.chunks_received.load(Ordering::SeqCst)
    }

    pub fn last_activity_at(&self) -> Option<DateTime<Utc>> {
        match self.last_activity_ms.load(Ordering::SeqCst) {
            0 => None,
            ms => Utc.timestamp_millis_opt(ms).single(),
        }
    }
}

/// Pull side of the ingest adapter: a lazy sequence of raw audio byte
/// chunks, terminated when the adapter's receive loop ends.
pub struct AudioChunks {
    rx: mpsc::Receiver<Vec<u8>>,
}

impl AudioChunks {
    /// Yield the next audio buffer, coalescing every chunk currently queued
    /// into one allocation. Returns `None` once the stream has ended.
    pub async fn next(&mut self) -> Option<Vec<u8>> {
        let mut buf = self.rx.recv().await?;
        while let Ok(more) = self.rx.try_recv() {
            buf.extend_from_slice(&more);
        }
        Some(buf)
    }
}

/// Presents the client's unreliable duplex channel as a clean pull sequence
/// of audio chunks, dispatching control messages to the session.
pub struct AudioIngestAdapter;

impl AudioIngestAdapter {
    /// Bind to a classified frame stream. Spawns the receive loop and
    /// returns the pull sequence consumed by the recognizer.
    ///
    /// The loop ends (dropping the audio sender, which terminates the
    /// sequence) on clean disconnect, explicit stop, or transport error.
    pub fn connect(
        mut inbound: mpsc::Receiver<InboundFrame>,
        events: mpsc::Sender<SessionEvent>,
        stats: Arc<IngestStats>,
    ) -> AudioChunks {
        let (audio_tx, audio_rx) = mpsc::channel::<Vec<u8>>(AUDIO_QUEUE_CAPACITY);

        tokio::spawn(async move {
            let mut paused = false;

            while let Some(frame) = inbound.recv().await {
                match frame {
                    InboundFrame::Audio(bytes) => {
                        if bytes.is_empty() {
                            debug!("Dropping empty audio chunk");
                            continue;
                        }
                        if paused {
                            debug!(len = bytes.len(), "Dropping audio chunk while paused");
                            continue;
                        }
                        stats.record_chunk();
                        if audio_tx.send(bytes).await.is_err() {
                            // Recognizer side gone; nothing left to feed.
                            break;
                        }
                    }
                    InboundFrame::Control(text) => {
                        let control = match serde_json::from_str::<ControlMessage>(&text) {
                            Ok(c) => c,
                            Err(e) => {
                                warn!(error = %e, "Ignoring malformed control message");
                                continue;
                            }
                        };

                        match control {
                            ControlMessage::PauseRecording => paused = true,
                            ControlMessage::ResumeRecording => paused = false,
                            _ => {}
                        }

                        let stop = control == ControlMessage::StopRecording;
                        if events.send(SessionEvent::Control(control)).await.is_err() {
                            break;
                        }
                        if stop {
                            info!("Stop requested, ending audio stream");
                            break;
                        }
                    }
                    InboundFrame::Closed => {
                        info!("Client channel closed cleanly");
                        let _ = events.send(SessionEvent::ChannelClosed).await;
                        break;
                    }
                    InboundFrame::Error(e) => {
                        warn!(error = %e, "Transport error on ingest channel");
                        let _ = events.send(SessionEvent::ChannelError(e)).await;
                        break;
                    }
                }
            }

            // audio_tx drops here: the end-of-stream sentinel for AudioChunks.
            debug!("Ingest receive loop finished");
        });

        AudioChunks { rx: audio_rx }
    }
}
