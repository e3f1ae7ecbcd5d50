use super::config::SessionConfig;
use super::stats::SessionStats;
use crate::error::{PipelineError, PipelineResult};
use crate::ingest::{
    AudioIngestAdapter, ControlMessage, IngestStats, InboundFrame, OutboundMessage, SessionEvent,
    TranscriptFrame,
};
use crate::recognizer::{RecognizerUpdate, SpeechBackend, StreamingRecognizer};
use crate::report::{ClinicalReport, ReportSynthesizer};
use crate::transcript::{
    SegmentRecord, TranscriptAccumulator, TranscriptSnapshot, TranscriptStatus, TranscriptStore,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex, RwLock};
use tracing::{debug, error, info, warn};

/// Lifecycle of a consultation session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionStatus {
    /// Created but no client channel bound yet
    Pending,
    Streaming,
    Paused,
    /// Audio stopped; draining fragments and generating the report
    Finalizing,
    Completed,
    Failed,
}

/// One live consultation: owns the ingest adapter, recognizer, transcript
/// accumulator and report synthesizer for a single patient encounter.
///
/// The session pump (`run`) is the only writer of transcript state; status
/// and snapshot accessors may be called concurrently from the HTTP layer.
pub struct ConsultationSession {
    config: SessionConfig,
    started_at: DateTime<Utc>,
    status: RwLock<SessionStatus>,
    accumulator: Arc<TranscriptAccumulator>,
    ingest_stats: Arc<IngestStats>,
    speech_backend: Arc<dyn SpeechBackend>,
    synthesizer: Arc<ReportSynthesizer>,
    inbound_tx: Mutex<Option<mpsc::Sender<InboundFrame>>>,
}

impl ConsultationSession {
    pub async fn new(
        config: SessionConfig,
        speech_backend: Arc<dyn SpeechBackend>,
        synthesizer: Arc<ReportSynthesizer>,
        store: Arc<dyn TranscriptStore>,
    ) -> PipelineResult<Self> {
        let accumulator = TranscriptAccumulator::new(
            config.session_id.clone(),
            config.flush_threshold_words,
            store,
        )
        .await?;

        Ok(Self {
            config,
            started_at: Utc::now(),
            status: RwLock::new(SessionStatus::Pending),
            accumulator: Arc::new(accumulator),
            ingest_stats: Arc::new(IngestStats::default()),
            speech_backend,
            synthesizer,
            inbound_tx: Mutex::new(None),
        })
    }

    pub fn session_id(&self) -> &str {
        &self.config.session_id
    }

    /// Remember the inbound frame sender so the session can be stopped from
    /// outside the client channel (e.g. an administrative HTTP call).
    pub async fn bind_channel(&self, tx: mpsc::Sender<InboundFrame>) {
        *self.inbound_tx.lock().await = Some(tx);
    }

    /// Inject a stop control frame, as if the client had sent one.
    pub async fn request_stop(&self) -> PipelineResult<()> {
        let guard = self.inbound_tx.lock().await;
        let tx = guard
            .as_ref()
            .ok_or_else(|| PipelineError::Channel("session has no bound channel".to_string()))?;
        tx.send(InboundFrame::Control(
            "{\"type\":\"stop_recording\"}".to_string(),
        ))
        .await
        .map_err(|_| PipelineError::Channel("session channel already closed".to_string()))
    }

    /// Run the session pump until the audio stream ends, then finalize the
    /// transcript and synthesize the clinical report.
    ///
    /// Transcript frames (interim and final) and the finished report are
    /// pushed through `outbound`. Returns the report on a clean completion,
    /// `None` when the session failed mid-stream (the partial transcript is
    /// preserved either way).
    pub async fn run(
        &self,
        inbound: mpsc::Receiver<InboundFrame>,
        outbound: mpsc::Sender<OutboundMessage>,
    ) -> PipelineResult<Option<ClinicalReport>> {
        self.set_status(SessionStatus::Streaming).await;
        info!(session_id = %self.session_id(), "Session streaming");

        let (event_tx, mut events) = mpsc::channel::<SessionEvent>(16);
        let chunks = AudioIngestAdapter::connect(inbound, event_tx, self.ingest_stats.clone());

        let recognizer = StreamingRecognizer::new(self.speech_backend.clone());
        let mut fragments = match recognizer.run(self.config.recognition_config(), chunks).await {
            Ok(rx) => rx,
            Err(e) => {
                error!(session_id = %self.session_id(), error = %e, "Recognizer failed to start");
                self.set_status(SessionStatus::Failed).await;
                self.accumulator.finish(TranscriptStatus::Failed).await?;
                return Err(e);
            }
        };

        let mut failed: Option<String> = None;
        let mut events_open = true;

        loop {
            tokio::select! {
                update = fragments.recv() => match update {
                    Some(RecognizerUpdate::Fragment(fragment)) => {
                        let frame = TranscriptFrame::from_fragment(&fragment);
                        if outbound
                            .send(OutboundMessage::Transcript(frame))
                            .await
                            .is_err()
                        {
                            debug!(session_id = %self.session_id(), "Outbound channel gone");
                        }
                        if fragment.is_final {
                            self.accumulator.append(&fragment).await?;
                        }
                    }
                    Some(RecognizerUpdate::Failed(e)) => {
                        failed = Some(e);
                    }
                    // Fragment stream drained: audio has ended and every
                    // pending result has been applied.
                    None => break,
                },
                event = events.recv(), if events_open => match event {
                    Some(SessionEvent::Control(control)) => {
                        self.handle_control(control, &outbound).await;
                    }
                    Some(SessionEvent::ChannelClosed) => {
                        self.set_status(SessionStatus::Finalizing).await;
                    }
                    Some(SessionEvent::ChannelError(e)) => {
                        failed = Some(e);
                    }
                    None => events_open = false,
                },
            }
        }

        // Events that raced with the fragment stream draining still count:
        // a late ping deserves its pong and a late transport error fails
        // the session.
        while let Ok(event) = events.try_recv() {
            match event {
                SessionEvent::Control(control) => self.handle_control(control, &outbound).await,
                SessionEvent::ChannelError(e) => failed = Some(e),
                SessionEvent::ChannelClosed => {}
            }
        }

        if let Some(e) = failed {
            warn!(session_id = %self.session_id(), error = %e, "Session failed, preserving partial transcript");
            self.set_status(SessionStatus::Failed).await;
            self.accumulator.finish(TranscriptStatus::Failed).await?;
            let _ = outbound
                .send(OutboundMessage::SessionFailed { error: e })
                .await;
            return Ok(None);
        }

        self.set_status(SessionStatus::Finalizing).await;
        self.accumulator.finish(TranscriptStatus::Completed).await?;

        let snapshot = self.accumulator.snapshot().await;
        info!(
            session_id = %self.session_id(),
            words = snapshot.word_count,
            segments = snapshot.segment_count,
            "Transcript finalized, synthesizing report"
        );

        match self
            .synthesizer
            .synthesize(&snapshot.full_text, &self.config.context())
            .await
        {
            Ok(report) => {
                self.set_status(SessionStatus::Completed).await;
                let _ = outbound
                    .send(OutboundMessage::Report {
                        report: report.clone(),
                    })
                    .await;
                Ok(Some(report))
            }
            Err(e) => {
                // The transcript completed cleanly; only report generation
                // failed, and it can be retried from the snapshot.
                error!(session_id = %self.session_id(), error = %e, "Report generation failed");
                self.set_status(SessionStatus::Completed).await;
                let _ = outbound
                    .send(OutboundMessage::SessionFailed {
                        error: e.to_string(),
                    })
                    .await;
                Err(e)
            }
        }
    }

    async fn handle_control(
        &self,
        control: ControlMessage,
        outbound: &mpsc::Sender<OutboundMessage>,
    ) {
        match control {
            ControlMessage::StartRecording => {
                debug!(session_id = %self.session_id(), "Start acknowledged");
            }
            ControlMessage::PauseRecording => {
                self.set_status(SessionStatus::Paused).await;
            }
            ControlMessage::ResumeRecording => {
                self.set_status(SessionStatus::Streaming).await;
            }
            ControlMessage::StopRecording => {
                self.set_status(SessionStatus::Finalizing).await;
            }
            ControlMessage::Ping => {
                let _ = outbound
                    .send(OutboundMessage::Pong {
                        timestamp: Utc::now().to_rfc3339(),
                    })
                    .await;
            }
        }
    }

    pub async fn status(&self) -> SessionStatus {
        *self.status.read().await
    }

    async fn set_status(&self, status: SessionStatus) {
        *self.status.write().await = status;
    }

    pub async fn snapshot(&self) -> TranscriptSnapshot {
        self.accumulator.snapshot().await
    }

    pub async fn segments(&self) -> Vec<SegmentRecord> {
        self.accumulator.segments().await
    }

    pub async fn stats(&self) -> SessionStats {
        let snapshot = self.accumulator.snapshot().await;
        SessionStats {
            session_id: self.config.session_id.clone(),
            status: self.status().await,
            started_at: self.started_at,
            duration_secs: (Utc::now() - self.started_at).num_seconds(),
            chunks_received: self.ingest_stats.chunks_received(),
            last_activity_at: self.ingest_stats.last_activity_at(),
            word_count: snapshot.word_count,
            character_count: snapshot.character_count,
            average_confidence: snapshot.average_confidence,
            segment_count: snapshot.segment_count,
        }
    }

    /// Synthesize a report from whatever transcript exists right now,
    /// without touching the session lifecycle. Used for mid-session drafts.
    pub async fn generate_report(&self) -> PipelineResult<ClinicalReport> {
        let snapshot = self.accumulator.snapshot().await;
        self.synthesizer
            .synthesize(&snapshot.full_text, &self.config.context())
            .await
    }
}
