// End-to-end session tests
//
// These run the full pipeline (ingest -> recognizer -> accumulator ->
// synthesizer) against scripted speech and generation backends, through
// the same pump the websocket handler uses.

use anyhow::Result;
use clinic_scribe::error::PipelineResult;
use clinic_scribe::ingest::{InboundFrame, OutboundMessage};
use clinic_scribe::recognizer::{
    BackendEvent, RecognitionAlternative, RecognitionConfig, RecognitionResult, SpeechBackend,
};
use clinic_scribe::report::{
    GenerationBackend, GenerationOutcome, GenerationRequest, ReportSynthesizer,
};
use clinic_scribe::session::{ConsultationSession, SessionConfig, SessionStatus};
use clinic_scribe::transcript::{InMemoryTranscriptStore, TranscriptStatus, TranscriptStore};
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};

/// Speech backend that consumes the audio stream, then replays its script
/// as the backend finalizes after end-of-audio.
struct ScriptedSpeech {
    script: Mutex<VecDeque<BackendEvent>>,
}

impl ScriptedSpeech {
    fn new(events: Vec<BackendEvent>) -> Self {
        Self {
            script: Mutex::new(events.into()),
        }
    }
}

#[async_trait::async_trait]
impl SpeechBackend for ScriptedSpeech {
    async fn start_stream(
        &self,
        _config: RecognitionConfig,
    ) -> PipelineResult<(mpsc::Sender<Vec<u8>>, mpsc::Receiver<BackendEvent>)> {
        let (audio_tx, mut audio_rx) = mpsc::channel::<Vec<u8>>(16);
        let (event_tx, event_rx) = mpsc::channel::<BackendEvent>(16);
        let script = std::mem::take(&mut *self.script.lock().await);

        tokio::spawn(async move {
            while audio_rx.recv().await.is_some() {}
            for event in script {
                if event_tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Ok((audio_tx, event_rx))
    }
}

struct ScriptedGeneration {
    response: String,
}

#[async_trait::async_trait]
impl GenerationBackend for ScriptedGeneration {
    async fn generate(&self, _request: GenerationRequest) -> PipelineResult<GenerationOutcome> {
        Ok(GenerationOutcome::Text(self.response.clone()))
    }
}

const REPORT_JSON: &str = r###"{
    "report": "## Current Situation\nStable, sleeping better.",
    "confidence_score": 0.9,
    "keywords": ["sleep"],
    "reasoning": "Clear transcript."
}"###;

fn final_result(transcript: &str) -> BackendEvent {
    BackendEvent::Result(RecognitionResult {
        alternatives: vec![RecognitionAlternative {
            transcript: transcript.to_string(),
            confidence: 0.9,
            words: Vec::new(),
        }],
        is_final: true,
        language_code: Some("en-IN".to_string()),
    })
}

fn interim_result(transcript: &str) -> BackendEvent {
    BackendEvent::Result(RecognitionResult {
        alternatives: vec![RecognitionAlternative {
            transcript: transcript.to_string(),
            confidence: 0.4,
            words: Vec::new(),
        }],
        is_final: false,
        language_code: None,
    })
}

async fn build_session(
    events: Vec<BackendEvent>,
) -> Result<(ConsultationSession, Arc<InMemoryTranscriptStore>)> {
    let store = Arc::new(InMemoryTranscriptStore::new());
    let synthesizer = Arc::new(ReportSynthesizer::new(Arc::new(ScriptedGeneration {
        response: REPORT_JSON.to_string(),
    })));

    let config = SessionConfig {
        session_id: "test-session".to_string(),
        ..SessionConfig::default()
    };

    let session = ConsultationSession::new(
        config,
        Arc::new(ScriptedSpeech::new(events)),
        synthesizer,
        store.clone() as Arc<dyn TranscriptStore>,
    )
    .await?;

    Ok((session, store))
}

fn drain(rx: &mut mpsc::Receiver<OutboundMessage>) -> Vec<OutboundMessage> {
    let mut messages = Vec::new();
    while let Ok(msg) = rx.try_recv() {
        messages.push(msg);
    }
    messages
}

#[tokio::test]
async fn test_clean_stop_produces_transcript_and_report() -> Result<()> {
    let (session, store) = build_session(vec![
        interim_result("patient rep"),
        final_result("patient reports sleeping better"),
        final_result("continue current medication"),
    ])
    .await?;

    let (tx, inbound_rx) = mpsc::channel(16);
    let (outbound_tx, mut outbound_rx) = mpsc::channel(64);

    tx.send(InboundFrame::Audio(vec![0u8; 320])).await?;
    tx.send(InboundFrame::Audio(vec![0u8; 320])).await?;
    tx.send(InboundFrame::Control("{\"type\":\"stop_recording\"}".to_string()))
        .await?;

    let report = session.run(inbound_rx, outbound_tx).await?;

    let report = report.expect("clean stop should yield a report");
    assert!((report.confidence_score - 0.9).abs() < 1e-6);
    assert_eq!(session.status().await, SessionStatus::Completed);

    let snapshot = session.snapshot().await;
    assert_eq!(
        snapshot.full_text,
        "patient reports sleeping better continue current medication"
    );
    assert_eq!(snapshot.segment_count, 2, "Interim fragments are never accumulated");

    // The store carries the completed transcript.
    let record = store.get("test-session").await.expect("record should exist");
    assert_eq!(record.status, TranscriptStatus::Completed);
    assert_eq!(record.segments.len(), 2);

    // The client saw every fragment (interim included) plus the report.
    let messages = drain(&mut outbound_rx);
    let transcripts: Vec<_> = messages
        .iter()
        .filter_map(|m| match m {
            OutboundMessage::Transcript(f) => Some(f),
            _ => None,
        })
        .collect();
    assert_eq!(transcripts.len(), 3);
    assert!(!transcripts[0].is_final);
    assert!(messages
        .iter()
        .any(|m| matches!(m, OutboundMessage::Report { .. })));

    Ok(())
}

#[tokio::test]
async fn test_transport_error_fails_session_but_preserves_transcript() -> Result<()> {
    let (session, store) = build_session(vec![
        final_result("first"),
        final_result("second"),
        final_result("third"),
    ])
    .await?;

    let (tx, inbound_rx) = mpsc::channel(16);
    let (outbound_tx, mut outbound_rx) = mpsc::channel(64);

    tx.send(InboundFrame::Audio(vec![0u8; 320])).await?;
    tx.send(InboundFrame::Error("connection reset".to_string())).await?;

    let report = session.run(inbound_rx, outbound_tx).await?;
    assert!(report.is_none(), "A failed session produces no report");
    assert_eq!(session.status().await, SessionStatus::Failed);

    // Everything recognized before the failure is kept.
    let snapshot = session.snapshot().await;
    assert_eq!(snapshot.full_text, "first second third");

    let record = store.get("test-session").await.expect("record should exist");
    assert_eq!(record.status, TranscriptStatus::Failed);
    assert_eq!(record.full_text, "first second third");

    let messages = drain(&mut outbound_rx);
    assert!(messages
        .iter()
        .any(|m| matches!(m, OutboundMessage::SessionFailed { .. })));

    Ok(())
}

#[tokio::test]
async fn test_clean_close_completes_like_a_stop() -> Result<()> {
    let (session, store) = build_session(vec![final_result("only segment")]).await?;

    let (tx, inbound_rx) = mpsc::channel(16);
    let (outbound_tx, _outbound_rx) = mpsc::channel(64);

    tx.send(InboundFrame::Audio(vec![0u8; 320])).await?;
    tx.send(InboundFrame::Closed).await?;

    let report = session.run(inbound_rx, outbound_tx).await?;
    assert!(report.is_some());
    assert_eq!(session.status().await, SessionStatus::Completed);

    let record = store.get("test-session").await.expect("record should exist");
    assert_eq!(record.status, TranscriptStatus::Completed);

    Ok(())
}

#[tokio::test]
async fn test_ping_is_answered_with_pong() -> Result<()> {
    let (session, _store) = build_session(vec![]).await?;

    let (tx, inbound_rx) = mpsc::channel(16);
    let (outbound_tx, mut outbound_rx) = mpsc::channel(64);

    tx.send(InboundFrame::Control("{\"type\":\"ping\"}".to_string())).await?;
    tx.send(InboundFrame::Control("{\"type\":\"stop_recording\"}".to_string()))
        .await?;

    session.run(inbound_rx, outbound_tx).await?;

    let messages = drain(&mut outbound_rx);
    assert!(messages
        .iter()
        .any(|m| matches!(m, OutboundMessage::Pong { .. })));

    Ok(())
}

#[tokio::test]
async fn test_request_stop_injects_stop_control() -> Result<()> {
    let (session, _store) = build_session(vec![final_result("stopped externally")]).await?;

    let (tx, inbound_rx) = mpsc::channel(16);
    let (outbound_tx, _outbound_rx) = mpsc::channel(64);

    session.bind_channel(tx.clone()).await;
    tx.send(InboundFrame::Audio(vec![0u8; 320])).await?;
    session.request_stop().await?;

    let report = session.run(inbound_rx, outbound_tx).await?;
    assert!(report.is_some());
    assert_eq!(session.status().await, SessionStatus::Completed);

    Ok(())
}

#[tokio::test]
async fn test_stats_reflect_pipeline_progress() -> Result<()> {
    let (session, _store) = build_session(vec![final_result("hello from the clinic")]).await?;

    let (tx, inbound_rx) = mpsc::channel(16);
    let (outbound_tx, _outbound_rx) = mpsc::channel(64);

    tx.send(InboundFrame::Audio(vec![0u8; 320])).await?;
    tx.send(InboundFrame::Control("{\"type\":\"stop_recording\"}".to_string()))
        .await?;

    session.run(inbound_rx, outbound_tx).await?;

    let stats = session.stats().await;
    assert_eq!(stats.session_id, "test-session");
    assert_eq!(stats.status, SessionStatus::Completed);
    assert_eq!(stats.chunks_received, 1);
    assert!(stats.last_activity_at.is_some());
    assert_eq!(stats.word_count, 4);
    assert_eq!(stats.segment_count, 1);

    Ok(())
}
