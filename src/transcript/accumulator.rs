use super::store::{TranscriptStatus, TranscriptStore, TranscriptUpdate};
use crate::error::{PipelineError, PipelineResult};
use crate::recognizer::{TranscriptFragment, WordTiming};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// One finalized fragment as recorded in the transcript, kept for playback
/// and audit.
#[derive(Debug, Clone, Serialize)]
pub struct SegmentRecord {
    pub text: String,
    pub confidence: f32,
    pub language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub word_timings: Option<Vec<WordTiming>>,
    pub recorded_at: DateTime<Utc>,
}

/// Immutable view of the accumulated transcript, safe to take mid-stream.
/// This is the hand-off point to the report synthesizer.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TranscriptSnapshot {
    pub full_text: String,
    pub word_count: usize,
    pub character_count: usize,
    pub average_confidence: f32,
    pub segment_count: usize,
}

struct AccumulatorState {
    full_text: String,
    segments: Vec<SegmentRecord>,
    word_count: usize,
    character_count: usize,
    confidence_sum: f64,
    words_since_flush: usize,
}

/// Per-session transcript buffer: the single source of truth for what has
/// been said so far.
///
/// Only final fragments may be appended. Word/character counts are always
/// recomputed from the full text so they cannot drift, and the average
/// confidence is the plain arithmetic mean over all segments (0.0 when
/// empty). Every `flush_threshold_words` accumulated words a snapshot is
/// handed to a dedicated flusher task: durable writes never block `append`,
/// but they stay ordered per session.
pub struct TranscriptAccumulator {
    session_id: String,
    flush_threshold_words: usize,
    state: Mutex<AccumulatorState>,
    flush_tx: Mutex<Option<mpsc::UnboundedSender<TranscriptUpdate>>>,
    flusher: Mutex<Option<JoinHandle<()>>>,
}

impl TranscriptAccumulator {
    pub async fn new(
        session_id: String,
        flush_threshold_words: usize,
        store: Arc<dyn TranscriptStore>,
    ) -> PipelineResult<Self> {
        store.get_or_create(&session_id).await?;

        let (flush_tx, mut flush_rx) = mpsc::unbounded_channel::<TranscriptUpdate>();

        let flusher_session = session_id.clone();
        let flusher = tokio::spawn(async move {
            while let Some(update) = flush_rx.recv().await {
                if let Err(e) = store.update(&flusher_session, update).await {
                    warn!(session_id = %flusher_session, error = %e, "Transcript flush failed");
                }
            }
            debug!(session_id = %flusher_session, "Transcript flusher finished");
        });

        Ok(Self {
            session_id,
            flush_threshold_words,
            state: Mutex::new(AccumulatorState {
                full_text: String::new(),
                segments: Vec::new(),
                word_count: 0,
                character_count: 0,
                confidence_sum: 0.0,
                words_since_flush: 0,
            }),
            flush_tx: Mutex::new(Some(flush_tx)),
            flusher: Mutex::new(Some(flusher)),
        })
    }

    /// Append a final fragment to the transcript.
    ///
    /// Non-final fragments are a caller bug and are rejected with an error
    /// rather than silently dropped.
    pub async fn append(&self, fragment: &TranscriptFragment) -> PipelineResult<()> {
        if !fragment.is_final {
            return Err(PipelineError::NonFinalFragment);
        }

        let mut state = self.state.lock().await;

        let trimmed = fragment.text.trim();
        if !state.segments.is_empty() {
            state.full_text.push(' ');
        }
        state.full_text.push_str(trimmed);

        state.segments.push(SegmentRecord {
            text: trimmed.to_string(),
            confidence: fragment.confidence,
            language_code: fragment.language_code.clone(),
            word_timings: fragment.word_timings.clone(),
            recorded_at: Utc::now(),
        });

        state.word_count = state.full_text.split_whitespace().count();
        state.character_count = state.full_text.chars().count();
        state.confidence_sum += fragment.confidence as f64;
        state.words_since_flush += trimmed.split_whitespace().count();

        if state.words_since_flush >= self.flush_threshold_words {
            state.words_since_flush = 0;
            let update = Self::update_from(&state, TranscriptStatus::InProgress);
            // Enqueued while the state lock is still held so snapshots
            // reach the flusher in append order; the send never blocks.
            self.enqueue_flush(update).await;
        }

        Ok(())
    }

    /// Immutable copy of the current transcript and aggregate stats.
    pub async fn snapshot(&self) -> TranscriptSnapshot {
        let state = self.state.lock().await;
        TranscriptSnapshot {
            full_text: state.full_text.clone(),
            word_count: state.word_count,
            character_count: state.character_count,
            average_confidence: Self::average_confidence(&state),
            segment_count: state.segments.len(),
        }
    }

    /// Ordered copy of the finalized segment records.
    pub async fn segments(&self) -> Vec<SegmentRecord> {
        self.state.lock().await.segments.clone()
    }

    /// Final flush and teardown. Waits until every pending durable write,
    /// including the final one, has been applied in order.
    pub async fn finish(&self, status: TranscriptStatus) -> PipelineResult<()> {
        {
            let state = self.state.lock().await;
            let final_update = Self::update_from(&state, status);
            self.enqueue_flush(final_update).await;
        }

        // Close the channel so the flusher drains and exits.
        self.flush_tx.lock().await.take();

        if let Some(handle) = self.flusher.lock().await.take() {
            handle
                .await
                .map_err(|e| PipelineError::Persistence(format!("flusher task failed: {e}")))?;
        }

        info!(session_id = %self.session_id, status = ?status, "Transcript accumulator finished");
        Ok(())
    }

    async fn enqueue_flush(&self, update: TranscriptUpdate) {
        let guard = self.flush_tx.lock().await;
        match guard.as_ref() {
            Some(tx) => {
                if tx.send(update).is_err() {
                    warn!(session_id = %self.session_id, "Flusher gone, dropping transcript snapshot");
                }
            }
            None => {
                warn!(session_id = %self.session_id, "Accumulator already finished, dropping snapshot");
            }
        }
    }

    fn update_from(state: &AccumulatorState, status: TranscriptStatus) -> TranscriptUpdate {
        TranscriptUpdate {
            full_text: state.full_text.clone(),
            segments: state.segments.clone(),
            average_confidence: Self::average_confidence(state),
            status,
        }
    }

    fn average_confidence(state: &AccumulatorState) -> f32 {
        if state.segments.is_empty() {
            0.0
        } else {
            (state.confidence_sum / state.segments.len() as f64) as f32
        }
    }
}
