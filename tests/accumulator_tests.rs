// Integration tests for the transcript accumulator
//
// These tests verify the append invariants: single-space joining of
// trimmed segments, stats recomputed from the full text, plain-mean
// confidence, and durable flushes at the word threshold and on finish.

use anyhow::Result;
use clinic_scribe::error::{PipelineError, PipelineResult};
use clinic_scribe::recognizer::TranscriptFragment;
use clinic_scribe::transcript::{
    InMemoryTranscriptStore, TranscriptAccumulator, TranscriptStatus, TranscriptStore,
    TranscriptUpdate,
};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;

fn final_fragment(text: &str, confidence: f32) -> TranscriptFragment {
    TranscriptFragment {
        text: text.to_string(),
        is_final: true,
        confidence,
        language_code: "en-IN".to_string(),
        word_timings: None,
    }
}

async fn accumulator(
    threshold: usize,
) -> Result<(TranscriptAccumulator, Arc<InMemoryTranscriptStore>)> {
    let store = Arc::new(InMemoryTranscriptStore::new());
    let acc = TranscriptAccumulator::new(
        "test-session".to_string(),
        threshold,
        store.clone() as Arc<dyn TranscriptStore>,
    )
    .await?;
    Ok((acc, store))
}

#[tokio::test]
async fn test_append_joins_trimmed_segments_with_single_spaces() -> Result<()> {
    let (acc, _store) = accumulator(50).await?;

    acc.append(&final_fragment("  Patient reports  ", 0.9)).await?;
    acc.append(&final_fragment("sleeping better", 0.8)).await?;
    acc.append(&final_fragment(" since last visit. ", 0.85)).await?;

    let snapshot = acc.snapshot().await;
    assert_eq!(
        snapshot.full_text,
        "Patient reports sleeping better since last visit."
    );
    assert_eq!(snapshot.segment_count, 3);

    Ok(())
}

#[tokio::test]
async fn test_stats_are_recomputed_from_full_text() -> Result<()> {
    let (acc, _store) = accumulator(50).await?;

    acc.append(&final_fragment("नींद अच्छी है", 0.9)).await?;
    acc.append(&final_fragment("medication continued", 0.8)).await?;

    let snapshot = acc.snapshot().await;
    assert_eq!(snapshot.word_count, snapshot.full_text.split_whitespace().count());
    assert_eq!(snapshot.character_count, snapshot.full_text.chars().count());
    assert_eq!(snapshot.word_count, 5);

    Ok(())
}

#[tokio::test]
async fn test_average_confidence_is_plain_mean() -> Result<()> {
    let (acc, _store) = accumulator(50).await?;

    acc.append(&final_fragment("one", 0.9)).await?;
    acc.append(&final_fragment("two", 0.7)).await?;
    acc.append(&final_fragment("three", 0.5)).await?;

    let snapshot = acc.snapshot().await;
    assert!(
        (snapshot.average_confidence - 0.7).abs() < 1e-6,
        "Expected mean 0.7, got {}",
        snapshot.average_confidence
    );

    Ok(())
}

#[tokio::test]
async fn test_empty_transcript_reports_zero_confidence() -> Result<()> {
    let (acc, _store) = accumulator(50).await?;

    let snapshot = acc.snapshot().await;
    assert_eq!(snapshot.average_confidence, 0.0);
    assert_eq!(snapshot.word_count, 0);
    assert_eq!(snapshot.character_count, 0);
    assert_eq!(snapshot.segment_count, 0);
    assert!(snapshot.full_text.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_snapshot_is_stable_between_appends() -> Result<()> {
    let (acc, _store) = accumulator(50).await?;

    acc.append(&final_fragment("hello world", 0.9)).await?;

    let first = acc.snapshot().await;
    let second = acc.snapshot().await;
    assert_eq!(first, second, "Snapshots without intervening appends must match");

    Ok(())
}

#[tokio::test]
async fn test_non_final_fragment_is_rejected() -> Result<()> {
    let (acc, _store) = accumulator(50).await?;

    let mut fragment = final_fragment("interim guess", 0.4);
    fragment.is_final = false;

    let err = acc.append(&fragment).await.unwrap_err();
    assert!(matches!(err, PipelineError::NonFinalFragment));

    let snapshot = acc.snapshot().await;
    assert_eq!(snapshot.segment_count, 0, "Rejected fragment must not be recorded");

    Ok(())
}

#[tokio::test]
async fn test_flush_threshold_persists_in_progress_snapshot() -> Result<()> {
    let (acc, store) = accumulator(5).await?;

    acc.append(&final_fragment("patient reports sleeping much better now", 0.9))
        .await?;

    // The flush is handed to a background task; give it a moment.
    tokio::time::sleep(Duration::from_millis(50)).await;

    let record = store.get("test-session").await.expect("record should exist");
    assert_eq!(record.status, TranscriptStatus::InProgress);
    assert_eq!(record.full_text, "patient reports sleeping much better now");
    assert_eq!(record.segments.len(), 1);

    Ok(())
}

#[tokio::test]
async fn test_below_threshold_appends_do_not_flush_content() -> Result<()> {
    let (acc, store) = accumulator(50).await?;

    acc.append(&final_fragment("short note", 0.9)).await?;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let record = store.get("test-session").await.expect("record should exist");
    assert!(
        record.full_text.is_empty(),
        "No flush should happen below the word threshold"
    );

    Ok(())
}

#[tokio::test]
async fn test_finish_writes_final_status_and_full_transcript() -> Result<()> {
    let (acc, store) = accumulator(50).await?;

    acc.append(&final_fragment("session went well", 0.9)).await?;
    acc.append(&final_fragment("continue current dose", 0.8)).await?;
    acc.finish(TranscriptStatus::Completed).await?;

    let record = store.get("test-session").await.expect("record should exist");
    assert_eq!(record.status, TranscriptStatus::Completed);
    assert_eq!(record.full_text, "session went well continue current dose");
    assert_eq!(record.segments.len(), 2);
    assert!((record.average_confidence - 0.85).abs() < 1e-6);

    Ok(())
}

/// Store that records the segment count of every update it receives, in
/// arrival order.
#[derive(Default)]
struct FlushOrderStore {
    segment_counts: Mutex<Vec<usize>>,
}

#[async_trait::async_trait]
impl TranscriptStore for FlushOrderStore {
    async fn get_or_create(&self, _session_id: &str) -> PipelineResult<()> {
        Ok(())
    }

    async fn update(&self, _session_id: &str, update: TranscriptUpdate) -> PipelineResult<()> {
        self.segment_counts.lock().await.push(update.segments.len());
        Ok(())
    }
}

#[tokio::test]
async fn test_concurrent_appends_flush_in_append_order() -> Result<()> {
    let store = Arc::new(FlushOrderStore::default());
    let acc = Arc::new(
        TranscriptAccumulator::new(
            "test-session".to_string(),
            1, // every append crosses the threshold
            store.clone() as Arc<dyn TranscriptStore>,
        )
        .await?,
    );

    // Several producers appending at once; the design must not assume a
    // single producer per session.
    let mut handles = Vec::new();
    for worker in 0..4 {
        let acc = acc.clone();
        handles.push(tokio::spawn(async move {
            for i in 0..25 {
                acc.append(&final_fragment(&format!("w{worker}s{i}"), 0.9))
                    .await
                    .unwrap();
            }
        }));
    }
    for handle in handles {
        handle.await?;
    }
    acc.finish(TranscriptStatus::Completed).await?;

    let counts = store.segment_counts.lock().await;
    assert_eq!(counts.len(), 101, "100 threshold flushes plus the final one");
    for pair in counts.windows(2) {
        assert!(
            pair[0] <= pair[1],
            "An older snapshot must never arrive after a newer one: {:?}",
            &counts[..]
        );
    }
    assert_eq!(*counts.last().unwrap(), 100);

    Ok(())
}

#[tokio::test]
async fn test_finish_failed_preserves_partial_transcript() -> Result<()> {
    let (acc, store) = accumulator(50).await?;

    acc.append(&final_fragment("patient described", 0.9)).await?;
    acc.append(&final_fragment("ongoing anxiety", 0.7)).await?;
    acc.finish(TranscriptStatus::Failed).await?;

    let record = store.get("test-session").await.expect("record should exist");
    assert_eq!(record.status, TranscriptStatus::Failed);
    assert_eq!(
        record.full_text, "patient described ongoing anxiety",
        "A failed session keeps everything accumulated before the failure"
    );

    Ok(())
}
