use super::accumulator::SegmentRecord;
use crate::error::PipelineResult;
use serde::Serialize;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Durable status recorded with each snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TranscriptStatus {
    InProgress,
    Completed,
    Failed,
}

/// Snapshot written to the persistent store.
#[derive(Debug, Clone)]
pub struct TranscriptUpdate {
    pub full_text: String,
    pub segments: Vec<SegmentRecord>,
    pub average_confidence: f32,
    pub status: TranscriptStatus,
}

/// Persistence collaborator for accumulated transcripts. The schema behind
/// it belongs to the surrounding record system, not to this pipeline.
#[async_trait::async_trait]
pub trait TranscriptStore: Send + Sync {
    async fn get_or_create(&self, session_id: &str) -> PipelineResult<()>;
    async fn update(&self, session_id: &str, update: TranscriptUpdate) -> PipelineResult<()>;
}

/// Keeps the latest update per session in memory. Default store for
/// standalone runs and tests.
#[derive(Default)]
pub struct InMemoryTranscriptStore {
    records: RwLock<HashMap<String, TranscriptUpdate>>,
}

impl InMemoryTranscriptStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, session_id: &str) -> Option<TranscriptUpdate> {
        self.records.read().await.get(session_id).cloned()
    }
}

#[async_trait::async_trait]
impl TranscriptStore for InMemoryTranscriptStore {
    async fn get_or_create(&self, session_id: &str) -> PipelineResult<()> {
        let mut records = self.records.write().await;
        records.entry(session_id.to_string()).or_insert(TranscriptUpdate {
            full_text: String::new(),
            segments: Vec::new(),
            average_confidence: 0.0,
            status: TranscriptStatus::InProgress,
        });
        Ok(())
    }

    async fn update(&self, session_id: &str, update: TranscriptUpdate) -> PipelineResult<()> {
        let mut records = self.records.write().await;
        records.insert(session_id.to_string(), update);
        Ok(())
    }
}
