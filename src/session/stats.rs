use super::session::SessionStatus;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Point-in-time statistics for a consultation session, served over the
/// status endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub session_id: String,
    pub status: SessionStatus,
    pub started_at: DateTime<Utc>,
    pub duration_secs: i64,
    pub chunks_received: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_activity_at: Option<DateTime<Utc>>,
    pub word_count: usize,
    pub character_count: usize,
    pub average_confidence: f32,
    pub segment_count: usize,
}
