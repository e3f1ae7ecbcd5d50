use crate::recognizer::TranscriptFragment;
use crate::report::ClinicalReport;
use serde::{Deserialize, Serialize};

/// Control message received as a text frame on the client channel.
///
/// Clients may attach extra fields (e.g. `session_id`); unknown fields are
/// ignored.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ControlMessage {
    StartRecording,
    StopRecording,
    PauseRecording,
    ResumeRecording,
    Ping,
}

/// One frame arriving from the client's duplex channel, already classified
/// by the transport layer (binary = audio, text = control JSON).
#[derive(Debug)]
pub enum InboundFrame {
    Audio(Vec<u8>),
    Control(String),
    /// Clean close from the client
    Closed,
    /// Hard transport failure; the session is marked Failed
    Error(String),
}

/// Session-level event dispatched by the ingest adapter. Control messages
/// never enter the audio queue; they travel here instead.
#[derive(Debug)]
pub enum SessionEvent {
    Control(ControlMessage),
    ChannelClosed,
    ChannelError(String),
}

/// Live transcript update pushed back to the client for display.
///
/// Interim fragments flow through here too; only final ones reach the
/// accumulator.
#[derive(Debug, Clone, Serialize)]
pub struct TranscriptFrame {
    pub transcript: String,
    pub is_final: bool,
    pub confidence: f32,
    pub language_code: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub words: Option<Vec<WordFrame>>,
    /// ISO-8601 timestamp
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct WordFrame {
    pub word: String,
    pub start_time: f32,
    pub end_time: f32,
    pub confidence: f32,
}

impl TranscriptFrame {
    pub fn from_fragment(fragment: &TranscriptFragment) -> Self {
        Self {
            transcript: fragment.text.clone(),
            is_final: fragment.is_final,
            confidence: fragment.confidence,
            language_code: fragment.language_code.clone(),
            words: fragment.word_timings.as_ref().map(|timings| {
                timings
                    .iter()
                    .map(|w| WordFrame {
                        word: w.word.clone(),
                        start_time: w.start_offset_secs,
                        end_time: w.end_offset_secs,
                        confidence: w.confidence,
                    })
                    .collect()
            }),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Message sent to the client over the duplex channel.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Transcript(TranscriptFrame),
    Pong { timestamp: String },
    Report { report: ClinicalReport },
    SessionFailed { error: String },
}
