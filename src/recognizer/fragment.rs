use serde::{Deserialize, Serialize};

/// Word-level timing attached to a fragment when the backend provides it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WordTiming {
    pub word: String,
    pub start_offset_secs: f32,
    pub end_offset_secs: f32,
    pub confidence: f32,
}

/// One unit of recognizer output, interim or final.
///
/// Interim fragments are shown transiently and never persisted; final
/// fragments are consumed exactly once by the accumulator. The language code
/// is a per-fragment best guess and can change mid-session when the speaker
/// code-switches.
#[derive(Debug, Clone)]
pub struct TranscriptFragment {
    pub text: String,
    pub is_final: bool,
    /// Recognizer-reported, advisory not authoritative
    pub confidence: f32,
    pub language_code: String,
    pub word_timings: Option<Vec<WordTiming>>,
}

/// One word in a backend recognition alternative.
#[derive(Debug, Clone, Deserialize)]
pub struct WordInfo {
    #[serde(default)]
    pub word: String,
    #[serde(default)]
    pub start_time: f32,
    #[serde(default)]
    pub end_time: f32,
    #[serde(default)]
    pub confidence: f32,
}

/// One alternative transcription, ordered by backend rank.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionAlternative {
    #[serde(default)]
    pub transcript: String,
    #[serde(default)]
    pub confidence: f32,
    #[serde(default)]
    pub words: Vec<WordInfo>,
}

/// One streaming recognition result from the backend.
#[derive(Debug, Clone, Deserialize)]
pub struct RecognitionResult {
    #[serde(default)]
    pub alternatives: Vec<RecognitionAlternative>,
    #[serde(default)]
    pub is_final: bool,
    /// Auto-detected among the configured candidate languages
    #[serde(default)]
    pub language_code: Option<String>,
}

/// Event emitted by a speech backend stream.
#[derive(Debug)]
pub enum BackendEvent {
    Result(RecognitionResult),
    /// A single bad response; the stream continues
    TransientError(String),
    /// The stream cannot continue; the session is marked Failed
    FatalError(String),
}

/// Map a backend result onto a fragment.
///
/// Only the first (highest-ranked) alternative is used; a result with no
/// alternatives maps to `None` and is dropped rather than yielded.
pub fn fragment_from_result(
    result: RecognitionResult,
    default_language: &str,
) -> Option<TranscriptFragment> {
    let alternative = result.alternatives.into_iter().next()?;

    let word_timings = if alternative.words.is_empty() {
        None
    } else {
        Some(
            alternative
                .words
                .into_iter()
                .map(|w| WordTiming {
                    word: w.word,
                    start_offset_secs: w.start_time,
                    end_offset_secs: w.end_time,
                    confidence: w.confidence,
                })
                .collect(),
        )
    };

    Some(TranscriptFragment {
        text: alternative.transcript,
        is_final: result.is_final,
        confidence: alternative.confidence,
        language_code: result
            .language_code
            .unwrap_or_else(|| default_language.to_string()),
        word_timings,
    })
}
