//! Streaming speech recognizer
//!
//! Wraps a cloud streaming recognition backend configured for the clinical
//! multilingual domain (a primary language plus up to two alternates, with a
//! clinical vocabulary boost list) and turns the audio chunk sequence into a
//! sequence of transcript fragments.

mod client;
mod fragment;
mod stream;
mod vocabulary;

pub use client::{CloudSpeechClient, RecognitionConfig, SpeechBackend};
pub use fragment::{
    fragment_from_result, BackendEvent, RecognitionAlternative, RecognitionResult,
    TranscriptFragment, WordInfo, WordTiming,
};
pub use stream::{RecognizerUpdate, StreamingRecognizer, RESPONSE_IDLE_TIMEOUT};
pub use vocabulary::clinical_boost_phrases;
