use thiserror::Error;

/// Error taxonomy for the transcription pipeline.
///
/// Only infrastructure failures surface here. Blocked generation content and
/// malformed generation JSON are absorbed inside the report synthesizer and
/// degrade to a lower-confidence report instead of an error.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Transport-level failure on the audio ingest channel. Ends the audio
    /// stream; the transcript accumulated so far is preserved.
    #[error("channel error: {0}")]
    Channel(String),

    /// Fatal configuration/auth error from the speech recognizer.
    #[error("recognition service error: {0}")]
    RecognitionService(String),

    /// A single bad response from the recognizer; the stream continues.
    #[error("transient recognition error: {0}")]
    RecognitionTransient(String),

    /// Network/auth failure contacting the generation backend. The only
    /// generation-path error that reaches the caller.
    #[error("generation service error: {0}")]
    GenerationService(String),

    /// A non-final fragment was passed to the accumulator (caller bug).
    #[error("non-final fragment passed to accumulator")]
    NonFinalFragment,

    #[error("session not found: {0}")]
    SessionNotFound(String),

    #[error("persistence error: {0}")]
    Persistence(String),

    #[error("configuration error: {0}")]
    Config(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;
