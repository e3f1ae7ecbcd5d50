//! Audio ingest adapter
//!
//! Receives the client's duplex channel traffic (binary audio frames
//! interleaved with JSON control messages), dispatches control to the
//! session, and exposes the audio as a pull-based chunk sequence for the
//! recognizer.

mod adapter;
mod messages;

pub use adapter::{AudioChunks, AudioIngestAdapter, IngestStats, AUDIO_QUEUE_CAPACITY};
pub use messages::{
    ControlMessage, InboundFrame, OutboundMessage, SessionEvent, TranscriptFrame, WordFrame,
};
