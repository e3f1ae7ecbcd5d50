//! Transcript accumulation
//!
//! The per-session append-only transcript buffer plus the persistence seam
//! it flushes through. Appends are mutex-serialized; durable flushes are
//! fire-and-forget relative to the appender but ordered per session.

mod accumulator;
mod store;

pub use accumulator::{SegmentRecord, TranscriptAccumulator, TranscriptSnapshot};
pub use store::{InMemoryTranscriptStore, TranscriptStatus, TranscriptStore, TranscriptUpdate};
