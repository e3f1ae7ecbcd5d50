//! Clinic Scribe - Real-time clinical consultation transcription
//!
//! Streams consultation audio from a clinician's browser through a cloud
//! speech recognizer tuned for mixed Hindi/Marathi/English, accumulates the
//! finalized transcript, and synthesizes a structured clinical report when
//! the session ends.
//!
//! Pipeline stages:
//! - `ingest`: duplex channel -> classified audio chunk sequence
//! - `recognizer`: audio chunks -> transcript fragments
//! - `transcript`: final fragments -> accumulated transcript + durable flushes
//! - `report`: transcript snapshot -> clinical report (AI with template fallback)
//! - `session`: per-encounter orchestration of the stages above
//! - `http`: REST + websocket service surface

pub mod config;
pub mod error;
pub mod http;
pub mod ingest;
pub mod recognizer;
pub mod report;
pub mod session;
pub mod transcript;

pub use config::Config;
pub use error::{PipelineError, PipelineResult};
pub use session::{ConsultationSession, SessionConfig, SessionRegistry, SessionStatus};
