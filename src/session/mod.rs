//! Consultation session lifecycle and orchestration
//!
//! A session ties the pipeline together for one patient encounter: the
//! ingest adapter feeding the streaming recognizer, the transcript
//! accumulator collecting final fragments, and the report synthesizer run
//! once the audio stream ends. The registry tracks live sessions for the
//! HTTP layer.

pub mod config;
pub mod registry;
pub mod session;
pub mod stats;

pub use config::SessionConfig;
pub use registry::SessionRegistry;
pub use session::{ConsultationSession, SessionStatus};
pub use stats::SessionStats;
