//! HTTP API and websocket transport
//!
//! This module exposes the service surface:
//! - POST /sessions/start - Register a consultation session
//! - GET /sessions/:id/stream - Duplex audio/transcript websocket
//! - POST /sessions/:id/stop - Stop a session out-of-band
//! - GET /sessions/:id/status - Query session statistics
//! - GET /sessions/:id/transcript - Get accumulated transcript
//! - POST /sessions/:id/report - Synthesize a report from the transcript so far
//! - GET /health - Health check

mod handlers;
mod routes;
mod state;

pub use routes::create_router;
pub use state::AppState;
