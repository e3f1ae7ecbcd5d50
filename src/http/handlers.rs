use super::state::AppState;
use crate::error::PipelineError;
use crate::ingest::{InboundFrame, OutboundMessage};
use crate::report::SessionType;
use crate::session::{ConsultationSession, SessionConfig, SessionRegistry};
use crate::transcript::{SegmentRecord, TranscriptSnapshot, TranscriptStore};
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Json},
};
use futures::{SinkExt, StreamExt};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{error, info, warn};

// ============================================================================
// Request/Response Types
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct StartSessionRequest {
    /// Optional session ID (if not provided, generate UUID)
    pub session_id: Option<String>,

    /// new_patient or follow_up (default: follow_up)
    pub session_type: Option<SessionType>,

    /// Patient status on record, forwarded to the report synthesizer
    pub patient_status: Option<String>,

    /// Current medication list, forwarded to the report synthesizer
    #[serde(default)]
    pub medications: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct StartSessionResponse {
    pub session_id: String,
    pub status: String,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct StopSessionResponse {
    pub session_id: String,
    pub status: String,
}

#[derive(Debug, Serialize)]
pub struct TranscriptResponse {
    pub session_id: String,
    #[serde(flatten)]
    pub snapshot: TranscriptSnapshot,
    pub segments: Vec<SegmentRecord>,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

fn not_found(session_id: &str) -> axum::response::Response {
    (
        StatusCode::NOT_FOUND,
        Json(ErrorResponse {
            error: format!("Session {} not found", session_id),
        }),
    )
        .into_response()
}

// ============================================================================
// Handlers
// ============================================================================

/// POST /sessions/start
/// Register a consultation session before the audio channel connects
pub async fn start_session(
    State(state): State<AppState>,
    Json(req): Json<StartSessionRequest>,
) -> impl IntoResponse {
    let session_id = req
        .session_id
        .unwrap_or_else(|| format!("session-{}", uuid::Uuid::new_v4()));

    info!("Starting consultation session: {}", session_id);

    if state.registry.get(&session_id).await.is_some() {
        return (
            StatusCode::CONFLICT,
            Json(ErrorResponse {
                error: format!("Session {} already exists", session_id),
            }),
        )
            .into_response();
    }

    let mut config = SessionConfig::from_app_config(&state.config, session_id.clone());
    if let Some(session_type) = req.session_type {
        config.session_type = session_type;
    }
    config.patient_status = req.patient_status;
    config.medications = req.medications;

    let session = match ConsultationSession::new(
        config,
        state.speech_backend.clone(),
        state.synthesizer.clone(),
        state.store.clone() as Arc<dyn TranscriptStore>,
    )
    .await
    {
        Ok(s) => Arc::new(s),
        Err(e) => {
            error!("Failed to create session: {}", e);
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: format!("Failed to create session: {}", e),
                }),
            )
                .into_response();
        }
    };

    state.registry.insert(session).await;

    (
        StatusCode::OK,
        Json(StartSessionResponse {
            session_id: session_id.clone(),
            status: "pending".to_string(),
            message: format!("Session {} created, awaiting audio stream", session_id),
        }),
    )
        .into_response()
}

/// GET /sessions/:session_id/stream
/// Upgrade to the duplex audio/transcript channel and run the pipeline
pub async fn session_stream(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    ws: WebSocketUpgrade,
) -> impl IntoResponse {
    // Sessions may be pre-registered via POST /sessions/start; a direct
    // connect gets service defaults.
    let session = match state.registry.get(&session_id).await {
        Some(s) => s,
        None => {
            let config = SessionConfig::from_app_config(&state.config, session_id.clone());
            match ConsultationSession::new(
                config,
                state.speech_backend.clone(),
                state.synthesizer.clone(),
                state.store.clone() as Arc<dyn TranscriptStore>,
            )
            .await
            {
                Ok(s) => {
                    let session = Arc::new(s);
                    state.registry.insert(session.clone()).await;
                    session
                }
                Err(e) => {
                    error!("Failed to create session: {}", e);
                    return (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        Json(ErrorResponse {
                            error: format!("Failed to create session: {}", e),
                        }),
                    )
                        .into_response();
                }
            }
        }
    };

    let registry = state.registry.clone();
    ws.on_upgrade(move |socket| run_session_socket(socket, session, registry))
}

/// Bridges the websocket to the session pump: binary frames become audio,
/// text frames become control messages, and outbound pipeline messages go
/// back as JSON text.
async fn run_session_socket(
    socket: WebSocket,
    session: Arc<ConsultationSession>,
    registry: Arc<SessionRegistry>,
) {
    let session_id = session.session_id().to_string();
    info!(session_id = %session_id, "Audio channel connected");

    let (mut ws_tx, mut ws_rx) = socket.split();
    let (inbound_tx, inbound_rx) = mpsc::channel::<InboundFrame>(64);
    let (outbound_tx, mut outbound_rx) = mpsc::channel::<OutboundMessage>(64);

    session.bind_channel(inbound_tx.clone()).await;

    // Socket reader: classify frames. Exits once the pump drops the
    // receiver or the client goes away.
    tokio::spawn(async move {
        while let Some(msg) = ws_rx.next().await {
            let frame = match msg {
                Ok(Message::Binary(bytes)) => InboundFrame::Audio(bytes),
                Ok(Message::Text(text)) => InboundFrame::Control(text),
                Ok(Message::Close(_)) => break,
                // Protocol-level ping/pong is handled by the transport.
                Ok(_) => continue,
                Err(e) => {
                    let _ = inbound_tx.send(InboundFrame::Error(e.to_string())).await;
                    return;
                }
            };
            if inbound_tx.send(frame).await.is_err() {
                return;
            }
        }
        // Clean close and abrupt stream end both finish the audio stream.
        let _ = inbound_tx.send(InboundFrame::Closed).await;
    });

    // Socket writer: pipeline messages out as JSON.
    let writer_session = session_id.clone();
    let writer = tokio::spawn(async move {
        while let Some(msg) = outbound_rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(json) => {
                    if ws_tx.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(session_id = %writer_session, error = %e, "Failed to encode outbound message");
                }
            }
        }
        let _ = ws_tx.send(Message::Close(None)).await;
    });

    match session.run(inbound_rx, outbound_tx).await {
        Ok(Some(_)) => info!(session_id = %session_id, "Session completed with report"),
        Ok(None) => warn!(session_id = %session_id, "Session failed, partial transcript preserved"),
        Err(e) => error!(session_id = %session_id, error = %e, "Session pipeline error"),
    }

    if let Err(e) = writer.await {
        warn!(session_id = %session_id, error = %e, "Socket writer task failed");
    }

    // The encounter is over either way; drop it from the live-session map.
    registry.remove(&session_id).await;
}

/// POST /sessions/:session_id/stop
/// Stop a session from outside the audio channel
pub async fn stop_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    info!("Stop requested for session: {}", session_id);

    match state.registry.get(&session_id).await {
        Some(session) => match session.request_stop().await {
            Ok(()) => (
                StatusCode::OK,
                Json(StopSessionResponse {
                    session_id,
                    status: "finalizing".to_string(),
                }),
            )
                .into_response(),
            Err(e) => (
                StatusCode::CONFLICT,
                Json(ErrorResponse {
                    error: format!("Failed to stop session: {}", e),
                }),
            )
                .into_response(),
        },
        None => not_found(&session_id),
    }
}

/// GET /sessions/:session_id/status
/// Point-in-time session statistics
pub async fn get_session_status(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get(&session_id).await {
        Some(session) => (StatusCode::OK, Json(session.stats().await)).into_response(),
        None => not_found(&session_id),
    }
}

/// GET /sessions/:session_id/transcript
/// Accumulated transcript (snapshot plus ordered segments)
pub async fn get_session_transcript(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get(&session_id).await {
        Some(session) => {
            let snapshot = session.snapshot().await;
            let segments = session.segments().await;
            (
                StatusCode::OK,
                Json(TranscriptResponse {
                    session_id,
                    snapshot,
                    segments,
                }),
            )
                .into_response()
        }
        None => not_found(&session_id),
    }
}

/// POST /sessions/:session_id/report
/// Synthesize a report from the transcript accumulated so far
pub async fn generate_session_report(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> impl IntoResponse {
    match state.registry.get(&session_id).await {
        Some(session) => match session.generate_report().await {
            Ok(report) => (StatusCode::OK, Json(report)).into_response(),
            Err(e @ PipelineError::GenerationService(_)) => {
                error!(session_id = %session_id, error = %e, "Report generation failed");
                (
                    StatusCode::BAD_GATEWAY,
                    Json(ErrorResponse {
                        error: e.to_string(),
                    }),
                )
                    .into_response()
            }
            Err(e) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: e.to_string(),
                }),
            )
                .into_response(),
        },
        None => not_found(&session_id),
    }
}

/// GET /health
/// Health check endpoint
pub async fn health_check() -> impl IntoResponse {
    (StatusCode::OK, "OK")
}
