use super::handlers;
use super::state::AppState;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// Create the HTTP router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))
        // Session control
        .route("/sessions/start", post(handlers::start_session))
        .route(
            "/sessions/:session_id/stop",
            post(handlers::stop_session),
        )
        // Duplex audio/transcript channel
        .route(
            "/sessions/:session_id/stream",
            get(handlers::session_stream),
        )
        // Session queries
        .route(
            "/sessions/:session_id/status",
            get(handlers::get_session_status),
        )
        .route(
            "/sessions/:session_id/transcript",
            get(handlers::get_session_transcript),
        )
        // On-demand report synthesis
        .route(
            "/sessions/:session_id/report",
            post(handlers::generate_session_report),
        )
        // Add tracing middleware for request logging
        .layer(TraceLayer::new_for_http())
        // Clinician clients run in the browser
        .layer(CorsLayer::permissive())
        .with_state(state)
}
