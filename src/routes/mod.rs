//! Router assembly: HTTP endpoints, WebSocket upgrade, static files, CORS, and HTTP tracing.

use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    services::{ServeDir, ServeFile},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::state::AppState;

pub mod http;
pub mod ws;

/// Build the application router with:
/// - WebSocket at `/ws`
/// - quiz API under `/api/v1/...`
/// - kernel endpoints for the display widgets under `/api/v1/kernel/...`
/// - Static widget frontend from `./static` with index fallback
/// - CORS (allow any origin/method/headers)
/// - HTTP trace layer (per-request spans w/ method, path, status, latency)
pub fn build_router(state: Arc<AppState>) -> Router {
    let static_service = ServeDir::new("./static")
        .append_index_html_on_directories(true)
        .not_found_service(ServeFile::new("./static/index.html"));

    Router::new()
        // WebSocket
        .route("/ws", get(ws::ws_upgrade))
        // Quiz
        .route("/api/v1/health", get(http::http_health))
        .route("/api/v1/exercise", get(http::http_get_exercise))
        .route("/api/v1/answer", post(http::http_post_answer))
        .route("/api/v1/round", post(http::http_post_round))
        .route("/api/v1/round/answer", post(http::http_post_round_answer))
        .route("/api/v1/stats", get(http::http_get_stats))
        .route("/api/v1/widgets/primes/complete", post(http::http_post_primes_complete))
        // Kernel
        .route("/api/v1/kernel/divisibility", get(http::http_get_divisibility))
        .route("/api/v1/kernel/prime", get(http::http_get_prime))
        .route("/api/v1/kernel/factorize", get(http::http_get_factorize))
        .route("/api/v1/kernel/primes", get(http::http_get_primes))
        .route("/api/v1/kernel/normalize", post(http::http_post_normalize))
        // State + CORS + HTTP tracing
        .with_state(state)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_request(DefaultOnRequest::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        // Frontend fallback
        .fallback_service(static_service)
}
