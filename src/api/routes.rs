//! API Routes
//!
//! Configures the Axum router with all prediction service endpoints.

use std::any::Any as PanicPayload;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
    LatencyUnit,
};
use tracing::{error, Level};

use super::handlers::{cache_stats_handler, health_handler, login_handler, predict_handler};
use super::AppState;
use crate::error::GENERIC_INTERNAL_MESSAGE;
use crate::models::ErrorResponse;

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin (configurable for production)
/// - Tracing: Logs method and URI of every request, then status and latency
/// - Catch panic: A panicking handler is logged and answered with a generic 500
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let trace = TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_request(DefaultOnRequest::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(LatencyUnit::Millis),
        );

    Router::new()
        .route("/login", post(login_handler))
        .route("/predict", post(predict_handler))
        .route("/cache/stats", get(cache_stats_handler))
        .route("/health", get(health_handler))
        .layer(cors)
        .layer(trace)
        .layer(CatchPanicLayer::custom(handle_panic))
        .with_state(state)
}

/// Logs the panic payload and answers with the generic internal error body.
fn handle_panic(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = if let Some(msg) = payload.downcast_ref::<String>() {
        msg.as_str()
    } else if let Some(msg) = payload.downcast_ref::<&str>() {
        msg
    } else {
        "non-string panic payload"
    };
    error!(panic = %detail, "request handler panicked");

    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse::new(GENERIC_INTERNAL_MESSAGE)),
    )
        .into_response()
}
