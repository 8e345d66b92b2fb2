//! Router assembly shared by the binary and the integration tests.

use std::time::Duration;

use axum::Router;
use axum::http::StatusCode;
use axum::routing::get;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::api;
use crate::app_state::AppState;
use crate::config::ChatConfig;
use crate::ws::handler::ws_handler;

/// Builds the full application router: REST API, OpenAPI, and `/ws`.
///
/// The request timeout only wraps the REST routes; WebSocket sessions are
/// long-lived.
pub fn build_app(state: AppState, config: &ChatConfig) -> Router {
    let rest = api::build_router().layer(request_timeout(Duration::from_secs(
        config.request_timeout_secs,
    )));

    Router::new()
        .merge(rest)
        .route("/ws", get(ws_handler))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// REST requests running longer than `limit` are answered with
/// `408 Request Timeout`.
fn request_timeout(limit: Duration) -> TimeoutLayer {
    TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, limit)
}
