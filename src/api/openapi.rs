//! OpenAPI document and, with the `swagger-ui` feature, the Swagger UI.

use axum::Router;
use utoipa::OpenApi;

use super::dto::{SessionListResponse, StatsResponse};
use super::handlers::{sessions, system};
use crate::app_state::AppState;
use crate::domain::{ChatMessage, MessageType, SessionState, SessionSummary};
use crate::error::{ErrorBody, ErrorResponse};

/// Path of the generated OpenAPI JSON document.
pub const OPENAPI_PATH: &str = "/api-docs/openapi.json";

/// OpenAPI description of the REST surface.
#[derive(Debug, OpenApi)]
#[openapi(
    info(title = "chat-relay", description = "WebSocket chat relay: REST inspection endpoints"),
    paths(
        system::health_handler,
        sessions::list_sessions,
        sessions::user_sessions,
        sessions::stats,
    ),
    components(schemas(
        SessionListResponse,
        SessionSummary,
        SessionState,
        StatsResponse,
        ChatMessage,
        MessageType,
        ErrorResponse,
        ErrorBody,
    )),
    tags(
        (name = "System", description = "Health and service metadata"),
        (name = "Sessions", description = "Live session inspection"),
    )
)]
pub struct ApiDoc;

/// Routes serving the OpenAPI document (and Swagger UI when enabled).
#[cfg(feature = "swagger-ui")]
pub fn routes() -> Router<AppState> {
    Router::new().merge(
        utoipa_swagger_ui::SwaggerUi::new("/swagger-ui").url(OPENAPI_PATH, ApiDoc::openapi()),
    )
}

/// Routes serving the OpenAPI document (and Swagger UI when enabled).
#[cfg(not(feature = "swagger-ui"))]
pub fn routes() -> Router<AppState> {
    use axum::Json;
    use axum::routing::get;

    Router::new().route(OPENAPI_PATH, get(|| async { Json(ApiDoc::openapi()) }))
}
