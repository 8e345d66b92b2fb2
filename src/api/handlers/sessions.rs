//! Session inspection endpoints: who is connected, and relay statistics.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};

use crate::api::dto::{SessionListResponse, StatsResponse};
use crate::app_state::AppState;
use crate::error::{ChatError, ErrorResponse};

/// `GET /sessions` — List live sessions.
#[utoipa::path(
    get,
    path = "/api/v1/sessions",
    tag = "Sessions",
    summary = "List live sessions",
    description = "Returns every open WebSocket session, oldest first, with the username bound by its JOIN if any.",
    responses(
        (status = 200, description = "Live sessions", body = SessionListResponse),
    )
)]
pub async fn list_sessions(State(state): State<AppState>) -> impl IntoResponse {
    let sessions = state.chat_service.relay().sessions().snapshot();
    (StatusCode::OK, Json(SessionListResponse::new(sessions)))
}

/// `GET /users/{username}/sessions` — Sessions bound to one user.
///
/// # Errors
///
/// Returns [`ChatError::UserNotFound`] if no live session carries the name.
#[utoipa::path(
    get,
    path = "/api/v1/users/{username}/sessions",
    tag = "Sessions",
    summary = "Sessions of a user",
    description = "Returns the live sessions bound to the given username. Several sessions may share a name.",
    params(
        ("username" = String, Path, description = "Username bound by JOIN"),
    ),
    responses(
        (status = 200, description = "Sessions of the user", body = SessionListResponse),
        (status = 404, description = "No live session for the user", body = ErrorResponse),
    )
)]
pub async fn user_sessions(
    State(state): State<AppState>,
    Path(username): Path<String>,
) -> Result<impl IntoResponse, ChatError> {
    let sessions: Vec<_> = state
        .chat_service
        .relay()
        .sessions()
        .snapshot()
        .into_iter()
        .filter(|s| s.username.as_deref() == Some(username.as_str()))
        .collect();
    if sessions.is_empty() {
        return Err(ChatError::UserNotFound(username));
    }
    Ok((StatusCode::OK, Json(SessionListResponse::new(sessions))))
}

/// `GET /stats` — Relay statistics.
#[utoipa::path(
    get,
    path = "/api/v1/stats",
    tag = "Sessions",
    summary = "Relay statistics",
    description = "Returns session counts, subscriber counts per destination, and the registered inbound destinations.",
    responses(
        (status = 200, description = "Current statistics", body = StatsResponse),
    )
)]
pub async fn stats(State(state): State<AppState>) -> impl IntoResponse {
    let service = &state.chat_service;
    let relay = service.relay();
    let response = StatsResponse {
        sessions: relay.sessions().len(),
        joined: relay.sessions().joined_count(),
        subscribed_connections: relay.subscriptions().connection_count(),
        subscribers: relay.subscriptions().counts(),
        inbound_destinations: service
            .router()
            .destinations()
            .into_iter()
            .map(str::to_string)
            .collect(),
        shared_topic: service.shared_topic().to_string(),
    };
    (StatusCode::OK, Json(response))
}

/// Session routes, nested under `/api/v1`.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sessions", get(list_sessions))
        .route("/users/{username}/sessions", get(user_sessions))
        .route("/stats", get(stats))
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use super::*;
    use crate::config::ChatConfig;
    use crate::domain::{ChatMessage, mailbox};

    fn app(state: AppState) -> Router {
        routes().with_state(state)
    }

    async fn fetch(app: Router, uri: &str) -> axum::response::Response {
        let Ok(request) = Request::builder().uri(uri).body(Body::empty()) else {
            panic!("valid request");
        };
        let Ok(response) = app.oneshot(request).await else {
            panic!("router is infallible");
        };
        response
    }

    #[tokio::test]
    async fn unknown_user_is_404() {
        let state = AppState::new(&ChatConfig::default());
        let response = fetch(app(state), "/users/nobody/sessions").await;
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn joined_user_is_listed() {
        let state = AppState::new(&ChatConfig::default());
        let (tx, _rx) = mailbox(4);
        let id = state.chat_service.open(tx);
        let joined = state
            .chat_service
            .dispatch(id, "/app/chat.addUser", ChatMessage::join("erin"));
        assert!(joined.is_ok());

        let response = fetch(app(state.clone()), "/users/erin/sessions").await;
        assert_eq!(response.status(), StatusCode::OK);

        let response = fetch(app(state), "/sessions").await;
        assert_eq!(response.status(), StatusCode::OK);
    }
}
