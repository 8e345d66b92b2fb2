//! Session listing and statistics payloads.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::domain::SessionSummary;

/// Response body of the session listing endpoints.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionListResponse {
    /// Sessions, oldest first.
    pub sessions: Vec<SessionSummary>,
    /// Number of sessions returned.
    pub total: usize,
}

impl SessionListResponse {
    /// Wraps a list of sessions.
    #[must_use]
    pub fn new(sessions: Vec<SessionSummary>) -> Self {
        let total = sessions.len();
        Self { sessions, total }
    }
}

/// Response body of `GET /api/v1/stats`.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct StatsResponse {
    /// Open WebSocket sessions.
    pub sessions: usize,
    /// Sessions that have bound a username.
    pub joined: usize,
    /// Sessions holding at least one subscription.
    pub subscribed_connections: usize,
    /// Distinct subscriber count per destination.
    pub subscribers: BTreeMap<String, usize>,
    /// Inbound destinations with a registered handler.
    pub inbound_destinations: Vec<String>,
    /// Destination JOIN, CHAT and LEAVE events are broadcast on.
    pub shared_topic: String,
}
