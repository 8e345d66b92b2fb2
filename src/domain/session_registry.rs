//! Registry of live connections and the usernames bound to them.
//!
//! [`SessionRegistry`] replaces a session-scoped attribute bag: each
//! connection owns one [`SessionRecord`] keyed by its [`ConnectionId`],
//! holding the optional username and the mailbox used to reach it.

use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use utoipa::ToSchema;

use super::{ConnectionId, Mailbox};

/// Lifecycle of a single connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Socket is open, no JOIN seen yet.
    Connected,
    /// A username has been bound by a JOIN.
    Active,
    /// Disconnect observed; the record has left the registry.
    Terminated,
}

/// Per-connection record.
#[derive(Debug, Clone)]
pub struct SessionRecord {
    /// Connection identifier.
    pub connection_id: ConnectionId,
    /// Username bound by the first JOIN, if any.
    pub username: Option<String>,
    /// Current lifecycle state.
    pub state: SessionState,
    /// When the socket was upgraded.
    pub connected_at: DateTime<Utc>,
    mailbox: Mailbox,
}

impl SessionRecord {
    /// Returns the connection's outbound mailbox.
    #[must_use]
    pub fn mailbox(&self) -> &Mailbox {
        &self.mailbox
    }
}

/// Read-only view of a session used by listings.
#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SessionSummary {
    /// Connection identifier.
    pub connection_id: ConnectionId,
    /// Bound username.
    pub username: Option<String>,
    /// Lifecycle state.
    pub state: SessionState,
    /// Connect timestamp.
    pub connected_at: DateTime<Utc>,
}

impl From<&SessionRecord> for SessionSummary {
    fn from(record: &SessionRecord) -> Self {
        Self {
            connection_id: record.connection_id,
            username: record.username.clone(),
            state: record.state,
            connected_at: record.connected_at,
        }
    }
}

/// Result of a [`SessionRegistry::bind`] call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BindOutcome {
    /// The username is now bound to the connection.
    Bound,
    /// The connection already carries a username; it was left unchanged.
    AlreadyBound {
        /// The username that stays bound.
        existing: String,
    },
    /// No such connection is registered.
    UnknownConnection,
}

/// Connection id -> session record map.
///
/// # Concurrency
///
/// All operations take a short `std::sync::RwLock` critical section and
/// never hold it across an `.await`. A poisoned lock is recovered, since
/// every mutation leaves the map consistent.
#[derive(Debug, Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<ConnectionId, SessionRecord>>,
}

impl SessionRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ConnectionId, SessionRecord>> {
        self.sessions.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ConnectionId, SessionRecord>> {
        self.sessions.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Creates the record for a freshly opened connection.
    pub fn register(&self, connection_id: ConnectionId, mailbox: Mailbox) {
        let record = SessionRecord {
            connection_id,
            username: None,
            state: SessionState::Connected,
            connected_at: Utc::now(),
            mailbox,
        };
        self.write().insert(connection_id, record);
    }

    /// Binds `username` to the connection.
    ///
    /// The first bind wins: a later bind on the same connection does not
    /// replace the name. Several connections may bind the same username.
    pub fn bind(&self, connection_id: ConnectionId, username: &str) -> BindOutcome {
        let mut map = self.write();
        let Some(record) = map.get_mut(&connection_id) else {
            return BindOutcome::UnknownConnection;
        };
        if let Some(existing) = &record.username {
            return BindOutcome::AlreadyBound {
                existing: existing.clone(),
            };
        }
        record.username = Some(username.to_string());
        record.state = SessionState::Active;
        BindOutcome::Bound
    }

    /// Returns the username bound to the connection, if any.
    #[must_use]
    pub fn username_of(&self, connection_id: ConnectionId) -> Option<String> {
        self.read()
            .get(&connection_id)
            .and_then(|record| record.username.clone())
    }

    /// Removes the connection, returning its final record marked
    /// [`SessionState::Terminated`].
    pub fn unbind(&self, connection_id: ConnectionId) -> Option<SessionRecord> {
        let mut record = self.write().remove(&connection_id)?;
        record.state = SessionState::Terminated;
        Some(record)
    }

    /// Returns the mailbox of a live connection.
    #[must_use]
    pub fn mailbox_of(&self, connection_id: ConnectionId) -> Option<Mailbox> {
        self.read()
            .get(&connection_id)
            .map(|record| record.mailbox.clone())
    }

    /// Returns `(connection, mailbox)` for every connection bound to
    /// `username`.
    #[must_use]
    pub fn mailboxes_of(&self, username: &str) -> Vec<(ConnectionId, Mailbox)> {
        self.read()
            .values()
            .filter(|record| record.username.as_deref() == Some(username))
            .map(|record| (record.connection_id, record.mailbox.clone()))
            .collect()
    }

    /// Returns the ids of every connection bound to `username`.
    #[must_use]
    pub fn connections_of(&self, username: &str) -> Vec<ConnectionId> {
        self.read()
            .values()
            .filter(|record| record.username.as_deref() == Some(username))
            .map(|record| record.connection_id)
            .collect()
    }

    /// Returns summaries of all live sessions, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<SessionSummary> {
        let mut list: Vec<SessionSummary> = self.read().values().map(SessionSummary::from).collect();
        list.sort_by_key(|s| s.connected_at);
        list
    }

    /// Number of live connections.
    #[must_use]
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Returns `true` if no connection is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Number of connections that have bound a username.
    #[must_use]
    pub fn joined_count(&self) -> usize {
        self.read()
            .values()
            .filter(|record| record.username.is_some())
            .count()
    }
}
