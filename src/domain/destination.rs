//! Logical destinations used for routing.
//!
//! Destinations are plain path strings. Three prefixes carry meaning:
//!
//! | Prefix    | Role                                                  |
//! |-----------|-------------------------------------------------------|
//! | `/app`    | inbound, dispatched to a handler by the router        |
//! | `/topic`  | outbound shared topic, fanned out to all subscribers  |
//! | `/user`   | outbound private queue, resolved per bound username   |

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ChatError;

/// Prefix of inbound application destinations.
pub const APP_PREFIX: &str = "/app";
/// Prefix of shared broadcast destinations.
pub const TOPIC_PREFIX: &str = "/topic";
/// Prefix of per-user private destinations.
pub const USER_PREFIX: &str = "/user";
/// Sub-path under [`USER_PREFIX`] that clients may subscribe to.
pub const QUEUE_PREFIX: &str = "/queue";

/// A validated destination path.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Destination(String);

impl Destination {
    /// Parses a destination path.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidDestination`] if the path is empty, does
    /// not start with `/`, or contains whitespace.
    pub fn parse(path: &str) -> Result<Self, ChatError> {
        if path.len() < 2 || !path.starts_with('/') || path.chars().any(char::is_whitespace) {
            return Err(ChatError::InvalidDestination(path.to_string()));
        }
        Ok(Self(path.to_string()))
    }

    /// Wraps a known-good literal path without validation.
    pub(crate) fn from_static(path: &'static str) -> Self {
        Self(path.to_string())
    }

    /// Builds the private destination for a user sub-queue, e.g.
    /// `/queue/messages` becomes `/user/queue/messages`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidDestination`] if `subqueue` is not a
    /// valid path under `/queue`.
    pub fn user_queue(subqueue: &str) -> Result<Self, ChatError> {
        if !is_under(subqueue, QUEUE_PREFIX) {
            return Err(ChatError::InvalidDestination(subqueue.to_string()));
        }
        Self::parse(&format!("{USER_PREFIX}{subqueue}"))
    }

    /// Returns the path as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` for inbound `/app/...` destinations.
    #[must_use]
    pub fn is_application(&self) -> bool {
        is_under(&self.0, APP_PREFIX)
    }

    /// Returns `true` for destinations a client may subscribe to: shared
    /// topics and its own private queues.
    #[must_use]
    pub fn is_subscribable(&self) -> bool {
        is_under(&self.0, TOPIC_PREFIX) || self.is_user_queue()
    }

    /// Returns `true` for `/user/queue/...` destinations.
    #[must_use]
    pub fn is_user_queue(&self) -> bool {
        self.0
            .strip_prefix(USER_PREFIX)
            .is_some_and(|rest| is_under(rest, QUEUE_PREFIX))
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// `true` if `path` is `prefix/<something>`.
fn is_under(path: &str, prefix: &str) -> bool {
    path.strip_prefix(prefix)
        .is_some_and(|rest| rest.len() > 1 && rest.starts_with('/'))
}
