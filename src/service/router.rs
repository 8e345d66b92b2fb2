//! Inbound destination routing.
//!
//! [`DestinationRouter`] is an explicit `destination -> handler` table built
//! once at startup. Every inbound `send` frame is dispatched through it.

use std::collections::HashMap;

use super::ChatService;
use crate::domain::{ChatMessage, ConnectionId};
use crate::error::ChatError;

/// Inbound destination that binds a username and broadcasts JOIN.
pub const ADD_USER: &str = "/app/chat.addUser";
/// Inbound destination that broadcasts a message on the shared topic.
pub const SEND_MESSAGE: &str = "/app/chat.sendMessage";
/// Inbound destination that delivers a message to one user's private queue.
pub const SEND_PRIVATE: &str = "/app/chat.sendPrivate";

/// Handler signature: returns the number of connections reached.
pub type Handler = fn(&ChatService, ConnectionId, ChatMessage) -> Result<usize, ChatError>;

/// Maps inbound destinations to exactly one handler each.
#[derive(Debug, Clone, Default)]
pub struct DestinationRouter {
    routes: HashMap<String, Handler>,
}

impl DestinationRouter {
    /// Creates an empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds the router with the chat destinations registered.
    #[must_use]
    pub fn chat() -> Self {
        Self::new()
            .route(ADD_USER, ChatService::add_user)
            .route(SEND_MESSAGE, ChatService::send_message)
            .route(SEND_PRIVATE, ChatService::send_private)
    }

    /// Registers `handler` for `destination`, replacing any earlier one.
    #[must_use]
    pub fn route(mut self, destination: &str, handler: Handler) -> Self {
        if self.routes.insert(destination.to_string(), handler).is_some() {
            tracing::warn!(destination, "replacing existing route");
        }
        self
    }

    /// Looks up the handler for `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::UnknownDestination`] if nothing is registered.
    pub fn resolve(&self, destination: &str) -> Result<Handler, ChatError> {
        self.routes
            .get(destination)
            .copied()
            .ok_or_else(|| ChatError::UnknownDestination(destination.to_string()))
    }

    /// Returns the registered destinations, sorted.
    #[must_use]
    pub fn destinations(&self) -> Vec<&str> {
        let mut list: Vec<&str> = self.routes.keys().map(String::as_str).collect();
        list.sort_unstable();
        list
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chat_router_has_one_handler_per_destination() {
        let router = DestinationRouter::chat();
        assert_eq!(
            router.destinations(),
            vec![ADD_USER, SEND_MESSAGE, SEND_PRIVATE]
        );
    }

    #[test]
    fn unknown_destination_is_an_error() {
        let router = DestinationRouter::chat();
        assert!(matches!(
            router.resolve("/app/chat.nope"),
            Err(ChatError::UnknownDestination(_))
        ));
        tokio_test::assert_ok!(router.resolve(SEND_MESSAGE));
        tokio_test::assert_err!(router.resolve("/topic/public"));
    }

    #[test]
    fn later_route_replaces_earlier() {
        fn noop(_: &ChatService, _: ConnectionId, _: ChatMessage) -> Result<usize, ChatError> {
            Ok(0)
        }
        let router = DestinationRouter::chat().route(SEND_MESSAGE, noop);
        assert_eq!(router.destinations().len(), 3);
    }
}
