//! Emits LEAVE events for departed users.
//!
//! [`LifecycleNotifier`] is invoked by [`super::ChatService::close`] with the
//! session record removed from the registry. For a connection that had
//! bound a username it broadcasts
//! `ChatMessage { messageType: LEAVE, sender: username }` on the shared
//! topic. Connections that never sent JOIN leave silently.
//!
//! The call is synchronous and made exactly once per removed record, so no
//! disconnect can be lost between the socket task and the broadcast.

use super::Relay;
use crate::domain::{ChatMessage, Destination, SessionRecord};

/// Observer turning disconnects into LEAVE broadcasts.
#[derive(Debug, Clone)]
pub struct LifecycleNotifier {
    relay: Relay,
    shared_topic: Destination,
}

impl LifecycleNotifier {
    /// Creates a notifier publishing on `shared_topic`.
    #[must_use]
    pub fn new(relay: Relay, shared_topic: Destination) -> Self {
        Self {
            relay,
            shared_topic,
        }
    }

    /// Returns the topic LEAVE events are published on.
    #[must_use]
    pub fn shared_topic(&self) -> &Destination {
        &self.shared_topic
    }

    /// Reacts to a session that has just been removed from the registry.
    ///
    /// Returns the LEAVE message that was broadcast, if any.
    pub fn on_disconnect(&self, record: &SessionRecord) -> Option<ChatMessage> {
        let username = record.username.as_deref()?;

        tracing::info!(connection_id = %record.connection_id, username, "user disconnected");
        let leave = ChatMessage::leave(username);
        let _ = self.relay.publish(&self.shared_topic, &leave);
        Some(leave)
    }
}
