//! Chat service: connection lifecycle and inbound message handlers.

use super::{DestinationRouter, LifecycleNotifier, Relay};
use crate::domain::{
    BindOutcome, ChatMessage, ConnectionId, Destination, Mailbox, MessageType, SessionRecord,
};
use crate::error::ChatError;

/// Coordinates the relay, the session registry and the lifecycle notifier
/// on behalf of WebSocket connections.
///
/// Every inbound handler follows the same pattern: validate -> update the
/// session (JOIN only) -> relay -> return the number of connections
/// reached.
#[derive(Debug, Clone)]
pub struct ChatService {
    relay: Relay,
    notifier: LifecycleNotifier,
    router: DestinationRouter,
    private_queue: String,
}

impl ChatService {
    /// Creates a new `ChatService` with the standard chat routes.
    ///
    /// JOIN, CHAT and LEAVE are all published on the notifier's shared
    /// topic.
    #[must_use]
    pub fn new(relay: Relay, notifier: LifecycleNotifier, private_queue: String) -> Self {
        Self {
            relay,
            notifier,
            router: DestinationRouter::chat(),
            private_queue,
        }
    }

    /// Returns the inner [`Relay`].
    #[must_use]
    pub fn relay(&self) -> &Relay {
        &self.relay
    }

    /// Returns the [`LifecycleNotifier`] fed by [`Self::close`].
    #[must_use]
    pub fn notifier(&self) -> &LifecycleNotifier {
        &self.notifier
    }

    /// Returns the inbound router.
    #[must_use]
    pub fn router(&self) -> &DestinationRouter {
        &self.router
    }

    /// Returns the shared topic destination.
    #[must_use]
    pub fn shared_topic(&self) -> &Destination {
        self.notifier.shared_topic()
    }

    /// Registers a newly upgraded connection.
    pub fn open(&self, mailbox: Mailbox) -> ConnectionId {
        let connection_id = ConnectionId::new();
        self.relay.sessions().register(connection_id, mailbox);
        tracing::debug!(connection_id = %connection_id, "connection opened");
        connection_id
    }

    /// Tears down a connection: drops its subscriptions, removes the
    /// session, and hands the record to the [`LifecycleNotifier`], which
    /// broadcasts a LEAVE if a username was bound.
    ///
    /// Returns the final session record, or `None` if the connection was
    /// already closed. Only the call that removes the record notifies, so
    /// each joined session yields exactly one LEAVE.
    pub fn close(&self, connection_id: ConnectionId) -> Option<SessionRecord> {
        self.relay.subscriptions().remove_connection(connection_id);
        let record = self.relay.sessions().unbind(connection_id)?;
        let _ = self.notifier.on_disconnect(&record);
        tracing::debug!(connection_id = %connection_id, "connection closed");
        Some(record)
    }

    /// Subscribes a connection to a topic or to its private queue.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidDestination`] for destinations clients
    /// may not subscribe to (e.g. `/app/...`).
    pub fn subscribe(
        &self,
        connection_id: ConnectionId,
        destination: &Destination,
    ) -> Result<(), ChatError> {
        if !destination.is_subscribable() {
            return Err(ChatError::InvalidDestination(destination.to_string()));
        }
        self.relay.subscriptions().subscribe(connection_id, destination);
        tracing::debug!(connection_id = %connection_id, destination = %destination, "subscribed");
        Ok(())
    }

    /// Removes one subscription of a connection.
    pub fn unsubscribe(&self, connection_id: ConnectionId, destination: &Destination) {
        self.relay
            .subscriptions()
            .unsubscribe(connection_id, destination);
    }

    /// Routes an inbound message to the handler registered for
    /// `destination`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidDestination`] for anything outside
    /// `/app/...`, [`ChatError::UnknownDestination`] when no handler
    /// matches, or whatever the handler returns.
    pub fn dispatch(
        &self,
        connection_id: ConnectionId,
        destination: &str,
        message: ChatMessage,
    ) -> Result<usize, ChatError> {
        if !Destination::parse(destination)?.is_application() {
            return Err(ChatError::InvalidDestination(destination.to_string()));
        }
        let handler = self.router.resolve(destination)?;
        handler(self, connection_id, message)
    }

    /// `/app/chat.addUser`: binds the sender's name to the connection and
    /// broadcasts the JOIN on the shared topic.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidMessage`] if the message is not a JOIN,
    /// has no sender, or the connection already joined under another name.
    pub fn add_user(
        &self,
        connection_id: ConnectionId,
        message: ChatMessage,
    ) -> Result<usize, ChatError> {
        message.validate()?;
        if message.message_type != MessageType::Join {
            return Err(ChatError::InvalidMessage(format!(
                "expected JOIN, got {}",
                message.message_type.as_str()
            )));
        }

        match self.relay.sessions().bind(connection_id, &message.sender) {
            BindOutcome::Bound => {
                tracing::info!(connection_id = %connection_id, username = %message.sender, "user joined");
            }
            BindOutcome::AlreadyBound { existing } if existing == message.sender => {}
            BindOutcome::AlreadyBound { existing } => {
                return Err(ChatError::InvalidMessage(format!(
                    "connection already joined as {existing}"
                )));
            }
            BindOutcome::UnknownConnection => {
                return Err(ChatError::Internal(format!(
                    "connection {connection_id} is not registered"
                )));
            }
        }

        Ok(self.relay.publish(self.shared_topic(), &message))
    }

    /// `/app/chat.sendMessage`: broadcasts the message verbatim on the
    /// shared topic.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidMessage`] if the sender is empty.
    pub fn send_message(
        &self,
        _connection_id: ConnectionId,
        message: ChatMessage,
    ) -> Result<usize, ChatError> {
        message.validate()?;
        Ok(self.relay.publish(self.shared_topic(), &message))
    }

    /// `/app/chat.sendPrivate`: delivers the message to every session of
    /// `recipient` and echoes a copy to the sender's own sessions.
    ///
    /// Returns the number of recipient sessions reached. Only sessions
    /// subscribed to the private queue count, so an offline or
    /// non-listening recipient yields `0`.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidMessage`] if the sender is empty or no
    /// recipient is given.
    pub fn send_private(
        &self,
        _connection_id: ConnectionId,
        message: ChatMessage,
    ) -> Result<usize, ChatError> {
        message.validate()?;
        let recipient = message
            .recipient
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| ChatError::InvalidMessage("recipient is required".to_string()))?;

        let delivered = self
            .relay
            .send_to_user(recipient, &self.private_queue, &message)?;
        if recipient != message.sender {
            let _ = self
                .relay
                .send_to_user(&message.sender, &self.private_queue, &message)?;
        }
        Ok(delivered)
    }
}
