//! Unit of work handed from the relay to a connection's writer task.

use tokio::sync::mpsc;

use super::{ChatMessage, Destination};

/// A message addressed to one connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Delivery {
    /// Outbound destination the message was published on.
    pub destination: Destination,
    /// Payload.
    pub message: ChatMessage,
}

/// Sending half of a connection's bounded outbound queue.
pub type Mailbox = mpsc::Sender<Delivery>;

/// Receiving half of a connection's bounded outbound queue.
pub type MailboxReceiver = mpsc::Receiver<Delivery>;

/// Creates a mailbox pair with the given capacity (minimum 1).
#[must_use]
pub fn mailbox(capacity: usize) -> (Mailbox, MailboxReceiver) {
    mpsc::channel(capacity.max(1))
}
