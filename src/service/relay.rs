//! Topic fan-out and private per-user delivery.
//!
//! [`Relay`] is built once at startup and shared through
//! [`crate::app_state::AppState`]. It owns no subscription state of its
//! own: it looks subscribers up in the [`SubscriptionTable`] and mailboxes
//! up in the [`SessionRegistry`], then hands each connection a
//! [`Delivery`] with a non-blocking `try_send`.

use std::sync::Arc;

use tokio::sync::mpsc::error::TrySendError;

use crate::domain::{
    ChatMessage, ConnectionId, Delivery, Destination, Mailbox, SessionRegistry, SubscriptionTable,
};
use crate::error::ChatError;

/// Best-effort message relay.
///
/// Delivery is at most once per subscriber per call, with no ack, retry or
/// persistence. A subscriber whose mailbox is full or closed misses the
/// message; the remaining subscribers are unaffected.
#[derive(Debug, Clone)]
pub struct Relay {
    sessions: Arc<SessionRegistry>,
    subscriptions: Arc<SubscriptionTable>,
}

impl Relay {
    /// Creates a new `Relay` over the shared registries.
    #[must_use]
    pub fn new(sessions: Arc<SessionRegistry>, subscriptions: Arc<SubscriptionTable>) -> Self {
        Self {
            sessions,
            subscriptions,
        }
    }

    /// Returns the session registry.
    #[must_use]
    pub fn sessions(&self) -> &Arc<SessionRegistry> {
        &self.sessions
    }

    /// Returns the subscription table.
    #[must_use]
    pub fn subscriptions(&self) -> &Arc<SubscriptionTable> {
        &self.subscriptions
    }

    /// Delivers `message` to every connection subscribed to `destination`.
    ///
    /// Returns the number of connections that accepted the delivery.
    pub fn publish(&self, destination: &Destination, message: &ChatMessage) -> usize {
        let subscribers = self.subscriptions.subscribers(destination);
        let mut delivered = 0;
        for connection_id in subscribers {
            let Some(mailbox) = self.sessions.mailbox_of(connection_id) else {
                continue;
            };
            if deliver(connection_id, &mailbox, destination, message) {
                delivered += 1;
            }
        }
        tracing::debug!(
            destination = %destination,
            message_type = message.message_type.as_str(),
            delivered,
            "published"
        );
        delivered
    }

    /// Delivers `message` to every connection bound to `username` that has
    /// subscribed to the private destination `/user{subqueue}`.
    ///
    /// Returns the number of connections reached; `0` when nobody is bound
    /// to `username` or none of its sessions listens on the queue, which is
    /// not an error.
    ///
    /// # Errors
    ///
    /// Returns [`ChatError::InvalidDestination`] if `subqueue` is not a
    /// `/queue/...` path.
    pub fn send_to_user(
        &self,
        username: &str,
        subqueue: &str,
        message: &ChatMessage,
    ) -> Result<usize, ChatError> {
        let destination = Destination::user_queue(subqueue)?;
        let mut delivered = 0;
        for (connection_id, mailbox) in self.sessions.mailboxes_of(username) {
            if !self.subscriptions.is_subscribed(connection_id, &destination) {
                continue;
            }
            if deliver(connection_id, &mailbox, &destination, message) {
                delivered += 1;
            }
        }
        if delivered == 0 {
            tracing::debug!(username, destination = %destination, "no session for private delivery");
        }
        Ok(delivered)
    }
}

/// Hands one delivery to a mailbox without waiting.
fn deliver(
    connection_id: ConnectionId,
    mailbox: &Mailbox,
    destination: &Destination,
    message: &ChatMessage,
) -> bool {
    let delivery = Delivery {
        destination: destination.clone(),
        message: message.clone(),
    };
    match mailbox.try_send(delivery) {
        Ok(()) => true,
        Err(TrySendError::Full(_)) => {
            tracing::warn!(connection_id = %connection_id, destination = %destination, "mailbox full, dropping message");
            false
        }
        Err(TrySendError::Closed(_)) => {
            tracing::debug!(connection_id = %connection_id, "mailbox closed");
            false
        }
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use crate::domain::{MailboxReceiver, mailbox};

    struct Fixture {
        relay: Relay,
        topic: Destination,
    }

    fn fixture() -> Fixture {
        let Ok(topic) = Destination::parse("/topic/public") else {
            panic!("valid destination");
        };
        Fixture {
            relay: Relay::new(
                Arc::new(SessionRegistry::new()),
                Arc::new(SubscriptionTable::new()),
            ),
            topic,
        }
    }

    fn private_queue() -> Destination {
        let Ok(queue) = Destination::user_queue("/queue/messages") else {
            panic!("valid queue");
        };
        queue
    }

    fn connect(relay: &Relay, capacity: usize) -> (ConnectionId, MailboxReceiver) {
        let id = ConnectionId::new();
        let (tx, rx) = mailbox(capacity);
        relay.sessions().register(id, tx);
        (id, rx)
    }

    #[test]
    fn publish_reaches_subscribers_only() {
        let f = fixture();
        let (a, mut rx_a) = connect(&f.relay, 8);
        let (b, mut rx_b) = connect(&f.relay, 8);
        let (_c, mut rx_c) = connect(&f.relay, 8);
        f.relay.subscriptions().subscribe(a, &f.topic);
        f.relay.subscriptions().subscribe(b, &f.topic);

        let msg = ChatMessage::chat("B", "hi");
        assert_eq!(f.relay.publish(&f.topic, &msg), 2);

        for rx in [&mut rx_a, &mut rx_b] {
            let Ok(delivery) = rx.try_recv() else {
                panic!("subscriber should receive");
            };
            assert_eq!(delivery.message, msg);
            assert_eq!(delivery.destination, f.topic);
        }
        assert!(rx_c.try_recv().is_err());
    }

    #[test]
    fn publish_without_subscribers_is_zero() {
        let f = fixture();
        assert_eq!(f.relay.publish(&f.topic, &ChatMessage::join("x")), 0);
    }

    #[test]
    fn full_mailbox_does_not_block_others() {
        let f = fixture();
        let (slow, _rx_slow) = connect(&f.relay, 1);
        let (fast, mut rx_fast) = connect(&f.relay, 8);
        f.relay.subscriptions().subscribe(slow, &f.topic);
        f.relay.subscriptions().subscribe(fast, &f.topic);

        assert_eq!(f.relay.publish(&f.topic, &ChatMessage::chat("a", "1")), 2);
        assert_eq!(f.relay.publish(&f.topic, &ChatMessage::chat("a", "2")), 1);

        let mut received = 0;
        while rx_fast.try_recv().is_ok() {
            received += 1;
        }
        assert_eq!(received, 2);
    }

    #[test]
    fn closed_mailbox_is_skipped() {
        let f = fixture();
        let (gone, rx_gone) = connect(&f.relay, 4);
        let (live, mut rx_live) = connect(&f.relay, 4);
        f.relay.subscriptions().subscribe(gone, &f.topic);
        f.relay.subscriptions().subscribe(live, &f.topic);
        drop(rx_gone);

        assert_eq!(f.relay.publish(&f.topic, &ChatMessage::join("z")), 1);
        assert!(rx_live.try_recv().is_ok());
    }

    #[test]
    fn send_to_user_reaches_every_bound_session() {
        let f = fixture();
        let (b1, mut rx_b1) = connect(&f.relay, 4);
        let (b2, mut rx_b2) = connect(&f.relay, 4);
        let (alice, mut rx_alice) = connect(&f.relay, 4);
        let _ = f.relay.sessions().bind(b1, "bob");
        let _ = f.relay.sessions().bind(b2, "bob");
        let _ = f.relay.sessions().bind(alice, "alice");
        let queue = private_queue();
        for id in [b1, b2, alice] {
            f.relay.subscriptions().subscribe(id, &queue);
        }

        let msg = ChatMessage::chat("alice", "psst").with_recipient("bob");
        let Ok(count) = f.relay.send_to_user("bob", "/queue/messages", &msg) else {
            panic!("valid subqueue");
        };
        assert_eq!(count, 2);

        for rx in [&mut rx_b1, &mut rx_b2] {
            let Ok(delivery) = rx.try_recv() else {
                panic!("bob session should receive");
            };
            assert_eq!(delivery.destination.as_str(), "/user/queue/messages");
            assert_eq!(delivery.message, msg);
        }
        assert!(rx_alice.try_recv().is_err());
    }

    #[test]
    fn send_to_user_skips_sessions_without_queue_subscription() {
        let f = fixture();
        let (listening, mut rx_listening) = connect(&f.relay, 4);
        let (deaf, mut rx_deaf) = connect(&f.relay, 4);
        let _ = f.relay.sessions().bind(listening, "bob");
        let _ = f.relay.sessions().bind(deaf, "bob");
        f.relay.subscriptions().subscribe(listening, &private_queue());
        f.relay.subscriptions().subscribe(deaf, &f.topic);

        let msg = ChatMessage::chat("alice", "psst").with_recipient("bob");
        assert!(matches!(
            f.relay.send_to_user("bob", "/queue/messages", &msg),
            Ok(1)
        ));
        assert!(rx_listening.try_recv().is_ok());
        assert!(rx_deaf.try_recv().is_err());
    }

    #[test]
    fn send_to_unknown_user_is_silent() {
        let f = fixture();
        let msg = ChatMessage::chat("alice", "anyone?");
        assert!(matches!(
            f.relay.send_to_user("bob", "/queue/messages", &msg),
            Ok(0)
        ));
    }

    #[test]
    fn send_to_user_rejects_bad_subqueue() {
        let f = fixture();
        let msg = ChatMessage::chat("alice", "x");
        assert!(f.relay.send_to_user("bob", "/topic/public", &msg).is_err());
    }
}
