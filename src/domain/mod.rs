//! Domain layer: chat payloads, destinations, and connection bookkeeping.
//!
//! This module holds the message model, the session registry binding
//! usernames to connections, the subscription table answering "who listens
//! on destination X", and the per-connection mailboxes deliveries go through.

pub mod chat_message;
pub mod connection_id;
pub mod delivery;
pub mod destination;
pub mod session_registry;
pub mod subscription_table;

pub use chat_message::{ChatMessage, MessageType};
pub use connection_id::ConnectionId;
pub use delivery::{Delivery, Mailbox, MailboxReceiver, mailbox};
pub use destination::Destination;
pub use session_registry::{BindOutcome, SessionRecord, SessionRegistry, SessionState, SessionSummary};
pub use subscription_table::SubscriptionTable;
