//! # chat-relay
//!
//! WebSocket chat relay with a shared broadcast topic, private per-user
//! queues, and join/leave lifecycle events.
//!
//! Clients connect to `/ws`, subscribe to `/topic/public` (and optionally
//! `/user/queue/messages`), send a JOIN to `/app/chat.addUser`, then chat
//! through `/app/chat.sendMessage`. When a joined client goes away, every
//! subscriber of the shared topic receives a LEAVE for it.
//!
//! [`client::ChatClient`] speaks the same frames from the other side and
//! backs the `chat_client` binary.
//!
//! ## Architecture
//!
//! ```text
//! Clients (WebSocket, HTTP)
//!     │
//!     ├── WS Handler (ws/)          REST Handlers (api/)
//!     │
//!     ├── ChatService + DestinationRouter (service/)
//!     ├── Relay: publish / send_to_user (service/)
//!     ├── LifecycleNotifier ◄── ChatService::close (service/)
//!     │
//!     └── SessionRegistry + SubscriptionTable (domain/)
//! ```

pub mod api;
pub mod app_state;
pub mod client;
pub mod config;
pub mod domain;
pub mod error;
pub mod server;
pub mod service;
pub mod ws;
