//! WebSocket layer: connection handling, frame codec, subscriptions.
//!
//! The WebSocket endpoint at `/ws` carries subscribe, unsubscribe, send and
//! disconnect frames from clients, and message, receipt and error frames
//! back to them.

pub mod connection;
pub mod handler;
pub mod messages;
pub mod subscription;
