//! Service layer: relay, inbound routing, and lifecycle handling.

pub mod chat_service;
pub mod lifecycle;
pub mod relay;
pub mod router;

pub use chat_service::ChatService;
pub use lifecycle::LifecycleNotifier;
pub use relay::Relay;
pub use router::DestinationRouter;
