//! Shared application state injected into all Axum handlers.

use std::sync::Arc;

use crate::config::ChatConfig;
use crate::domain::{SessionRegistry, SubscriptionTable};
use crate::service::{ChatService, LifecycleNotifier, Relay};

/// Shared application state available to all handlers via Axum's
/// `State` extractor.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Chat service owning the relay, router and lifecycle notifier.
    pub chat_service: Arc<ChatService>,
    /// Capacity of each new connection's outbound mailbox.
    pub mailbox_capacity: usize,
}

impl AppState {
    /// Builds the domain and service layers from configuration.
    #[must_use]
    pub fn new(config: &ChatConfig) -> Self {
        let sessions = Arc::new(SessionRegistry::new());
        let subscriptions = Arc::new(SubscriptionTable::new());
        let relay = Relay::new(sessions, subscriptions);
        let notifier = LifecycleNotifier::new(relay.clone(), config.shared_topic.clone());

        let chat_service = Arc::new(ChatService::new(
            relay,
            notifier,
            config.private_queue.clone(),
        ));

        Self {
            chat_service,
            mailbox_capacity: config.mailbox_capacity,
        }
    }
}
