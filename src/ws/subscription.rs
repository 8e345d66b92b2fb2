//! Per-connection subscription bookkeeping.
//!
//! Tracks which subscription ids a WebSocket client has opened and which
//! destination each one points at, so deliveries can be tagged with the
//! ids they matched.

use std::collections::HashMap;

use crate::domain::Destination;

/// Subscription id -> destination map for a single connection.
#[derive(Debug, Default)]
pub struct SubscriptionManager {
    by_id: HashMap<String, Destination>,
}

impl SubscriptionManager {
    /// Creates a new empty subscription manager.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a subscription, returning the destination previously held
    /// under the same id, if any.
    pub fn subscribe(&mut self, id: &str, destination: Destination) -> Option<Destination> {
        self.by_id.insert(id.to_string(), destination)
    }

    /// Forgets a subscription, returning its destination.
    pub fn unsubscribe(&mut self, id: &str) -> Option<Destination> {
        self.by_id.remove(id)
    }

    /// Returns the subscription ids pointing at `destination`, sorted.
    #[must_use]
    pub fn ids_for(&self, destination: &Destination) -> Vec<&str> {
        let mut ids: Vec<&str> = self
            .by_id
            .iter()
            .filter(|(_, d)| *d == destination)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Returns the number of open subscriptions.
    #[must_use]
    pub fn count(&self) -> usize {
        self.by_id.len()
    }
}
