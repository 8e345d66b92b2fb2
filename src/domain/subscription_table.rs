//! Destination -> subscriber lookup shared by all connections.
//!
//! Each WebSocket connection records its subscriptions here so the relay
//! can answer "who listens on destination X" at publish time. The table
//! stores ids only; mailboxes live in the [`super::SessionRegistry`].

use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ConnectionId, Destination};

/// Concurrent map of destinations to subscribed connections.
///
/// A connection subscribed to the same destination under several
/// subscription ids is counted once.
#[derive(Debug, Default)]
pub struct SubscriptionTable {
    inner: RwLock<HashMap<Destination, HashMap<ConnectionId, usize>>>,
}

impl SubscriptionTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Destination, HashMap<ConnectionId, usize>>> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Destination, HashMap<ConnectionId, usize>>> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds one subscription of `connection_id` to `destination`.
    pub fn subscribe(&self, connection_id: ConnectionId, destination: &Destination) {
        *self
            .write()
            .entry(destination.clone())
            .or_default()
            .entry(connection_id)
            .or_insert(0) += 1;
    }

    /// Removes one subscription of `connection_id` from `destination`.
    pub fn unsubscribe(&self, connection_id: ConnectionId, destination: &Destination) {
        let mut map = self.write();
        let Some(subscribers) = map.get_mut(destination) else {
            return;
        };
        if let Some(count) = subscribers.get_mut(&connection_id) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                subscribers.remove(&connection_id);
            }
        }
        if subscribers.is_empty() {
            map.remove(destination);
        }
    }

    /// Drops every subscription held by `connection_id`.
    pub fn remove_connection(&self, connection_id: ConnectionId) {
        let mut map = self.write();
        map.retain(|_, subscribers| {
            subscribers.remove(&connection_id);
            !subscribers.is_empty()
        });
    }

    /// Returns the connections currently subscribed to `destination`.
    #[must_use]
    pub fn subscribers(&self, destination: &Destination) -> Vec<ConnectionId> {
        self.read()
            .get(destination)
            .map(|subscribers| subscribers.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Returns `true` if `connection_id` listens on `destination`.
    #[must_use]
    pub fn is_subscribed(&self, connection_id: ConnectionId, destination: &Destination) -> bool {
        self.read()
            .get(destination)
            .is_some_and(|subscribers| subscribers.contains_key(&connection_id))
    }

    /// Distinct subscriber count per destination, sorted by destination.
    #[must_use]
    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.read()
            .iter()
            .map(|(destination, subscribers)| (destination.to_string(), subscribers.len()))
            .collect()
    }

    /// Number of distinct connections holding at least one subscription.
    #[must_use]
    pub fn connection_count(&self) -> usize {
        self.read()
            .values()
            .flat_map(HashMap::keys)
            .collect::<HashSet<_>>()
            .len()
    }
}
