// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Index of which users are watching which deliveries.
//!
//! Membership here is independent of connection state: a watcher with no
//! open connections simply receives nothing when a broadcast runs.

use std::collections::HashSet;
use std::sync::Arc;

use bazar_core::{wire::ServerMessage, BazarError};
use dashmap::DashMap;

use crate::registry::ConnectionRegistry;

/// Map of delivery id to the set of watching user ids.
#[derive(Clone, Default)]
pub struct DeliveryWatcherIndex {
    watchers: Arc<DashMap<String, HashSet<String>>>,
}

impl DeliveryWatcherIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a watcher, creating the delivery's set if absent.
    pub fn add_watcher(&self, delivery_id: &str, user_id: &str) {
        self.watchers
            .entry(delivery_id.to_string())
            .or_default()
            .insert(user_id.to_string());
    }

    /// Remove one watcher from one delivery. Drops the delivery's entry
    /// when its set empties, so the index cannot grow unbounded.
    pub fn remove_watcher(&self, delivery_id: &str, user_id: &str) {
        if let Some(mut entry) = self.watchers.get_mut(delivery_id) {
            entry.remove(user_id);
        }
        // Emptiness is re-checked under the entry lock, so an add_watcher
        // that lands between the remove and here keeps its entry.
        self.watchers.remove_if(delivery_id, |_, set| set.is_empty());
    }

    /// Remove a user from every delivery's watcher set. Called when the
    /// user's last connection closes.
    pub fn remove_user(&self, user_id: &str) {
        self.watchers.retain(|_, set| {
            set.remove(user_id);
            !set.is_empty()
        });
    }

    /// The (possibly empty) set of watchers for a delivery.
    pub fn watchers(&self, delivery_id: &str) -> HashSet<String> {
        self.watchers
            .get(delivery_id)
            .map(|e| e.clone())
            .unwrap_or_default()
    }

    /// Fan a message out to every watcher's connections. Returns the
    /// number of connections that accepted it.
    pub fn broadcast_to_watchers(
        &self,
        delivery_id: &str,
        message: &ServerMessage,
        registry: &ConnectionRegistry,
    ) -> Result<usize, BazarError> {
        let mut delivered = 0;
        for user_id in self.watchers(delivery_id) {
            delivered += registry.send_to_user(&user_id, message)?;
        }
        Ok(delivered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::ConnectionHandle;
    use tokio::sync::mpsc;

    #[test]
    fn add_and_get_watchers() {
        let index = DeliveryWatcherIndex::new();
        index.add_watcher("d-1", "u-1");
        index.add_watcher("d-1", "u-2");
        index.add_watcher("d-1", "u-1");

        let watchers = index.watchers("d-1");
        assert_eq!(watchers.len(), 2);
        assert!(watchers.contains("u-1"));
        assert!(index.watchers("d-unknown").is_empty());
    }

    #[test]
    fn remove_watcher_drops_empty_entries() {
        let index = DeliveryWatcherIndex::new();
        index.add_watcher("d-1", "u-1");
        index.remove_watcher("d-1", "u-1");
        assert!(index.watchers("d-1").is_empty());
        // Removing from a delivery that was never watched is fine.
        index.remove_watcher("d-ghost", "u-1");
    }

    #[test]
    fn remove_user_clears_all_deliveries() {
        let index = DeliveryWatcherIndex::new();
        index.add_watcher("d-1", "u-1");
        index.add_watcher("d-2", "u-1");
        index.add_watcher("d-2", "u-2");

        index.remove_user("u-1");
        assert!(index.watchers("d-1").is_empty());
        assert_eq!(index.watchers("d-2"), HashSet::from(["u-2".to_string()]));
    }

    #[test]
    fn add_watcher_racing_a_removal_is_never_lost() {
        for _ in 0..64 {
            let index = DeliveryWatcherIndex::new();
            index.add_watcher("d-1", "u-1");

            let a = index.clone();
            let b = index.clone();
            let t1 = std::thread::spawn(move || a.remove_watcher("d-1", "u-1"));
            let t2 = std::thread::spawn(move || b.add_watcher("d-1", "u-2"));
            t1.join().unwrap();
            t2.join().unwrap();

            assert_eq!(index.watchers("d-1"), HashSet::from(["u-2".to_string()]));
        }
    }

    #[tokio::test]
    async fn broadcast_skips_watchers_without_connections() {
        let registry = ConnectionRegistry::new();
        let (tx, mut rx) = mpsc::channel(8);
        registry.register(
            "u-online",
            ConnectionHandle {
                id: "c-1".to_string(),
                sender: tx,
            },
        );

        let index = DeliveryWatcherIndex::new();
        index.add_watcher("d-1", "u-online");
        index.add_watcher("d-1", "u-offline");

        let delivered = index
            .broadcast_to_watchers("d-1", &ServerMessage::Pong, &registry)
            .unwrap();
        assert_eq!(delivered, 1);
        assert!(rx.recv().await.is_some());
    }
}
