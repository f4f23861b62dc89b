//! History table for all keys.

use super::KeyHistory;
use crate::types::{Event, Version};
use std::borrow::Borrow;
use std::collections::hash_map::{self, HashMap};
use std::hash::Hash;

/// Maps every key ever observed to its history.
#[derive(Clone, Debug)]
pub struct HistoryStore<K, V> {
    histories: HashMap<K, KeyHistory<V>>,
}

impl<K, V> Default for HistoryStore<K, V> {
    fn default() -> Self {
        Self {
            histories: HashMap::new(),
        }
    }
}

impl<K, V> HistoryStore<K, V> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of keys ever observed, live or not.
    pub fn key_count(&self) -> usize {
        self.histories.len()
    }

    /// Total number of recorded events across all keys.
    pub fn event_count(&self) -> usize {
        self.histories.values().map(KeyHistory::len).sum()
    }

    pub fn iter(&self) -> hash_map::Iter<'_, K, KeyHistory<V>> {
        self.histories.iter()
    }

    /// Append a tombstone at `version` to every known key.
    ///
    /// Returns how many of those keys were live before the call.
    pub(crate) fn tombstone_all(&mut self, version: Version) -> usize {
        let mut was_live = 0;
        for history in self.histories.values_mut() {
            if history.is_live() {
                was_live += 1;
            }
            history.append(Event::tombstone(version));
        }
        was_live
    }
}

impl<K: Eq + Hash, V> HistoryStore<K, V> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            histories: HashMap::with_capacity(capacity),
        }
    }

    pub fn get<Q>(&self, key: &Q) -> Option<&KeyHistory<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.histories.get(key)
    }

    pub(crate) fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut KeyHistory<V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.histories.get_mut(key)
    }

    /// Whether `key` is live at the newest recorded event.
    pub fn is_live<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.get(key).is_some_and(KeyHistory::is_live)
    }

    /// Append `event` to the history of `key`, creating it on first use.
    pub(crate) fn record(&mut self, key: K, event: Event<V>) {
        self.histories.entry(key).or_default().append(event);
    }
}
