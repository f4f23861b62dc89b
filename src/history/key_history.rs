//! Event list for a single key.

use crate::types::{Event, Version};

/// Append-only, version-ordered events for one key.
///
/// Versions are strictly ascending, which lets point-in-time lookups binary
/// search instead of scanning.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyHistory<V> {
    events: Vec<Event<V>>,
}

impl<V> Default for KeyHistory<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V> KeyHistory<V> {
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Append an event. Its version must be greater than every recorded one.
    pub(crate) fn append(&mut self, event: Event<V>) {
        debug_assert!(
            self.events
                .last()
                .map_or(true, |last| last.version < event.version),
            "history append out of order: {:?} after {:?}",
            event.version,
            self.events.last().map(|last| last.version),
        );
        self.events.push(event);
    }

    /// All events, oldest first.
    pub fn events(&self) -> &[Event<V>] {
        &self.events
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Most recent event.
    pub fn latest(&self) -> Option<&Event<V>> {
        self.events.last()
    }

    /// The event in effect at `version`: the one with the greatest version
    /// not exceeding it.
    pub fn at(&self, version: Version) -> Option<&Event<V>> {
        let end = self.events.partition_point(|event| event.version <= version);
        end.checked_sub(1).map(|idx| &self.events[idx])
    }

    /// Value at `version`, or `None` if the key was absent or tombstoned.
    pub fn value_at(&self, version: Version) -> Option<&V> {
        self.at(version).and_then(|event| event.payload.as_value())
    }

    /// Current value, or `None` if the key is tombstoned.
    pub fn latest_value(&self) -> Option<&V> {
        self.latest().and_then(|event| event.payload.as_value())
    }

    pub fn is_live(&self) -> bool {
        self.latest_value().is_some()
    }

    pub fn is_live_at(&self, version: Version) -> bool {
        self.value_at(version).is_some()
    }

    /// Versions at which this key changed.
    pub fn versions(&self) -> Vec<Version> {
        self.events.iter().map(|event| event.version).collect()
    }
}
