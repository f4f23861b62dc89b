//! Snapshot projection.
//!
//! Rebuilds the live key set for a version from the per-key histories.
//! A key is live at version `v` when its last event at or before `v` is a
//! value. Each key is resolved with a binary search over its history, so a
//! full projection costs O(keys * log(events per key)).

use crate::history::{HistoryStore, KeyHistory};
use crate::types::Version;
use std::collections::hash_map;
use std::collections::HashMap;
use std::hash::Hash;
use std::iter::FusedIterator;

/// Which point in time a read resolves against.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum View {
    /// Last event of each key, no version comparison.
    Latest,

    /// Last event at or before the version.
    At(Version),
}

impl View {
    pub(crate) fn resolve<V>(self, history: &KeyHistory<V>) -> Option<&V> {
        match self {
            View::Latest => history.latest_value(),
            View::At(version) => history.value_at(version),
        }
    }
}

/// Iterator over the live entries of a projection.
///
/// Borrows the histories directly; nothing is cloned.
pub struct Iter<'a, K, V> {
    entries: hash_map::Iter<'a, K, KeyHistory<V>>,
    view: View,
}

impl<'a, K, V> Iter<'a, K, V> {
    pub(crate) fn new(store: &'a HistoryStore<K, V>, view: View) -> Self {
        Self {
            entries: store.iter(),
            view,
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let view = self.view;
        self.entries
            .by_ref()
            .find_map(|(key, history)| view.resolve(history).map(|value| (key, value)))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.entries.size_hint().1)
    }
}

impl<K, V> FusedIterator for Iter<'_, K, V> {}

/// Owned copy of the map as seen through `view`.
pub(crate) fn project<K, V>(store: &HistoryStore<K, V>, view: View) -> HashMap<K, V>
where
    K: Eq + Hash + Clone,
    V: Clone,
{
    let snapshot: HashMap<K, V> = Iter::new(store, view)
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect();
    tracing::trace!(?view, keys = snapshot.len(), "projected snapshot");
    snapshot
}
