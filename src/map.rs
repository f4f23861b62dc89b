//! The versioned map tying the counter, histories and size history together.

use crate::error::{MapError, Result};
use crate::history::{HistoryStore, KeyHistory};
use crate::projection::{self, Iter, View};
use crate::size_history::SizeHistory;
use crate::types::{Event, KeyVersions, Removal, Version};
use std::borrow::Borrow;
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use tracing::{debug, trace};

/// Map configuration.
#[derive(Clone, Debug)]
pub struct MapConfig {
    /// Number of distinct keys to reserve room for.
    pub key_capacity: usize,

    /// Number of mutations to reserve room for in the size history.
    pub history_capacity: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            key_capacity: 16,
            history_capacity: 64,
        }
    }
}

/// An in-memory map that keeps every mutation.
///
/// Reads either see the latest state or the state as of any earlier
/// version. Each accepted mutation advances the version by exactly one and
/// appends one entry to the size history; rejected mutations change
/// nothing.
///
/// Mutations take `&mut self`. Callers sharing a map across threads wrap the
/// whole map in one lock so the counter, histories and size history move
/// together.
#[derive(Clone, Debug)]
pub struct VersionedMap<K, V> {
    /// Current revision.
    version: Version,

    /// Per-key event lists.
    histories: HistoryStore<K, V>,

    /// Live-key count per version.
    sizes: SizeHistory,
}

impl<K, V> VersionedMap<K, V> {
    /// Current version. Zero until the first mutation.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Number of live keys at the current version.
    pub fn count(&self) -> usize {
        self.sizes.latest()
    }

    pub fn len(&self) -> usize {
        self.count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Live-key count after every version, indexed by version.
    pub fn count_history(&self) -> &[usize] {
        self.sizes.as_slice()
    }

    /// Number of live keys at `version`.
    pub fn count_at(&self, version: Version) -> Result<usize> {
        self.check_version(version)?;
        self.sizes
            .at(version)
            .ok_or(MapError::VersionOutOfRange {
                requested: version,
                current: self.version,
            })
    }

    /// Every key ever observed with the versions at which it changed,
    /// ordered by first appearance.
    pub fn all_keys(&self) -> Vec<KeyVersions<K>>
    where
        K: Clone,
    {
        let mut keys: Vec<KeyVersions<K>> = self
            .histories
            .iter()
            .map(|(key, history)| KeyVersions {
                key: key.clone(),
                versions: history.versions(),
            })
            .collect();
        keys.sort_by_key(|entry| entry.versions.first().copied());
        keys
    }

    fn check_version(&self, version: Version) -> Result<()> {
        if version > self.version {
            return Err(MapError::VersionOutOfRange {
                requested: version,
                current: self.version,
            });
        }
        Ok(())
    }

    /// Finish an accepted mutation: advance the counter and record the size.
    fn commit(&mut self, op: &'static str, version: Version, live: usize) -> Version {
        debug_assert_eq!(version, self.version.next());
        self.version = version;
        self.sizes.record(live);
        debug_assert_eq!(self.sizes.len() as u64, self.version.0 + 1);
        debug!(op, version = %version, live, "mutation committed");
        version
    }
}

impl<K: Eq + Hash, V> Default for VersionedMap<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: Eq + Hash, V> VersionedMap<K, V> {
    /// Create an empty map at version 0.
    pub fn new() -> Self {
        Self::with_config(MapConfig::default())
    }

    pub fn with_config(config: MapConfig) -> Self {
        Self {
            version: Version::ZERO,
            histories: HistoryStore::with_capacity(config.key_capacity),
            sizes: SizeHistory::with_capacity(config.history_capacity),
        }
    }

    /// Bulk-load an initial key/value set.
    ///
    /// A non-empty set is recorded as a single mutation at version 1, so
    /// version 0 stays the empty map. An empty set yields a fresh map.
    /// Fails with [`MapError::InvalidArgument`] on duplicate keys.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, V)>,
        K: Debug,
    {
        let mut map = Self::new();
        let version = map.version.next();
        let mut loaded = 0;
        for (key, value) in entries {
            if map.histories.get(&key).is_some() {
                return Err(MapError::InvalidArgument(format!(
                    "duplicate key {:?} in initial entries",
                    key
                )));
            }
            map.histories.record(key, Event::value(version, value));
            loaded += 1;
        }
        if loaded > 0 {
            map.commit("load", version, loaded);
        }
        Ok(map)
    }

    // --- Reads ---

    /// Value of `key` at the current version.
    pub fn try_get<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.resolve(key, View::Latest)
    }

    /// Value of `key` at `version`.
    pub fn try_get_at<Q>(&self, version: Version, key: &Q) -> Result<Option<&V>>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.check_version(version)?;
        Ok(self.resolve(key, View::At(version)))
    }

    /// Value of `key` at the current version, failing if it is not live.
    pub fn get<Q>(&self, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.try_get(key)
            .ok_or_else(|| MapError::KeyNotFound(format!("{:?}", key)))
    }

    /// Value of `key` at `version`, failing if it was not live then.
    pub fn get_at<Q>(&self, version: Version, key: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.try_get_at(version, key)?.ok_or_else(|| {
            MapError::KeyNotFound(format!("{:?} at version {}", key, version))
        })
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.try_get(key).is_some()
    }

    pub fn contains_key_at<Q>(&self, version: Version, key: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        Ok(self.try_get_at(version, key)?.is_some())
    }

    /// Whether `key` is live with exactly `value`.
    pub fn contains<Q>(&self, key: &Q, value: &V) -> bool
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        self.try_get(key) == Some(value)
    }

    pub fn contains_at<Q>(&self, version: Version, key: &Q, value: &V) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
        V: PartialEq,
    {
        Ok(self.try_get_at(version, key)? == Some(value))
    }

    /// Live entries at the current version, in arbitrary order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter::new(&self.histories, View::Latest)
    }

    pub fn iter_at(&self, version: Version) -> Result<Iter<'_, K, V>> {
        self.check_version(version)?;
        Ok(Iter::new(&self.histories, View::At(version)))
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(key, _)| key)
    }

    pub fn keys_at(&self, version: Version) -> Result<impl Iterator<Item = &K> + '_> {
        Ok(self.iter_at(version)?.map(|(key, _)| key))
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, value)| value)
    }

    pub fn values_at(&self, version: Version) -> Result<impl Iterator<Item = &V> + '_> {
        Ok(self.iter_at(version)?.map(|(_, value)| value))
    }

    /// Plain copy of the map at the current version.
    pub fn snapshot(&self) -> HashMap<K, V>
    where
        K: Clone,
        V: Clone,
    {
        projection::project(&self.histories, View::Latest)
    }

    /// Plain copy of the map as of `version`.
    pub fn snapshot_at(&self, version: Version) -> Result<HashMap<K, V>>
    where
        K: Clone,
        V: Clone,
    {
        self.check_version(version)?;
        Ok(projection::project(&self.histories, View::At(version)))
    }

    /// Copy the current entries into `dest` starting at `index`.
    ///
    /// Returns the number of entries written.
    pub fn copy_to(&self, dest: &mut [Option<(K, V)>], index: usize) -> Result<usize>
    where
        K: Clone,
        V: Clone,
    {
        copy_entries(self.iter(), dest, index)
    }

    pub fn copy_to_at(
        &self,
        version: Version,
        dest: &mut [Option<(K, V)>],
        index: usize,
    ) -> Result<usize>
    where
        K: Clone,
        V: Clone,
    {
        copy_entries(self.iter_at(version)?, dest, index)
    }

    /// Raw event list of `key`, if it was ever observed.
    pub fn history<Q>(&self, key: &Q) -> Option<&[Event<V>]>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.histories.get(key).map(KeyHistory::events)
    }

    fn resolve<Q>(&self, key: &Q, view: View) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: Hash + Eq + ?Sized,
    {
        self.histories
            .get(key)
            .and_then(|history| view.resolve(history))
    }

    // --- Mutations ---

    /// Add `key` if it is not live.
    ///
    /// A key that was removed earlier can be inserted again; its old events
    /// stay in its history.
    pub fn insert(&mut self, key: K, value: V) -> Result<Version>
    where
        K: Debug,
    {
        if self.histories.is_live(&key) {
            debug!(?key, version = %self.version, "insert rejected: key is live");
            return Err(MapError::KeyAlreadyExists(format!("{:?}", key)));
        }

        let version = self.version.next();
        trace!(?key, version = %version, "insert");
        self.histories.record(key, Event::value(version, value));
        let live = self.sizes.latest() + 1;
        Ok(self.commit("insert", version, live))
    }

    /// Set `key` to `value` whether or not it is live or was ever seen.
    pub fn replace(&mut self, key: K, value: V) -> Version
    where
        K: Debug,
    {
        let was_live = self.histories.is_live(&key);
        let version = self.version.next();
        trace!(?key, version = %version, was_live, "replace");
        self.histories.record(key, Event::value(version, value));
        let live = if was_live {
            self.sizes.latest()
        } else {
            self.sizes.latest() + 1
        };
        self.commit("replace", version, live)
    }

    /// Tombstone `key` if it is live.
    pub fn remove<Q>(&mut self, key: &Q) -> Removal
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
    {
        self.remove_if("remove", key, |_| true)
    }

    /// Tombstone `key` only if it is live with exactly `expected`.
    pub fn remove_entry<Q>(&mut self, key: &Q, expected: &V) -> Removal
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
        V: PartialEq,
    {
        self.remove_if("remove_entry", key, |current| current == expected)
    }

    /// Tombstone every known key in one mutation.
    pub fn clear(&mut self) -> Version {
        let version = self.version.next();
        let was_live = self.histories.tombstone_all(version);
        trace!(version = %version, was_live, keys = self.histories.key_count(), "clear");
        self.commit("clear", version, 0)
    }

    fn remove_if<Q, F>(&mut self, op: &'static str, key: &Q, matches: F) -> Removal
    where
        K: Borrow<Q>,
        Q: Hash + Eq + Debug + ?Sized,
        F: FnOnce(&V) -> bool,
    {
        let Some(history) = self.histories.get_mut(key) else {
            debug!(op, ?key, version = %self.version, "removal rejected: key never seen");
            return Removal::rejected(self.version);
        };
        if !history.latest_value().is_some_and(matches) {
            debug!(op, ?key, version = %self.version, "removal rejected: no matching live value");
            return Removal::rejected(self.version);
        }

        let version = self.version.next();
        history.append(Event::tombstone(version));
        let live = self.sizes.latest().saturating_sub(1);
        Removal::accepted(self.commit(op, version, live))
    }
}

fn copy_entries<'a, K, V>(
    entries: Iter<'a, K, V>,
    dest: &mut [Option<(K, V)>],
    index: usize,
) -> Result<usize>
where
    K: Clone + 'a,
    V: Clone + 'a,
{
    let entries: Vec<(&K, &V)> = entries.collect();
    let end = index
        .checked_add(entries.len())
        .filter(|end| *end <= dest.len())
        .ok_or_else(|| {
            MapError::InvalidArgument(format!(
                "destination of length {} cannot hold {} entries at index {}",
                dest.len(),
                entries.len(),
                index
            ))
        })?;

    for (slot, (key, value)) in dest[index..end].iter_mut().zip(entries) {
        *slot = Some((key.clone(), value.clone()));
    }
    Ok(end - index)
}

impl<'a, K, V> IntoIterator for &'a VersionedMap<K, V>
where
    K: Eq + Hash,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: Eq + Hash, V> From<HashMap<K, V>> for VersionedMap<K, V> {
    fn from(entries: HashMap<K, V>) -> Self {
        let mut map = Self::with_config(MapConfig {
            key_capacity: entries.len(),
            ..MapConfig::default()
        });
        if entries.is_empty() {
            return map;
        }

        let version = map.version.next();
        let loaded = entries.len();
        for (key, value) in entries {
            map.histories.record(key, Event::value(version, value));
        }
        map.commit("load", version, loaded);
        map
    }
}
