//! Core types for the versioned map.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Revision of the map.
///
/// Version 0 is the empty map before any mutation. Each accepted mutation
/// produces the next version, so versions form a gapless sequence.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct Version(pub u64);

impl fmt::Debug for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Version({})", self.0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for Version {
    fn from(value: u64) -> Self {
        Version(value)
    }
}

impl Version {
    /// The empty map, before any mutation.
    pub const ZERO: Version = Version(0);

    pub fn next(self) -> Self {
        Version(self.0 + 1)
    }

    pub fn prev(self) -> Option<Self> {
        if self.0 > 0 {
            Some(Version(self.0 - 1))
        } else {
            None
        }
    }

    /// Position of this version in per-version side tables.
    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

/// What happened to a key at a version.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Payload<V> {
    /// The key was set to this value.
    Value(V),

    /// The key was removed.
    Tombstone,
}

impl<V> Payload<V> {
    pub fn as_value(&self) -> Option<&V> {
        match self {
            Payload::Value(value) => Some(value),
            Payload::Tombstone => None,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        matches!(self, Payload::Tombstone)
    }
}

/// A single recorded change for one key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event<V> {
    /// Version produced by the mutation that recorded this event.
    pub version: Version,

    pub payload: Payload<V>,
}

impl<V> Event<V> {
    pub fn value(version: Version, value: V) -> Self {
        Self {
            version,
            payload: Payload::Value(value),
        }
    }

    pub fn tombstone(version: Version) -> Self {
        Self {
            version,
            payload: Payload::Tombstone,
        }
    }
}

/// A key together with every version at which its history changed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyVersions<K> {
    pub key: K,

    /// Ascending; includes both value and tombstone events.
    pub versions: Vec<Version>,
}

/// Outcome of a removal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Removal {
    /// Whether a tombstone was recorded.
    pub removed: bool,

    /// The map version after the call. Unchanged when nothing was removed.
    pub version: Version,
}

impl Removal {
    pub(crate) fn accepted(version: Version) -> Self {
        Self {
            removed: true,
            version,
        }
    }

    pub(crate) fn rejected(version: Version) -> Self {
        Self {
            removed: false,
            version,
        }
    }
}
