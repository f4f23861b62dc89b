//! Live-key count per version.
//!
//! Entry `i` is the number of live keys right after the mutation that
//! produced version `i`, so a count lookup never needs a projection.

use crate::types::Version;

/// Append-only live-key counts, indexed by version.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SizeHistory {
    counts: Vec<usize>,
}

impl Default for SizeHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl SizeHistory {
    /// Start with the single entry for version 0 (empty map).
    pub fn new() -> Self {
        Self::with_capacity(1)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let mut counts = Vec::with_capacity(capacity.max(1));
        counts.push(0);
        Self { counts }
    }

    /// Record the count for the next version.
    pub(crate) fn record(&mut self, live: usize) {
        self.counts.push(live);
    }

    /// Count after the most recent mutation.
    pub fn latest(&self) -> usize {
        self.counts.last().copied().unwrap_or(0)
    }

    pub fn at(&self, version: Version) -> Option<usize> {
        self.counts.get(version.index()).copied()
    }

    /// Number of entries; always the current version plus one.
    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.counts
    }
}
