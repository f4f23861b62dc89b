//! # Versioned Map
//!
//! An in-memory map that keeps every mutation and can be read either at
//! its latest state or as of any earlier version.
//!
//! ## Core Concepts
//!
//! - **Versions**: A gapless counter advanced once per accepted mutation
//! - **Histories**: Append-only per-key events, either a value or a tombstone
//! - **Projection**: Rebuilds the live key set for any version
//! - **Size history**: Live-key count after every version
//!
//! ## Example
//!
//! ```
//! use versioned_map::{Version, VersionedMap};
//!
//! let mut map = VersionedMap::new();
//! map.insert("a", 1)?;
//! map.remove("a");
//! map.insert("a", 2)?;
//!
//! assert_eq!(map.get("a")?, &2);
//! assert_eq!(map.get_at(Version(1), "a")?, &1);
//! assert!(!map.contains_key_at(Version(2), "a")?);
//! assert_eq!(map.count_history(), &[0, 1, 0, 1]);
//! # Ok::<(), versioned_map::MapError>(())
//! ```

pub mod error;
pub mod history;
pub mod map;
pub mod projection;
pub mod size_history;
pub mod types;

// Re-exports
pub use error::{MapError, Result};
pub use history::{HistoryStore, KeyHistory};
pub use map::{MapConfig, VersionedMap};
pub use projection::Iter;
pub use size_history::SizeHistory;
pub use types::*;
