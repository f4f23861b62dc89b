//! End-to-end version scenarios on a fresh map.

use std::collections::HashMap;
use versioned_map::{KeyVersions, MapError, Version, VersionedMap};

fn init_tracing() {
    let _ = tracing_subscriber::fmt::try_init();
}

fn map_of(entries: &[(&'static str, &'static str)]) -> HashMap<&'static str, &'static str> {
    entries.iter().copied().collect()
}

// --- Insert / Remove / Re-insert ---

#[test]
fn test_insert_then_remove_then_reinsert() {
    init_tracing();
    let mut map = VersionedMap::new();

    // First insert
    assert_eq!(map.insert("a", "1").unwrap(), Version(1));
    assert_eq!(map.count_history(), &[0, 1]);
    assert_eq!(map.snapshot(), map_of(&[("a", "1")]));
    assert_eq!(map.snapshot_at(Version(1)).unwrap(), map_of(&[("a", "1")]));
    assert_eq!(map.snapshot_at(Version(0)).unwrap(), map_of(&[]));

    // Remove
    let removal = map.remove("a");
    assert!(removal.removed);
    assert_eq!(removal.version, Version(2));
    assert_eq!(map.count_history(), &[0, 1, 0]);
    assert_eq!(map.snapshot_at(Version(2)).unwrap(), map_of(&[]));
    assert_eq!(map.snapshot_at(Version(1)).unwrap(), map_of(&[("a", "1")]));

    // Re-insert with a new value
    assert_eq!(map.insert("a", "2").unwrap(), Version(3));
    assert_eq!(map.snapshot(), map_of(&[("a", "2")]));
    assert_eq!(map.snapshot_at(Version(1)).unwrap(), map_of(&[("a", "1")]));

    // Beyond the current version
    let err = map.snapshot_at(Version(4)).unwrap_err();
    assert_eq!(
        err,
        MapError::VersionOutOfRange {
            requested: Version(4),
            current: Version(3),
        }
    );
}

#[test]
fn test_duplicate_insert_keeps_version() {
    let mut map = VersionedMap::new();
    map.insert("a", "1").unwrap();

    let result = map.insert("a", "1");
    assert!(matches!(result, Err(MapError::KeyAlreadyExists(_))));
    assert_eq!(map.version(), Version(1));
    assert_eq!(map.count_history(), &[0, 1]);
}

#[test]
fn test_clear_tombstones_every_key() {
    init_tracing();
    let mut map = VersionedMap::new();
    map.insert("a", "1").unwrap();
    map.insert("b", "2").unwrap();

    assert_eq!(map.clear(), Version(3));
    assert_eq!(map.snapshot_at(Version(3)).unwrap(), map_of(&[]));
    assert_eq!(
        map.snapshot_at(Version(2)).unwrap(),
        map_of(&[("a", "1"), ("b", "2")])
    );
    assert_eq!(map.count_history(), &[0, 1, 2, 0]);

    assert_eq!(
        map.all_keys(),
        vec![
            KeyVersions {
                key: "a",
                versions: vec![Version(1), Version(3)],
            },
            KeyVersions {
                key: "b",
                versions: vec![Version(2), Version(3)],
            },
        ]
    );
}

#[test]
fn test_clear_also_marks_already_removed_keys() {
    let mut map = VersionedMap::new();
    map.insert("a", 1).unwrap();
    map.remove("a");
    map.clear();

    let versions: Vec<_> = map.history("a").unwrap().iter().map(|e| e.version).collect();
    assert_eq!(versions, vec![Version(1), Version(2), Version(3)]);
    assert_eq!(map.count_history(), &[0, 1, 0, 0]);
}

// --- Bulk Construction ---

#[test]
fn test_bulk_loaded_entries_live_at_version_one() {
    let map = VersionedMap::from_entries([("key", "value")]).unwrap();

    assert_eq!(map.count(), 1);
    assert_eq!(map.get_at(Version(1), "key").unwrap(), &"value");
    assert_eq!(map.get("key").unwrap(), &"value");
    assert!(matches!(
        map.get_at(Version(0), "key"),
        Err(MapError::KeyNotFound(_))
    ));
    assert!(matches!(
        map.get_at(Version(2), "key"),
        Err(MapError::VersionOutOfRange { .. })
    ));
}

#[test]
fn test_bulk_load_then_mutate() {
    let mut map = VersionedMap::from_entries([("key", "value")]).unwrap();
    map.insert("key2", "value2").unwrap();
    assert_eq!(map.count(), 2);

    map.remove("key");
    map.insert("key", "value2").unwrap();
    assert_eq!(map.count(), 2);
    assert_eq!(map.get("key").unwrap(), &"value2");
    assert_eq!(map.count_history(), &[0, 1, 2, 1, 2]);
}

// --- Versioned Reads ---

#[test]
fn test_versioned_reads_agree_with_snapshots() {
    let mut map = VersionedMap::new();
    map.insert("x", 10).unwrap();
    map.insert("y", 20).unwrap();
    map.replace("x", 11);
    map.remove("y");
    map.insert("z", 30).unwrap();

    for v in 0..=map.version().0 {
        let version = Version(v);
        let snapshot = map.snapshot_at(version).unwrap();

        assert_eq!(map.count_at(version).unwrap(), snapshot.len());
        for key in ["x", "y", "z"] {
            assert_eq!(
                map.try_get_at(version, key).unwrap(),
                snapshot.get(key),
                "key {} at version {}",
                key,
                v
            );
            assert_eq!(
                map.contains_key_at(version, key).unwrap(),
                snapshot.contains_key(key)
            );
        }

        let mut keys: Vec<_> = map.keys_at(version).unwrap().copied().collect();
        keys.sort();
        let mut expected: Vec<_> = snapshot.keys().copied().collect();
        expected.sort();
        assert_eq!(keys, expected);

        let mut values: Vec<_> = map.values_at(version).unwrap().copied().collect();
        values.sort();
        let mut expected: Vec<_> = snapshot.values().copied().collect();
        expected.sort();
        assert_eq!(values, expected);
    }
}

#[test]
fn test_contains_pair_at_version() {
    let mut map = VersionedMap::new();
    map.insert("a", 1).unwrap();
    map.replace("a", 2);

    assert!(map.contains_at(Version(1), "a", &1).unwrap());
    assert!(!map.contains_at(Version(1), "a", &2).unwrap());
    assert!(map.contains("a", &2));
    assert!(!map.contains("a", &1));
}

#[test]
fn test_iter_at_matches_snapshot() {
    let mut map = VersionedMap::new();
    for i in 0..20 {
        map.insert(i, i * 2).unwrap();
    }
    for i in (0..20).step_by(3) {
        map.remove(&i);
    }

    let at_twenty: HashMap<i32, i32> = map
        .iter_at(Version(20))
        .unwrap()
        .map(|(k, v)| (*k, *v))
        .collect();
    assert_eq!(at_twenty, map.snapshot_at(Version(20)).unwrap());
    assert_eq!(at_twenty.len(), 20);

    let latest: HashMap<i32, i32> = map.iter().map(|(k, v)| (*k, *v)).collect();
    assert_eq!(latest, map.snapshot());
    assert_eq!(latest.len(), map.count());
}

#[test]
fn test_history_is_an_audit_trail() {
    let mut map = VersionedMap::new();
    map.insert("a", 1).unwrap();
    map.replace("a", 2);
    map.remove("a");

    let history = map.history("a").unwrap();
    assert_eq!(history.len(), 3);
    assert_eq!(history[0].payload.as_value(), Some(&1));
    assert_eq!(history[1].payload.as_value(), Some(&2));
    assert!(history[2].payload.is_tombstone());
    assert!(map.history("b").is_none());
}

#[test]
fn test_all_keys_serializes_for_export() {
    let mut map = VersionedMap::new();
    map.insert("a".to_string(), 1).unwrap();
    map.remove("a");

    let json = serde_json::to_value(map.all_keys()).unwrap();
    assert_eq!(json, serde_json::json!([{"key": "a", "versions": [1, 2]}]));
}
