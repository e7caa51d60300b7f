//! Behavioral tests for the search-history store.
//!
//! These pin the contract the UI relies on:
//! - the list never exceeds its limit, after any sequence of mutations
//! - dedup is case-insensitive and keeps the most recent casing at the front
//! - persistence failures degrade to a no-op, never an error
//! - persisted state round-trips into a fresh store

use tunescout_history::kv::KvError;
use tunescout_history::{
    deserialize_history, FileKv, HistoryStore, KvStore, MemoryKv, DEFAULT_LIMIT, HISTORY_KEY,
    LIMIT_KEY,
};

/// Storage double whose writes always fail, as a full or disabled browser
/// store would. Reads serve whatever it was seeded with.
struct DenyWrites {
    seeded: Option<String>,
}

impl KvStore for DenyWrites {
    fn get(&self, key: &str) -> Option<String> {
        (key == HISTORY_KEY).then(|| self.seeded.clone()).flatten()
    }

    fn set(&mut self, _key: &str, _value: &str) -> Result<(), KvError> {
        Err(KvError::Io(std::io::Error::other("storage quota exceeded")))
    }

    fn remove(&mut self, _key: &str) -> Result<(), KvError> {
        Err(KvError::Io(std::io::Error::other("storage quota exceeded")))
    }
}

// --- bound invariant ---

#[test]
fn length_never_exceeds_limit() {
    let mut store = HistoryStore::new(MemoryKv::new());
    for i in 0..40 {
        store.add(&format!("query {i}"));
        assert!(store.all().len() <= store.limit());
    }
    assert_eq!(store.all().len(), DEFAULT_LIMIT);
}

#[test]
fn eviction_drops_the_oldest_entry() {
    let mut store = HistoryStore::new(MemoryKv::new());
    for q in ["jazz", "rock", "pop", "blues", "folk", "metal"] {
        store.add(q);
    }
    assert_eq!(store.all(), ["metal", "folk", "blues", "pop", "rock"]);
}

// --- dedup ---

#[test]
fn case_variant_replaces_and_moves_to_front() {
    let mut store = HistoryStore::new(MemoryKv::new());
    store.add("Daft Punk");
    store.add("aphex twin");
    store.add("DAFT PUNK");
    assert_eq!(store.all(), ["DAFT PUNK", "aphex twin"]);
}

#[test]
fn duplicate_of_single_entry_keeps_length_one() {
    let mut store = HistoryStore::new(MemoryKv::new());
    store.add("jazz");
    store.add("Jazz");
    assert_eq!(store.all(), ["Jazz"]);
}

// --- input validation ---

#[test]
fn whitespace_only_add_is_ignored() {
    let mut store = HistoryStore::new(MemoryKv::new());
    store.add("jazz");
    store.add("   ");
    store.add("\t\n");
    assert_eq!(store.all(), ["jazz"]);
}

#[test]
fn add_trims_surrounding_whitespace() {
    let mut store = HistoryStore::new(MemoryKv::new());
    store.add("  jazz  ");
    assert_eq!(store.all(), ["jazz"]);
}

// --- remove ---

#[test]
fn remove_is_case_insensitive() {
    let mut store = HistoryStore::new(MemoryKv::new());
    store.add("jazz");
    store.add("rock");
    store.remove("JAZZ");
    assert_eq!(store.all(), ["rock"]);
}

#[test]
fn remove_of_absent_query_is_a_no_op() {
    let mut store = HistoryStore::new(MemoryKv::new());
    store.add("jazz");
    let after = store.remove("techno").to_vec();
    assert_eq!(after, ["jazz"]);
}

// --- reorder ---

#[test]
fn reorder_round_trips_through_get() {
    let mut store = HistoryStore::new(MemoryKv::new());
    for q in ["a", "b", "c"] {
        store.add(q);
    }
    let reordered = vec!["b".to_string(), "a".to_string(), "c".to_string()];
    store.reorder(reordered.clone());
    assert_eq!(store.all(), reordered.as_slice());
}

#[test]
fn reorder_truncates_to_limit() {
    let kv = MemoryKv::new();
    let mut store = HistoryStore::new(kv);
    store.set_limit(2);
    store.reorder(vec!["a".into(), "b".into(), "c".into()]);
    assert_eq!(store.all(), ["a", "b"]);
}

// --- limit ---

#[test]
fn shrinking_limit_truncates_and_persists() {
    let kv = MemoryKv::new();
    let mut store = HistoryStore::new(kv.clone());
    for q in ["one", "two", "three", "four", "five"] {
        store.add(q);
    }
    store.set_limit(3);
    assert_eq!(store.all(), ["five", "four", "three"]);

    // The truncation reached storage, not just memory.
    let stored = deserialize_history(&kv.get(HISTORY_KEY).unwrap());
    assert_eq!(stored, ["five", "four", "three"]);
    assert_eq!(kv.get(LIMIT_KEY).as_deref(), Some("3"));
}

#[test]
fn limit_is_clamped_to_valid_range() {
    let mut store = HistoryStore::new(MemoryKv::new());
    store.set_limit(0);
    assert_eq!(store.limit(), 1);
    store.set_limit(500);
    assert_eq!(store.limit(), 50);
}

#[test]
fn growing_limit_keeps_existing_entries() {
    let mut store = HistoryStore::new(MemoryKv::new());
    for q in ["a", "b", "c", "d", "e"] {
        store.add(q);
    }
    store.set_limit(10);
    assert_eq!(store.all().len(), 5);
    store.add("f");
    assert_eq!(store.all().len(), 6);
}

// --- clear ---

#[test]
fn clear_empties_list_and_storage() {
    let kv = MemoryKv::new();
    let mut store = HistoryStore::new(kv.clone());
    store.add("jazz");
    store.clear();
    assert!(store.all().is_empty());
    assert!(kv.get(HISTORY_KEY).is_none());
}

// --- persistence round trip ---

#[test]
fn state_round_trips_into_a_fresh_store() {
    let kv = MemoryKv::new();
    let mut store = HistoryStore::new(kv.clone());
    store.set_limit(7);
    for q in ["jazz", "rock", "pop"] {
        store.add(q);
    }

    let reloaded = HistoryStore::new(kv);
    assert_eq!(reloaded.all(), ["pop", "rock", "jazz"]);
    assert_eq!(reloaded.limit(), 7);
}

#[test]
fn state_round_trips_through_a_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    let mut store = HistoryStore::new(FileKv::open(&path));
    store.add("boards of canada");
    store.add("autechre");

    let reloaded = HistoryStore::new(FileKv::open(&path));
    assert_eq!(reloaded.all(), ["autechre", "boards of canada"]);
}

// --- degraded storage ---

#[test]
fn failed_write_rolls_the_mutation_back() {
    let mut store = HistoryStore::new(DenyWrites { seeded: None });
    let after = store.add("jazz").to_vec();
    assert!(after.is_empty());
    assert!(store.all().is_empty());
}

#[test]
fn failed_write_returns_last_known_state() {
    let seeded = serde_json::to_string(&["jazz", "rock"]).unwrap();
    let mut store = HistoryStore::new(DenyWrites {
        seeded: Some(seeded),
    });
    let after = store.add("pop").to_vec();
    assert_eq!(after, ["jazz", "rock"]);
    let after = store.clear().to_vec();
    assert_eq!(after, ["jazz", "rock"]);
}

// --- corrupt storage ---

#[test]
fn malformed_stored_history_is_treated_as_empty() {
    let mut kv = MemoryKv::new();
    kv.set(HISTORY_KEY, "{{{ not json").unwrap();
    let store = HistoryStore::new(kv);
    assert!(store.all().is_empty());
}

#[test]
fn stored_limit_outside_range_is_clamped_on_load() {
    let mut kv = MemoryKv::new();
    kv.set(LIMIT_KEY, "9000").unwrap();
    let store = HistoryStore::new(kv);
    assert_eq!(store.limit(), 50);
}

#[test]
fn stored_list_longer_than_limit_is_rebounded_on_load() {
    let mut kv = MemoryKv::new();
    let oversized: Vec<String> = (0..10).map(|i| format!("q{i}")).collect();
    kv.set(HISTORY_KEY, &serde_json::to_string(&oversized).unwrap())
        .unwrap();
    kv.set(LIMIT_KEY, "5").unwrap();
    let store = HistoryStore::new(kv);
    assert_eq!(store.all().len(), 5);
    assert_eq!(store.all()[0], "q0");
}
