pub mod kv;

pub use kv::{FileKv, KvError, KvStore, MemoryKv};

use tracing::warn;

/// Storage key for the history list. The legacy name is kept so history
/// persisted by earlier builds of the app still loads.
pub const HISTORY_KEY: &str = "soundcloud_search_history";
/// Storage key for the configured history size.
pub const LIMIT_KEY: &str = "search_history_limit";

pub const DEFAULT_LIMIT: usize = 5;
pub const MIN_LIMIT: usize = 1;
pub const MAX_LIMIT: usize = 50;

/// Encode a history list for storage.
pub fn serialize_history(entries: &[String]) -> Result<String, serde_json::Error> {
    serde_json::to_string(entries)
}

/// Decode a stored history list. Malformed JSON is treated as an empty
/// history, never an error.
pub fn deserialize_history(raw: &str) -> Vec<String> {
    match serde_json::from_str(raw) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(error = %e, "Stored search history is not valid JSON, starting empty");
            Vec::new()
        }
    }
}

/// Ordered, size-bounded, case-insensitively deduplicated list of search
/// queries, most-recent-first. Every mutation persists the full state
/// synchronously; a persistence failure rolls the mutation back and returns
/// the last known state instead of raising.
#[derive(Debug)]
pub struct HistoryStore<S: KvStore> {
    kv: S,
    entries: Vec<String>,
    limit: usize,
}

impl<S: KvStore> HistoryStore<S> {
    pub fn new(kv: S) -> Self {
        let mut entries = kv
            .get(HISTORY_KEY)
            .map(|raw| deserialize_history(&raw))
            .unwrap_or_default();
        let limit = kv
            .get(LIMIT_KEY)
            .and_then(|raw| raw.parse::<usize>().ok())
            .map(|n| n.clamp(MIN_LIMIT, MAX_LIMIT))
            .unwrap_or(DEFAULT_LIMIT);
        // A stored list longer than the stored limit can only come from
        // outside mutation; re-establish the bound.
        entries.truncate(limit);
        Self { kv, entries, limit }
    }

    /// Current entries, most-recent-first.
    pub fn all(&self) -> &[String] {
        &self.entries
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Insert a query at the front, evicting any case-insensitive duplicate
    /// and truncating to the limit. Blank input leaves the list unchanged.
    pub fn add(&mut self, query: &str) -> &[String] {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return &self.entries;
        }
        let lowered = trimmed.to_lowercase();
        let mut next: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.to_lowercase() != lowered)
            .cloned()
            .collect();
        next.insert(0, trimmed.to_string());
        next.truncate(self.limit);
        self.persist(next)
    }

    /// Remove a query (case-insensitive). Absent queries are a no-op.
    pub fn remove(&mut self, query: &str) -> &[String] {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return &self.entries;
        }
        let lowered = trimmed.to_lowercase();
        if !self.entries.iter().any(|e| e.to_lowercase() == lowered) {
            return &self.entries;
        }
        let next: Vec<String> = self
            .entries
            .iter()
            .filter(|e| e.to_lowercase() != lowered)
            .cloned()
            .collect();
        self.persist(next)
    }

    /// Replace the whole list with a caller-constructed order (drag-and-drop
    /// hands the reordered list over as-is), truncated to the limit.
    /// Deduplication is not re-enforced here; callers reordering an existing
    /// list are trusted.
    pub fn reorder(&mut self, new_order: Vec<String>) -> &[String] {
        let mut next = new_order;
        next.truncate(self.limit);
        self.persist(next)
    }

    /// Change the size bound, clamped to [MIN_LIMIT, MAX_LIMIT]. Shrinking
    /// below the current length truncates, keeping the most recent entries.
    pub fn set_limit(&mut self, new_limit: usize) -> &[String] {
        let clamped = new_limit.clamp(MIN_LIMIT, MAX_LIMIT);
        if let Err(e) = self.kv.set(LIMIT_KEY, &clamped.to_string()) {
            warn!(error = %e, "Failed to persist history limit, keeping previous");
            return &self.entries;
        }
        self.limit = clamped;
        if self.entries.len() > clamped {
            let next = self.entries[..clamped].to_vec();
            return self.persist(next);
        }
        &self.entries
    }

    /// Remove all entries.
    pub fn clear(&mut self) -> &[String] {
        if let Err(e) = self.kv.remove(HISTORY_KEY) {
            warn!(error = %e, "Failed to clear search history, keeping previous state");
            return &self.entries;
        }
        self.entries.clear();
        &self.entries
    }

    fn persist(&mut self, next: Vec<String>) -> &[String] {
        match serialize_history(&next) {
            Ok(raw) => {
                if let Err(e) = self.kv.set(HISTORY_KEY, &raw) {
                    warn!(error = %e, "Failed to persist search history, keeping previous state");
                } else {
                    self.entries = next;
                }
            }
            Err(e) => warn!(error = %e, "Failed to encode search history"),
        }
        &self.entries
    }
}
