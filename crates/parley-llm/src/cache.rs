//! Capped, never-evicting response cache.
//!
//! Keyed by the canonical string form of the exact ordered message list.
//! Once the cache holds [`parley_core::constants::CACHE_CAPACITY`] entries
//! it freezes: no eviction, no further inserts. That is a deliberate
//! simplification carried over from the service this replaces, not an LRU.

use std::collections::HashMap;

use parking_lot::Mutex;
use sha2::{Digest, Sha256};

use parley_core::PromptMessage;
use parley_core::constants::CACHE_CAPACITY;

use crate::client::Completion;

/// Canonical cache key for a message list.
///
/// Role and content of every message, in order. Two requests with the same
/// conversation window and input map to the same key.
#[must_use]
pub fn cache_key(messages: &[PromptMessage]) -> String {
    let mut key = String::new();
    for msg in messages {
        key.push_str(msg.role.as_str());
        key.push(':');
        key.push_str(&msg.content);
        key.push('\n');
    }
    key
}

/// Short digest of a cache key, safe to attach as span data.
///
/// Full keys contain user content; spans get a 16-hex-char sha256 prefix
/// instead.
#[must_use]
pub fn key_digest(key: &str) -> String {
    let digest = Sha256::digest(key.as_bytes());
    let mut out = String::with_capacity(16);
    for byte in &digest[..8] {
        out.push_str(&format!("{byte:02x}"));
    }
    out
}

/// Process-wide memo of prior model calls.
///
/// Concurrency: one mutex guards the map. Two identical concurrent misses
/// may both insert; last write wins, which is fine because entries are
/// immutable and equal. The capacity check happens under the same lock as
/// the insert, so the cap is never exceeded.
#[derive(Debug)]
pub struct ResponseCache {
    entries: Mutex<HashMap<String, Completion>>,
    capacity: usize,
}

impl ResponseCache {
    /// New cache with the standard capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(CACHE_CAPACITY)
    }

    /// New cache with an explicit capacity (tests).
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            capacity,
        }
    }

    /// Look up a completion by key.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<Completion> {
        self.entries.lock().get(key).cloned()
    }

    /// Store a completion unless the cache is frozen.
    ///
    /// Returns whether the entry was stored. Overwriting an existing key is
    /// allowed (identical racing requests) and does not count against
    /// capacity.
    pub fn insert(&self, key: String, completion: Completion) -> bool {
        let mut entries = self.entries.lock();
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            return false;
        }
        let _ = entries.insert(key, completion);
        true
    }

    /// Number of cached entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

impl Default for ResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::UsageEstimate;

    fn completion(text: &str) -> Completion {
        Completion {
            text: text.into(),
            model: "test-model".into(),
            usage: UsageEstimate::default(),
        }
    }

    // ── Key derivation ──────────────────────────────────────────────────

    #[test]
    fn key_covers_role_and_content_in_order() {
        let a = cache_key(&[
            PromptMessage::system("sys"),
            PromptMessage::user("hello"),
        ]);
        let b = cache_key(&[
            PromptMessage::system("sys"),
            PromptMessage::user("hello"),
        ]);
        assert_eq!(a, b);

        let different_content = cache_key(&[
            PromptMessage::system("sys"),
            PromptMessage::user("goodbye"),
        ]);
        assert_ne!(a, different_content);

        let different_role = cache_key(&[
            PromptMessage::system("sys"),
            PromptMessage::assistant("hello"),
        ]);
        assert_ne!(a, different_role);
    }

    #[test]
    fn key_is_order_sensitive() {
        let ab = cache_key(&[PromptMessage::user("a"), PromptMessage::user("b")]);
        let ba = cache_key(&[PromptMessage::user("b"), PromptMessage::user("a")]);
        assert_ne!(ab, ba);
    }

    #[test]
    fn digest_is_short_and_stable() {
        let key = cache_key(&[PromptMessage::user("hello")]);
        let d1 = key_digest(&key);
        let d2 = key_digest(&key);
        assert_eq!(d1, d2);
        assert_eq!(d1.len(), 16);
        assert!(!d1.contains("hello"));
    }

    // ── Insert/get ──────────────────────────────────────────────────────

    #[test]
    fn insert_then_get_round_trips() {
        let cache = ResponseCache::new();
        assert!(cache.insert("k".into(), completion("hi")));
        assert_eq!(cache.get("k").unwrap().text, "hi");
    }

    #[test]
    fn miss_returns_none() {
        let cache = ResponseCache::new();
        assert!(cache.get("absent").is_none());
    }

    // ── Freezing at capacity ────────────────────────────────────────────

    #[test]
    fn cache_freezes_at_capacity() {
        let cache = ResponseCache::with_capacity(2);
        assert!(cache.insert("a".into(), completion("1")));
        assert!(cache.insert("b".into(), completion("2")));
        assert!(!cache.insert("c".into(), completion("3")));

        assert_eq!(cache.len(), 2);
        assert!(cache.get("c").is_none());
        // Existing entries survive, nothing was evicted.
        assert_eq!(cache.get("a").unwrap().text, "1");
        assert_eq!(cache.get("b").unwrap().text, "2");
    }

    #[test]
    fn overwrite_of_existing_key_allowed_when_full() {
        let cache = ResponseCache::with_capacity(1);
        assert!(cache.insert("a".into(), completion("1")));
        // Same key again — the identical-concurrent-miss race.
        assert!(cache.insert("a".into(), completion("1")));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn default_capacity_is_ten() {
        let cache = ResponseCache::new();
        for i in 0..10 {
            assert!(cache.insert(format!("k{i}"), completion("x")));
        }
        assert!(!cache.insert("k10".into(), completion("x")));
        assert_eq!(cache.len(), 10);
    }
}
