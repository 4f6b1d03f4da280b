//! In-memory conversation store.
//!
//! Process-lifetime session → history mapping. No persistence, no expiry.
//!
//! Locking discipline: one global `parking_lot::Mutex` guards the map, so
//! all writes are serialized. Two concurrent requests on the *same* session
//! resolve last-writer-wins — acceptable for this service and stated here
//! rather than left implicit. Histories are handed out as clones; a request
//! never mutates another request's view in place.

use std::collections::HashMap;

use parking_lot::Mutex;

use parley_core::ConversationMessage;

/// Session-keyed conversation histories.
#[derive(Debug, Default)]
pub struct ConversationStore {
    sessions: Mutex<HashMap<String, Vec<ConversationMessage>>>,
}

impl ConversationStore {
    /// New empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// History for a session; empty if the session is unknown.
    #[must_use]
    pub fn get(&self, session_id: &str) -> Vec<ConversationMessage> {
        self.sessions
            .lock()
            .get(session_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Replace a session's history.
    pub fn put(&self, session_id: &str, history: Vec<ConversationMessage>) {
        let mut sessions = self.sessions.lock();
        let _ = sessions.insert(session_id.to_owned(), history);
        metrics::gauge!("sessions_active").set(sessions.len() as f64);
    }

    /// Drop a session. Returns whether it existed.
    pub fn clear(&self, session_id: &str) -> bool {
        let mut sessions = self.sessions.lock();
        let existed = sessions.remove(session_id).is_some();
        metrics::gauge!("sessions_active").set(sessions.len() as f64);
        existed
    }

    /// Number of known sessions.
    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.lock().len()
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_session_is_empty() {
        let store = ConversationStore::new();
        assert!(store.get("missing").is_empty());
        assert_eq!(store.session_count(), 0);
    }

    #[test]
    fn put_then_get_round_trips() {
        let store = ConversationStore::new();
        let history = vec![
            ConversationMessage::user("Hello"),
            ConversationMessage::assistant("Hi there!"),
        ];
        store.put("s1", history.clone());
        assert_eq!(store.get("s1"), history);
        assert_eq!(store.session_count(), 1);
    }

    #[test]
    fn sessions_are_isolated() {
        let store = ConversationStore::new();
        store.put("a", vec![ConversationMessage::user("for a")]);
        store.put("b", vec![ConversationMessage::user("for b")]);
        assert_eq!(store.get("a")[0].content, "for a");
        assert_eq!(store.get("b")[0].content, "for b");
    }

    #[test]
    fn put_replaces_wholesale() {
        let store = ConversationStore::new();
        store.put("s1", vec![ConversationMessage::user("old")]);
        store.put("s1", vec![ConversationMessage::user("new")]);
        let history = store.get("s1");
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].content, "new");
    }

    #[test]
    fn clear_reports_existence() {
        let store = ConversationStore::new();
        store.put("s1", vec![ConversationMessage::user("x")]);
        assert!(store.clear("s1"));
        assert!(!store.clear("s1"));
        assert!(store.get("s1").is_empty());
    }

    #[test]
    fn get_returns_a_clone() {
        let store = ConversationStore::new();
        store.put("s1", vec![ConversationMessage::user("original")]);
        let mut copy = store.get("s1");
        copy.push(ConversationMessage::assistant("local only"));
        // The store's view is untouched.
        assert_eq!(store.get("s1").len(), 1);
    }

    #[test]
    fn concurrent_puts_do_not_corrupt_the_map() {
        use std::sync::Arc;
        let store = Arc::new(ConversationStore::new());
        let handles: Vec<_> = (0..8)
            .map(|i| {
                let store = Arc::clone(&store);
                std::thread::spawn(move || {
                    for _ in 0..50 {
                        store.put(
                            &format!("s{}", i % 2),
                            vec![ConversationMessage::user(format!("t{i}"))],
                        );
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }
        // Last writer wins per key; both keys exist and hold one entry.
        assert_eq!(store.session_count(), 2);
        assert_eq!(store.get("s0").len(), 1);
        assert_eq!(store.get("s1").len(), 1);
    }
}
