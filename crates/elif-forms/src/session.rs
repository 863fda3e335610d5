//! Session collaborator used by the CSRF validator

use parking_lot::RwLock;
use std::collections::HashMap;

/// Minimal view of a per-client session.
///
/// Implementations own their own locking; the form layer only performs a
/// single `get` or `set` at a time.
pub trait SessionStore: Send + Sync {
    fn get(&self, key: &str) -> Option<String>;

    fn set(&self, key: &str, value: String);
}

/// In-memory session, one instance per client
#[derive(Debug, Default)]
pub struct MemorySession {
    values: RwLock<HashMap<String, String>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn remove(&self, key: &str) -> Option<String> {
        self.values.write().remove(key)
    }

    pub fn clear(&self) {
        self.values.write().clear();
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> Option<String> {
        self.values.read().get(key).cloned()
    }

    fn set(&self, key: &str, value: String) {
        self.values.write().insert(key.to_string(), value);
    }
}

/// Session for handlers that have none; reads are always empty
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSession;

impl SessionStore for NullSession {
    fn get(&self, _key: &str) -> Option<String> {
        None
    }

    fn set(&self, _key: &str, _value: String) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_session_roundtrip() {
        let session = MemorySession::new();
        assert_eq!(session.get("k"), None);
        session.set("k", "v".to_string());
        assert_eq!(session.get("k").as_deref(), Some("v"));
        assert_eq!(session.remove("k").as_deref(), Some("v"));
        assert_eq!(session.get("k"), None);
    }

    #[test]
    fn test_null_session_forgets() {
        let session = NullSession;
        session.set("k", "v".to_string());
        assert_eq!(session.get("k"), None);
    }
}
