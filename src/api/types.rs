//! Shared types for the API layer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::auth;
use crate::core_state::CoreState;

// ═══════════════════════════════════════════════════════════
// API context — shared state for the router
// ═══════════════════════════════════════════════════════════

/// Shared context for all routes and middleware. Wraps `CoreState` plus the
/// in-memory session map.
#[derive(Clone)]
pub struct ApiContext {
    pub core: Arc<CoreState>,
    pub sessions: Arc<Mutex<SessionStore>>,
}

impl ApiContext {
    pub fn new(core: Arc<CoreState>) -> Self {
        Self {
            core,
            sessions: Arc::new(Mutex::new(SessionStore::new())),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Doctor context — injected by auth middleware
// ═══════════════════════════════════════════════════════════

/// Authenticated doctor, injected into request extensions by the auth
/// middleware after token validation. All tenant scoping flows from here.
#[derive(Debug, Clone)]
pub struct DoctorContext {
    pub doctor_id: String,
}

// ═══════════════════════════════════════════════════════════
// Session store — opaque bearer tokens issued at login
// ═══════════════════════════════════════════════════════════

/// In-memory map from token hash to doctor id. Only the SHA-256 hash of a
/// token is retained; the raw value exists client-side only. Sessions have
/// no expiry and die with the process.
pub struct SessionStore {
    sessions: HashMap<[u8; 32], String>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self {
            sessions: HashMap::new(),
        }
    }

    /// Issue a fresh token for a doctor and return the raw value.
    pub fn issue(&mut self, doctor_id: &str) -> String {
        let token = auth::generate_token();
        self.sessions
            .insert(auth::hash_token(&token), doctor_id.to_string());
        token
    }

    /// Resolve a raw token to its doctor id.
    pub fn resolve(&self, token: &str) -> Option<String> {
        self.sessions.get(&auth::hash_token(token)).cloned()
    }

    /// Drop a session. Returns whether the token was known.
    pub fn revoke(&mut self, token: &str) -> bool {
        self.sessions.remove(&auth::hash_token(token)).is_some()
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}

impl Default for SessionStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn issue_and_resolve() {
        let mut store = SessionStore::new();
        let token = store.issue("doc-1");
        assert_eq!(store.resolve(&token).as_deref(), Some("doc-1"));
    }

    #[test]
    fn unknown_token_does_not_resolve() {
        let store = SessionStore::new();
        assert!(store.resolve("made-up-token").is_none());
    }

    #[test]
    fn tokens_are_independent_per_login() {
        let mut store = SessionStore::new();
        let t1 = store.issue("doc-1");
        let t2 = store.issue("doc-1");
        assert_ne!(t1, t2);
        assert_eq!(store.len(), 2);
        assert_eq!(store.resolve(&t1).as_deref(), Some("doc-1"));
        assert_eq!(store.resolve(&t2).as_deref(), Some("doc-1"));
    }

    #[test]
    fn revoke_removes_session() {
        let mut store = SessionStore::new();
        let token = store.issue("doc-1");
        assert!(store.revoke(&token));
        assert!(store.resolve(&token).is_none());
        assert!(!store.revoke(&token));
    }
}
