//! Process-scoped session state.
//!
//! The bearer token lives behind the `SessionStore` trait so `ApiClient` and
//! the services receive it by injection. The app starts with no token; a
//! successful login, registration or social verification installs one; logout
//! or any 401 response clears it. At most one token is active at a time.

use std::fmt;
use std::sync::{PoisonError, RwLock};

pub trait SessionStore: Send + Sync + fmt::Debug {
    fn get(&self) -> Option<String>;

    /// Replace the active token.
    fn set(&self, token: String);

    fn clear(&self);

    /// Clear only while `token` is still the active one. Returns whether the
    /// session was cleared.
    fn clear_if(&self, token: &str) -> bool {
        if self.get().as_deref() != Some(token) {
            return false;
        }
        self.clear();
        true
    }

    fn is_authenticated(&self) -> bool {
        self.get().is_some()
    }
}

/// In-memory store; nothing survives the process.
#[derive(Default)]
pub struct MemorySessionStore {
    token: RwLock<Option<String>>,
}

impl MemorySessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl fmt::Debug for MemorySessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemorySessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}

impl SessionStore for MemorySessionStore {
    fn get(&self) -> Option<String> {
        self.token
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set(&self, token: String) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    fn clear(&self) {
        *self.token.write().unwrap_or_else(PoisonError::into_inner) = None;
    }

    fn clear_if(&self, token: &str) -> bool {
        let mut current = self.token.write().unwrap_or_else(PoisonError::into_inner);
        if current.as_deref() != Some(token) {
            return false;
        }
        *current = None;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_without_token() {
        let store = MemorySessionStore::new();
        assert_eq!(store.get(), None);
        assert!(!store.is_authenticated());
    }

    #[test]
    fn set_replaces_previous_token() {
        let store = MemorySessionStore::new();
        store.set("first".to_string());
        store.set("second".to_string());
        assert_eq!(store.get().as_deref(), Some("second"));
        store.clear();
        assert_eq!(store.get(), None);
    }

    #[test]
    fn clear_if_only_matches_active_token() {
        let store = MemorySessionStore::new();
        assert!(!store.clear_if("anything"));

        store.set("fresh".to_string());
        assert!(!store.clear_if("stale"));
        assert_eq!(store.get().as_deref(), Some("fresh"));

        assert!(store.clear_if("fresh"));
        assert_eq!(store.get(), None);
    }

    #[test]
    fn debug_output_hides_token() {
        let store = MemorySessionStore::new();
        store.set("secret-token".to_string());
        let rendered = format!("{store:?}");
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("authenticated: true"));
    }
}
