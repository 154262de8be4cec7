//! Token store: the current bearer token, mirrored into durable storage.
//!
//! DESIGN
//! ======
//! The in-memory cell is an `ArcRwSignal` so components re-render when the
//! token changes. Every write goes to durable storage first and then to the
//! cell, inside one synchronous call, so a reload never finds a token that
//! only existed in memory. Storage failures are swallowed: the in-memory
//! value stays authoritative for the current tab.

#[cfg(test)]
#[path = "token_test.rs"]
mod token_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use leptos::prelude::*;

/// Durable storage key holding the raw token string.
pub const TOKEN_STORAGE_KEY: &str = "filebay.token";

/// Best-effort key/value persistence backing the token store.
pub trait TokenStorage: Send + Sync {
    fn load(&self, key: &str) -> Option<String>;
    fn save(&self, key: &str, value: &str);
    fn remove(&self, key: &str);
}

// =============================================================================
// STORAGE BACKENDS
// =============================================================================

/// Process-local storage. Shared through an `Arc`, it outlives any single
/// `TokenStore`, which is how native builds model a page reload.
#[derive(Debug, Default)]
pub struct MemoryStorage {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStorage {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenStorage for MemoryStorage {
    fn load(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn save(&self, key: &str, value: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), value.to_owned());
        }
    }

    fn remove(&self, key: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.remove(key);
        }
    }
}

/// Browser `localStorage`.
#[cfg(feature = "hydrate")]
#[derive(Clone, Copy, Debug, Default)]
pub struct BrowserStorage;

#[cfg(feature = "hydrate")]
impl BrowserStorage {
    fn storage() -> Option<web_sys::Storage> {
        web_sys::window().and_then(|w| w.local_storage().ok().flatten())
    }
}

#[cfg(feature = "hydrate")]
impl TokenStorage for BrowserStorage {
    fn load(&self, key: &str) -> Option<String> {
        Self::storage()?.get_item(key).ok().flatten()
    }

    fn save(&self, key: &str, value: &str) {
        if let Some(storage) = Self::storage() {
            if storage.set_item(key, value).is_err() {
                log::warn!("token persist failed");
            }
        }
    }

    fn remove(&self, key: &str) {
        if let Some(storage) = Self::storage() {
            let _ = storage.remove_item(key);
        }
    }
}

// =============================================================================
// TOKEN STORE
// =============================================================================

/// Reactive token cell backed by [`TokenStorage`].
#[derive(Clone)]
pub struct TokenStore {
    cell: ArcRwSignal<Option<String>>,
    storage: Arc<dyn TokenStorage>,
}

impl TokenStore {
    /// Create an empty store. Nothing is read from storage until
    /// [`TokenStore::load_persisted`] is called.
    #[must_use]
    pub fn new(storage: Arc<dyn TokenStorage>) -> Self {
        Self { cell: ArcRwSignal::new(None), storage }
    }

    /// Current token, tracked by the reactive graph.
    #[must_use]
    pub fn read(&self) -> Option<String> {
        self.cell.get()
    }

    #[must_use]
    pub fn read_untracked(&self) -> Option<String> {
        self.cell.get_untracked()
    }

    /// Whether a token is held, tracked.
    #[must_use]
    pub fn is_present(&self) -> bool {
        self.cell.with(Option::is_some)
    }

    #[must_use]
    pub fn is_present_untracked(&self) -> bool {
        self.cell.with_untracked(Option::is_some)
    }

    /// Replace the current token. `None` removes the persisted entry.
    pub fn write(&self, token: Option<String>) {
        match token.as_deref() {
            Some(value) => self.storage.save(TOKEN_STORAGE_KEY, value),
            None => self.storage.remove(TOKEN_STORAGE_KEY),
        }
        self.cell.set(token);
    }

    /// Token as found in durable storage, ignoring the in-memory cell.
    #[must_use]
    pub fn load_persisted(&self) -> Option<String> {
        self.storage
            .load(TOKEN_STORAGE_KEY)
            .filter(|t| !t.trim().is_empty())
    }
}
