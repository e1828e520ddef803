//! Local blob cache for externalized image payloads.
//!
//! Uploaded image bytes (as data URLs) never travel through the sync channel
//! or the card endpoint. They live in a local store keyed by a minted
//! `img-{cardId}-{uuid}` key; the synced document carries only the key.

#[cfg(test)]
#[path = "cache_test.rs"]
mod cache_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use uuid::Uuid;
use wire::CardId;

/// Key/value store for image data URLs.
///
/// The production app backs this with browser local storage; tests and the
/// native client use [`MemoryStore`].
pub trait BlobStore: Send + Sync {
    /// Fetch a stored data URL by key.
    fn get(&self, key: &str) -> Option<String>;
    /// Store a data URL under a key, replacing any previous value.
    fn put(&self, key: &str, data_url: &str);
}

/// In-memory [`BlobStore`].
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl BlobStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.lock().ok()?.get(key).cloned()
    }

    fn put(&self, key: &str, data_url: &str) {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.to_owned(), data_url.to_owned());
        }
    }
}

/// Image payload cache for one client: mints storage keys and stores the
/// bytes uploads carry.
#[derive(Clone)]
pub struct ImageCache {
    store: Arc<dyn BlobStore>,
}

impl ImageCache {
    #[must_use]
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// In-memory cache, for tests and headless use.
    #[must_use]
    pub fn in_memory() -> Self {
        Self::new(Arc::new(MemoryStore::new()))
    }

    /// Mint a fresh storage key scoped to a card.
    #[must_use]
    pub fn mint_key(card_id: CardId) -> String {
        format!("img-{card_id}-{}", Uuid::new_v4())
    }

    /// Store an uploaded data URL, returning its minted key.
    #[must_use]
    pub fn store_upload(&self, card_id: CardId, data_url: &str) -> String {
        let key = Self::mint_key(card_id);
        self.store.put(&key, data_url);
        key
    }

    /// Resolve a storage key back to its data URL, if this client has the
    /// bytes. Peers that never saw the upload get `None` and render a
    /// placeholder instead.
    #[must_use]
    pub fn resolve(&self, key: &str) -> Option<String> {
        self.store.get(key)
    }
}
