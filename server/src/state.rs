//! Shared application state.
//!
//! `AppState` is injected into Axum handlers via the `State` extractor. It
//! holds every live card keyed by id: the authoritative workspace document
//! plus the connected viewers' outbound channels. There is no database;
//! the card endpoint and the relay both read and write this map.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use canvas::store::ElementStore;
use tokio::sync::{RwLock, mpsc};
use uuid::Uuid;
use wire::{CardId, Event};

/// Per-card live state: the current document and connected clients.
#[derive(Debug, Default)]
pub struct CardState {
    /// Authoritative workspace state, updated by relayed events and
    /// endpoint writes. Same merge semantics as the clients' stores.
    pub store: ElementStore,
    /// Connected viewers: client id -> sender for outbound events.
    pub clients: HashMap<Uuid, mpsc::Sender<Event>>,
}

#[derive(Clone, Default)]
pub struct AppState {
    /// Live cards by id. A card appears here on first open.
    pub cards: Arc<RwLock<HashMap<CardId, CardState>>>,
    /// Cards that have been deleted. Terminal: a deleted id is never
    /// reopened, and endpoint requests for it return 404 forever.
    pub deleted: Arc<RwLock<HashSet<CardId>>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
