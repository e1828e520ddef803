//! Card room service: membership, event application, and broadcast.
//!
//! Every open card is a room. Handlers relay each client event to the
//! card's other viewers and fold it into the server's authoritative store
//! so late joiners receive current state in their join snapshot. The same
//! store backs the card endpoint's GET/PUT.

#[cfg(test)]
#[path = "room_test.rs"]
mod room_test;

use canvas::store::CardDocument;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;
use wire::{CardId, Event};

use crate::state::AppState;

/// Register a viewer on a card's room, creating the card on first open.
///
/// Returns the current document for the join snapshot, or `None` if the
/// card has been deleted (the join is refused).
pub async fn join_card(
    state: &AppState,
    card_id: CardId,
    client_id: Uuid,
    tx: mpsc::Sender<Event>,
) -> Option<CardDocument> {
    if state.deleted.read().await.contains(&card_id) {
        return None;
    }
    let mut cards = state.cards.write().await;
    let card = cards.entry(card_id).or_default();
    card.clients.insert(client_id, tx);
    Some(card.store.to_document())
}

/// Remove a viewer from a card's room. The document stays live so the
/// next viewer sees it.
pub async fn part_card(state: &AppState, card_id: CardId, client_id: Uuid) {
    let mut cards = state.cards.write().await;
    if let Some(card) = cards.get_mut(&card_id) {
        card.clients.remove(&client_id);
    }
}

/// Fold one relayed event into the card's authoritative store.
///
/// Mirrors the client-side merge: adds upsert, updates drop for absent
/// ids (a delete already won), deletes are no-ops when already gone.
/// Returns `false` if the card is not live.
pub async fn apply_event(state: &AppState, event: &Event) -> bool {
    let mut cards = state.cards.write().await;
    let Some(card) = cards.get_mut(&event.card_id()) else {
        return false;
    };
    match event {
        Event::ElementAdd { element, .. } => card.store.upsert_element(element.clone()),
        Event::ElementUpdate { element, .. } => {
            if card.store.get(element.id()).is_some() {
                card.store.upsert_element(element.clone());
            } else {
                debug!(element_id = element.id(), "dropping update for absent element");
            }
        }
        Event::ElementDelete { element_id, .. } => {
            card.store.remove_element(element_id);
        }
        Event::ConnectorAdd { connector, .. } => card.store.add_connector(connector.clone()),
        Event::ConnectorDelete { connector_id, .. } => {
            card.store.remove_connector(connector_id);
        }
        Event::WorkspaceSave { elements, connectors, .. } | Event::WorkspaceUpdate { elements, connectors, .. } => {
            card.store.replace_all(elements.clone(), connectors.clone());
        }
        Event::JoinCard { .. } => {}
    }
    true
}

/// Send an event to every viewer of a card, excluding `exclude` (usually
/// the sender; it already applied the change optimistically).
pub async fn broadcast(state: &AppState, card_id: CardId, event: &Event, exclude: Option<Uuid>) {
    // Snapshot the senders under the read lock, send outside it.
    let recipients: Vec<(Uuid, mpsc::Sender<Event>)> = {
        let cards = state.cards.read().await;
        let Some(card) = cards.get(&card_id) else { return };
        card.clients
            .iter()
            .filter(|(id, _)| Some(**id) != exclude)
            .map(|(id, tx)| (*id, tx.clone()))
            .collect()
    };

    for (client_id, tx) in recipients {
        if tx.send(event.clone()).await.is_err() {
            warn!(%client_id, "dropping broadcast to closed client channel");
        }
    }
}

/// Current document for the card endpoint's GET, creating the card on
/// first open. `None` means deleted (404).
pub async fn fetch_document(state: &AppState, card_id: CardId) -> Option<CardDocument> {
    if state.deleted.read().await.contains(&card_id) {
        return None;
    }
    let mut cards = state.cards.write().await;
    Some(cards.entry(card_id).or_default().store.to_document())
}

/// Replace the card's document wholesale (endpoint PUT, autosave and
/// manual save). `false` means deleted (404).
pub async fn replace_document(state: &AppState, card_id: CardId, doc: CardDocument) -> bool {
    if state.deleted.read().await.contains(&card_id) {
        return false;
    }
    let mut cards = state.cards.write().await;
    cards.entry(card_id).or_default().store.replace_all(doc.elements, doc.connectors);
    true
}

/// Delete a card for good: drop its live state and remember the id so
/// every later request 404s. Returns `false` if it was already deleted.
pub async fn delete_card(state: &AppState, card_id: CardId) -> bool {
    if !state.deleted.write().await.insert(card_id) {
        return false;
    }
    // Dropping CardState drops the client senders; connected viewers keep
    // their sockets but receive nothing further for this card.
    state.cards.write().await.remove(&card_id);
    true
}
