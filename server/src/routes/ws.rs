//! WebSocket handler: per-card event relay.
//!
//! On upgrade the connection enters a `select!` loop over two sources:
//! decoded client events, and broadcasts from card peers. `join-card`
//! subscribes the connection to one card's room and answers with a full
//! `workspace:update` snapshot; every other event is folded into the
//! card's authoritative store and relayed to the other viewers, sender
//! excluded (the sender already applied it optimistically).

#[cfg(test)]
#[path = "ws_test.rs"]
mod ws_test;

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;
use wire::{CardId, Event, decode_event, encode_event};

use crate::services::room;
use crate::state::AppState;

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let client_id = Uuid::new_v4();

    // Per-connection channel for broadcasts from card peers.
    let (client_tx, mut client_rx) = mpsc::channel::<Event>(256);
    let mut current_card: Option<CardId> = None;

    info!(%client_id, "ws: client connected");

    loop {
        tokio::select! {
            msg = socket.recv() => {
                let Some(Ok(msg)) = msg else { break };
                match msg {
                    Message::Text(text) => {
                        let done = handle_frame(&state, &mut socket, &mut current_card, client_id, &client_tx, &text)
                            .await
                            .is_err();
                        if done {
                            break;
                        }
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            Some(event) = client_rx.recv() => {
                if send_event(&mut socket, &event).await.is_err() {
                    break;
                }
            }
        }
    }

    if let Some(card_id) = current_card {
        room::part_card(&state, card_id, client_id).await;
    }
    info!(%client_id, "ws: client disconnected");
}

/// Handle one inbound text frame. `Err` means the socket is dead.
async fn handle_frame(
    state: &AppState,
    socket: &mut WebSocket,
    current_card: &mut Option<CardId>,
    client_id: Uuid,
    client_tx: &mpsc::Sender<Event>,
    text: &str,
) -> Result<(), ()> {
    let event = match decode_event(text) {
        Ok(event) => event,
        Err(e) => {
            warn!(%client_id, error = %e, "dropping undecodable frame");
            return Ok(());
        }
    };

    match event {
        Event::JoinCard { card_id } => {
            if let Some(previous) = current_card.take() {
                room::part_card(state, previous, client_id).await;
            }
            match room::join_card(state, card_id, client_id, client_tx.clone()).await {
                Some(doc) => {
                    *current_card = Some(card_id);
                    let snapshot =
                        Event::WorkspaceUpdate { card_id, elements: doc.elements, connectors: doc.connectors };
                    send_event(socket, &snapshot).await?;
                }
                None => {
                    warn!(%client_id, %card_id, "join refused: card deleted");
                }
            }
        }
        event => {
            if *current_card != Some(event.card_id()) {
                warn!(%client_id, event = event.name(), "dropping event for unjoined card");
                return Ok(());
            }
            if room::apply_event(state, &event).await {
                room::broadcast(state, event.card_id(), &event, Some(client_id)).await;
            }
        }
    }

    Ok(())
}

/// Send one event to this connection. `Err` means the socket is dead.
async fn send_event(socket: &mut WebSocket, event: &Event) -> Result<(), ()> {
    let text = match encode_event(event) {
        Ok(text) => text,
        Err(e) => {
            warn!(error = %e, event = event.name(), "dropping unencodable event");
            return Ok(());
        }
    };
    socket.send(Message::Text(text.into())).await.map_err(|_| ())
}
