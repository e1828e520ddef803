use canvas::element::{Element, Position, ShapeKind};
use tokio::time::{Duration, timeout};

use super::*;

fn card() -> CardId {
    Uuid::new_v4()
}

fn shape(id: &str) -> Element {
    Element::new_shape(id, ShapeKind::Rectangle, Position::new(300.0, 200.0))
}

async fn joined_client(state: &AppState, card_id: CardId) -> (Uuid, mpsc::Receiver<Event>) {
    let client_id = Uuid::new_v4();
    let (tx, rx) = mpsc::channel(16);
    join_card(state, card_id, client_id, tx).await.expect("join refused");
    (client_id, rx)
}

async fn recv(rx: &mut mpsc::Receiver<Event>) -> Event {
    timeout(Duration::from_millis(500), rx.recv())
        .await
        .expect("broadcast receive timed out")
        .expect("broadcast channel closed unexpectedly")
}

async fn assert_silent(rx: &mut mpsc::Receiver<Event>) {
    assert!(timeout(Duration::from_millis(80), rx.recv()).await.is_err(), "expected no broadcast");
}

#[tokio::test]
async fn first_join_creates_card_with_empty_snapshot() {
    let state = AppState::new();
    let card_id = card();
    let (_, _rx) = joined_client(&state, card_id).await;

    let snapshot = join_card(&state, card_id, Uuid::new_v4(), mpsc::channel(16).0).await.unwrap();
    assert!(snapshot.elements.is_empty());
    assert!(snapshot.connectors.is_empty());
}

#[tokio::test]
async fn late_joiner_sees_applied_events() {
    let state = AppState::new();
    let card_id = card();
    let (_, _rx) = joined_client(&state, card_id).await;

    assert!(apply_event(&state, &Event::ElementAdd { card_id, element: shape("shape-1") }).await);

    let snapshot = join_card(&state, card_id, Uuid::new_v4(), mpsc::channel(16).0).await.unwrap();
    assert_eq!(snapshot.elements.len(), 1);
    assert_eq!(snapshot.elements[0].id(), "shape-1");
}

#[tokio::test]
async fn broadcast_excludes_sender() {
    let state = AppState::new();
    let card_id = card();
    let (sender_id, mut sender_rx) = joined_client(&state, card_id).await;
    let (_, mut peer_rx) = joined_client(&state, card_id).await;

    let event = Event::ElementAdd { card_id, element: shape("shape-1") };
    broadcast(&state, card_id, &event, Some(sender_id)).await;

    assert_eq!(recv(&mut peer_rx).await, event);
    assert_silent(&mut sender_rx).await;
}

#[tokio::test]
async fn broadcast_is_scoped_to_the_card() {
    let state = AppState::new();
    let card_a = card();
    let card_b = card();
    let (_, _a) = joined_client(&state, card_a).await;
    let (_, mut b_rx) = joined_client(&state, card_b).await;

    broadcast(&state, card_a, &Event::ElementDelete { card_id: card_a, element_id: "x".to_owned() }, None).await;
    assert_silent(&mut b_rx).await;
}

#[tokio::test]
async fn update_for_deleted_element_does_not_resurrect() {
    let state = AppState::new();
    let card_id = card();
    let (_, _rx) = joined_client(&state, card_id).await;

    apply_event(&state, &Event::ElementAdd { card_id, element: shape("shape-1") }).await;
    apply_event(&state, &Event::ElementDelete { card_id, element_id: "shape-1".to_owned() }).await;
    apply_event(&state, &Event::ElementUpdate { card_id, element: shape("shape-1") }).await;

    let doc = fetch_document(&state, card_id).await.unwrap();
    assert!(doc.elements.is_empty());
}

#[tokio::test]
async fn workspace_save_replaces_document() {
    let state = AppState::new();
    let card_id = card();
    let (_, _rx) = joined_client(&state, card_id).await;
    apply_event(&state, &Event::ElementAdd { card_id, element: shape("old") }).await;

    apply_event(
        &state,
        &Event::WorkspaceSave { card_id, elements: vec![shape("new")], connectors: vec![] },
    )
    .await;

    let doc = fetch_document(&state, card_id).await.unwrap();
    assert_eq!(doc.elements.len(), 1);
    assert_eq!(doc.elements[0].id(), "new");
}

#[tokio::test]
async fn part_keeps_the_document_live() {
    let state = AppState::new();
    let card_id = card();
    let (client_id, _rx) = joined_client(&state, card_id).await;
    apply_event(&state, &Event::ElementAdd { card_id, element: shape("shape-1") }).await;

    part_card(&state, card_id, client_id).await;

    let doc = fetch_document(&state, card_id).await.unwrap();
    assert_eq!(doc.elements.len(), 1);
}

#[tokio::test]
async fn endpoint_put_then_get_roundtrip() {
    let state = AppState::new();
    let card_id = card();
    let doc = CardDocument { elements: vec![shape("shape-1")], connectors: vec![] };

    assert!(replace_document(&state, card_id, doc.clone()).await);
    assert_eq!(fetch_document(&state, card_id).await.unwrap(), doc);
}

#[tokio::test]
async fn delete_is_terminal() {
    let state = AppState::new();
    let card_id = card();
    let (_, _rx) = joined_client(&state, card_id).await;

    assert!(delete_card(&state, card_id).await);
    assert!(!delete_card(&state, card_id).await);

    assert!(fetch_document(&state, card_id).await.is_none());
    assert!(!replace_document(&state, card_id, CardDocument::default()).await);
    assert!(join_card(&state, card_id, Uuid::new_v4(), mpsc::channel(16).0).await.is_none());
    assert!(!apply_event(&state, &Event::ElementAdd { card_id, element: shape("s") }).await);
}
