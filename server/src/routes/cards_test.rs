use axum::body::to_bytes;
use canvas::element::{Element, Position};
use uuid::Uuid;

use super::*;

async fn body_doc(response: Response) -> CardDocument {
    let bytes = to_bytes(response.into_body(), 1 << 20).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn doc_with_text(id: &str) -> CardDocument {
    CardDocument { elements: vec![Element::new_text(id, Position::new(1.0, 2.0))], connectors: vec![] }
}

#[tokio::test]
async fn get_creates_card_on_first_open() {
    let state = AppState::new();
    let response = get_card(State(state), Path(Uuid::new_v4())).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_doc(response).await, CardDocument::default());
}

#[tokio::test]
async fn put_then_get_roundtrips() {
    let state = AppState::new();
    let id = Uuid::new_v4();
    let doc = doc_with_text("text-1");

    let response = put_card(State(state.clone()), Path(id), Json(doc.clone())).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_card(State(state), Path(id)).await;
    assert_eq!(body_doc(response).await, doc);
}

#[tokio::test]
async fn put_replaces_rather_than_merges() {
    let state = AppState::new();
    let id = Uuid::new_v4();
    let _ = put_card(State(state.clone()), Path(id), Json(doc_with_text("old"))).await;
    let _ = put_card(State(state.clone()), Path(id), Json(doc_with_text("new"))).await;

    let doc = body_doc(get_card(State(state), Path(id)).await).await;
    assert_eq!(doc.elements.len(), 1);
    assert_eq!(doc.elements[0].id(), "new");
}

#[tokio::test]
async fn deleted_card_answers_404_everywhere() {
    let state = AppState::new();
    let id = Uuid::new_v4();
    let _ = get_card(State(state.clone()), Path(id)).await;

    let response = delete_card(State(state.clone()), Path(id)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    assert_eq!(get_card(State(state.clone()), Path(id)).await.status(), StatusCode::NOT_FOUND);
    assert_eq!(
        put_card(State(state.clone()), Path(id), Json(CardDocument::default())).await.status(),
        StatusCode::NOT_FOUND
    );
    assert_eq!(delete_card(State(state), Path(id)).await.status(), StatusCode::NOT_FOUND);
}
