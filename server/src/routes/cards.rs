//! Card endpoint: workspace document persistence.
//!
//! `GET` returns the card's current document, creating the card on first
//! open. `PUT` replaces the document wholesale (the autosave and manual
//! save path). `DELETE` removes the card for good; every later request
//! for that id answers 404, which is what tells autosaving clients to
//! stop.

#[cfg(test)]
#[path = "cards_test.rs"]
mod cards_test;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use canvas::store::CardDocument;
use tracing::info;
use wire::CardId;

use crate::services::room;
use crate::state::AppState;

pub async fn get_card(State(state): State<AppState>, Path(id): Path<CardId>) -> Response {
    match room::fetch_document(&state, id).await {
        Some(doc) => Json(doc).into_response(),
        None => StatusCode::NOT_FOUND.into_response(),
    }
}

pub async fn put_card(
    State(state): State<AppState>,
    Path(id): Path<CardId>,
    Json(doc): Json<CardDocument>,
) -> Response {
    if room::replace_document(&state, id, doc.clone()).await {
        Json(doc).into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}

pub async fn delete_card(State(state): State<AppState>, Path(id): Path<CardId>) -> Response {
    if room::delete_card(&state, id).await {
        info!(card_id = %id, "card deleted");
        StatusCode::NO_CONTENT.into_response()
    } else {
        StatusCode::NOT_FOUND.into_response()
    }
}
