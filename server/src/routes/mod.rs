//! Router assembly.
//!
//! The card endpoint (`/api/cards/{id}`) and the realtime relay (`/api/ws`)
//! share one [`AppState`]; a PUT from an autosaving client and a relayed
//! `workspace:save` both land in the same per-card store.

pub mod cards;
pub mod ws;

use axum::Router;
use axum::routing::get;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::state::AppState;

pub fn app(state: AppState) -> Router {
    let cors = CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any);

    Router::new()
        .route(
            "/api/cards/{id}",
            get(cards::get_card).put(cards::put_card).delete(cards::delete_card),
        )
        .route("/api/ws", get(ws::handle_ws))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
