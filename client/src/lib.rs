//! Client-side workspace engine for realtime card canvases.
//!
//! This crate drives one open card from the client's side: it holds the live
//! document (via `canvas`), talks the `wire` protocol over a WebSocket with
//! reconnect, debounces autosaves to the card endpoint, and externalizes
//! large image payloads so they never travel through the sync channel.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`session`] | `WorkspaceSession`: optimistic local mutation + remote merge |
//! | [`channel`] | Sync channel: queueing core + WebSocket transport |
//! | [`autosave`] | Trailing-edge debounced persistence scheduler |
//! | [`payload`] | Inline-payload externalization for image elements |
//! | [`cache`] | Local blob cache for externalized image bytes |
//! | [`api`] | Card endpoint client (fetch/save workspace documents) |

pub mod api;
pub mod autosave;
pub mod cache;
pub mod channel;
pub mod payload;
pub mod session;
