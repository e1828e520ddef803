//! Document model and geometry for the per-card canvas workspace.
//!
//! This crate is pure: it owns the element/connector types that make up a
//! card's workspace document, the in-memory store that holds one open card's
//! live state, and the geometry functions that drive drag/resize gestures and
//! connector anchoring. It performs no I/O and knows nothing about the wire
//! protocol or persistence; the `client` and `server` crates build on it.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`element`] | Element union (text/shape/image) and sparse patches |
//! | [`connector`] | Connectors, endpoints, and side anchors |
//! | [`store`] | In-memory document store for one open card |
//! | [`geometry`] | Bounds-constrained drag/resize and anchor points |
//! | [`consts`] | Canvas extents, minimum sizes, hit tolerances |

pub mod connector;
pub mod consts;
pub mod element;
pub mod geometry;
pub mod store;
