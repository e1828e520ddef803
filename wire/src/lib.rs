//! Shared event model and JSON codec for the realtime card channel.
//!
//! This crate owns the wire representation used by both `server` and
//! `client`. Every message is a single JSON text frame with an `event` name
//! and a `data` payload; element and connector bodies reuse the `canvas`
//! types directly so both ends agree on one serialization.


use canvas::connector::{Connector, ConnectorId};
use canvas::element::{Element, ElementId};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Identifier of a card (one canvas workspace per card).
pub type CardId = Uuid;

/// Error returned by [`encode_event`] and [`decode_event`].
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    /// The event could not be serialized to JSON.
    #[error("failed to encode event: {0}")]
    Encode(#[source] serde_json::Error),
    /// The text frame is not valid JSON or names an unknown event.
    #[error("failed to decode event: {0}")]
    Decode(#[source] serde_json::Error),
}

/// A single message on the realtime card channel, in either direction.
///
/// The same event names flow both ways: a client emits `element:add` and
/// every other viewer of the card receives the identical `element:add`.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", content = "data", rename_all_fields = "camelCase")]
pub enum Event {
    /// Subscribe this connection to the card's room. Always the first frame
    /// a client sends, and re-sent after every reconnect.
    #[serde(rename = "join-card")]
    JoinCard { card_id: CardId },
    /// Full snapshot replace of the card's workspace document.
    #[serde(rename = "workspace:update")]
    WorkspaceUpdate { card_id: CardId, elements: Vec<Element>, connectors: Vec<Connector> },
    /// A new element appeared on the card.
    #[serde(rename = "element:add")]
    ElementAdd { card_id: CardId, element: Element },
    /// Full-element upsert; whatever arrives last wins.
    #[serde(rename = "element:update")]
    ElementUpdate { card_id: CardId, element: Element },
    /// An element was removed. Connectors referencing it are left dangling.
    #[serde(rename = "element:delete")]
    ElementDelete { card_id: CardId, element_id: ElementId },
    /// A new connector appeared on the card.
    #[serde(rename = "connector:add")]
    ConnectorAdd { card_id: CardId, connector: Connector },
    /// A connector was removed.
    #[serde(rename = "connector:delete")]
    ConnectorDelete { card_id: CardId, connector_id: ConnectorId },
    /// Explicit manual save: the full externalized document, persisted by
    /// the server and rebroadcast as a snapshot to every viewer.
    #[serde(rename = "workspace:save")]
    WorkspaceSave { card_id: CardId, elements: Vec<Element>, connectors: Vec<Connector> },
}

impl Event {
    /// The card this event is scoped to.
    #[must_use]
    pub fn card_id(&self) -> CardId {
        match self {
            Self::JoinCard { card_id }
            | Self::WorkspaceUpdate { card_id, .. }
            | Self::ElementAdd { card_id, .. }
            | Self::ElementUpdate { card_id, .. }
            | Self::ElementDelete { card_id, .. }
            | Self::ConnectorAdd { card_id, .. }
            | Self::ConnectorDelete { card_id, .. }
            | Self::WorkspaceSave { card_id, .. } => *card_id,
        }
    }

    /// Wire name of the event, for logging.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::JoinCard { .. } => "join-card",
            Self::WorkspaceUpdate { .. } => "workspace:update",
            Self::ElementAdd { .. } => "element:add",
            Self::ElementUpdate { .. } => "element:update",
            Self::ElementDelete { .. } => "element:delete",
            Self::ConnectorAdd { .. } => "connector:add",
            Self::ConnectorDelete { .. } => "connector:delete",
            Self::WorkspaceSave { .. } => "workspace:save",
        }
    }
}

/// Encode an event into a JSON text frame.
///
/// # Errors
///
/// Returns [`CodecError::Encode`] if serialization fails.
pub fn encode_event(event: &Event) -> Result<String, CodecError> {
    serde_json::to_string(event).map_err(CodecError::Encode)
}

/// Decode a JSON text frame into an event.
///
/// # Errors
///
/// Returns [`CodecError::Decode`] for malformed JSON, unknown event names,
/// or payloads that do not match the named event's shape.
pub fn decode_event(text: &str) -> Result<Event, CodecError> {
    serde_json::from_str(text).map_err(CodecError::Decode)
}
