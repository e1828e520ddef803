//! Connectors: directed visual links between two elements' anchor points.
//!
//! An endpoint names an element and one of its four sides; the actual line
//! coordinates are recomputed from live element geometry at render time (see
//! [`crate::geometry::anchor_point`]), so connectors survive their endpoints
//! moving or resizing. A connector whose endpoint element no longer exists is
//! kept in the document but simply not rendered.

#[cfg(test)]
#[path = "connector_test.rs"]
mod connector_test;

use serde::{Deserialize, Serialize};

use crate::element::ElementId;

/// Unique identifier for a connector. Caller-generated, unique per card.
pub type ConnectorId = String;

/// Which side-midpoint of an element's bounding box an endpoint attaches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Anchor {
    Top,
    Right,
    Bottom,
    Left,
}

/// One end of a connector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Endpoint {
    pub element_id: ElementId,
    pub anchor: Anchor,
}

impl Endpoint {
    #[must_use]
    pub fn new(element_id: impl Into<ElementId>, anchor: Anchor) -> Self {
        Self { element_id: element_id.into(), anchor }
    }
}

/// Line rendering kind. Only straight lines exist today.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineKind {
    Straight,
}

/// Visual style of a connector line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConnectorStyle {
    #[serde(rename = "type")]
    pub kind: LineKind,
    pub color: String,
    pub width: f64,
}

impl Default for ConnectorStyle {
    fn default() -> Self {
        Self { kind: LineKind::Straight, color: "#8b5cf6".to_owned(), width: 2.0 }
    }
}

/// A directed link between two elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connector {
    pub id: ConnectorId,
    pub from: Endpoint,
    pub to: Endpoint,
    #[serde(default)]
    pub style: ConnectorStyle,
}

impl Connector {
    #[must_use]
    pub fn new(id: impl Into<ConnectorId>, from: Endpoint, to: Endpoint) -> Self {
        Self { id: id.into(), from, to, style: ConnectorStyle::default() }
    }
}
