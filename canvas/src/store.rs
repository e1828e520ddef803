//! In-memory document store for one open card.
//!
//! `ElementStore` is the canonical client-side view of a card's canvas: the
//! ordered element and connector sequences, mutated both by the owning
//! client's interaction handlers and by inbound remote events. Both writers
//! run on the same thread and use the same merge rule — last received write
//! wins, keyed by arrival order — so the store needs no versioning and no
//! locking of its own.

#[cfg(test)]
#[path = "store_test.rs"]
mod store_test;

use serde::{Deserialize, Serialize};

use crate::connector::Connector;
use crate::element::{Element, ElementPatch, Position};
use crate::geometry;

/// The persisted unit: a card's full workspace document.
///
/// Persisted and snapshot-synced wholesale (full replace, never a patch).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CardDocument {
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub connectors: Vec<Connector>,
}

/// A connector whose endpoints both resolve to live elements, with anchor
/// coordinates computed from current geometry.
#[derive(Debug, Clone, Copy)]
pub struct ResolvedConnector<'a> {
    pub connector: &'a Connector,
    pub from: Position,
    pub to: Position,
}

/// Ordered element/connector state for exactly one open card.
#[derive(Debug, Default)]
pub struct ElementStore {
    elements: Vec<Element>,
    connectors: Vec<Connector>,
}

impl ElementStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element. A redelivered add for an existing id replaces that
    /// element in place (preserving order) rather than duplicating it.
    pub fn add_element(&mut self, element: Element) {
        if let Some(existing) = self.elements.iter_mut().find(|e| e.id() == element.id()) {
            *existing = element;
        } else {
            self.elements.push(element);
        }
    }

    /// Merge a sparse patch onto an existing element. Returns `false` (and
    /// drops the update) if the id is absent — a remote update for an
    /// already-deleted element must not resurrect it or error.
    pub fn update_element(&mut self, id: &str, patch: &ElementPatch) -> bool {
        let Some(element) = self.elements.iter_mut().find(|e| e.id() == id) else {
            return false;
        };
        element.apply_patch(patch);
        true
    }

    /// Replace an element wholesale if present, otherwise append it.
    ///
    /// This is the last-write-wins merge used for full-element remote
    /// updates: whatever arrives last is the element's state.
    pub fn upsert_element(&mut self, element: Element) {
        self.add_element(element);
    }

    /// Remove an element by id, returning it if it was present. Absent ids
    /// are a no-op. Connectors referencing the removed element are kept and
    /// become soft-dangling (skipped at render time).
    pub fn remove_element(&mut self, id: &str) -> Option<Element> {
        let index = self.elements.iter().position(|e| e.id() == id)?;
        Some(self.elements.remove(index))
    }

    /// Look up an element by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.id() == id)
    }

    /// Add a connector; a duplicate id replaces in place.
    pub fn add_connector(&mut self, connector: Connector) {
        if let Some(existing) = self.connectors.iter_mut().find(|c| c.id == connector.id) {
            *existing = connector;
        } else {
            self.connectors.push(connector);
        }
    }

    /// Remove a connector by id; absent ids are a no-op.
    pub fn remove_connector(&mut self, id: &str) -> Option<Connector> {
        let index = self.connectors.iter().position(|c| c.id == id)?;
        Some(self.connectors.remove(index))
    }

    /// Full document replace, used when (re)joining a card or receiving a
    /// workspace snapshot.
    pub fn replace_all(&mut self, elements: Vec<Element>, connectors: Vec<Connector>) {
        self.elements = elements;
        self.connectors = connectors;
    }

    /// The ordered element sequence.
    #[must_use]
    pub fn elements(&self) -> &[Element] {
        &self.elements
    }

    /// The ordered connector sequence, dangling references included.
    #[must_use]
    pub fn connectors(&self) -> &[Connector] {
        &self.connectors
    }

    /// Connectors whose endpoints both exist, with anchor coordinates
    /// recomputed from live element geometry. Dangling connectors are
    /// silently skipped, never an error.
    #[must_use]
    pub fn resolved_connectors(&self) -> Vec<ResolvedConnector<'_>> {
        self.connectors
            .iter()
            .filter_map(|connector| {
                let from_el = self.get(&connector.from.element_id)?;
                let to_el = self.get(&connector.to.element_id)?;
                Some(ResolvedConnector {
                    connector,
                    from: geometry::anchor_point(from_el.position(), from_el.size(), connector.from.anchor),
                    to: geometry::anchor_point(to_el.position(), to_el.size(), connector.to.anchor),
                })
            })
            .collect()
    }

    /// Clone the current state into a persistable document.
    #[must_use]
    pub fn to_document(&self) -> CardDocument {
        CardDocument { elements: self.elements.clone(), connectors: self.connectors.clone() }
    }

    /// Number of elements currently in the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns `true` if the store holds no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }
}
