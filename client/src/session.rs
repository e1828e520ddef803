//! `WorkspaceSession`: one client's live view of one open card.
//!
//! The session owns the element store and wires the other pieces together.
//! Local mutations apply optimistically (the store changes before any
//! network round-trip), broadcast to peers through the sync channel, and
//! schedule a debounced autosave. Remote events merge in last-write-wins.
//! Drag/resize gestures mutate only local state while the pointer moves
//! and broadcast a single full-element update when the gesture ends.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::sync::{Arc, Mutex};
use std::time::Instant;

use canvas::connector::{Connector, ConnectorId, Endpoint};
use canvas::consts::{FONT_SIZE_MAX, FONT_SIZE_MIN};
use canvas::element::{Element, ElementId, ElementPatch, Position, ShapeKind};
use canvas::geometry::{self, ResizeHandle};
use canvas::store::ElementStore;
use tracing::{debug, warn};
use uuid::Uuid;
use wire::{CardId, Event};

use crate::api::{ApiError, CardApi};
use crate::autosave::AutosaveScheduler;
use crate::cache::ImageCache;
use crate::channel::{ChannelNotice, SyncChannelHandle};
use crate::payload;

/// Outbound side of the sync channel, as the session sees it. The trait
/// seam lets tests record emissions instead of opening a socket.
pub trait EventSink: Send + Sync {
    /// Hand an event to the channel; `false` means the channel is gone.
    fn emit(&self, event: Event) -> bool;
}

impl EventSink for SyncChannelHandle {
    fn emit(&self, event: Event) -> bool {
        SyncChannelHandle::emit(self, event)
    }
}

/// Error returned by session operations that touch the card endpoint.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The card no longer exists. Terminal: the session stops persisting.
    #[error("card was deleted")]
    CardDeleted,
    /// Transient endpoint failure.
    #[error(transparent)]
    Api(#[from] ApiError),
}

/// An in-flight drag or resize, snapshotted at pointer-down.
#[derive(Debug, Clone)]
struct Gesture {
    element_id: ElementId,
    start: Position,
    start_size: canvas::element::Size,
    kind: GestureKind,
}

#[derive(Debug, Clone, Copy)]
enum GestureKind {
    Drag,
    Resize(ResizeHandle),
}

/// One client's live workspace for one card.
pub struct WorkspaceSession {
    card_id: CardId,
    store: ElementStore,
    sink: Box<dyn EventSink>,
    autosave: Arc<Mutex<AutosaveScheduler>>,
    cache: ImageCache,
    gesture: Option<Gesture>,
    deleted: bool,
}

impl WorkspaceSession {
    #[must_use]
    pub fn new(
        card_id: CardId,
        sink: Box<dyn EventSink>,
        autosave: Arc<Mutex<AutosaveScheduler>>,
        cache: ImageCache,
    ) -> Self {
        Self { card_id, store: ElementStore::new(), sink, autosave, cache, gesture: None, deleted: false }
    }

    #[must_use]
    pub fn card_id(&self) -> CardId {
        self.card_id
    }

    /// The live document.
    #[must_use]
    pub fn store(&self) -> &ElementStore {
        &self.store
    }

    /// Fetch the saved document from the card endpoint and replace local
    /// state with it, rehydrating cached image payloads.
    ///
    /// # Errors
    ///
    /// [`SessionError::CardDeleted`] if the card no longer exists; the
    /// session stops persisting for good.
    pub async fn load(&mut self, api: &dyn CardApi) -> Result<(), SessionError> {
        let mut doc = match api.fetch_workspace(self.card_id).await {
            Ok(doc) => doc,
            Err(ApiError::NotFound) => return Err(self.mark_deleted()),
            Err(e) => return Err(e.into()),
        };
        payload::internalize_document(&mut doc, &self.cache);
        self.store.replace_all(doc.elements, doc.connectors);
        Ok(())
    }

    // ===== local mutations (optimistic apply + broadcast + autosave) =====

    /// Create a text element at `position`. Returns its id.
    pub fn add_text(&mut self, position: Position) -> ElementId {
        self.add_element(Element::new_text(mint_id("text"), position))
    }

    /// Create a shape element at `position`. Returns its id.
    pub fn add_shape(&mut self, kind: ShapeKind, position: Position) -> ElementId {
        self.add_element(Element::new_shape(mint_id("shape"), kind, position))
    }

    /// Create an image element from a remote URL. Returns its id.
    pub fn add_image_from_url(&mut self, url: impl Into<String>, position: Position) -> ElementId {
        self.add_element(Element::new_image_url(mint_id("image"), url, position))
    }

    /// Create an image element from uploaded bytes (a data URL). The bytes
    /// go into the local cache; peers receive only the storage key.
    pub fn add_image_upload(&mut self, data_url: &str, position: Position) -> ElementId {
        let key = self.cache.store_upload(self.card_id, data_url);
        self.add_element(Element::new_image_upload(mint_id("image"), data_url, key, position))
    }

    fn add_element(&mut self, element: Element) -> ElementId {
        let id = element.id().to_owned();
        let outbound = payload::externalize_element(&element);
        self.store.add_element(element);
        self.emit(Event::ElementAdd { card_id: self.card_id, element: outbound });
        self.schedule_autosave();
        id
    }

    /// Merge a sparse patch onto an element and broadcast the result as a
    /// full-element update. Font sizes are clamped to the editable range.
    /// Returns `false` (dropping the patch) if the element is gone.
    pub fn update_element(&mut self, id: &str, mut patch: ElementPatch) -> bool {
        if let Some(font_size) = patch.font_size {
            patch.font_size = Some(font_size.clamp(FONT_SIZE_MIN, FONT_SIZE_MAX));
        }
        if !self.store.update_element(id, &patch) {
            return false;
        }
        self.broadcast_element(id);
        self.schedule_autosave();
        true
    }

    /// Delete an element. Connectors that referenced it stay in the
    /// document and simply stop rendering.
    pub fn delete_element(&mut self, id: &str) -> bool {
        if self.store.remove_element(id).is_none() {
            return false;
        }
        self.emit(Event::ElementDelete { card_id: self.card_id, element_id: id.to_owned() });
        self.schedule_autosave();
        true
    }

    /// Create a connector between two element anchors. Returns its id.
    pub fn add_connector(&mut self, from: Endpoint, to: Endpoint) -> ConnectorId {
        let connector = Connector::new(mint_id("connector"), from, to);
        let id = connector.id.clone();
        self.store.add_connector(connector.clone());
        self.emit(Event::ConnectorAdd { card_id: self.card_id, connector });
        self.schedule_autosave();
        id
    }

    /// Delete a connector.
    pub fn delete_connector(&mut self, id: &str) -> bool {
        if self.store.remove_connector(id).is_none() {
            return false;
        }
        self.emit(Event::ConnectorDelete { card_id: self.card_id, connector_id: id.to_owned() });
        self.schedule_autosave();
        true
    }

    // ===== gestures =====

    /// Start dragging an element. Returns `false` if it does not exist.
    pub fn begin_drag(&mut self, element_id: &str) -> bool {
        self.begin_gesture(element_id, GestureKind::Drag)
    }

    /// Start resizing if `pointer` is on one of the element's eight
    /// handles. Returns the handle hit, if any.
    pub fn begin_resize(&mut self, element_id: &str, pointer: Position) -> Option<ResizeHandle> {
        let element = self.store.get(element_id)?;
        let handle = geometry::resolve_resize_handle(element.position(), element.size(), pointer)?;
        self.begin_gesture(element_id, GestureKind::Resize(handle));
        Some(handle)
    }

    fn begin_gesture(&mut self, element_id: &str, kind: GestureKind) -> bool {
        let Some(element) = self.store.get(element_id) else {
            return false;
        };
        self.gesture = Some(Gesture {
            element_id: element_id.to_owned(),
            start: element.position(),
            start_size: element.size(),
            kind,
        });
        true
    }

    /// Apply the gesture at the current total pointer delta. Local-only:
    /// nothing is broadcast until the gesture ends.
    pub fn pointer_moved(&mut self, delta_x: f64, delta_y: f64) {
        let Some(gesture) = self.gesture.clone() else {
            return;
        };
        let patch = match gesture.kind {
            GestureKind::Drag => ElementPatch {
                position: Some(geometry::apply_drag(gesture.start, gesture.start_size, delta_x, delta_y)),
                ..Default::default()
            },
            GestureKind::Resize(handle) => {
                let (position, size) =
                    geometry::apply_resize(gesture.start, gesture.start_size, handle, delta_x, delta_y);
                ElementPatch { position: Some(position), size: Some(size), ..Default::default() }
            }
        };
        self.store.update_element(&gesture.element_id, &patch);
    }

    /// Finish the gesture: broadcast the element's final state once and
    /// schedule an autosave.
    pub fn end_gesture(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        if self.store.get(&gesture.element_id).is_some() {
            self.broadcast_element(&gesture.element_id);
            self.schedule_autosave();
        }
    }

    // ===== remote merge =====

    /// Merge one inbound event. Events scoped to a different card are
    /// dropped. Updates for elements deleted locally are dropped too;
    /// last write wins, and the delete already happened here.
    pub fn apply_remote(&mut self, event: Event) {
        if event.card_id() != self.card_id {
            debug!(event = event.name(), "dropping event for another card");
            return;
        }
        match event {
            Event::WorkspaceUpdate { elements, connectors, .. } | Event::WorkspaceSave { elements, connectors, .. } => {
                let mut doc = canvas::store::CardDocument { elements, connectors };
                payload::internalize_document(&mut doc, &self.cache);
                self.store.replace_all(doc.elements, doc.connectors);
            }
            Event::ElementAdd { mut element, .. } => {
                payload::internalize_element(&mut element, &self.cache);
                self.store.upsert_element(element);
            }
            Event::ElementUpdate { mut element, .. } => {
                // An update for an element deleted here must not resurrect
                // it; the delete was the later local write.
                if self.store.get(element.id()).is_none() {
                    return;
                }
                payload::internalize_element(&mut element, &self.cache);
                self.store.upsert_element(element);
            }
            Event::ElementDelete { element_id, .. } => {
                self.store.remove_element(&element_id);
            }
            Event::ConnectorAdd { connector, .. } => {
                self.store.add_connector(connector);
            }
            Event::ConnectorDelete { connector_id, .. } => {
                self.store.remove_connector(&connector_id);
            }
            Event::JoinCard { .. } => {}
        }
    }

    /// React to one transport notice. Reconnects re-fetch the snapshot,
    /// since broadcasts were missed while offline.
    pub async fn handle_notice(&mut self, notice: ChannelNotice, api: &dyn CardApi) -> Result<(), SessionError> {
        match notice {
            ChannelNotice::Event(event) => {
                self.apply_remote(event);
                Ok(())
            }
            ChannelNotice::Connected { reconnect: true } => self.load(api).await,
            ChannelNotice::Connected { reconnect: false } | ChannelNotice::Disconnected => Ok(()),
            ChannelNotice::GaveUp => {
                warn!(card_id = %self.card_id, "sync channel gave up; edits are local-only");
                Ok(())
            }
        }
    }

    // ===== persistence =====

    /// Save immediately, bypassing the debounce window, and broadcast the
    /// saved document so every viewer snaps to it.
    ///
    /// # Errors
    ///
    /// [`SessionError::CardDeleted`] if the card is gone (terminal).
    pub async fn save_now(&mut self, api: &dyn CardApi) -> Result<(), SessionError> {
        if self.deleted {
            return Err(SessionError::CardDeleted);
        }
        let doc = payload::externalize_document(&self.store.to_document());
        match api.save_workspace(self.card_id, &doc).await {
            Ok(()) => {}
            Err(ApiError::NotFound) => return Err(self.mark_deleted()),
            Err(e) => return Err(e.into()),
        }
        self.emit(Event::WorkspaceSave { card_id: self.card_id, elements: doc.elements, connectors: doc.connectors });
        if let Ok(mut autosave) = self.autosave.lock() {
            autosave.cancel();
        }
        Ok(())
    }

    /// Whether the card has been deleted out from under this session.
    #[must_use]
    pub fn is_deleted(&self) -> bool {
        self.deleted
    }

    fn mark_deleted(&mut self) -> SessionError {
        self.deleted = true;
        if let Ok(mut autosave) = self.autosave.lock() {
            autosave.disable();
        }
        SessionError::CardDeleted
    }

    fn broadcast_element(&self, id: &str) {
        if let Some(element) = self.store.get(id) {
            let outbound = payload::externalize_element(element);
            self.emit(Event::ElementUpdate { card_id: self.card_id, element: outbound });
        }
    }

    fn emit(&self, event: Event) {
        if !self.sink.emit(event) {
            warn!(card_id = %self.card_id, "sync channel closed; event dropped");
        }
    }

    fn schedule_autosave(&self) {
        let doc = payload::externalize_document(&self.store.to_document());
        if let Ok(mut autosave) = self.autosave.lock() {
            autosave.schedule(doc, Instant::now());
        }
    }
}

fn mint_id(prefix: &str) -> String {
    format!("{prefix}-{}", Uuid::new_v4())
}
