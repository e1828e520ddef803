//! Element model: the tagged union of visual objects on a card canvas.
//!
//! Elements are a closed set of three kinds — text, shape, image — with
//! common placement fields (`id`, `position`, `size`) on every variant.
//! Consumers match exhaustively; there is no open-ended property bag.
//!
//! On the wire and in the persisted document an element serializes with a
//! lowercase `type` discriminant and camelCase field names (`fontSize`,
//! `strokeColor`, `storageKey`), matching what peers and the card endpoint
//! exchange.

#[cfg(test)]
#[path = "element_test.rs"]
mod element_test;

use serde::{Deserialize, Serialize};

/// Unique identifier for a workspace element. Caller-generated strings like
/// `"text-1694791"`; must be unique within one card.
pub type ElementId = String;

/// A point in canvas space.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub x: f64,
    pub y: f64,
}

impl Position {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Bounding-box dimensions of an element.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    #[must_use]
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }
}

/// Shape variant of a shape element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Triangle,
    Diamond,
}

/// A single positioned visual object on the canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase", rename_all_fields = "camelCase")]
pub enum Element {
    /// Freeform text block.
    Text {
        id: ElementId,
        position: Position,
        size: Size,
        content: String,
        font_size: f64,
        color: String,
        bold: bool,
        italic: bool,
        underline: bool,
    },
    /// Stroked/filled shape with an optional centered caption.
    Shape {
        id: ElementId,
        position: Position,
        size: Size,
        shape: ShapeKind,
        stroke_color: String,
        stroke_width: f64,
        fill: String,
        #[serde(default)]
        caption: String,
        /// Reserved; carried through serialization but not yet applied.
        #[serde(default)]
        rotation: f64,
    },
    /// Image sourced by direct URL or by an externalized upload.
    ///
    /// `storage_key`, when present, is authoritative for resolving display
    /// bytes; `url` then holds either the rehydrated data URL (local display)
    /// or the key/placeholder token (externalized form).
    Image {
        id: ElementId,
        position: Position,
        size: Size,
        #[serde(skip_serializing_if = "Option::is_none")]
        url: Option<String>,
        #[serde(skip_serializing_if = "Option::is_none")]
        storage_key: Option<String>,
    },
}

impl Element {
    /// Text element with the stock creation defaults.
    #[must_use]
    pub fn new_text(id: impl Into<ElementId>, position: Position) -> Self {
        Self::Text {
            id: id.into(),
            position,
            size: Size::new(250.0, 80.0),
            content: "Double-click to edit".to_owned(),
            font_size: 16.0,
            color: "#ffffff".to_owned(),
            bold: false,
            italic: false,
            underline: false,
        }
    }

    /// Shape element with the stock creation defaults.
    #[must_use]
    pub fn new_shape(id: impl Into<ElementId>, shape: ShapeKind, position: Position) -> Self {
        Self::Shape {
            id: id.into(),
            position,
            size: Size::new(200.0, 150.0),
            shape,
            stroke_color: "#8b5cf6".to_owned(),
            stroke_width: 3.0,
            fill: "rgba(139, 92, 246, 0.1)".to_owned(),
            caption: String::new(),
            rotation: 0.0,
        }
    }

    /// Image element sourced by direct URL (no externalized payload).
    #[must_use]
    pub fn new_image_url(id: impl Into<ElementId>, url: impl Into<String>, position: Position) -> Self {
        Self::Image {
            id: id.into(),
            position,
            size: Size::new(300.0, 300.0),
            url: Some(url.into()),
            storage_key: None,
        }
    }

    /// Image element from a local upload: inline payload for immediate
    /// display plus the reference key for sync.
    #[must_use]
    pub fn new_image_upload(
        id: impl Into<ElementId>,
        data_url: impl Into<String>,
        storage_key: impl Into<String>,
        position: Position,
    ) -> Self {
        Self::Image {
            id: id.into(),
            position,
            size: Size::new(300.0, 300.0),
            url: Some(data_url.into()),
            storage_key: Some(storage_key.into()),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        match self {
            Self::Text { id, .. } | Self::Shape { id, .. } | Self::Image { id, .. } => id,
        }
    }

    #[must_use]
    pub fn position(&self) -> Position {
        match self {
            Self::Text { position, .. } | Self::Shape { position, .. } | Self::Image { position, .. } => *position,
        }
    }

    #[must_use]
    pub fn size(&self) -> Size {
        match self {
            Self::Text { size, .. } | Self::Shape { size, .. } | Self::Image { size, .. } => *size,
        }
    }

    pub fn set_position(&mut self, new: Position) {
        match self {
            Self::Text { position, .. } | Self::Shape { position, .. } | Self::Image { position, .. } => {
                *position = new;
            }
        }
    }

    pub fn set_size(&mut self, new: Size) {
        match self {
            Self::Text { size, .. } | Self::Shape { size, .. } | Self::Image { size, .. } => *size = new,
        }
    }

    /// Merge a sparse patch onto this element.
    ///
    /// Fields that do not apply to this element's kind are ignored — a text
    /// patch arriving for a shape mutates nothing rather than erroring.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        if let Some(position) = patch.position {
            self.set_position(position);
        }
        if let Some(size) = patch.size {
            self.set_size(size);
        }

        match self {
            Self::Text { content, font_size, color, bold, italic, underline, .. } => {
                if let Some(v) = &patch.content {
                    content.clone_from(v);
                }
                if let Some(v) = patch.font_size {
                    *font_size = v;
                }
                if let Some(v) = &patch.color {
                    color.clone_from(v);
                }
                if let Some(v) = patch.bold {
                    *bold = v;
                }
                if let Some(v) = patch.italic {
                    *italic = v;
                }
                if let Some(v) = patch.underline {
                    *underline = v;
                }
            }
            Self::Shape { shape, stroke_color, stroke_width, fill, caption, .. } => {
                if let Some(v) = patch.shape {
                    *shape = v;
                }
                if let Some(v) = &patch.stroke_color {
                    stroke_color.clone_from(v);
                }
                if let Some(v) = patch.stroke_width {
                    *stroke_width = v;
                }
                if let Some(v) = &patch.fill {
                    fill.clone_from(v);
                }
                if let Some(v) = &patch.caption {
                    caption.clone_from(v);
                }
            }
            Self::Image { url, storage_key, .. } => {
                if let Some(v) = &patch.url {
                    *url = Some(v.clone());
                }
                if let Some(v) = &patch.storage_key {
                    *storage_key = Some(v.clone());
                }
            }
        }
    }
}

/// Sparse update for an element. Only present fields are applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub position: Option<Position>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<Size>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bold: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub italic: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub underline: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shape: Option<ShapeKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub storage_key: Option<String>,
}
