//! Geometry engine: pure functions for drag, resize, and connector anchors.
//!
//! All gesture math works from a captured drag-start snapshot of position and
//! size plus the total pointer delta — never incrementally from the previous
//! frame — so rounding and re-entrant updates cannot accumulate drift.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use crate::connector::Anchor;
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH, HANDLE_TOLERANCE, MIN_ELEMENT_SIZE};
use crate::element::{Position, Size};

/// One of the eight resize handles around a selected element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResizeHandle {
    Nw,
    Ne,
    Sw,
    Se,
    N,
    S,
    E,
    W,
}

impl ResizeHandle {
    /// Handles that move the left (west) edge of the box.
    #[must_use]
    fn moves_left_edge(self) -> bool {
        matches!(self, Self::Nw | Self::Sw | Self::W)
    }

    /// Handles that move the top (north) edge of the box.
    #[must_use]
    fn moves_top_edge(self) -> bool {
        matches!(self, Self::Nw | Self::Ne | Self::N)
    }
}

/// A connector anchor with its current canvas-space coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnchorPoint {
    pub anchor: Anchor,
    pub point: Position,
}

/// Clamp a position so the full `width` × `height` box stays within the
/// canvas extents. Each axis clamps independently.
#[must_use]
pub fn constrain_to_bounds(x: f64, y: f64, width: f64, height: f64) -> Position {
    Position {
        x: x.min(CANVAS_WIDTH - width).max(0.0),
        y: y.min(CANVAS_HEIGHT - height).max(0.0),
    }
}

/// New position for a drag gesture: start snapshot plus total delta, clamped.
#[must_use]
pub fn apply_drag(start: Position, size: Size, delta_x: f64, delta_y: f64) -> Position {
    constrain_to_bounds(start.x + delta_x, start.y + delta_y, size.width, size.height)
}

/// Which resize handle, if any, the pointer is within tolerance of.
///
/// Corners are checked before edge midpoints so a corner wins where the
/// tolerance squares overlap.
#[must_use]
pub fn resolve_resize_handle(position: Position, size: Size, pointer: Position) -> Option<ResizeHandle> {
    let candidates = [
        (ResizeHandle::Nw, position.x, position.y),
        (ResizeHandle::Ne, position.x + size.width, position.y),
        (ResizeHandle::Sw, position.x, position.y + size.height),
        (ResizeHandle::Se, position.x + size.width, position.y + size.height),
        (ResizeHandle::N, position.x + size.width / 2.0, position.y),
        (ResizeHandle::S, position.x + size.width / 2.0, position.y + size.height),
        (ResizeHandle::E, position.x + size.width, position.y + size.height / 2.0),
        (ResizeHandle::W, position.x, position.y + size.height / 2.0),
    ];

    candidates
        .into_iter()
        .find(|(_, hx, hy)| (pointer.x - hx).abs() < HANDLE_TOLERANCE && (pointer.y - hy).abs() < HANDLE_TOLERANCE)
        .map(|(handle, _, _)| handle)
}

/// New bounding box for a resize gesture.
///
/// `start` / `start_size` are the drag-start snapshot; `delta_x` / `delta_y`
/// the total pointer movement. Each dimension is floored at
/// [`MIN_ELEMENT_SIZE`], then the box is clamped to the canvas; if clamping
/// pinned a moving north/west edge to the origin, that dimension is
/// recomputed from the snapshot so the far edge stays put and the box never
/// exceeds the canvas.
#[must_use]
pub fn apply_resize(
    start: Position,
    start_size: Size,
    handle: ResizeHandle,
    delta_x: f64,
    delta_y: f64,
) -> (Position, Size) {
    let mut width = start_size.width;
    let mut height = start_size.height;
    let mut x = start.x;
    let mut y = start.y;

    match handle {
        ResizeHandle::Se => {
            width = (start_size.width + delta_x).max(MIN_ELEMENT_SIZE);
            height = (start_size.height + delta_y).max(MIN_ELEMENT_SIZE);
        }
        ResizeHandle::Sw => {
            width = (start_size.width - delta_x).max(MIN_ELEMENT_SIZE);
            height = (start_size.height + delta_y).max(MIN_ELEMENT_SIZE);
            x = start.x + start_size.width - width;
        }
        ResizeHandle::Ne => {
            width = (start_size.width + delta_x).max(MIN_ELEMENT_SIZE);
            height = (start_size.height - delta_y).max(MIN_ELEMENT_SIZE);
            y = start.y + start_size.height - height;
        }
        ResizeHandle::Nw => {
            width = (start_size.width - delta_x).max(MIN_ELEMENT_SIZE);
            height = (start_size.height - delta_y).max(MIN_ELEMENT_SIZE);
            x = start.x + start_size.width - width;
            y = start.y + start_size.height - height;
        }
        ResizeHandle::N => {
            height = (start_size.height - delta_y).max(MIN_ELEMENT_SIZE);
            y = start.y + start_size.height - height;
        }
        ResizeHandle::S => {
            height = (start_size.height + delta_y).max(MIN_ELEMENT_SIZE);
        }
        ResizeHandle::E => {
            width = (start_size.width + delta_x).max(MIN_ELEMENT_SIZE);
        }
        ResizeHandle::W => {
            width = (start_size.width - delta_x).max(MIN_ELEMENT_SIZE);
            x = start.x + start_size.width - width;
        }
    }

    let clamped = constrain_to_bounds(x, y, width, height);

    // A north/west resize pinned at the canvas origin would otherwise grow
    // the box past its fixed far edge; rebuild the dimension from the
    // snapshot's far edge instead.
    if clamped.x == 0.0 && handle.moves_left_edge() {
        width = start.x + start_size.width;
    }
    if clamped.y == 0.0 && handle.moves_top_edge() {
        height = start.y + start_size.height;
    }

    (clamped, Size { width, height })
}

/// Canvas-space coordinates of one side-midpoint anchor.
#[must_use]
pub fn anchor_point(position: Position, size: Size, anchor: Anchor) -> Position {
    match anchor {
        Anchor::Top => Position::new(position.x + size.width / 2.0, position.y),
        Anchor::Right => Position::new(position.x + size.width, position.y + size.height / 2.0),
        Anchor::Bottom => Position::new(position.x + size.width / 2.0, position.y + size.height),
        Anchor::Left => Position::new(position.x, position.y + size.height / 2.0),
    }
}

/// All four anchors for the current bounding box, recomputed from live
/// geometry on every call — anchor coordinates are never cached.
#[must_use]
pub fn anchor_points(position: Position, size: Size) -> [AnchorPoint; 4] {
    [Anchor::Top, Anchor::Right, Anchor::Bottom, Anchor::Left]
        .map(|anchor| AnchorPoint { anchor, point: anchor_point(position, size, anchor) })
}
