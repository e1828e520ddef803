//! Shared numeric constants for the canvas crate.

// ── Canvas extents ──────────────────────────────────────────────

/// Width of the fixed card canvas in canvas-space units.
pub const CANVAS_WIDTH: f64 = 1600.0;

/// Height of the fixed card canvas in canvas-space units.
pub const CANVAS_HEIGHT: f64 = 1200.0;

// ── Element sizing ──────────────────────────────────────────────

/// Minimum width and height an element may be resized to.
pub const MIN_ELEMENT_SIZE: f64 = 50.0;

// ── Hit-testing ─────────────────────────────────────────────────

/// Pixel tolerance for grabbing a resize handle.
pub const HANDLE_TOLERANCE: f64 = 10.0;

// ── Text ────────────────────────────────────────────────────────

/// Smallest allowed font size for text elements.
pub const FONT_SIZE_MIN: f64 = 8.0;

/// Largest allowed font size for text elements.
pub const FONT_SIZE_MAX: f64 = 72.0;
