//! Page model: per-page ordered lists of completed path operations and
//! text placements, plus page dimensions.

use crate::path::PathElement;

/// `{x, y, text, font_name, font_size, color}`. `text` may contain any
/// byte; the serializer escapes it.
#[derive(Debug, Clone, PartialEq)]
pub struct TextElement {
    pub x: f64,
    pub y: f64,
    pub text: Vec<u8>,
    pub font_name: String,
    pub font_size: f64,
    pub color: [f64; 3],
}

/// A sequence of `PathElement`s terminated by a paint marker
/// (`PaintStroke` or `PaintFill`).
pub type PathBatch = Vec<PathElement>;

/// One drawing command committed to a page: either a flushed path batch
/// or a text placement, plus the color/line-width active when it was
/// recorded (so the content-stream composer can reflect per-item state
/// across `gsave`/`grestore` boundaries).
#[derive(Debug, Clone, PartialEq)]
pub enum PageItem {
    Path { batch: PathBatch, color_rgb: [f64; 3], line_width: f64 },
    Text(TextElement),
}

/// `{width_pts, height_pts, items}`.
#[derive(Debug, Clone)]
pub struct Page {
    pub width_pts: f64,
    pub height_pts: f64,
    pub items: Vec<PageItem>,
}

impl Page {
    pub fn new(width_pts: f64, height_pts: f64) -> Self {
        Page { width_pts, height_pts, items: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
