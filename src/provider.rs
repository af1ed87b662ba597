//! Input contract for page layout providers.
//!
//! pagemark does not read PDF bytes itself. An external layout provider
//! (pdfium, MuPDF, pdfplumber-style extractors, ...) hands the pipeline a
//! flat set of geometric primitives per page: positioned text spans, drawn
//! line/rectangle primitives, and link annotation rectangles. Everything in
//! this module uses top-origin page space: `y` grows downward, so smaller
//! `y0` means closer to the top of the page.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// An axis-aligned bounding box in page coordinates (points).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Left edge
    pub x0: f32,
    /// Top edge
    pub y0: f32,
    /// Right edge
    pub x1: f32,
    /// Bottom edge
    pub y1: f32,
}

impl BoundingBox {
    /// Create a bounding box, normalizing swapped corners.
    pub fn new(x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// Width of the box.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Height of the box.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }

    /// Area of the box.
    pub fn area(&self) -> f32 {
        self.width() * self.height()
    }

    /// Center point of the box.
    pub fn center(&self) -> (f32, f32) {
        ((self.x0 + self.x1) / 2.0, (self.y0 + self.y1) / 2.0)
    }

    /// Whether the box contains a point. Edges count as inside.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x0 && x <= self.x1 && y >= self.y0 && y <= self.y1
    }

    /// Intersection with another box, or `None` when they do not overlap.
    pub fn intersection(&self, other: &BoundingBox) -> Option<BoundingBox> {
        let x0 = self.x0.max(other.x0);
        let y0 = self.y0.max(other.y0);
        let x1 = self.x1.min(other.x1);
        let y1 = self.y1.min(other.y1);
        if x0 < x1 && y0 < y1 {
            Some(BoundingBox { x0, y0, x1, y1 })
        } else {
            None
        }
    }

    /// Smallest box covering both boxes.
    pub fn union(&self, other: &BoundingBox) -> BoundingBox {
        BoundingBox {
            x0: self.x0.min(other.x0),
            y0: self.y0.min(other.y0),
            x1: self.x1.max(other.x1),
            y1: self.y1.max(other.y1),
        }
    }
}

/// A positioned piece of text produced by the layout provider.
///
/// Spans are immutable: the pipeline derives everything else (lines,
/// blocks, table cells) from them without mutating the originals.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextSpan {
    /// The text content
    pub text: String,
    /// Bounding box of the rendered glyphs
    pub bbox: BoundingBox,
    /// Font name as reported by the provider (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font is bold
    pub bold: bool,
    /// Whether the font is italic
    pub italic: bool,
    /// Baseline y coordinate
    pub baseline: f32,
}

impl TextSpan {
    /// Create a span, deriving bold/italic flags from the font name the way
    /// most providers encode them.
    pub fn new(text: impl Into<String>, bbox: BoundingBox, font_name: impl Into<String>, font_size: f32) -> Self {
        let font_name = font_name.into();
        let lower = font_name.to_lowercase();
        let bold = lower.contains("bold") || lower.contains("black") || lower.contains("heavy");
        let italic = lower.contains("italic") || lower.contains("oblique");
        Self {
            text: text.into(),
            baseline: bbox.y1,
            bbox,
            font_name,
            font_size,
            bold,
            italic,
        }
    }

    /// Center point of the span's box.
    pub fn centroid(&self) -> (f32, f32) {
        self.bbox.center()
    }
}

/// A raw drawing primitive: a stroked line or a rectangle outline.
///
/// Rectangles are not distinguished from lines here; the geometry
/// normalizer decomposes anything with two thick dimensions into its four
/// edges before classification.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct LinePrimitive {
    /// Bounding box of the stroked path
    pub bbox: BoundingBox,
    /// Stroke width in points
    pub stroke_width: f32,
}

impl LinePrimitive {
    /// Create a primitive with the given stroke width.
    pub fn new(bbox: BoundingBox, stroke_width: f32) -> Self {
        Self { bbox, stroke_width }
    }
}

/// A link annotation: a clickable rectangle with a target URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinkRect {
    /// Active rectangle of the annotation
    pub bbox: BoundingBox,
    /// Target URI
    pub uri: String,
}

impl LinkRect {
    /// Create a link annotation.
    pub fn new(bbox: BoundingBox, uri: impl Into<String>) -> Self {
        Self {
            bbox,
            uri: uri.into(),
        }
    }
}

/// Everything the provider extracted for one page.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PageGeometry {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Text spans in provider order
    pub spans: Vec<TextSpan>,
    /// Line and rectangle drawing primitives
    pub lines: Vec<LinePrimitive>,
    /// Link annotations
    pub links: Vec<LinkRect>,
}

impl PageGeometry {
    /// Create an empty page of the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            spans: Vec::new(),
            lines: Vec::new(),
            links: Vec::new(),
        }
    }

    /// Check whether the page carries no primitives at all.
    pub fn is_empty(&self) -> bool {
        self.spans.is_empty() && self.lines.is_empty() && self.links.is_empty()
    }
}

/// External collaborator that turns document pages into geometry.
///
/// `page_geometry` is the only call in the pipeline expected to block
/// (parsing, decompression). Implementations must be thread-safe: pages are
/// pulled from worker threads when parallel processing is enabled.
pub trait PageLayoutProvider: Send + Sync {
    /// Number of pages in the document.
    fn page_count(&self) -> u32;

    /// Extract the primitives of one page (1-indexed).
    fn page_geometry(&self, page: u32) -> Result<PageGeometry>;
}
