//! Box geometry for page-relative layout regions.
//!
//! The layout oracle reports every region as an axis-aligned rectangle in
//! page-relative coordinates (`0.0..=1.0` on both axes, origin at the
//! top-left, y growing downward). Pixel-space rectangles only appear at
//! the raster-cropping boundary.

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle in page-relative coordinates.
///
/// Invariants enforced at construction: `x0 <= x1`, `y0 <= y1`, and all
/// coordinates clamped into `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    /// Page index the box belongs to (0-indexed)
    pub page: usize,
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
    /// Create a new box, normalizing inverted corners and clamping every
    /// coordinate into the unit square.
    pub fn new(page: usize, x0: f32, y0: f32, x1: f32, y1: f32) -> Self {
        let (x0, x1) = if x0 <= x1 { (x0, x1) } else { (x1, x0) };
        let (y0, y1) = if y0 <= y1 { (y0, y1) } else { (y1, y0) };
        Self {
            page,
            x0: x0.clamp(0.0, 1.0),
            y0: y0.clamp(0.0, 1.0),
            x1: x1.clamp(0.0, 1.0),
            y1: y1.clamp(0.0, 1.0),
        }
    }

    /// Strict interior intersection test.
    ///
    /// Boxes that merely touch at an edge or corner do **not** count as
    /// overlapping; the intersection must have non-zero area. Boxes on
    /// different pages never overlap.
    pub fn overlaps(&self, other: &BoundingBox) -> bool {
        if self.page != other.page {
            return false;
        }
        self.x0 < other.x1 && other.x0 < self.x1 && self.y0 < other.y1 && other.y0 < self.y1
    }

    /// Extend the box vertically by `amount`, growing downward twice as
    /// far as upward. Captions usually sit below their figure, so the
    /// downward bias makes the caption query catch them first.
    ///
    /// Both edges stay clamped to the unit square.
    pub fn extend_vertical(&self, amount: f32) -> BoundingBox {
        BoundingBox {
            page: self.page,
            x0: self.x0,
            y0: (self.y0 - amount).max(0.0),
            x1: self.x1,
            y1: (self.y1 + amount * 2.0).min(1.0),
        }
    }

    /// Convert to absolute pixel coordinates given the page raster size.
    pub fn to_absolute(&self, page_width: u32, page_height: u32) -> PixelBox {
        let w = page_width as f32;
        let h = page_height as f32;
        PixelBox {
            page: self.page,
            x0: (self.x0 * w) as u32,
            y0: (self.y0 * h) as u32,
            x1: (self.x1 * w).ceil() as u32,
            y1: (self.y1 * h).ceil() as u32,
        }
    }

    /// Box width in relative units.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Box height in relative units.
    pub fn height(&self) -> f32 {
        self.y1 - self.y0
    }
}

/// An axis-aligned rectangle in absolute pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelBox {
    /// Page index (0-indexed)
    pub page: usize,
    /// Left edge in pixels
    pub x0: u32,
    /// Top edge in pixels
    pub y0: u32,
    /// Right edge in pixels
    pub x1: u32,
    /// Bottom edge in pixels
    pub y1: u32,
}

impl PixelBox {
    /// Pixel width of the box.
    pub fn width(&self) -> u32 {
        self.x1.saturating_sub(self.x0)
    }

    /// Pixel height of the box.
    pub fn height(&self) -> u32 {
        self.y1.saturating_sub(self.y0)
    }
}
