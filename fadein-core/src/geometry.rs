//! Pixel-space geometry shared by the widget and the canvas backends.
//!
//! A [`ClipRegion`] is a union of axis-aligned rectangles. The reveal
//! sweep never needs more than two of them (the rows already revealed and
//! the partial row under the sweep), so the region stays a flat list.

use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

#[derive(Clone, Copy, Serialize, Deserialize, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle anchored at the origin.
    pub fn from_size(size: Size) -> Self {
        Self::new(0.0, 0.0, size.width, size.height)
    }

    /// Build from edge coordinates (left, top, right, bottom).
    pub fn from_ltrb(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(left, top, right - left, bottom - top)
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the rectangle covers no area.
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Half-open containment: left/top edges inclusive, right/bottom exclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Smallest rectangle containing both `self` and `other`.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect::from_ltrb(
            self.x.min(other.x),
            self.y.min(other.y),
            self.right().max(other.right()),
            self.bottom().max(other.bottom()),
        )
    }
}

/// Union of rectangles used to mask drawing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ClipRegion {
    rects: Vec<Rect>,
}

impl ClipRegion {
    /// A region that lets nothing through.
    pub fn empty() -> Self {
        Self { rects: Vec::new() }
    }

    /// A region covering the whole of `bounds`.
    pub fn full(bounds: Rect) -> Self {
        let mut region = Self::empty();
        region.push(bounds);
        region
    }

    /// Add a rectangle to the union. Degenerate rectangles are dropped.
    pub fn push(&mut self, rect: Rect) {
        if !rect.is_empty() {
            self.rects.push(rect);
        }
    }

    pub fn rects(&self) -> &[Rect] {
        &self.rects
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Whether the point `(x, y)` lies inside any member rectangle.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        self.rects.iter().any(|r| r.contains(x, y))
    }

    /// Bounding box of the union, `None` for an empty region.
    pub fn bounding_box(&self) -> Option<Rect> {
        let mut iter = self.rects.iter();
        let first = *iter.next()?;
        Some(iter.fold(first, |acc, r| acc.union(r)))
    }
}

// ===================================================================
// Tests
// ===================================================================
