//! Services the widget consumes from its host toolkit.
//!
//! The widget never measures glyphs or touches pixels itself. Text
//! measurement and line breaking come from a [`LineBreaker`], drawing goes
//! through a [`Canvas`], and repaint/re-measure requests go to the
//! [`ViewHost`]. `fadein-text` and `fadein-render` provide the concrete
//! implementations used by the desktop host.

use crate::geometry::ClipRegion;
use crate::paint::Paint;

/// Result of laying out a block of text at a fixed width.
pub trait TextLayout {
    /// Number of visual lines after wrapping.
    fn line_count(&self) -> usize;
    /// Total laid-out height in pixels.
    fn height(&self) -> f32;
    /// Width of the widest line in pixels.
    fn width(&self) -> f32;
}

/// Text line-breaking and measurement service.
pub trait LineBreaker {
    type Layout: TextLayout;

    /// Lay out `text` with `paint`, wrapping at `max_width` pixels.
    fn layout(&mut self, text: &str, paint: &Paint, max_width: f32) -> Self::Layout;
}

/// Drawing surface with a save/restore clip stack.
pub trait Canvas<L: ?Sized> {
    /// Push the current clip state.
    fn save(&mut self);

    /// Pop back to the most recently saved clip state.
    fn restore(&mut self);

    /// Intersect the current clip with `region`.
    fn clip_region(&mut self, region: &ClipRegion);

    /// Render pre-laid-out text at the canvas origin.
    fn draw_text_layout(&mut self, layout: &L, paint: &Paint);
}

/// Invalidation signals back into the host's view tree.
pub trait ViewHost {
    /// Request a repaint of the widget.
    fn invalidate(&self);

    /// Request a new measure/layout pass.
    fn request_layout(&self);
}
