//! Text engine: wraps text into lines and rasterizes its glyphs with
//! `cosmic-text`.
//!
//! The engine manages a `FontSystem` (font discovery + shaping), a
//! `SwashCache` (glyph rasterization) and a [`GlyphCache`] of finished
//! masks. Laying out a string produces a [`ShapedText`]: per-line boxes
//! for the reveal geometry and positioned glyph masks for the canvas.

use std::sync::Arc;

use cosmic_text::{
    Attrs, Buffer, CacheKey, Family, FontSystem, Metrics, Shaping, Style as CStyle, SwashCache,
    Weight,
};
use fadein_core::{LineBreaker, Paint, TextLayout};
use log::{debug, trace};

use crate::glyph_cache::{GlyphCache, GlyphMask};

/// Line height as a multiple of the font size (single spacing).
pub const LINE_SPACING: f32 = 1.2;

/// Font and spacing for a text run.
#[derive(Clone, Debug)]
pub struct TextStyle {
    /// Font size in pixels.
    pub font_size: f32,
    /// Line height in pixels.
    pub line_height: f32,
    /// Font family: a generic name (`sans-serif`, `serif`, `monospace`)
    /// or a concrete family.
    pub family: String,
    /// Font weight (100–900). 400 = normal, 700 = bold.
    pub weight: u16,
    pub italic: bool,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self::with_font_size(16.0)
    }
}

impl TextStyle {
    /// Regular sans-serif at `font_size` pixels with single line spacing.
    pub fn with_font_size(font_size: f32) -> Self {
        Self {
            font_size,
            line_height: (font_size * LINE_SPACING).ceil().max(1.0),
            family: String::from("sans-serif"),
            weight: 400,
            italic: false,
        }
    }

    /// Style matching a widget paint.
    pub fn from_paint(paint: &Paint) -> Self {
        Self::with_font_size(paint.text_size)
    }
}

/// A glyph mask placed in layout coordinates (pixels, origin top-left).
#[derive(Clone, Debug)]
pub struct PositionedGlyph {
    pub x: i32,
    pub y: i32,
    pub mask: Arc<GlyphMask>,
}

/// One visual line after wrapping.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineBox {
    /// Top edge of the line box.
    pub top: f32,
    /// Baseline position.
    pub baseline: f32,
    pub height: f32,
    /// Advance width of the line's content.
    pub width: f32,
}

/// Result of laying out a text block.
#[derive(Clone, Debug, Default)]
pub struct ShapedText {
    pub lines: Vec<LineBox>,
    pub glyphs: Vec<PositionedGlyph>,
    /// Width of the widest line.
    pub width: f32,
    /// Total height of all line boxes.
    pub height: f32,
}

impl TextLayout for ShapedText {
    fn line_count(&self) -> usize {
        self.lines.len()
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn width(&self) -> f32 {
        self.width
    }
}

/// Core text engine wrapping cosmic-text.
pub struct TextEngine {
    pub font_system: FontSystem,
    pub swash_cache: SwashCache,
    glyphs: GlyphCache<CacheKey>,
}

impl Default for TextEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl TextEngine {
    /// Create a new text engine with system font discovery.
    pub fn new() -> Self {
        let font_system = FontSystem::new();
        debug!("text engine: {} font face(s) available", font_system.db().faces().count());
        Self {
            font_system,
            swash_cache: SwashCache::new(),
            glyphs: GlyphCache::default(),
        }
    }

    /// Whether any font face was discovered.
    pub fn has_fonts(&self) -> bool {
        self.font_system.db().faces().next().is_some()
    }

    /// Number of rasterized glyph masks held.
    pub fn cached_glyphs(&self) -> usize {
        self.glyphs.len()
    }

    /// Break `text` into lines no wider than `max_width`, measure it and
    /// rasterize its glyphs.
    ///
    /// Pass `f32::INFINITY` for unwrapped layout.
    pub fn shape_text(&mut self, text: &str, style: &TextStyle, max_width: f32) -> ShapedText {
        let metrics = Metrics::new(style.font_size, style.line_height);

        let family = match style.family.as_str() {
            "sans-serif" => Family::SansSerif,
            "serif" => Family::Serif,
            "monospace" => Family::Monospace,
            name => Family::Name(name),
        };
        let font_style = if style.italic {
            CStyle::Italic
        } else {
            CStyle::Normal
        };
        let attrs = Attrs::new()
            .family(family)
            .weight(Weight(style.weight))
            .style(font_style);

        let wrap_width = max_width.is_finite().then_some(max_width.max(0.0));
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, wrap_width, None);
        buffer.set_text(&mut self.font_system, text, attrs, Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut shaped = ShapedText::default();

        for (index, run) in buffer.layout_runs().enumerate() {
            let top = index as f32 * style.line_height;
            shaped.lines.push(LineBox {
                top,
                baseline: run.line_y,
                height: style.line_height,
                width: run.line_w,
            });
            shaped.width = shaped.width.max(run.line_w);

            for glyph in run.glyphs.iter() {
                let physical = glyph.physical((0.0, 0.0), 1.0);

                let font_system = &mut self.font_system;
                let swash_cache = &mut self.swash_cache;
                let mask = self.glyphs.get_or_rasterize(physical.cache_key, || {
                    let image = swash_cache.get_image(font_system, physical.cache_key);
                    let image = image.as_ref()?;
                    GlyphMask::from_bitmap(
                        image.placement.width,
                        image.placement.height,
                        image.data.clone(),
                    )
                    .map(|mask| mask.with_placement(image.placement.left, image.placement.top))
                });
                let Some(mask) = mask else {
                    continue; // whitespace or missing glyph
                };

                shaped.glyphs.push(PositionedGlyph {
                    x: physical.x + mask.left,
                    y: run.line_y as i32 + physical.y - mask.top,
                    mask,
                });
            }
        }

        shaped.height = shaped.lines.len() as f32 * style.line_height;
        trace!(
            "shaped {} char(s) into {} line(s), {} glyph(s)",
            text.chars().count(),
            shaped.lines.len(),
            shaped.glyphs.len()
        );
        shaped
    }
}

impl LineBreaker for TextEngine {
    type Layout = ShapedText;

    fn layout(&mut self, text: &str, paint: &Paint, max_width: f32) -> ShapedText {
        self.shape_text(text, &TextStyle::from_paint(paint), max_width)
    }
}

// ===================================================================
// Tests
// ===================================================================
