//! # fadein-text
//!
//! Text shaping for the reveal widget, backed by `cosmic-text`.
//!
//! [`TextEngine`] implements [`fadein_core::LineBreaker`]: it wraps a
//! string to the widget width and returns a [`ShapedText`] holding the
//! line boxes the reveal animation walks through plus the rasterized
//! glyphs a canvas paints. Glyph bitmaps are shared through an LRU
//! [`GlyphCache`].

pub mod engine;
pub mod glyph_cache;

pub use engine::{LineBox, PositionedGlyph, ShapedText, TextEngine, TextStyle, LINE_SPACING};
pub use glyph_cache::{GlyphCache, GlyphMask, MaskFormat};
