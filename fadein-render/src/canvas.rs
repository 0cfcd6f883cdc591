//! Software canvas: an RGBA8 pixmap the widget draws into.
//!
//! The canvas keeps a stack of clip regions. A pixel is drawable only when
//! its center lies inside *every* region on the stack, so each
//! `clip_region` call intersects with the clip already in force.
//! `save`/`restore` bracket those calls the way a retained canvas does.
//!
//! ```text
//!  save ──► clip_region(A) ──► clip_region(B) ──► draw  (A ∩ B)
//!    └──────────────────────────── restore ◄──────────┘  (back to full)
//! ```

use fadein_core::{Canvas, ClipRegion, Color, Paint, Rect};
use fadein_text::{MaskFormat, PositionedGlyph, ShapedText};
use log::{trace, warn};

/// Coverage at or above this value is drawn fully when anti-aliasing is off.
const ALIAS_THRESHOLD: u8 = 128;

/// RGBA8 pixel buffer with a clip stack.
pub struct PixmapCanvas {
    width: u32,
    height: u32,
    /// Row-major, 4 bytes per pixel, straight (non-premultiplied) alpha.
    data: Vec<u8>,
    clips: Vec<ClipRegion>,
    /// Clip stack depth at each `save`.
    saves: Vec<usize>,
}

impl PixmapCanvas {
    /// A fully transparent canvas of `width × height` pixels.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            data: vec![0; (width as usize) * (height as usize) * 4],
            clips: Vec::new(),
            saves: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 bytes, row-major.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Color of pixel `(x, y)`, `None` outside the canvas.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = self.index(x, y);
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }

    /// Reallocate for a new size. Contents are cleared and the clip stack
    /// is reset.
    pub fn resize(&mut self, width: u32, height: u32) {
        if !self.saves.is_empty() {
            warn!("canvas resized with {} unbalanced save(s)", self.saves.len());
        }
        *self = Self::new(width, height);
    }

    /// Fill every pixel with `color`, ignoring the clip.
    pub fn clear(&mut self, color: Color) {
        let rgba = color.to_rgba8();
        for px in self.data.chunks_exact_mut(4) {
            px.copy_from_slice(&rgba);
        }
    }

    /// Blend `color` over the pixels whose centers fall inside `rect` and
    /// the current clip.
    pub fn fill_rect(&mut self, rect: Rect, color: Color) {
        if rect.is_empty() {
            return;
        }
        let src = color.to_rgba8();
        let x0 = rect.x.floor().max(0.0) as u32;
        let y0 = rect.y.floor().max(0.0) as u32;
        let x1 = (rect.right().ceil().max(0.0) as u32).min(self.width);
        let y1 = (rect.bottom().ceil().max(0.0) as u32).min(self.height);

        for y in y0..y1 {
            for x in x0..x1 {
                let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
                if rect.contains(cx, cy) && self.is_visible(x, y) {
                    self.blend(x, y, src, 255);
                }
            }
        }
    }

    /// Number of clip regions currently in force.
    pub fn clip_depth(&self) -> usize {
        self.clips.len()
    }

    // ── Internals ──────────────────────────────────────────────────

    fn index(&self, x: u32, y: u32) -> usize {
        ((y as usize) * (self.width as usize) + x as usize) * 4
    }

    fn is_visible(&self, x: u32, y: u32) -> bool {
        let (cx, cy) = (x as f32 + 0.5, y as f32 + 0.5);
        self.clips.iter().all(|clip| clip.contains(cx, cy))
    }

    /// Source-over blend of `src` (straight alpha) scaled by `coverage`.
    fn blend(&mut self, x: u32, y: u32, src: [u8; 4], coverage: u8) {
        let idx = self.index(x, y);
        let sa = (src[3] as f32 / 255.0) * (coverage as f32 / 255.0);
        if sa <= 0.0 {
            return;
        }
        let dst = &mut self.data[idx..idx + 4];
        let da = dst[3] as f32 / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let sc = src[c] as f32 / 255.0;
            let dc = dst[c] as f32 / 255.0;
            let out = (sc * sa + dc * da * (1.0 - sa)) / out_a;
            dst[c] = (out * 255.0).round() as u8;
        }
        dst[3] = (out_a * 255.0).round() as u8;
    }

    fn draw_glyph(&mut self, glyph: &PositionedGlyph, tint: [u8; 4], anti_alias: bool) {
        let mask = &glyph.mask;
        for my in 0..mask.height {
            let y = glyph.y + my as i32;
            if y < 0 || y >= self.height as i32 {
                continue;
            }
            for mx in 0..mask.width {
                let x = glyph.x + mx as i32;
                if x < 0 || x >= self.width as i32 {
                    continue;
                }
                let (x, y) = (x as u32, y as u32);
                if !self.is_visible(x, y) {
                    continue;
                }

                let mut coverage = mask.coverage(mx, my);
                if !anti_alias {
                    coverage = if coverage >= ALIAS_THRESHOLD { 255 } else { 0 };
                }
                let src = match mask.format {
                    MaskFormat::Alpha => tint,
                    // Color glyphs keep their own RGB; the paint only
                    // contributes opacity.
                    MaskFormat::Rgba => match mask.color(mx, my) {
                        Some([r, g, b, _]) => [r, g, b, tint[3]],
                        None => continue,
                    },
                };
                self.blend(x, y, src, coverage);
            }
        }
    }
}

impl Canvas<ShapedText> for PixmapCanvas {
    fn save(&mut self) {
        self.saves.push(self.clips.len());
    }

    fn restore(&mut self) {
        match self.saves.pop() {
            Some(depth) => self.clips.truncate(depth),
            None => warn!("canvas restore without matching save"),
        }
    }

    fn clip_region(&mut self, region: &ClipRegion) {
        trace!("clip: {} rect(s), depth {}", region.rects().len(), self.clips.len() + 1);
        self.clips.push(region.clone());
    }

    fn draw_text_layout(&mut self, layout: &ShapedText, paint: &Paint) {
        let tint = paint.color.to_rgba8();
        for glyph in &layout.glyphs {
            self.draw_glyph(glyph, tint, paint.anti_alias);
        }
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use fadein_text::GlyphMask;

    use super::*;

    const WHITE: [u8; 4] = [255, 255, 255, 255];
    const CLEAR: [u8; 4] = [0, 0, 0, 0];

    fn block_glyph(x: i32, y: i32, w: u32, h: u32, coverage: u8) -> PositionedGlyph {
        let mask = GlyphMask::from_bitmap(w, h, vec![coverage; (w * h) as usize]).unwrap();
        PositionedGlyph {
            x,
            y,
            mask: Arc::new(mask),
        }
    }

    fn layout_of(glyphs: Vec<PositionedGlyph>) -> ShapedText {
        ShapedText {
            glyphs,
            ..Default::default()
        }
    }

    fn red_paint() -> Paint {
        Paint {
            color: Color::RED,
            ..Default::default()
        }
    }

    #[test]
    fn test_new_canvas_is_transparent() {
        let canvas = PixmapCanvas::new(4, 3);
        assert_eq!(canvas.data().len(), 4 * 3 * 4);
        assert_eq!(canvas.pixel(3, 2), Some(CLEAR));
        assert_eq!(canvas.pixel(4, 0), None);
    }

    #[test]
    fn test_clear_ignores_clip() {
        let mut canvas = PixmapCanvas::new(4, 4);
        canvas.clip_region(&ClipRegion::empty());
        canvas.clear(Color::WHITE);
        assert_eq!(canvas.pixel(0, 0), Some(WHITE));
        assert_eq!(canvas.pixel(3, 3), Some(WHITE));
    }

    #[test]
    fn test_fill_rect_pixel_centers() {
        let mut canvas = PixmapCanvas::new(6, 6);
        canvas.fill_rect(Rect::new(1.0, 1.0, 2.0, 2.0), Color::BLACK);
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(2, 2), Some([0, 0, 0, 255]));
        assert_eq!(canvas.pixel(3, 3), Some(CLEAR));
        assert_eq!(canvas.pixel(0, 1), Some(CLEAR));
    }

    #[test]
    fn test_pixels_outside_clip_untouched() {
        let mut canvas = PixmapCanvas::new(8, 8);
        canvas.clear(Color::WHITE);
        canvas.save();
        canvas.clip_region(&ClipRegion::full(Rect::new(0.0, 0.0, 4.0, 8.0)));
        canvas.fill_rect(Rect::new(0.0, 0.0, 8.0, 8.0), Color::BLACK);
        canvas.restore();

        for y in 0..8 {
            assert_eq!(canvas.pixel(3, y), Some([0, 0, 0, 255]));
            assert_eq!(canvas.pixel(4, y), Some(WHITE));
            assert_eq!(canvas.pixel(7, y), Some(WHITE));
        }
    }

    #[test]
    fn test_nested_clips_intersect() {
        let mut canvas = PixmapCanvas::new(8, 1);
        canvas.save();
        canvas.clip_region(&ClipRegion::full(Rect::new(0.0, 0.0, 4.0, 1.0)));
        canvas.clip_region(&ClipRegion::full(Rect::new(2.0, 0.0, 4.0, 1.0)));
        assert_eq!(canvas.clip_depth(), 2);
        canvas.fill_rect(Rect::new(0.0, 0.0, 8.0, 1.0), Color::BLACK);
        canvas.restore();

        let drawn: Vec<bool> = (0..8).map(|x| canvas.pixel(x, 0) != Some(CLEAR)).collect();
        assert_eq!(drawn, vec![false, false, true, true, false, false, false, false]);
    }

    #[test]
    fn test_union_region_clips_both_rects() {
        let mut region = ClipRegion::empty();
        region.push(Rect::new(0.0, 0.0, 8.0, 2.0)); // lines above
        region.push(Rect::new(0.0, 2.0, 3.0, 2.0)); // partial current line

        let mut canvas = PixmapCanvas::new(8, 4);
        canvas.clip_region(&region);
        canvas.fill_rect(Rect::new(0.0, 0.0, 8.0, 4.0), Color::BLACK);

        assert_ne!(canvas.pixel(7, 1), Some(CLEAR));
        assert_ne!(canvas.pixel(2, 3), Some(CLEAR));
        assert_eq!(canvas.pixel(3, 3), Some(CLEAR));
        assert_eq!(canvas.pixel(7, 2), Some(CLEAR));
    }

    #[test]
    fn test_restore_pops_clip() {
        let mut canvas = PixmapCanvas::new(2, 2);
        canvas.save();
        canvas.clip_region(&ClipRegion::empty());
        canvas.restore();
        assert_eq!(canvas.clip_depth(), 0);
        canvas.fill_rect(Rect::new(0.0, 0.0, 2.0, 2.0), Color::BLACK);
        assert_eq!(canvas.pixel(1, 1), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_unbalanced_restore_is_ignored() {
        let mut canvas = PixmapCanvas::new(2, 2);
        canvas.clip_region(&ClipRegion::empty());
        canvas.restore();
        assert_eq!(canvas.clip_depth(), 1);
    }

    #[test]
    fn test_glyph_tinted_with_paint_color() {
        let mut canvas = PixmapCanvas::new(4, 4);
        let layout = layout_of(vec![block_glyph(1, 1, 2, 2, 255)]);
        canvas.draw_text_layout(&layout, &red_paint());
        assert_eq!(canvas.pixel(1, 1), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(0, 0), Some(CLEAR));
    }

    #[test]
    fn test_partial_coverage_blends_over_background() {
        let mut canvas = PixmapCanvas::new(1, 1);
        canvas.clear(Color::WHITE);
        let layout = layout_of(vec![block_glyph(0, 0, 1, 1, 128)]);
        canvas.draw_text_layout(&layout, &red_paint());

        let [r, g, b, a] = canvas.pixel(0, 0).unwrap();
        assert_eq!(r, 255);
        assert!((126..=128).contains(&g), "g = {g}");
        assert_eq!(g, b);
        assert_eq!(a, 255);
    }

    #[test]
    fn test_aliased_paint_thresholds_coverage() {
        let mut canvas = PixmapCanvas::new(2, 1);
        let layout = layout_of(vec![block_glyph(0, 0, 1, 1, 100), block_glyph(1, 0, 1, 1, 200)]);
        let paint = Paint {
            anti_alias: false,
            ..red_paint()
        };
        canvas.draw_text_layout(&layout, &paint);
        assert_eq!(canvas.pixel(0, 0), Some(CLEAR));
        assert_eq!(canvas.pixel(1, 0), Some([255, 0, 0, 255]));
    }

    #[test]
    fn test_color_glyph_keeps_own_rgb() {
        let mask = GlyphMask::from_bitmap(1, 1, vec![0, 0, 255, 255]).unwrap();
        let layout = layout_of(vec![PositionedGlyph {
            x: 0,
            y: 0,
            mask: Arc::new(mask),
        }]);
        let mut canvas = PixmapCanvas::new(1, 1);
        canvas.draw_text_layout(&layout, &red_paint());
        assert_eq!(canvas.pixel(0, 0), Some([0, 0, 255, 255]));
    }

    #[test]
    fn test_glyph_clipped_by_region() {
        let mut canvas = PixmapCanvas::new(6, 2);
        let layout = layout_of(vec![block_glyph(0, 0, 6, 2, 255)]);
        canvas.save();
        canvas.clip_region(&ClipRegion::full(Rect::new(0.0, 0.0, 3.0, 2.0)));
        canvas.draw_text_layout(&layout, &red_paint());
        canvas.restore();
        assert_eq!(canvas.pixel(2, 1), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(3, 0), Some(CLEAR));
    }

    #[test]
    fn test_offscreen_glyph_is_skipped() {
        let mut canvas = PixmapCanvas::new(4, 4);
        let layout = layout_of(vec![block_glyph(-3, -3, 4, 4, 255), block_glyph(10, 0, 2, 2, 255)]);
        canvas.draw_text_layout(&layout, &red_paint());
        assert_eq!(canvas.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(canvas.pixel(1, 1), Some(CLEAR));
    }

    #[test]
    fn test_resize_resets() {
        let mut canvas = PixmapCanvas::new(2, 2);
        canvas.clear(Color::WHITE);
        canvas.save();
        canvas.clip_region(&ClipRegion::empty());
        canvas.resize(5, 3);
        assert_eq!((canvas.width(), canvas.height()), (5, 3));
        assert_eq!(canvas.data().len(), 5 * 3 * 4);
        assert_eq!(canvas.pixel(0, 0), Some(CLEAR));
        assert_eq!(canvas.clip_depth(), 0);
    }
}
