//! Glyph mask cache: rasterized glyph bitmaps shared between layouts.
//!
//! Rasterizing a glyph is far more expensive than blitting it, and a
//! paragraph reuses the same handful of glyphs many times. Masks are kept
//! behind `Arc` so every [`PositionedGlyph`](crate::PositionedGlyph) that
//! uses a glyph points at the same bitmap. An LRU bound keeps memory flat
//! when the text (or font size) changes repeatedly.

use std::hash::Hash;
use std::num::NonZeroUsize;
use std::sync::Arc;

use lru::LruCache;

/// Default number of cached masks.
pub const DEFAULT_CAPACITY: usize = 4096;

/// Pixel layout of a glyph mask.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MaskFormat {
    /// One coverage byte per pixel; tinted with the paint color.
    Alpha,
    /// Four bytes per pixel (color emoji and the like); drawn as-is.
    Rgba,
}

/// A rasterized glyph bitmap.
#[derive(Clone, Debug)]
pub struct GlyphMask {
    pub width: u32,
    pub height: u32,
    /// Offset from the pen position to the bitmap's left edge.
    pub left: i32,
    /// Offset from the baseline up to the bitmap's top edge.
    pub top: i32,
    pub format: MaskFormat,
    pub data: Vec<u8>,
}

impl GlyphMask {
    /// Build a mask, inferring the format from the data length.
    ///
    /// Returns `None` for zero-sized glyphs or short buffers.
    pub fn from_bitmap(width: u32, height: u32, data: Vec<u8>) -> Option<Self> {
        if width == 0 || height == 0 {
            return None;
        }
        let pixels = (width * height) as usize;
        let format = if data.len() >= pixels * 4 {
            MaskFormat::Rgba
        } else if data.len() >= pixels {
            MaskFormat::Alpha
        } else {
            return None;
        };
        Some(Self {
            width,
            height,
            left: 0,
            top: 0,
            format,
            data,
        })
    }

    /// Set the bearing offsets reported by the rasterizer.
    pub fn with_placement(mut self, left: i32, top: i32) -> Self {
        self.left = left;
        self.top = top;
        self
    }

    /// Coverage of pixel `(x, y)` in [0, 255]. Out of range reads are 0.
    pub fn coverage(&self, x: u32, y: u32) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        let idx = (y * self.width + x) as usize;
        match self.format {
            MaskFormat::Alpha => self.data[idx],
            MaskFormat::Rgba => self.data[idx * 4 + 3],
        }
    }

    /// RGBA of pixel `(x, y)` for color masks; `None` for alpha masks.
    pub fn color(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if self.format != MaskFormat::Rgba || x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        Some([
            self.data[idx],
            self.data[idx + 1],
            self.data[idx + 2],
            self.data[idx + 3],
        ])
    }
}

/// LRU cache of glyph masks.
pub struct GlyphCache<K: Hash + Eq> {
    masks: LruCache<K, Arc<GlyphMask>>,
    hits: u64,
    misses: u64,
}

impl<K: Hash + Eq> Default for GlyphCache<K> {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

impl<K: Hash + Eq> GlyphCache<K> {
    /// Create a cache holding at most `capacity` masks (minimum 1).
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            masks: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Number of masks currently cached.
    pub fn len(&self) -> usize {
        self.masks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.is_empty()
    }

    /// Look up a previously rasterized glyph.
    pub fn get(&mut self, key: &K) -> Option<Arc<GlyphMask>> {
        self.masks.get(key).cloned()
    }

    /// Return the cached mask for `key`, rasterizing it on a miss.
    ///
    /// Glyphs `rasterize` cannot produce (whitespace, missing fonts) are
    /// not cached, so they are retried next time.
    pub fn get_or_rasterize<F>(&mut self, key: K, rasterize: F) -> Option<Arc<GlyphMask>>
    where
        F: FnOnce() -> Option<GlyphMask>,
    {
        if let Some(mask) = self.masks.get(&key) {
            self.hits += 1;
            return Some(Arc::clone(mask));
        }
        self.misses += 1;
        let mask = Arc::new(rasterize()?);
        self.masks.put(key, Arc::clone(&mask));
        Some(mask)
    }

    /// `(hits, misses)` since creation or the last [`clear`](Self::clear).
    pub fn stats(&self) -> (u64, u64) {
        (self.hits, self.misses)
    }

    /// Drop every cached mask.
    pub fn clear(&mut self) {
        self.masks.clear();
        self.hits = 0;
        self.misses = 0;
    }
}

// ===================================================================
// Tests
// ===================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn alpha(width: u32, height: u32, value: u8) -> GlyphMask {
        GlyphMask::from_bitmap(width, height, vec![value; (width * height) as usize]).unwrap()
    }

    #[test]
    fn test_mask_format_inference() {
        assert_eq!(alpha(4, 4, 255).format, MaskFormat::Alpha);
        let rgba = GlyphMask::from_bitmap(2, 2, vec![0; 16]).unwrap();
        assert_eq!(rgba.format, MaskFormat::Rgba);
        assert!(GlyphMask::from_bitmap(0, 5, vec![]).is_none());
        assert!(GlyphMask::from_bitmap(4, 4, vec![0; 3]).is_none());
    }

    #[test]
    fn test_mask_placement() {
        let mask = alpha(3, 5, 0).with_placement(1, 4);
        assert_eq!((mask.left, mask.top), (1, 4));
        assert_eq!(alpha(1, 1, 0).left, 0);
    }

    #[test]
    fn test_mask_coverage_and_color() {
        let rgba = GlyphMask::from_bitmap(
            2,
            1,
            vec![
                255, 0, 0, 255, // red
                0, 0, 255, 128, // translucent blue
            ],
        )
        .unwrap();
        assert_eq!(rgba.coverage(0, 0), 255);
        assert_eq!(rgba.coverage(1, 0), 128);
        assert_eq!(rgba.color(1, 0), Some([0, 0, 255, 128]));
        assert_eq!(rgba.coverage(2, 0), 0);

        let mask = alpha(2, 2, 77);
        assert_eq!(mask.coverage(1, 1), 77);
        assert_eq!(mask.color(0, 0), None);
    }

    #[test]
    fn test_miss_then_hit() {
        let mut cache: GlyphCache<u16> = GlyphCache::new(16);
        let first = cache.get_or_rasterize(1, || Some(alpha(8, 8, 255))).unwrap();
        let second = cache
            .get_or_rasterize(1, || panic!("must not rasterize twice"))
            .unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.stats(), (1, 1));
    }

    #[test]
    fn test_failed_raster_not_cached() {
        let mut cache: GlyphCache<u16> = GlyphCache::new(16);
        assert!(cache.get_or_rasterize(7, || None).is_none());
        assert!(cache.is_empty());
        assert!(cache.get_or_rasterize(7, || Some(alpha(2, 2, 9))).is_some());
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_lru_eviction() {
        let mut cache: GlyphCache<u16> = GlyphCache::new(2);
        cache.get_or_rasterize(1, || Some(alpha(1, 1, 1)));
        cache.get_or_rasterize(2, || Some(alpha(1, 1, 2)));
        // Touch 1 so 2 becomes least recently used.
        assert!(cache.get(&1).is_some());
        cache.get_or_rasterize(3, || Some(alpha(1, 1, 3)));

        assert_eq!(cache.len(), 2);
        assert!(cache.get(&2).is_none());
        assert!(cache.get(&1).is_some());
        assert!(cache.get(&3).is_some());
    }

    #[test]
    fn test_zero_capacity_clamps_to_one() {
        let mut cache: GlyphCache<u16> = GlyphCache::new(0);
        cache.get_or_rasterize(1, || Some(alpha(1, 1, 1)));
        cache.get_or_rasterize(2, || Some(alpha(1, 1, 1)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_clear() {
        let mut cache: GlyphCache<u16> = GlyphCache::new(8);
        cache.get_or_rasterize(1, || Some(alpha(1, 1, 1)));
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.stats(), (0, 0));
    }
}
