//! Paint state and display metrics.

use serde::{Deserialize, Serialize};

/// Default font size in scale-independent units.
pub const DEFAULT_FONT_SIZE_SP: f32 = 18.0;

// ── Color ───────────────────────────────────────────────────────────

/// RGBA color, each channel in [0.0, 1.0].
#[derive(Clone, Copy, Serialize, Deserialize, Debug, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    #[serde(default = "opaque")]
    pub a: f32,
}

fn opaque() -> f32 {
    1.0
}

impl Color {
    pub const RED: Color = Color::rgba(1.0, 0.0, 0.0, 1.0);
    pub const BLACK: Color = Color::rgba(0.0, 0.0, 0.0, 1.0);
    pub const WHITE: Color = Color::rgba(1.0, 1.0, 1.0, 1.0);
    pub const TRANSPARENT: Color = Color::rgba(0.0, 0.0, 0.0, 0.0);

    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Decode a packed `0xAARRGGBB` value.
    pub fn from_argb(argb: u32) -> Self {
        let channel = |shift: u32| ((argb >> shift) & 0xFF) as f32 / 255.0;
        Self::rgba(channel(16), channel(8), channel(0), channel(24))
    }

    /// Quantize to 8-bit RGBA.
    pub fn to_rgba8(&self) -> [u8; 4] {
        let q = |v: f32| (v.clamp(0.0, 1.0) * 255.0).round() as u8;
        [q(self.r), q(self.g), q(self.b), q(self.a)]
    }

    pub fn to_array(&self) -> [f32; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::RED
    }
}

// ── Display metrics ─────────────────────────────────────────────────

/// Resolution metrics reported by the host surface.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisplayMetrics {
    /// Logical-to-physical pixel ratio.
    pub density: f32,
    /// Density including the user's font scale preference.
    pub scaled_density: f32,
    pub width_pixels: u32,
    pub height_pixels: u32,
}

impl DisplayMetrics {
    /// Metrics for a surface with no scaling.
    pub fn unscaled(width_pixels: u32, height_pixels: u32) -> Self {
        Self {
            density: 1.0,
            scaled_density: 1.0,
            width_pixels,
            height_pixels,
        }
    }

    /// Convert a scale-independent font size to whole-ish pixels.
    pub fn scale_font_size(&self, sp: f32) -> f32 {
        sp * self.scaled_density + 0.5
    }
}

impl Default for DisplayMetrics {
    fn default() -> Self {
        Self::unscaled(0, 0)
    }
}

// ── Paint ───────────────────────────────────────────────────────────

/// Brush used to lay out and draw text.
#[derive(Clone, Debug, PartialEq)]
pub struct Paint {
    pub color: Color,
    /// Text size in physical pixels.
    pub text_size: f32,
    pub anti_alias: bool,
}

impl Default for Paint {
    fn default() -> Self {
        Self {
            color: Color::RED,
            text_size: DisplayMetrics::default().scale_font_size(DEFAULT_FONT_SIZE_SP),
            anti_alias: true,
        }
    }
}
