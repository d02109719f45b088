//! Glyph records and cache keys

use ember_texture::{TexelRect, TextureId, UvRect};
use glam::Vec2;

/// A resolved glyph: metrics plus its placement in a texture
///
/// Produced once per (codepoint, size) key and cached; only atlas
/// regeneration rewrites the texture reference and UVs in place.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct FontGlyph {
    /// Horizontal advance in pixels
    pub advance: f32,
    /// Bearing of the glyph box relative to the baseline pen position
    /// (x right, y up to the box top)
    pub offset: Vec2,
    /// Glyph box size in pixels
    pub size: Vec2,
    /// Backing texture, if the glyph has pixels
    pub texture: Option<TextureId>,
    /// Placement in the backing texture, in texels
    pub texel: TexelRect,
    /// Placement in normalized texture coordinates
    pub uv: UvRect,
}

impl FontGlyph {
    /// Whether the glyph has any pixels to draw
    pub fn has_pixels(&self) -> bool {
        self.texture.is_some()
    }

    /// The glyph scaled by a uniform factor
    ///
    /// Texture placement is untouched; only metrics scale. Used by sprite
    /// and entity backed ranges rendering at sizes other than the baked one.
    pub fn scaled(&self, factor: f32) -> Self {
        Self {
            advance: self.advance * factor,
            offset: self.offset * factor,
            size: self.size * factor,
            ..*self
        }
    }
}

/// Cache key for an outlined glyph page
///
/// A 64-bit composite of the font size and the outline thickness bit
/// pattern, so distinct thicknesses can never collide even when they are
/// close in value.
pub fn outline_page_key(size: u32, thickness: f32) -> u64 {
    ((size as u64) << 32) | thickness.to_bits() as u64
}
