//! Sprites - named regions of a texture

use crate::rect::{TexelRect, UvRect};
use crate::texture::TextureId;

/// A rectangular region of a texture
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Sprite {
    /// Backing texture
    pub texture: TextureId,
    /// Region in texels
    pub region: TexelRect,
    /// Region in normalized coordinates
    pub uv: UvRect,
}

impl Sprite {
    /// Create a sprite from a region of a surface of the given size
    pub fn from_region(
        texture: TextureId,
        region: TexelRect,
        surface_width: u32,
        surface_height: u32,
    ) -> Self {
        Self {
            texture,
            region,
            uv: region.to_uv(surface_width, surface_height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::Id;

    #[test]
    fn test_from_region_normalizes() {
        let sprite = Sprite::from_region(
            TextureId(Id::new(0, 0)),
            TexelRect::new(16, 0, 16, 32),
            64,
            64,
        );
        assert_eq!(sprite.uv.min.x, 0.25);
        assert_eq!(sprite.uv.max.x, 0.5);
        assert_eq!(sprite.uv.max.y, 0.5);
    }
}
