//! # ember_texture - Textures and Sprites
//!
//! CPU-side pixel surfaces as used by the font system: atlas pages write
//! rasterized glyphs into a [`Texture`], sprite glyph ranges slice regions
//! out of a decoded sheet. Upload to the GPU is a renderer concern and
//! happens elsewhere; this crate only owns pixels and regions.

pub mod loader;
pub mod rect;
pub mod sprite;
pub mod texture;

pub use loader::TextureLoader;
pub use rect::{TexelRect, UvRect};
pub use sprite::Sprite;
pub use texture::{Texture, TextureId};

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::loader::TextureLoader;
    pub use crate::rect::{TexelRect, UvRect};
    pub use crate::sprite::Sprite;
    pub use crate::texture::{Texture, TextureId};
}
