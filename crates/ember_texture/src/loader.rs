//! Texture loader for PNG, JPG, BMP images

use crate::texture::{Texture, TextureId};
use ember_asset::{AssetLoader, LoadContext, LoadError, LoadResult};
use ember_core::IdGenerator;
use std::sync::Arc;

/// Loader for image textures
///
/// Decodes to RGBA8 via the `image` crate. Texture IDs come from a shared
/// generator so every decoded surface is addressable engine-wide.
pub struct TextureLoader {
    ids: Arc<IdGenerator>,
}

impl TextureLoader {
    /// Create a new texture loader
    pub fn new(ids: Arc<IdGenerator>) -> Self {
        Self { ids }
    }

    /// Decode image bytes into a texture
    pub fn decode(&self, data: &[u8], path: &str) -> LoadResult<Texture> {
        let img = image::load_from_memory(data).map_err(|e| {
            LoadError::ParseError(format!("Failed to decode image {}: {}", path, e))
        })?;

        let rgba = img.to_rgba8();
        let (width, height) = rgba.dimensions();

        log::debug!("Decoded texture {} ({}x{})", path, width, height);

        Texture::from_rgba8(TextureId(self.ids.next()), width, height, rgba.into_raw())
            .ok_or_else(|| LoadError::ParseError(format!("Inconsistent image buffer: {}", path)))
    }
}

impl AssetLoader for TextureLoader {
    type Asset = Texture;

    fn extensions(&self) -> &[&str] {
        &["png", "jpg", "jpeg", "bmp"]
    }

    fn load(&self, ctx: &mut LoadContext) -> LoadResult<Self::Asset> {
        self.decode(ctx.data, ctx.path)
    }
}
