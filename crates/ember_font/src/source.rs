//! Glyph sources - the backends a codepoint range can resolve against
//!
//! Each storage kind is a [`GlyphSource`] implementation instead of an enum
//! switched over at every call site: TrueType ranges rasterize and pack on
//! demand, sprite ranges serve pre-baked sheet regions, entity ranges carry
//! prefab metrics with no backing texture.

use crate::atlas::{AtlasConfig, AtlasPage};
use crate::glyph::{outline_page_key, FontGlyph};
use crate::raster::{GlyphRasterizer, LineMetrics, RasterizedGlyph};
use ember_core::IdGenerator;
use ember_event::EventBus;
use ember_texture::{Sprite, TexelRect, Texture, TextureId};
use glam::Vec2;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

/// Published on the event bus when a source's backing texture is replaced
///
/// Fired once per atlas resize; consumers holding GPU copies of the old
/// texture re-upload and re-resolve their cached references.
#[derive(Clone, Copy, Debug)]
pub struct TexturesChanged {
    /// The replacement texture
    pub texture: TextureId,
}

/// A backend capable of resolving codepoints to glyphs
pub trait GlyphSource {
    /// Resolve a glyph at a pixel size, producing it on first request
    ///
    /// `None` means the backend cannot serve the codepoint (missing sheet
    /// cell, face without the glyph, unsupported size); callers render
    /// nothing rather than failing.
    fn glyph(&mut self, codepoint: char, size: u32) -> Option<FontGlyph>;

    /// Resolve an outlined variant
    ///
    /// Backends without outline support fall back to the plain glyph.
    fn outlined_glyph(&mut self, codepoint: char, size: u32, thickness: f32) -> Option<FontGlyph> {
        let _ = thickness;
        self.glyph(codepoint, size)
    }

    /// Access a backing texture owned by this source
    fn texture(&self, id: TextureId) -> Option<&Texture> {
        let _ = id;
        None
    }

    /// Vertical metrics at a pixel size, when the backend has a face
    fn line_metrics(&mut self, size: u32) -> Option<LineMetrics> {
        let _ = size;
        None
    }
}

/// TrueType-backed source: rasterizes into per-size atlas pages
pub struct TrueTypeSource {
    raster: GlyphRasterizer,
    pages: HashMap<u32, AtlasPage>,
    outline_pages: HashMap<u64, AtlasPage>,
    config: AtlasConfig,
    ids: Arc<IdGenerator>,
    bus: Option<EventBus>,
}

impl TrueTypeSource {
    /// Create a source around a rasterizer
    pub fn new(
        raster: GlyphRasterizer,
        config: AtlasConfig,
        ids: Arc<IdGenerator>,
        bus: Option<EventBus>,
    ) -> Self {
        Self {
            raster,
            pages: HashMap::new(),
            outline_pages: HashMap::new(),
            config,
            ids,
            bus,
        }
    }

    /// Number of atlas pages currently alive (plain + outlined)
    pub fn page_count(&self) -> usize {
        self.pages.len() + self.outline_pages.len()
    }

    fn bake(
        page: &mut AtlasPage,
        codepoint: char,
        raster: RasterizedGlyph,
        bus: &Option<EventBus>,
    ) -> FontGlyph {
        // Zero-area glyphs (spaces) keep their advance but own no pixels.
        if raster.width == 0 || raster.height == 0 {
            let glyph = FontGlyph {
                advance: raster.advance,
                offset: Vec2::new(raster.left as f32, raster.top as f32),
                ..FontGlyph::default()
            };
            page.insert_glyph(codepoint, glyph);
            return glyph;
        }

        let placement = page.place(raster.width, raster.height);
        let rect = placement.rect;
        page.write_pixels(rect, &coverage_to_rgba(&raster, rect));

        if placement.texture_replaced {
            if let Some(bus) = bus {
                bus.publish(&TexturesChanged {
                    texture: page.texture().id(),
                });
            }
        }

        let glyph = FontGlyph {
            advance: raster.advance,
            offset: Vec2::new(raster.left as f32, raster.top as f32),
            size: Vec2::new(raster.width as f32, raster.height as f32),
            texture: Some(page.texture().id()),
            texel: rect,
            uv: rect.to_uv(page.texture().width(), page.texture().height()),
        };
        page.insert_glyph(codepoint, glyph);
        glyph
    }
}

impl GlyphSource for TrueTypeSource {
    fn glyph(&mut self, codepoint: char, size: u32) -> Option<FontGlyph> {
        let page = match self.pages.entry(size) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => v.insert(AtlasPage::new(TextureId(self.ids.next()), &self.config)),
        };

        if let Some(glyph) = page.glyph(codepoint) {
            return Some(*glyph);
        }

        let raster = match self.raster.rasterize(codepoint, size) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Rasterization failed: {}", e);
                return None;
            }
        };

        Some(Self::bake(page, codepoint, raster, &self.bus))
    }

    fn outlined_glyph(&mut self, codepoint: char, size: u32, thickness: f32) -> Option<FontGlyph> {
        let key = outline_page_key(size, thickness);
        let page = match self.outline_pages.entry(key) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => v.insert(AtlasPage::new(TextureId(self.ids.next()), &self.config)),
        };

        if let Some(glyph) = page.glyph(codepoint) {
            return Some(*glyph);
        }

        let raster = match self.raster.rasterize_outlined(codepoint, size, thickness) {
            Ok(r) => r,
            Err(e) => {
                log::warn!("Outline rasterization failed: {}", e);
                return None;
            }
        };

        Some(Self::bake(page, codepoint, raster, &self.bus))
    }

    fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.pages
            .values()
            .chain(self.outline_pages.values())
            .map(|p| p.texture())
            .find(|t| t.id() == id)
    }

    fn line_metrics(&mut self, size: u32) -> Option<LineMetrics> {
        match self.raster.line_metrics(size) {
            Ok(m) => Some(m),
            Err(e) => {
                log::warn!("No line metrics at size {}: {}", size, e);
                None
            }
        }
    }
}

/// Expand coverage into white RGBA, clipped to the placed rect
///
/// Color channels are fixed white; tinting happens in the material. The
/// clip only matters for the degenerate placement of an exhausted page.
fn coverage_to_rgba(raster: &RasterizedGlyph, rect: TexelRect) -> Vec<u8> {
    let mut rgba = Vec::with_capacity((rect.width * rect.height * 4) as usize);
    for y in 0..rect.height {
        for x in 0..rect.width {
            let alpha = if x < raster.width && y < raster.height {
                raster.coverage[(y * raster.width + x) as usize]
            } else {
                0
            };
            rgba.extend_from_slice(&[255, 255, 255, alpha]);
        }
    }
    rgba
}

/// Sprite-backed source: pre-baked glyphs sliced from a sheet texture
///
/// Glyphs are baked once at the sheet's design size and scaled linearly
/// when requested at other sizes.
pub struct SpriteSource {
    sheet: Texture,
    glyphs: HashMap<char, FontGlyph>,
    design_size: u32,
}

impl SpriteSource {
    /// Create a source over a decoded sheet
    pub fn new(sheet: Texture, design_size: u32) -> Self {
        Self {
            sheet,
            glyphs: HashMap::new(),
            design_size: design_size.max(1),
        }
    }

    /// Bake a glyph from a sheet region
    pub fn insert(&mut self, codepoint: char, region: TexelRect, advance: f32, offset: Vec2) {
        let sprite =
            Sprite::from_region(self.sheet.id(), region, self.sheet.width(), self.sheet.height());
        let glyph = FontGlyph {
            advance,
            offset,
            size: Vec2::new(region.width as f32, region.height as f32),
            texture: Some(sprite.texture),
            texel: sprite.region,
            uv: sprite.uv,
        };
        self.glyphs.insert(codepoint, glyph);
    }

    /// Number of baked glyphs
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }
}

impl GlyphSource for SpriteSource {
    fn glyph(&mut self, codepoint: char, size: u32) -> Option<FontGlyph> {
        let base = self.glyphs.get(&codepoint)?;
        Some(base.scaled(size as f32 / self.design_size as f32))
    }

    fn texture(&self, id: TextureId) -> Option<&Texture> {
        (self.sheet.id() == id).then(|| &self.sheet)
    }
}

/// Entity-backed source: prefab glyphs with metrics but no texture
///
/// Used for widget glyphs (emoji prefabs); the engine instantiates the
/// prefab where the glyph would render, so only scaled bounds and advance
/// matter here.
pub struct EntitySource {
    prefab: String,
    advance: f32,
    offset: Vec2,
    size: Vec2,
    design_size: u32,
}

impl EntitySource {
    /// Create a source for a prefab reference
    pub fn new(prefab: String, advance: f32, offset: Vec2, size: Vec2, design_size: u32) -> Self {
        Self {
            prefab,
            advance,
            offset,
            size,
            design_size: design_size.max(1),
        }
    }

    /// The prefab asset path
    pub fn prefab(&self) -> &str {
        &self.prefab
    }
}

impl GlyphSource for EntitySource {
    fn glyph(&mut self, _codepoint: char, size: u32) -> Option<FontGlyph> {
        let factor = size as f32 / self.design_size as f32;
        Some(FontGlyph {
            advance: self.advance * factor,
            offset: self.offset * factor,
            size: self.size * factor,
            ..FontGlyph::default()
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::Id;

    fn sheet(w: u32, h: u32) -> Texture {
        Texture::new(TextureId(Id::new(5, 0)), w, h)
    }

    #[test]
    fn test_sprite_glyph_scales_metrics_only() {
        let mut source = SpriteSource::new(sheet(64, 64), 32);
        source.insert(
            '0',
            TexelRect::new(0, 0, 16, 32),
            18.0,
            Vec2::new(1.0, 30.0),
        );

        let base = source.glyph('0', 32).unwrap();
        assert_eq!(base.advance, 18.0);

        let double = source.glyph('0', 64).unwrap();
        assert_eq!(double.advance, 36.0);
        assert_eq!(double.offset, Vec2::new(2.0, 60.0));
        assert_eq!(double.size, Vec2::new(32.0, 64.0));
        // Texture placement is the baked one
        assert_eq!(double.texel, base.texel);
        assert_eq!(double.texture, base.texture);
    }

    #[test]
    fn test_sprite_unknown_codepoint_is_none() {
        let mut source = SpriteSource::new(sheet(64, 64), 32);
        assert!(source.glyph('x', 32).is_none());
    }

    #[test]
    fn test_sprite_outlined_falls_back_to_plain() {
        let mut source = SpriteSource::new(sheet(64, 64), 32);
        source.insert('0', TexelRect::new(0, 0, 16, 32), 18.0, Vec2::ZERO);

        let plain = source.glyph('0', 32).unwrap();
        let outlined = source.outlined_glyph('0', 32, 2.0).unwrap();
        assert_eq!(plain, outlined);
    }

    #[test]
    fn test_entity_glyph_has_no_texture() {
        let mut source = EntitySource::new(
            "prefabs/emoji.ui".to_string(),
            64.0,
            Vec2::ZERO,
            Vec2::new(64.0, 64.0),
            64,
        );

        let glyph = source.glyph('\u{1F600}', 32).unwrap();
        assert!(!glyph.has_pixels());
        assert_eq!(glyph.advance, 32.0);
        assert_eq!(glyph.size, Vec2::new(32.0, 32.0));
    }

    #[test]
    fn test_sprite_texture_lookup() {
        let sheet = sheet(16, 16);
        let id = sheet.id();
        let source = SpriteSource::new(sheet, 16);

        assert!(source.texture(id).is_some());
        assert!(source.texture(TextureId(Id::new(99, 0))).is_none());
    }
}
