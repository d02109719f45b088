//! Loaders for font and font-material assets

use crate::atlas::AtlasConfig;
use crate::font::{CodepointRange, Font, GlyphStorage};
use crate::format::{FontMaterial, FontSpec, SourceSpec, SpriteSpec};
use crate::raster::GlyphRasterizer;
use crate::source::{EntitySource, GlyphSource, SpriteSource, TrueTypeSource};
use ember_asset::{AssetLoader, LoadContext, LoadError, LoadResult};
use ember_core::IdGenerator;
use ember_event::EventBus;
use ember_texture::{TexelRect, Texture, TextureLoader};
use glam::Vec2;
use std::sync::Arc;

/// Loader for `.font` description files
///
/// Parses the JSON block structure and pulls face files and sprite sheets
/// through the context's dependency reader, so a change to any of them
/// re-triggers the font's reload.
pub struct FontLoader {
    ids: Arc<IdGenerator>,
    textures: TextureLoader,
    config: AtlasConfig,
    bus: Option<EventBus>,
}

impl FontLoader {
    /// Create a loader
    ///
    /// `config` carries the driver's texture size ceiling; `bus` receives
    /// texture-changed notifications from the atlases of loaded fonts.
    pub fn new(ids: Arc<IdGenerator>, config: AtlasConfig, bus: Option<EventBus>) -> Self {
        Self {
            textures: TextureLoader::new(ids.clone()),
            ids,
            config,
            bus,
        }
    }

    fn build_source(
        &self,
        spec: &SourceSpec,
        range: Option<CodepointRange>,
        ctx: &mut LoadContext,
    ) -> LoadResult<Box<dyn GlyphSource>> {
        match spec {
            SourceSpec::TrueType(tt) => {
                let bytes = ctx.read_dependency(&tt.file)?;
                let raster = GlyphRasterizer::from_bytes(bytes).map_err(LoadError::from)?;
                Ok(Box::new(TrueTypeSource::new(
                    raster,
                    self.config,
                    self.ids.clone(),
                    self.bus.clone(),
                )))
            }
            SourceSpec::Sprite(sp) => {
                let bytes = ctx.read_dependency(&sp.file)?;
                let sheet = self.textures.decode(&bytes, &sp.file)?;
                Ok(Box::new(bake_sprite_source(sheet, sp, range)))
            }
            SourceSpec::Entity(es) => Ok(Box::new(EntitySource::new(
                es.prefab.clone(),
                es.advance,
                Vec2::new(es.bounds[0], es.bounds[1]),
                Vec2::new(es.bounds[2], es.bounds[3]),
                es.font_size,
            ))),
        }
    }
}

impl AssetLoader for FontLoader {
    type Asset = Font;

    fn extensions(&self) -> &[&str] {
        &["font"]
    }

    fn load(&self, ctx: &mut LoadContext) -> LoadResult<Self::Asset> {
        let spec: FontSpec = serde_json::from_slice(ctx.data)
            .map_err(|e| LoadError::ParseError(format!("{}: {}", ctx.path, e)))?;

        let default_source = self.build_source(&spec.default, None, ctx)?;
        let mut font = Font::new(default_source);

        let mut storages = Vec::with_capacity(spec.ranges.len());
        for range_spec in &spec.ranges {
            let range = CodepointRange::new(range_spec.from, range_spec.to);
            let source = self.build_source(&range_spec.source, Some(range), ctx)?;
            storages.push(GlyphStorage::new(range, source));
        }
        let range_count = storages.len();
        font.set_storages(storages);

        log::info!("Loaded font {} ({} custom ranges)", ctx.path, range_count);
        Ok(font)
    }
}

/// Slice a sheet into baked glyphs, one cell per codepoint
fn bake_sprite_source(
    sheet: Texture,
    spec: &SpriteSpec,
    range: Option<CodepointRange>,
) -> SpriteSource {
    let [cell_w, cell_h] = spec.cell;
    if cell_w == 0 || cell_h == 0 {
        log::warn!("Sprite sheet {} has zero cell size", spec.file);
        return SpriteSource::new(sheet, spec.font_size);
    }

    let cols = sheet.width() / cell_w;
    let sheet_rows = sheet.height() / cell_h;
    let capacity = cols * sheet_rows;
    if capacity == 0 {
        log::warn!(
            "Sprite sheet {} ({}x{}) smaller than one {}x{} cell",
            spec.file,
            sheet.width(),
            sheet.height(),
            cell_w,
            cell_h
        );
        return SpriteSource::new(sheet, spec.font_size);
    }

    let first = range.map(|r| r.from).unwrap_or(spec.first_codepoint);
    let mut count = range.map(|r| r.count()).unwrap_or(capacity);
    if count > capacity {
        log::warn!(
            "Sprite sheet {} holds {} cells but the range spans {}; truncating",
            spec.file,
            capacity,
            count
        );
        count = capacity;
    }

    let offset = Vec2::new(spec.offset[0], spec.offset[1]);
    let mut source = SpriteSource::new(sheet, spec.font_size);
    for i in 0..count {
        let codepoint = match char::from_u32(first + i) {
            Some(c) => c,
            None => continue,
        };
        let region = TexelRect::new((i % cols) * cell_w, (i / cols) * cell_h, cell_w, cell_h);
        source.insert(codepoint, region, spec.advance, offset);
    }
    source
}

/// Loader for `.fontmat` material files
pub struct FontMaterialLoader;

impl AssetLoader for FontMaterialLoader {
    type Asset = FontMaterial;

    fn extensions(&self) -> &[&str] {
        &["fontmat"]
    }

    fn load(&self, ctx: &mut LoadContext) -> LoadResult<Self::Asset> {
        serde_json::from_slice(ctx.data)
            .map_err(|e| LoadError::ParseError(format!("{}: {}", ctx.path, e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_asset::AssetId;
    use image::{ImageBuffer, Rgba};

    fn sheet_png(width: u32, height: u32) -> Vec<u8> {
        let img: ImageBuffer<Rgba<u8>, Vec<u8>> =
            ImageBuffer::from_pixel(width, height, Rgba([255, 255, 255, 255]));
        let mut bytes = Vec::new();
        img.write_to(
            &mut std::io::Cursor::new(&mut bytes),
            image::ImageFormat::Png,
        )
        .unwrap();
        bytes
    }

    fn loader() -> FontLoader {
        FontLoader::new(
            Arc::new(IdGenerator::new()),
            AtlasConfig::default(),
            None,
        )
    }

    const DESCRIPTION: &str = r#"{
        "default": { "sprite": { "file": "textures/ascii.png", "fontSize": 32,
                                 "advance": 18.0, "cell": [20, 32],
                                 "firstCodepoint": 48 } },
        "ranges": [
            { "from": 128512, "to": 128515,
              "entity": { "prefab": "prefabs/emoji.ui", "fontSize": 64,
                          "advance": 64.0, "bounds": [0.0, 64.0, 64.0, 64.0] } }
        ]
    }"#;

    fn read_fixture(path: &str) -> Option<Vec<u8>> {
        match path {
            "textures/ascii.png" => Some(sheet_png(40, 32)),
            _ => None,
        }
    }

    #[test]
    fn test_load_font_from_description() {
        let loader = loader();
        let read = read_fixture;
        let mut ctx =
            LoadContext::new("fonts/main.font", DESCRIPTION.as_bytes(), AssetId::new(1))
                .with_reader(&read);

        let mut font = loader.load(&mut ctx).unwrap();
        assert_eq!(font.storages().len(), 1);
        assert_eq!(ctx.dependencies, ["textures/ascii.png"]);

        // Default sprite sheet: 2 cells baked starting at '0'
        let zero = font.ensure_glyph('0', 32).unwrap();
        assert_eq!(zero.advance, 18.0);
        assert!(zero.has_pixels());

        // Scaled to twice the design size
        let doubled = font.ensure_glyph('1', 64).unwrap();
        assert_eq!(doubled.advance, 36.0);
        assert_eq!(doubled.texel, TexelRect::new(20, 0, 20, 32));

        // Third cell does not exist on the 40x32 sheet
        assert!(font.ensure_glyph('2', 32).is_none());

        // Entity range serves the emoji block without pixels
        let emoji = font.ensure_glyph('\u{1F600}', 32).unwrap();
        assert!(!emoji.has_pixels());
        assert_eq!(emoji.advance, 32.0);
    }

    #[test]
    fn test_missing_dependency_fails_load() {
        let loader = loader();
        let read = |_: &str| None;
        let description = r#"{
            "default": { "sprite": { "file": "textures/absent.png", "fontSize": 32,
                                     "advance": 18.0, "cell": [20, 32] } }
        }"#;
        let mut ctx = LoadContext::new("fonts/broken.font", description.as_bytes(), AssetId::new(2))
            .with_reader(&read);

        assert!(matches!(
            loader.load(&mut ctx),
            Err(LoadError::NotFound(_))
        ));
    }

    #[test]
    fn test_invalid_json_is_parse_error() {
        let loader = loader();
        let mut ctx = LoadContext::new("fonts/bad.font", b"not json", AssetId::new(3));

        assert!(matches!(
            loader.load(&mut ctx),
            Err(LoadError::ParseError(_))
        ));
    }

    #[test]
    fn test_material_loader() {
        let json = br#"{ "font": "fonts/main.font", "size": 24, "outlineThickness": 2.0 }"#;
        let mut ctx = LoadContext::new("materials/title.fontmat", json, AssetId::new(4));

        let material = FontMaterialLoader.load(&mut ctx).unwrap();
        assert_eq!(material.font, "fonts/main.font");
        assert_eq!(material.size, 24);
        assert_eq!(material.outline_thickness, 2.0);
    }
}
