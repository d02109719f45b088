//! # ember_font - Fonts, Glyphs and Atlases
//!
//! The text asset subsystem:
//! - [`GlyphRasterizer`] wraps FreeType for per-codepoint coverage bitmaps,
//!   with stroker-based outline expansion
//! - [`AtlasPage`] packs glyph rects into growable texture pages using
//!   row/shelf placement
//! - [`Font`] aggregates codepoint ranges over [`GlyphSource`] backends
//!   (TrueType, sprite sheet, entity prefab) with a default fallback range
//! - [`FontLoader`] / [`FontMaterialLoader`] read the JSON description
//!   formats and register with the asset server
//!
//! Everything runs inline on the calling thread during the text pass; the
//! first request for a new (codepoint, size) pays rasterization and packing
//! cost, later requests hit the per-page glyph cache.

pub mod atlas;
pub mod error;
pub mod font;
pub mod format;
pub mod glyph;
pub mod loader;
pub mod raster;
pub mod source;

#[cfg(feature = "hot-reload")]
pub mod watcher;

pub use atlas::{AtlasConfig, AtlasPage, AtlasRow, Placement};
pub use error::FontError;
pub use font::{CodepointRange, Font, GlyphStorage};
pub use format::{EntitySpec, FontMaterial, FontSpec, RangeSpec, SourceSpec, SpriteSpec, TrueTypeSpec};
pub use glyph::{outline_page_key, FontGlyph};
pub use loader::{FontLoader, FontMaterialLoader};
pub use raster::{GlyphRasterizer, LineMetrics, RasterizedGlyph};
pub use source::{EntitySource, GlyphSource, SpriteSource, TexturesChanged, TrueTypeSource};

#[cfg(feature = "hot-reload")]
pub use watcher::NotifyWatcher;

/// Prelude - commonly used types
pub mod prelude {
    pub use crate::atlas::{AtlasConfig, AtlasPage};
    pub use crate::font::{CodepointRange, Font, GlyphStorage};
    pub use crate::format::{FontMaterial, FontSpec};
    pub use crate::glyph::FontGlyph;
    pub use crate::loader::{FontLoader, FontMaterialLoader};
    pub use crate::source::{GlyphSource, TexturesChanged};
}
