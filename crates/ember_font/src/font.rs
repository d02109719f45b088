//! Fonts - codepoint ranges aggregated over glyph sources

use crate::glyph::FontGlyph;
use crate::raster::LineMetrics;
use crate::source::GlyphSource;
use ember_texture::{Texture, TextureId};
use std::collections::HashMap;

/// An inclusive span of Unicode codepoints
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CodepointRange {
    pub from: u32,
    pub to: u32,
}

impl CodepointRange {
    /// Create a range; `from` and `to` are inclusive
    pub const fn new(from: u32, to: u32) -> Self {
        Self { from, to }
    }

    /// Check whether a codepoint falls inside the range
    pub fn contains(&self, codepoint: char) -> bool {
        let cp = codepoint as u32;
        self.from <= cp && cp <= self.to
    }

    /// Number of codepoints spanned; `from == to` spans one
    pub const fn count(&self) -> u32 {
        if self.to < self.from {
            0
        } else {
            self.to - self.from + 1
        }
    }
}

/// A codepoint range bound to its glyph backend
pub struct GlyphStorage {
    range: CodepointRange,
    source: Box<dyn GlyphSource>,
}

impl GlyphStorage {
    /// Bind a range to a source
    pub fn new(range: CodepointRange, source: Box<dyn GlyphSource>) -> Self {
        Self { range, source }
    }

    /// The covered range
    pub fn range(&self) -> CodepointRange {
        self.range
    }

    /// The backing source
    pub fn source_mut(&mut self) -> &mut dyn GlyphSource {
        self.source.as_mut()
    }
}

/// A font: custom codepoint ranges plus a default backend
///
/// Ranges are expected not to overlap (not enforced); resolution scans the
/// list in declaration order and memoizes the result per codepoint. The
/// memo is cleared whenever ranges are replaced, which happens only on
/// asset load and reload.
pub struct Font {
    storages: Vec<GlyphStorage>,
    default_source: Box<dyn GlyphSource>,
    lookup: HashMap<char, Option<usize>>,
}

impl Font {
    /// Create a font with only a default backend
    pub fn new(default_source: Box<dyn GlyphSource>) -> Self {
        Self {
            storages: Vec::new(),
            default_source,
            lookup: HashMap::new(),
        }
    }

    /// Replace every custom range, invalidating the resolution memo
    pub fn set_storages(&mut self, storages: Vec<GlyphStorage>) {
        self.storages = storages;
        self.lookup.clear();
    }

    /// Append a custom range, invalidating the resolution memo
    pub fn add_storage(&mut self, storage: GlyphStorage) {
        self.storages.push(storage);
        self.lookup.clear();
    }

    /// The custom ranges in declaration order
    pub fn storages(&self) -> &[GlyphStorage] {
        &self.storages
    }

    /// Resolve the custom storage owning a codepoint, `None` for default
    fn resolve(&mut self, codepoint: char) -> Option<usize> {
        if let Some(&slot) = self.lookup.get(&codepoint) {
            return slot;
        }
        let slot = self
            .storages
            .iter()
            .position(|s| s.range.contains(codepoint));
        self.lookup.insert(codepoint, slot);
        slot
    }

    /// The custom storage owning a codepoint, or `None` when the default
    /// range will serve it
    pub fn storage_for(&mut self, codepoint: char) -> Option<&mut GlyphStorage> {
        let slot = self.resolve(codepoint)?;
        self.storages.get_mut(slot)
    }

    /// Resolve a glyph, rasterizing and caching on first request
    pub fn ensure_glyph(&mut self, codepoint: char, size: u32) -> Option<FontGlyph> {
        match self.resolve(codepoint) {
            Some(slot) => self.storages.get_mut(slot)?.source.glyph(codepoint, size),
            None => self.default_source.glyph(codepoint, size),
        }
    }

    /// Resolve an outlined glyph variant
    pub fn ensure_outlined_glyph(
        &mut self,
        codepoint: char,
        size: u32,
        thickness: f32,
    ) -> Option<FontGlyph> {
        match self.resolve(codepoint) {
            Some(slot) => self
                .storages
                .get_mut(slot)?
                .source
                .outlined_glyph(codepoint, size, thickness),
            None => self
                .default_source
                .outlined_glyph(codepoint, size, thickness),
        }
    }

    /// Vertical metrics from the default backend
    pub fn line_metrics(&mut self, size: u32) -> Option<LineMetrics> {
        self.default_source.line_metrics(size)
    }

    /// Find a backing texture across all sources
    pub fn texture(&self, id: TextureId) -> Option<&Texture> {
        self.default_source.texture(id).or_else(|| {
            self.storages
                .iter()
                .find_map(|s| s.source.texture(id))
        })
    }
}

impl core::fmt::Debug for Font {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Font")
            .field("ranges", &self.storages.len())
            .field("memoized", &self.lookup.len())
            .finish()
    }
}
