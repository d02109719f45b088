//! Texture atlas pages with row/shelf packing
//!
//! A page is a growable RGBA surface divided into horizontal rows. Glyphs
//! are placed left to right inside a row of compatible height; when no row
//! fits, a new row opens below the last one; when the page itself is full it
//! doubles in both dimensions up to the texture size ceiling, carrying the
//! old pixels and rewriting the normalized coordinates of every cached
//! glyph (absolute texel rects are invariant across growth).

use crate::glyph::FontGlyph;
use ember_texture::{TexelRect, Texture, TextureId};
use std::collections::HashMap;

/// Fraction of a row's height a glyph must reach to reuse the row
const ROW_FIT_MIN_RATIO: f32 = 0.7;

/// Height factor for freshly opened rows, leaving a little slack
const ROW_GROWTH_FACTOR: f32 = 1.1;

/// Padding reserved around every glyph to avoid bilinear bleeding
const GLYPH_PADDING: u32 = 1;

/// Atlas sizing parameters
///
/// `max_size` is the driver's maximum texture dimension; pages refuse to
/// grow past it.
#[derive(Clone, Copy, Debug)]
pub struct AtlasConfig {
    /// Edge length of a fresh page
    pub initial_size: u32,
    /// Hard ceiling for page growth
    pub max_size: u32,
}

impl Default for AtlasConfig {
    fn default() -> Self {
        Self {
            initial_size: 256,
            max_size: 4096,
        }
    }
}

/// A shelf inside an atlas page
///
/// Width only ever grows; rows are never compacted short of regenerating
/// the whole page.
#[derive(Clone, Copy, Debug)]
pub struct AtlasRow {
    /// Vertical offset of the row's top edge
    pub y: u32,
    /// Horizontal space consumed so far
    pub width: u32,
    /// Row height, fixed at creation
    pub height: u32,
}

/// Result of a placement request
#[derive(Clone, Copy, Debug)]
pub struct Placement {
    /// Where the glyph pixels may be written
    pub rect: TexelRect,
    /// Whether the page texture was replaced to satisfy the request
    ///
    /// When set, previously returned texel rects are still valid but the
    /// texture id changed and cached UVs were renormalized; signal the
    /// change to texture consumers exactly once.
    pub texture_replaced: bool,
}

/// One atlas texture with its rows and cached glyphs
pub struct AtlasPage {
    texture: Texture,
    rows: Vec<AtlasRow>,
    glyphs: HashMap<char, FontGlyph>,
    max_size: u32,
}

impl AtlasPage {
    /// Create an empty page
    pub fn new(id: TextureId, config: &AtlasConfig) -> Self {
        Self {
            texture: Texture::new(id, config.initial_size, config.initial_size),
            rows: Vec::new(),
            glyphs: HashMap::new(),
            max_size: config.max_size,
        }
    }

    /// The page's backing texture
    pub fn texture(&self) -> &Texture {
        &self.texture
    }

    /// Look up a cached glyph
    pub fn glyph(&self, codepoint: char) -> Option<&FontGlyph> {
        self.glyphs.get(&codepoint)
    }

    /// Cache a resolved glyph
    pub fn insert_glyph(&mut self, codepoint: char, glyph: FontGlyph) {
        self.glyphs.insert(codepoint, glyph);
    }

    /// Number of cached glyphs
    pub fn glyph_count(&self) -> usize {
        self.glyphs.len()
    }

    /// Rows currently open on the page
    pub fn rows(&self) -> &[AtlasRow] {
        &self.rows
    }

    /// Write glyph pixels into the page at a previously placed rect
    pub fn write_pixels(&mut self, rect: TexelRect, rgba: &[u8]) {
        self.texture
            .write_region(rect.x, rect.y, rect.width, rect.height, rgba);
    }

    /// Reserve a rectangle for a `width` x `height` glyph
    ///
    /// The returned rect is the inner area; one padding texel on every side
    /// is reserved beyond it. When the page cannot grow any further the
    /// rect degrades to 2x2 and the glyph will render visibly wrong rather
    /// than crash the text pass.
    pub fn place(&mut self, width: u32, height: u32) -> Placement {
        let padded_w = width + 2 * GLYPH_PADDING;
        let padded_h = height + 2 * GLYPH_PADDING;
        let mut texture_replaced = false;

        loop {
            // Best-fit row scan: candidates are rows the glyph fits into at
            // 70%..100% of the row height. A candidate only loses when its
            // ratio is strictly below the running best, so the scan keeps
            // the first row at the maximum ratio.
            let mut best: Option<usize> = None;
            let mut best_ratio = 0.0f32;
            for (i, row) in self.rows.iter().enumerate() {
                if row.width + padded_w > self.texture.width() {
                    continue;
                }
                let ratio = padded_h as f32 / row.height as f32;
                if !(ROW_FIT_MIN_RATIO..=1.0).contains(&ratio) {
                    continue;
                }
                if ratio < best_ratio {
                    continue;
                }
                best_ratio = ratio;
                best = Some(i);
            }

            if let Some(i) = best {
                return Placement {
                    rect: self.reserve(i, width, height),
                    texture_replaced,
                };
            }

            // No usable row: open one below the last, slightly taller than
            // the glyph so near-height successors can share it.
            let row_height = (padded_h as f32 * ROW_GROWTH_FACTOR).round() as u32;
            let row_y = self.rows.last().map(|r| r.y + r.height).unwrap_or(0);

            if row_y + row_height <= self.texture.height() && padded_w <= self.texture.width() {
                self.rows.push(AtlasRow {
                    y: row_y,
                    width: 0,
                    height: row_height,
                });
                let i = self.rows.len() - 1;
                return Placement {
                    rect: self.reserve(i, width, height),
                    texture_replaced,
                };
            }

            // Page exhausted: double it, or give up at the ceiling.
            if !self.grow() {
                log::error!(
                    "Atlas page at texture size ceiling {}x{}; returning degenerate rect for {}x{} glyph",
                    self.texture.width(),
                    self.texture.height(),
                    width,
                    height
                );
                return Placement {
                    rect: TexelRect::new(0, 0, 2, 2),
                    texture_replaced,
                };
            }
            texture_replaced = true;
        }
    }

    fn reserve(&mut self, row_index: usize, width: u32, height: u32) -> TexelRect {
        let row = &mut self.rows[row_index];
        let rect = TexelRect::new(row.width + GLYPH_PADDING, row.y + GLYPH_PADDING, width, height);
        row.width += width + 2 * GLYPH_PADDING;
        rect
    }

    /// Double the page, carrying pixels and renormalizing cached UVs
    fn grow(&mut self) -> bool {
        let width = self.texture.width();
        let height = self.texture.height();
        if width >= self.max_size && height >= self.max_size {
            return false;
        }

        let new_width = (width * 2).min(self.max_size);
        let new_height = (height * 2).min(self.max_size);
        let new_id = self.texture.id().next_generation();

        let mut replacement = Texture::new(new_id, new_width, new_height);
        replacement.blit_from(&self.texture);
        self.texture = replacement;

        log::debug!(
            "Atlas page grew {}x{} -> {}x{}",
            width,
            height,
            new_width,
            new_height
        );

        // Texel rects are invariant; only the normalization denominator and
        // the texture id change.
        for glyph in self.glyphs.values_mut() {
            if glyph.texture.is_some() {
                glyph.texture = Some(new_id);
                glyph.uv = glyph.texel.to_uv(new_width, new_height);
            }
        }

        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ember_core::{Id, IdGenerator};

    fn page(initial: u32, max: u32) -> AtlasPage {
        let ids = IdGenerator::new();
        AtlasPage::new(
            TextureId(ids.next()),
            &AtlasConfig {
                initial_size: initial,
                max_size: max,
            },
        )
    }

    #[test]
    fn test_rects_disjoint_and_in_bounds() {
        let mut page = page(64, 256);
        let mut rects = Vec::new();

        for i in 0..24 {
            let w = 6 + (i % 5) as u32;
            let h = 8 + (i % 3) as u32;
            let placement = page.place(w, h);
            rects.push(placement.rect);
        }

        for rect in &rects {
            assert!(
                rect.fits_within(page.texture().width(), page.texture().height()),
                "{:?} outside {}x{}",
                rect,
                page.texture().width(),
                page.texture().height()
            );
        }
        for (i, a) in rects.iter().enumerate() {
            for b in rects.iter().skip(i + 1) {
                assert!(!a.overlaps(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }

    #[test]
    fn test_row_reused_within_band() {
        let mut page = page(64, 256);

        let first = page.place(10, 10);
        let second = page.place(10, 10);

        assert_eq!(page.rows().len(), 1);
        assert_eq!(first.rect.y, second.rect.y);
        assert!(second.rect.x > first.rect.x);
    }

    #[test]
    fn test_short_glyph_opens_new_row() {
        let mut page = page(64, 256);

        page.place(10, 10);
        // 4+2 padded against a 13-high row is below the 70% band
        page.place(4, 4);

        assert_eq!(page.rows().len(), 2);
    }

    #[test]
    fn test_taller_glyph_opens_new_row() {
        let mut page = page(64, 256);

        page.place(10, 10);
        page.place(10, 14);

        assert_eq!(page.rows().len(), 2);
    }

    #[test]
    fn test_growth_preserves_pixels_and_rewrites_uvs() {
        let mut page = page(32, 128);

        let placement = page.place(8, 8);
        assert!(!placement.texture_replaced);
        let rect = placement.rect;
        let block: Vec<u8> = (0..8 * 8 * 4).map(|i| (i % 251) as u8).collect();
        page.write_pixels(rect, &block);

        let old_id = page.texture().id();
        let glyph = FontGlyph {
            advance: 9.0,
            texture: Some(old_id),
            texel: rect,
            uv: rect.to_uv(page.texture().width(), page.texture().height()),
            ..FontGlyph::default()
        };
        page.insert_glyph('a', glyph);

        // Force growth: wider than the current 32-texel page
        let big = page.place(40, 10);
        assert!(big.texture_replaced);
        assert_eq!(page.texture().width(), 64);

        // Pixels still at the original offsets
        assert_eq!(page.texture().read_region(rect), block);

        // Cached glyph renormalized against the doubled page, texel invariant
        let cached = *page.glyph('a').unwrap();
        assert_eq!(cached.texel, rect);
        assert_eq!(
            cached.uv,
            rect.to_uv(page.texture().width(), page.texture().height())
        );
        assert_ne!(cached.texture, Some(old_id));
        assert_eq!(cached.texture, Some(page.texture().id()));
    }

    #[test]
    fn test_growth_signalled_once_for_double_doubling() {
        let mut page = page(16, 256);

        // 50-wide glyph needs two doublings (16 -> 32 -> 64)
        let placement = page.place(50, 8);
        assert!(placement.texture_replaced);
        assert_eq!(page.texture().width(), 64);
    }

    #[test]
    fn test_degenerate_rect_at_ceiling() {
        let mut page = page(16, 16);

        let placement = page.place(30, 30);
        assert!(!placement.texture_replaced);
        assert_eq!(placement.rect, TexelRect::new(0, 0, 2, 2));
        // Page untouched
        assert_eq!(page.texture().width(), 16);
    }

    #[test]
    fn test_cached_glyph_is_bit_identical() {
        let mut page = page(64, 256);
        let rect = page.place(5, 7).rect;
        let glyph = FontGlyph {
            advance: 6.5,
            texel: rect,
            texture: Some(TextureId(Id::new(0, 0))),
            uv: rect.to_uv(64, 64),
            ..FontGlyph::default()
        };
        page.insert_glyph('x', glyph);

        let first = *page.glyph('x').unwrap();
        let second = *page.glyph('x').unwrap();
        assert_eq!(first, second);
        assert_eq!(first, glyph);
    }
}
