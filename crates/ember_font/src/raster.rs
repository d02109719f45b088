//! Glyph rasterization via FreeType
//!
//! Thin wrapper around a FreeType face producing 8-bit coverage bitmaps,
//! optionally expanded through the stroker for outlined variants. All calls
//! run inline on the caller's thread.

use crate::error::FontError;
use freetype::face::LoadFlag;
use freetype::stroker::{StrokerLineCap, StrokerLineJoin};
use freetype::{Face, Library, RenderMode};

/// Vertical metrics of a face at a pixel size
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineMetrics {
    /// Distance from baseline to the top of the tallest glyph
    pub ascent: f32,
    /// Distance from baseline to the bottom of the deepest glyph (positive)
    pub descent: f32,
    /// Baseline-to-baseline distance
    pub line_height: f32,
}

/// A rasterized glyph: coverage bitmap plus metrics
#[derive(Clone, Debug)]
pub struct RasterizedGlyph {
    /// Bitmap width in pixels (may be zero, e.g. for spaces)
    pub width: u32,
    /// Bitmap height in pixels
    pub height: u32,
    /// Horizontal bearing from the pen position to the bitmap's left edge
    pub left: i32,
    /// Vertical bearing from the baseline up to the bitmap's top edge
    pub top: i32,
    /// Horizontal advance in pixels
    pub advance: f32,
    /// 8-bit coverage, `width * height` bytes, row-major
    pub coverage: Vec<u8>,
}

/// Wraps a FreeType face for one font file
pub struct GlyphRasterizer {
    library: Library,
    face: Face,
    current_size: u32,
}

impl GlyphRasterizer {
    /// Create a rasterizer from raw font file bytes (TTF/OTF)
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, FontError> {
        let library =
            Library::init().map_err(|e| FontError::FaceLoad(format!("FreeType init: {}", e)))?;
        let face = library
            .new_memory_face(std::rc::Rc::new(data), 0)
            .map_err(|e| FontError::FaceLoad(format!("{}", e)))?;

        Ok(Self {
            library,
            face,
            current_size: 0,
        })
    }

    /// Scale the face to a pixel size; no-op when already there
    fn ensure_size(&mut self, size: u32) -> Result<(), FontError> {
        if self.current_size == size {
            return Ok(());
        }
        self.face
            .set_pixel_sizes(0, size)
            .map_err(|_| FontError::UnsupportedSize(size))?;
        self.current_size = size;
        Ok(())
    }

    /// Vertical metrics at a pixel size
    pub fn line_metrics(&mut self, size: u32) -> Result<LineMetrics, FontError> {
        self.ensure_size(size)?;
        let metrics = self.face.size_metrics().ok_or_else(|| FontError::Raster {
            codepoint: 0,
            reason: "no size metrics".to_string(),
        })?;

        Ok(LineMetrics {
            ascent: (metrics.ascender >> 6) as f32,
            descent: ((metrics.descender >> 6) as f32).abs(),
            line_height: (metrics.height >> 6) as f32,
        })
    }

    /// Rasterize a codepoint at a pixel size
    pub fn rasterize(&mut self, codepoint: char, size: u32) -> Result<RasterizedGlyph, FontError> {
        self.ensure_size(size)?;

        self.face
            .load_char(codepoint as usize, LoadFlag::RENDER)
            .map_err(|e| FontError::Raster {
                codepoint: codepoint as u32,
                reason: format!("{}", e),
            })?;

        let slot = self.face.glyph();
        let advance = (slot.advance().x >> 6) as f32;
        let bitmap = slot.bitmap();

        Ok(RasterizedGlyph {
            width: bitmap.width() as u32,
            height: bitmap.rows() as u32,
            left: slot.bitmap_left(),
            top: slot.bitmap_top(),
            advance,
            coverage: copy_coverage(&bitmap),
        })
    }

    /// Rasterize a codepoint with a stroked outline of the given thickness
    ///
    /// The outline border is generated before bitmap conversion, so the
    /// resulting coverage is the expanded shape; the advance is the plain
    /// glyph's advance.
    pub fn rasterize_outlined(
        &mut self,
        codepoint: char,
        size: u32,
        thickness: f32,
    ) -> Result<RasterizedGlyph, FontError> {
        self.ensure_size(size)?;

        self.face
            .load_char(codepoint as usize, LoadFlag::DEFAULT)
            .map_err(|e| FontError::Raster {
                codepoint: codepoint as u32,
                reason: format!("{}", e),
            })?;

        let slot = self.face.glyph();
        let advance = (slot.advance().x >> 6) as f32;

        let raster_err = |e: freetype::Error| FontError::Raster {
            codepoint: codepoint as u32,
            reason: format!("{}", e),
        };

        let glyph = slot.get_glyph().map_err(raster_err)?;
        let stroker = self.library.new_stroker().map_err(raster_err)?;
        // Stroker radius is 26.6 fixed point
        stroker.set(
            (thickness * 64.0) as i64,
            StrokerLineCap::Round,
            StrokerLineJoin::Round,
            0,
        );

        let stroked = glyph.stroke_border(&stroker, false).map_err(raster_err)?;
        let rendered = stroked
            .to_bitmap(RenderMode::Normal, None)
            .map_err(raster_err)?;
        let bitmap = rendered.bitmap();

        Ok(RasterizedGlyph {
            width: bitmap.width() as u32,
            height: bitmap.rows() as u32,
            left: rendered.left(),
            top: rendered.top(),
            advance,
            coverage: copy_coverage(&bitmap),
        })
    }
}

/// Copy a FreeType bitmap into a tight row-major coverage buffer
///
/// FreeType rows are padded to `pitch` bytes; the cache stores them tight.
fn copy_coverage(bitmap: &freetype::Bitmap) -> Vec<u8> {
    let width = bitmap.width() as usize;
    let rows = bitmap.rows() as usize;
    let pitch = bitmap.pitch();

    if width == 0 || rows == 0 {
        return Vec::new();
    }
    if pitch < width as i32 {
        log::warn!("Unexpected bitmap pitch {} for width {}", pitch, width);
        return vec![0; width * rows];
    }

    let buffer = bitmap.buffer();
    let pitch = pitch as usize;
    let mut coverage = Vec::with_capacity(width * rows);
    for row in 0..rows {
        let start = row * pitch;
        coverage.extend_from_slice(&buffer[start..start + width]);
    }
    coverage
}
