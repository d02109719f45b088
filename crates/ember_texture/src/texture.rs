//! CPU-side RGBA8 pixel surface

use crate::rect::TexelRect;
use ember_core::Id;

/// Strongly-typed texture identifier
///
/// Carries a generation: when an atlas page regenerates its texture the
/// replacement keeps the index and advances the generation, so references to
/// the old surface compare unequal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TextureId(pub Id);

impl TextureId {
    /// The null texture ID
    pub const fn null() -> Self {
        Self(Id::null())
    }

    /// Check if null
    pub const fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// The same texture slot, one generation later
    pub const fn next_generation(&self) -> Self {
        Self(self.0.next_generation())
    }
}

/// An owned RGBA8 pixel surface
#[derive(Clone, Debug)]
pub struct Texture {
    id: TextureId,
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Texture {
    /// Create a transparent texture of the given size
    pub fn new(id: TextureId, width: u32, height: u32) -> Self {
        Self {
            id,
            width,
            height,
            pixels: vec![0; (width * height * 4) as usize],
        }
    }

    /// Create from existing RGBA8 pixel data
    ///
    /// Returns `None` when the buffer length does not match the dimensions.
    pub fn from_rgba8(id: TextureId, width: u32, height: u32, pixels: Vec<u8>) -> Option<Self> {
        if pixels.len() != (width * height * 4) as usize {
            return None;
        }
        Some(Self {
            id,
            width,
            height,
            pixels,
        })
    }

    /// Texture identifier
    pub fn id(&self) -> TextureId {
        self.id
    }

    /// Width in texels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in texels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Raw RGBA8 pixel data, row-major
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Write an RGBA8 block at the given offset
    ///
    /// Rows outside the surface are clipped; the source is expected as
    /// `width * height * 4` bytes, row-major.
    pub fn write_region(&mut self, x: u32, y: u32, width: u32, height: u32, rgba: &[u8]) {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);

        for row in 0..height {
            let dst_y = y + row;
            if dst_y >= self.height {
                break;
            }
            let cols = width.min(self.width.saturating_sub(x));
            if cols == 0 {
                break;
            }
            let src = (row * width * 4) as usize;
            let dst = ((dst_y * self.width + x) * 4) as usize;
            self.pixels[dst..dst + (cols * 4) as usize]
                .copy_from_slice(&rgba[src..src + (cols * 4) as usize]);
        }
    }

    /// Copy another texture's pixels into this one at the origin
    ///
    /// Used when a grown atlas texture takes over the contents of the one it
    /// replaces; the source must not be larger than the destination.
    pub fn blit_from(&mut self, other: &Texture) {
        debug_assert!(other.width <= self.width && other.height <= self.height);

        for row in 0..other.height.min(self.height) {
            let cols = other.width.min(self.width);
            let src = (row * other.width * 4) as usize;
            let dst = (row * self.width * 4) as usize;
            self.pixels[dst..dst + (cols * 4) as usize]
                .copy_from_slice(&other.pixels[src..src + (cols * 4) as usize]);
        }
    }

    /// Read back a region as RGBA8 bytes
    pub fn read_region(&self, rect: TexelRect) -> Vec<u8> {
        let mut out = Vec::with_capacity((rect.width * rect.height * 4) as usize);
        for row in 0..rect.height {
            let y = rect.y + row;
            if y >= self.height {
                break;
            }
            let start = ((y * self.width + rect.x) * 4) as usize;
            let cols = rect.width.min(self.width.saturating_sub(rect.x));
            out.extend_from_slice(&self.pixels[start..start + (cols * 4) as usize]);
        }
        out
    }
}
