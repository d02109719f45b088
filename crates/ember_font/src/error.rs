//! Error types for font loading and rasterization

use ember_asset::LoadError;
use thiserror::Error;

/// Errors from the font subsystem
#[derive(Error, Debug)]
pub enum FontError {
    /// The font face could not be created from the given data
    #[error("failed to load font face: {0}")]
    FaceLoad(String),

    /// The face rejected the requested pixel size
    ///
    /// Fixed-size bitmap faces only support their embedded strike sizes.
    #[error("pixel size {0} not supported by face")]
    UnsupportedSize(u32),

    /// Glyph loading or rendering failed
    #[error("glyph rasterization failed for U+{codepoint:04X}: {reason}")]
    Raster { codepoint: u32, reason: String },

    /// The font description file could not be parsed
    #[error("invalid font description: {0}")]
    InvalidDescription(String),
}

impl From<FontError> for LoadError {
    fn from(e: FontError) -> Self {
        LoadError::Custom(e.to_string())
    }
}
