//! Font and font-material description formats
//!
//! Fonts are described by structured JSON blocks mapping codepoint ranges
//! to their sources:
//!
//! ```json
//! {
//!   "default": { "trueType": { "file": "fonts/roboto.ttf" } },
//!   "ranges": [
//!     { "from": 48, "to": 57,
//!       "sprite": { "file": "textures/digits.png", "fontSize": 32,
//!                   "advance": 18.0, "cell": [20, 32] } },
//!     { "from": 128512, "to": 128591,
//!       "entity": { "prefab": "prefabs/emoji.ui", "fontSize": 64,
//!                   "advance": 64.0, "bounds": [0.0, 64.0, 64.0, 64.0] } }
//!   ]
//! }
//! ```

use serde::{Deserialize, Serialize};

/// Root of a font description file
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FontSpec {
    /// Backend serving every codepoint no custom range owns
    pub default: SourceSpec,
    /// Custom codepoint ranges, matched in declaration order
    #[serde(default)]
    pub ranges: Vec<RangeSpec>,
}

/// A codepoint range bound to a source description
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RangeSpec {
    /// First codepoint, inclusive
    pub from: u32,
    /// Last codepoint, inclusive
    pub to: u32,
    /// The backing source block
    #[serde(flatten)]
    pub source: SourceSpec,
}

/// One of the supported source blocks
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SourceSpec {
    /// Rasterized from a TrueType/OpenType face
    TrueType(TrueTypeSpec),
    /// Sliced from a pre-rendered sprite sheet
    Sprite(SpriteSpec),
    /// Instantiated from an entity prefab
    Entity(EntitySpec),
}

/// TrueType source block
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct TrueTypeSpec {
    /// Path of the face file, relative to the asset root
    pub file: String,
}

/// Sprite-sheet source block
///
/// Cells are stepped left to right, top to bottom, one codepoint each,
/// starting at the owning range's `from` (or `firstCodepoint` when used as
/// the default source).
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SpriteSpec {
    /// Path of the sheet image, relative to the asset root
    pub file: String,
    /// Design size the sheet was rendered at
    pub font_size: u32,
    /// Advance per glyph at the design size
    pub advance: f32,
    /// Cell size in the sheet, `[width, height]` texels
    pub cell: [u32; 2],
    /// Bearing applied to every glyph at the design size
    #[serde(default)]
    pub offset: [f32; 2],
    /// Codepoint of the first cell when no range supplies one
    #[serde(default = "default_first_codepoint")]
    pub first_codepoint: u32,
}

fn default_first_codepoint() -> u32 {
    0x20
}

/// Entity-prefab source block
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EntitySpec {
    /// Path of the prefab asset
    pub prefab: String,
    /// Design size the metrics are given at
    pub font_size: u32,
    /// Advance per glyph at the design size
    pub advance: f32,
    /// Glyph box as `[offset_x, offset_y, width, height]` at the design size
    pub bounds: [f32; 4],
}

/// A font material: a font reference plus rendering parameters
///
/// Loaded from `.fontmat` files; the referenced font is resolved through
/// the asset server by the consumer.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct FontMaterial {
    /// Path of the font description asset
    pub font: String,
    /// Pixel size text renders at
    pub size: u32,
    /// Fill color, linear RGBA
    #[serde(default = "white")]
    pub color: [f32; 4],
    /// Outline thickness in pixels; zero disables the outline pass
    #[serde(default)]
    pub outline_thickness: f32,
    /// Outline color, linear RGBA
    #[serde(default = "black")]
    pub outline_color: [f32; 4],
}

fn white() -> [f32; 4] {
    [1.0, 1.0, 1.0, 1.0]
}

fn black() -> [f32; 4] {
    [0.0, 0.0, 0.0, 1.0]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_spec() {
        let json = r#"{
            "default": { "trueType": { "file": "fonts/roboto.ttf" } },
            "ranges": [
                { "from": 48, "to": 57,
                  "sprite": { "file": "textures/digits.png", "fontSize": 32,
                              "advance": 18.0, "cell": [20, 32] } },
                { "from": 128512, "to": 128591,
                  "entity": { "prefab": "prefabs/emoji.ui", "fontSize": 64,
                              "advance": 64.0, "bounds": [0.0, 64.0, 64.0, 64.0] } }
            ]
        }"#;

        let spec: FontSpec = serde_json::from_str(json).unwrap();
        assert!(matches!(spec.default, SourceSpec::TrueType(_)));
        assert_eq!(spec.ranges.len(), 2);
        assert_eq!(spec.ranges[0].from, 48);
        match &spec.ranges[0].source {
            SourceSpec::Sprite(s) => {
                assert_eq!(s.cell, [20, 32]);
                assert_eq!(s.offset, [0.0, 0.0]);
                assert_eq!(s.first_codepoint, 0x20);
            }
            other => panic!("expected sprite block, got {:?}", other),
        }
        match &spec.ranges[1].source {
            SourceSpec::Entity(e) => assert_eq!(e.prefab, "prefabs/emoji.ui"),
            other => panic!("expected entity block, got {:?}", other),
        }
    }

    #[test]
    fn test_ranges_default_empty() {
        let json = r#"{ "default": { "trueType": { "file": "a.ttf" } } }"#;
        let spec: FontSpec = serde_json::from_str(json).unwrap();
        assert!(spec.ranges.is_empty());
    }

    #[test]
    fn test_unknown_source_kind_rejected() {
        let json = r#"{ "default": { "vector": { "file": "a.svg" } } }"#;
        assert!(serde_json::from_str::<FontSpec>(json).is_err());
    }

    #[test]
    fn test_material_defaults() {
        let json = r#"{ "font": "fonts/main.font", "size": 24 }"#;
        let mat: FontMaterial = serde_json::from_str(json).unwrap();
        assert_eq!(mat.color, [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(mat.outline_thickness, 0.0);
        assert_eq!(mat.outline_color, [0.0, 0.0, 0.0, 1.0]);
    }
}
