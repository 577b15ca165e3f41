//! Configuration enum types.

use crate::draw::{Color, Palette};
use log::warn;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Compression preference for annotation files.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum SessionCompression {
    /// Always plain JSON
    #[default]
    Off,
    /// Always gzip
    On,
    /// Gzip once the payload passes `auto_compress_threshold_kb`
    Auto,
}

/// Palette entry - either an alias of another named color or RGB values.
///
/// # Examples
/// ```toml
/// [palette]
/// # Custom RGB color (0-255 per component)
/// sepia = [112, 66, 20]
///
/// # Alias of an existing name
/// accent = "red"
/// ```
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq, JsonSchema)]
#[serde(untagged)]
pub enum ColorSpec {
    /// Name of a color already in the palette
    Name(String),
    /// RGB color as [red, green, blue] where each component is 0-255
    Rgb([u8; 3]),
}

impl ColorSpec {
    /// Resolves the color against `palette`.
    ///
    /// Unknown alias targets yield `None` with a warning.
    pub fn to_color(&self, palette: &Palette) -> Option<Color> {
        match self {
            ColorSpec::Name(name) => {
                let color = palette.resolve(name);
                if color.is_none() {
                    warn!("Unknown color '{}' in palette alias", name);
                }
                color
            }
            ColorSpec::Rgb([r, g, b]) => Some(Color::rgb(*r, *g, *b)),
        }
    }
}
