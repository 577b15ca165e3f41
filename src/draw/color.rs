//! RGBA color type, predefined constants, and the named palette.
//!
//! Strokes only ever store a symbolic color name. The [`Palette`] turns that
//! name into a [`Color`] at render time, so changing the palette between
//! sessions never rewrites stored data.

/// Represents an RGBA color with 8-bit components.
///
/// # Examples
///
/// ```
/// use pageink::draw::Color;
/// let red = Color::rgb(255, 0, 0);
/// assert_eq!(red.a, 255);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    /// Alpha/opacity (0 = fully transparent, 255 = fully opaque)
    pub a: u8,
}

impl Color {
    /// Creates an opaque color.
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Returns the same color with a different alpha.
    pub const fn with_alpha(self, a: u8) -> Self {
        Self { a, ..self }
    }

    /// Perceived brightness (ITU-R BT.601), used by grayscale panels.
    pub fn luma(&self) -> u8 {
        let y = 299 * self.r as u32 + 587 * self.g as u32 + 114 * self.b as u32;
        ((y + 500) / 1000) as u8
    }
}

// ============================================================================
// Predefined Color Constants
// ============================================================================

pub const BLACK: Color = Color::rgb(0, 0, 0);
pub const DARK_GRAY: Color = Color::rgb(0x55, 0x55, 0x55);
pub const GRAY: Color = Color::rgb(0x88, 0x88, 0x88);
pub const LIGHT_GRAY: Color = Color::rgb(0xBB, 0xBB, 0xBB);
pub const WHITE: Color = Color::rgb(255, 255, 255);
pub const RED: Color = Color::rgb(255, 0, 0);
pub const GREEN: Color = Color::rgb(0, 200, 0);
pub const BLUE: Color = Color::rgb(0, 0, 255);
pub const YELLOW: Color = Color::rgb(255, 230, 0);
pub const ORANGE: Color = Color::rgb(255, 128, 0);
pub const PINK: Color = Color::rgb(255, 0, 255);

/// Fixed light tone painted for highlighter strokes.
///
/// E-ink panels have no alpha blending, so highlights are drawn opaque in a
/// tone light enough for dark text to stay readable when drawn beside it.
pub const HIGHLIGHT_TONE: Color = Color::rgb(0xD8, 0xD8, 0xD8);

// ============================================================================
// Palette
// ============================================================================

/// Ordered list of named colors the user can pick from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    entries: Vec<(String, Color)>,
}

impl Default for Palette {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Palette {
    /// Built-in swatches, in picker order.
    pub fn builtin() -> Self {
        let entries = [
            ("black", BLACK),
            ("dark_gray", DARK_GRAY),
            ("gray", GRAY),
            ("light_gray", LIGHT_GRAY),
            ("white", WHITE),
            ("red", RED),
            ("orange", ORANGE),
            ("yellow", YELLOW),
            ("green", GREEN),
            ("blue", BLUE),
            ("pink", PINK),
        ]
        .into_iter()
        .map(|(name, color)| (name.to_string(), color))
        .collect();
        Self { entries }
    }

    /// Adds or replaces a named color. Names are stored lowercase.
    pub fn insert(&mut self, name: &str, color: Color) {
        let key = name.trim().to_ascii_lowercase();
        if key.is_empty() {
            return;
        }
        match self.entries.iter_mut().find(|(n, _)| *n == key) {
            Some(entry) => entry.1 = color,
            None => self.entries.push((key, color)),
        }
    }

    /// Maps a symbolic name to a color (case-insensitive).
    pub fn resolve(&self, name: &str) -> Option<Color> {
        let key = name.trim();
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(key))
            .map(|(_, c)| *c)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    /// Returns the canonical (lowercase) spelling of a known name.
    pub fn canonical_name(&self, name: &str) -> Option<&str> {
        let key = name.trim();
        self.entries
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(key))
            .map(|(n, _)| n.as_str())
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(n, _)| n.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
