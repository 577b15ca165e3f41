//! Configuration type definitions.

use super::enums::SessionCompression;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Pen defaults.
///
/// Width, color and alpha applied to new pen strokes until the user picks
/// something else.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct PenConfig {
    /// Line width in pixels (valid range: 1 - 64)
    #[serde(default = "default_pen_width")]
    pub width: u32,

    /// Palette color name (built-in names or any `[palette]` entry)
    #[serde(default = "default_pen_color")]
    pub color: String,

    /// Opacity 0-255
    #[serde(default = "default_opaque")]
    pub alpha: u8,
}

impl Default for PenConfig {
    fn default() -> Self {
        Self {
            width: default_pen_width(),
            color: default_pen_color(),
            alpha: default_opaque(),
        }
    }
}

/// Highlighter defaults.
///
/// Highlighter strokes always render in a fixed light tone; the color name is
/// still stored with each stroke for export.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct HighlighterConfig {
    /// Line width in pixels (valid range: 1 - 64)
    #[serde(default = "default_highlighter_width")]
    pub width: u32,

    #[serde(default = "default_highlighter_color")]
    pub color: String,

    #[serde(default = "default_highlighter_alpha")]
    pub alpha: u8,
}

impl Default for HighlighterConfig {
    fn default() -> Self {
        Self {
            width: default_highlighter_width(),
            color: default_highlighter_color(),
            alpha: default_highlighter_alpha(),
        }
    }
}

/// Eraser settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct EraserConfig {
    /// Hit radius in pixels around the eraser tip (valid range: 1 - 200)
    #[serde(default = "default_eraser_radius")]
    pub radius: u32,

    #[serde(default = "default_eraser_width")]
    pub width: u32,

    #[serde(default = "default_eraser_color")]
    pub color: String,

    #[serde(default = "default_opaque")]
    pub alpha: u8,
}

impl Default for EraserConfig {
    fn default() -> Self {
        Self {
            radius: default_eraser_radius(),
            width: default_eraser_width(),
            color: default_eraser_color(),
            alpha: default_opaque(),
        }
    }
}

/// Stylus input tuning.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct InputConfig {
    /// How long the stylus must rest before the color picker opens (valid range: 100 - 5000)
    #[serde(default = "default_hold_ms")]
    pub hold_ms: u64,

    /// Per-axis drift in pixels tolerated during the hold (valid range: 0 - 200)
    #[serde(default = "default_hold_tolerance")]
    pub hold_tolerance_px: i32,

    /// Hold re-check interval (valid range: 10 - 1000)
    #[serde(default = "default_poll_ms")]
    pub poll_ms: u64,

    /// Screen rotation relative to the digitizer: 0, 90, 180 or 270
    #[serde(default)]
    pub rotation: i32,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            hold_ms: default_hold_ms(),
            hold_tolerance_px: default_hold_tolerance(),
            poll_ms: default_poll_ms(),
            rotation: 0,
        }
    }
}

/// E-ink refresh tuning.
///
/// Most users won't need to change these from their defaults.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct RefreshConfig {
    /// Minimum spacing of partial refreshes while drawing (valid range: 1 - 500)
    #[serde(default = "default_throttle_ms")]
    pub throttle_ms: u64,

    /// Quiet period before the full-quality repaint (valid range: 50 - 10000)
    #[serde(default = "default_quiet_ms")]
    pub quiet_ms: u64,

    /// Extra pixels around each dirty segment (valid range: 0 - 16)
    #[serde(default = "default_aa_padding")]
    pub aa_padding: i32,
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            throttle_ms: default_throttle_ms(),
            quiet_ms: default_quiet_ms(),
            aa_padding: default_aa_padding(),
        }
    }
}

/// Annotation file settings.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct SessionConfig {
    /// File name without extension inside the sidecar directory
    #[serde(default = "default_file_stem")]
    pub file_stem: String,

    #[serde(default = "default_extension")]
    pub extension: String,

    #[serde(default)]
    pub compress: SessionCompression,

    #[serde(default = "default_auto_compress_threshold_kb")]
    pub auto_compress_threshold_kb: u64,

    /// Files larger than this are neither read nor written
    #[serde(default = "default_max_file_size_mb")]
    pub max_file_size_mb: u64,

    /// Keep the previous file as `<name>.bak` (0 disables)
    #[serde(default = "default_backup_retention")]
    pub backup_retention: usize,

    /// Maximum strokes per document (0 = unlimited)
    #[serde(default = "default_max_strokes")]
    pub max_strokes: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            file_stem: default_file_stem(),
            extension: default_extension(),
            compress: SessionCompression::default(),
            auto_compress_threshold_kb: default_auto_compress_threshold_kb(),
            max_file_size_mb: default_max_file_size_mb(),
            backup_retention: default_backup_retention(),
            max_strokes: default_max_strokes(),
        }
    }
}

// =============================================================================
// Default value functions
// =============================================================================

fn default_pen_width() -> u32 {
    3
}

fn default_pen_color() -> String {
    "black".to_string()
}

fn default_opaque() -> u8 {
    255
}

fn default_highlighter_width() -> u32 {
    14
}

fn default_highlighter_color() -> String {
    "yellow".to_string()
}

fn default_highlighter_alpha() -> u8 {
    96
}

fn default_eraser_radius() -> u32 {
    20
}

fn default_eraser_width() -> u32 {
    20
}

fn default_eraser_color() -> String {
    "white".to_string()
}

fn default_hold_ms() -> u64 {
    500
}

fn default_hold_tolerance() -> i32 {
    15
}

fn default_poll_ms() -> u64 {
    100
}

fn default_throttle_ms() -> u64 {
    16
}

fn default_quiet_ms() -> u64 {
    600
}

fn default_aa_padding() -> i32 {
    2
}

fn default_file_stem() -> String {
    "annotations".to_string()
}

fn default_extension() -> String {
    "json".to_string()
}

fn default_auto_compress_threshold_kb() -> u64 {
    100
}

fn default_max_file_size_mb() -> u64 {
    10
}

fn default_backup_retention() -> usize {
    1
}

fn default_max_strokes() -> usize {
    10_000
}
