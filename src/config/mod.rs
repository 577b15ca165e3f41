//! Configuration file support for pageink.
//!
//! This module handles loading and validating user settings from the configuration file
//! located at `~/.config/pageink/config.toml`. Settings include tool defaults, the eraser
//! radius, stylus gesture timing, e-ink refresh tuning, extra palette colors and the
//! annotation file layout.
//!
//! If no config file exists, sensible defaults are used automatically.

pub mod enums;
mod settings;
pub mod types;

// Re-export commonly used types at module level
pub use enums::{ColorSpec, SessionCompression};
pub use settings::Settings;
pub use types::{
    EraserConfig, HighlighterConfig, InputConfig, PenConfig, RefreshConfig, SessionConfig,
};

use crate::input::Rotation;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Main configuration structure containing all user settings.
///
/// This is the root configuration type that gets deserialized from the TOML file.
/// All fields have sensible defaults and will use those if not specified in the config file.
///
/// # Example TOML
/// ```toml
/// [pen]
/// width = 3
/// color = "black"
///
/// [eraser]
/// radius = 20
///
/// [input]
/// hold_ms = 500
/// rotation = 90
///
/// [palette]
/// sepia = [112, 66, 20]
///
/// [session]
/// compress = "auto"
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, JsonSchema)]
pub struct Config {
    #[serde(default)]
    pub pen: PenConfig,

    #[serde(default)]
    pub highlighter: HighlighterConfig,

    #[serde(default)]
    pub eraser: EraserConfig,

    /// Stylus gesture timing and screen rotation
    #[serde(default)]
    pub input: InputConfig,

    /// E-ink refresh scheduling
    #[serde(default)]
    pub refresh: RefreshConfig,

    /// Extra named colors added to the built-in palette
    #[serde(default)]
    pub palette: BTreeMap<String, ColorSpec>,

    /// Annotation file naming, durability and limits
    #[serde(default)]
    pub session: SessionConfig,
}

impl Config {
    /// Validates and clamps all configuration values to acceptable ranges.
    ///
    /// Invalid values are clamped to the nearest valid value and a warning is logged.
    ///
    /// Validated ranges:
    /// - tool `width`: 1 - 64
    /// - `eraser.radius`: 1 - 200
    /// - `input.hold_ms`: 100 - 5000, `poll_ms`: 10 - 1000, `hold_tolerance_px`: 0 - 200
    /// - `input.rotation`: 0, 90, 180 or 270
    /// - `refresh.throttle_ms`: 1 - 500, `quiet_ms`: 50 - 10000, `aa_padding`: 0 - 16
    pub(crate) fn validate_and_clamp(&mut self) {
        clamp_width("pen", &mut self.pen.width);
        clamp_width("highlighter", &mut self.highlighter.width);
        clamp_width("eraser", &mut self.eraser.width);

        if !(1..=200).contains(&self.eraser.radius) {
            warn!(
                "Invalid eraser radius {}, clamping to 1-200 range",
                self.eraser.radius
            );
            self.eraser.radius = self.eraser.radius.clamp(1, 200);
        }

        if !(100..=5000).contains(&self.input.hold_ms) {
            warn!(
                "Invalid hold_ms {}, clamping to 100-5000 range",
                self.input.hold_ms
            );
            self.input.hold_ms = self.input.hold_ms.clamp(100, 5000);
        }

        if !(10..=1000).contains(&self.input.poll_ms) {
            warn!(
                "Invalid poll_ms {}, clamping to 10-1000 range",
                self.input.poll_ms
            );
            self.input.poll_ms = self.input.poll_ms.clamp(10, 1000);
        }

        if !(0..=200).contains(&self.input.hold_tolerance_px) {
            warn!(
                "Invalid hold_tolerance_px {}, clamping to 0-200 range",
                self.input.hold_tolerance_px
            );
            self.input.hold_tolerance_px = self.input.hold_tolerance_px.clamp(0, 200);
        }

        if let Err(err) = Rotation::from_degrees(self.input.rotation) {
            warn!("{}, falling back to 0", err);
            self.input.rotation = 0;
        }

        if !(1..=500).contains(&self.refresh.throttle_ms) {
            warn!(
                "Invalid throttle_ms {}, clamping to 1-500 range",
                self.refresh.throttle_ms
            );
            self.refresh.throttle_ms = self.refresh.throttle_ms.clamp(1, 500);
        }

        if !(50..=10_000).contains(&self.refresh.quiet_ms) {
            warn!(
                "Invalid quiet_ms {}, clamping to 50-10000 range",
                self.refresh.quiet_ms
            );
            self.refresh.quiet_ms = self.refresh.quiet_ms.clamp(50, 10_000);
        }

        if !(0..=16).contains(&self.refresh.aa_padding) {
            warn!(
                "Invalid aa_padding {}, clamping to 0-16 range",
                self.refresh.aa_padding
            );
            self.refresh.aa_padding = self.refresh.aa_padding.clamp(0, 16);
        }

        if self.session.max_file_size_mb == 0 {
            warn!("max_file_size_mb must be positive, using 1");
            self.session.max_file_size_mb = 1;
        }
    }

    /// Returns the path to the configuration file.
    ///
    /// The config file is located at `~/.config/pageink/config.toml`.
    ///
    /// # Errors
    /// Returns an error if the config directory cannot be determined (e.g., HOME not set).
    pub fn get_config_path() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .context("Could not find config directory")?
            .join("pageink");

        Ok(config_dir.join("config.toml"))
    }

    /// Loads configuration from the default path, or returns defaults if not found.
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_from(&config_path)
    }

    /// Loads configuration from `config_path`, or returns defaults if it does not exist.
    ///
    /// # Errors
    /// Returns an error if the file exists but cannot be read or contains invalid TOML.
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            info!("Config file not found, using defaults");
            debug!("Expected config at: {}", config_path.display());
            return Ok(Self::default());
        }

        let config_str = fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config from {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config from {}", config_path.display()))?;

        // Validate and clamp values to acceptable ranges
        config.validate_and_clamp();

        info!("Loaded config from {}", config_path.display());
        debug!("Config: {:?}", config);

        Ok(config)
    }

    /// JSON schema of the configuration file.
    pub fn json_schema() -> schemars::Schema {
        schemars::schema_for!(Config)
    }
}

fn clamp_width(tool: &str, width: &mut u32) {
    if !(1..=64).contains(width) {
        warn!("Invalid {} width {}, clamping to 1-64 range", tool, width);
        *width = (*width).clamp(1, 64);
    }
}
