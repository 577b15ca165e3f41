//! Runtime settings built once from a validated [`Config`].

use std::time::Duration;

use log::warn;

use super::Config;
use crate::draw::Palette;
use crate::engine::RefreshSettings;
use crate::input::{HoldSettings, Rotation, Tool, ToolSettings, ToolTable};

/// Everything the annotator needs from configuration, in runtime types.
#[derive(Debug, Clone)]
pub struct Settings {
    pub tools: ToolTable,
    pub palette: Palette,
    pub eraser_radius: u32,
    pub hold: HoldSettings,
    pub rotation: Rotation,
    pub refresh: RefreshSettings,
    /// Maximum strokes per document (0 = unlimited)
    pub max_strokes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl Settings {
    pub fn from_config(config: &Config) -> Self {
        let mut palette = Palette::builtin();
        for (name, spec) in &config.palette {
            if let Some(color) = spec.to_color(&palette) {
                palette.insert(name, color);
            }
        }

        let builtin = ToolTable::default();
        let settings_for = |tool: Tool, width: u32, color: &str, alpha: u8| {
            let color_name = match palette.canonical_name(color) {
                Some(name) => name.to_string(),
                None => {
                    let fallback = builtin.get(tool).color_name.clone();
                    warn!(
                        "Unknown {} color '{}', using '{}'",
                        tool, color, fallback
                    );
                    fallback
                }
            };
            ToolSettings {
                width: width.max(1),
                color_name,
                alpha,
            }
        };
        let tools = ToolTable::new(
            settings_for(Tool::Pen, config.pen.width, &config.pen.color, config.pen.alpha),
            settings_for(
                Tool::Highlighter,
                config.highlighter.width,
                &config.highlighter.color,
                config.highlighter.alpha,
            ),
            settings_for(
                Tool::Eraser,
                config.eraser.width,
                &config.eraser.color,
                config.eraser.alpha,
            ),
        );

        let rotation = Rotation::from_degrees(config.input.rotation).unwrap_or_else(|err| {
            warn!("{}, using 0", err);
            Rotation::Deg0
        });

        Self {
            tools,
            palette,
            eraser_radius: config.eraser.radius.max(1),
            hold: HoldSettings {
                hold: Duration::from_millis(config.input.hold_ms),
                tolerance: config.input.hold_tolerance_px.max(0),
                poll_interval: Duration::from_millis(config.input.poll_ms.max(1)),
            },
            rotation,
            refresh: RefreshSettings {
                throttle: Duration::from_millis(config.refresh.throttle_ms),
                quiet_period: Duration::from_millis(config.refresh.quiet_ms),
                aa_padding: config.refresh.aa_padding.max(0),
            },
            max_strokes: config.session.max_strokes,
        }
    }
}
