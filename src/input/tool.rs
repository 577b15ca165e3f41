//! Drawing tools and their per-tool settings.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Drawing tool selection.
///
/// The effective tool for a contact is resolved once at tool-down (see
/// [`crate::input::InputClassifier`]) and stays fixed for the whole stroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    /// Freehand ink in the selected color
    Pen,
    /// Wide stroke painted in a fixed light tone
    Highlighter,
    /// Removes whole strokes near the contact
    Eraser,
}

impl Tool {
    pub const ALL: [Tool; 3] = [Tool::Pen, Tool::Highlighter, Tool::Eraser];

    pub fn as_str(&self) -> &'static str {
        match self {
            Tool::Pen => "pen",
            Tool::Highlighter => "highlighter",
            Tool::Eraser => "eraser",
        }
    }

    /// Whether a tool-down with this tool starts a stroke.
    pub fn draws(&self) -> bool {
        matches!(self, Tool::Pen | Tool::Highlighter)
    }

    fn slot(&self) -> usize {
        match self {
            Tool::Pen => 0,
            Tool::Highlighter => 1,
            Tool::Eraser => 2,
        }
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Tool {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pen" => Ok(Tool::Pen),
            "highlighter" | "highlight" => Ok(Tool::Highlighter),
            "eraser" => Ok(Tool::Eraser),
            _ => Err(()),
        }
    }
}

/// Width, color and alpha applied to new strokes of one tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolSettings {
    pub width: u32,
    pub color_name: String,
    pub alpha: u8,
}

/// Lookup table of [`ToolSettings`], one entry per [`Tool`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolTable {
    entries: [ToolSettings; 3],
}

impl Default for ToolTable {
    fn default() -> Self {
        Self::new(
            ToolSettings {
                width: 3,
                color_name: "black".into(),
                alpha: 255,
            },
            ToolSettings {
                width: 14,
                color_name: "yellow".into(),
                alpha: 96,
            },
            ToolSettings {
                width: 20,
                color_name: "white".into(),
                alpha: 255,
            },
        )
    }
}

impl ToolTable {
    pub fn new(pen: ToolSettings, highlighter: ToolSettings, eraser: ToolSettings) -> Self {
        Self {
            entries: [pen, highlighter, eraser],
        }
    }

    pub fn get(&self, tool: Tool) -> &ToolSettings {
        &self.entries[tool.slot()]
    }

    pub fn get_mut(&mut self, tool: Tool) -> &mut ToolSettings {
        &mut self.entries[tool.slot()]
    }
}
