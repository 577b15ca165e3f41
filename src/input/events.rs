//! Raw hardware records and the classified events produced from them.

use super::tool::Tool;
use crate::draw::Point;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Hardware tool type reported with a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolType {
    /// Touch contact (finger or palm)
    Finger,
    /// Stylus drawing tip
    Pen,
    /// Stylus flipped to its eraser end
    Rubber,
}

impl ToolType {
    pub fn is_stylus(&self) -> bool {
        matches!(self, ToolType::Pen | ToolType::Rubber)
    }
}

/// One per-slot contact record from the multitouch stream.
///
/// `contact_id >= 0` means the slot is in contact, a negative id means it
/// lifted. Coordinates may be missing when the hardware only reported a
/// change on the other axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContactRecord {
    pub slot: u32,
    pub contact_id: i32,
    pub x: Option<i32>,
    pub y: Option<i32>,
    pub tool_type: ToolType,
    pub time: Instant,
}

impl ContactRecord {
    pub fn is_active(&self) -> bool {
        self.contact_id >= 0
    }
}

/// Discrete stylus keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HardwareKey {
    /// Button on the stylus barrel
    SideButton,
    /// Signal raised while the eraser end touches the panel
    EraserTip,
}

/// Press or release of a [`HardwareKey`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct KeyRecord {
    pub key: HardwareKey,
    pub pressed: bool,
    pub time: Instant,
}

/// Phase of a classified stylus event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Down,
    Move,
    Up,
}

/// Stylus event with its effective tool and logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassifiedEvent {
    pub phase: Phase,
    pub tool: Tool,
    pub point: Point,
    pub slot: u32,
    /// Set when the side button turned this contact into a highlighter stroke.
    pub used_for_highlight: bool,
    pub time: Instant,
}

/// Result of feeding one contact record to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContactOutcome {
    pub event: Option<ClassifiedEvent>,
    /// Tells the event source to skip its own gesture handling for this record.
    pub dominate: bool,
}

/// Result of feeding one key record to the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct KeyOutcome {
    pub dominate: bool,
    /// New selected tool when the side button acted as a quick toggle.
    pub selected_tool_changed: Option<Tool>,
}
