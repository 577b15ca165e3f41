//! Turns raw contact and key records into stylus events.
//!
//! The classifier owns the per-slot contact table, the stylus key state, and
//! the hold-to-pick-color sub-machine. It decides which logical tool a stroke
//! uses and whether the host's own touch handling should be suppressed.

use std::collections::HashMap;
use std::time::Instant;

use log::{debug, trace};

use super::color_picker::{ColorPickerHold, HoldSettings, HoldTrigger};
use super::events::{
    ClassifiedEvent, ContactOutcome, ContactRecord, HardwareKey, KeyOutcome, KeyRecord, Phase,
    ToolType,
};
use super::rotation::{Rotation, transform};
use super::tool::Tool;
use crate::draw::Point;

#[derive(Debug, Clone, Copy, Default)]
struct SlotState {
    raw_x: Option<i32>,
    raw_y: Option<i32>,
    tool_type: Option<ToolType>,
    /// Effective tool fixed at Down; `None` while the slot is lifted.
    active_tool: Option<Tool>,
    highlight: bool,
}

#[derive(Debug, Clone, Copy, Default)]
struct SideButton {
    held: bool,
    drew_while_held: bool,
}

/// Stylus input state machine.
#[derive(Debug)]
pub struct InputClassifier {
    rotation: Rotation,
    width: i32,
    height: i32,
    selected: Tool,
    side_button: SideButton,
    eraser_tip: bool,
    slots: HashMap<u32, SlotState>,
    hold: ColorPickerHold,
}

impl InputClassifier {
    /// `width` and `height` are the logical framebuffer dimensions.
    pub fn new(rotation: Rotation, width: i32, height: i32, hold: HoldSettings) -> Self {
        Self {
            rotation,
            width,
            height,
            selected: Tool::Pen,
            side_button: SideButton::default(),
            eraser_tip: false,
            slots: HashMap::new(),
            hold: ColorPickerHold::new(hold),
        }
    }

    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    pub fn set_rotation(&mut self, rotation: Rotation, width: i32, height: i32) {
        self.rotation = rotation;
        self.width = width;
        self.height = height;
    }

    pub fn selected_tool(&self) -> Tool {
        self.selected
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.selected = tool;
    }

    pub fn side_button_held(&self) -> bool {
        self.side_button.held
    }

    /// Tool a stylus Down would use right now.
    ///
    /// Priority: eraser end, then side button, then the selected tool.
    pub fn effective_tool(&self, tool_type: ToolType) -> Tool {
        if self.eraser_tip || tool_type == ToolType::Rubber {
            Tool::Eraser
        } else if self.side_button.held {
            Tool::Highlighter
        } else {
            self.selected
        }
    }

    /// True while any stylus slot is in contact.
    pub fn stylus_down(&self) -> bool {
        self.slots
            .values()
            .any(|slot| slot.active_tool.is_some() && slot.tool_type.is_some_and(|t| t.is_stylus()))
    }

    pub fn handle_key(&mut self, record: KeyRecord) -> KeyOutcome {
        match record.key {
            HardwareKey::EraserTip => {
                self.eraser_tip = record.pressed;
                KeyOutcome {
                    dominate: true,
                    selected_tool_changed: None,
                }
            }
            HardwareKey::SideButton if record.pressed => {
                self.side_button = SideButton {
                    held: true,
                    drew_while_held: false,
                };
                KeyOutcome {
                    dominate: true,
                    selected_tool_changed: None,
                }
            }
            HardwareKey::SideButton => {
                let drew = self.side_button.drew_while_held;
                self.side_button = SideButton::default();
                let selected_tool_changed = if drew {
                    None
                } else {
                    self.selected = match self.selected {
                        Tool::Eraser => Tool::Pen,
                        _ => Tool::Eraser,
                    };
                    debug!("Side button toggle selected {}", self.selected);
                    Some(self.selected)
                };
                KeyOutcome {
                    dominate: true,
                    selected_tool_changed,
                }
            }
        }
    }

    pub fn handle_contact(&mut self, record: ContactRecord) -> ContactOutcome {
        let effective = self.effective_tool(record.tool_type);
        let state = self.slots.entry(record.slot).or_default();
        if let Some(x) = record.x {
            state.raw_x = Some(x);
        }
        if let Some(y) = record.y {
            state.raw_y = Some(y);
        }
        state.tool_type = Some(record.tool_type);

        if !record.tool_type.is_stylus() {
            // Touch contacts never draw. They are swallowed while a stylus is
            // down so a resting palm cannot trigger host gestures.
            state.active_tool = None;
            let dominate = self.stylus_down();
            trace!("Finger slot {} (dominate: {})", record.slot, dominate);
            return ContactOutcome {
                event: None,
                dominate,
            };
        }

        let (Some(raw_x), Some(raw_y)) = (state.raw_x, state.raw_y) else {
            debug!("Slot {} has no coordinates yet; ignoring record", record.slot);
            return ContactOutcome {
                event: None,
                dominate: true,
            };
        };
        let point = transform(raw_x, raw_y, self.rotation, self.width, self.height);

        let phase = match (record.is_active(), state.active_tool) {
            (true, None) => {
                state.active_tool = Some(effective);
                state.highlight = effective == Tool::Highlighter && self.side_button.held;
                Phase::Down
            }
            (true, Some(_)) => Phase::Move,
            (false, Some(_)) => Phase::Up,
            (false, None) => {
                trace!("Stray lift on slot {}", record.slot);
                return ContactOutcome {
                    event: None,
                    dominate: true,
                };
            }
        };

        let tool = state.active_tool.unwrap_or(effective);
        let highlight = state.highlight;
        if phase == Phase::Up {
            state.active_tool = None;
            state.highlight = false;
        }

        let consumed = self.hold.is_consumed(record.slot);
        match phase {
            Phase::Down => {
                if highlight {
                    self.side_button.drew_while_held = true;
                }
                if tool.draws() {
                    self.hold.begin(record.slot, point, record.time);
                } else {
                    self.hold.reset();
                }
            }
            Phase::Move => self.hold.on_move(record.slot, point),
            Phase::Up => self.hold.on_lift(record.slot),
        }

        if consumed {
            trace!("Slot {} consumed by color picker", record.slot);
            return ContactOutcome {
                event: None,
                dominate: true,
            };
        }

        ContactOutcome {
            event: Some(ClassifiedEvent {
                phase,
                tool,
                point,
                slot: record.slot,
                used_for_highlight: highlight,
                time: record.time,
            }),
            dominate: true,
        }
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.hold.next_deadline()
    }

    /// Runs the hold poll timer.
    pub fn advance(&mut self, now: Instant) -> Option<HoldTrigger> {
        self.hold.advance(now)
    }

    /// Forgets any pending hold, e.g. when the stroke was force-finalized.
    pub fn cancel_hold(&mut self) {
        self.hold.reset();
    }

    /// Last logical position reported for `slot`.
    pub fn last_point(&self, slot: u32) -> Option<Point> {
        let state = self.slots.get(&slot)?;
        Some(transform(
            state.raw_x?,
            state.raw_y?,
            self.rotation,
            self.width,
            self.height,
        ))
    }
}
