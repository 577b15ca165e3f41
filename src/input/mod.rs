//! Stylus input classification.
//!
//! This module translates raw multitouch contact records and stylus key
//! presses into Down/Move/Up events tagged with the logical tool that should
//! handle them. It owns the tool selection, the side-button quick toggle, palm
//! rejection, screen rotation, and the hold-to-pick-color gesture.

pub mod classifier;
pub mod color_picker;
pub mod events;
pub mod rotation;
pub mod tool;

// Re-export commonly used types at module level
pub use classifier::InputClassifier;
pub use color_picker::{ColorPickerHold, HoldSettings, HoldTrigger};
pub use events::{
    ClassifiedEvent, ContactOutcome, ContactRecord, HardwareKey, KeyOutcome, KeyRecord, Phase,
    ToolType,
};
pub use rotation::{Rotation, RotationError};
pub use tool::{Tool, ToolSettings, ToolTable};
