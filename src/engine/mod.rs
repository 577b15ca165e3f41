//! Stroke lifecycle: Idle → Drawing → Idle with throttled incremental refresh.

mod core;
mod pen;
mod refresh;
#[cfg(test)]
mod tests;

pub use core::{DrawingState, RefreshSettings, StrokeEngine};
