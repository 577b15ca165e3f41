//! Stroke lifecycle state and refresh scheduling state.

use std::time::{Duration, Instant};

use crate::draw::{DirtyTracker, Stroke};
use crate::timer::{self, TimerKind, TimerSlot};

/// Current stroke lifecycle state.
#[derive(Debug)]
pub enum DrawingState {
    /// No stylus stroke in progress
    Idle,
    /// Pen or highlighter held down on the panel
    Drawing {
        /// Contact slot that owns the stroke
        slot: u32,
        /// Stroke under construction, owned here until finalized
        stroke: Stroke,
    },
}

/// Runtime settings for incremental refresh.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RefreshSettings {
    /// Minimum spacing between two partial refreshes while drawing.
    pub throttle: Duration,
    /// Quiet period after a stroke ends before the full-quality repaint.
    pub quiet_period: Duration,
    /// Extra pixels added around every dirty segment.
    pub aa_padding: i32,
}

impl Default for RefreshSettings {
    fn default() -> Self {
        Self {
            throttle: Duration::from_millis(16),
            quiet_period: Duration::from_millis(600),
            aa_padding: 2,
        }
    }
}

/// Pen/highlighter stroke state machine with throttled e-ink refresh.
///
/// The engine never owns the surface; every painting call borrows it. A
/// finalized stroke is handed back to the caller, which stores it.
pub struct StrokeEngine {
    pub(super) state: DrawingState,
    pub(super) settings: RefreshSettings,
    pub(super) dirty: DirtyTracker,
    pub(super) throttle: TimerSlot,
    pub(super) deferred: TimerSlot,
    pub(super) last_refresh: Option<Instant>,
}

impl StrokeEngine {
    pub fn new(settings: RefreshSettings) -> Self {
        Self {
            state: DrawingState::Idle,
            settings,
            dirty: DirtyTracker::new(settings.aa_padding),
            throttle: TimerSlot::new(TimerKind::RefreshThrottle),
            deferred: TimerSlot::new(TimerKind::DeferredRepaint),
            last_refresh: None,
        }
    }

    pub fn settings(&self) -> RefreshSettings {
        self.settings
    }

    pub fn state(&self) -> &DrawingState {
        &self.state
    }

    pub fn is_drawing(&self) -> bool {
        matches!(self.state, DrawingState::Drawing { .. })
    }

    /// Slot of the contact currently drawing, if any.
    pub fn drawing_slot(&self) -> Option<u32> {
        match &self.state {
            DrawingState::Drawing { slot, .. } => Some(*slot),
            DrawingState::Idle => None,
        }
    }

    /// The stroke under construction.
    pub fn current_stroke(&self) -> Option<&Stroke> {
        match &self.state {
            DrawingState::Drawing { stroke, .. } => Some(stroke),
            DrawingState::Idle => None,
        }
    }

    pub fn deferred_repaint_pending(&self) -> bool {
        self.deferred.is_pending()
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        timer::earliest([self.throttle.deadline(), self.deferred.deadline()])
    }
}
