//! Hold-still gesture that summons the color picker.

use std::time::{Duration, Instant};

use crate::draw::Point;
use crate::timer::{TimerKind, TimerSlot};

/// Runtime settings for the hold-to-pick-color gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldSettings {
    pub hold: Duration,
    /// Maximum per-axis drift, in pixels, before the hold is cancelled.
    pub tolerance: i32,
    pub poll_interval: Duration,
}

impl Default for HoldSettings {
    fn default() -> Self {
        Self {
            hold: Duration::from_millis(500),
            tolerance: 15,
            poll_interval: Duration::from_millis(100),
        }
    }
}

/// Fired hold: the contact and the point it started from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HoldTrigger {
    pub slot: u32,
    pub origin: Point,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HoldPhase {
    Armed,
    Cancelled,
    Fired,
}

#[derive(Debug, Clone, Copy)]
struct TrackedHold {
    slot: u32,
    origin: Point,
    started_at: Instant,
    phase: HoldPhase,
}

/// Tracks at most one held contact.
///
/// The hold is re-evaluated on the poll timer while the contact stays down.
/// Once it fires, the contact is consumed until lift.
#[derive(Debug)]
pub struct ColorPickerHold {
    settings: HoldSettings,
    tracked: Option<TrackedHold>,
    poll: TimerSlot,
}

impl ColorPickerHold {
    pub fn new(settings: HoldSettings) -> Self {
        Self {
            settings,
            tracked: None,
            poll: TimerSlot::new(TimerKind::ColorPickerPoll),
        }
    }

    pub fn settings(&self) -> HoldSettings {
        self.settings
    }

    pub fn begin(&mut self, slot: u32, origin: Point, at: Instant) {
        self.tracked = Some(TrackedHold {
            slot,
            origin,
            started_at: at,
            phase: HoldPhase::Armed,
        });
        self.poll.schedule(at + self.settings.poll_interval);
    }

    /// Cancels the pending hold when the contact drifts past the tolerance.
    pub fn on_move(&mut self, slot: u32, point: Point) {
        let tolerance = self.settings.tolerance;
        let Some(hold) = self.tracked.as_mut() else {
            return;
        };
        if hold.slot != slot || hold.phase != HoldPhase::Armed {
            return;
        }
        let dx = (point.x - hold.origin.x).abs();
        let dy = (point.y - hold.origin.y).abs();
        if dx > tolerance || dy > tolerance {
            log::trace!("Hold on slot {} cancelled after drift ({}, {})", slot, dx, dy);
            hold.phase = HoldPhase::Cancelled;
            self.poll.cancel();
        }
    }

    pub fn on_lift(&mut self, slot: u32) {
        if self.tracked.is_some_and(|hold| hold.slot == slot) {
            self.tracked = None;
            self.poll.cancel();
        }
    }

    /// Drops any tracked hold regardless of slot.
    pub fn reset(&mut self) {
        self.tracked = None;
        self.poll.cancel();
    }

    /// True once the hold has fired for `slot` and the contact is still down.
    pub fn is_consumed(&self, slot: u32) -> bool {
        self.tracked
            .is_some_and(|hold| hold.slot == slot && hold.phase == HoldPhase::Fired)
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.poll.deadline()
    }

    /// Runs the poll timer. Returns the trigger the first time the hold
    /// duration has elapsed without drift.
    pub fn advance(&mut self, now: Instant) -> Option<HoldTrigger> {
        if !self.poll.fire_if_due(now) {
            return None;
        }
        let hold = self.tracked.as_mut()?;
        if hold.phase != HoldPhase::Armed {
            return None;
        }
        if now.saturating_duration_since(hold.started_at) >= self.settings.hold {
            hold.phase = HoldPhase::Fired;
            return Some(HoldTrigger {
                slot: hold.slot,
                origin: hold.origin,
            });
        }
        self.poll.schedule(now + self.settings.poll_interval);
        None
    }
}
