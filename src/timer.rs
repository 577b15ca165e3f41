//! Single-shot, cancellable timer slots driven by the host's clock.
//!
//! Nothing here sleeps or spawns. Each concern owns one [`TimerSlot`]; the
//! host asks for the earliest deadline, waits in its own event loop, and then
//! calls back with the current time.

use std::time::Instant;

/// Names the concern a timer belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimerKind {
    /// Coalesces partial refreshes while a stroke is being drawn.
    RefreshThrottle,
    /// Full-quality repaint after drawing has been quiet for a while.
    DeferredRepaint,
    /// Re-checks the hold-to-pick-color gesture.
    ColorPickerPoll,
}

/// Holds at most one pending deadline.
///
/// Scheduling always replaces the previous deadline, so duplicate timers for
/// the same concern cannot pile up.
#[derive(Debug, Clone, Copy)]
pub struct TimerSlot {
    kind: TimerKind,
    deadline: Option<Instant>,
}

impl TimerSlot {
    pub fn new(kind: TimerKind) -> Self {
        Self {
            kind,
            deadline: None,
        }
    }

    pub fn kind(&self) -> TimerKind {
        self.kind
    }

    /// Cancels any pending deadline and arms a new one.
    pub fn schedule(&mut self, at: Instant) {
        if self.deadline.is_some() {
            log::trace!("{:?} rescheduled", self.kind);
        }
        self.deadline = Some(at);
    }

    /// Arms the slot only if it is idle. Returns true if it was armed.
    pub fn schedule_if_idle(&mut self, at: Instant) -> bool {
        if self.deadline.is_some() {
            return false;
        }
        self.deadline = Some(at);
        true
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Disarms and returns true if the deadline has passed at `now`.
    pub fn fire_if_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(at) if now >= at => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// Earliest of several optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn schedule_replaces_pending_deadline() {
        let now = Instant::now();
        let mut slot = TimerSlot::new(TimerKind::DeferredRepaint);
        slot.schedule(now + Duration::from_millis(600));
        slot.schedule(now + Duration::from_millis(900));

        assert!(!slot.fire_if_due(now + Duration::from_millis(700)));
        assert!(slot.fire_if_due(now + Duration::from_millis(900)));
        assert!(!slot.is_pending());
    }

    #[test]
    fn schedule_if_idle_keeps_existing_deadline() {
        let now = Instant::now();
        let mut slot = TimerSlot::new(TimerKind::RefreshThrottle);
        assert!(slot.schedule_if_idle(now + Duration::from_millis(16)));
        assert!(!slot.schedule_if_idle(now + Duration::from_millis(32)));
        assert_eq!(slot.deadline(), Some(now + Duration::from_millis(16)));
    }

    #[test]
    fn cancelled_slot_never_fires() {
        let now = Instant::now();
        let mut slot = TimerSlot::new(TimerKind::ColorPickerPoll);
        slot.schedule(now);
        slot.cancel();
        assert!(!slot.fire_if_due(now + Duration::from_secs(5)));
        assert_eq!(slot.kind(), TimerKind::ColorPickerPoll);
    }

    #[test]
    fn earliest_skips_idle_slots() {
        let now = Instant::now();
        let later = now + Duration::from_millis(10);
        assert_eq!(earliest([None, Some(later), Some(now)]), Some(now));
        assert_eq!(earliest([None, None]), None);
    }
}
