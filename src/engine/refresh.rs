use std::time::Instant;

use log::trace;

use crate::draw::Surface;

use super::StrokeEngine;

impl StrokeEngine {
    /// Refreshes the dirty region now, or arms the throttle timer if the last
    /// refresh was less than one throttle interval ago.
    pub(super) fn request_refresh(&mut self, surface: &mut dyn Surface, now: Instant) {
        if !self.dirty.is_dirty() {
            return;
        }
        match self.last_refresh {
            Some(last) if now.saturating_duration_since(last) < self.settings.throttle => {
                self.throttle.schedule_if_idle(last + self.settings.throttle);
            }
            _ => self.flush(surface, now),
        }
    }

    /// Pushes the accumulated dirty rectangle to the panel.
    pub(super) fn flush(&mut self, surface: &mut dyn Surface, now: Instant) {
        self.throttle.cancel();
        let (width, height) = surface.size();
        if let Some(rect) = self.dirty.take_region(width, height) {
            trace!("Partial refresh {:?}", rect);
            surface.refresh_partial(rect);
            self.last_refresh = Some(now);
        }
    }

    pub(super) fn schedule_deferred_repaint(&mut self, now: Instant) {
        self.deferred.schedule(now + self.settings.quiet_period);
    }

    pub fn cancel_deferred_repaint(&mut self) {
        self.deferred.cancel();
    }

    /// Runs due timers. Returns true when the deferred full repaint fired.
    pub fn advance(&mut self, surface: &mut dyn Surface, now: Instant) -> bool {
        if self.throttle.fire_if_due(now) {
            self.flush(surface, now);
        }
        if self.deferred.fire_if_due(now) {
            trace!("Deferred full repaint");
            surface.refresh_full();
            return true;
        }
        false
    }
}
