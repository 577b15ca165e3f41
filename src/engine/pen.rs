use std::time::Instant;

use log::debug;

use crate::draw::{Palette, Point, Stroke, Surface, render_dot, render_segment, stroke_color};

use super::{DrawingState, StrokeEngine};

impl StrokeEngine {
    /// Starts drawing `stroke` (which already holds its first point).
    ///
    /// Cancels any pending deferred repaint. A stroke already in progress on
    /// another slot is dropped.
    pub fn begin(&mut self, slot: u32, stroke: Stroke) {
        self.deferred.cancel();
        if let DrawingState::Drawing { slot: old, .. } = &self.state {
            debug!("Stroke on slot {} replaced by new down on slot {}", old, slot);
        }
        self.dirty.clear();
        self.last_refresh = None;
        self.state = DrawingState::Drawing { slot, stroke };
    }

    /// Appends a point and paints the new segment.
    pub fn extend(
        &mut self,
        slot: u32,
        point: Point,
        surface: &mut dyn Surface,
        palette: &Palette,
        now: Instant,
    ) {
        let DrawingState::Drawing { slot: owner, stroke } = &mut self.state else {
            return;
        };
        if *owner != slot {
            return;
        }
        let previous = stroke.last_point();
        stroke.push(point);
        if let Some(previous) = previous {
            let color = stroke_color(stroke, palette);
            render_segment(surface, previous, point, stroke.width, color);
            self.dirty.mark_segment(previous, point, stroke.width);
        }
        self.request_refresh(surface, now);
    }

    /// Ends the stroke on lift.
    ///
    /// Returns the stroke when it has at least one point. The dirty region is
    /// flushed at once and the deferred full repaint is armed either way.
    pub fn finish(
        &mut self,
        slot: u32,
        point: Option<Point>,
        surface: &mut dyn Surface,
        palette: &Palette,
        now: Instant,
    ) -> Option<Stroke> {
        if self.drawing_slot() != Some(slot) {
            return None;
        }
        if let Some(point) = point {
            let moved = self
                .current_stroke()
                .and_then(Stroke::last_point)
                .is_some_and(|last| last != point);
            if moved {
                self.extend(slot, point, surface, palette, now);
            }
        }
        let finished = self.take_stroke(surface, palette);
        self.flush(surface, now);
        self.schedule_deferred_repaint(now);
        finished
    }

    /// Drops the stroke in progress without storing it.
    ///
    /// Returns true if any of it had already been painted.
    pub fn discard(&mut self, surface: &mut dyn Surface, now: Instant) -> bool {
        let DrawingState::Drawing { stroke, .. } =
            std::mem::replace(&mut self.state, DrawingState::Idle)
        else {
            return false;
        };
        debug!("Discarding stroke with {} point(s)", stroke.points.len());
        let painted = stroke.points.len() >= 2;
        self.flush(surface, now);
        if painted {
            self.schedule_deferred_repaint(now);
        }
        painted
    }

    /// Handles a page change while drawing.
    ///
    /// A stroke with at least two points is finalized as on lift; anything
    /// shorter is discarded.
    pub fn interrupt(
        &mut self,
        surface: &mut dyn Surface,
        palette: &Palette,
        now: Instant,
    ) -> Option<Stroke> {
        let points = self.current_stroke()?.points.len();
        if points >= 2 {
            let slot = self.drawing_slot()?;
            self.finish(slot, None, surface, palette, now)
        } else {
            self.discard(surface, now);
            None
        }
    }

    fn take_stroke(&mut self, surface: &mut dyn Surface, palette: &Palette) -> Option<Stroke> {
        let DrawingState::Drawing { stroke, .. } =
            std::mem::replace(&mut self.state, DrawingState::Idle)
        else {
            return None;
        };
        match stroke.points.as_slice() {
            [] => None,
            [only] => {
                // Single taps were never painted by a segment.
                render_dot(surface, *only, stroke.width, stroke_color(&stroke, palette));
                self.dirty.mark_segment(*only, *only, stroke.width);
                Some(stroke)
            }
            _ => Some(stroke),
        }
    }
}
