use std::time::Instant;

use chrono::Utc;
use log::{debug, trace};

use super::state::{EraseGesture, Response, Signal};
use super::Annotator;
use crate::draw::{Point, Stroke, Surface};
use crate::input::{ClassifiedEvent, ContactRecord, KeyRecord, Phase, Tool};
use crate::store::UndoAction;
use crate::timer;

impl Annotator {
    /// Feeds one contact record through classification and into the engine
    /// or the eraser.
    pub fn handle_contact(
        &mut self,
        record: ContactRecord,
        surface: &mut dyn Surface,
    ) -> Response {
        let outcome = self.classifier.handle_contact(record);
        let mut response = Response {
            dominate: outcome.dominate,
            signals: Vec::new(),
        };
        if let Some(event) = outcome.event {
            match event.phase {
                Phase::Down => self.on_down(event, &mut response),
                Phase::Move => self.on_move(event, surface, &mut response),
                Phase::Up => self.on_up(event, surface),
            }
        }
        response
    }

    /// Feeds one stylus key record to the classifier.
    pub fn handle_key(&mut self, record: KeyRecord) -> Response {
        let outcome = self.classifier.handle_key(record);
        let mut response = Response {
            dominate: outcome.dominate,
            signals: Vec::new(),
        };
        if let Some(tool) = outcome.selected_tool_changed {
            response.push(Signal::ToolChanged(tool));
        }
        response
    }

    /// Earliest pending timer deadline across every concern.
    pub fn next_deadline(&self) -> Option<Instant> {
        timer::earliest([self.classifier.next_deadline(), self.engine.next_deadline()])
    }

    /// Runs every timer due at `now`.
    pub fn advance(&mut self, now: Instant, surface: &mut dyn Surface) -> Vec<Signal> {
        let mut response = Response::default();
        if let Some(trigger) = self.classifier.advance(now) {
            let tool = match self.engine.current_stroke() {
                Some(stroke) if self.engine.drawing_slot() == Some(trigger.slot) => stroke.tool,
                _ => self.classifier.selected_tool(),
            };
            if self.engine.drawing_slot() == Some(trigger.slot) && self.engine.discard(surface, now)
            {
                response.push(Signal::RedrawPage);
            }
            debug!("Hold on slot {} opens color picker for {}", trigger.slot, tool);
            response.push(Signal::ShowColorPicker {
                tool,
                at: trigger.origin,
            });
        }
        self.engine.advance(surface, now);
        response.signals
    }

    fn on_down(&mut self, event: ClassifiedEvent, response: &mut Response) {
        self.engine.cancel_deferred_repaint();
        self.commit_erase();

        if let Some(bounds) = self.picker_bounds {
            if bounds.contains(event.point.x, event.point.y) {
                trace!("Down at {:?} inside color picker", event.point);
                self.classifier.cancel_hold();
                self.picker_slot = Some(event.slot);
                response.push(Signal::PickerTap { at: event.point });
                return;
            }
            debug!("Down outside color picker; dismissing it");
            self.picker_bounds = None;
        }

        match event.tool {
            Tool::Eraser => {
                self.erase = Some(EraseGesture {
                    slot: event.slot,
                    removed: Vec::new(),
                });
                self.erase_at(event.point, response);
            }
            Tool::Pen | Tool::Highlighter => {
                let mut stroke = Stroke::new(
                    self.page.clone(),
                    event.tool,
                    self.settings.tools.get(event.tool),
                    Utc::now(),
                );
                stroke.push(event.point);
                self.engine.begin(event.slot, stroke);
            }
        }
    }

    fn on_move(
        &mut self,
        event: ClassifiedEvent,
        surface: &mut dyn Surface,
        response: &mut Response,
    ) {
        if self.picker_slot == Some(event.slot) {
            return;
        }
        if self.erase.as_ref().is_some_and(|g| g.slot == event.slot) {
            self.erase_at(event.point, response);
            return;
        }
        self.engine
            .extend(event.slot, event.point, surface, &self.settings.palette, event.time);
    }

    fn on_up(&mut self, event: ClassifiedEvent, surface: &mut dyn Surface) {
        if self.picker_slot == Some(event.slot) {
            self.picker_slot = None;
            return;
        }
        if self.erase.as_ref().is_some_and(|g| g.slot == event.slot) {
            self.commit_erase();
            return;
        }
        let finished = self.engine.finish(
            event.slot,
            Some(event.point),
            surface,
            &self.settings.palette,
            event.time,
        );
        if let Some(stroke) = finished {
            self.finalize_stroke(stroke);
        }
    }

    fn erase_at(&mut self, point: Point, response: &mut Response) {
        let Some(removed) = self.store.erase_at(point.x, point.y, &self.page) else {
            return;
        };
        match self.erase.as_mut() {
            Some(gesture) => gesture.removed.extend(removed),
            None => self.undo.push(UndoAction::Delete(removed)),
        }
        response.push(Signal::RedrawPage);
    }
}
