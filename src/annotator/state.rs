//! Annotation session state for one open document.

use log::{debug, info, warn};

use crate::config::Settings;
use crate::draw::{Point, Stroke, Surface};
use crate::engine::StrokeEngine;
use crate::input::{InputClassifier, Rotation, Tool, ToolSettings};
use crate::session::{PersistenceStore, SaveOutcome};
use crate::store::{EraseIndex, PageKey, StoredStroke, StrokeSummary, UndoAction, UndoStack};
use crate::util::Rect;
use std::time::Instant;

/// Notification for the host or its collaborators.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Signal {
    /// The hold gesture fired; the host should open its color picker.
    ShowColorPicker { tool: Tool, at: Point },
    /// A stylus down landed inside the open picker's bounds.
    PickerTap { at: Point },
    /// Stored strokes changed; redraw document content, then call `render_page`.
    RedrawPage,
    /// The side button toggled the selected tool.
    ToolChanged(Tool),
}

/// Per-event answer to the event source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// Suppress the host's own gesture handling for this event.
    pub dominate: bool,
    pub signals: Vec<Signal>,
}

impl Response {
    pub(super) fn push(&mut self, signal: Signal) {
        if !self.signals.contains(&signal) {
            self.signals.push(signal);
        }
    }
}

/// Erase strokes removed by one eraser contact, committed as one undo step.
#[derive(Debug)]
pub(super) struct EraseGesture {
    pub(super) slot: u32,
    pub(super) removed: Vec<StoredStroke>,
}

/// Stylus annotation over one paginated document.
///
/// Owns the classifier, the stroke engine, the page-indexed store, the undo
/// stack and (optionally) the document's persistence store. The host feeds
/// it events, lends it a [`Surface`] per call, and drives its timers through
/// [`next_deadline`](Self::next_deadline) and [`advance`](Self::advance).
pub struct Annotator {
    pub(super) settings: Settings,
    pub(super) classifier: InputClassifier,
    pub(super) engine: StrokeEngine,
    pub(super) store: EraseIndex,
    pub(super) undo: UndoStack,
    pub(super) persistence: Option<PersistenceStore>,
    pub(super) page: PageKey,
    pub(super) picker_bounds: Option<Rect>,
    /// Contact that tapped the picker; its later events are swallowed.
    pub(super) picker_slot: Option<u32>,
    pub(super) erase: Option<EraseGesture>,
}

impl Annotator {
    /// Creates an in-memory annotator for a `width` x `height` logical screen.
    pub fn new(settings: Settings, width: i32, height: i32, page: PageKey) -> Self {
        let classifier = InputClassifier::new(settings.rotation, width, height, settings.hold);
        let engine = StrokeEngine::new(settings.refresh);
        let store = EraseIndex::new(settings.eraser_radius, settings.max_strokes);
        Self {
            settings,
            classifier,
            engine,
            store,
            undo: UndoStack::new(),
            persistence: None,
            page,
            picker_bounds: None,
            picker_slot: None,
            erase: None,
        }
    }

    /// Creates an annotator backed by `persistence` and loads its strokes.
    ///
    /// When the file could not be loaded in full the store is protected and
    /// nothing this session does is written back.
    pub fn open(
        settings: Settings,
        width: i32,
        height: i32,
        page: PageKey,
        mut persistence: PersistenceStore,
    ) -> Self {
        let mut annotator = Self::new(settings, width, height, page);
        let strokes = persistence.load(&annotator.settings.tools, &annotator.settings.palette);
        if annotator.store.load(strokes) > 0 {
            persistence.protect();
        }
        info!(
            "Opened annotations at {} with {} stroke(s)",
            persistence.path().display(),
            annotator.store.len()
        );
        annotator.persistence = Some(persistence);
        annotator
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn page(&self) -> &PageKey {
        &self.page
    }

    pub fn store(&self) -> &EraseIndex {
        &self.store
    }

    pub fn persistence(&self) -> Option<&PersistenceStore> {
        self.persistence.as_ref()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn is_drawing(&self) -> bool {
        self.engine.is_drawing()
    }

    pub fn selected_tool(&self) -> Tool {
        self.classifier.selected_tool()
    }

    pub fn tool_settings(&self, tool: Tool) -> &ToolSettings {
        self.settings.tools.get(tool)
    }

    pub fn color_picker_open(&self) -> bool {
        self.picker_bounds.is_some()
    }

    /// Export view of every stored stroke in draw order.
    pub fn snapshot(&self) -> Vec<StrokeSummary> {
        self.store.snapshot()
    }

    pub fn set_rotation(&mut self, rotation: Rotation, width: i32, height: i32) {
        self.classifier.set_rotation(rotation, width, height);
    }

    /// Switches the current page. Keys naming the same page (`5` and `"5"`)
    /// are not a change.
    ///
    /// A stroke in progress is finalized when it has at least two points and
    /// discarded otherwise. An erase gesture in progress is committed.
    pub fn set_page(&mut self, page: PageKey, surface: &mut dyn Surface, now: Instant) {
        if self.page.same_page(&page) {
            return;
        }
        if let Some(stroke) = self.engine.interrupt(surface, &self.settings.palette, now) {
            debug!("Page change finalized stroke in progress");
            self.finalize_stroke(stroke);
        }
        self.classifier.cancel_hold();
        self.commit_erase();
        debug!("Page {} -> {}", self.page, page);
        self.page = page;
    }

    pub fn select_tool(&mut self, tool: Tool) {
        self.classifier.select_tool(tool);
    }

    /// Sets the color of `tool` to the palette entry `name`.
    ///
    /// Returns false (and changes nothing) for unknown names. A successful
    /// choice also closes the color picker.
    pub fn select_color(&mut self, tool: Tool, name: &str) -> bool {
        let Some(canonical) = self.settings.palette.canonical_name(name) else {
            warn!("Ignoring unknown color '{}' for {}", name, tool);
            return false;
        };
        self.settings.tools.get_mut(tool).color_name = canonical.to_string();
        self.picker_bounds = None;
        true
    }

    pub fn set_width(&mut self, tool: Tool, width: u32) {
        self.settings.tools.get_mut(tool).width = width.max(1);
    }

    /// Records where the host's color picker is drawn.
    pub fn open_color_picker(&mut self, bounds: Rect) {
        self.picker_bounds = Some(bounds);
    }

    pub fn close_color_picker(&mut self) {
        self.picker_bounds = None;
    }

    /// Writes the store through the persistence store, if any.
    pub fn save(&self) -> Option<SaveOutcome> {
        let persistence = self.persistence.as_ref()?;
        Some(persistence.save(self.store.strokes()))
    }

    pub(super) fn finalize_stroke(&mut self, stroke: Stroke) {
        let points = stroke.points.len();
        match self.store.insert(stroke) {
            Some(id) => {
                debug!("Stroke {:?} finalized with {} point(s)", id, points);
                self.undo.push(UndoAction::Add(id));
                self.save();
            }
            None => debug!("Stroke dropped by store"),
        }
    }

    pub(super) fn commit_erase(&mut self) {
        let Some(gesture) = self.erase.take() else {
            return;
        };
        if gesture.removed.is_empty() {
            return;
        }
        debug!("Erase gesture removed {} stroke(s)", gesture.removed.len());
        self.undo.push(UndoAction::Delete(gesture.removed));
        self.save();
    }
}
