//! Scripted event replay.
//!
//! A replay script is a JSON document listing stylus contacts, key changes
//! and host actions with millisecond offsets. The events are fed through a
//! full [`Annotator`] in virtual time against a [`PixelSurface`], with every
//! timer firing at its own deadline, as a host event loop would.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use serde::Deserialize;
use thiserror::Error;

use crate::annotator::{Annotator, Signal};
use crate::config::Settings;
use crate::draw::{PixelSurface, Refresh};
use crate::input::{
    ContactRecord, HardwareKey, KeyRecord, Rotation, RotationError, Tool, ToolType,
};
use crate::session::{PersistenceStore, SaveOutcome};
use crate::store::{CanonicalPage, PageKey};
use crate::util::Rect;

/// Upper bound on timer callbacks run between two events.
const MAX_TIMER_STEPS: usize = 10_000;

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("Failed to read replay script {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed replay script: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Event {index} at {at_ms} ms is earlier than the previous event at {previous_ms} ms")]
    OutOfOrder {
        index: usize,
        at_ms: u64,
        previous_ms: u64,
    },

    #[error(transparent)]
    Rotation(#[from] RotationError),

    #[error(
        "Surface size {width}x{height} is not usable (each side must be 1..={max})",
        max = MAX_SURFACE_SIDE
    )]
    InvalidSurface { width: i32, height: i32 },
}

/// Parsed replay script.
#[derive(Debug, Clone, Deserialize)]
pub struct ReplayScript {
    /// Page shown when the replay starts.
    #[serde(default = "default_page")]
    pub page: PageKey,
    /// Overrides the configured screen rotation, in degrees.
    #[serde(default)]
    pub rotation: Option<i32>,
    pub events: Vec<ScriptEvent>,
}

fn default_page() -> PageKey {
    PageKey::from(1)
}

#[derive(Debug, Clone, Deserialize)]
pub struct ScriptEvent {
    /// Offset from the start of the replay.
    pub at_ms: u64,
    #[serde(flatten)]
    pub action: ScriptAction,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptAction {
    /// One multi-touch slot record. `id` of -1 lifts the contact.
    Contact {
        #[serde(default)]
        slot: u32,
        id: i32,
        #[serde(default)]
        x: Option<i32>,
        #[serde(default)]
        y: Option<i32>,
        #[serde(default = "default_tool_type")]
        tool: ToolType,
    },
    Key {
        key: HardwareKey,
        pressed: bool,
    },
    Page {
        page: PageKey,
    },
    SelectTool {
        tool: Tool,
    },
    SelectColor {
        tool: Tool,
        color: String,
    },
    OpenPicker {
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
    Undo,
    ClearPage,
    ClearAll,
    /// Only lets time pass so pending timers fire.
    Advance,
}

fn default_tool_type() -> ToolType {
    ToolType::Pen
}

/// Parses a script and checks that event offsets never decrease.
pub fn parse_script(text: &str) -> Result<ReplayScript, ReplayError> {
    let script: ReplayScript = serde_json::from_str(text)?;
    let mut previous_ms = 0;
    for (index, event) in script.events.iter().enumerate() {
        if event.at_ms < previous_ms {
            return Err(ReplayError::OutOfOrder {
                index,
                at_ms: event.at_ms,
                previous_ms,
            });
        }
        previous_ms = event.at_ms;
    }
    Ok(script)
}

pub fn load_script(path: &Path) -> Result<ReplayScript, ReplayError> {
    let text = std::fs::read_to_string(path).map_err(|source| ReplayError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    parse_script(&text)
}

/// Summary of one replay.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplayReport {
    pub events: usize,
    pub strokes: usize,
    pub pages: Vec<(CanonicalPage, usize)>,
    pub signals: Vec<Signal>,
    pub partial_refreshes: usize,
    pub fast_refreshes: usize,
    pub full_refreshes: usize,
    /// Outcome of the final save, when a persistence store was attached.
    pub saved: Option<SaveOutcome>,
}

/// Largest accepted replay surface side, in pixels.
pub const MAX_SURFACE_SIDE: i32 = 16_384;

/// Runs `script` on a `width` x `height` surface.
///
/// With a persistence store, previously saved strokes are loaded first and the
/// result is saved at the end.
pub fn run_script(
    script: &ReplayScript,
    mut settings: Settings,
    width: i32,
    height: i32,
    persistence: Option<PersistenceStore>,
) -> Result<ReplayReport, ReplayError> {
    if !(1..=MAX_SURFACE_SIDE).contains(&width) || !(1..=MAX_SURFACE_SIDE).contains(&height) {
        return Err(ReplayError::InvalidSurface { width, height });
    }
    if let Some(degrees) = script.rotation {
        settings.rotation = Rotation::from_degrees(degrees)?;
    }

    let page = script.page.clone();
    let mut annotator = match persistence {
        Some(store) => Annotator::open(settings, width, height, page, store),
        None => Annotator::new(settings, width, height, page),
    };
    let mut surface = PixelSurface::new(width, height);
    let mut signals = Vec::new();
    let base = Instant::now();

    for event in &script.events {
        let now = base + Duration::from_millis(event.at_ms);
        run_timers(&mut annotator, &mut surface, Some(now), &mut signals);
        apply(&mut annotator, &mut surface, &event.action, now, &mut signals);
    }
    run_timers(&mut annotator, &mut surface, None, &mut signals);

    let saved = annotator.save();
    let store = annotator.store();
    let refreshes = surface.refreshes();
    let report = ReplayReport {
        events: script.events.len(),
        strokes: store.len(),
        pages: store.page_counts(),
        signals,
        partial_refreshes: refreshes
            .iter()
            .filter(|r| matches!(r, Refresh::Partial(_)))
            .count(),
        fast_refreshes: refreshes.iter().filter(|r| **r == Refresh::Fast).count(),
        full_refreshes: refreshes.iter().filter(|r| **r == Refresh::Full).count(),
        saved,
    };
    info!(
        "Replayed {} event(s): {} stroke(s) on {} page(s)",
        report.events,
        report.strokes,
        report.pages.len()
    );
    Ok(report)
}

/// Fires every timer due at or before `until` (or all of them for `None`) in
/// deadline order.
fn run_timers(
    annotator: &mut Annotator,
    surface: &mut PixelSurface,
    until: Option<Instant>,
    signals: &mut Vec<Signal>,
) {
    for _ in 0..MAX_TIMER_STEPS {
        let Some(deadline) = annotator.next_deadline() else {
            return;
        };
        if until.is_some_and(|until| deadline > until) {
            return;
        }
        signals.extend(annotator.advance(deadline, surface));
    }
    warn!("Timers still pending after {} steps", MAX_TIMER_STEPS);
}

fn apply(
    annotator: &mut Annotator,
    surface: &mut PixelSurface,
    action: &ScriptAction,
    now: Instant,
    signals: &mut Vec<Signal>,
) {
    match action {
        ScriptAction::Contact {
            slot,
            id,
            x,
            y,
            tool,
        } => {
            let record = ContactRecord {
                slot: *slot,
                contact_id: *id,
                x: *x,
                y: *y,
                tool_type: *tool,
                time: now,
            };
            signals.extend(annotator.handle_contact(record, surface).signals);
        }
        ScriptAction::Key { key, pressed } => {
            let record = KeyRecord {
                key: *key,
                pressed: *pressed,
                time: now,
            };
            signals.extend(annotator.handle_key(record).signals);
        }
        ScriptAction::Page { page } => annotator.set_page(page.clone(), surface, now),
        ScriptAction::SelectTool { tool } => annotator.select_tool(*tool),
        ScriptAction::SelectColor { tool, color } => {
            annotator.select_color(*tool, color);
        }
        ScriptAction::OpenPicker {
            x,
            y,
            width,
            height,
        } => match Rect::new(*x, *y, *width, *height) {
            Some(bounds) => annotator.open_color_picker(bounds),
            None => warn!("Ignoring empty picker bounds {}x{}", width, height),
        },
        ScriptAction::Undo => signals.extend(annotator.undo()),
        ScriptAction::ClearPage => signals.extend(annotator.clear_page()),
        ScriptAction::ClearAll => signals.extend(annotator.clear_all()),
        ScriptAction::Advance => debug!("Advance"),
    }
}
