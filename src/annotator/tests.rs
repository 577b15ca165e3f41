use super::*;
use crate::config::Settings;
use crate::draw::{PixelSurface, Point, Refresh, Stroke};
use crate::input::{ContactRecord, HardwareKey, KeyRecord, Tool, ToolSettings, ToolType};
use crate::session::{PersistenceStore, SaveOutcome, SessionOptions};
use chrono::Utc;
use crate::store::PageKey;
use crate::util::Rect;
use std::time::{Duration, Instant};

struct Rig {
    annotator: Annotator,
    surface: PixelSurface,
    t0: Instant,
}

impl Rig {
    fn new() -> Self {
        Self {
            annotator: Annotator::new(Settings::default(), 600, 800, PageKey::from(1)),
            surface: PixelSurface::new(600, 800),
            t0: Instant::now(),
        }
    }

    fn at(&self, ms: u64) -> Instant {
        self.t0 + Duration::from_millis(ms)
    }

    fn contact(&mut self, ms: u64, id: i32, x: i32, y: i32, tool_type: ToolType) -> Response {
        let record = ContactRecord {
            slot: 0,
            contact_id: id,
            x: Some(x),
            y: Some(y),
            tool_type,
            time: self.at(ms),
        };
        self.annotator.handle_contact(record, &mut self.surface)
    }

    fn pen(&mut self, ms: u64, x: i32, y: i32) -> Response {
        self.contact(ms, 1, x, y, ToolType::Pen)
    }

    fn lift(&mut self, ms: u64) -> Response {
        let record = ContactRecord {
            slot: 0,
            contact_id: -1,
            x: None,
            y: None,
            tool_type: ToolType::Pen,
            time: self.at(ms),
        };
        self.annotator.handle_contact(record, &mut self.surface)
    }

    fn key(&mut self, ms: u64, key: HardwareKey, pressed: bool) -> Response {
        self.annotator.handle_key(KeyRecord {
            key,
            pressed,
            time: self.at(ms),
        })
    }

    fn advance(&mut self, ms: u64) -> Vec<Signal> {
        let now = self.at(ms);
        self.annotator.advance(now, &mut self.surface)
    }

    fn draw(&mut self, start: u64, points: &[(i32, i32)]) {
        let mut ms = start;
        for (x, y) in points {
            self.pen(ms, *x, *y);
            ms += 20;
        }
        self.lift(ms);
    }
}

#[test]
fn pen_stroke_is_stored_with_undo_entry() {
    let mut rig = Rig::new();
    let down = rig.pen(0, 100, 100);
    assert!(down.dominate);
    rig.pen(20, 120, 100);
    rig.pen(40, 140, 110);
    rig.lift(60);

    let store = rig.annotator.store();
    assert_eq!(store.len(), 1);
    let stroke = store.strokes().next().unwrap();
    assert_eq!(stroke.tool, Tool::Pen);
    assert_eq!(stroke.points.len(), 3);
    assert_eq!(stroke.color_name, "black");
    assert_eq!(rig.annotator.undo_depth(), 1);
    assert!(!rig.annotator.is_drawing());
}

#[test]
fn hold_within_tolerance_opens_picker_and_stores_nothing() {
    let mut rig = Rig::new();
    rig.pen(0, 100, 100);
    rig.pen(50, 103, 102);

    assert_eq!(rig.annotator.next_deadline(), Some(rig.at(100)));
    let signals = rig.advance(500);
    assert!(signals.contains(&Signal::ShowColorPicker {
        tool: Tool::Pen,
        at: Point::new(100, 100),
    }));
    assert!(!rig.annotator.is_drawing());

    // The contact is consumed until lift.
    rig.pen(550, 300, 300);
    let up = rig.lift(600);
    assert!(up.dominate);
    assert!(rig.annotator.store().is_empty());
    assert_eq!(rig.annotator.undo_depth(), 0);
}

#[test]
fn moving_beyond_tolerance_keeps_drawing() {
    let mut rig = Rig::new();
    rig.pen(0, 100, 100);
    rig.pen(50, 130, 100);

    assert!(rig.advance(500).is_empty());
    assert!(rig.annotator.is_drawing());
    rig.pen(600, 160, 100);
    rig.lift(620);

    let stroke = rig.annotator.store().strokes().next().unwrap();
    assert_eq!(stroke.points.len(), 3);
}

#[test]
fn erase_gesture_commits_one_delete() {
    let mut rig = Rig::new();
    rig.draw(0, &[(100, 100), (110, 100)]);
    rig.draw(100, &[(200, 100), (210, 100)]);
    rig.draw(200, &[(400, 400), (410, 400)]);
    assert_eq!(rig.annotator.undo_depth(), 3);

    let down = rig.contact(1000, 2, 100, 100, ToolType::Rubber);
    assert_eq!(down.signals, vec![Signal::RedrawPage]);
    rig.contact(1020, 2, 200, 100, ToolType::Rubber);
    rig.contact(1040, -1, 200, 100, ToolType::Rubber);

    assert_eq!(rig.annotator.store().len(), 1);
    assert_eq!(rig.annotator.undo_depth(), 4);

    assert_eq!(rig.annotator.undo(), Some(Signal::RedrawPage));
    assert_eq!(rig.annotator.store().len(), 3);
    assert!(rig.annotator.store().index_is_consistent());
}

#[test]
fn eraser_miss_changes_nothing() {
    let mut rig = Rig::new();
    rig.draw(0, &[(100, 100), (110, 100)]);
    let down = rig.contact(500, 2, 300, 300, ToolType::Rubber);
    assert!(down.signals.is_empty());
    rig.contact(520, -1, 300, 300, ToolType::Rubber);
    assert_eq!(rig.annotator.store().len(), 1);
    assert_eq!(rig.annotator.undo_depth(), 1);
}

#[test]
fn eraser_tip_key_routes_pen_contact_to_eraser() {
    let mut rig = Rig::new();
    rig.draw(0, &[(100, 100), (110, 100)]);
    rig.key(500, HardwareKey::EraserTip, true);
    rig.pen(510, 105, 100);
    rig.lift(520);
    rig.key(530, HardwareKey::EraserTip, false);
    assert!(rig.annotator.store().is_empty());
}

#[test]
fn side_button_draws_highlighter_and_click_toggles_eraser() {
    let mut rig = Rig::new();
    rig.key(0, HardwareKey::SideButton, true);
    rig.draw(10, &[(50, 50), (90, 50)]);
    let release = rig.key(100, HardwareKey::SideButton, false);
    assert!(release.signals.is_empty());
    let stroke = rig.annotator.store().strokes().next().unwrap();
    assert_eq!(stroke.tool, Tool::Highlighter);
    assert_eq!(rig.annotator.selected_tool(), Tool::Pen);

    rig.key(200, HardwareKey::SideButton, true);
    let release = rig.key(250, HardwareKey::SideButton, false);
    assert_eq!(release.signals, vec![Signal::ToolChanged(Tool::Eraser)]);
    assert_eq!(rig.annotator.selected_tool(), Tool::Eraser);
}

#[test]
fn finger_contacts_never_draw() {
    let mut rig = Rig::new();
    let touch = rig.contact(0, 4, 100, 100, ToolType::Finger);
    assert!(!touch.dominate);
    rig.contact(20, 4, 200, 200, ToolType::Finger);
    rig.contact(40, -1, 200, 200, ToolType::Finger);
    assert!(rig.annotator.store().is_empty());
}

#[test]
fn page_change_mid_stroke_finalizes_on_old_page() {
    let mut rig = Rig::new();
    rig.pen(0, 10, 10);
    rig.pen(20, 40, 40);
    let now = rig.at(30);
    rig.annotator
        .set_page(PageKey::from(2), &mut rig.surface, now);

    assert_eq!(rig.annotator.store().page_count(&PageKey::from(1)), 1);
    assert_eq!(rig.annotator.page(), &PageKey::from(2));
    assert!(!rig.annotator.is_drawing());
}

#[test]
fn same_page_under_another_key_form_keeps_stroke_going() {
    let mut rig = Rig::new();
    rig.pen(0, 10, 10);
    rig.pen(20, 40, 40);
    let now = rig.at(30);
    rig.annotator
        .set_page(PageKey::from("1"), &mut rig.surface, now);
    assert!(rig.annotator.is_drawing());
    assert_eq!(rig.annotator.page(), &PageKey::from(1));

    rig.pen(40, 70, 70);
    rig.lift(60);
    assert_eq!(rig.annotator.store().len(), 1);
    assert_eq!(rig.annotator.store().strokes().next().unwrap().points.len(), 3);
}

#[test]
fn eraser_on_second_slot_cancels_pen_hold() {
    let mut rig = Rig::new();
    rig.pen(0, 100, 100);
    assert!(rig.annotator.next_deadline().is_some());

    let rubber = ContactRecord {
        slot: 1,
        contact_id: 9,
        x: Some(400),
        y: Some(400),
        tool_type: ToolType::Rubber,
        time: rig.at(50),
    };
    rig.annotator.handle_contact(rubber, &mut rig.surface);

    let signals = rig.advance(600);
    assert!(!signals.iter().any(|s| matches!(s, Signal::ShowColorPicker { .. })));
    assert!(!rig.annotator.color_picker_open());
}

#[test]
fn page_change_drops_single_point_stroke() {
    let mut rig = Rig::new();
    rig.pen(0, 10, 10);
    let now = rig.at(5);
    rig.annotator
        .set_page(PageKey::from(2), &mut rig.surface, now);
    assert!(rig.annotator.store().is_empty());
}

#[test]
fn strokes_only_erase_on_their_own_page() {
    let mut rig = Rig::new();
    rig.draw(0, &[(100, 100), (110, 100)]);
    let now = rig.at(200);
    rig.annotator
        .set_page(PageKey::from("1"), &mut rig.surface, now);
    // "1" and 1 are the same page.
    rig.contact(300, 2, 100, 100, ToolType::Rubber);
    rig.contact(320, -1, 100, 100, ToolType::Rubber);
    assert!(rig.annotator.store().is_empty());
}

#[test]
fn picker_taps_are_routed_and_outside_taps_dismiss() {
    let mut rig = Rig::new();
    rig.annotator
        .open_color_picker(Rect::new(0, 0, 100, 100).unwrap());

    let tap = rig.pen(0, 50, 50);
    assert_eq!(tap.signals, vec![Signal::PickerTap { at: Point::new(50, 50) }]);
    rig.pen(10, 60, 60);
    rig.lift(20);
    assert!(rig.annotator.store().is_empty());
    assert_eq!(rig.annotator.next_deadline(), None);

    assert!(rig.annotator.select_color(Tool::Pen, "Red"));
    assert!(!rig.annotator.color_picker_open());
    assert_eq!(rig.annotator.tool_settings(Tool::Pen).color_name, "red");
    assert!(!rig.annotator.select_color(Tool::Pen, "chartreuse"));

    rig.annotator
        .open_color_picker(Rect::new(0, 0, 100, 100).unwrap());
    rig.draw(100, &[(300, 300), (320, 300)]);
    assert!(!rig.annotator.color_picker_open());
    assert_eq!(rig.annotator.store().strokes().next().unwrap().color_name, "red");
}

#[test]
fn clear_page_and_clear_all_are_undoable() {
    let mut rig = Rig::new();
    rig.draw(0, &[(10, 10), (20, 20)]);
    let now = rig.at(100);
    rig.annotator
        .set_page(PageKey::from(2), &mut rig.surface, now);
    rig.draw(200, &[(10, 10), (20, 20)]);
    rig.draw(300, &[(50, 50), (60, 60)]);

    assert_eq!(rig.annotator.clear_page(), Some(Signal::RedrawPage));
    assert_eq!(rig.annotator.store().len(), 1);
    assert_eq!(rig.annotator.clear_page(), None);

    assert_eq!(rig.annotator.clear_all(), Some(Signal::RedrawPage));
    assert!(rig.annotator.store().is_empty());

    rig.annotator.undo();
    assert_eq!(rig.annotator.store().len(), 1);
    rig.annotator.undo();
    assert_eq!(rig.annotator.store().len(), 3);
}

#[test]
fn undo_on_empty_stack_is_a_no_op() {
    let mut rig = Rig::new();
    assert_eq!(rig.annotator.undo(), None);
}

#[test]
fn render_page_paints_only_current_page() {
    let mut rig = Rig::new();
    rig.draw(0, &[(10, 10), (20, 10)]);
    let now = rig.at(100);
    rig.annotator
        .set_page(PageKey::from(2), &mut rig.surface, now);
    rig.draw(200, &[(300, 300), (310, 300)]);

    let mut fresh = PixelSurface::new(600, 800);
    rig.annotator.render_page(&mut fresh);
    assert_eq!(fresh.pixel(15, 10), Some(255));
    assert!(fresh.pixel(305, 300).is_some_and(|v| v < 128));
    assert_eq!(fresh.refreshes(), &[Refresh::Fast]);
}

#[test]
fn lift_schedules_deferred_full_refresh() {
    let mut rig = Rig::new();
    rig.draw(0, &[(10, 10), (20, 10)]);
    // Lift happened at 40 ms.
    assert_eq!(rig.annotator.next_deadline(), Some(rig.at(640)));
    rig.advance(640);
    assert_eq!(rig.surface.refreshes().last(), Some(&Refresh::Full));
    assert_eq!(rig.annotator.next_deadline(), None);
}

#[test]
fn snapshot_lists_strokes_in_draw_order() {
    let mut rig = Rig::new();
    rig.draw(0, &[(10, 10), (20, 10)]);
    rig.draw(100, &[(30, 30)]);
    let snapshot = rig.annotator.snapshot();
    assert_eq!(snapshot.len(), 2);
    assert_eq!(snapshot[0].points[0], Point::new(10, 10));
    assert_eq!(snapshot[1].points, vec![Point::new(30, 30)]);
    assert_eq!(snapshot[1].width, 3);
}

#[test]
fn open_restores_strokes_saved_by_previous_session() {
    let temp = tempfile::tempdir().unwrap();
    let options = SessionOptions::new(temp.path().join("book.sdr"));
    let t0 = Instant::now();
    {
        let mut annotator = Annotator::open(
            Settings::default(),
            600,
            800,
            PageKey::from(7),
            PersistenceStore::new(options.clone()),
        );
        let mut surface = PixelSurface::new(600, 800);
        for (i, (id, x)) in [(1, 10), (1, 30), (-1, 30)].into_iter().enumerate() {
            annotator.handle_contact(
                ContactRecord {
                    slot: 0,
                    contact_id: id,
                    x: Some(x),
                    y: Some(10),
                    tool_type: ToolType::Pen,
                    time: t0 + Duration::from_millis(20 * i as u64),
                },
                &mut surface,
            );
        }
    }

    let reopened = Annotator::open(
        Settings::default(),
        600,
        800,
        PageKey::from(7),
        PersistenceStore::new(options),
    );
    assert_eq!(reopened.store().page_count(&PageKey::from("7")), 1);
    assert_eq!(reopened.undo_depth(), 0);
}

fn seed_file(options: &SessionOptions, count: i32) {
    let pen = ToolSettings {
        width: 4,
        color_name: "black".into(),
        alpha: 255,
    };
    let strokes: Vec<Stroke> = (0..count)
        .map(|i| {
            let mut stroke = Stroke::new(PageKey::from(1), Tool::Pen, &pen, Utc::now());
            stroke.push(Point::new(i * 40, 10));
            stroke.push(Point::new(i * 40 + 20, 30));
            stroke
        })
        .collect();
    let outcome = PersistenceStore::new(options.clone()).save(&strokes);
    assert!(matches!(outcome, SaveOutcome::Saved { .. }));
}

fn stored_count(options: &SessionOptions) -> usize {
    let reopened = Annotator::open(
        Settings::default(),
        600,
        800,
        PageKey::from(1),
        PersistenceStore::new(options.clone()),
    );
    reopened.store().len()
}

#[test]
fn oversized_file_survives_a_session_that_could_not_load_it() {
    let temp = tempfile::tempdir().unwrap();
    let options = SessionOptions::new(temp.path().join("book.sdr"));
    seed_file(&options, 6);

    let mut limited = options.clone();
    limited.max_file_size_bytes = 32;
    let mut annotator = Annotator::open(
        Settings::default(),
        600,
        800,
        PageKey::from(1),
        PersistenceStore::new(limited),
    );
    assert!(annotator.store().is_empty());
    assert!(annotator.persistence().unwrap().is_protected());

    let mut surface = PixelSurface::new(600, 800);
    let t0 = Instant::now();
    for (i, (id, x)) in [(1, 100), (1, 200), (-1, 200)].into_iter().enumerate() {
        annotator.handle_contact(
            ContactRecord {
                slot: 0,
                contact_id: id,
                x: Some(x),
                y: Some(300),
                tool_type: ToolType::Pen,
                time: t0 + Duration::from_millis(20 * i as u64),
            },
            &mut surface,
        );
    }
    assert_eq!(annotator.store().len(), 1);
    assert_eq!(annotator.save(), Some(SaveOutcome::Protected));

    assert_eq!(stored_count(&options), 6);
}

#[test]
fn truncated_load_never_overwrites_the_full_file() {
    let temp = tempfile::tempdir().unwrap();
    let options = SessionOptions::new(temp.path().join("book.sdr"));
    seed_file(&options, 5);

    let mut settings = Settings::default();
    settings.max_strokes = 2;
    let mut annotator = Annotator::open(
        settings,
        600,
        800,
        PageKey::from(1),
        PersistenceStore::new(options.clone()),
    );
    assert_eq!(annotator.store().len(), 2);
    assert!(annotator.persistence().unwrap().is_protected());

    assert_eq!(annotator.clear_all(), Some(Signal::RedrawPage));
    assert!(annotator.store().is_empty());

    assert_eq!(stored_count(&options), 5);
}
