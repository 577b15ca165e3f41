use super::*;
use crate::draw::{Palette, PixelSurface, Point, Refresh, Stroke};
use crate::input::{Tool, ToolSettings};
use crate::store::PageKey;
use chrono::Utc;
use std::time::{Duration, Instant};

fn ms(n: u64) -> Duration {
    Duration::from_millis(n)
}

fn pen_stroke(at: Point) -> Stroke {
    let mut stroke = Stroke::new(
        PageKey::from(1),
        Tool::Pen,
        &ToolSettings {
            width: 3,
            color_name: "black".into(),
            alpha: 255,
        },
        Utc::now(),
    );
    stroke.push(at);
    stroke
}

fn setup() -> (StrokeEngine, PixelSurface, Palette) {
    (
        StrokeEngine::new(RefreshSettings::default()),
        PixelSurface::new(200, 200),
        Palette::builtin(),
    )
}

fn partials(surface: &PixelSurface) -> usize {
    surface
        .refreshes()
        .iter()
        .filter(|r| matches!(r, Refresh::Partial(_)))
        .count()
}

#[test]
fn down_move_up_finalizes_stroke() {
    let (mut engine, mut surface, palette) = setup();
    let t0 = Instant::now();
    engine.begin(0, pen_stroke(Point::new(10, 10)));
    assert!(engine.is_drawing());
    engine.extend(0, Point::new(20, 10), &mut surface, &palette, t0 + ms(5));
    engine.extend(0, Point::new(30, 12), &mut surface, &palette, t0 + ms(40));

    let stroke = engine
        .finish(0, Some(Point::new(30, 12)), &mut surface, &palette, t0 + ms(60))
        .expect("stroke finalized");
    assert_eq!(
        stroke.points,
        vec![Point::new(10, 10), Point::new(20, 10), Point::new(30, 12)]
    );
    assert!(!engine.is_drawing());
    assert!(surface.pixel(15, 10).is_some_and(|v| v < 128));
}

#[test]
fn single_tap_is_kept_and_painted_as_a_dot() {
    let (mut engine, mut surface, palette) = setup();
    let t0 = Instant::now();
    engine.begin(0, pen_stroke(Point::new(50, 50)));
    let stroke = engine.finish(0, None, &mut surface, &palette, t0).unwrap();
    assert_eq!(stroke.points.len(), 1);
    assert_eq!(surface.pixel(50, 50), Some(0));
    assert_eq!(partials(&surface), 1);
}

#[test]
fn partial_refreshes_are_throttled() {
    let (mut engine, mut surface, palette) = setup();
    let t0 = Instant::now();
    engine.begin(0, pen_stroke(Point::new(10, 10)));
    engine.extend(0, Point::new(12, 10), &mut surface, &palette, t0);
    assert_eq!(partials(&surface), 1);

    // Inside the throttle window: painted but not yet refreshed.
    engine.extend(0, Point::new(14, 10), &mut surface, &palette, t0 + ms(4));
    engine.extend(0, Point::new(16, 10), &mut surface, &palette, t0 + ms(8));
    assert_eq!(partials(&surface), 1);
    assert_eq!(engine.next_deadline(), Some(t0 + ms(16)));

    engine.advance(&mut surface, t0 + ms(16));
    assert_eq!(partials(&surface), 2);
    let Some(Refresh::Partial(rect)) = surface.refreshes().last().copied() else {
        panic!("expected a partial refresh");
    };
    // One rectangle covering both coalesced segments.
    assert!(rect.contains(13, 10) && rect.contains(16, 10));
    assert_eq!(engine.next_deadline(), None);
}

#[test]
fn lift_flushes_and_arms_deferred_repaint() {
    let (mut engine, mut surface, palette) = setup();
    let t0 = Instant::now();
    engine.begin(0, pen_stroke(Point::new(10, 10)));
    engine.extend(0, Point::new(12, 10), &mut surface, &palette, t0);
    engine.extend(0, Point::new(14, 10), &mut surface, &palette, t0 + ms(2));
    engine.finish(0, None, &mut surface, &palette, t0 + ms(3));

    assert_eq!(partials(&surface), 2);
    assert!(engine.deferred_repaint_pending());
    assert!(!engine.advance(&mut surface, t0 + ms(500)));
    assert!(engine.advance(&mut surface, t0 + ms(603)));
    assert_eq!(surface.refreshes().last(), Some(&Refresh::Full));
}

#[test]
fn new_down_cancels_deferred_repaint() {
    let (mut engine, mut surface, palette) = setup();
    let t0 = Instant::now();
    engine.begin(0, pen_stroke(Point::new(10, 10)));
    engine.finish(0, None, &mut surface, &palette, t0);
    assert!(engine.deferred_repaint_pending());

    engine.begin(0, pen_stroke(Point::new(40, 40)));
    assert!(!engine.deferred_repaint_pending());
    assert!(!engine.advance(&mut surface, t0 + ms(1000)));
}

#[test]
fn page_change_finalizes_long_stroke_and_drops_short_one() {
    let (mut engine, mut surface, palette) = setup();
    let t0 = Instant::now();
    engine.begin(0, pen_stroke(Point::new(10, 10)));
    engine.extend(0, Point::new(20, 20), &mut surface, &palette, t0);
    let kept = engine.interrupt(&mut surface, &palette, t0 + ms(1));
    assert_eq!(kept.map(|s| s.points.len()), Some(2));

    engine.begin(0, pen_stroke(Point::new(10, 10)));
    assert_eq!(engine.interrupt(&mut surface, &palette, t0 + ms(2)), None);
    assert!(!engine.is_drawing());
}

#[test]
fn discard_reports_painted_ink() {
    let (mut engine, mut surface, palette) = setup();
    let t0 = Instant::now();
    engine.begin(0, pen_stroke(Point::new(10, 10)));
    assert!(!engine.discard(&mut surface, t0));

    engine.begin(0, pen_stroke(Point::new(10, 10)));
    engine.extend(0, Point::new(11, 11), &mut surface, &palette, t0);
    assert!(engine.discard(&mut surface, t0));
    assert!(engine.deferred_repaint_pending());
}

#[test]
fn moves_from_other_slots_are_ignored() {
    let (mut engine, mut surface, palette) = setup();
    let t0 = Instant::now();
    engine.begin(0, pen_stroke(Point::new(10, 10)));
    engine.extend(1, Point::new(90, 90), &mut surface, &palette, t0);
    assert_eq!(engine.current_stroke().map(|s| s.points.len()), Some(1));
    assert_eq!(engine.finish(1, None, &mut surface, &palette, t0), None);
    assert!(engine.is_drawing());
}
