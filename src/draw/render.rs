//! Stamped-rectangle rasterization of strokes.
//!
//! Target surfaces expose nothing but a rectangle fill, so lines are built by
//! stamping one filled square per pixel of travel along each segment.

use super::color::{BLACK, Color, HIGHLIGHT_TONE, Palette};
use super::stroke::{Point, Stroke};
use super::surface::Surface;
use crate::input::Tool;
use crate::util::{self, Rect};
use log::debug;

/// Resolves the color a stroke is painted with.
///
/// Highlighter strokes always use [`HIGHLIGHT_TONE`] and ignore their stored
/// alpha. Other strokes use their palette color with the stored alpha; an
/// unknown name paints black.
pub fn stroke_color(stroke: &Stroke, palette: &Palette) -> Color {
    style_color(stroke.tool, &stroke.color_name, stroke.alpha, palette)
}

pub(crate) fn style_color(tool: Tool, color_name: &str, alpha: u8, palette: &Palette) -> Color {
    if tool == Tool::Highlighter {
        return HIGHLIGHT_TONE;
    }
    match palette.resolve(color_name) {
        Some(color) => color.with_alpha(alpha),
        None => {
            debug!("Color '{}' not in palette, painting black", color_name);
            BLACK.with_alpha(alpha)
        }
    }
}

/// Renders every stroke in order (first = bottom layer).
pub fn render_strokes<'a>(
    surface: &mut dyn Surface,
    strokes: impl IntoIterator<Item = &'a Stroke>,
    palette: &Palette,
) {
    for stroke in strokes {
        render_stroke(surface, stroke, palette);
    }
}

/// Renders one stroke.
///
/// A single point becomes one square of side `width`; longer strokes stamp
/// every consecutive pair with [`render_segment`].
pub fn render_stroke(surface: &mut dyn Surface, stroke: &Stroke, palette: &Palette) {
    let color = stroke_color(stroke, palette);
    match stroke.points.as_slice() {
        [] => {}
        [only] => render_dot(surface, *only, stroke.width, color),
        points => {
            for pair in points.windows(2) {
                render_segment(surface, pair[0], pair[1], stroke.width, color);
            }
        }
    }
}

/// Fills one square of side `width` centered on `p`.
pub fn render_dot(surface: &mut dyn Surface, p: Point, width: u32, color: Color) {
    if let Some(rect) = Rect::centered_square(p.x, p.y, width.max(1) as i32) {
        surface.fill_rect(rect, color);
    }
}

/// Draws a line from `a` to `b` as a run of stamped squares.
///
/// Step count is `ceil(distance)`; a square is stamped at each integer step
/// of the linear interpolation, endpoints included.
pub fn render_segment(surface: &mut dyn Surface, a: Point, b: Point, width: u32, color: Color) {
    let steps = util::distance(a, b).ceil() as i32;
    if steps == 0 {
        render_dot(surface, a, width, color);
        return;
    }

    let dx = (b.x - a.x) as f64;
    let dy = (b.y - a.y) as f64;
    for i in 0..=steps {
        let t = i as f64 / steps as f64;
        let x = (a.x as f64 + dx * t).round() as i32;
        let y = (a.y as f64 + dy * t).round() as i32;
        render_dot(surface, Point::new(x, y), width, color);
    }
}
