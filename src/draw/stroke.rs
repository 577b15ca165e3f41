//! Stroke and point definitions for freehand annotations.

use crate::input::{Tool, ToolSettings};
use crate::store::PageKey;
use crate::util::{self, Rect};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A logical-screen coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl From<(i32, i32)> for Point {
    fn from((x, y): (i32, i32)) -> Self {
        Self { x, y }
    }
}

/// One continuous annotation gesture.
///
/// Points keep insertion order. A stroke in the store always has at least one
/// point; an empty stroke only exists while it is being drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stroke {
    pub page: PageKey,
    pub tool: Tool,
    pub points: Vec<Point>,
    /// Line width in pixels (always > 0)
    pub width: u32,
    /// Symbolic palette name, resolved at render time
    pub color_name: String,
    pub alpha: u8,
    pub timestamp: DateTime<Utc>,
}

impl Stroke {
    /// Starts an empty stroke styled from the tool's current settings.
    pub fn new(page: PageKey, tool: Tool, settings: &ToolSettings, timestamp: DateTime<Utc>) -> Self {
        Self {
            page,
            tool,
            points: Vec::new(),
            width: settings.width.max(1),
            color_name: settings.color_name.clone(),
            alpha: settings.alpha,
            timestamp,
        }
    }

    pub fn push(&mut self, point: Point) {
        self.points.push(point);
    }

    pub fn last_point(&self) -> Option<Point> {
        self.points.last().copied()
    }

    /// Axis-aligned bounds covering every stamped pixel of the stroke.
    pub fn bounding_box(&self, aa_padding: i32) -> Option<Rect> {
        util::points_bounds(&self.points, self.width, aa_padding)
    }

    /// True when any point lies within `radius` of `center`.
    pub fn touches(&self, center: Point, radius: u32) -> bool {
        self.points
            .iter()
            .any(|p| util::within_radius(*p, center, radius))
    }
}
