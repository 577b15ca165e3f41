//! Geometry helpers shared by erase, rendering, and dirty-region tracking.
//!
//! Everything here is pure integer math on logical-screen coordinates. Distance
//! checks compare squared lengths so hot paths never take a square root.

use crate::draw::Point;

// ============================================================================
// Rectangles
// ============================================================================

/// Axis-aligned rectangle helper used for dirty region tracking.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    /// Creates a new rectangle. Width/height must be positive.
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Option<Self> {
        if width <= 0 || height <= 0 {
            None
        } else {
            Some(Self {
                x,
                y,
                width,
                height,
            })
        }
    }

    /// Builds a rectangle from min/max bounds (inclusive min, exclusive max).
    pub fn from_min_max(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Option<Self> {
        let width = max_x - min_x;
        let height = max_y - min_y;
        Self::new(min_x, min_y, width, height)
    }

    /// Square of side `size` centered on `(cx, cy)`.
    ///
    /// Even sizes lean towards the top-left, so a 4px square at (10, 10)
    /// covers 8..12 on both axes.
    pub fn centered_square(cx: i32, cy: i32, size: i32) -> Option<Self> {
        let half = size / 2;
        Self::new(cx - half, cy - half, size, size)
    }

    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Expands this rectangle to include another rectangle.
    pub fn expand_to_include(&mut self, other: Rect) {
        let min_x = self.x.min(other.x);
        let min_y = self.y.min(other.y);
        let max_x = self.right().max(other.right());
        let max_y = self.bottom().max(other.bottom());

        self.x = min_x;
        self.y = min_y;
        self.width = max_x - min_x;
        self.height = max_y - min_y;
    }

    /// Returns a rectangle that covers both input rectangles.
    pub fn union(self, other: Rect) -> Rect {
        let mut rect = self;
        rect.expand_to_include(other);
        rect
    }

    /// Expands the rectangle evenly in all directions by `amount`.
    pub fn inflate(&mut self, amount: i32) {
        self.x -= amount;
        self.y -= amount;
        self.width += amount * 2;
        self.height += amount * 2;
    }

    /// Clamps the rectangle to `[0, width) x [0, height)`.
    ///
    /// Returns `None` when nothing of the rectangle is left on screen.
    pub fn clamp_to_bounds(self, width: i32, height: i32) -> Option<Rect> {
        let max_x = self.right().clamp(0, width);
        let max_y = self.bottom().clamp(0, height);
        let x = self.x.clamp(0, width);
        let y = self.y.clamp(0, height);
        Rect::from_min_max(x, y, max_x, max_y)
    }

    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Returns true if rectangle has a positive area.
    pub fn is_valid(&self) -> bool {
        self.width > 0 && self.height > 0
    }
}

// ============================================================================
// Distances
// ============================================================================

/// Squared Euclidean distance between two points, widened to avoid overflow.
pub fn distance_sq(a: Point, b: Point) -> i64 {
    let dx = (a.x - b.x) as i64;
    let dy = (a.y - b.y) as i64;
    dx * dx + dy * dy
}

/// True when `p` lies within `radius` of `center` (boundary inclusive).
pub fn within_radius(p: Point, center: Point, radius: u32) -> bool {
    let r = radius as i64;
    distance_sq(p, center) <= r * r
}

/// Euclidean distance, only used where the step count of a line is needed.
pub fn distance(a: Point, b: Point) -> f64 {
    (distance_sq(a, b) as f64).sqrt()
}

// ============================================================================
// Bounds
// ============================================================================

fn stroke_padding(width: u32) -> i32 {
    let padding = (width as f64 / 2.0).ceil() as i32;
    padding.max(1)
}

/// Bounding box of one segment, expanded by half the line width plus `aa_padding`.
pub fn segment_bounds(a: Point, b: Point, width: u32, aa_padding: i32) -> Option<Rect> {
    let padding = stroke_padding(width) + aa_padding.max(0);
    Rect::from_min_max(
        a.x.min(b.x) - padding,
        a.y.min(b.y) - padding,
        a.x.max(b.x) + padding + 1,
        a.y.max(b.y) + padding + 1,
    )
}

/// Bounding box of a whole point sequence, expanded the same way as a segment.
pub fn points_bounds(points: &[Point], width: u32, aa_padding: i32) -> Option<Rect> {
    let first = *points.first()?;
    let mut min_x = first.x;
    let mut max_x = first.x;
    let mut min_y = first.y;
    let mut max_y = first.y;

    for p in &points[1..] {
        min_x = min_x.min(p.x);
        max_x = max_x.max(p.x);
        min_y = min_y.min(p.y);
        max_y = max_y.max(p.y);
    }

    let padding = stroke_padding(width) + aa_padding.max(0);
    Rect::from_min_max(
        min_x - padding,
        min_y - padding,
        max_x + padding + 1,
        max_y + padding + 1,
    )
}
