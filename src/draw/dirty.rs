//! Dirty region tracking for incremental refresh.
//!
//! Collects the union of every rectangle painted since the last refresh.

use super::Point;
use crate::util::{self, Rect};

/// Tracks the accumulated dirty rectangle between refreshes.
#[derive(Debug, Default)]
pub struct DirtyTracker {
    region: Option<Rect>,
    aa_padding: i32,
}

impl DirtyTracker {
    /// Creates an empty tracker that pads segment boxes by `aa_padding` pixels.
    pub fn new(aa_padding: i32) -> Self {
        Self {
            region: None,
            aa_padding: aa_padding.max(0),
        }
    }

    /// Grows the dirty region by `rect`.
    pub fn mark_rect(&mut self, rect: Rect) {
        if !rect.is_valid() {
            return;
        }
        self.region = Some(match self.region {
            Some(current) => current.union(rect),
            None => rect,
        });
    }

    /// Adds a dirty rectangle when present.
    pub fn mark_optional_rect(&mut self, rect: Option<Rect>) {
        if let Some(rect) = rect {
            self.mark_rect(rect);
        }
    }

    /// Adds the box of one drawn segment.
    pub fn mark_segment(&mut self, a: Point, b: Point, width: u32) {
        self.mark_optional_rect(util::segment_bounds(a, b, width, self.aa_padding));
    }

    pub fn is_dirty(&self) -> bool {
        self.region.is_some()
    }

    pub fn peek(&self) -> Option<Rect> {
        self.region
    }

    /// Drains the region, clipped to a `width` x `height` surface.
    pub fn take_region(&mut self, width: i32, height: i32) -> Option<Rect> {
        self.region.take()?.clamp_to_bounds(width, height)
    }

    pub fn clear(&mut self) {
        self.region = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn segments_accumulate_into_one_union() {
        let mut tracker = DirtyTracker::new(2);
        tracker.mark_segment(Point::new(10, 10), Point::new(20, 10), 2);
        tracker.mark_segment(Point::new(20, 10), Point::new(20, 40), 2);

        let rect = tracker.take_region(100, 100).unwrap();
        assert!(rect.contains(10, 10));
        assert!(rect.contains(20, 40));
        assert!(!tracker.is_dirty());
    }

    #[test]
    fn take_region_clips_and_clears() {
        let mut tracker = DirtyTracker::new(0);
        tracker.mark_rect(Rect::new(-10, -10, 30, 30).unwrap());
        assert_eq!(tracker.take_region(15, 15), Some(Rect::new(0, 0, 15, 15).unwrap()));
        assert_eq!(tracker.take_region(15, 15), None);
    }
}
