//! Page-indexed stroke storage with proximity erase.

use super::page::{CanonicalPage, PageKey};
use crate::draw::{Point, Stroke};
use crate::input::Tool;
use chrono::{DateTime, Utc};
use log::{debug, warn};
use std::collections::{BTreeSet, HashMap};

/// Stable handle to a stroke in the store, used by undo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StrokeId(u64);

/// A stroke together with its store handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredStroke {
    pub id: StrokeId,
    pub stroke: Stroke,
}

/// Read-only export record consumed by report formatters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrokeSummary {
    pub page: PageKey,
    pub tool: Tool,
    pub points: Vec<Point>,
    pub width: u32,
    pub timestamp: DateTime<Utc>,
}

/// Owns every finalized stroke of a document.
///
/// Strokes live in one vector in insertion (draw) order. The page index maps
/// each canonical page to the positions of its strokes and always equals the
/// grouping of the vector by [`PageKey::canonical`].
#[derive(Debug)]
pub struct EraseIndex {
    entries: Vec<StoredStroke>,
    index: HashMap<CanonicalPage, BTreeSet<usize>>,
    next_id: u64,
    radius: u32,
    max_strokes: usize,
}

impl EraseIndex {
    /// Creates an empty store erasing within `radius` pixels.
    ///
    /// `max_strokes` caps the number of strokes accepted by [`insert`](Self::insert)
    /// (0 = unlimited).
    pub fn new(radius: u32, max_strokes: usize) -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
            next_id: 0,
            radius,
            max_strokes,
        }
    }

    /// Replaces the contents with `strokes`, e.g. after loading a session.
    ///
    /// Returns how many strokes were left out because of the stroke limit.
    pub fn load(&mut self, strokes: Vec<Stroke>) -> usize {
        self.entries.clear();
        let total = strokes.len();
        for (position, stroke) in strokes.into_iter().enumerate() {
            if stroke.points.is_empty() {
                continue;
            }
            if self.max_strokes > 0 && self.entries.len() >= self.max_strokes {
                let dropped = total - position;
                warn!(
                    "Stroke limit ({}) reached while loading; dropping {} stroke(s)",
                    self.max_strokes, dropped
                );
                self.rebuild_index();
                return dropped;
            }
            let id = self.allocate_id();
            self.entries.push(StoredStroke { id, stroke });
        }
        self.rebuild_index();
        0
    }

    pub fn radius(&self) -> u32 {
        self.radius
    }

    pub fn set_radius(&mut self, radius: u32) {
        self.radius = radius;
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All strokes in draw order.
    pub fn strokes(&self) -> impl Iterator<Item = &Stroke> {
        self.entries.iter().map(|e| &e.stroke)
    }

    pub fn get(&self, id: StrokeId) -> Option<&Stroke> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .map(|e| &e.stroke)
    }

    /// Strokes on `page`, in draw order, found through the page index.
    pub fn on_page<'a>(&'a self, page: &PageKey) -> impl Iterator<Item = &'a Stroke> + 'a {
        self.index
            .get(&page.canonical())
            .into_iter()
            .flat_map(|positions| positions.iter())
            .map(|&pos| &self.entries[pos].stroke)
    }

    /// Number of indexed strokes on `page`.
    pub fn page_count(&self, page: &PageKey) -> usize {
        self.index.get(&page.canonical()).map_or(0, |p| p.len())
    }

    /// Stroke counts per canonical page, sorted by page.
    pub fn page_counts(&self) -> Vec<(CanonicalPage, usize)> {
        let mut counts: Vec<_> = self
            .index
            .iter()
            .map(|(page, positions)| (page.clone(), positions.len()))
            .collect();
        counts.sort();
        counts
    }

    /// Appends a finalized stroke and indexes it.
    ///
    /// Returns `None` (and drops the stroke) when it has no points or the
    /// stroke limit is reached.
    pub fn insert(&mut self, stroke: Stroke) -> Option<StrokeId> {
        if stroke.points.is_empty() {
            debug!("Refusing to store a stroke without points");
            return None;
        }
        if self.max_strokes > 0 && self.entries.len() >= self.max_strokes {
            warn!(
                "Stroke limit ({}) reached; discarding new stroke",
                self.max_strokes
            );
            return None;
        }

        let id = self.allocate_id();
        let position = self.entries.len();
        self.index
            .entry(stroke.page.canonical())
            .or_default()
            .insert(position);
        self.entries.push(StoredStroke { id, stroke });
        Some(id)
    }

    /// Removes one stroke by handle.
    pub fn remove(&mut self, id: StrokeId) -> Option<Stroke> {
        let position = self.entries.iter().position(|e| e.id == id)?;
        let removed = self.entries.remove(position);
        self.rebuild_index();
        Some(removed.stroke)
    }

    /// Re-inserts previously removed strokes, keeping their handles.
    ///
    /// Restored strokes go to the end of the draw order. The stroke limit is
    /// not applied: undo puts back exactly what erase took, so the store may
    /// sit above `max_strokes` until strokes are erased again, and
    /// [`insert`](Self::insert) refuses new strokes meanwhile.
    pub fn restore(&mut self, strokes: Vec<StoredStroke>) -> usize {
        let count = strokes.len();
        for stored in strokes {
            self.next_id = self.next_id.max(stored.id.0 + 1);
            self.entries.push(stored);
        }
        self.rebuild_index();
        count
    }

    /// Removes every stroke on `page` that has a point within the eraser
    /// radius of `(x, y)`.
    ///
    /// Returns the removed strokes, or `None` when nothing qualified (in
    /// which case neither the store nor the index is touched).
    pub fn erase_at(&mut self, x: i32, y: i32, page: &PageKey) -> Option<Vec<StoredStroke>> {
        let target = page.canonical();
        let center = Point::new(x, y);
        let radius = self.radius;

        let hits: Vec<usize> = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.stroke.page.canonical() == target && e.stroke.touches(center, radius))
            .map(|(pos, _)| pos)
            .collect();

        self.remove_positions(hits)
    }

    /// Removes every stroke on `page`.
    pub fn remove_page(&mut self, page: &PageKey) -> Option<Vec<StoredStroke>> {
        let positions = self
            .index
            .get(&page.canonical())
            .map(|p| p.iter().copied().collect())
            .unwrap_or_default();
        self.remove_positions(positions)
    }

    /// Removes every stroke.
    pub fn remove_all(&mut self) -> Option<Vec<StoredStroke>> {
        if self.entries.is_empty() {
            return None;
        }
        let removed = std::mem::take(&mut self.entries);
        self.rebuild_index();
        Some(removed)
    }

    /// Export view in draw order.
    pub fn snapshot(&self) -> Vec<StrokeSummary> {
        self.entries
            .iter()
            .map(|e| StrokeSummary {
                page: e.stroke.page.clone(),
                tool: e.stroke.tool,
                points: e.stroke.points.clone(),
                width: e.stroke.width,
                timestamp: e.stroke.timestamp,
            })
            .collect()
    }

    fn remove_positions(&mut self, mut positions: Vec<usize>) -> Option<Vec<StoredStroke>> {
        if positions.is_empty() {
            return None;
        }
        // Highest first so earlier positions stay valid.
        positions.sort_unstable_by(|a, b| b.cmp(a));
        positions.dedup();
        let mut removed: Vec<StoredStroke> = positions
            .into_iter()
            .map(|pos| self.entries.remove(pos))
            .collect();
        removed.reverse();
        self.rebuild_index();
        Some(removed)
    }

    fn rebuild_index(&mut self) {
        self.index.clear();
        for (pos, entry) in self.entries.iter().enumerate() {
            self.index
                .entry(entry.stroke.page.canonical())
                .or_default()
                .insert(pos);
        }
    }

    fn allocate_id(&mut self) -> StrokeId {
        let id = StrokeId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Checks the page index against a fresh grouping of the store.
    #[cfg(test)]
    pub(crate) fn index_is_consistent(&self) -> bool {
        let mut expected: HashMap<CanonicalPage, BTreeSet<usize>> = HashMap::new();
        for (pos, entry) in self.entries.iter().enumerate() {
            expected
                .entry(entry.stroke.page.canonical())
                .or_default()
                .insert(pos);
        }
        expected == self.index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::ToolSettings;

    fn dot(page: PageKey, x: i32, y: i32) -> Stroke {
        let mut stroke = Stroke::new(
            page,
            Tool::Pen,
            &ToolSettings {
                width: 3,
                color_name: "black".into(),
                alpha: 255,
            },
            Utc::now(),
        );
        stroke.push(Point::new(x, y));
        stroke
    }

    #[test]
    fn erase_removes_only_the_queried_page() {
        // Three single-point strokes at the same spot on pages 1, 2, 3.
        let mut store = EraseIndex::new(20, 0);
        for page in 1..=3 {
            store.insert(dot(PageKey::from(page), 100, 100));
        }

        let removed = store.erase_at(100, 100, &PageKey::from(2)).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].stroke.page, PageKey::from(2));
        assert_eq!(store.page_count(&PageKey::from(1)), 1);
        assert_eq!(store.page_count(&PageKey::from(2)), 0);
        assert_eq!(store.page_count(&PageKey::from(3)), 1);
        assert!(store.index_is_consistent());
    }

    #[test]
    fn erase_matches_string_and_number_page_keys() {
        let mut store = EraseIndex::new(20, 0);
        store.insert(dot(PageKey::from("5"), 100, 100));
        store.insert(dot(PageKey::from(10), 100, 100));

        let removed = store.erase_at(100, 100, &PageKey::from("5")).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].stroke.page, PageKey::from("5"));
        assert_eq!(store.len(), 1);

        let mut reloaded = EraseIndex::new(20, 0);
        reloaded.load(vec![
            dot(PageKey::from("5"), 100, 100),
            dot(PageKey::from("10"), 100, 100),
        ]);
        let removed = reloaded.erase_at(100, 100, &PageKey::from(5)).unwrap();
        assert_eq!(removed.len(), 1);
        assert_eq!(removed[0].stroke.page, PageKey::from("5"));
        assert_eq!(reloaded.page_count(&PageKey::from(10)), 1);
        assert!(reloaded.index_is_consistent());
    }

    #[test]
    fn erase_radius_boundary() {
        let mut store = EraseIndex::new(20, 0);
        store.insert(dot(PageKey::from(1), 100, 100));

        assert!(store.erase_at(125, 100, &PageKey::from(1)).is_none());
        assert_eq!(store.len(), 1);

        assert!(store.erase_at(115, 100, &PageKey::from(1)).is_some());
        assert!(store.is_empty());
    }

    #[test]
    fn erase_miss_leaves_store_untouched() {
        let mut store = EraseIndex::new(20, 0);
        store.insert(dot(PageKey::from(1), 10, 10));
        store.insert(dot(PageKey::from(1), 300, 300));
        let before = store.snapshot();

        assert!(store.erase_at(150, 150, &PageKey::from(1)).is_none());
        assert_eq!(store.snapshot(), before);
        assert_eq!(store.page_count(&PageKey::from(1)), 2);
    }

    #[test]
    fn erase_removes_every_qualifying_stroke_in_one_call() {
        let mut store = EraseIndex::new(20, 0);
        store.insert(dot(PageKey::from(1), 100, 100));
        store.insert(dot(PageKey::from(1), 500, 500));
        store.insert(dot(PageKey::from(1), 105, 100));
        store.insert(dot(PageKey::from(1), 95, 110));

        let removed = store.erase_at(100, 100, &PageKey::from(1)).unwrap();
        assert_eq!(removed.len(), 3);
        assert_eq!(store.len(), 1);
        assert_eq!(store.strokes().next().unwrap().points[0], Point::new(500, 500));
        assert!(store.index_is_consistent());
    }

    #[test]
    fn insert_rejects_empty_strokes_and_respects_limit() {
        let mut store = EraseIndex::new(20, 2);
        let mut empty = dot(PageKey::from(1), 0, 0);
        empty.points.clear();
        assert!(store.insert(empty).is_none());

        assert!(store.insert(dot(PageKey::from(1), 0, 0)).is_some());
        assert!(store.insert(dot(PageKey::from(1), 1, 1)).is_some());
        assert!(store.insert(dot(PageKey::from(1), 2, 2)).is_none());
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn restore_keeps_handles_and_index() {
        let mut store = EraseIndex::new(20, 0);
        let id = store.insert(dot(PageKey::from(4), 50, 50)).unwrap();
        store.insert(dot(PageKey::from(4), 400, 400));

        let removed = store.remove_page(&PageKey::from(4)).unwrap();
        assert_eq!(removed.len(), 2);
        assert!(store.is_empty());

        assert_eq!(store.restore(removed), 2);
        assert!(store.get(id).is_some());
        assert_eq!(store.page_count(&PageKey::from("4")), 2);
        assert!(store.index_is_consistent());

        let fresh = store.insert(dot(PageKey::from(4), 0, 0)).unwrap();
        assert_ne!(fresh, id);
    }

    #[test]
    fn restore_may_exceed_limit_and_blocks_inserts_until_erased() {
        let mut store = EraseIndex::new(20, 2);
        store.insert(dot(PageKey::from(1), 10, 10));
        store.insert(dot(PageKey::from(1), 300, 300));

        let removed = store.erase_at(10, 10, &PageKey::from(1)).unwrap();
        assert!(store.insert(dot(PageKey::from(1), 600, 600)).is_some());
        assert_eq!(store.restore(removed), 1);
        assert_eq!(store.len(), 3);
        assert!(store.index_is_consistent());

        assert!(store.insert(dot(PageKey::from(1), 900, 900)).is_none());
        assert_eq!(store.len(), 3);

        store.erase_at(300, 300, &PageKey::from(1)).unwrap();
        store.erase_at(600, 600, &PageKey::from(1)).unwrap();
        assert!(store.insert(dot(PageKey::from(1), 900, 900)).is_some());
    }

    #[test]
    fn load_reports_strokes_dropped_at_the_limit() {
        let mut store = EraseIndex::new(20, 2);
        let dropped = store.load((0..5).map(|i| dot(PageKey::from(1), i * 50, 0)).collect());
        assert_eq!(dropped, 3);
        assert_eq!(store.len(), 2);
        assert!(store.index_is_consistent());

        let mut unlimited = EraseIndex::new(20, 0);
        assert_eq!(unlimited.load(vec![dot(PageKey::from(1), 0, 0)]), 0);
    }

    #[test]
    fn on_page_yields_draw_order() {
        let mut store = EraseIndex::new(20, 0);
        store.insert(dot(PageKey::from(1), 1, 1));
        store.insert(dot(PageKey::from(2), 2, 2));
        store.insert(dot(PageKey::from("1"), 3, 3));

        let xs: Vec<i32> = store
            .on_page(&PageKey::from(1))
            .map(|s| s.points[0].x)
            .collect();
        assert_eq!(xs, vec![1, 3]);
        assert_eq!(
            store.page_counts(),
            vec![
                (PageKey::from(1).canonical(), 2),
                (PageKey::from(2).canonical(), 1)
            ]
        );
    }
}
