//! Viewport tracking over laid-out cell rectangles.
//!
//! A tracked key fires once, on the first update where its rectangle
//! overlaps the viewport, and is detached in the same step. Scrolling it back
//! out and in again never fires a second time.

use std::collections::BTreeMap;
use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// True when the two rectangles share a region of non-zero area.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Column grid geometry for gallery cells
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLayout {
    pub columns: usize,
    pub cell_width: f32,
    pub cell_height: f32,
    pub spacing: f32,
}

impl GridLayout {
    pub fn new(columns: usize, cell_width: f32, cell_height: f32, spacing: f32) -> Self {
        Self {
            columns: columns.max(1),
            cell_width,
            cell_height,
            spacing,
        }
    }

    /// Fits as many columns of at least `min_cell_width` as the viewport
    /// allows, then stretches cells to fill the row.
    pub fn for_width(viewport_width: f32, min_cell_width: f32, cell_height: f32, spacing: f32) -> Self {
        let columns = ((viewport_width + spacing) / (min_cell_width + spacing)).floor() as usize;
        let columns = columns.max(1);
        let cell_width = ((viewport_width - (columns - 1) as f32 * spacing) / columns as f32)
            .max(min_cell_width.min(viewport_width));
        Self::new(columns, cell_width, cell_height, spacing)
    }

    pub fn cell_rect(&self, index: usize) -> Rect {
        let row = index / self.columns;
        let col = index % self.columns;
        Rect::new(
            col as f32 * (self.cell_width + self.spacing),
            row as f32 * (self.cell_height + self.spacing),
            self.cell_width,
            self.cell_height,
        )
    }

    pub fn content_height(&self, count: usize) -> f32 {
        if count == 0 {
            return 0.0;
        }
        let rows = count.div_ceil(self.columns);
        rows as f32 * self.cell_height + (rows - 1) as f32 * self.spacing
    }

    /// Indices whose rows overlap the vertical band `[top, top + height)`.
    pub fn visible_range(&self, top: f32, height: f32, count: usize) -> Range<usize> {
        if count == 0 || height <= 0.0 {
            return 0..0;
        }
        let row_stride = self.cell_height + self.spacing;
        let first_row = (top.max(0.0) / row_stride).floor() as usize;
        let last_row = ((top + height) / row_stride).ceil() as usize;
        let start = (first_row * self.columns).min(count);
        let end = (last_row * self.columns).min(count);
        start..end
    }
}

/// Edge-triggered, one-shot visibility subscriptions keyed by `K`.
#[derive(Debug, Clone)]
pub struct ViewportTracker<K: Ord> {
    observed: BTreeMap<K, Rect>,
}

impl<K: Ord> Default for ViewportTracker<K> {
    fn default() -> Self {
        Self {
            observed: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Clone> ViewportTracker<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts watching `key`, or moves its rectangle after a relayout.
    pub fn observe(&mut self, key: K, rect: Rect) {
        self.observed.insert(key, rect);
    }

    /// Stops watching without firing, e.g. on unmount.
    pub fn unobserve(&mut self, key: &K) -> bool {
        self.observed.remove(key).is_some()
    }

    pub fn is_observing(&self, key: &K) -> bool {
        self.observed.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.observed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observed.is_empty()
    }

    /// Returns every key that entered `viewport` and detaches it.
    pub fn update(&mut self, viewport: Rect) -> Vec<K> {
        let entered: Vec<K> = self
            .observed
            .iter()
            .filter(|(_, rect)| rect.intersects(&viewport))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &entered {
            self.observed.remove(key);
        }
        entered
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn touching_edges_do_not_intersect() {
        let a = Rect::new(0.0, 0.0, 10.0, 10.0);
        assert!(!a.intersects(&Rect::new(10.0, 0.0, 10.0, 10.0)));
        assert!(a.intersects(&Rect::new(9.0, 9.0, 10.0, 10.0)));
    }

    #[test]
    fn layout_places_cells_in_rows() {
        let layout = GridLayout::new(3, 100.0, 80.0, 10.0);
        assert_eq!(layout.cell_rect(0), Rect::new(0.0, 0.0, 100.0, 80.0));
        assert_eq!(layout.cell_rect(4), Rect::new(110.0, 90.0, 100.0, 80.0));
        assert_eq!(layout.content_height(7), 3.0 * 80.0 + 2.0 * 10.0);
        assert_eq!(layout.visible_range(0.0, 100.0, 7), 0..6);
    }

    #[test]
    fn for_width_never_yields_zero_columns() {
        let layout = GridLayout::for_width(50.0, 200.0, 200.0, 30.0);
        assert_eq!(layout.columns, 1);
        let layout = GridLayout::for_width(880.0, 200.0, 200.0, 30.0);
        assert_eq!(layout.columns, 3);
    }

    #[test]
    fn fires_once_per_key() {
        let layout = GridLayout::new(2, 100.0, 100.0, 0.0);
        let mut tracker = ViewportTracker::new();
        for index in 0..6usize {
            tracker.observe(index, layout.cell_rect(index));
        }

        let first = Rect::new(0.0, 0.0, 200.0, 150.0);
        assert_eq!(tracker.update(first), vec![0, 1, 2, 3]);
        // Still inside: no repeat.
        assert!(tracker.update(first).is_empty());

        let scrolled = Rect::new(0.0, 150.0, 200.0, 150.0);
        assert_eq!(tracker.update(scrolled), vec![4, 5]);

        // Back to the top: everything already fired.
        assert!(tracker.update(first).is_empty());
        assert!(tracker.is_empty());
    }

    #[test]
    fn unobserved_keys_never_fire() {
        let mut tracker = ViewportTracker::new();
        tracker.observe("a", Rect::new(0.0, 0.0, 10.0, 10.0));
        assert!(tracker.unobserve(&"a"));
        assert!(tracker.update(Rect::new(0.0, 0.0, 100.0, 100.0)).is_empty());
    }
}
