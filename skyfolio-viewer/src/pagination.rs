//! Bounded rendering for long grids.
//!
//! Only the first page is mounted at first; each load-more appends one more
//! page and holds the loading flag for a short delay so a burst of new
//! cells does not all enter the viewport in the same instant.

use std::sync::Arc;
use std::time::Duration;

use crate::config::DisplayConfig;

#[derive(Debug, Clone)]
pub struct PaginatedGrid<T> {
    items: Arc<Vec<T>>,
    page_size: usize,
    visible: usize,
    loading: bool,
    load_more_delay: Duration,
}

impl<T> PaginatedGrid<T> {
    pub fn new(items: Arc<Vec<T>>, config: &DisplayConfig) -> Self {
        let page_size = config.effective_page_size();
        Self {
            visible: page_size.min(items.len()),
            items,
            page_size,
            loading: false,
            load_more_delay: config.load_more_delay(),
        }
    }

    /// Replaces the item list. A list with a different identity (not the
    /// same `Arc`) starts over at the first page; returns whether it did.
    pub fn set_items(&mut self, items: Arc<Vec<T>>) -> bool {
        if Arc::ptr_eq(&self.items, &items) {
            return false;
        }
        self.visible = self.page_size.min(items.len());
        self.items = items;
        self.loading = false;
        true
    }

    pub fn items(&self) -> &Arc<Vec<T>> {
        &self.items
    }

    pub fn visible_items(&self) -> &[T] {
        &self.items[..self.visible]
    }

    pub fn visible_count(&self) -> usize {
        self.visible
    }

    pub fn total_count(&self) -> usize {
        self.items.len()
    }

    pub fn has_more(&self) -> bool {
        self.visible < self.items.len()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Appends the next page and raises the loading flag. Returns the range
    /// of newly visible indices, or `None` while a load is already running or
    /// nothing is left.
    pub fn begin_load_more(&mut self) -> Option<std::ops::Range<usize>> {
        if self.loading || !self.has_more() {
            return None;
        }
        let start = self.visible;
        self.visible = (self.visible + self.page_size).min(self.items.len());
        self.loading = true;
        log::debug!(
            "Grid expanded to {} of {} items",
            self.visible,
            self.items.len()
        );
        Some(start..self.visible)
    }

    pub fn finish_load_more(&mut self) {
        self.loading = false;
    }

    /// [`begin_load_more`](Self::begin_load_more), then the synthetic delay,
    /// then [`finish_load_more`](Self::finish_load_more).
    pub async fn load_more(&mut self) -> Option<std::ops::Range<usize>> {
        let added = self.begin_load_more()?;
        tokio::time::sleep(self.load_more_delay).await;
        self.finish_load_more();
        Some(added)
    }
}
