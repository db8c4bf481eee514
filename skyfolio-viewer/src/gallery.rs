//! The portfolio grid: a filtered, paginated list of media records with one
//! staged loader per mounted cell.

use std::collections::{HashMap, HashSet};
use std::ops::Range;
use std::sync::Arc;

use skyfolio_model::{MediaId, MediaRecord, MediaType};

use crate::config::DisplayConfig;
use crate::display::{DisplayEvent, Effect, ProgressiveImage, RenderFrame};
use crate::pagination::PaginatedGrid;
use crate::visibility::{GridLayout, Rect, ViewportTracker};

#[derive(Debug)]
pub struct Gallery {
    config: DisplayConfig,
    records: Vec<MediaRecord>,
    filter: Option<MediaType>,
    grid: PaginatedGrid<MediaRecord>,
    layout: GridLayout,
    cells: HashMap<MediaId, ProgressiveImage>,
    tracker: ViewportTracker<MediaId>,
}

impl Gallery {
    pub fn new(records: Vec<MediaRecord>, layout: GridLayout, config: DisplayConfig) -> Self {
        let grid = PaginatedGrid::new(Arc::new(records.clone()), &config);
        let mut gallery = Self {
            config,
            records,
            filter: None,
            grid,
            layout,
            cells: HashMap::new(),
            tracker: ViewportTracker::new(),
        };
        gallery.sync_cells();
        gallery
    }

    pub fn set_records(&mut self, records: Vec<MediaRecord>) {
        self.records = records;
        self.refilter();
    }

    /// `None` shows every media type. Changing the filter starts over at
    /// the first page.
    pub fn set_filter(&mut self, filter: Option<MediaType>) {
        if self.filter == filter {
            return;
        }
        self.filter = filter;
        self.refilter();
    }

    pub fn filter(&self) -> Option<MediaType> {
        self.filter
    }

    pub fn set_layout(&mut self, layout: GridLayout) {
        self.layout = layout;
        self.sync_cells();
    }

    fn refilter(&mut self) {
        let filtered: Vec<MediaRecord> = self
            .records
            .iter()
            .filter(|record| self.filter.is_none_or(|media_type| record.media_type == media_type))
            .cloned()
            .collect();
        self.grid.set_items(Arc::new(filtered));
        self.sync_cells();
    }

    /// Mounts a cell for every visible record, unmounts the rest and keeps
    /// pending observers in step with the layout.
    fn sync_cells(&mut self) {
        let visible: HashSet<MediaId> = self
            .grid
            .visible_items()
            .iter()
            .map(|record| record.id)
            .collect();

        let stale: Vec<MediaId> = self
            .cells
            .keys()
            .filter(|id| !visible.contains(*id))
            .copied()
            .collect();
        for id in stale {
            if let Some(mut cell) = self.cells.remove(&id) {
                cell.handle(DisplayEvent::Unmounted);
            }
            self.tracker.unobserve(&id);
        }

        for (index, record) in self.grid.visible_items().iter().enumerate() {
            let rect = self.layout.cell_rect(index);
            if self.cells.contains_key(&record.id) {
                if self.tracker.is_observing(&record.id) {
                    self.tracker.observe(record.id, rect);
                }
                continue;
            }

            let mut cell = ProgressiveImage::for_record(record, &self.config);
            if let Some(Effect::Observe) = cell.observe() {
                self.tracker.observe(record.id, rect);
            }
            self.cells.insert(record.id, cell);
        }
    }

    pub fn visible_records(&self) -> &[MediaRecord] {
        self.grid.visible_items()
    }

    pub fn total_count(&self) -> usize {
        self.grid.total_count()
    }

    pub fn show_load_more(&self) -> bool {
        self.grid.has_more()
    }

    pub fn is_loading(&self) -> bool {
        self.grid.is_loading()
    }

    pub fn content_height(&self) -> f32 {
        self.layout.content_height(self.grid.visible_count())
    }

    /// Mounts the next page right away and clears the loading flag after
    /// the configured delay.
    pub async fn load_more(&mut self) -> Option<Range<usize>> {
        let added = self.grid.begin_load_more()?;
        self.sync_cells();
        tokio::time::sleep(self.config.load_more_delay()).await;
        self.grid.finish_load_more();
        Some(added)
    }

    /// Reports the viewport to every pending observer and starts loading
    /// the cells that just became visible.
    pub fn update_viewport(&mut self, viewport: Rect) -> Vec<(MediaId, Effect)> {
        self.tracker
            .update(viewport)
            .into_iter()
            .filter_map(|id| {
                let effect = self.cells.get_mut(&id)?.handle(DisplayEvent::EnteredViewport)?;
                Some((id, effect))
            })
            .collect()
    }

    /// Routes an event to a mounted cell; events for unmounted cells are
    /// dropped.
    pub fn handle(&mut self, id: MediaId, event: DisplayEvent) -> Option<Effect> {
        self.cells.get_mut(&id)?.handle(event)
    }

    pub fn cell(&self, id: &MediaId) -> Option<&ProgressiveImage> {
        self.cells.get(id)
    }

    pub fn frame(&self, id: &MediaId) -> Option<RenderFrame> {
        self.cells.get(id).map(ProgressiveImage::frame)
    }

    pub fn mounted_count(&self) -> usize {
        self.cells.len()
    }
}
