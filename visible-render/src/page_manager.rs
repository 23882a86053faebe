use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::fenwick::Fenwick;
use crate::{
    BufferRange, LayoutCache, LayoutItem, Page, PageChangeEvent, PageConfig, RenderCollection,
};

/// A callback fired when the visible page changes.
///
/// The second argument is the current page array.
pub type PageChangeListener = Arc<dyn Fn(&PageChangeEvent, &[Page]) + Send + Sync>;

/// Handle returned by [`PageManager::add_page_change_listener`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(u64);

/// Debug colors cycled over page indexes.
pub const PAGE_COLORS: [&str; 3] = ["#f0f0f0", "#e0e0e0", "#d0d0d0"];

/// Partitions the row sequence into contiguous pages and tracks the visible page.
///
/// Pages are closed once their accumulated height reaches `page_height_percent` of the
/// viewport height (150% by default), or at the last row of the partitioned span. Row heights
/// are kept in a prefix-sum tree so `row_top` and offset lookups stay `O(log n)`.
pub struct PageManager {
    config: PageConfig,
    viewport_height: u32,
    heights: Fenwick,
    pages: Vec<Page>,
    visible_page: Option<usize>,
    listeners: Vec<(ListenerId, PageChangeListener)>,
    next_listener_id: u64,
}

impl PageManager {
    pub fn new(viewport_height: u32, config: PageConfig) -> Self {
        Self {
            config,
            viewport_height,
            heights: Fenwick::default(),
            pages: Vec::new(),
            visible_page: None,
            listeners: Vec::new(),
            next_listener_id: 0,
        }
    }

    /// Loads every row height through the layout cache and partitions the whole collection.
    pub fn calculate_pages<C>(
        &mut self,
        collection: &C,
        cache: &mut LayoutCache<<C::Item as LayoutItem>::Key>,
    ) where
        C: RenderCollection,
    {
        let heights = (0..collection.len())
            .map(|i| {
                collection
                    .item(i)
                    .map(|item| cache.resolve(item).height)
                    .unwrap_or(0)
            })
            .collect();
        self.calculate_pages_from_heights(heights);
    }

    /// Same as [`Self::calculate_pages`] for hosts that already know every row height.
    pub fn calculate_pages_from_heights(&mut self, heights: Vec<u32>) {
        self.heights = Fenwick::from_heights(heights);
        self.repartition();
    }

    /// Rebuilds pages over the whole collection from the stored row heights.
    pub fn repartition(&mut self) {
        let count = self.heights.len();
        self.pages = if count == 0 {
            Vec::new()
        } else {
            self.partition(0, count - 1)
        };
        self.visible_page = None;
        rdebug!(
            rows = count,
            pages = self.pages.len(),
            viewport_height = self.viewport_height,
            "calculate_pages"
        );
    }

    /// Replaces the whole page array with pages covering only `start_index..=end_index`.
    ///
    /// Bounds are ordered and clamped to the row count. The visible page is reset because page
    /// indexes no longer mean the same thing.
    pub fn update_pages(&mut self, start_index: usize, end_index: usize) {
        let count = self.heights.len();
        self.visible_page = None;
        if count == 0 {
            self.pages.clear();
            return;
        }
        let last = count - 1;
        let start = start_index.min(end_index).min(last);
        let end = start_index.max(end_index).min(last);
        self.pages = self.partition(start, end);
        rdebug!(start, end, pages = self.pages.len(), "update_pages");
    }

    /// Repartitions a window around `offset`: the landing page plus `margin_pages` page heights
    /// on each side.
    ///
    /// Returns the covered row span, or `None` for an empty collection.
    pub fn update_pages_around(
        &mut self,
        offset: u64,
        margin_pages: usize,
    ) -> Option<(usize, usize)> {
        let page_height = self.page_height().max(1);
        let margin = page_height.saturating_mul(margin_pages as u64);
        let from = offset.saturating_sub(margin);
        let to = offset.saturating_add(page_height).saturating_add(margin);
        let start = self.row_at_offset(from)?;
        let end = self.row_at_offset(to)?;
        self.update_pages(start, end);
        Some((start, end))
    }

    fn partition(&self, start: usize, end: usize) -> Vec<Page> {
        let limit = self.page_height_scaled();
        let mut pages = Vec::new();
        let mut page_start = start;
        let mut top = self.heights.prefix_sum(start);
        let mut cursor = top;
        let mut acc = 0u64;

        for i in start..=end {
            let h = self.heights.get(i).unwrap_or(0) as u64;
            acc = acc.saturating_add(h);
            cursor = cursor.saturating_add(h);
            if acc.saturating_mul(100) >= limit || i == end {
                pages.push(Page {
                    start: page_start,
                    end: i,
                    top,
                    bottom: cursor,
                });
                page_start = i + 1;
                top = cursor;
                acc = 0;
            }
        }
        pages
    }

    // Page height multiplied by 100, to keep the threshold integral.
    fn page_height_scaled(&self) -> u64 {
        self.viewport_height as u64 * self.config.page_height_percent as u64
    }

    /// Target page height in pixels.
    pub fn page_height(&self) -> u64 {
        self.page_height_scaled() / 100
    }

    pub fn viewport_height(&self) -> u32 {
        self.viewport_height
    }

    /// Stores a new viewport height. Call [`Self::repartition`] to apply it.
    pub fn set_viewport_height(&mut self, height: u32) {
        self.viewport_height = height;
    }

    /// Updates a single row height. Returns `true` if it changed.
    ///
    /// Existing pages keep their bounds until the next repartition.
    pub fn set_row_height(&mut self, index: usize, height: u32) -> bool {
        self.heights.set(index, height) != 0
    }

    pub fn row_count(&self) -> usize {
        self.heights.len()
    }

    pub fn row_height(&self, index: usize) -> Option<u32> {
        self.heights.get(index)
    }

    /// Cumulative height of all rows before `index`.
    pub fn row_top(&self, index: usize) -> u64 {
        self.heights.prefix_sum(index)
    }

    /// Row containing `offset`, clamped to the last row.
    pub fn row_at_offset(&self, offset: u64) -> Option<usize> {
        let count = self.heights.len();
        if count == 0 {
            return None;
        }
        Some(self.heights.lower_bound(offset).min(count - 1))
    }

    pub fn total_height(&self) -> u64 {
        self.heights.total()
    }

    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    pub fn page(&self, index: usize) -> Option<&Page> {
        self.pages.get(index)
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Index of the page whose pixel span contains `offset`.
    pub fn page_at_position(&self, offset: u64) -> Option<usize> {
        let i = self.pages.partition_point(|p| p.bottom <= offset);
        self.pages
            .get(i)
            .filter(|p| p.contains_offset(offset))
            .map(|_| i)
    }

    /// Index of the page containing `row`.
    pub fn page_index_for_row(&self, row: usize) -> Option<usize> {
        let i = self.pages.partition_point(|p| p.end < row);
        self.pages
            .get(i)
            .filter(|p| p.contains_row(row))
            .map(|_| i)
    }

    /// Page containing `row`.
    pub fn page_at_index(&self, row: usize) -> Option<&Page> {
        self.page_index_for_row(row).and_then(|i| self.pages.get(i))
    }

    /// The visible page and its direct neighbours, clamped to the page array.
    pub fn buffer_range(&self, visible_page: Option<usize>) -> Option<BufferRange> {
        let visible = visible_page?;
        let last = self.pages.len().checked_sub(1)?;
        let end = visible.saturating_add(1).min(last);
        let start = visible.saturating_sub(1).min(end);
        Some(BufferRange { start, end })
    }

    pub fn visible_page(&self) -> Option<usize> {
        self.visible_page
    }

    /// Recomputes the visible page from `scroll_top`.
    ///
    /// On change, notifies every listener and returns the event. Moving to "no page" updates
    /// the state without emitting anything.
    pub fn update_visible_page(&mut self, scroll_top: u64) -> Option<PageChangeEvent> {
        let next = self.page_at_position(scroll_top);
        if next == self.visible_page {
            return None;
        }
        self.visible_page = next;
        let visible_page = next?;
        let buffer_range = self.buffer_range(next)?;
        let event = PageChangeEvent {
            visible_page,
            buffer_range,
        };
        rtrace!(
            visible_page,
            buffer_start = buffer_range.start,
            buffer_end = buffer_range.end,
            "page change"
        );
        for (_, listener) in &self.listeners {
            listener(&event, &self.pages);
        }
        Some(event)
    }

    /// Debug color of the page containing `row`.
    pub fn page_color(&self, row: usize) -> Option<&'static str> {
        self.page_index_for_row(row)
            .map(|page| PAGE_COLORS[page % PAGE_COLORS.len()])
    }

    pub fn add_page_change_listener(
        &mut self,
        listener: impl Fn(&PageChangeEvent, &[Page]) + Send + Sync + 'static,
    ) -> ListenerId {
        let id = ListenerId(self.next_listener_id);
        self.next_listener_id += 1;
        self.listeners.push((id, Arc::new(listener)));
        id
    }

    /// Returns `true` if a listener was removed.
    pub fn remove_page_change_listener(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn clear_listeners(&mut self) {
        self.listeners.clear();
    }
}

impl core::fmt::Debug for PageManager {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("PageManager")
            .field("config", &self.config)
            .field("viewport_height", &self.viewport_height)
            .field("rows", &self.heights.len())
            .field("pages", &self.pages.len())
            .field("visible_page", &self.visible_page)
            .field("listeners", &self.listeners.len())
            .finish_non_exhaustive()
    }
}
