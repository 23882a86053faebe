use alloc::boxed::Box;
use alloc::vec::Vec;

use crate::observer_manager::row_position;
use crate::{
    DataSource, Error, InstrumentationSink, IntersectionEntry, LayoutCache, LayoutItem,
    LayoutRect, ListenerId, MetricsUpdate, ObserverManager, Page, PageChangeEvent, PageManager,
    PerformanceData, RangeManager, RenderCollection, Renderer, Result, ScrollKind, ScrollManager,
    Viewport, VisibilityObserver, VisibleRenderOptions,
};

type KeyOf<C> = <<C as RenderCollection>::Item as LayoutItem>::Key;

/// Wires layout, paging, scrolling and visibility observation together.
///
/// This type holds no UI objects and no clock. The host drives it:
/// - `on_scroll(scroll_top, now_ms)` for every scroll tick
/// - `tick(now_ms)` on a timer or frame callback, to fire the debounced settle
/// - `on_row_intersections` / `on_container_intersection` with visibility batches
/// - `on_frame` / `record_memory` when instrumentation is attached
///
/// After [`Self::destroy`] every entry point is a no-op.
pub struct VisibleRender<C, R, O>
where
    C: RenderCollection,
{
    collection: C,
    renderer: R,
    observer: O,
    options: VisibleRenderOptions<C::Item>,
    layout: LayoutCache<KeyOf<C>>,
    pages: PageManager,
    scroll: ScrollManager,
    observers: ObserverManager,
    ranges: RangeManager,
    sink: Option<Box<dyn InstrumentationSink>>,
    viewport: Viewport,
    scroll_started_ms: Option<u64>,
    destroyed: bool,
}

impl<C, R, O> VisibleRender<C, R, O>
where
    C: RenderCollection,
    R: Renderer,
    O: VisibilityObserver<R::Element>,
{
    /// Partitions the collection, subscribes the container and observes the initial buffer.
    pub fn new(
        collection: C,
        mut renderer: R,
        observer: O,
        viewport: Viewport,
        options: VisibleRenderOptions<C::Item>,
    ) -> Self {
        let mut layout = LayoutCache::new();
        let mut pages = PageManager::new(viewport.height, options.pages);
        pages.calculate_pages(&collection, &mut layout);
        renderer.initialize(pages.total_height());
        rdebug!(
            rows = collection.len(),
            pages = pages.page_count(),
            viewport_height = viewport.height,
            "VisibleRender::new"
        );

        let scroll = ScrollManager::new(options.scroll).with_initial_offset(viewport.scroll_top);
        let mut v = Self {
            collection,
            renderer,
            observer,
            options,
            layout,
            pages,
            scroll,
            observers: ObserverManager::new(),
            ranges: RangeManager::new(),
            sink: None,
            viewport,
            scroll_started_ms: None,
            destroyed: false,
        };
        v.observers.attach::<R::Element, O>(&mut v.observer);
        v.refresh_visible_page();
        v
    }

    /// Attaches an instrumentation sink and hands it the configured thresholds.
    pub fn with_instrumentation(mut self, sink: impl InstrumentationSink + 'static) -> Self {
        self.set_instrumentation(Some(Box::new(sink)));
        self
    }

    pub fn set_instrumentation(&mut self, sink: Option<Box<dyn InstrumentationSink>>) {
        self.sink = sink.map(|mut s| {
            s.set_thresholds(self.options.performance_thresholds);
            s
        });
    }

    /// Handles a scroll tick from the host viewport.
    ///
    /// Long jumps repartition and refresh the visible page at once. With fast scroll enabled,
    /// quick successive ticks refresh immediately as well; everything else waits for settle.
    pub fn on_scroll(&mut self, scroll_top: u64, now_ms: u64) -> Option<ScrollKind> {
        if self.destroyed {
            return None;
        }
        self.viewport.scroll_top = scroll_top;
        self.scroll_started_ms.get_or_insert(now_ms);

        // Every tick counts as a speed check, long jumps included.
        let is_quick =
            self.options.enable_fast_scroll && self.scroll.check_scroll_speed(now_ms).is_quick;
        let kind = self
            .scroll
            .handle_scroll(scroll_top, now_ms, &mut self.pages);
        if is_quick || matches!(kind, ScrollKind::LongJump { .. }) {
            self.refresh_visible_page();
        }
        Some(kind)
    }

    /// Fires the debounced settle once its deadline passed. Returns `true` when it fired.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        if self.destroyed {
            return false;
        }
        let last_tick_ms = self.scroll.last_scroll_ms();
        if !self.scroll.tick(now_ms) {
            return false;
        }
        self.refresh_visible_page();
        self.report_metrics(now_ms, last_tick_ms);
        self.scroll_started_ms = None;
        true
    }

    /// Forwards a frame tick to the instrumentation sink.
    pub fn on_frame(&mut self, now_ms: u64) {
        if self.destroyed || !self.options.enable_performance_monitor {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.record_frame(now_ms);
        }
    }

    /// Forwards a memory sample to the instrumentation sink.
    pub fn record_memory(&mut self, used_bytes: u64, now_ms: u64) {
        if self.destroyed || !self.options.enable_performance_monitor {
            return;
        }
        if let Some(sink) = self.sink.as_mut() {
            sink.record_memory(used_bytes, now_ms);
        }
    }

    pub fn on_row_intersections(&mut self, entries: &[IntersectionEntry]) {
        if self.destroyed {
            return;
        }
        self.observers.handle_intersections(
            entries,
            self.viewport.scroll_top,
            &self.pages,
            &self.ranges,
            &mut self.renderer,
        );
    }

    pub fn on_container_intersection(&mut self, is_intersecting: bool) {
        if self.destroyed {
            return;
        }
        self.observers.handle_container_intersection(
            is_intersecting,
            &self.pages,
            &self.ranges,
            &mut self.renderer,
            &mut self.observer,
        );
    }

    /// Repartitions for a new viewport height.
    pub fn set_viewport_height(&mut self, height: u32) {
        if self.destroyed || self.viewport.height == height {
            return;
        }
        self.viewport.height = height;
        self.pages.set_viewport_height(height);
        self.pages.repartition();
        self.refresh_visible_page();
    }

    /// Recomputes the visible page and moves observation to its buffer range.
    ///
    /// If the scroll position is outside every page (after an earlier bounded repartition),
    /// pages are first rebuilt around it.
    pub fn refresh_visible_page(&mut self) -> Option<PageChangeEvent> {
        if self.destroyed {
            return None;
        }
        let top = self.viewport.scroll_top;
        if self.pages.page_at_position(top).is_none() && top < self.pages.total_height() {
            self.pages
                .update_pages_around(top, self.options.scroll.repartition_page_margin);
        }
        let event = self.pages.update_visible_page(top)?;
        self.observers.handle_page_change(
            &event,
            &self.pages,
            &self.ranges,
            &mut self.renderer,
            &mut self.observer,
        );
        Some(event)
    }

    /// Pins rows `start..=end` under `key`: they are rendered now and never cleared by
    /// visibility changes while pinned.
    pub fn pin_rows(&mut self, key: &str, start: usize, end: usize) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        self.ranges
            .set_range(key, row_position(start), row_position(end))?;
        let Some(last) = self.collection.len().checked_sub(1) else {
            return Ok(());
        };
        for row in start..=end.min(last) {
            self.observers
                .force_render(row, &self.pages, &mut self.renderer);
        }
        Ok(())
    }

    /// Unpins rows `start..=end` under `key`. Rows no longer pinned and not observed are
    /// cleared.
    pub fn unpin_rows(&mut self, key: &str, start: usize, end: usize) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        self.ranges
            .remove_range_in_region(key, row_position(start), row_position(end))?;
        let Some(last) = self.collection.len().checked_sub(1) else {
            return Ok(());
        };
        for row in start..=end.min(last) {
            self.observers
                .release_unobserved(row, &self.ranges, &mut self.renderer);
        }
        Ok(())
    }

    /// Reads a materialized row's height from the renderer into the measured cache.
    ///
    /// Returns `true` when the height changed and pages were rebuilt.
    pub fn measure_row(&mut self, index: usize) -> Result<bool> {
        self.measure_rows(core::iter::once(index))
    }

    /// Batch form of [`Self::measure_row`]; pages are rebuilt at most once.
    ///
    /// Every index is checked before anything is written, so an out-of-bounds index leaves the
    /// cache and the pages untouched.
    pub fn measure_rows(&mut self, indexes: impl IntoIterator<Item = usize>) -> Result<bool> {
        if self.destroyed {
            return Ok(false);
        }
        let count = self.collection.len();
        let measured = indexes
            .into_iter()
            .map(|index| {
                if index < count {
                    Ok((index, self.renderer.item_height(index)))
                } else {
                    Err(Error::OutOfBounds { index, count })
                }
            })
            .collect::<Result<Vec<_>>>()?;

        let mut changed = false;
        for (index, height) in measured {
            if let Some(item) = self.collection.item(index) {
                self.layout.set_real(item, LayoutRect::new(height));
            }
            changed |= self.pages.set_row_height(index, height);
        }
        if changed {
            self.pages.repartition();
            self.refresh_visible_page();
        }
        Ok(changed)
    }

    /// Stops all observation, drops the pending settle and shuts the sink down.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.observers
            .detach(&self.ranges, &mut self.renderer, &mut self.observer);
        self.scroll.cancel();
        self.pages.clear_listeners();
        if let Some(sink) = self.sink.as_mut() {
            sink.shutdown();
        }
        self.scroll_started_ms = None;
        self.destroyed = true;
        rdebug!("VisibleRender::destroy");
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    pub fn performance_data(&self) -> PerformanceData {
        let sink = self.sink.as_deref();
        PerformanceData {
            fps: sink.map_or(0, |s| s.fps()),
            observer_count: self.observers.observer_count(),
            rendered_rows: self.observers.rendered_count(),
            memory_usage: sink.and_then(|s| s.memory_usage()),
        }
    }

    pub fn add_page_change_listener(
        &mut self,
        listener: impl Fn(&PageChangeEvent, &[Page]) + Send + Sync + 'static,
    ) -> ListenerId {
        self.pages.add_page_change_listener(listener)
    }

    pub fn remove_page_change_listener(&mut self, id: ListenerId) -> bool {
        self.pages.remove_page_change_listener(id)
    }

    pub fn collection(&self) -> &C {
        &self.collection
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    pub fn observer(&self) -> &O {
        &self.observer
    }

    pub fn pages(&self) -> &PageManager {
        &self.pages
    }

    pub fn scroll(&self) -> &ScrollManager {
        &self.scroll
    }

    pub fn observers(&self) -> &ObserverManager {
        &self.observers
    }

    pub fn ranges(&self) -> &RangeManager {
        &self.ranges
    }

    pub fn layout_cache(&self) -> &LayoutCache<KeyOf<C>> {
        &self.layout
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn options(&self) -> &VisibleRenderOptions<C::Item> {
        &self.options
    }

    fn report_metrics(&mut self, now_ms: u64, last_tick_ms: Option<u64>) {
        if !self.options.enable_performance_monitor {
            return;
        }
        let Some(sink) = self.sink.as_mut() else {
            return;
        };
        let settle_delay = self.options.scroll.settle_delay_ms;
        // Lag between the settle deadline and the tick that observed it.
        let render_time_ms = last_tick_ms.map_or(0, |t| {
            now_ms.saturating_sub(t.saturating_add(settle_delay))
        });
        let update = MetricsUpdate {
            scroll_time_ms: self
                .scroll_started_ms
                .map_or(0, |start| now_ms.saturating_sub(start)),
            render_time_ms,
            observed_rows: self.observers.observer_count(),
            total_rows: self.collection.len(),
            current_page: self.pages.page_at_position(self.viewport.scroll_top),
        };
        sink.update_metrics(update, now_ms);
    }
}

impl<C, R, O> VisibleRender<C, R, O>
where
    C: DataSource,
    R: Renderer,
    O: VisibilityObserver<R::Element>,
{
    /// Replaces the item at `index`, refreshes its cached layout and re-renders it.
    pub fn update_row(&mut self, index: usize, item: C::Item) -> Result<()> {
        if self.destroyed {
            return Ok(());
        }
        self.collection.update_data(index, item)?;
        let item = self.collection.data(index)?;
        self.layout.update_layout(item);
        let height = self.layout.resolve(item).height;
        if let Some(cb) = &self.options.on_data_update {
            cb(index, item);
        }
        self.renderer.update_item(index);
        if self.pages.set_row_height(index, height) {
            self.pages.repartition();
            self.refresh_visible_page();
        }
        Ok(())
    }

    /// Reloads the data source and rebuilds layout and pages from scratch.
    pub fn refresh(&mut self) {
        if self.destroyed {
            return;
        }
        self.observers
            .cleanup_all(&self.ranges, &mut self.renderer, &mut self.observer);
        self.collection.refresh();
        self.layout.clear();
        self.pages.calculate_pages(&self.collection, &mut self.layout);
        self.renderer.initialize(self.pages.total_height());
        self.refresh_visible_page();
        rdebug!(rows = self.collection.len(), "refresh");
    }
}

impl<C, R, O> core::fmt::Debug for VisibleRender<C, R, O>
where
    C: RenderCollection,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisibleRender")
            .field("rows", &self.collection.len())
            .field("pages", &self.pages)
            .field("scroll", &self.scroll)
            .field("observers", &self.observers)
            .field("viewport", &self.viewport)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}
