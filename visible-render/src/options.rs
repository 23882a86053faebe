use alloc::sync::Arc;

/// A callback fired after [`crate::VisibleRender::update_row`] replaced an item.
pub type OnDataUpdateCallback<T> = Arc<dyn Fn(usize, &T) + Send + Sync>;

/// Scroll classification thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ScrollConfig {
    /// A tick moving more than `long_scroll_factor × viewport height` is a long jump.
    pub long_scroll_factor: u32,
    /// Speed checks closer together than this are "quick".
    pub quick_scroll_threshold_ms: u64,
    /// Debounce before `is_scrolling` resets.
    pub settle_delay_ms: u64,
    /// Pages added on each side of the landing page when repartitioning after a long jump.
    pub repartition_page_margin: usize,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            long_scroll_factor: 2,
            quick_scroll_threshold_ms: 100,
            settle_delay_ms: 150,
            repartition_page_margin: 2,
        }
    }
}

impl ScrollConfig {
    pub fn with_long_scroll_factor(mut self, factor: u32) -> Self {
        self.long_scroll_factor = factor;
        self
    }

    pub fn with_quick_scroll_threshold_ms(mut self, threshold_ms: u64) -> Self {
        self.quick_scroll_threshold_ms = threshold_ms;
        self
    }

    pub fn with_settle_delay_ms(mut self, delay_ms: u64) -> Self {
        self.settle_delay_ms = delay_ms;
        self
    }

    pub fn with_repartition_page_margin(mut self, pages: usize) -> Self {
        self.repartition_page_margin = pages;
        self
    }
}

/// Page sizing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageConfig {
    /// Page height as a percentage of the viewport height.
    pub page_height_percent: u32,
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            page_height_percent: 150,
        }
    }
}

impl PageConfig {
    pub fn with_page_height_percent(mut self, percent: u32) -> Self {
        self.page_height_percent = percent;
        self
    }
}

/// Advisory limits for an [`crate::InstrumentationSink`]. `None` disables a check.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceThresholds {
    /// Bytes.
    pub max_memory_usage: Option<u64>,
    pub min_fps: Option<u32>,
    pub max_render_time_ms: Option<u64>,
    pub max_observer_count: Option<usize>,
    /// Bytes per second of average memory growth.
    pub memory_leak_threshold: Option<u64>,
}

impl Default for PerformanceThresholds {
    fn default() -> Self {
        Self {
            max_memory_usage: Some(100 * 1024 * 1024),
            min_fps: Some(30),
            max_render_time_ms: Some(16),
            max_observer_count: Some(100),
            memory_leak_threshold: Some(1024 * 1024),
        }
    }
}

impl PerformanceThresholds {
    /// Thresholds with every check disabled.
    pub fn none() -> Self {
        Self {
            max_memory_usage: None,
            min_fps: None,
            max_render_time_ms: None,
            max_observer_count: None,
            memory_leak_threshold: None,
        }
    }
}

/// Configuration for [`crate::VisibleRender`].
pub struct VisibleRenderOptions<T> {
    /// Forward metrics to the attached instrumentation sink.
    pub enable_performance_monitor: bool,
    /// Refresh the visible page immediately on quick scrolls instead of waiting for settle.
    pub enable_fast_scroll: bool,
    pub performance_thresholds: PerformanceThresholds,
    pub scroll: ScrollConfig,
    pub pages: PageConfig,
    pub on_data_update: Option<OnDataUpdateCallback<T>>,
}

impl<T> Default for VisibleRenderOptions<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for VisibleRenderOptions<T> {
    fn clone(&self) -> Self {
        Self {
            enable_performance_monitor: self.enable_performance_monitor,
            enable_fast_scroll: self.enable_fast_scroll,
            performance_thresholds: self.performance_thresholds,
            scroll: self.scroll,
            pages: self.pages,
            on_data_update: self.on_data_update.clone(),
        }
    }
}

impl<T> VisibleRenderOptions<T> {
    pub fn new() -> Self {
        Self {
            enable_performance_monitor: true,
            enable_fast_scroll: true,
            performance_thresholds: PerformanceThresholds::default(),
            scroll: ScrollConfig::default(),
            pages: PageConfig::default(),
            on_data_update: None,
        }
    }

    pub fn with_enable_performance_monitor(mut self, enabled: bool) -> Self {
        self.enable_performance_monitor = enabled;
        self
    }

    pub fn with_enable_fast_scroll(mut self, enabled: bool) -> Self {
        self.enable_fast_scroll = enabled;
        self
    }

    pub fn with_performance_thresholds(mut self, thresholds: PerformanceThresholds) -> Self {
        self.performance_thresholds = thresholds;
        self
    }

    pub fn with_scroll_config(mut self, scroll: ScrollConfig) -> Self {
        self.scroll = scroll;
        self
    }

    pub fn with_page_config(mut self, pages: PageConfig) -> Self {
        self.pages = pages;
        self
    }

    pub fn with_on_data_update(
        mut self,
        on_data_update: Option<impl Fn(usize, &T) + Send + Sync + 'static>,
    ) -> Self {
        self.on_data_update = on_data_update.map(|f| Arc::new(f) as _);
        self
    }
}

impl<T> core::fmt::Debug for VisibleRenderOptions<T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("VisibleRenderOptions")
            .field("enable_performance_monitor", &self.enable_performance_monitor)
            .field("enable_fast_scroll", &self.enable_fast_scroll)
            .field("performance_thresholds", &self.performance_thresholds)
            .field("scroll", &self.scroll)
            .field("pages", &self.pages)
            .finish_non_exhaustive()
    }
}
