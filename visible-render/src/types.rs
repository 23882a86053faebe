#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ScrollDirection {
    Forward,
    Backward,
}

impl ScrollDirection {
    /// `1` for forward, `-1` for backward.
    pub fn signum(self) -> i8 {
        match self {
            Self::Forward => 1,
            Self::Backward => -1,
        }
    }
}

/// Size of an item in the scroll axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LayoutRect {
    pub height: u32,
}

impl LayoutRect {
    pub const fn new(height: u32) -> Self {
        Self { height }
    }
}

/// One partition unit of the collection.
///
/// Rows `start..=end` occupy the pixel span `top..bottom`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Page {
    pub start: usize,
    pub end: usize, // inclusive
    pub top: u64,
    pub bottom: u64, // exclusive
}

impl Page {
    pub fn row_count(&self) -> usize {
        self.end + 1 - self.start
    }

    pub fn height(&self) -> u64 {
        self.bottom.saturating_sub(self.top)
    }

    pub fn contains_row(&self, row: usize) -> bool {
        row >= self.start && row <= self.end
    }

    pub fn contains_offset(&self, offset: u64) -> bool {
        offset >= self.top && offset < self.bottom
    }

    pub fn rows(&self) -> core::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Inclusive window of page indexes around the visible page.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct BufferRange {
    pub start: usize,
    pub end: usize, // inclusive
}

impl BufferRange {
    pub fn contains(&self, page: usize) -> bool {
        page >= self.start && page <= self.end
    }

    pub fn pages(&self) -> core::ops::RangeInclusive<usize> {
        self.start..=self.end
    }
}

/// Emitted when the visible page changes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageChangeEvent {
    pub visible_page: usize,
    pub buffer_range: BufferRange,
}

/// Inclusive position interval stored by [`crate::RangeManager`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Interval {
    pub start: i64,
    pub end: i64, // inclusive
}

impl Interval {
    pub const fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, pos: i64) -> bool {
        pos >= self.start && pos <= self.end
    }

    fn touches(&self, other: &Interval) -> bool {
        other.start <= self.end.saturating_add(1) && self.start <= other.end.saturating_add(1)
    }

    pub(crate) fn try_merge(&self, other: &Interval) -> Option<Interval> {
        self.touches(other).then(|| Interval {
            start: self.start.min(other.start),
            end: self.end.max(other.end),
        })
    }
}

/// Geometry reported by the host scroll signal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Viewport {
    pub scroll_top: u64,
    pub height: u32,
}

impl Viewport {
    pub const fn new(scroll_top: u64, height: u32) -> Self {
        Self { scroll_top, height }
    }
}

/// One entry of a visibility-observation batch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IntersectionEntry {
    pub index: usize,
    pub is_intersecting: bool,
}

impl IntersectionEntry {
    pub const fn entered(index: usize) -> Self {
        Self {
            index,
            is_intersecting: true,
        }
    }

    pub const fn left(index: usize) -> Self {
        Self {
            index,
            is_intersecting: false,
        }
    }
}

/// Snapshot returned by [`crate::VisibleRender::performance_data`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceData {
    pub fps: u32,
    pub observer_count: usize,
    pub rendered_rows: usize,
    pub memory_usage: Option<u64>,
}

/// Metrics pushed to an [`crate::InstrumentationSink`] once scrolling settles.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MetricsUpdate {
    pub scroll_time_ms: u64,
    pub render_time_ms: u64,
    pub observed_rows: usize,
    pub total_rows: usize,
    pub current_page: Option<usize>,
}
