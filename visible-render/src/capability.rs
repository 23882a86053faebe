//! Capabilities the host provides to the engine.
//!
//! None of these traits assume a particular presentation surface: a DOM, a canvas, a terminal
//! grid or a native list widget can all satisfy them.

use alloc::vec::Vec;

use crate::key::ItemKey;
use crate::{Error, LayoutRect, MetricsUpdate, PerformanceThresholds, Result};

/// An item of a [`RenderCollection`].
pub trait LayoutItem {
    /// Identity used by [`crate::LayoutCache`].
    type Key: ItemKey + Clone;

    fn key(&self) -> Self::Key;

    /// Cheap, approximate layout usable before the item is materialized.
    fn layout_predictor(&self) -> LayoutRect;

    /// Measured layout. Only meaningful once the item is materialized.
    fn real_layout(&self) -> LayoutRect;
}

/// An ordered, indexable sequence of items.
pub trait RenderCollection {
    type Item: LayoutItem;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn item(&self, index: usize) -> Option<&Self::Item>;
}

impl<T: LayoutItem> RenderCollection for Vec<T> {
    type Item = T;

    fn len(&self) -> usize {
        Vec::len(self)
    }

    fn item(&self, index: usize) -> Option<&T> {
        self.get(index)
    }
}

/// A mutable [`RenderCollection`] that owns its data.
pub trait DataSource: RenderCollection {
    /// Returns the item at `index`, or [`Error::OutOfBounds`].
    fn data(&self, index: usize) -> Result<&Self::Item> {
        let count = self.len();
        self.item(index)
            .ok_or(Error::OutOfBounds { index, count })
    }

    /// Replaces the item at `index`, or fails with [`Error::OutOfBounds`].
    fn update_data(&mut self, index: usize, item: Self::Item) -> Result<()>;

    /// Regenerates or reloads every item.
    fn refresh(&mut self);
}

/// Materializes and discards item content on a presentation surface.
pub trait Renderer {
    /// Handle to the surface node backing a row; used as an observation target.
    type Element;

    /// Called once on construction with the total content height.
    fn initialize(&mut self, total_height: u64) {
        let _ = total_height;
    }

    fn render_item(&mut self, index: usize);

    fn clear_item(&mut self, index: usize);

    /// Called after the data behind `index` changed.
    fn update_item(&mut self, index: usize) {
        let _ = index;
    }

    /// `None` means "not yet materialized", never an error.
    fn item_element(&self, index: usize) -> Option<Self::Element>;

    fn item_height(&self, index: usize) -> u32;

    /// Debug aid: tags a rendered row with its page color.
    fn tag_item(&mut self, index: usize, color: &'static str) {
        let _ = (index, color);
    }
}

/// What a [`VisibilityObserver`] watches.
#[derive(Debug)]
pub enum ObserveTarget<'a, E> {
    /// The rendering container as a whole.
    Container,
    Row { index: usize, element: &'a E },
}

/// Visibility-detection primitive of the host runtime.
///
/// Intersection batches are delivered back through
/// [`crate::VisibleRender::on_row_intersections`] and
/// [`crate::VisibleRender::on_container_intersection`].
pub trait VisibilityObserver<E> {
    fn subscribe(&mut self, target: ObserveTarget<'_, E>);

    fn unsubscribe(&mut self, target: ObserveTarget<'_, E>);
}

/// Optional instrumentation. Nothing it does can affect rendering.
pub trait InstrumentationSink {
    fn set_thresholds(&mut self, thresholds: PerformanceThresholds);

    fn record_frame(&mut self, now_ms: u64);

    fn record_memory(&mut self, used_bytes: u64, now_ms: u64);

    fn update_metrics(&mut self, update: MetricsUpdate, now_ms: u64);

    fn fps(&self) -> u32;

    fn memory_usage(&self) -> Option<u64>;

    fn shutdown(&mut self) {}
}
