//! A headless page-windowing engine for very large, variable-height lists.
//!
//! Only rows near the viewport are materialized. The collection is partitioned into pages of
//! roughly 1.5 viewport heights; the visible page and its two neighbours form the buffer range
//! whose rows are bound to visibility observation. Rows are rendered when they become visible
//! and cleared when they leave the viewport more than one page away from the visible page.
//!
//! The building blocks can be used on their own:
//! - [`LayoutCache`]: memoized predicted sizes plus a separate measured-size cache
//! - [`RangeManager`]: a key-partitioned coalescing interval set (used to pin rows)
//! - [`PageManager`]: page partitioning, page lookup and page-change notification
//! - [`ScrollManager`]: long-jump detection, velocity/direction and debounced settle
//! - [`ObserverManager`]: visibility-driven render/clear scheduling
//!
//! [`VisibleRender`] wires them together. It is UI-agnostic: the host provides a
//! [`Renderer`], a [`VisibilityObserver`], scroll offsets and timestamps.
#![cfg_attr(not(feature = "std"), no_std)]
#![forbid(unsafe_code)]

extern crate alloc;

#[cfg(test)]
extern crate std;

#[macro_use]
mod macros;

mod capability;
mod error;
mod fenwick;
mod key;
mod layout_cache;
mod observer_manager;
mod options;
mod page_manager;
mod range_manager;
mod scroll_manager;
mod types;
mod visible_render;


pub use capability::{
    DataSource, InstrumentationSink, LayoutItem, ObserveTarget, RenderCollection, Renderer,
    VisibilityObserver,
};
pub use error::{Error, Result};
pub use layout_cache::LayoutCache;
pub use observer_manager::ObserverManager;
pub use options::{
    OnDataUpdateCallback, PageConfig, PerformanceThresholds, ScrollConfig, VisibleRenderOptions,
};
pub use page_manager::{ListenerId, PAGE_COLORS, PageChangeListener, PageManager};
pub use range_manager::RangeManager;
pub use scroll_manager::{ScrollKind, ScrollManager, SpeedCheck};
pub use types::{
    BufferRange, IntersectionEntry, Interval, LayoutRect, MetricsUpdate, Page, PageChangeEvent,
    PerformanceData, ScrollDirection, Viewport,
};
pub use visible_render::VisibleRender;

#[doc(hidden)]
pub use key::ItemKey;
