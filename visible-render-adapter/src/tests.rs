use crate::*;

use alloc::string::String;
use alloc::vec::Vec;
use std::collections::BTreeSet;

use visible_render::{
    DataSource, Error, InstrumentationSink, LayoutItem, LayoutRect, MetricsUpdate, ObserveTarget,
    PerformanceThresholds, RenderCollection, Renderer, Viewport, VisibilityObserver,
    VisibleRender, VisibleRenderOptions,
};

const MIB: u64 = 1024 * 1024;

fn update(render_time_ms: u64, observed_rows: usize) -> MetricsUpdate {
    MetricsUpdate {
        scroll_time_ms: 40,
        render_time_ms,
        observed_rows,
        total_rows: 1_000,
        current_page: Some(2),
    }
}

#[derive(Debug, Default)]
struct NullRenderer {
    rendered: BTreeSet<usize>,
}

impl Renderer for NullRenderer {
    type Element = usize;

    fn render_item(&mut self, index: usize) {
        self.rendered.insert(index);
    }

    fn clear_item(&mut self, index: usize) {
        self.rendered.remove(&index);
    }

    fn item_element(&self, index: usize) -> Option<usize> {
        Some(index)
    }

    fn item_height(&self, _index: usize) -> u32 {
        45
    }
}

#[derive(Debug, Default)]
struct CountingObserver {
    rows: BTreeSet<usize>,
}

impl VisibilityObserver<usize> for CountingObserver {
    fn subscribe(&mut self, target: ObserveTarget<'_, usize>) {
        if let ObserveTarget::Row { index, .. } = target {
            self.rows.insert(index);
        }
    }

    fn unsubscribe(&mut self, target: ObserveTarget<'_, usize>) {
        if let ObserveTarget::Row { index, .. } = target {
            self.rows.remove(&index);
        }
    }
}

#[test]
fn fps_is_computed_over_one_second_windows() {
    let mut m = PerformanceMonitor::default();
    for now_ms in (0..=1_000u64).step_by(10) {
        m.record_frame(now_ms);
    }
    assert_eq!(m.current_fps(), 100);
    assert_eq!(InstrumentationSink::fps(&m), 100);
    assert!(m.warnings().is_empty());

    // 2.5 frames per second rounds up.
    let mut slow = PerformanceMonitor::new(PerformanceThresholds::none());
    for now_ms in [0u64, 400, 800, 1_200] {
        slow.record_frame(now_ms);
    }
    assert_eq!(slow.current_fps(), 3);
}

#[test]
fn low_fps_raises_a_warning() {
    let mut m = PerformanceMonitor::default();
    for now_ms in (0..=1_000u64).step_by(100) {
        m.record_frame(now_ms);
    }
    assert_eq!(m.current_fps(), 10);
    let w = &m.warnings()[0];
    assert_eq!(w.kind, WarningKind::Fps);
    assert_eq!((w.value, w.threshold, w.timestamp_ms), (10, 30, 1_000));
    assert_eq!(w.message, "FPS too low: 10");
}

#[test]
fn memory_growth_is_sampled_once_per_second_and_averaged() {
    let mut m = PerformanceMonitor::new(PerformanceThresholds::none());
    m.record_memory(1_000, 0);
    assert_eq!(m.metrics().memory_growth, 0);

    m.record_memory(5_000, 500);
    assert_eq!(m.memory_usage(), Some(5_000));
    assert_eq!(m.metrics().memory_growth, 0);

    m.record_memory(4_000, 1_000);
    assert_eq!(m.metrics().memory_growth, 3_000);
    m.record_memory(5_000, 2_000);
    assert_eq!(m.metrics().memory_growth, 2_000);
    m.record_memory(0, 3_000);
    assert_eq!(m.metrics().memory_growth, (3_000 + 1_000 - 5_000) / 3);
}

#[test]
fn memory_growth_keeps_the_last_ten_samples() {
    let mut m = PerformanceMonitor::new(PerformanceThresholds::none());
    m.record_memory(0, 0);
    m.record_memory(10_000, 1_000);
    let mut used = 10_000;
    for i in 2..=11u64 {
        used += 1_000;
        m.record_memory(used, i * 1_000);
    }
    assert_eq!(m.metrics().memory_growth, 1_000);
}

#[test]
fn memory_thresholds_raise_memory_and_leak_warnings() {
    let mut m = PerformanceMonitor::default();
    m.record_memory(0, 0);
    m.record_memory(2 * MIB, 1_000);
    assert_eq!(m.warnings().len(), 1);
    let leak = &m.warnings()[0];
    assert_eq!(leak.kind, WarningKind::Leak);
    assert_eq!((leak.value, leak.threshold), (2 * MIB, MIB));
    assert_eq!(leak.message, "possible memory leak: 2.00 MB/s");

    let mut m = PerformanceMonitor::new(PerformanceThresholds {
        max_memory_usage: Some(1_000),
        ..PerformanceThresholds::none()
    });
    m.record_memory(2_000, 0);
    let kinds: Vec<WarningKind> = m.warnings().iter().map(|w| w.kind).collect();
    assert_eq!(kinds, [WarningKind::Memory]);
    assert_eq!(m.warnings()[0].message, "memory usage too high: 1.95 KB");
}

#[test]
fn metrics_updates_check_render_and_observer_thresholds() {
    let mut m = PerformanceMonitor::default();
    m.update_metrics(update(10, 50), 1);
    assert!(m.warnings().is_empty());

    m.update_metrics(update(20, 150), 5);
    let metrics = m.metrics();
    assert_eq!(metrics.render_time_ms, 20);
    assert_eq!(metrics.observed_rows, 150);
    assert_eq!(metrics.total_rows, 1_000);
    assert_eq!(metrics.current_page, Some(2));
    assert_eq!(metrics.scroll_time_ms, 40);

    let kinds: Vec<WarningKind> = metrics.warnings.iter().map(|w| w.kind).collect();
    assert_eq!(kinds, [WarningKind::Render, WarningKind::Observer]);
    assert_eq!(metrics.warnings[0].threshold, 16);
    assert_eq!(metrics.warnings[1].value, 150);
    assert!(metrics.warnings.iter().all(|w| w.timestamp_ms == 5));
}

#[test]
fn only_the_latest_ten_warnings_are_kept() {
    let mut m = PerformanceMonitor::new(PerformanceThresholds {
        max_render_time_ms: Some(16),
        ..PerformanceThresholds::none()
    });
    for now_ms in 0..12u64 {
        m.update_metrics(update(20, 0), now_ms);
    }
    assert_eq!(m.warnings().len(), 10);
    assert_eq!(m.warnings()[0].timestamp_ms, 2);
    assert_eq!(m.warnings()[9].timestamp_ms, 11);
}

#[test]
fn disabled_thresholds_never_warn() {
    let mut m = PerformanceMonitor::new(PerformanceThresholds::none());
    m.update_metrics(update(1_000, 10_000), 0);
    m.record_memory(0, 0);
    m.record_memory(u32::MAX as u64, 1_000);
    m.record_frame(0);
    m.record_frame(5_000);
    assert!(m.warnings().is_empty());
}

#[test]
fn set_thresholds_replaces_the_configuration() {
    let mut m = PerformanceMonitor::default();
    m.set_thresholds(PerformanceThresholds::none());
    assert_eq!(m.thresholds(), &PerformanceThresholds::none());
    m.update_metrics(update(100, 0), 0);
    assert!(m.warnings().is_empty());
}

#[test]
fn overlay_follows_visibility_and_lists_last_three_warnings() {
    let mut m = PerformanceMonitor::new(PerformanceThresholds {
        max_render_time_ms: Some(16),
        ..PerformanceThresholds::none()
    });
    for (now_ms, render) in (17..22u64).enumerate() {
        m.update_metrics(update(render, 7), now_ms as u64);
    }
    m.record_memory(1_536, 0);

    assert!(!m.is_visible());
    assert_eq!(m.overlay(), None);

    m.show();
    let text = m.overlay().unwrap();
    assert!(text.contains("Memory: 1.50 KB"));
    assert!(text.contains("Render time: 21ms"));
    assert!(text.contains("Observed rows: 7"));
    assert!(text.contains("Current page: 2"));
    assert!(!text.contains("render time too long: 18ms"));
    for ms in [19, 20, 21] {
        let line = alloc::format!("render time too long: {ms}ms");
        assert!(text.contains(&line), "{text}");
    }

    m.hide();
    assert_eq!(m.overlay(), None);
    assert!(m.summary().starts_with("FPS: 0\n"));
}

#[test]
fn shutdown_resets_sampling() {
    let mut m = PerformanceMonitor::new(PerformanceThresholds::none());
    m.show();
    m.record_memory(0, 0);
    m.record_memory(5_000, 1_000);
    m.shutdown();
    assert!(!m.is_visible());

    // A fresh baseline: no growth sample from the pre-shutdown reading.
    m.record_memory(100_000, 1_100);
    assert_eq!(m.metrics().memory_growth, 0);
    m.record_memory(103_000, 2_100);
    assert_eq!(m.metrics().memory_growth, 3_000);
}

#[test]
fn format_bytes_uses_binary_units() {
    assert_eq!(format_bytes(0), "0 B");
    assert_eq!(format_bytes(512), "512.00 B");
    assert_eq!(format_bytes(1_536), "1.50 KB");
    assert_eq!(format_bytes(100 * MIB), "100.00 MB");
    assert_eq!(format_bytes(3 * 1024 * MIB), "3.00 GB");
    assert_eq!(format_bytes(4096 * 1024 * MIB), "4096.00 GB");
}

#[test]
fn default_data_source_generates_rows() {
    let source = DefaultDataSource::default();
    assert_eq!(source.total_count(), 10_000);
    assert!(source.row_heights().all(|h| (30..60).contains(&h)));

    let first = source.data(0).unwrap();
    assert_eq!(first.id, 0);
    assert_eq!(first.content, "Row 1");
    assert_eq!(first.layout_predictor(), LayoutRect::new(first.height));
    assert_eq!(first.real_layout(), LayoutRect::new(first.height));
    assert_eq!(first.key(), 0);

    let distinct: BTreeSet<u32> = source.row_heights().collect();
    assert!(distinct.len() > 10);
}

#[test]
fn same_seed_same_rows() {
    let a = DefaultDataSource::with_seed(500, 9);
    let b = DefaultDataSource::with_seed(500, 9);
    let c = DefaultDataSource::with_seed(500, 10);
    assert_eq!(a.items(), b.items());
    assert_ne!(
        a.row_heights().collect::<Vec<_>>(),
        c.row_heights().collect::<Vec<_>>()
    );
}

#[test]
fn data_access_is_bounds_checked() {
    let mut source = DefaultDataSource::new(100);
    assert_eq!(
        source.data(100),
        Err(Error::OutOfBounds {
            index: 100,
            count: 100
        })
    );

    let item = DataItem {
        id: 5,
        content: String::from("edited"),
        height: 80,
    };
    source.update_data(5, item.clone()).unwrap();
    assert_eq!(source.data(5), Ok(&item));
    assert_eq!(source.row_heights().nth(5), Some(80));
    assert_eq!(
        source.update_data(100, item),
        Err(Error::OutOfBounds {
            index: 100,
            count: 100
        })
    );
}

#[test]
fn refresh_regenerates_every_row() {
    let mut source = DefaultDataSource::new(1_000);
    let before: Vec<u32> = source.row_heights().collect();
    source.refresh();
    let after: Vec<u32> = source.row_heights().collect();
    assert_eq!(source.len(), 1_000);
    assert_ne!(before, after);
    assert!(after.iter().all(|h| (30..60).contains(h)));
    assert_eq!(source.item(999).map(|i| i.id), Some(999));
}

#[test]
fn monitor_and_data_source_drive_the_engine() {
    let source = DefaultDataSource::with_seed(1_000, 7);
    let total: u64 = source.row_heights().map(u64::from).sum();
    let options = VisibleRenderOptions::new().with_enable_fast_scroll(false);
    let mut v = VisibleRender::new(
        source,
        NullRenderer::default(),
        CountingObserver::default(),
        Viewport::new(0, 600),
        options,
    )
    .with_instrumentation(PerformanceMonitor::default());

    assert_eq!(v.pages().total_height(), total);
    assert_eq!(v.pages().visible_page(), Some(0));
    assert_eq!(v.observer().rows.len(), v.observers().observer_count());

    for now_ms in (0..=1_000u64).step_by(20) {
        v.on_frame(now_ms);
    }
    v.record_memory(8 * MIB, 1_000);
    v.on_scroll(1_000, 1_000);
    assert!(v.tick(1_150));

    let data = v.performance_data();
    assert_eq!(data.fps, 50);
    assert_eq!(data.memory_usage, Some(8 * MIB));
    assert_eq!(data.observer_count, v.observer().rows.len());

    let edited = DataItem {
        id: 3,
        content: String::from("tall"),
        height: 300,
    };
    v.update_row(3, edited).unwrap();
    assert_eq!(v.pages().row_height(3), Some(300));
    assert!(v.update_row(5_000, v.collection().items()[0].clone()).is_err());
}
