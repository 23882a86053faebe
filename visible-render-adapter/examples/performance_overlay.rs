// Example: attach the performance monitor and print its overlay text.
use visible_render::{InstrumentationSink, MetricsUpdate, PerformanceThresholds};
use visible_render_adapter::{DefaultDataSource, PerformanceMonitor};

fn main() {
    let source = DefaultDataSource::new(10_000);
    println!(
        "rows={} first_heights={:?}",
        source.total_count(),
        source.row_heights().take(5).collect::<Vec<_>>()
    );

    let mut monitor = PerformanceMonitor::new(PerformanceThresholds::default());
    monitor.show();

    // 24 frames in the first second: below the 30 fps threshold.
    for frame in 0..=24u64 {
        monitor.record_frame(frame * 1_000 / 24);
    }
    for (second, used) in [40u64, 44, 49, 55].into_iter().enumerate() {
        monitor.record_memory(used * 1024 * 1024, second as u64 * 1_000);
    }
    monitor.update_metrics(
        MetricsUpdate {
            scroll_time_ms: 320,
            render_time_ms: 4,
            observed_rows: 45,
            total_rows: source.total_count(),
            current_page: Some(12),
        },
        3_000,
    );

    if let Some(text) = monitor.overlay() {
        print!("{text}");
    }
}
