use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Write as _;

use visible_render::{InstrumentationSink, MetricsUpdate, PerformanceThresholds};

const FPS_WINDOW_MS: u64 = 1_000;
const MEMORY_CHECK_INTERVAL_MS: u64 = 1_000;
const MEMORY_SAMPLE_SIZE: usize = 10;
const MAX_WARNINGS: usize = 10;
const SUMMARY_WARNINGS: usize = 3;

/// Which threshold a [`PerformanceWarning`] crossed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum WarningKind {
    Memory,
    Fps,
    Render,
    Observer,
    Leak,
}

#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceWarning {
    pub kind: WarningKind,
    pub message: String,
    pub value: u64,
    pub threshold: u64,
    pub timestamp_ms: u64,
}

/// Everything the monitor knows, as shown by [`PerformanceMonitor::summary`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PerformanceMetrics {
    pub scroll_time_ms: u64,
    pub render_time_ms: u64,
    pub observed_rows: usize,
    pub total_rows: usize,
    pub current_page: Option<usize>,
    pub fps: u32,
    /// Bytes.
    pub memory_usage: Option<u64>,
    /// Average bytes per second over the last memory samples. Negative when memory shrinks.
    pub memory_growth: i64,
    /// Oldest first.
    pub warnings: Vec<PerformanceWarning>,
}

/// An [`InstrumentationSink`] that derives FPS and memory growth from host samples and records
/// threshold warnings.
///
/// The host calls `record_frame(now_ms)` once per rendered frame and `record_memory` whenever it
/// can read heap usage. FPS is recomputed every second; memory growth is sampled at most once a
/// second and averaged over the last 10 samples. Only the 10 most recent warnings are kept.
#[derive(Clone, Debug)]
pub struct PerformanceMonitor {
    thresholds: PerformanceThresholds,
    metrics: PerformanceMetrics,
    visible: bool,
    frame_count: u32,
    window_start_ms: Option<u64>,
    last_memory: Option<(u64, u64)>,
    growth_samples: VecDeque<i64>,
}

impl Default for PerformanceMonitor {
    fn default() -> Self {
        Self::new(PerformanceThresholds::default())
    }
}

impl PerformanceMonitor {
    pub fn new(thresholds: PerformanceThresholds) -> Self {
        Self {
            thresholds,
            metrics: PerformanceMetrics::default(),
            visible: false,
            frame_count: 0,
            window_start_ms: None,
            last_memory: None,
            growth_samples: VecDeque::with_capacity(MEMORY_SAMPLE_SIZE),
        }
    }

    pub fn thresholds(&self) -> &PerformanceThresholds {
        &self.thresholds
    }

    pub fn metrics(&self) -> &PerformanceMetrics {
        &self.metrics
    }

    pub fn warnings(&self) -> &[PerformanceWarning] {
        &self.metrics.warnings
    }

    pub fn current_fps(&self) -> u32 {
        self.metrics.fps
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    pub fn hide(&mut self) {
        self.visible = false;
    }

    pub fn is_visible(&self) -> bool {
        self.visible
    }

    /// The overlay text, or `None` while hidden.
    pub fn overlay(&self) -> Option<String> {
        self.visible.then(|| self.summary())
    }

    /// Plain-text rendering of the current metrics and the last three warnings.
    pub fn summary(&self) -> String {
        let m = &self.metrics;
        let mut out = String::new();
        let _ = writeln!(out, "FPS: {}", m.fps);
        let _ = writeln!(out, "Memory: {}", format_bytes(m.memory_usage.unwrap_or(0)));
        let growth = format_bytes(m.memory_growth.unsigned_abs());
        let sign = if m.memory_growth < 0 { "-" } else { "" };
        let _ = writeln!(out, "Memory growth: {sign}{growth}/s");
        let _ = writeln!(out, "Render time: {}ms", m.render_time_ms);
        let _ = writeln!(out, "Observed rows: {}", m.observed_rows);
        let _ = writeln!(out, "Total rows: {}", m.total_rows);
        match m.current_page {
            Some(page) => {
                let _ = writeln!(out, "Current page: {page}");
            }
            None => out.push_str("Current page: -\n"),
        }
        let skip = m.warnings.len().saturating_sub(SUMMARY_WARNINGS);
        for w in &m.warnings[skip..] {
            let _ = writeln!(out, "! {}", w.message);
        }
        out
    }

    fn add_warning(
        &mut self,
        kind: WarningKind,
        message: String,
        value: u64,
        threshold: u64,
        now_ms: u64,
    ) {
        rwarn!(kind = ?kind, value, threshold, "performance warning: {message}");
        let warnings = &mut self.metrics.warnings;
        warnings.push(PerformanceWarning {
            kind,
            message,
            value,
            threshold,
            timestamp_ms: now_ms,
        });
        if warnings.len() > MAX_WARNINGS {
            let excess = warnings.len() - MAX_WARNINGS;
            warnings.drain(..excess);
        }
    }
}

impl InstrumentationSink for PerformanceMonitor {
    fn set_thresholds(&mut self, thresholds: PerformanceThresholds) {
        self.thresholds = thresholds;
    }

    fn record_frame(&mut self, now_ms: u64) {
        let start = *self.window_start_ms.get_or_insert(now_ms);
        let elapsed = now_ms.saturating_sub(start);
        if elapsed >= FPS_WINDOW_MS {
            let frames = self.frame_count as u64 * 1_000;
            let fps = ((frames + elapsed / 2) / elapsed).min(u32::MAX as u64) as u32;
            self.metrics.fps = fps;
            self.frame_count = 0;
            self.window_start_ms = Some(now_ms);
            rtrace!(fps, "fps window");

            if let Some(min) = self.thresholds.min_fps.filter(|&min| fps < min) {
                self.add_warning(
                    WarningKind::Fps,
                    format!("FPS too low: {fps}"),
                    fps as u64,
                    min as u64,
                    now_ms,
                );
            }
        }
        self.frame_count = self.frame_count.saturating_add(1);
    }

    fn record_memory(&mut self, used_bytes: u64, now_ms: u64) {
        self.metrics.memory_usage = Some(used_bytes);

        if let Some((last_bytes, last_ms)) = self.last_memory {
            let elapsed = now_ms.saturating_sub(last_ms);
            if elapsed < MEMORY_CHECK_INTERVAL_MS {
                return;
            }
            let delta = used_bytes as i128 - last_bytes as i128;
            let growth = delta * 1_000 / elapsed as i128;
            if self.growth_samples.len() == MEMORY_SAMPLE_SIZE {
                self.growth_samples.pop_front();
            }
            self.growth_samples
                .push_back(growth.clamp(i64::MIN as i128, i64::MAX as i128) as i64);
        }
        self.last_memory = Some((used_bytes, now_ms));

        let avg = if self.growth_samples.is_empty() {
            0
        } else {
            let sum: i128 = self.growth_samples.iter().map(|&g| g as i128).sum();
            (sum / self.growth_samples.len() as i128) as i64
        };
        self.metrics.memory_growth = avg;

        if let Some(max) = self.thresholds.max_memory_usage.filter(|&max| used_bytes > max) {
            self.add_warning(
                WarningKind::Memory,
                format!("memory usage too high: {}", format_bytes(used_bytes)),
                used_bytes,
                max,
                now_ms,
            );
        }
        let leak_limit = self.thresholds.memory_leak_threshold;
        if let Some(limit) = leak_limit.filter(|&limit| avg > 0 && avg as u64 > limit) {
            self.add_warning(
                WarningKind::Leak,
                format!("possible memory leak: {}/s", format_bytes(avg as u64)),
                avg as u64,
                limit,
                now_ms,
            );
        }
    }

    fn update_metrics(&mut self, update: MetricsUpdate, now_ms: u64) {
        self.metrics.scroll_time_ms = update.scroll_time_ms;
        self.metrics.render_time_ms = update.render_time_ms;
        self.metrics.observed_rows = update.observed_rows;
        self.metrics.total_rows = update.total_rows;
        self.metrics.current_page = update.current_page;

        let render_limit = self.thresholds.max_render_time_ms;
        if let Some(max) = render_limit.filter(|&max| update.render_time_ms > max) {
            self.add_warning(
                WarningKind::Render,
                format!("render time too long: {}ms", update.render_time_ms),
                update.render_time_ms,
                max,
                now_ms,
            );
        }
        let observer_limit = self.thresholds.max_observer_count;
        if let Some(max) = observer_limit.filter(|&max| update.observed_rows > max) {
            self.add_warning(
                WarningKind::Observer,
                format!("too many observed rows: {}", update.observed_rows),
                update.observed_rows as u64,
                max as u64,
                now_ms,
            );
        }
    }

    fn fps(&self) -> u32 {
        self.metrics.fps
    }

    fn memory_usage(&self) -> Option<u64> {
        self.metrics.memory_usage
    }

    fn shutdown(&mut self) {
        rdebug!(warnings = self.metrics.warnings.len(), "performance monitor shut down");
        self.visible = false;
        self.window_start_ms = None;
        self.frame_count = 0;
        self.last_memory = None;
        self.growth_samples.clear();
    }
}

/// Formats a byte count with two decimals in B/KB/MB/GB.
pub fn format_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    if bytes == 0 {
        return String::from("0 B");
    }
    let mut unit = 0;
    let mut scale = 1u64;
    while unit + 1 < UNITS.len() && bytes / scale >= 1024 {
        scale *= 1024;
        unit += 1;
    }
    let hundredths = (bytes as u128 * 100 + scale as u128 / 2) / scale as u128;
    format!("{}.{:02} {}", hundredths / 100, hundredths % 100, UNITS[unit])
}
