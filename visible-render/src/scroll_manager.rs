use core::cmp;

use crate::{PageManager, ScrollConfig, ScrollDirection};

/// Classification of a single scroll tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollKind {
    Normal,
    /// The tick moved further than `long_scroll_factor` viewports. Pages were rebuilt around
    /// the landing offset; `rows` is the repartitioned row span.
    LongJump {
        from: u64,
        to: u64,
        rows: Option<(usize, usize)>,
    },
}

/// Result of [`ScrollManager::check_scroll_speed`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SpeedCheck {
    pub start_ms: u64,
    pub is_quick: bool,
}

/// Tracks scroll velocity and direction, detects long jumps and debounces settle.
///
/// Time is supplied by the caller (`now_ms`). There is at most one pending settle deadline:
/// each tick replaces it, and [`Self::tick`] fires it once.
#[derive(Clone, Debug)]
pub struct ScrollManager {
    config: ScrollConfig,
    last_top: u64,
    last_tick_ms: Option<u64>,
    last_speed_check_ms: Option<u64>,
    speed: f64,
    direction: Option<ScrollDirection>,
    is_scrolling: bool,
    settle_at_ms: Option<u64>,
}

impl ScrollManager {
    pub fn new(config: ScrollConfig) -> Self {
        Self {
            config,
            last_top: 0,
            last_tick_ms: None,
            last_speed_check_ms: None,
            speed: 0.0,
            direction: None,
            is_scrolling: false,
            settle_at_ms: None,
        }
    }

    /// Starts tracking from `scroll_top` without classifying a tick.
    pub fn with_initial_offset(mut self, scroll_top: u64) -> Self {
        self.last_top = scroll_top;
        self
    }

    pub fn config(&self) -> &ScrollConfig {
        &self.config
    }

    /// Handles a scroll tick.
    ///
    /// A long jump immediately repartitions `pages` around `scroll_top`. Any other tick only
    /// updates velocity and direction. Both re-arm the settle deadline.
    pub fn handle_scroll(
        &mut self,
        scroll_top: u64,
        now_ms: u64,
        pages: &mut PageManager,
    ) -> ScrollKind {
        let prev = self.last_top;
        let distance = scroll_top.abs_diff(prev);
        let long_limit = (pages.viewport_height() as u64)
            .saturating_mul(self.config.long_scroll_factor as u64);

        let kind = if distance > long_limit {
            let rows = pages.update_pages_around(scroll_top, self.config.repartition_page_margin);
            rdebug!(from = prev, to = scroll_top, distance, "long scroll");
            ScrollKind::LongJump {
                from: prev,
                to: scroll_top,
                rows,
            }
        } else {
            let elapsed = self
                .last_tick_ms
                .map(|t| now_ms.saturating_sub(t))
                .unwrap_or(0)
                .max(1);
            self.speed = distance as f64 / elapsed as f64;
            self.direction = match scroll_top.cmp(&prev) {
                cmp::Ordering::Greater => Some(ScrollDirection::Forward),
                cmp::Ordering::Less => Some(ScrollDirection::Backward),
                cmp::Ordering::Equal => None,
            };
            ScrollKind::Normal
        };

        self.last_top = scroll_top;
        self.last_tick_ms = Some(now_ms);
        self.is_scrolling = true;
        self.settle_at_ms = Some(now_ms.saturating_add(self.config.settle_delay_ms));
        rtrace!(scroll_top, now_ms, "scroll tick");
        kind
    }

    /// Fires the pending settle if its deadline has passed. Returns `true` when it fired.
    pub fn tick(&mut self, now_ms: u64) -> bool {
        let Some(at) = self.settle_at_ms else {
            return false;
        };
        if now_ms < at {
            return false;
        }
        self.settle_at_ms = None;
        self.is_scrolling = false;
        self.direction = None;
        self.speed = 0.0;
        rtrace!(now_ms, "scroll settled");
        true
    }

    /// Classifies this call as quick if the previous call was less than
    /// `quick_scroll_threshold_ms` ago.
    pub fn check_scroll_speed(&mut self, now_ms: u64) -> SpeedCheck {
        let threshold = self.config.quick_scroll_threshold_ms;
        let is_quick = self
            .last_speed_check_ms
            .is_some_and(|prev| now_ms.saturating_sub(prev) < threshold);
        self.last_speed_check_ms = Some(now_ms);
        SpeedCheck {
            start_ms: now_ms,
            is_quick,
        }
    }

    /// Drops the pending settle without firing it.
    pub fn cancel(&mut self) {
        self.settle_at_ms = None;
        self.is_scrolling = false;
    }

    pub fn reset(&mut self) {
        *self = Self::new(self.config);
    }

    pub fn is_scrolling(&self) -> bool {
        self.is_scrolling
    }

    pub fn settle_deadline_ms(&self) -> Option<u64> {
        self.settle_at_ms
    }

    /// Pixels per millisecond over the last normal tick.
    pub fn speed(&self) -> f64 {
        self.speed
    }

    pub fn direction(&self) -> Option<ScrollDirection> {
        self.direction
    }

    /// `-1`, `0` or `1`.
    pub fn direction_sign(&self) -> i8 {
        self.direction.map_or(0, ScrollDirection::signum)
    }

    pub fn last_scroll_top(&self) -> u64 {
        self.last_top
    }

    pub fn last_scroll_ms(&self) -> Option<u64> {
        self.last_tick_ms
    }
}
