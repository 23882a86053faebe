use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use crate::{
    IntersectionEntry, ObserveTarget, PageChangeEvent, PageManager, RangeManager, Renderer,
    VisibilityObserver,
};

/// Position of a row in a [`RangeManager`].
pub(crate) fn row_position(row: usize) -> i64 {
    i64::try_from(row).unwrap_or(i64::MAX)
}

/// Keeps visibility observation bound to the rows of the current buffer range.
///
/// Rows entering the viewport are rendered; rows leaving it are cleared only when their page
/// is more than one page away from the visible page. Rows pinned in the [`RangeManager`] are
/// never cleared by this path. When the container itself leaves the viewport every row
/// subscription is dropped until it comes back.
#[derive(Clone, Debug, Default)]
pub struct ObserverManager {
    observed: BTreeSet<usize>,
    rendered: BTreeSet<usize>,
    paused: bool,
    container_attached: bool,
}

impl ObserverManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Subscribes the container-level observation.
    pub fn attach<E, O: VisibilityObserver<E>>(&mut self, observer: &mut O) {
        if self.container_attached {
            return;
        }
        observer.subscribe(ObserveTarget::Container);
        self.container_attached = true;
    }

    /// Drops every row subscription and the container subscription.
    pub fn detach<R, O>(&mut self, pinned: &RangeManager, renderer: &mut R, observer: &mut O)
    where
        R: Renderer,
        O: VisibilityObserver<R::Element>,
    {
        self.cleanup_all(pinned, renderer, observer);
        if self.container_attached {
            observer.unsubscribe(ObserveTarget::Container);
            self.container_attached = false;
        }
    }

    /// Moves the observed set to the rows of `event.buffer_range`.
    pub fn handle_page_change<R, O>(
        &mut self,
        event: &PageChangeEvent,
        pages: &PageManager,
        pinned: &RangeManager,
        renderer: &mut R,
        observer: &mut O,
    ) where
        R: Renderer,
        O: VisibilityObserver<R::Element>,
    {
        if self.paused {
            return;
        }
        let range = event.buffer_range;

        let stale: Vec<usize> = self
            .observed
            .iter()
            .copied()
            .filter(|&row| {
                !pages
                    .page_index_for_row(row)
                    .is_some_and(|page| range.contains(page))
            })
            .collect();
        for row in stale {
            self.release_row(row, pinned, renderer, observer);
        }

        for page_index in range.pages() {
            let Some(page) = pages.page(page_index) else {
                continue;
            };
            for row in page.rows() {
                if !self.observed.contains(&row) {
                    self.observe_row(row, renderer, observer);
                }
            }
        }
        rtrace!(
            visible_page = event.visible_page,
            observed = self.observed.len(),
            "observer range updated"
        );
    }

    /// Applies a batch of row visibility changes.
    ///
    /// Entries for rows that are not observed are ignored.
    pub fn handle_intersections<R: Renderer>(
        &mut self,
        entries: &[IntersectionEntry],
        scroll_top: u64,
        pages: &PageManager,
        pinned: &RangeManager,
        renderer: &mut R,
    ) {
        if self.paused {
            return;
        }
        for entry in entries {
            let row = entry.index;
            if !self.observed.contains(&row) {
                continue;
            }
            if entry.is_intersecting {
                self.render_row(row, pages, renderer);
                continue;
            }
            let far = match (
                pages.page_index_for_row(row),
                pages.page_at_position(scroll_top),
            ) {
                (Some(row_page), Some(visible)) => row_page.abs_diff(visible) > 1,
                (None, _) => true,
                (Some(_), None) => false,
            };
            if far {
                self.clear_row(row, pinned, renderer);
            }
        }
    }

    /// Pauses or resumes row observation as the container leaves or enters the viewport.
    pub fn handle_container_intersection<R, O>(
        &mut self,
        is_intersecting: bool,
        pages: &PageManager,
        pinned: &RangeManager,
        renderer: &mut R,
        observer: &mut O,
    ) where
        R: Renderer,
        O: VisibilityObserver<R::Element>,
    {
        if !is_intersecting {
            if !self.paused {
                self.cleanup_all(pinned, renderer, observer);
                self.paused = true;
                rdebug!("container hidden, row observation paused");
            }
            return;
        }
        if !self.paused {
            return;
        }
        self.paused = false;
        rdebug!("container visible, row observation resumed");
        let visible = pages.visible_page();
        let buffer = pages.buffer_range(visible);
        if let (Some(visible_page), Some(buffer_range)) = (visible, buffer) {
            let event = PageChangeEvent {
                visible_page,
                buffer_range,
            };
            self.handle_page_change(&event, pages, pinned, renderer, observer);
        }
    }

    /// Renders a row regardless of visibility (used for pinned rows).
    pub fn force_render<R: Renderer>(
        &mut self,
        row: usize,
        pages: &PageManager,
        renderer: &mut R,
    ) {
        self.render_row(row, pages, renderer);
    }

    /// Clears a row that is no longer pinned, unless visibility still manages it.
    pub fn release_unobserved<R: Renderer>(
        &mut self,
        row: usize,
        pinned: &RangeManager,
        renderer: &mut R,
    ) {
        if !self.observed.contains(&row) {
            self.clear_row(row, pinned, renderer);
        }
    }

    /// Stops observing and clears every observed row.
    pub fn cleanup_all<R, O>(&mut self, pinned: &RangeManager, renderer: &mut R, observer: &mut O)
    where
        R: Renderer,
        O: VisibilityObserver<R::Element>,
    {
        let rows: Vec<usize> = self.observed.iter().copied().collect();
        for row in rows {
            self.release_row(row, pinned, renderer, observer);
        }
        self.observed.clear();
    }

    fn observe_row<R, O>(&mut self, row: usize, renderer: &mut R, observer: &mut O)
    where
        R: Renderer,
        O: VisibilityObserver<R::Element>,
    {
        let Some(element) = renderer.item_element(row) else {
            return;
        };
        observer.subscribe(ObserveTarget::Row {
            index: row,
            element: &element,
        });
        self.observed.insert(row);
    }

    fn release_row<R, O>(
        &mut self,
        row: usize,
        pinned: &RangeManager,
        renderer: &mut R,
        observer: &mut O,
    ) where
        R: Renderer,
        O: VisibilityObserver<R::Element>,
    {
        self.observed.remove(&row);
        let Some(element) = renderer.item_element(row) else {
            return;
        };
        observer.unsubscribe(ObserveTarget::Row {
            index: row,
            element: &element,
        });
        self.clear_row(row, pinned, renderer);
    }

    fn render_row<R: Renderer>(&mut self, row: usize, pages: &PageManager, renderer: &mut R) {
        if self.rendered.insert(row) {
            renderer.render_item(row);
        }
        if let Some(color) = pages.page_color(row) {
            renderer.tag_item(row, color);
        }
    }

    fn clear_row<R: Renderer>(&mut self, row: usize, pinned: &RangeManager, renderer: &mut R) {
        if pinned.is_in_range(row_position(row)) {
            return;
        }
        if self.rendered.remove(&row) {
            renderer.clear_item(row);
        }
    }

    pub fn observer_count(&self) -> usize {
        self.observed.len()
    }

    pub fn rendered_count(&self) -> usize {
        self.rendered.len()
    }

    pub fn is_observed(&self, row: usize) -> bool {
        self.observed.contains(&row)
    }

    pub fn is_rendered(&self, row: usize) -> bool {
        self.rendered.contains(&row)
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    pub fn observed_rows(&self) -> impl Iterator<Item = usize> + '_ {
        self.observed.iter().copied()
    }
}
