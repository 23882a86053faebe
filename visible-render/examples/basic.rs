// Example: drive the engine with a printing renderer and a manual visibility feed.
use visible_render::{
    IntersectionEntry, LayoutItem, LayoutRect, ObserveTarget, Renderer, Viewport,
    VisibilityObserver, VisibleRender, VisibleRenderOptions,
};

struct Line {
    id: u64,
    height: u32,
}

impl LayoutItem for Line {
    type Key = u64;

    fn key(&self) -> u64 {
        self.id
    }

    fn layout_predictor(&self) -> LayoutRect {
        LayoutRect::new(self.height)
    }

    fn real_layout(&self) -> LayoutRect {
        LayoutRect::new(self.height)
    }
}

struct PrintRenderer;

impl Renderer for PrintRenderer {
    type Element = usize;

    fn render_item(&mut self, index: usize) {
        println!("render {index}");
    }

    fn clear_item(&mut self, index: usize) {
        println!("clear {index}");
    }

    fn item_element(&self, index: usize) -> Option<usize> {
        Some(index)
    }

    fn item_height(&self, _index: usize) -> u32 {
        20
    }
}

#[derive(Default)]
struct Subscriptions {
    rows: usize,
}

impl VisibilityObserver<usize> for Subscriptions {
    fn subscribe(&mut self, target: ObserveTarget<'_, usize>) {
        if let ObserveTarget::Row { .. } = target {
            self.rows += 1;
        }
    }

    fn unsubscribe(&mut self, target: ObserveTarget<'_, usize>) {
        if let ObserveTarget::Row { .. } = target {
            self.rows -= 1;
        }
    }
}

fn main() {
    let lines: Vec<Line> = (0..100_000)
        .map(|i| Line {
            id: i,
            height: 20 + (i % 3) as u32 * 10,
        })
        .collect();

    let mut v = VisibleRender::new(
        lines,
        PrintRenderer,
        Subscriptions::default(),
        Viewport::new(0, 600),
        VisibleRenderOptions::new(),
    );
    println!(
        "total_height={} pages={} observed={}",
        v.pages().total_height(),
        v.pages().page_count(),
        v.observer().rows
    );

    v.on_row_intersections(&[IntersectionEntry::entered(0), IntersectionEntry::entered(1)]);

    for (i, top) in [200u64, 400, 600, 800].into_iter().enumerate() {
        v.on_scroll(top, i as u64 * 16);
    }
    v.tick(1_000);
    println!(
        "visible_page={:?} observed={}",
        v.pages().visible_page(),
        v.observer().rows
    );
    println!("{:?}", v.performance_data());
}
