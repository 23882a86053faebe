// Example: a long jump rebuilds pages around the landing offset only.
use visible_render::{PageConfig, PageManager, ScrollConfig, ScrollKind, ScrollManager};

fn main() {
    let heights: Vec<u32> = (0..1_000_000u32).map(|i| 24 + i % 17).collect();
    let mut pages = PageManager::new(800, PageConfig::default());
    pages.calculate_pages_from_heights(heights);
    println!("full partition: {} pages", pages.page_count());

    let mut scroll = ScrollManager::new(ScrollConfig::default());
    let target = pages.total_height() / 2;
    if let ScrollKind::LongJump { rows, .. } = scroll.handle_scroll(target, 0, &mut pages) {
        println!("jumped to {target}: rows {rows:?}, {} pages", pages.page_count());
    }
    let event = pages.update_visible_page(target);
    println!("page change: {event:?}");

    scroll.handle_scroll(target + 100, 50, &mut pages);
    println!("settled at 100ms: {}", scroll.tick(100));
    println!("settled at 200ms: {}", scroll.tick(200));
}
