// Example: pin rows so visibility changes never clear them.
use visible_render::RangeManager;

fn main() {
    let mut pins = RangeManager::new();
    pins.set_range("header", 0, 2).expect("valid range");
    pins.set_range("selection", 40, 60).expect("valid range");
    pins.set_range("selection", 61, 80).expect("valid range");
    println!("selection: {:?}", pins.ranges("selection"));

    pins.remove_range_in_region("selection", 50, 55)
        .expect("valid range");
    println!("after unpin: {:?}", pins.ranges("selection"));

    // Three rows inserted at the top shift every pin down.
    pins.update_ranges(|pos| Some(pos + 3));
    for (key, intervals) in pins.iter() {
        println!("{key}: {intervals:?}");
    }
    println!("row 5 pinned: {}", pins.is_in_range(5));
    println!("negative range: {:?}", pins.set_range("bad", -1, 3));
}
