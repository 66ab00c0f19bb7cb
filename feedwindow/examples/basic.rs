use feedwindow::{Align, WindowOptions, Windower};

fn main() {
    // Example: a 1000-post feed with the default 400px estimate.
    let mut w = Windower::new(WindowOptions::feed());
    w.set_count(1000);

    let range = w.visible_range(600, 0, w.overscan());
    println!("initial: range={range:?} total={}", w.total_height());

    // Reported heights replace estimates; later offsets shift on the next query.
    w.measure(0, 520);
    w.measure(1, 310);
    println!(
        "after measuring: offset_of(2)={} total={}",
        w.offset_of(2),
        w.total_height()
    );

    // Noise within the drift tolerance does not invalidate anything.
    let delta = w.measure(0, 523);
    println!("re-measure within tolerance: delta={delta:?}");

    let to = w.scroll_to_index_offset(250, Align::Center, 600, 0);
    let range = w.visible_range(600, to, w.overscan());
    println!("scroll_to_index(250, Center): off={to} range={range:?}");

    if let Some(range) = range {
        w.for_each_row(range, |row| {
            println!("  row {} at {}..{}", row.index, row.start, row.end());
        });
    }
}
