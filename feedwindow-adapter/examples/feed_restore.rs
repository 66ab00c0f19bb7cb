use feedwindow::{Keyed, NoopObserver, Paginator, WindowOptions};
use feedwindow_adapter::{Engine, MemoryStore, ScrollAnchor};

#[derive(Clone, Debug)]
struct Post {
    id: u64,
}

impl Keyed for Post {
    type Id = u64;

    fn id(&self) -> Option<u64> {
        Some(self.id)
    }
}

struct Api {
    pages_left: usize,
    pending: bool,
}

impl Paginator for Api {
    fn has_more(&self) -> bool {
        self.pages_left > 0 && !self.pending
    }

    fn request_more(&mut self) {
        self.pending = true;
    }
}

fn page(n: u64) -> Vec<Post> {
    (0..(n + 1) * 20).map(|id| Post { id }).collect()
}

fn mount(store: &MemoryStore) -> Engine<Post> {
    let mut e = Engine::new(
        WindowOptions::feed(),
        NoopObserver,
        ScrollAnchor::feed(store.clone()),
    );
    e.set_viewport(800);
    e
}

fn main() {
    // Example: the scroll position survives a remount, and pagination fires near the end.
    let store = MemoryStore::new();
    let mut api = Api {
        pages_left: 2,
        pending: false,
    };

    {
        let mut e = mount(&store);
        e.set_items(&page(0));
        e.layout();
        e.on_scroll(6000);
        let range = e.layout();
        println!("first mount: off={} range={range:?}", e.scroll_offset());

        if e.poll_pagination(&mut api) {
            api.pending = false;
            api.pages_left -= 1;
            e.set_items(&page(1));
            println!("loaded page 1: rows={}", e.len());
        }
    }

    let mut e = mount(&store);
    e.set_items(&page(1));
    let range = e.layout();
    println!(
        "remount: restored={:?} range={range:?}",
        e.take_restored_offset()
    );
}
