use feedwindow::{Keyed, RowKey, RowObserver, TreeItem, WindowOptions};
use feedwindow_adapter::{Engine, MemoryStore, ScrollAnchor};

#[derive(Clone, Debug)]
struct Comment {
    id: u32,
    replies: Vec<Comment>,
}

impl Keyed for Comment {
    type Id = u32;

    fn id(&self) -> Option<u32> {
        Some(self.id)
    }
}

impl TreeItem for Comment {
    fn children(&self) -> &[Self] {
        &self.replies
    }
}

/// Stands in for a host resize observer.
#[derive(Default)]
struct PrintObserver {
    live: usize,
}

impl RowObserver<u32> for PrintObserver {
    fn observe(&mut self, index: usize, key: &RowKey<u32>) {
        self.live += 1;
        println!("  observe {index} {key:?} (live={})", self.live);
    }

    fn dispose(&mut self, index: usize, key: &RowKey<u32>) {
        self.live -= 1;
        println!("  dispose {index} {key:?} (live={})", self.live);
    }
}

fn main() {
    let thread = vec![Comment {
        id: 1,
        replies: vec![
            Comment {
                id: 2,
                replies: vec![Comment {
                    id: 4,
                    replies: vec![],
                }],
            },
            Comment {
                id: 3,
                replies: vec![],
            },
        ],
    }];

    let mut e = Engine::new(
        WindowOptions::comments(),
        PrintObserver::default(),
        ScrollAnchor::comments(MemoryStore::new()),
    );
    e.set_viewport(1200);
    e.set_tree(thread);
    e.toggle_expand(&1);

    println!("layout: {:?}", e.layout());
    // A host would read real geometry here.
    let pending: Vec<usize> = e.pending_measurements().collect();
    for index in pending {
        e.report_measured(index, 180 + index as u32 * 20);
    }

    e.toggle_expand(&2);
    println!("after expanding 2: {:?}", e.layout());
    e.for_each_rendered(|row, geometry| {
        println!(
            "{:indent$}#{:?} at {} ({}px)",
            "",
            row.key,
            geometry.start,
            geometry.size,
            indent = row.depth * 2
        );
    });

    println!("teardown:");
    e.teardown();
}
