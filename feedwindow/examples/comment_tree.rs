use feedwindow::{ExpandSet, Keyed, TreeItem, WindowOptions, Windower, first_divergence, flatten};

#[derive(Clone, Debug)]
struct Comment {
    id: u32,
    body: &'static str,
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

fn comment(id: u32, body: &'static str, replies: Vec<Comment>) -> Comment {
    Comment { id, body, replies }
}

fn main() {
    let thread = vec![
        comment(
            1,
            "first!",
            vec![
                comment(2, "reply", vec![comment(4, "nested reply", vec![])]),
                comment(3, "another reply", vec![]),
            ],
        ),
        comment(5, "second thread", vec![]),
    ];

    let options = WindowOptions::comments();
    let mut expanded = ExpandSet::new();
    expanded.insert(1);
    let rows = flatten(&thread, &expanded, options.max_depth);

    let mut w = Windower::new(options);
    w.set_rows(rows.iter().map(|row| row.depth));
    for (i, row) in rows.iter().enumerate() {
        println!(
            "{:indent$}{} ({}px)",
            "",
            row.item.body,
            w.offset_of(i),
            indent = row.depth * 2
        );
    }

    // Expanding a reply inserts its subtree; heights from the first moved row onward are
    // no longer valid.
    expanded.toggle(2);
    let next = flatten(&thread, &expanded, options.max_depth);
    let pivot = first_divergence(&rows, &next);
    w.set_rows(next.iter().map(|row| row.depth));
    if let Some(pivot) = pivot {
        let cleared = w.invalidate_from(pivot);
        println!("expanded 2: pivot={pivot} cleared={cleared}");
    }
    println!("rows={} total={}", next.len(), w.total_height());
}
