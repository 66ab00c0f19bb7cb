use crate::*;

use alloc::format;
use alloc::rc::Rc;
use alloc::string::String;
use alloc::vec;
use alloc::vec::Vec;
use core::cell::RefCell;

use feedwindow::{
    Align, GeometryUnavailable, Keyed, NoopObserver, Paginator, RowKey, RowObserver, RowRange,
    RowState, TreeItem, WindowOptions,
};
use proptest::prelude::*;

#[derive(Clone, Debug, PartialEq)]
struct Post {
    id: u64,
}

impl Keyed for Post {
    type Id = u64;

    fn id(&self) -> Option<u64> {
        Some(self.id)
    }
}

fn posts(ids: impl IntoIterator<Item = u64>) -> Vec<Post> {
    ids.into_iter().map(|id| Post { id }).collect()
}

#[derive(Clone, Debug, PartialEq)]
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

fn c(id: u32, replies: Vec<Comment>) -> Comment {
    Comment { id, replies }
}

const A: u32 = 1;
const B: u32 = 2;
const C: u32 = 3;
const D: u32 = 4;

// A -> [B, C], B -> [D]
fn thread() -> Vec<Comment> {
    vec![c(A, vec![c(B, vec![c(D, vec![])]), c(C, vec![])])]
}

#[derive(Debug)]
struct Log<Id> {
    observed: Vec<(usize, RowKey<Id>)>,
    disposed: Vec<(usize, RowKey<Id>)>,
}

/// Records observer calls in a log the test keeps a handle to after the engine is gone.
#[derive(Debug)]
struct SharedObserver<Id>(Rc<RefCell<Log<Id>>>);

impl<Id> SharedObserver<Id> {
    fn new() -> (Self, Rc<RefCell<Log<Id>>>) {
        let log = Rc::new(RefCell::new(Log {
            observed: Vec::new(),
            disposed: Vec::new(),
        }));
        (Self(Rc::clone(&log)), log)
    }
}

impl<Id: Clone> RowObserver<Id> for SharedObserver<Id> {
    fn observe(&mut self, index: usize, key: &RowKey<Id>) {
        self.0.borrow_mut().observed.push((index, key.clone()));
    }

    fn dispose(&mut self, index: usize, key: &RowKey<Id>) {
        self.0.borrow_mut().disposed.push((index, key.clone()));
    }
}

#[derive(Clone, Copy, Debug)]
struct BrokenStore;

impl SessionStore for BrokenStore {
    fn get(&self, _key: &str) -> Result<Option<String>, StoreError> {
        Err(StoreError::Unavailable)
    }

    fn set(&mut self, _key: &str, value: String) -> Result<(), StoreError> {
        Err(StoreError::Rejected(value))
    }
}

#[derive(Debug, Default)]
struct Pages {
    has_more: bool,
    requests: usize,
}

impl Paginator for Pages {
    fn has_more(&self) -> bool {
        self.has_more
    }

    fn request_more(&mut self) {
        self.requests += 1;
    }
}

fn range(start_index: usize, end_index: usize) -> Option<RowRange> {
    Some(RowRange {
        start_index,
        end_index,
    })
}

fn feed_engine(store: &MemoryStore) -> Engine<Post> {
    Engine::new(
        WindowOptions::feed(),
        NoopObserver,
        ScrollAnchor::feed(store.clone()),
    )
}

fn uniform_engine(size: u32, count: u64, viewport: u32) -> Engine<Post> {
    let mut e = Engine::new(
        WindowOptions::new(size),
        NoopObserver,
        ScrollAnchor::feed(MemoryStore::new()),
    );
    e.set_items(&posts(0..count));
    e.set_viewport(viewport);
    e
}

fn stored(store: &MemoryStore, key: &str) -> Option<String> {
    store.get(key).ok().flatten()
}

#[test]
fn restore_waits_for_rows_and_happens_once() {
    let mut store = MemoryStore::new();
    store.set(FEED_KEY, String::from("900")).unwrap();

    let mut e = feed_engine(&store);
    e.set_viewport(600);
    assert_eq!(e.layout(), None);
    assert!(!e.anchor().restore_attempted());

    // The host's initial zero event must not clobber the stored offset.
    e.on_scroll(0);
    assert_eq!(stored(&store, FEED_KEY).as_deref(), Some("900"));

    e.set_items(&posts(0..100));
    // 400px rows: the viewport spans rows 2..=3, plus 3 rows of overscan.
    assert_eq!(e.layout(), range(0, 6));
    assert_eq!(e.scroll_offset(), 900);
    assert_eq!(e.take_restored_offset(), Some(900));
    assert_eq!(e.take_restored_offset(), None);

    e.on_scroll(1200);
    e.layout();
    assert_eq!(e.scroll_offset(), 1200);
    assert_eq!(e.take_restored_offset(), None);
    assert_eq!(stored(&store, FEED_KEY).as_deref(), Some("1200"));
}

#[test]
fn remounted_engine_restores_the_last_saved_offset() {
    let store = MemoryStore::new();
    {
        let mut e = feed_engine(&store);
        e.set_viewport(600);
        e.set_items(&posts(0..50));
        e.layout();
        e.on_scroll(1234);
    }
    assert_eq!(stored(&store, FEED_KEY).as_deref(), Some("1234"));

    let mut e = feed_engine(&store);
    e.set_viewport(600);
    e.set_items(&posts(0..50));
    e.layout();
    assert_eq!(e.scroll_offset(), 1234);
}

#[test]
fn feed_and_comments_use_separate_keys() {
    let store = MemoryStore::new();
    let mut feed = ScrollAnchor::feed(store.clone());
    let mut comments = ScrollAnchor::comments(store.clone());
    feed.save(10);
    comments.save(20);

    assert_eq!(feed.restore(), Some(10));
    assert_eq!(comments.restore(), Some(20));
    assert_eq!(store.len(), 2);
}

#[test]
fn unparseable_values_restore_as_absent() {
    let mut store = MemoryStore::new();
    let anchor = ScrollAnchor::new(store.clone(), "k");
    assert_eq!(anchor.restore(), None);

    for (raw, expected) in [
        ("abc", None),
        ("", None),
        ("-3", None),
        ("NaN", None),
        ("inf", None),
        ("12.7", Some(12)),
        (" 42 ", Some(42)),
        ("0", Some(0)),
    ] {
        store.set("k", String::from(raw)).unwrap();
        assert_eq!(anchor.restore(), expected, "raw = {raw:?}");
    }
}

#[test]
fn take_restore_reads_the_store_once() {
    let mut store = MemoryStore::new();
    let mut anchor = ScrollAnchor::new(store.clone(), "k");
    store.set("k", String::from("5")).unwrap();

    assert_eq!(anchor.take_restore(), Some(5));
    assert!(anchor.restore_attempted());
    store.set("k", String::from("6")).unwrap();
    assert_eq!(anchor.take_restore(), None);
}

#[test]
fn unavailable_store_degrades_to_nothing_saved() {
    let mut e: Engine<Post, NoopObserver, BrokenStore> = Engine::new(
        WindowOptions::feed(),
        NoopObserver,
        ScrollAnchor::feed(BrokenStore),
    );
    e.set_viewport(600);
    e.set_items(&posts(0..10));

    assert_eq!(e.layout(), range(0, 4));
    assert!(e.anchor().restore_attempted());
    assert_eq!(e.take_restored_offset(), None);
    assert_eq!(e.scroll_offset(), 0);

    e.on_scroll(300);
    assert_eq!(e.scroll_offset(), 300);
}

#[test]
fn toggling_a_reply_invalidates_heights_from_the_toggled_row() {
    let (observer, log) = SharedObserver::<u32>::new();
    let mut e = Engine::new(
        WindowOptions::comments(),
        observer,
        ScrollAnchor::comments(MemoryStore::new()),
    );
    e.set_viewport(2000);
    e.set_tree(thread());
    assert_eq!(e.len(), 1);

    assert!(e.toggle_expand(&A));
    let keys: Vec<_> = e.rows().iter().map(|r| (r.key.clone(), r.depth)).collect();
    assert_eq!(
        keys,
        vec![(RowKey::Id(A), 0), (RowKey::Id(B), 1), (RowKey::Id(C), 1)]
    );

    assert_eq!(e.layout(), range(0, 2));
    for i in 0..3 {
        e.report_measured(i, 300);
    }
    assert_eq!(e.total_height(), 900);

    assert!(e.toggle_expand(&B));
    let keys: Vec<_> = e.rows().iter().map(|r| (r.key.clone(), r.depth)).collect();
    assert_eq!(
        keys,
        vec![
            (RowKey::Id(A), 0),
            (RowKey::Id(B), 1),
            (RowKey::Id(D), 2),
            (RowKey::Id(C), 1),
        ]
    );
    assert!(e.windower().is_measured(0));
    for i in 1..4 {
        assert!(!e.windower().is_measured(i), "row {i} kept a stale height");
    }
    // Estimates: B at depth 1 = 160, D at depth 2 = 170.
    assert_eq!(e.offset_of(2), 300 + 160);
    assert_eq!(e.offset_of(3), 300 + 160 + 170);

    // Recompute released every observation; the next layout observes the new rows.
    assert_eq!(log.borrow().disposed.len(), 3);
    assert_eq!(e.layout(), range(0, 3));
    assert_eq!(log.borrow().observed.len(), 3 + 4);
    assert_eq!(e.row_state(2), Some(RowState::Unmeasured));

    assert!(!e.toggle_expand(&A));
    assert_eq!(e.len(), 1);
    assert!(e.is_expanded(&B));
}

#[test]
fn max_depth_caps_the_rows_of_an_engine() {
    let mut e: Engine<Comment> = Engine::new(
        WindowOptions::comments().with_max_depth(1),
        NoopObserver,
        ScrollAnchor::comments(MemoryStore::new()),
    );
    e.set_tree(thread());
    e.set_expand_set([A, B].into_iter().collect());
    assert_eq!(e.len(), 3);

    e.set_max_depth(10);
    assert_eq!(e.len(), 4);
    assert_eq!(e.row(2).map(|r| r.depth), Some(2));
    assert_eq!(e.max_depth(), 10);
    assert_eq!(e.windower().options().max_depth, 10);

    e.set_max_depth(0);
    assert_eq!(e.len(), 1);
    assert_eq!(e.windower().options().max_depth, 0);
}

#[test]
fn overscan_changes_apply_at_the_next_layout() {
    let mut e = uniform_engine(100, 50, 300);
    e.on_scroll(1000);
    assert_eq!(e.layout(), range(7, 16));

    e.set_overscan(0);
    assert!(e.needs_layout());
    assert_eq!(e.windower().options().overscan, 0);
    assert_eq!(e.layout(), range(10, 13));
    assert_eq!(e.visible_range(), range(10, 13));
}

#[test]
fn appending_a_page_keeps_existing_measurements() {
    let (observer, log) = SharedObserver::<u64>::new();
    let mut e = Engine::new(
        WindowOptions::new(100),
        observer,
        ScrollAnchor::feed(MemoryStore::new()),
    );
    e.set_viewport(500);
    e.set_items(&posts(0..10));
    assert_eq!(e.layout(), range(0, 8));
    for i in 0..5 {
        e.report_measured(i, 120);
    }

    e.set_items(&posts(0..20));
    assert!((0..5).all(|i| e.windower().is_measured(i)));
    assert!(log.borrow().disposed.is_empty());
    assert_eq!(e.offset_of(10), 5 * 120 + 5 * 100);

    // Replacing row 2 drops it and everything after it.
    let mut changed = posts(0..20);
    changed[2].id = 99;
    e.set_items(&changed);
    assert!(e.windower().is_measured(1));
    assert!(!e.windower().is_measured(2));
    assert!(!e.windower().is_measured(4));
    assert_eq!(
        log.borrow().disposed.iter().map(|(i, _)| *i).collect::<Vec<_>>(),
        vec![2, 3, 4, 5, 6, 7, 8]
    );
}

#[test]
fn measurement_above_the_viewport_adjusts_scroll() {
    let mut e = uniform_engine(100, 50, 300);
    e.on_scroll(1000);
    assert_eq!(e.layout(), range(7, 16));

    assert_eq!(e.report_measured(8, 150), 50);
    assert_eq!(e.scroll_offset(), 1050);
    assert!(e.needs_layout());

    // Rows at or below the viewport top move nothing.
    assert_eq!(e.report_measured(14, 150), 0);
    assert_eq!(e.scroll_offset(), 1050);

    // Shrinking a row above pulls the viewport back.
    assert_eq!(e.report_measured(7, 60), -40);
    assert_eq!(e.scroll_offset(), 1010);
}

#[test]
fn scroll_adjustment_can_be_disabled() {
    let mut e: Engine<Post> = Engine::new(
        WindowOptions::new(100).with_adjust_scroll_on_resize(false),
        NoopObserver,
        ScrollAnchor::feed(MemoryStore::new()),
    );
    e.set_items(&posts(0..50));
    e.set_viewport(300);
    e.on_scroll(1000);
    e.layout();

    assert_eq!(e.report_measured(8, 150), 0);
    assert_eq!(e.scroll_offset(), 1000);
    assert_eq!(e.offset_of(9), 950);
}

#[test]
fn measurements_outside_the_rendered_range_are_ignored() {
    let mut e = uniform_engine(100, 50, 300);
    e.layout();
    assert_eq!(e.report_measured(40, 250), 0);
    assert!(!e.windower().is_measured(40));
    assert_eq!(e.total_height(), 5000);
}

#[test]
fn unavailable_geometry_keeps_the_row_pending() {
    let mut e = uniform_engine(100, 50, 300);
    e.layout();

    assert_eq!(e.report_geometry(2, Err(GeometryUnavailable)), 0);
    assert_eq!(e.report_measured(3, 0), 0);
    assert_eq!(e.row_state(2), Some(RowState::Unmeasured));
    assert_eq!(e.windower().item_size(2), Some(100));
    assert!(e.pending_measurements().any(|i| i == 2));

    e.report_measured(2, 130);
    assert_eq!(e.row_state(2), Some(RowState::Measured));
    assert!(!e.pending_measurements().any(|i| i == 2));
}

#[test]
fn stale_rows_are_measured_again() {
    let mut e = uniform_engine(100, 50, 300);
    e.layout();
    e.report_measured(1, 130);

    assert!(e.mark_stale(1));
    assert_eq!(e.row_state(1), Some(RowState::Stale));
    assert!(e.pending_measurements().any(|i| i == 1));
    assert!(!e.mark_stale(45));

    e.report_measured(1, 210);
    assert_eq!(e.row_state(1), Some(RowState::Measured));
    assert_eq!(e.offset_of(2), 310);
}

#[test]
fn teardown_releases_every_observation_once() {
    let (observer, log) = SharedObserver::<u64>::new();
    let mut e = Engine::new(
        WindowOptions::feed(),
        observer,
        ScrollAnchor::feed(MemoryStore::new()),
    );
    e.set_viewport(600);
    e.set_items(&posts(0..10));
    assert_eq!(e.layout(), range(0, 4));
    assert_eq!(log.borrow().observed.len(), 5);

    e.teardown();
    assert_eq!(log.borrow().disposed.len(), 5);
    assert!(e.is_empty());
    assert_eq!(e.total_height(), 0);

    e.teardown();
    drop(e);
    assert_eq!(log.borrow().disposed.len(), 5);
}

#[test]
fn dropping_the_engine_disposes_rendered_rows() {
    let (observer, log) = SharedObserver::<u64>::new();
    {
        let mut e = Engine::new(
            WindowOptions::feed(),
            observer,
            ScrollAnchor::feed(MemoryStore::new()),
        );
        e.set_viewport(600);
        e.set_items(&posts(0..10));
        e.layout();
    }
    let log = log.borrow();
    assert_eq!(log.disposed.len(), log.observed.len());
    assert_eq!(log.disposed.first(), Some(&(0, RowKey::Id(0))));
}

#[test]
fn pagination_fires_near_the_end_only_when_more_exists() {
    let mut e = uniform_engine(100, 20, 500);
    let mut pages = Pages {
        has_more: true,
        requests: 0,
    };

    assert!(!e.poll_pagination(&mut pages));
    e.layout();
    assert!(!e.poll_pagination(&mut pages));

    e.on_scroll(1500);
    e.layout();
    assert!(e.should_load_more(true));
    assert!(e.poll_pagination(&mut pages));
    assert_eq!(pages.requests, 1);

    pages.has_more = false;
    assert!(!e.poll_pagination(&mut pages));
    assert_eq!(pages.requests, 1);
}

#[test]
fn empty_feed_never_requests_more() {
    let mut e = uniform_engine(100, 0, 500);
    e.layout();
    assert_eq!(e.rendered_range(), None);
    assert!(!e.should_load_more(true));
}

#[test]
fn scroll_to_index_applies_the_aligned_offset() {
    let mut e = uniform_engine(100, 100, 500);
    assert_eq!(e.scroll_to_index(50, Align::Start), 5000);
    assert_eq!(e.scroll_offset(), 5000);
    assert_eq!(e.scroll_to_index(80, Align::End), 7600);
    assert_eq!(e.scroll_to_index(99, Align::Start), 9500);
    assert_eq!(e.visible_range(), range(92, 99));
}

#[test]
fn rendered_rows_come_with_their_geometry() {
    let mut e = uniform_engine(100, 50, 300);
    e.on_scroll(1000);
    e.layout();
    e.report_measured(10, 140);

    let mut seen = Vec::new();
    e.for_each_rendered(|row, geometry| seen.push((row.item.id, geometry.start, geometry.size)));
    assert_eq!(seen.len(), 10);
    assert_eq!(seen[3], (10, 1000, 140));
    assert_eq!(seen[4], (11, 1140, 100));
}

proptest! {
    #[test]
    fn prop_saved_offsets_round_trip(offset in any::<u64>()) {
        let mut anchor = ScrollAnchor::new(MemoryStore::new(), "k");
        anchor.save(offset);
        prop_assert_eq!(anchor.restore(), Some(offset));
    }

    #[test]
    fn prop_fractional_offsets_are_floored(offset in 0.0f64..1.0e12) {
        let mut store = MemoryStore::new();
        store.set("k", format!("{offset}")).unwrap();
        let anchor = ScrollAnchor::new(store, "k");
        prop_assert_eq!(anchor.restore(), Some(offset.floor() as u64));
    }
}
