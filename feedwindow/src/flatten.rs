use alloc::vec;
use alloc::vec::Vec;
use core::slice;

use crate::key::{IdSet, RowId};
use crate::RowKey;

/// An item with a (possibly missing) stable identifier.
pub trait Keyed {
    type Id: RowId;

    /// `None` marks malformed input; the row falls back to a positional key.
    fn id(&self) -> Option<Self::Id>;
}

/// An item that carries an ordered list of child items (e.g. a comment and its replies).
pub trait TreeItem: Keyed + Sized {
    fn children(&self) -> &[Self];
}

/// One visible row of a flattened list.
///
/// `item` is a clone of the source item; wrap heavy nodes in `Arc` to keep this cheap.
#[derive(Clone, Debug, PartialEq)]
pub struct FlatRow<T: Keyed> {
    pub key: RowKey<T::Id>,
    pub depth: usize,
    pub parent: Option<RowKey<T::Id>>,
    pub has_children: bool,
    pub item: T,
}

/// Identifiers of items whose children are currently shown.
///
/// Only explicit calls mutate the set; nothing is inferred from the data.
#[derive(Clone, Debug)]
pub struct ExpandSet<Id: RowId> {
    ids: IdSet<Id>,
}

impl<Id: RowId> Default for ExpandSet<Id> {
    fn default() -> Self {
        Self {
            ids: IdSet::default(),
        }
    }
}

impl<Id: RowId> ExpandSet<Id> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, id: &Id) -> bool {
        self.ids.contains(id)
    }

    /// Flips `id` and returns whether it is now expanded.
    pub fn toggle(&mut self, id: Id) -> bool {
        if self.ids.remove(&id) {
            false
        } else {
            self.ids.insert(id);
            true
        }
    }

    pub fn insert(&mut self, id: Id) -> bool {
        self.ids.insert(id)
    }

    pub fn remove(&mut self, id: &Id) -> bool {
        self.ids.remove(id)
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Id> {
        self.ids.iter()
    }
}

impl<Id: RowId> FromIterator<Id> for ExpandSet<Id> {
    fn from_iter<I: IntoIterator<Item = Id>>(iter: I) -> Self {
        Self {
            ids: iter.into_iter().collect(),
        }
    }
}

fn row_key<Id>(id: Option<Id>, position: usize) -> RowKey<Id> {
    match id {
        Some(id) => RowKey::Id(id),
        None => RowKey::Position(position),
    }
}

/// Wraps a flat feed as depth-0 rows.
pub fn flatten_items<T: Keyed + Clone>(items: &[T]) -> Vec<FlatRow<T>> {
    items
        .iter()
        .enumerate()
        .map(|(i, item)| FlatRow {
            key: row_key(item.id(), i),
            depth: 0,
            parent: None,
            has_children: false,
            item: item.clone(),
        })
        .collect()
}

struct Frame<'a, T: Keyed> {
    siblings: slice::Iter<'a, T>,
    depth: usize,
    parent: Option<RowKey<T::Id>>,
}

/// Flattens a forest into pre-order rows.
///
/// A node's children are emitted iff its id is in `expanded` and the node sits above
/// `max_depth`; the node itself is always emitted. A node whose id already appears on its
/// ancestor path is skipped together with its subtree. The traversal uses an explicit stack,
/// so arbitrarily deep input cannot exhaust the call stack.
///
/// The output is a pure function of the three inputs.
pub fn flatten<T: TreeItem + Clone>(
    roots: &[T],
    expanded: &ExpandSet<T::Id>,
    max_depth: usize,
) -> Vec<FlatRow<T>> {
    let mut out = Vec::new();
    let mut stack = vec![Frame {
        siblings: roots.iter(),
        depth: 0,
        parent: None,
    }];
    // Ids of the nodes that opened each non-root frame, and the same ids as a set.
    let mut path: Vec<T::Id> = Vec::new();
    let mut ancestors: IdSet<T::Id> = IdSet::default();

    while let Some(frame) = stack.last_mut() {
        let Some(node) = frame.siblings.next() else {
            stack.pop();
            if let Some(id) = path.pop() {
                ancestors.remove(&id);
            }
            continue;
        };
        let depth = frame.depth;
        let parent = frame.parent.clone();

        let id = node.id();
        if let Some(id) = &id {
            if ancestors.contains(id) {
                vwarn!(?id, depth, "flatten: skipping node that repeats an ancestor id");
                continue;
            }
        }

        let children = node.children();
        let key = row_key(id.clone(), out.len());
        let open = depth < max_depth
            && !children.is_empty()
            && id.as_ref().is_some_and(|id| expanded.contains(id));

        out.push(FlatRow {
            key: key.clone(),
            depth,
            parent,
            has_children: !children.is_empty(),
            item: node.clone(),
        });

        if let (true, Some(id)) = (open, id) {
            ancestors.insert(id.clone());
            path.push(id);
            stack.push(Frame {
                siblings: children.iter(),
                depth: depth + 1,
                parent: Some(key),
            });
        }
    }

    out
}

/// Index of the first row whose key or depth differs between two row sequences.
///
/// Returns `None` when the sequences are identical.
pub fn first_divergence<T: Keyed>(old: &[FlatRow<T>], new: &[FlatRow<T>]) -> Option<usize> {
    let common = old.len().min(new.len());
    old.iter()
        .zip(new)
        .position(|(a, b)| a.key != b.key || a.depth != b.depth)
        .or_else(|| (old.len() != new.len()).then_some(common))
}
