//! Path-copying insertion.
//!
//! The descent records every non-leaf on the way down together with the
//! index of the child that was chosen. After the entry is appended to the
//! reached leaf, the path is rebuilt bottom-up: each ancestor is recreated
//! with its chosen child replaced by one node, or by two when the child
//! overflowed and was split. Siblings off the path are shared, never copied.

use crate::context::Context;
use crate::entry::Entry;
use crate::geometry::Shape;
use crate::node::{Node, NodeRef, NonLeaf};

/// Inserts `entry` below `root` and returns the root of the new version.
pub(crate) fn insert<V, G>(
    root: Option<&NodeRef<V, G>>,
    entry: Entry<V, G>,
    context: &Context,
) -> NodeRef<V, G>
where
    V: Clone,
    G: Shape + Clone,
{
    let root = match root {
        Some(root) => root,
        None => return Node::leaf(vec![entry]),
    };

    let mbr = entry.mbr();
    let mut path: Vec<(&NonLeaf<V, G>, usize)> = Vec::new();
    let mut node = root;
    let leaf = loop {
        match &**node {
            Node::Leaf(leaf) => break leaf,
            Node::NonLeaf(non_leaf) => {
                let index = context.selector().select(&mbr, non_leaf.children());
                log::trace!("descending into child {} of {}", index, non_leaf.children().len());
                path.push((non_leaf, index));
                node = &non_leaf.children()[index];
            }
        }
    };

    let mut entries = Vec::with_capacity(leaf.entries().len() + 1);
    entries.extend_from_slice(leaf.entries());
    entries.push(entry);
    let mut replacement = leaves(entries, context);

    while let Some((parent, index)) = path.pop() {
        let siblings = parent.children();
        let mut children = Vec::with_capacity(siblings.len() + 1);
        children.extend(siblings[..index].iter().cloned());
        children.extend(replacement);
        children.extend(siblings[index + 1..].iter().cloned());
        replacement = non_leaves(children, context);
    }

    grow(replacement)
}

/// Builds one leaf over `entries`, or two when they overflow.
pub(crate) fn leaves<V, G: Shape>(entries: Vec<Entry<V, G>>, context: &Context) -> Vec<NodeRef<V, G>> {
    if entries.len() <= context.max_children() {
        return vec![Node::leaf(entries)];
    }
    let (first, second) = context
        .splitter()
        .split(entries, context.min_children())
        .into_groups();
    vec![Node::leaf(first), Node::leaf(second)]
}

/// Builds one non-leaf over `children`, or two when they overflow.
pub(crate) fn non_leaves<V, G>(children: Vec<NodeRef<V, G>>, context: &Context) -> Vec<NodeRef<V, G>> {
    if children.len() <= context.max_children() {
        return vec![Node::non_leaf(children)];
    }
    let (first, second) = context
        .splitter()
        .split(children, context.min_children())
        .into_groups();
    vec![Node::non_leaf(first), Node::non_leaf(second)]
}

/// Turns the rebuilt top level into a root, adding a level when it split.
fn grow<V, G>(mut top: Vec<NodeRef<V, G>>) -> NodeRef<V, G> {
    if top.len() == 1 {
        if let Some(root) = top.pop() {
            return root;
        }
    }
    let root = Node::non_leaf(top);
    log::debug!("root split, tree height is now {}", root.depth());
    root
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Geometry, Rectangle};
    use std::sync::Arc;

    fn entry(n: i32) -> Entry<i32> {
        let x = n as f64;
        Entry::new(n, Geometry::rectangle(x, x, x + 1.0, x + 1.0))
    }

    fn build(values: impl IntoIterator<Item = i32>, context: &Context) -> NodeRef<i32> {
        let mut root: Option<NodeRef<i32>> = None;
        for n in values {
            root = Some(insert(root.as_ref(), entry(n), context));
        }
        root.unwrap()
    }

    #[test]
    fn test_insert_into_empty_creates_leaf() {
        let root = insert(None, entry(1), &Context::default());
        assert!(root.is_leaf());
        assert_eq!(root.count(), 1);
        assert_eq!(root.mbr(), Rectangle::new(1.0, 1.0, 2.0, 2.0));
    }

    #[test]
    fn test_overflowing_root_leaf_splits() {
        let context = Context::default();
        let root = build(1..=4, &context);
        assert!(root.is_leaf());

        let root = insert(Some(&root), entry(5), &context);
        assert!(!root.is_leaf());
        assert_eq!(root.count(), 2);
        assert_eq!(root.entry_count(), 5);
        assert_eq!(root.depth(), 2);
        for child in root.children().unwrap() {
            assert!(child.count() >= context.min_children());
        }
    }

    #[test]
    fn test_untouched_subtrees_are_shared() {
        let context = Context::default();
        let before = build([1, 2, 3, 100, 101, 102], &context);
        let after = insert(Some(&before), entry(4), &context);

        let old_children = before.children().unwrap();
        let new_children = after.children().unwrap();
        let shared = new_children
            .iter()
            .filter(|c| old_children.iter().any(|o| Arc::ptr_eq(o, c)))
            .count();
        assert_eq!(shared, new_children.len() - 1);
        // the old version is untouched
        assert_eq!(before.entry_count(), 6);
        assert_eq!(after.entry_count(), 7);
    }

    #[test]
    fn test_height_grows_with_splits() {
        let context = Context::default();
        let root = build(0..100, &context);
        assert_eq!(root.entry_count(), 100);
        assert!(root.depth() >= 3);
        assert_eq!(root.mbr(), Rectangle::new(0.0, 0.0, 100.0, 100.0));
    }

    #[test]
    fn test_star_context_inserts() {
        let context = Context::star();
        let root = build((0..50).rev(), &context);
        assert_eq!(root.entry_count(), 50);
    }
}
