//! Deletion with condensation and reinsertion.
//!
//! Removal probes every child whose MBR intersects the target entry. On the
//! way back up, any rebuilt child that fell below `min_children` is dropped
//! from its parent and all entries still reachable under it are collected as
//! orphans. Once the root is known, single-child non-leaf roots collapse and
//! the orphans are reinserted one at a time in the order they were collected.

use crate::context::Context;
use crate::entry::Entry;
use crate::geometry::{Rectangle, Shape};
use crate::insert;
use crate::node::{Node, NodeRef};

/// Result of a delete that found at least one matching entry.
pub(crate) struct Deletion<V, G> {
    pub(crate) root: Option<NodeRef<V, G>>,
    pub(crate) removed: usize,
}

struct Removal<V, G> {
    node: Option<NodeRef<V, G>>,
    orphans: Vec<Entry<V, G>>,
    removed: usize,
}

/// Removes the first entry equal to `target`, or every equal entry when
/// `all` is set. Returns `None` when nothing matched.
pub(crate) fn delete<V, G>(
    root: &NodeRef<V, G>,
    target: &Entry<V, G>,
    all: bool,
    context: &Context,
) -> Option<Deletion<V, G>>
where
    V: Clone + PartialEq,
    G: Shape + Clone + PartialEq,
{
    let Removal {
        node,
        orphans,
        removed,
    } = remove(root, target, &target.mbr(), all, context)?;

    let mut root = node.map(collapse);
    if !orphans.is_empty() {
        log::debug!("condensed tree, reinserting {} orphaned entries", orphans.len());
    }
    for orphan in orphans {
        root = Some(insert::insert(root.as_ref(), orphan, context));
    }
    Some(Deletion { root, removed })
}

fn remove<V, G>(
    node: &NodeRef<V, G>,
    target: &Entry<V, G>,
    target_mbr: &Rectangle,
    all: bool,
    context: &Context,
) -> Option<Removal<V, G>>
where
    V: Clone + PartialEq,
    G: Shape + Clone + PartialEq,
{
    match &**node {
        Node::Leaf(leaf) => {
            let mut kept = Vec::with_capacity(leaf.entries().len());
            let mut removed = 0;
            for entry in leaf.entries() {
                if entry == target && (all || removed == 0) {
                    removed += 1;
                } else {
                    kept.push(entry.clone());
                }
            }
            if removed == 0 {
                return None;
            }
            let node = if kept.is_empty() {
                None
            } else {
                Some(Node::leaf(kept))
            };
            Some(Removal {
                node,
                orphans: Vec::new(),
                removed,
            })
        }
        Node::NonLeaf(non_leaf) => {
            let mut children: Vec<NodeRef<V, G>> = Vec::with_capacity(non_leaf.children().len());
            let mut orphans = Vec::new();
            let mut removed = 0;

            for child in non_leaf.children() {
                let probe = (all || removed == 0) && child.mbr().intersects(target_mbr);
                let outcome = if probe {
                    remove(child, target, target_mbr, all, context)
                } else {
                    None
                };
                match outcome {
                    None => children.push(child.clone()),
                    Some(removal) => {
                        removed += removal.removed;
                        orphans.extend(removal.orphans);
                        match removal.node {
                            Some(rebuilt) if rebuilt.count() >= context.min_children() => {
                                children.push(rebuilt)
                            }
                            Some(underfull) => {
                                log::trace!("dropping underfull node with {} children", underfull.count());
                                underfull.collect_entries(&mut orphans);
                            }
                            None => {}
                        }
                    }
                }
            }

            if removed == 0 {
                return None;
            }
            let node = if children.is_empty() {
                None
            } else {
                Some(Node::non_leaf(children))
            };
            Some(Removal {
                node,
                orphans,
                removed,
            })
        }
    }
}

/// Replaces non-leaf roots holding a single child by that child.
fn collapse<V, G>(mut root: NodeRef<V, G>) -> NodeRef<V, G> {
    loop {
        let only_child = match root.children() {
            Some([only]) => only.clone(),
            _ => return root,
        };
        log::debug!("root collapsed, tree height is now {}", only_child.depth());
        root = only_child;
    }
}
