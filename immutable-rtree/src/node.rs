//! Immutable tree nodes.
//!
//! A node is either a [`Leaf`] holding entries or a [`NonLeaf`] holding
//! child nodes. Nodes are never modified after construction: every mutation
//! builds new nodes along the affected path and shares all other subtrees
//! through [`Arc`] with previous versions of the tree.

use std::sync::Arc;

use crate::entry::Entry;
use crate::geometry::{mbr_of, Geometry, HasMbr, Rectangle, Shape};

/// Shared handle to a node. Cloning a `NodeRef` never copies the subtree.
pub type NodeRef<V, G = Geometry> = Arc<Node<V, G>>;

/// A tree node.
#[derive(Debug)]
pub enum Node<V, G = Geometry> {
    Leaf(Leaf<V, G>),
    NonLeaf(NonLeaf<V, G>),
}

/// A node holding entries directly.
#[derive(Debug)]
pub struct Leaf<V, G = Geometry> {
    entries: Vec<Entry<V, G>>,
    mbr: Rectangle,
}

/// A node holding child nodes. Its MBR is the union of its children's MBRs.
#[derive(Debug)]
pub struct NonLeaf<V, G = Geometry> {
    children: Vec<NodeRef<V, G>>,
    mbr: Rectangle,
}

impl<V, G: Shape> Leaf<V, G> {
    /// Builds a leaf over a non-empty list of entries.
    pub(crate) fn new(entries: Vec<Entry<V, G>>) -> Self {
        debug_assert!(!entries.is_empty(), "a leaf must hold at least one entry");
        let mbr = entries
            .iter()
            .map(Entry::mbr)
            .reduce(|acc, mbr| acc.add(&mbr))
            .unwrap_or_default();
        Self { entries, mbr }
    }
}

impl<V, G> Leaf<V, G> {
    pub fn entries(&self) -> &[Entry<V, G>] {
        &self.entries
    }

    pub fn mbr(&self) -> Rectangle {
        self.mbr
    }
}

impl<V, G> NonLeaf<V, G> {
    /// Builds a non-leaf over a non-empty list of children.
    pub(crate) fn new(children: Vec<NodeRef<V, G>>) -> Self {
        debug_assert!(!children.is_empty(), "a non-leaf must hold at least one child");
        let mbr = mbr_of(children.iter().map(|c| &**c)).unwrap_or_default();
        Self { children, mbr }
    }

    pub fn children(&self) -> &[NodeRef<V, G>] {
        &self.children
    }

    pub fn mbr(&self) -> Rectangle {
        self.mbr
    }
}

impl<V, G> Node<V, G> {
    /// Minimum bounding rectangle of everything under this node.
    pub fn mbr(&self) -> Rectangle {
        match self {
            Node::Leaf(leaf) => leaf.mbr,
            Node::NonLeaf(non_leaf) => non_leaf.mbr,
        }
    }

    /// Number of direct entries (leaf) or children (non-leaf).
    pub fn count(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.entries.len(),
            Node::NonLeaf(non_leaf) => non_leaf.children.len(),
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, Node::Leaf(_))
    }

    /// Direct entries if this is a leaf.
    pub fn entries(&self) -> Option<&[Entry<V, G>]> {
        match self {
            Node::Leaf(leaf) => Some(&leaf.entries),
            Node::NonLeaf(_) => None,
        }
    }

    /// Direct children if this is a non-leaf.
    pub fn children(&self) -> Option<&[NodeRef<V, G>]> {
        match self {
            Node::Leaf(_) => None,
            Node::NonLeaf(non_leaf) => Some(&non_leaf.children),
        }
    }

    /// Number of entries transitively reachable from this node.
    pub fn entry_count(&self) -> usize {
        match self {
            Node::Leaf(leaf) => leaf.entries.len(),
            Node::NonLeaf(non_leaf) => non_leaf.children.iter().map(|c| c.entry_count()).sum(),
        }
    }

    /// Height of the subtree rooted here; a leaf has depth 1.
    pub fn depth(&self) -> usize {
        match self {
            Node::Leaf(_) => 1,
            Node::NonLeaf(non_leaf) => {
                1 + non_leaf.children.first().map(|c| c.depth()).unwrap_or(0)
            }
        }
    }
}

impl<V: Clone, G: Clone> Node<V, G> {
    /// Appends clones of every entry under this node to `out`, in depth-first
    /// order.
    pub(crate) fn collect_entries(&self, out: &mut Vec<Entry<V, G>>) {
        match self {
            Node::Leaf(leaf) => out.extend(leaf.entries.iter().cloned()),
            Node::NonLeaf(non_leaf) => {
                for child in &non_leaf.children {
                    child.collect_entries(out);
                }
            }
        }
    }
}

impl<V, G: Shape> Node<V, G> {
    pub(crate) fn leaf(entries: Vec<Entry<V, G>>) -> NodeRef<V, G> {
        Arc::new(Node::Leaf(Leaf::new(entries)))
    }
}

impl<V, G> Node<V, G> {
    pub(crate) fn non_leaf(children: Vec<NodeRef<V, G>>) -> NodeRef<V, G> {
        Arc::new(Node::NonLeaf(NonLeaf::new(children)))
    }
}

impl<V, G> HasMbr for Node<V, G> {
    fn mbr(&self) -> Rectangle {
        Node::mbr(self)
    }
}

impl<V, G> HasMbr for Arc<Node<V, G>> {
    fn mbr(&self) -> Rectangle {
        Node::mbr(self)
    }
}

impl<V, G: Shape> HasMbr for Entry<V, G> {
    fn mbr(&self) -> Rectangle {
        Entry::mbr(self)
    }
}

impl<V, G> Shape for Node<V, G> {
    fn mbr(&self) -> Rectangle {
        Node::mbr(self)
    }

    fn distance(&self, rect: &Rectangle) -> f64 {
        Node::mbr(self).distance(rect)
    }

    fn intersects(&self, rect: &Rectangle) -> bool {
        Node::mbr(self).intersects(rect)
    }
}
