//! The persistent tree handle.

use std::borrow::Borrow;
use std::fmt::{self, Debug, Display};
use std::sync::Arc;

use crate::context::Context;
use crate::delete;
use crate::entry::Entry;
use crate::geometry::{mbr_of, Geometry, Rectangle, Shape};
use crate::insert;
use crate::nearest;
use crate::node::{Node, NodeRef};
use crate::search::{self, Flow, Search, SearchState};

/// An immutable R-tree.
///
/// Every mutating method returns a new tree and leaves `self` untouched.
/// The new version shares every subtree the mutation did not reach, so
/// keeping old versions around costs only the rebuilt path. Cloning a tree
/// is a reference count increment.
///
/// # Examples
///
/// ```rust
/// use immutable_rtree::{Geometry, Rectangle, RTree};
///
/// let empty: RTree<&str> = RTree::new();
/// let one = empty.add("a", Geometry::point(1.0, 1.0));
/// let two = one.add("b", Geometry::point(5.0, 5.0));
///
/// assert_eq!(empty.size(), 0);
/// assert_eq!(one.size(), 1);
/// assert_eq!(two.size(), 2);
///
/// let hits: Vec<_> = two
///     .search_intersecting(Rectangle::new(0.0, 0.0, 2.0, 2.0))
///     .map(|entry| *entry.value())
///     .collect();
/// assert_eq!(hits, vec!["a"]);
/// ```
pub struct RTree<V, G = Geometry> {
    root: Option<NodeRef<V, G>>,
    context: Arc<Context>,
    size: usize,
}

impl<V, G> Clone for RTree<V, G> {
    fn clone(&self) -> Self {
        RTree {
            root: self.root.clone(),
            context: self.context.clone(),
            size: self.size,
        }
    }
}

impl<V, G> Default for RTree<V, G> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V, G> Debug for RTree<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RTree")
            .field("size", &self.size)
            .field("depth", &self.depth())
            .field("context", &self.context)
            .finish()
    }
}

impl<V, G> RTree<V, G> {
    /// Empty tree with the default context.
    pub fn new() -> Self {
        Self::with_context(Context::default_context())
    }

    /// Empty tree in R*-tree mode.
    pub fn star() -> Self {
        Self::with_context(Context::star())
    }

    pub fn with_context(context: Context) -> Self {
        Self::with_shared_context(Arc::new(context))
    }

    /// Empty tree sharing an existing context allocation.
    pub fn with_shared_context(context: Arc<Context>) -> Self {
        RTree {
            root: None,
            context,
            size: 0,
        }
    }

    pub(crate) fn from_parts(root: Option<NodeRef<V, G>>, context: Arc<Context>, size: usize) -> Self {
        RTree { root, context, size }
    }

    fn with_root(&self, root: Option<NodeRef<V, G>>, size: usize) -> Self {
        Self::from_parts(root, self.context.clone(), size)
    }

    /// Number of entries.
    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    pub fn root(&self) -> Option<&NodeRef<V, G>> {
        self.root.as_ref()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn shared_context(&self) -> &Arc<Context> {
        &self.context
    }

    /// MBR of the whole tree, `None` when empty.
    pub fn mbr(&self) -> Option<Rectangle> {
        self.root.as_ref().map(|root| root.mbr())
    }

    /// Number of levels; 0 for an empty tree, 1 for a single leaf.
    pub fn depth(&self) -> usize {
        self.root.as_ref().map_or(0, |root| root.depth())
    }

    /// Whether both handles point at the same version.
    pub fn same_version(&self, other: &RTree<V, G>) -> bool {
        match (&self.root, &other.root) {
            (Some(a), Some(b)) => Arc::ptr_eq(a, b),
            (None, None) => Arc::ptr_eq(&self.context, &other.context),
            _ => false,
        }
    }

    /// Lazily searches for entries whose geometry satisfies `predicate`,
    /// pruning every subtree whose node fails it.
    pub fn search<P>(&self, predicate: P) -> Search<V, G, P>
    where
        P: Fn(&dyn Shape) -> bool,
    {
        Search::new(self.root.as_ref(), predicate)
    }

    /// Pushes every match to `sink` until it returns [`Flow::Stop`].
    pub fn search_with<P, F>(&self, predicate: P, sink: F) -> Flow
    where
        P: Fn(&dyn Shape) -> bool,
        F: FnMut(&Entry<V, G>) -> Flow,
        G: Shape,
    {
        SearchState::new(self.root.as_ref(), &predicate).drive(&predicate, sink)
    }

    /// Counts nodes and entries.
    pub fn stats(&self) -> TreeStats {
        let mut stats = TreeStats {
            depth: self.depth(),
            ..TreeStats::default()
        };
        if let Some(root) = &self.root {
            collect_stats(root, &mut stats);
        }
        stats
    }
}

impl<V, G> RTree<V, G>
where
    V: Clone,
    G: Shape + Clone,
{
    /// Returns a new tree holding `entry` as well.
    pub fn insert(&self, entry: Entry<V, G>) -> Self {
        let root = insert::insert(self.root.as_ref(), entry, &self.context);
        self.with_root(Some(root), self.size + 1)
    }

    pub fn add(&self, value: V, geometry: impl Into<G>) -> Self {
        self.insert(Entry::new(value, geometry.into()))
    }

    /// Inserts every entry in order.
    pub fn insert_all<I>(&self, entries: I) -> Self
    where
        I: IntoIterator<Item = Entry<V, G>>,
    {
        let mut root = self.root.clone();
        let mut size = self.size;
        for entry in entries {
            root = Some(insert::insert(root.as_ref(), entry, &self.context));
            size += 1;
        }
        self.with_root(root, size)
    }

    /// Every entry, in depth-first order.
    pub fn entries(&self) -> Search<V, G, impl Fn(&dyn Shape) -> bool> {
        self.search(search::always())
    }

    /// Entries whose geometry intersects `rect`.
    pub fn search_intersecting(&self, rect: Rectangle) -> Search<V, G, impl Fn(&dyn Shape) -> bool> {
        self.search(search::intersects(rect))
    }

    /// Entries whose geometry is closer than `distance` to `rect`.
    pub fn search_within_distance(
        &self,
        rect: Rectangle,
        distance: f64,
    ) -> Search<V, G, impl Fn(&dyn Shape) -> bool> {
        self.search(search::within_distance(rect, distance))
    }

    /// Up to `k` entries no farther than `max_distance` from `query`,
    /// nearest first.
    ///
    /// The cap is inclusive: an entry exactly `max_distance` away is
    /// returned, unlike [`RTree::search_within_distance`] which only keeps
    /// entries strictly closer than its distance.
    pub fn nearest(&self, query: &Rectangle, max_distance: f64, k: usize) -> Vec<Entry<V, G>> {
        self.nearest_with_distances(query, max_distance, k)
            .into_iter()
            .map(|(entry, _)| entry)
            .collect()
    }

    /// Like [`RTree::nearest`], keeping each entry's distance.
    pub fn nearest_with_distances(&self, query: &Rectangle, max_distance: f64, k: usize) -> Vec<(Entry<V, G>, f64)> {
        nearest::nearest(self.root.as_ref(), query, max_distance, k)
    }

    /// Walks the whole tree and reports every structural violation.
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut report = IntegrityReport::new();
        let mut walk = IntegrityWalk {
            context: &self.context,
            leaf_level: None,
            entries: 0,
            report: &mut report,
        };
        if let Some(root) = &self.root {
            walk.check(root, 0);
        }
        let entries = walk.entries;
        if entries != self.size {
            report.entry_count_mismatch = true;
            report.errors.push(format!(
                "tree reports {} entries but holds {}",
                self.size, entries
            ));
        }
        report.is_valid = report.errors.is_empty();
        report
    }
}

impl<V, G> RTree<V, G>
where
    V: Clone + PartialEq,
    G: Shape + Clone + PartialEq,
{
    /// Removes one entry equal to `entry`. Returns the same version when
    /// there is none.
    pub fn delete(&self, entry: &Entry<V, G>) -> Self {
        self.delete_with(entry, false)
    }

    /// Removes one entry equal to `entry`, or all of them when `all` is set.
    pub fn delete_with(&self, entry: &Entry<V, G>, all: bool) -> Self {
        let Some(root) = &self.root else {
            return self.clone();
        };
        match delete::delete(root, entry, all, &self.context) {
            Some(deletion) => self.with_root(deletion.root, self.size - deletion.removed),
            None => self.clone(),
        }
    }

    /// Removes the entry built from `value` and `geometry`.
    pub fn remove(&self, value: V, geometry: impl Into<G>) -> Self {
        self.delete(&Entry::new(value, geometry.into()))
    }

    /// Deletes every given entry in order, one occurrence each.
    pub fn delete_all<I>(&self, entries: I) -> Self
    where
        I: IntoIterator,
        I::Item: Borrow<Entry<V, G>>,
    {
        entries
            .into_iter()
            .fold(self.clone(), |tree, entry| tree.delete(entry.borrow()))
    }
}

/// Node and entry counts of one tree version.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TreeStats {
    pub entries: usize,
    pub leaves: usize,
    pub non_leaves: usize,
    pub depth: usize,
}

fn collect_stats<V, G>(node: &NodeRef<V, G>, stats: &mut TreeStats) {
    match &**node {
        Node::Leaf(leaf) => {
            stats.leaves += 1;
            stats.entries += leaf.entries().len();
        }
        Node::NonLeaf(non_leaf) => {
            stats.non_leaves += 1;
            for child in non_leaf.children() {
                collect_stats(child, stats);
            }
        }
    }
}

/// Result of [`RTree::check_integrity`].
#[derive(Debug, Clone)]
pub struct IntegrityReport {
    /// Total nodes visited
    pub nodes_checked: u64,
    /// Nodes holding fewer or more children than the context allows
    pub bound_violations: u64,
    /// Nodes whose MBR is not the union of their contents
    pub mbr_mismatches: u64,
    /// Leaves found at a different depth than the first leaf
    pub unbalanced_leaves: u64,
    /// Whether the recorded size differs from the reachable entries
    pub entry_count_mismatch: bool,
    /// Summary of findings
    pub is_valid: bool,
    /// Detailed error messages
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self {
            nodes_checked: 0,
            bound_violations: 0,
            mbr_mismatches: 0,
            unbalanced_leaves: 0,
            entry_count_mismatch: false,
            is_valid: true,
            errors: Vec::new(),
        }
    }
}

impl Default for IntegrityReport {
    fn default() -> Self {
        Self::new()
    }
}

struct IntegrityWalk<'a> {
    context: &'a Context,
    leaf_level: Option<usize>,
    entries: usize,
    report: &'a mut IntegrityReport,
}

impl IntegrityWalk<'_> {
    fn check<V, G: Shape>(&mut self, node: &NodeRef<V, G>, level: usize) {
        self.report.nodes_checked += 1;
        let count = node.count();
        let (min, max) = (self.context.min_children(), self.context.max_children());

        let lower_ok = if level == 0 {
            count >= 1 && (node.is_leaf() || count >= 2)
        } else {
            count >= min
        };
        if !lower_ok || count > max {
            self.report.bound_violations += 1;
            self.report.errors.push(format!(
                "node at level {} holds {} items, allowed {}..={}",
                level, count, min, max
            ));
        }

        let expected = match &**node {
            Node::Leaf(leaf) => {
                self.entries += leaf.entries().len();
                match self.leaf_level {
                    None => self.leaf_level = Some(level),
                    Some(first) if first != level => {
                        self.report.unbalanced_leaves += 1;
                        self.report
                            .errors
                            .push(format!("leaf at level {} but first leaf at level {}", level, first));
                    }
                    Some(_) => {}
                }
                mbr_of(leaf.entries().iter().map(|e| e.geometry()))
            }
            Node::NonLeaf(non_leaf) => {
                for child in non_leaf.children() {
                    self.check(child, level + 1);
                }
                mbr_of(non_leaf.children().iter().map(|c| &**c))
            }
        };
        if expected != Some(node.mbr()) {
            self.report.mbr_mismatches += 1;
            self.report.errors.push(format!(
                "node at level {} has mbr {} but its contents span {:?}",
                level,
                node.mbr(),
                expected
            ));
        }
    }
}

/// One line per node, indented by depth, entries below their leaf.
impl<V: Debug, G: Display> Display for RTree<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.root {
            None => writeln!(f, "RTree(empty)"),
            Some(root) => write_node(f, root, 0),
        }
    }
}

fn write_node<V: Debug, G: Display>(f: &mut fmt::Formatter<'_>, node: &NodeRef<V, G>, level: usize) -> fmt::Result {
    let indent = "  ".repeat(level);
    match &**node {
        Node::Leaf(leaf) => {
            writeln!(f, "{}Leaf mbr={}", indent, leaf.mbr())?;
            for entry in leaf.entries() {
                writeln!(f, "{}  {}", indent, entry)?;
            }
        }
        Node::NonLeaf(non_leaf) => {
            writeln!(f, "{}NonLeaf mbr={}", indent, non_leaf.mbr())?;
            for child in non_leaf.children() {
                write_node(f, child, level + 1)?;
            }
        }
    }
    Ok(())
}
