//! Resumable, demand-driven search.
//!
//! A search is driven by an explicit stack of [`Frame`]s, each holding a
//! node and the index of the next child or entry to look at. Because the
//! whole traversal state lives in that stack, a search can stop after any
//! emitted entry and later resume exactly where it left off. Pulling one
//! entry at a time visits the same nodes and yields the same entries, in the
//! same order, as draining the search in one go.
//!
//! The predicate is applied both to nodes (as a pruning test on their MBR)
//! and to entry geometries (as the final filter), so it receives the
//! [`Shape`] capability set rather than a concrete type.
//!
//! # Examples
//!
//! ```rust
//! use immutable_rtree::{search, Geometry, Rectangle, RTree};
//!
//! let tree: RTree<i32> = (0..20).fold(RTree::new(), |tree, i| {
//!     let x = i as f64;
//!     tree.add(i, Geometry::point(x, x))
//! });
//!
//! let mut found = tree.search(search::intersects(Rectangle::new(0.0, 0.0, 9.5, 9.5)));
//! let first = found.request(3);
//! assert_eq!(first.len(), 3);
//! let rest = found.request(usize::MAX);
//! assert_eq!(first.len() + rest.len(), 10);
//! assert!(found.is_terminated());
//! ```

use crate::entry::Entry;
use crate::geometry::{Rectangle, Shape};
use crate::node::{Node, NodeRef};

/// Tells a callback-driven search whether to keep going.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Stop,
}

/// Returns a predicate matching shapes that intersect `rect`.
pub fn intersects(rect: Rectangle) -> impl Fn(&dyn Shape) -> bool + Clone + Send + Sync {
    move |shape: &dyn Shape| shape.intersects(&rect)
}

/// Returns a predicate matching shapes closer than `distance` to `rect`.
pub fn within_distance(rect: Rectangle, distance: f64) -> impl Fn(&dyn Shape) -> bool + Clone + Send + Sync {
    move |shape: &dyn Shape| shape.distance(&rect) < distance
}

/// Returns a predicate matching everything.
pub fn always() -> impl Fn(&dyn Shape) -> bool + Clone + Send + Sync {
    |_: &dyn Shape| true
}

/// One level of a suspended traversal.
#[derive(Debug)]
pub struct Frame<V, G> {
    node: NodeRef<V, G>,
    next: usize,
}

impl<V, G> Clone for Frame<V, G> {
    fn clone(&self) -> Self {
        Frame {
            node: self.node.clone(),
            next: self.next,
        }
    }
}

impl<V, G> Frame<V, G> {
    pub fn node(&self) -> &NodeRef<V, G> {
        &self.node
    }

    /// Index of the next child (non-leaf) or entry (leaf) to examine.
    pub fn next_index(&self) -> usize {
        self.next
    }
}

/// Complete, inspectable state of a suspended traversal.
///
/// An empty frame stack is the terminal state.
#[derive(Debug)]
pub struct SearchState<V, G> {
    frames: Vec<Frame<V, G>>,
}

impl<V, G> Clone for SearchState<V, G> {
    fn clone(&self) -> Self {
        SearchState {
            frames: self.frames.clone(),
        }
    }
}

impl<V, G> SearchState<V, G> {
    /// Starts a traversal at `root`, which is only entered when it
    /// satisfies `predicate`.
    pub fn new<P>(root: Option<&NodeRef<V, G>>, predicate: &P) -> Self
    where
        P: Fn(&dyn Shape) -> bool,
    {
        let frames = match root {
            Some(root) if predicate(&**root) => vec![Frame {
                node: root.clone(),
                next: 0,
            }],
            _ => Vec::new(),
        };
        SearchState { frames }
    }

    pub fn frames(&self) -> &[Frame<V, G>] {
        &self.frames
    }

    pub fn is_exhausted(&self) -> bool {
        self.frames.is_empty()
    }

    /// Drops the frame stack; the state becomes terminal.
    pub fn clear(&mut self) {
        self.frames.clear();
    }

    /// Runs the traversal, handing every matching entry to `emit` until it
    /// answers [`Flow::Stop`] or the tree is exhausted. Returns the flow of
    /// the last emission, [`Flow::Continue`] when exhausted.
    pub fn drive<P, F>(&mut self, predicate: &P, mut emit: F) -> Flow
    where
        P: Fn(&dyn Shape) -> bool,
        F: FnMut(&Entry<V, G>) -> Flow,
        G: Shape,
    {
        while let Some(frame) = self.frames.last_mut() {
            let node = frame.node.clone();
            let index = frame.next;
            match &*node {
                Node::Leaf(leaf) => {
                    let Some(entry) = leaf.entries().get(index) else {
                        self.frames.pop();
                        continue;
                    };
                    frame.next += 1;
                    if predicate(entry.geometry()) && emit(entry) == Flow::Stop {
                        return Flow::Stop;
                    }
                }
                Node::NonLeaf(non_leaf) => {
                    let Some(child) = non_leaf.children().get(index) else {
                        self.frames.pop();
                        continue;
                    };
                    frame.next += 1;
                    if predicate(&**child) {
                        self.frames.push(Frame {
                            node: child.clone(),
                            next: 0,
                        });
                    }
                }
            }
        }
        Flow::Continue
    }
}

impl<V: Clone, G: Shape + Clone> SearchState<V, G> {
    /// Emits at most `demand` matching entries and suspends.
    ///
    /// Nothing is visited when `demand` is zero.
    pub fn pull<P>(&mut self, predicate: &P, demand: usize) -> Vec<Entry<V, G>>
    where
        P: Fn(&dyn Shape) -> bool,
    {
        let mut out = Vec::new();
        if demand == 0 {
            return out;
        }
        self.drive(predicate, |entry| {
            out.push(entry.clone());
            if out.len() >= demand {
                Flow::Stop
            } else {
                Flow::Continue
            }
        });
        out
    }

    /// Consuming form of [`SearchState::pull`]: returns the emitted entries
    /// and the state to resume from, or `None` once the traversal is done.
    pub fn advance<P>(mut self, predicate: &P, demand: usize) -> (Vec<Entry<V, G>>, Option<Self>)
    where
        P: Fn(&dyn Shape) -> bool,
    {
        let out = self.pull(predicate, demand);
        if self.is_exhausted() {
            (out, None)
        } else {
            (out, Some(self))
        }
    }
}

/// A lazy search over one tree version.
///
/// Results are produced on demand through [`Search::request`] or by
/// iterating. Cancelling discards the traversal permanently.
pub struct Search<V, G, P> {
    state: SearchState<V, G>,
    predicate: P,
    cancelled: bool,
}

impl<V, G, P> Search<V, G, P>
where
    P: Fn(&dyn Shape) -> bool,
{
    pub(crate) fn new(root: Option<&NodeRef<V, G>>, predicate: P) -> Self {
        let state = SearchState::new(root, &predicate);
        Search {
            state,
            predicate,
            cancelled: false,
        }
    }

    /// Stops the search; no further node is visited and nothing more is
    /// emitted.
    pub fn cancel(&mut self) {
        self.cancelled = true;
        self.state.clear();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }

    /// Whether the search can produce no more entries.
    pub fn is_terminated(&self) -> bool {
        self.cancelled || self.state.is_exhausted()
    }

    pub fn state(&self) -> &SearchState<V, G> {
        &self.state
    }

    pub fn into_state(self) -> SearchState<V, G> {
        self.state
    }
}

impl<V, G, P> Search<V, G, P>
where
    V: Clone,
    G: Shape + Clone,
    P: Fn(&dyn Shape) -> bool,
{
    /// Produces up to `demand` more entries.
    pub fn request(&mut self, demand: usize) -> Vec<Entry<V, G>> {
        if self.cancelled {
            return Vec::new();
        }
        self.state.pull(&self.predicate, demand)
    }
}

impl<V, G, P> Iterator for Search<V, G, P>
where
    V: Clone,
    G: Shape + Clone,
    P: Fn(&dyn Shape) -> bool,
{
    type Item = Entry<V, G>;

    fn next(&mut self) -> Option<Self::Item> {
        self.request(1).pop()
    }
}

impl<V, G, P> std::fmt::Debug for Search<V, G, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Search")
            .field("frames", &self.state.frames.len())
            .field("cancelled", &self.cancelled)
            .finish()
    }
}
