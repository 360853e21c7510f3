//! A mutable, thread-safe handle over the latest tree version.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::entry::Entry;
use crate::errors::RTreeResult;
use crate::geometry::{Geometry, Rectangle, Shape};
use crate::tree::RTree;

/// Mutable spatial index interface.
///
/// Implementors are expected to be usable from several threads at once.
pub trait SpatialIndex<V, G = Geometry>: Send + Sync {
    /// Adds an entry.
    fn add(&self, value: V, geometry: G) -> RTreeResult<()>;

    /// Removes one matching entry; `false` when there was none.
    fn remove(&self, value: V, geometry: G) -> RTreeResult<bool>;

    /// Finds the entries intersecting `rect`.
    fn find_intersecting(&self, rect: &Rectangle) -> RTreeResult<Vec<Entry<V, G>>>;

    /// Finds the `k` entries nearest to `query`, nearest first, with their
    /// distances.
    fn find_nearest(
        &self,
        query: &Rectangle,
        k: usize,
        max_distance: Option<f64>,
    ) -> RTreeResult<Vec<(Entry<V, G>, f64)>>;

    /// Finds every entry within `distance` of `query`.
    fn find_within_distance(&self, query: &Rectangle, distance: f64) -> RTreeResult<Vec<(Entry<V, G>, f64)>> {
        self.find_nearest(query, usize::MAX, Some(distance))
    }

    /// Gets the number of entries.
    fn size(&self) -> usize;

    /// Removes every entry.
    fn clear(&self) -> RTreeResult<()>;
}

/// Shared, lockable [`RTree`].
///
/// Readers take a snapshot under a short read lock and then work on the
/// immutable version without holding it. Writers are serialized by the
/// write lock; each write replaces the current version.
pub struct SharedRTree<V, G = Geometry> {
    inner: Arc<RwLock<RTree<V, G>>>,
}

impl<V, G> Clone for SharedRTree<V, G> {
    fn clone(&self) -> Self {
        SharedRTree {
            inner: self.inner.clone(),
        }
    }
}

impl<V, G> Default for SharedRTree<V, G> {
    fn default() -> Self {
        Self::new(RTree::new())
    }
}

impl<V, G> SharedRTree<V, G> {
    pub fn new(tree: RTree<V, G>) -> Self {
        SharedRTree {
            inner: Arc::new(RwLock::new(tree)),
        }
    }

    /// The current version.
    pub fn snapshot(&self) -> RTree<V, G> {
        self.inner.read().clone()
    }

    /// Replaces the current version with `f(current)` and returns the new
    /// version.
    pub fn update<F>(&self, f: F) -> RTree<V, G>
    where
        F: FnOnce(&RTree<V, G>) -> RTree<V, G>,
    {
        let mut guard = self.inner.write();
        let next = f(&guard);
        *guard = next.clone();
        next
    }

    /// Swaps in `tree`, returning the previous version.
    pub fn replace(&self, tree: RTree<V, G>) -> RTree<V, G> {
        std::mem::replace(&mut *self.inner.write(), tree)
    }
}

impl<V, G> SpatialIndex<V, G> for SharedRTree<V, G>
where
    V: Clone + PartialEq + Send + Sync,
    G: Shape + Clone + PartialEq + Send + Sync,
{
    fn add(&self, value: V, geometry: G) -> RTreeResult<()> {
        self.update(|tree| tree.add(value, geometry));
        Ok(())
    }

    fn remove(&self, value: V, geometry: G) -> RTreeResult<bool> {
        let entry = Entry::new(value, geometry);
        let mut guard = self.inner.write();
        let next = guard.delete(&entry);
        let removed = next.size() < guard.size();
        *guard = next;
        Ok(removed)
    }

    fn find_intersecting(&self, rect: &Rectangle) -> RTreeResult<Vec<Entry<V, G>>> {
        Ok(self.snapshot().search_intersecting(*rect).collect())
    }

    fn find_nearest(
        &self,
        query: &Rectangle,
        k: usize,
        max_distance: Option<f64>,
    ) -> RTreeResult<Vec<(Entry<V, G>, f64)>> {
        let max_distance = max_distance.unwrap_or(f64::INFINITY);
        Ok(self.snapshot().nearest_with_distances(query, max_distance, k))
    }

    fn size(&self) -> usize {
        self.inner.read().size()
    }

    fn clear(&self) -> RTreeResult<()> {
        let mut guard = self.inner.write();
        let context = guard.shared_context().clone();
        *guard = RTree::with_shared_context(context);
        Ok(())
    }
}
