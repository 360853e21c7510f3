//! Leaf-level entries pairing a caller value with its geometry.

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug, Display};

use crate::geometry::{Geometry, Rectangle, Shape};

/// A value stored in the tree together with its geometry.
///
/// Two entries are equal when both their values and geometries are equal;
/// deletion relies on this to locate the exact entry to remove.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry<V, G = Geometry> {
    value: V,
    geometry: G,
}

impl<V, G> Entry<V, G> {
    /// Creates a new entry.
    pub fn new(value: V, geometry: G) -> Self {
        Self { value, geometry }
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn geometry(&self) -> &G {
        &self.geometry
    }

    /// Splits the entry back into its value and geometry.
    pub fn into_parts(self) -> (V, G) {
        (self.value, self.geometry)
    }
}

impl<V, G: Shape> Entry<V, G> {
    /// MBR of the entry's geometry.
    pub fn mbr(&self) -> Rectangle {
        self.geometry.mbr()
    }
}

impl<V: Debug, G: Display> Display for Entry<V, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Entry[value={:?}, geometry={}]", self.value, self.geometry)
    }
}
