//! External node backends.
//!
//! A [`NodeProvider`] exposes an existing, read-only node tree through the
//! same capability set the in-memory nodes have. Providers are never
//! mutated: [`RTree::from_provider`] materializes them into in-memory nodes
//! and every later mutation works on those.
//!
//! [`PackedTree`] is the provider shipped with the crate: a serde-friendly
//! snapshot whose entry values are opaque bytes produced by a
//! [`ValueSerializer`].

use std::marker::PhantomData;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::context::Context;
use crate::entry::Entry;
use crate::errors::{RTreeError, RTreeResult};
use crate::geometry::{Geometry, Rectangle, Shape};
use crate::node::{Node, NodeRef};
use crate::tree::RTree;

/// What a provider node holds.
#[derive(Debug)]
pub enum Contents<V, G, N> {
    Entries(Vec<Entry<V, G>>),
    Children(Vec<N>),
}

/// Read-only node of an external tree.
pub trait NodeProvider<V, G>: Sized {
    /// MBR recorded for this node.
    fn mbr(&self) -> Rectangle;

    /// Number of entries (leaf) or children (non-leaf).
    fn count(&self) -> usize;

    /// Loads the node contents. Any failure aborts the operation using it.
    fn contents(&self) -> RTreeResult<Contents<V, G, Self>>;
}

impl<V: Clone, G: Clone> NodeProvider<V, G> for NodeRef<V, G> {
    fn mbr(&self) -> Rectangle {
        Node::mbr(self)
    }

    fn count(&self) -> usize {
        Node::count(self)
    }

    fn contents(&self) -> RTreeResult<Contents<V, G, Self>> {
        Ok(match &**self {
            Node::Leaf(leaf) => Contents::Entries(leaf.entries().to_vec()),
            Node::NonLeaf(non_leaf) => Contents::Children(non_leaf.children().to_vec()),
        })
    }
}

impl<V, G: Shape> RTree<V, G> {
    /// Copies a provider tree into in-memory nodes.
    ///
    /// Fails with the first provider error, or when a provider node is empty
    /// or yields a different number of items than it reports.
    pub fn from_provider<N: NodeProvider<V, G>>(root: &N, context: Context) -> RTreeResult<Self> {
        let mut size = 0;
        let root = materialize(root, &mut size)?;
        log::debug!("materialized {} entries from node provider", size);
        Ok(RTree::from_parts(Some(root), Arc::new(context), size))
    }
}

fn materialize<V, G, N>(provided: &N, size: &mut usize) -> RTreeResult<NodeRef<V, G>>
where
    G: Shape,
    N: NodeProvider<V, G>,
{
    let node = match provided.contents()? {
        Contents::Entries(entries) => {
            if entries.is_empty() {
                return Err(RTreeError::Provider("leaf without entries".to_string()));
            }
            *size += entries.len();
            Node::leaf(entries)
        }
        Contents::Children(children) => {
            if children.is_empty() {
                return Err(RTreeError::Provider("non-leaf without children".to_string()));
            }
            let mut built = Vec::with_capacity(children.len());
            for child in &children {
                built.push(materialize(child, size)?);
            }
            Node::non_leaf(built)
        }
    };

    let (count, mbr) = (Node::count(&node), Node::mbr(&node));
    if count != provided.count() {
        return Err(RTreeError::Provider(format!(
            "node reports {} items but holds {}",
            provided.count(),
            count
        )));
    }
    if mbr != provided.mbr() {
        log::warn!(
            "provider node mbr {} differs from its contents {}, using the latter",
            provided.mbr(),
            mbr
        );
    }
    Ok(node)
}

/// Converts entry values to and from bytes.
pub trait ValueSerializer<V> {
    fn serialize(&self, value: &V) -> RTreeResult<Vec<u8>>;

    fn deserialize(&self, bytes: &[u8]) -> RTreeResult<V>;
}

/// [`ValueSerializer`] for any serde value, using bincode.
#[derive(Debug, Clone, Copy, Default)]
pub struct BincodeSerializer;

impl<V: Serialize + DeserializeOwned> ValueSerializer<V> for BincodeSerializer {
    fn serialize(&self, value: &V) -> RTreeResult<Vec<u8>> {
        Ok(bincode::serde::encode_to_vec(value, bincode::config::legacy())?)
    }

    fn deserialize(&self, bytes: &[u8]) -> RTreeResult<V> {
        bincode::serde::decode_from_slice(bytes, bincode::config::legacy())
            .map(|(value, _)| value)
            .map_err(RTreeError::from)
    }
}

/// Entry whose value has been serialized.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedEntry<G = Geometry> {
    pub value: Vec<u8>,
    pub geometry: G,
}

/// Node of a [`PackedTree`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum PackedNode<G = Geometry> {
    Leaf {
        mbr: Rectangle,
        entries: Vec<PackedEntry<G>>,
    },
    NonLeaf {
        mbr: Rectangle,
        children: Vec<PackedNode<G>>,
    },
}

impl<G> PackedNode<G> {
    pub fn mbr(&self) -> Rectangle {
        match self {
            PackedNode::Leaf { mbr, .. } | PackedNode::NonLeaf { mbr, .. } => *mbr,
        }
    }

    pub fn count(&self) -> usize {
        match self {
            PackedNode::Leaf { entries, .. } => entries.len(),
            PackedNode::NonLeaf { children, .. } => children.len(),
        }
    }
}

/// Read-only snapshot of a tree with serialized values.
///
/// # Examples
///
/// ```rust
/// use immutable_rtree::{BincodeSerializer, Context, Geometry, PackedTree, RTree};
///
/// let tree: RTree<String> = RTree::new()
///     .add("a".to_string(), Geometry::point(1.0, 2.0))
///     .add("b".to_string(), Geometry::point(3.0, 4.0));
///
/// let bytes = tree.pack(&BincodeSerializer).unwrap().to_bytes().unwrap();
/// let packed: PackedTree = PackedTree::from_bytes(&bytes).unwrap();
/// let restored: RTree<String> = packed.unpack(&BincodeSerializer, Context::default()).unwrap();
/// assert_eq!(restored.size(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PackedTree<G = Geometry> {
    root: Option<PackedNode<G>>,
    size: usize,
}

impl<G> PackedTree<G> {
    pub fn root(&self) -> Option<&PackedNode<G>> {
        self.root.as_ref()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Provider view over the root, decoding values with `serializer`.
    pub fn provider<'a, V, S>(&'a self, serializer: &'a S) -> Option<PackedProvider<'a, V, G, S>>
    where
        S: ValueSerializer<V>,
    {
        self.root.as_ref().map(|node| PackedProvider {
            node,
            serializer,
            _value: PhantomData,
        })
    }
}

impl<G: Shape + Clone> PackedTree<G> {
    /// Rebuilds an in-memory tree, deserializing every value.
    pub fn unpack<V, S>(&self, serializer: &S, context: Context) -> RTreeResult<RTree<V, G>>
    where
        S: ValueSerializer<V>,
    {
        match self.provider(serializer) {
            Some(provider) => {
                let tree = RTree::from_provider(&provider, context)?;
                if tree.size() != self.size {
                    return Err(RTreeError::Provider(format!(
                        "packed tree records {} entries but holds {}",
                        self.size,
                        tree.size()
                    )));
                }
                Ok(tree)
            }
            None => Ok(RTree::with_context(context)),
        }
    }
}

impl<G: Serialize + DeserializeOwned> PackedTree<G> {
    pub fn to_bytes(&self) -> RTreeResult<Vec<u8>> {
        Ok(bincode::serde::encode_to_vec(self, bincode::config::legacy())?)
    }

    pub fn from_bytes(bytes: &[u8]) -> RTreeResult<Self> {
        bincode::serde::decode_from_slice(bytes, bincode::config::legacy())
            .map(|(tree, _)| tree)
            .map_err(RTreeError::from)
    }
}

impl<V, G: Clone> RTree<V, G> {
    /// Snapshots this version, serializing every value with `serializer`.
    pub fn pack<S: ValueSerializer<V>>(&self, serializer: &S) -> RTreeResult<PackedTree<G>> {
        let root = match self.root() {
            Some(root) => Some(pack_node(root, serializer)?),
            None => None,
        };
        Ok(PackedTree {
            root,
            size: self.size(),
        })
    }
}

fn pack_node<V, G, S>(node: &NodeRef<V, G>, serializer: &S) -> RTreeResult<PackedNode<G>>
where
    G: Clone,
    S: ValueSerializer<V>,
{
    Ok(match &**node {
        Node::Leaf(leaf) => {
            let entries = leaf
                .entries()
                .iter()
                .map(|entry| {
                    Ok(PackedEntry {
                        value: serializer.serialize(entry.value())?,
                        geometry: entry.geometry().clone(),
                    })
                })
                .collect::<RTreeResult<Vec<_>>>()?;
            PackedNode::Leaf {
                mbr: leaf.mbr(),
                entries,
            }
        }
        Node::NonLeaf(non_leaf) => {
            let children = non_leaf
                .children()
                .iter()
                .map(|child| pack_node(child, serializer))
                .collect::<RTreeResult<Vec<_>>>()?;
            PackedNode::NonLeaf {
                mbr: non_leaf.mbr(),
                children,
            }
        }
    })
}

/// [`NodeProvider`] over a [`PackedNode`], deserializing values on access.
pub struct PackedProvider<'a, V, G, S> {
    node: &'a PackedNode<G>,
    serializer: &'a S,
    _value: PhantomData<fn() -> V>,
}

impl<V, G: Clone, S: ValueSerializer<V>> NodeProvider<V, G> for PackedProvider<'_, V, G, S> {
    fn mbr(&self) -> Rectangle {
        self.node.mbr()
    }

    fn count(&self) -> usize {
        self.node.count()
    }

    fn contents(&self) -> RTreeResult<Contents<V, G, Self>> {
        Ok(match self.node {
            PackedNode::Leaf { entries, .. } => Contents::Entries(
                entries
                    .iter()
                    .map(|packed| {
                        let value = self.serializer.deserialize(&packed.value)?;
                        Ok(Entry::new(value, packed.geometry.clone()))
                    })
                    .collect::<RTreeResult<Vec<_>>>()?,
            ),
            PackedNode::NonLeaf { children, .. } => Contents::Children(
                children
                    .iter()
                    .map(|node| PackedProvider {
                        node,
                        serializer: self.serializer,
                        _value: PhantomData,
                    })
                    .collect(),
            ),
        })
    }
}
