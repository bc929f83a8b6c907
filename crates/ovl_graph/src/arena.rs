//! Append-only node storage addressed by typed `u32` handles.

use std::marker::PhantomData;
use std::ops::{Index, IndexMut};

/// A handle type usable as an [`Arena`] key.
pub trait ArenaId: Copy {
    /// Wraps a slot number.
    fn from_raw(index: u32) -> Self;

    /// The slot number.
    fn as_raw(self) -> u32;
}

/// Nodes of one kind, addressed by the handle type `I`.
///
/// Nothing is ever removed, so a handle stays valid as long as the design it
/// came from.
#[derive(Debug, Clone)]
pub struct Arena<I: ArenaId, T> {
    nodes: Vec<T>,
    _key: PhantomData<I>,
}

impl<I: ArenaId, T> Default for Arena<I, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<I: ArenaId, T> Arena<I, T> {
    /// An empty arena.
    pub fn new() -> Self {
        Self {
            nodes: Vec::new(),
            _key: PhantomData,
        }
    }

    fn slot(id: I) -> usize {
        id.as_raw() as usize
    }

    fn handle(slot: usize) -> I {
        I::from_raw(slot as u32)
    }

    /// The handle the next [`alloc`](Self::alloc) will return, so a node can
    /// carry its own ID.
    pub fn next_id(&self) -> I {
        Self::handle(self.nodes.len())
    }

    /// Stores `node` and returns its handle.
    pub fn alloc(&mut self, node: T) -> I {
        let id = self.next_id();
        self.nodes.push(node);
        id
    }

    /// The node behind `id`. Panics on a handle from another design.
    pub fn get(&self, id: I) -> &T {
        &self.nodes[Self::slot(id)]
    }

    /// Like [`get`](Self::get), returning `None` for an unknown handle.
    pub fn try_get(&self, id: I) -> Option<&T> {
        self.nodes.get(Self::slot(id))
    }

    /// Mutable access to the node behind `id`.
    pub fn get_mut(&mut self, id: I) -> &mut T {
        &mut self.nodes[Self::slot(id)]
    }

    /// Number of stored nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether nothing has been stored yet.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Handles and nodes, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = (I, &T)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(slot, node)| (Self::handle(slot), node))
    }

    /// Handles, oldest first.
    pub fn ids(&self) -> impl Iterator<Item = I> + '_ {
        (0..self.nodes.len()).map(Self::handle)
    }

    /// Nodes, oldest first.
    pub fn values(&self) -> impl Iterator<Item = &T> {
        self.nodes.iter()
    }
}

impl<I: ArenaId, T> Index<I> for Arena<I, T> {
    type Output = T;

    fn index(&self, id: I) -> &T {
        self.get(id)
    }
}

impl<I: ArenaId, T> IndexMut<I> for Arena<I, T> {
    fn index_mut(&mut self, id: I) -> &mut T {
        self.get_mut(id)
    }
}
