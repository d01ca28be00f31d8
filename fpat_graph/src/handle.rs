//! Weak node handles.

use std::cell::RefCell;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::rc::{Rc, Weak};

use crate::arena::{Adjacency, ArenaStore, Direction};
use crate::{GraphError, NodeId};

/// Lightweight reference to a node of an [`Arena`](crate::Arena).
///
/// A handle never keeps its arena alive. Two handles are equal when they carry
/// the same id *and* were issued by the same arena. Every accessor that needs
/// the arena fails with [`GraphError::ArenaDropped`] once the arena is gone.
pub struct NodeHandle<T> {
    id: NodeId,
    arena: Weak<RefCell<ArenaStore<T>>>,
}

impl<T> NodeHandle<T> {
    pub(crate) const fn new(id: NodeId, arena: Weak<RefCell<ArenaStore<T>>>) -> Self {
        Self { id, arena }
    }

    /// The node's id inside its arena.
    #[must_use]
    pub const fn id(&self) -> NodeId {
        self.id
    }

    /// Whether the issuing arena still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.arena.strong_count() > 0
    }

    /// Resolves the node payload.
    ///
    /// # Errors
    /// [`GraphError::ArenaDropped`] if the arena is gone.
    pub fn get(&self) -> Result<Rc<T>, GraphError> {
        let store = self.store()?;
        store.borrow().at(self.id)
    }

    /// Nodes this node feeds (this node is the edge source).
    ///
    /// # Errors
    /// [`GraphError::ArenaDropped`] if the arena is gone.
    pub fn downstream(&self) -> Result<Adjacency<T>, GraphError> {
        self.adjacency(Direction::Downstream)
    }

    /// Nodes feeding this node (this node is the edge destination).
    ///
    /// # Errors
    /// [`GraphError::ArenaDropped`] if the arena is gone.
    pub fn upstream(&self) -> Result<Adjacency<T>, GraphError> {
        self.adjacency(Direction::Upstream)
    }

    /// Adjacency list of this node in the given direction.
    ///
    /// # Errors
    /// [`GraphError::ArenaDropped`] if the arena is gone.
    pub fn adjacency(&self, direction: Direction) -> Result<Adjacency<T>, GraphError> {
        let store = self.store()?;
        store.borrow().adjacency(self.id, direction).cloned()
    }

    pub(crate) fn belongs_to(&self, arena: &Rc<RefCell<ArenaStore<T>>>) -> bool {
        std::ptr::eq(self.arena.as_ptr(), Rc::as_ptr(arena))
    }

    fn store(&self) -> Result<Rc<RefCell<ArenaStore<T>>>, GraphError> {
        self.arena
            .upgrade()
            .ok_or(GraphError::ArenaDropped { id: self.id })
    }

    fn arena_addr(&self) -> usize {
        self.arena.as_ptr().cast::<()>() as usize
    }
}

impl<T> Clone for NodeHandle<T> {
    fn clone(&self) -> Self {
        Self {
            id: self.id,
            arena: Weak::clone(&self.arena),
        }
    }
}

impl<T> PartialEq for NodeHandle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && Weak::ptr_eq(&self.arena, &other.arena)
    }
}

impl<T> Eq for NodeHandle<T> {}

impl<T> Hash for NodeHandle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.arena_addr().hash(state);
    }
}

impl<T> fmt::Debug for NodeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "NodeHandle({})", self.id)
    }
}

impl<T> fmt::Display for NodeHandle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.id, f)
    }
}
