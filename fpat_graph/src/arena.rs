//! Arena storage for pattern and object graphs.
//!
//! An [`Arena`] owns node payloads and, per node, two adjacency lists: the
//! nodes it feeds (*downstream*) and the nodes feeding it (*upstream*). Each
//! list starts [`Adjacency::Undefined`] and is committed to
//! [`EdgeTag::Indexed`] or [`EdgeTag::Unindexed`] by its first connection.
//!
//! # Determinism
//! - Ids are assigned `0, 1, 2, ...` in creation order and never reused.
//! - Adjacency lists keep connection order.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

use contracts::*;
use tracing::trace;

use crate::{GraphError, NodeHandle, NodeId};

/// How an adjacency list interprets its entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EdgeTag {
    /// Ordered, positional entries (native operands and results).
    Indexed,
    /// Unordered bag of entries (packed, variadic placeholders).
    Unindexed,
}

impl fmt::Display for EdgeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Indexed => f.write_str("indexed"),
            Self::Unindexed => f.write_str("unindexed"),
        }
    }
}

/// Which of a node's two adjacency lists an operation addresses.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    /// Edges leaving the node (the node is the edge source).
    Downstream,
    /// Edges entering the node (the node is the edge destination).
    Upstream,
}

impl Direction {
    /// The opposite direction.
    #[must_use]
    pub const fn reverse(self) -> Self {
        match self {
            Self::Downstream => Self::Upstream,
            Self::Upstream => Self::Downstream,
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Downstream => f.write_str("downstream"),
            Self::Upstream => f.write_str("upstream"),
        }
    }
}

/// One adjacency list of a node.
pub enum Adjacency<T> {
    /// Never connected.
    Undefined,
    /// Positional list.
    Indexed(Vec<NodeHandle<T>>),
    /// Unordered bag.
    Unindexed(Vec<NodeHandle<T>>),
}

impl<T> Adjacency<T> {
    /// The tag this list is committed to, if any.
    #[must_use]
    pub const fn tag(&self) -> Option<EdgeTag> {
        match self {
            Self::Undefined => None,
            Self::Indexed(_) => Some(EdgeTag::Indexed),
            Self::Unindexed(_) => Some(EdgeTag::Unindexed),
        }
    }

    /// Entries in connection order; empty while undefined.
    #[must_use]
    pub fn nodes(&self) -> &[NodeHandle<T>] {
        match self {
            Self::Undefined => &[],
            Self::Indexed(nodes) | Self::Unindexed(nodes) => nodes,
        }
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes().len()
    }

    /// Whether the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes().is_empty()
    }

    /// Returns the committed tag if it conflicts with `requested`.
    fn conflict(&self, requested: EdgeTag) -> Option<EdgeTag> {
        self.tag().filter(|committed| *committed != requested)
    }

    #[debug_requires(self.conflict(tag).is_none())]
    #[debug_ensures(self.tag() == Some(tag))]
    fn push(&mut self, tag: EdgeTag, node: NodeHandle<T>) {
        match self {
            Self::Indexed(nodes) | Self::Unindexed(nodes) => nodes.push(node),
            Self::Undefined => {
                *self = match tag {
                    EdgeTag::Indexed => Self::Indexed(vec![node]),
                    EdgeTag::Unindexed => Self::Unindexed(vec![node]),
                };
            }
        }
    }
}

impl<T> Clone for Adjacency<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Undefined => Self::Undefined,
            Self::Indexed(nodes) => Self::Indexed(nodes.clone()),
            Self::Unindexed(nodes) => Self::Unindexed(nodes.clone()),
        }
    }
}

impl<T> fmt::Debug for Adjacency<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Undefined => f.write_str("Undefined"),
            Self::Indexed(nodes) => f.debug_tuple("Indexed").field(nodes).finish(),
            Self::Unindexed(nodes) => f.debug_tuple("Unindexed").field(nodes).finish(),
        }
    }
}

/// Shared storage behind an [`Arena`]; handles observe it weakly.
pub(crate) struct ArenaStore<T> {
    nodes: Vec<Rc<T>>,
    downstream: Vec<Adjacency<T>>,
    upstream: Vec<Adjacency<T>>,
}

impl<T> ArenaStore<T> {
    const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            downstream: Vec::new(),
            upstream: Vec::new(),
        }
    }

    fn check(&self, id: NodeId) -> Result<usize, GraphError> {
        let idx = id.as_usize();
        if idx < self.nodes.len() {
            Ok(idx)
        } else {
            Err(GraphError::IndexOutOfRange {
                id,
                len: self.nodes.len(),
            })
        }
    }

    pub(crate) fn at(&self, id: NodeId) -> Result<Rc<T>, GraphError> {
        let idx = self.check(id)?;
        Ok(Rc::clone(&self.nodes[idx]))
    }

    pub(crate) fn adjacency(
        &self,
        id: NodeId,
        direction: Direction,
    ) -> Result<&Adjacency<T>, GraphError> {
        let idx = self.check(id)?;
        Ok(match direction {
            Direction::Downstream => &self.downstream[idx],
            Direction::Upstream => &self.upstream[idx],
        })
    }

    fn adjacency_mut(&mut self, idx: usize, direction: Direction) -> &mut Adjacency<T> {
        match direction {
            Direction::Downstream => &mut self.downstream[idx],
            Direction::Upstream => &mut self.upstream[idx],
        }
    }

    fn is_consistent(&self) -> bool {
        self.nodes.len() == self.downstream.len() && self.nodes.len() == self.upstream.len()
    }
}

/// Owner of node payloads and their adjacency lists.
///
/// Arenas are built once (per pattern definition or per program snapshot) and
/// then read. Dropping the arena invalidates every [`NodeHandle`] it issued.
pub struct Arena<T> {
    store: Rc<RefCell<ArenaStore<T>>>,
}

impl<T> Default for Arena<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Arena<T> {
    /// Creates an empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self {
            store: Rc::new(RefCell::new(ArenaStore::new())),
        }
    }

    /// Number of nodes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.store.borrow().nodes.len()
    }

    /// Whether the arena holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Payload of node `id`.
    ///
    /// # Errors
    /// [`GraphError::IndexOutOfRange`] if `id` is not a node of this arena.
    pub fn at(&self, id: NodeId) -> Result<Rc<T>, GraphError> {
        self.store.borrow().at(id)
    }

    /// Handle of node `id`.
    ///
    /// # Errors
    /// [`GraphError::IndexOutOfRange`] if `id` is not a node of this arena.
    pub fn handle(&self, id: NodeId) -> Result<NodeHandle<T>, GraphError> {
        self.store.borrow().check(id)?;
        Ok(self.make_handle(id))
    }

    /// Handles of all nodes, in id order.
    #[must_use]
    pub fn handles(&self) -> Vec<NodeHandle<T>> {
        (0..self.len())
            .map(|idx| self.make_handle(NodeId::from(idx)))
            .collect()
    }

    /// Whether `handle` was issued by this arena.
    #[must_use]
    pub fn owns(&self, handle: &NodeHandle<T>) -> bool {
        handle.belongs_to(&self.store)
    }

    /// Creates a node. `ctor` receives the node's own handle so the payload
    /// can refer to itself.
    ///
    /// `ctor` must not create nodes in this arena.
    pub fn new_node(&mut self, ctor: impl FnOnce(NodeHandle<T>) -> T) -> Rc<T> {
        match self.try_new_node(|handle| Ok::<T, std::convert::Infallible>(ctor(handle))) {
            Ok(payload) => payload,
            Err(never) => match never {},
        }
    }

    /// Creates a node from a fallible constructor. A failing constructor
    /// leaves the arena unchanged.
    ///
    /// # Errors
    /// Whatever `ctor` returns.
    pub fn try_new_node<E>(
        &mut self,
        ctor: impl FnOnce(NodeHandle<T>) -> Result<T, E>,
    ) -> Result<Rc<T>, E> {
        let id = NodeId::from(self.len());
        let payload = Rc::new(ctor(self.make_handle(id))?);

        let mut store = self.store.borrow_mut();
        debug_assert_eq!(
            store.nodes.len(),
            id.as_usize(),
            "node constructors must not allocate in their own arena"
        );
        store.nodes.push(Rc::clone(&payload));
        store.downstream.push(Adjacency::Undefined);
        store.upstream.push(Adjacency::Undefined);
        debug_assert!(store.is_consistent());
        Ok(payload)
    }

    /// Nodes fed by node `id`.
    ///
    /// # Errors
    /// [`GraphError::IndexOutOfRange`] if `id` is not a node of this arena.
    pub fn downstream_of(&self, id: NodeId) -> Result<Adjacency<T>, GraphError> {
        self.adjacency_of(id, Direction::Downstream)
    }

    /// Nodes feeding node `id`.
    ///
    /// # Errors
    /// [`GraphError::IndexOutOfRange`] if `id` is not a node of this arena.
    pub fn upstream_of(&self, id: NodeId) -> Result<Adjacency<T>, GraphError> {
        self.adjacency_of(id, Direction::Upstream)
    }

    /// Adjacency list of node `id` in `direction`.
    ///
    /// # Errors
    /// [`GraphError::IndexOutOfRange`] if `id` is not a node of this arena.
    pub fn adjacency_of(&self, id: NodeId, direction: Direction) -> Result<Adjacency<T>, GraphError> {
        self.store.borrow().adjacency(id, direction).cloned()
    }

    /// Adds the edge `src -> dst`: `dst` joins the downstream list of `src`
    /// under `src_tag`, `src` joins the upstream list of `dst` under `dst_tag`.
    ///
    /// All checks run before either list is touched.
    ///
    /// # Errors
    /// - [`GraphError::CrossArena`] if an endpoint was issued by another arena.
    /// - [`GraphError::IndexOutOfRange`] if an endpoint id is out of range.
    /// - [`GraphError::TagMismatch`] if a list is committed to the other tag.
    pub fn connect(
        &mut self,
        src: &NodeHandle<T>,
        src_tag: EdgeTag,
        dst: &NodeHandle<T>,
        dst_tag: EdgeTag,
    ) -> Result<(), GraphError> {
        for endpoint in [src, dst] {
            if !self.owns(endpoint) {
                return Err(GraphError::CrossArena { id: endpoint.id() });
            }
        }

        let mut store = self.store.borrow_mut();
        let src_idx = store.check(src.id())?;
        let dst_idx = store.check(dst.id())?;

        for (idx, id, direction, tag) in [
            (src_idx, src.id(), Direction::Downstream, src_tag),
            (dst_idx, dst.id(), Direction::Upstream, dst_tag),
        ] {
            if let Some(committed) = store.adjacency_mut(idx, direction).conflict(tag) {
                return Err(GraphError::TagMismatch {
                    id,
                    direction,
                    committed,
                    requested: tag,
                });
            }
        }

        store
            .adjacency_mut(src_idx, Direction::Downstream)
            .push(src_tag, dst.clone());
        store
            .adjacency_mut(dst_idx, Direction::Upstream)
            .push(dst_tag, src.clone());

        trace!("connected {} -({src_tag}/{dst_tag})-> {}", src.id(), dst.id());
        Ok(())
    }

    fn make_handle(&self, id: NodeId) -> NodeHandle<T> {
        NodeHandle::new(id, Rc::downgrade(&self.store))
    }
}

impl<T> fmt::Debug for Arena<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Arena").field("len", &self.len()).finish()
    }
}
