//! Error types for arena storage and handle resolution.

use thiserror::Error;

use crate::{Direction, EdgeTag, NodeId};

/// Errors raised while building or reading an [`Arena`](crate::Arena).
///
/// Every variant signals a contract violation by the caller; none of them is
/// a "no match" outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    /// A node id does not address a node of the arena.
    #[error("node id {id} out of range (arena holds {len} nodes)")]
    IndexOutOfRange {
        /// The offending id.
        id: NodeId,
        /// Number of nodes currently in the arena.
        len: usize,
    },

    /// An adjacency slot already committed to one tag was connected with the other.
    #[error("{direction} adjacency of node {id} is committed as {committed}, cannot connect as {requested}")]
    TagMismatch {
        /// Node owning the slot.
        id: NodeId,
        /// Which of the two slots was addressed.
        direction: Direction,
        /// Tag the slot is committed to.
        committed: EdgeTag,
        /// Tag the rejected connection asked for.
        requested: EdgeTag,
    },

    /// An endpoint of a connection belongs to another arena.
    #[error("cannot connect {id}: node belongs to a different arena")]
    CrossArena {
        /// Id of the foreign endpoint.
        id: NodeId,
    },

    /// A handle outlived the arena that issued it.
    #[error("arena of node {id} has been dropped")]
    ArenaDropped {
        /// Id carried by the dangling handle.
        id: NodeId,
    },
}
