//! Error types for matching.
//!
//! Only [`MatchError::Mismatch`] is an expected outcome: it means "no valid
//! assignment here" and makes the matcher move on to the next anchor
//! candidate. Every other variant is a contract violation and aborts the
//! whole match call unchanged.

use std::fmt::Debug;

use fpat_graph::GraphError;
use thiserror::Error;

/// Errors raised by the match context, the walkers and the matcher.
///
/// Node identities are carried as their `Debug` rendering so the error type
/// stays independent of the graph representation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MatchError {
    /// No valid assignment exists for the current attempt.
    #[error("mismatch: {0}")]
    Mismatch(String),

    /// `init` was called twice for one pattern node.
    #[error("pattern node {node} is already initialized")]
    AlreadyInitialized {
        /// The pattern node.
        node: String,
    },

    /// A pattern node was read or updated before `init`.
    #[error("pattern node {node} has not been initialized")]
    Uninitialized {
        /// The pattern node.
        node: String,
    },

    /// An object node uniquely bound to one pattern node was offered to another.
    #[error("object node {object} is already bound to pattern node {bound_to}, cannot bind it to {requested}")]
    AlreadyBound {
        /// The contested object node.
        object: String,
        /// Pattern node currently holding it.
        bound_to: String,
        /// Pattern node that asked for it.
        requested: String,
    },

    /// Arena or handle failure.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Constraint propagation kept narrowing past the configured ceiling.
    #[error("propagation did not converge within {passes} passes")]
    NotConverged {
        /// The ceiling that was hit.
        passes: usize,
    },

    /// A topological walk found a cycle.
    #[error("graph contains a cycle through {remaining} nodes")]
    Cyclic {
        /// Nodes left unordered.
        remaining: usize,
    },

    /// A name lookup used an identifier the pattern never declared.
    #[error("pattern has no node named `{0}`")]
    UnknownName(String),

    /// A named pattern node was not narrowed to a single object node.
    #[error("pattern node `{name}` is not uniquely matched ({candidates} candidates)")]
    Unresolved {
        /// The name looked up.
        name: String,
        /// Size of its candidate set (0 if never seeded).
        candidates: usize,
    },
}

impl MatchError {
    /// Create a mismatch error.
    pub fn mismatch(msg: impl Into<String>) -> Self {
        Self::Mismatch(msg.into())
    }

    /// Create an already-initialized error.
    pub fn already_initialized(node: &impl Debug) -> Self {
        Self::AlreadyInitialized {
            node: format!("{node:?}"),
        }
    }

    /// Create an uninitialized error.
    pub fn uninitialized(node: &impl Debug) -> Self {
        Self::Uninitialized {
            node: format!("{node:?}"),
        }
    }

    /// Create an already-bound error.
    pub fn already_bound(object: &impl Debug, bound_to: &impl Debug, requested: &impl Debug) -> Self {
        Self::AlreadyBound {
            object: format!("{object:?}"),
            bound_to: format!("{bound_to:?}"),
            requested: format!("{requested:?}"),
        }
    }

    /// Whether this is the recoverable "no match here" outcome.
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::Mismatch(_))
    }
}
