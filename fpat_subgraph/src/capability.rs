//! The contract a graph representation implements to be matchable.

use std::fmt::Debug;
use std::hash::Hash;

use fpat_graph::NodeConstraint;

use crate::MatchError;

/// Callback handed to the neighbour walks. Returning an error stops the walk
/// and the error is returned by the walk itself.
pub type Visitor<'v, N> = dyn FnMut(&N) -> Result<(), MatchError> + 'v;

/// Read-only view of a pattern or object graph.
///
/// The trait is object safe; the matcher only ever sees
/// `&dyn GraphCapability<Node = N>`, so one matcher serves arena-backed
/// patterns and foreign program representations alike.
pub trait GraphCapability {
    /// Node identity. Cheap to clone.
    type Node: Clone + Eq + Hash + Debug;

    /// Every node, in a deterministic order.
    ///
    /// # Errors
    /// Representation specific; arena-backed graphs fail once the arena is gone.
    fn nodes(&self) -> Result<Vec<Self::Node>, MatchError>;

    /// Calls `visitor` on every direct predecessor of `node`.
    ///
    /// # Errors
    /// The first error returned by `visitor`, or a representation failure.
    fn visit_upstream(
        &self,
        node: &Self::Node,
        visitor: &mut Visitor<'_, Self::Node>,
    ) -> Result<(), MatchError>;

    /// Calls `visitor` on every direct successor of `node`.
    ///
    /// # Errors
    /// The first error returned by `visitor`, or a representation failure.
    fn visit_downstream(
        &self,
        node: &Self::Node,
        visitor: &mut Visitor<'_, Self::Node>,
    ) -> Result<(), MatchError>;

    /// Structural fingerprint of `node`.
    ///
    /// # Errors
    /// Representation specific.
    fn constraint(&self, node: &Self::Node) -> Result<NodeConstraint, MatchError>;

    /// Whether `node` is a transparent placeholder skipped by anchor search.
    ///
    /// # Errors
    /// Representation specific.
    fn is_ignored(&self, node: &Self::Node) -> Result<bool, MatchError>;

    /// Whether `node` is an operator (biases anchor choice).
    ///
    /// # Errors
    /// Representation specific.
    fn is_op(&self, node: &Self::Node) -> Result<bool, MatchError> {
        Ok(self.constraint(node)?.is_op())
    }

    /// Whether object node `node` may be bound to a pattern node whose
    /// fingerprint is `pattern`.
    ///
    /// # Errors
    /// Representation specific.
    fn satisfies(&self, node: &Self::Node, pattern: &NodeConstraint) -> Result<bool, MatchError> {
        Ok(pattern.is_satisfied_by(&self.constraint(node)?))
    }
}
