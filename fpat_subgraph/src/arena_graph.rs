//! [`GraphCapability`] over an [`Arena`], for patterns and for arena-backed
//! object graphs.

use std::fmt;

use fpat_graph::{Adjacency, Arena, NodeConstraint, NodeHandle};

use crate::capability::Visitor;
use crate::{Config, GraphCapability, MatchContext, MatchError, Matcher};

/// Payload stored in an arena that the matcher can read.
pub trait ArenaNode {
    /// Structural fingerprint of the node.
    fn constraint(&self) -> NodeConstraint;

    /// Whether the node is an operator.
    fn is_op(&self) -> bool {
        self.constraint().is_op()
    }

    /// Whether this node, read as an object node, may be bound to a pattern
    /// node fingerprinted `pattern`.
    fn satisfies(&self, pattern: &NodeConstraint) -> bool {
        pattern.is_satisfied_by(&self.constraint())
    }
}

type Predicate<'a, T> = dyn Fn(&T) -> bool + 'a;

/// An arena seen as a matchable graph. Nodes are the arena's handles, in id
/// order; the ignored-node predicate is injected.
pub struct ArenaGraph<'a, T> {
    arena: &'a Arena<T>,
    is_ignored: Box<Predicate<'a, T>>,
}

impl<'a, T> ArenaGraph<'a, T> {
    /// A view in which no node is ignored.
    pub fn new(arena: &'a Arena<T>) -> Self {
        Self::with_ignored(arena, |_| false)
    }

    /// A view hiding nodes for which `is_ignored` holds from anchor search.
    pub fn with_ignored(arena: &'a Arena<T>, is_ignored: impl Fn(&T) -> bool + 'a) -> Self {
        Self {
            arena,
            is_ignored: Box::new(is_ignored),
        }
    }

    fn visit(
        adjacency: &Adjacency<T>,
        visitor: &mut Visitor<'_, NodeHandle<T>>,
    ) -> Result<(), MatchError> {
        for node in adjacency.nodes() {
            visitor(node)?;
        }
        Ok(())
    }
}

impl<T: ArenaNode> GraphCapability for ArenaGraph<'_, T> {
    type Node = NodeHandle<T>;

    fn nodes(&self) -> Result<Vec<Self::Node>, MatchError> {
        Ok(self.arena.handles())
    }

    fn visit_upstream(
        &self,
        node: &Self::Node,
        visitor: &mut Visitor<'_, Self::Node>,
    ) -> Result<(), MatchError> {
        Self::visit(&node.upstream()?, visitor)
    }

    fn visit_downstream(
        &self,
        node: &Self::Node,
        visitor: &mut Visitor<'_, Self::Node>,
    ) -> Result<(), MatchError> {
        Self::visit(&node.downstream()?, visitor)
    }

    fn constraint(&self, node: &Self::Node) -> Result<NodeConstraint, MatchError> {
        Ok(node.get()?.constraint())
    }

    fn is_ignored(&self, node: &Self::Node) -> Result<bool, MatchError> {
        Ok((self.is_ignored)(&*node.get()?))
    }

    fn is_op(&self, node: &Self::Node) -> Result<bool, MatchError> {
        Ok(node.get()?.is_op())
    }

    fn satisfies(&self, node: &Self::Node, pattern: &NodeConstraint) -> Result<bool, MatchError> {
        Ok(node.get()?.satisfies(pattern))
    }
}

impl<T> fmt::Debug for ArenaGraph<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArenaGraph")
            .field("arena", self.arena)
            .finish_non_exhaustive()
    }
}

/// Matches one arena against another of the same payload type.
///
/// `is_ignored` applies to pattern nodes. `objects_match(object, pattern)`
/// must hold for every binding on top of constraint satisfaction; matching an
/// arena against itself with pointer identity pins every reachable node to
/// itself.
///
/// # Errors
/// See [`Matcher::find_match`]. A handle whose arena is gone aborts the
/// search with [`MatchError::Graph`].
pub fn match_arenas<T: ArenaNode>(
    pattern: &Arena<T>,
    object: &Arena<T>,
    is_ignored: impl Fn(&T) -> bool,
    objects_match: impl Fn(&T, &T) -> bool,
    config: Config,
) -> Result<MatchContext<NodeHandle<T>, NodeHandle<T>>, MatchError> {
    let pattern = ArenaGraph::with_ignored(pattern, is_ignored);
    let object = ArenaGraph::new(object);

    Matcher::new(&pattern, &object)
        .with_config(config)
        .with_discriminator(|obj: &NodeHandle<T>, ptn: &NodeHandle<T>| {
            Ok(objects_match(&*obj.get()?, &*ptn.get()?))
        })
        .find_match()
}
