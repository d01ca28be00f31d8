//! Constrained subgraph matching for rewrite-rule patterns.
//!
//! A pattern graph and an object graph are each seen through
//! [`GraphCapability`]. The [`Matcher`] picks an anchor pattern node, tries
//! every compatible object node as its binding, and for each one seeds a fresh
//! [`MatchContext`] and propagates constraints to a fixed point. The first
//! attempt that survives is returned; there is no backtracking inside an
//! attempt and at most one embedding is produced.
//!
//! ```
//! use fpat_graph::{Arena, NodeConstraint};
//! use fpat_subgraph::{ArenaGraph, ArenaNode, find_match};
//!
//! struct Op(&'static str);
//!
//! impl ArenaNode for Op {
//!     fn constraint(&self) -> NodeConstraint {
//!         NodeConstraint::native_op(self.0)
//!     }
//! }
//!
//! let mut pattern = Arena::new();
//! pattern.new_node(|_| Op("relu"));
//!
//! let mut object = Arena::new();
//! object.new_node(|_| Op("sigmoid"));
//! object.new_node(|_| Op("relu"));
//!
//! let (p, o) = (ArenaGraph::new(&pattern), ArenaGraph::new(&object));
//! let ctx = find_match(&p, &o).unwrap();
//! assert_eq!(ctx.resolved_count(), 1);
//! ```

mod anchor;
mod arena_graph;
mod capability;
mod config;
mod context;
mod error;
mod helper;
mod matcher;
mod named;

#[cfg(test)]
mod testing;

pub use anchor::{anchor_candidates, select_anchor};
pub use arena_graph::{ArenaGraph, ArenaNode, match_arenas};
pub use capability::{GraphCapability, Visitor};
pub use config::{AnchorTieBreak, Config, ConfigBuilder, DEFAULT_MAX_PROPAGATION_PASSES};
pub use context::MatchContext;
pub use error::MatchError;
pub use helper::GraphHelper;
pub use matcher::{Discriminator, Matcher, find_match, is_fully_matched};
pub use named::NamedMatch;
