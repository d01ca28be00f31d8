//! Arena-backed graph storage for fusion-pattern matching.
//!
//! Pattern graphs and object graphs are stored in an [`Arena`], which owns
//! node payloads and their adjacency lists and hands out weak [`NodeHandle`]s.
//! Every node can be summarised by a [`NodeConstraint`], the structural
//! fingerprint the matcher uses to prune candidates.

mod arena;
mod constraint;
mod error;
mod handle;
mod id;

pub use arena::{Adjacency, Arena, Direction, EdgeTag};
pub use constraint::NodeConstraint;
pub use error::GraphError;
pub use handle::NodeHandle;
pub use id::NodeId;
