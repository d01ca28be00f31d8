//! A small tensor-program dialect on top of the matcher.
//!
//! Patterns are built into an [`fpat_graph::Arena`] with [`PatternBuilder`];
//! programs stay in their own flat form ([`Program`]) and are exposed to the
//! matcher through [`ProgramGraph`]. Both can be loaded from JSON
//! ([`PatternSpec`], [`ProgramSpec`]).
//!
//! ```
//! use fpat_ir::{PatternBuilder, Program, ProgramGraph, ProgramNode};
//! use fpat_subgraph::Config;
//!
//! let mut builder = PatternBuilder::new();
//! builder.op("act", "relu", &[], &["out"])?;
//! let pattern = builder.build();
//!
//! let mut program = Program::new();
//! let (x, y, z) = (program.add_value("x"), program.add_value("y"), program.add_value("z"));
//! program.add_op("sigmoid", vec![x], vec![y]);
//! program.add_op("relu", vec![y], vec![z]);
//!
//! let graph = ProgramGraph::new(&program)?;
//! let ctx = pattern.find_in(&graph, Config::default())?;
//! let bindings = pattern.bindings(&ctx);
//! assert_eq!(bindings.get("act")?, &ProgramNode::Op(1));
//! assert_eq!(bindings.get("out")?, &ProgramNode::Value(z));
//! # Ok::<(), fpat_ir::IrError>(())
//! ```

mod error;
mod node;
mod pattern;
mod program;
mod schema;

pub use error::IrError;
pub use node::{IrKind, IrNode};
pub use pattern::{Pattern, PatternBuilder, PatternHandle};
pub use program::{OpInstance, Program, ProgramGraph, ProgramNode, ValueId};
pub use schema::{OpSpec, PatternOpSpec, PatternSpec, ProgramSpec, ValueSpec};
