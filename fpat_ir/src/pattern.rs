//! Building rewrite-rule patterns.
//!
//! Operations never connect to values directly: every operand and every
//! result goes through a wrapper node that carries its position (native ops)
//! or stands for any number of positions (packed ops).
//!
//! ```text
//! value -> operand#i -> op -> result#j -> value
//! ```

use fpat_graph::{Arena, NodeHandle};
use fpat_subgraph::{
    ArenaGraph, Config, GraphCapability, MatchContext, Matcher, NamedMatch, match_arenas,
};
use indexmap::{IndexMap, IndexSet};
use tracing::{debug, info};

use crate::{IrError, IrKind, IrNode};

/// Handle of a pattern node.
pub type PatternHandle = NodeHandle<IrNode>;

/// Incrementally declares the values and operations of a pattern.
///
/// Every declaration is checked before the arena is touched, so a rejected
/// call leaves the builder as it was.
#[derive(Debug, Default)]
pub struct PatternBuilder {
    arena: Arena<IrNode>,
    names: IndexMap<String, PatternHandle>,
}

impl PatternBuilder {
    /// An empty pattern.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declares a single value.
    ///
    /// # Errors
    /// [`IrError::DuplicateName`] if `name` is taken.
    pub fn value(&mut self, name: &str) -> Result<&mut Self, IrError> {
        self.reserve([name])?;
        self.declare(name, IrKind::Value);
        Ok(self)
    }

    /// Declares a value standing for any number of values.
    ///
    /// # Errors
    /// [`IrError::DuplicateName`] if `name` is taken.
    pub fn packed_value(&mut self, name: &str) -> Result<&mut Self, IrError> {
        self.reserve([name])?;
        self.declare(name, IrKind::PackedValue);
        Ok(self)
    }

    /// Declares the operation `name` applying `op` to the values `inputs`
    /// (in operand order) and producing the new values `outputs` (in result
    /// order).
    ///
    /// # Errors
    /// - [`IrError::UnknownName`] if an input was never declared.
    /// - [`IrError::DuplicateName`] if `name` or an output is taken.
    pub fn op(
        &mut self,
        name: &str,
        op: &str,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Result<&mut Self, IrError> {
        self.add_op(name, op, inputs, outputs, false)
    }

    /// Like [`PatternBuilder::op`] for a variadic operation: operand and
    /// result wrappers are unindexed and the outputs are packed values.
    ///
    /// # Errors
    /// As [`PatternBuilder::op`].
    pub fn packed_op(
        &mut self,
        name: &str,
        op: &str,
        inputs: &[&str],
        outputs: &[&str],
    ) -> Result<&mut Self, IrError> {
        self.add_op(name, op, inputs, outputs, true)
    }

    /// Finishes the pattern.
    #[must_use]
    pub fn build(self) -> Pattern {
        info!(
            "built pattern with {} nodes and {} names",
            self.arena.len(),
            self.names.len()
        );
        Pattern {
            arena: self.arena,
            names: self.names,
        }
    }

    fn add_op(
        &mut self,
        name: &str,
        op: &str,
        inputs: &[&str],
        outputs: &[&str],
        packed: bool,
    ) -> Result<&mut Self, IrError> {
        let sources = inputs
            .iter()
            .map(|input| self.lookup(input))
            .collect::<Result<Vec<_>, _>>()?;
        self.reserve(std::iter::once(name).chain(outputs.iter().copied()))?;

        let (op_kind, result_kind) = if packed {
            (IrKind::PackedOp { name: op.to_owned() }, IrKind::PackedValue)
        } else {
            (IrKind::Op { name: op.to_owned() }, IrKind::Value)
        };
        let op_node = self.declare(name, op_kind);

        for (index, source) in sources.iter().enumerate() {
            let wrapper = self.wrapper(if packed {
                IrKind::PackedOperand
            } else {
                IrKind::Operand { index }
            });
            self.link(source, &wrapper)?;
            self.link(&wrapper, &op_node)?;
        }

        for (index, output) in outputs.iter().enumerate() {
            let wrapper = self.wrapper(if packed {
                IrKind::PackedResult
            } else {
                IrKind::Result { index }
            });
            let value = self.declare(output, result_kind.clone());
            self.link(&op_node, &wrapper)?;
            self.link(&wrapper, &value)?;
        }

        debug!("declared {op} `{name}` ({} in, {} out)", inputs.len(), outputs.len());
        Ok(self)
    }

    /// Fails unless every name is free and distinct from the others.
    fn reserve<'n>(&self, names: impl IntoIterator<Item = &'n str>) -> Result<(), IrError> {
        let mut seen = IndexSet::new();
        for name in names {
            if self.names.contains_key(name) || !seen.insert(name) {
                return Err(IrError::duplicate(name));
            }
        }
        Ok(())
    }

    fn lookup(&self, name: &str) -> Result<PatternHandle, IrError> {
        self.names
            .get(name)
            .cloned()
            .ok_or_else(|| IrError::unknown(name))
    }

    fn declare(&mut self, name: &str, kind: IrKind) -> PatternHandle {
        let label = Some(name.to_owned());
        let node = self.arena.new_node(|handle| IrNode::new(handle, kind, label));
        let handle = node.handle().clone();
        self.names.insert(name.to_owned(), handle.clone());
        handle
    }

    fn wrapper(&mut self, kind: IrKind) -> PatternHandle {
        let node = self.arena.new_node(|handle| IrNode::new(handle, kind, None));
        node.handle().clone()
    }

    fn link(&mut self, src: &PatternHandle, dst: &PatternHandle) -> Result<(), IrError> {
        let src_tag = src.get()?.kind().edge_tag();
        let dst_tag = dst.get()?.kind().edge_tag();
        self.arena.connect(src, src_tag, dst, dst_tag)?;
        Ok(())
    }
}

/// A finished pattern: its arena plus the names given while building it.
#[derive(Debug)]
pub struct Pattern {
    arena: Arena<IrNode>,
    names: IndexMap<String, PatternHandle>,
}

impl Pattern {
    /// The pattern arena.
    pub const fn arena(&self) -> &Arena<IrNode> {
        &self.arena
    }

    /// Declared names, in declaration order.
    pub const fn names(&self) -> &IndexMap<String, PatternHandle> {
        &self.names
    }

    /// Node declared as `name`.
    ///
    /// # Errors
    /// [`IrError::UnknownName`] if nothing was declared under `name`.
    pub fn handle(&self, name: &str) -> Result<&PatternHandle, IrError> {
        self.names.get(name).ok_or_else(|| IrError::unknown(name))
    }

    /// The pattern as a matchable graph. Packed operand and result wrappers
    /// are hidden from anchor search.
    pub fn graph(&self) -> ArenaGraph<'_, IrNode> {
        ArenaGraph::with_ignored(&self.arena, |node: &IrNode| node.kind().is_packed_wrapper())
    }

    /// Looks for one embedding of this pattern in `object`.
    ///
    /// # Errors
    /// [`IrError::Match`] with whatever the matcher reports;
    /// [`IrError::is_mismatch`] tells a plain miss from a failure.
    pub fn find_in<O>(
        &self,
        object: &dyn GraphCapability<Node = O>,
        config: Config,
    ) -> Result<MatchContext<PatternHandle, O>, IrError>
    where
        O: Clone + Eq + std::hash::Hash + std::fmt::Debug,
    {
        let graph = self.graph();
        Ok(Matcher::new(&graph, object).with_config(config).find_match()?)
    }

    /// Name-based view of a match of this pattern.
    pub fn bindings<'m, O>(
        &'m self,
        ctx: &'m MatchContext<PatternHandle, O>,
    ) -> NamedMatch<'m, PatternHandle, O>
    where
        O: Clone + Eq + std::hash::Hash + std::fmt::Debug,
    {
        NamedMatch::new(ctx, &self.names)
    }

    /// Matches the pattern against itself with the anchor pinned to its own
    /// node. A well-formed pattern always succeeds.
    ///
    /// # Errors
    /// [`IrError::Match`] if the pattern cannot be embedded in itself.
    pub fn check_self_match(
        &self,
        config: Config,
    ) -> Result<MatchContext<PatternHandle, PatternHandle>, IrError> {
        Ok(match_arenas(
            &self.arena,
            &self.arena,
            |node: &IrNode| node.kind().is_packed_wrapper(),
            |obj, ptn| std::ptr::eq(obj, ptn),
            config,
        )?)
    }
}

#[cfg(test)]
mod tests {
    use fpat_graph::EdgeTag;

    use super::*;

    fn relu_then_add() -> PatternBuilder {
        let mut builder = PatternBuilder::new();
        builder
            .value("x")
            .unwrap()
            .value("bias")
            .unwrap()
            .op("act", "relu", &["x"], &["t"])
            .unwrap()
            .op("sum", "add", &["t", "bias"], &["y"])
            .unwrap();
        builder
    }

    #[test]
    fn wrappers_sit_between_values_and_ops() {
        let pattern = relu_then_add().build();
        let sum = pattern.handle("sum").unwrap();

        let operands = sum.upstream().unwrap();
        assert_eq!(operands.tag(), Some(EdgeTag::Indexed));
        let kinds: Vec<IrKind> = operands
            .nodes()
            .iter()
            .map(|h| h.get().unwrap().kind().clone())
            .collect();
        assert_eq!(
            kinds,
            vec![IrKind::Operand { index: 0 }, IrKind::Operand { index: 1 }]
        );

        let bias = pattern.handle("bias").unwrap();
        let feeding = operands.nodes()[1].upstream().unwrap();
        assert_eq!(feeding.nodes(), std::slice::from_ref(bias));
    }

    #[test]
    fn packed_ops_use_unindexed_wrappers() {
        let mut builder = PatternBuilder::new();
        builder
            .packed_value("xs")
            .unwrap()
            .packed_op("cat", "concat", &["xs"], &["ys"])
            .unwrap();
        let pattern = builder.build();

        let cat = pattern.handle("cat").unwrap();
        assert_eq!(cat.upstream().unwrap().tag(), Some(EdgeTag::Unindexed));
        let ys = pattern.handle("ys").unwrap().get().unwrap();
        assert_eq!(ys.kind(), &IrKind::PackedValue);
    }

    #[test]
    fn rejected_op_leaves_builder_untouched() {
        let mut builder = relu_then_add();
        let before = builder.arena.len();

        let err = builder.op("again", "relu", &["x"], &["t"]).unwrap_err();
        assert!(matches!(err, IrError::DuplicateName(name) if name == "t"));
        let err = builder.op("neg", "neg", &["missing"], &["z"]).unwrap_err();
        assert!(matches!(err, IrError::UnknownName(name) if name == "missing"));
        let err = builder.op("twin", "split", &["x"], &["a", "a"]).unwrap_err();
        assert!(matches!(err, IrError::DuplicateName(name) if name == "a"));

        assert_eq!(builder.arena.len(), before);
    }

    #[test]
    fn self_match_binds_every_named_node_to_itself() {
        let pattern = relu_then_add().build();
        let ctx = pattern.check_self_match(Config::default()).unwrap();
        let bindings = pattern.bindings(&ctx);

        for (name, handle) in pattern.names() {
            assert_eq!(bindings.get(name).unwrap(), handle);
        }
    }
}
