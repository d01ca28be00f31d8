//! Programs that live outside any arena, and the adapter that lets the
//! matcher walk them.

use std::fmt;

use fpat_graph::{GraphError, NodeConstraint, NodeId};
use fpat_subgraph::{GraphCapability, MatchError, Visitor};
use indexmap::IndexSet;
use tracing::debug;

use crate::IrError;

/// Index of a value in [`Program::values`].
pub type ValueId = usize;

/// One operation of a program.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OpInstance {
    /// Operation name, e.g. `relu`.
    pub name: String,
    /// Values consumed, in operand order.
    pub operands: Vec<ValueId>,
    /// Values produced, in result order.
    pub results: Vec<ValueId>,
}

/// A flat program: named values and the operations connecting them.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Program {
    /// Value names, indexed by [`ValueId`].
    pub values: Vec<String>,
    /// Operations in program order.
    pub ops: Vec<OpInstance>,
}

impl Program {
    /// An empty program.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a value and returns its id.
    pub fn add_value(&mut self, name: impl Into<String>) -> ValueId {
        self.values.push(name.into());
        self.values.len() - 1
    }

    /// Appends an operation and returns its position.
    pub fn add_op(
        &mut self,
        name: impl Into<String>,
        operands: Vec<ValueId>,
        results: Vec<ValueId>,
    ) -> usize {
        self.ops.push(OpInstance {
            name: name.into(),
            operands,
            results,
        });
        self.ops.len() - 1
    }

    /// Checks that every op refers to existing values and that no value has
    /// two producers.
    ///
    /// # Errors
    /// - [`IrError::UnknownValue`] for a dangling value id.
    /// - [`IrError::MultipleProducers`] for a value produced twice.
    pub fn validate(&self) -> Result<(), IrError> {
        let mut produced = IndexSet::new();
        for (pos, op) in self.ops.iter().enumerate() {
            for &value in op.operands.iter().chain(&op.results) {
                if value >= self.values.len() {
                    return Err(IrError::UnknownValue {
                        op: pos,
                        value: format!("#{value}"),
                    });
                }
            }
            for &value in &op.results {
                if !produced.insert(value) {
                    return Err(IrError::MultipleProducers {
                        value: self.values[value].clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

/// A node of a program as the matcher sees it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgramNode {
    /// A value.
    Value(ValueId),
    /// An operation, by position.
    Op(usize),
    /// Operand `index` of operation `op`.
    Operand {
        /// Operation position.
        op: usize,
        /// Operand position.
        index: usize,
    },
    /// Result `index` of operation `op`.
    Result {
        /// Operation position.
        op: usize,
        /// Result position.
        index: usize,
    },
}

impl fmt::Display for ProgramNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(value) => write!(f, "value#{value}"),
            Self::Op(op) => write!(f, "op#{op}"),
            Self::Operand { op, index } => write!(f, "op#{op}.operand{index}"),
            Self::Result { op, index } => write!(f, "op#{op}.result{index}"),
        }
    }
}

/// [`GraphCapability`] over a validated [`Program`].
///
/// Edges run `value -> operand -> op -> result -> value`. Nothing is
/// ignored.
#[derive(Debug)]
pub struct ProgramGraph<'p> {
    program: &'p Program,
    consumers: Vec<Vec<ProgramNode>>,
    producers: Vec<Option<ProgramNode>>,
}

impl<'p> ProgramGraph<'p> {
    /// Validates `program` and indexes its def-use chains.
    ///
    /// # Errors
    /// See [`Program::validate`].
    pub fn new(program: &'p Program) -> Result<Self, IrError> {
        program.validate()?;

        let mut consumers = vec![Vec::new(); program.values.len()];
        let mut producers = vec![None; program.values.len()];
        for (op, inst) in program.ops.iter().enumerate() {
            for (index, &value) in inst.operands.iter().enumerate() {
                consumers[value].push(ProgramNode::Operand { op, index });
            }
            for (index, &value) in inst.results.iter().enumerate() {
                producers[value] = Some(ProgramNode::Result { op, index });
            }
        }

        debug!(
            "indexed program: {} values, {} ops",
            program.values.len(),
            program.ops.len()
        );
        Ok(Self {
            program,
            consumers,
            producers,
        })
    }

    /// Human-readable description of `node`.
    ///
    /// # Errors
    /// [`MatchError::Graph`] if `node` is not part of the program.
    pub fn describe(&self, node: &ProgramNode) -> Result<String, MatchError> {
        Ok(match *node {
            ProgramNode::Value(value) => format!("value `{}`", self.value_name(value)?),
            ProgramNode::Op(op) => format!("{} ({node})", self.op(op)?.name),
            ProgramNode::Operand { op, .. } | ProgramNode::Result { op, .. } => {
                self.constraint(node)?;
                format!("{node} of {}", self.op(op)?.name)
            }
        })
    }

    fn op(&self, op: usize) -> Result<&'p OpInstance, MatchError> {
        self.program.ops.get(op).ok_or_else(|| {
            GraphError::IndexOutOfRange {
                id: NodeId::from(op),
                len: self.program.ops.len(),
            }
            .into()
        })
    }

    fn value_name(&self, value: ValueId) -> Result<&'p str, MatchError> {
        self.program
            .values
            .get(value)
            .map(String::as_str)
            .ok_or_else(|| {
                GraphError::IndexOutOfRange {
                    id: NodeId::from(value),
                    len: self.program.values.len(),
                }
                .into()
            })
    }

    /// Value at position `index` of `list`, range-checked.
    fn slot(list: &[ValueId], index: usize) -> Result<ValueId, MatchError> {
        list.get(index).copied().ok_or_else(|| {
            GraphError::IndexOutOfRange {
                id: NodeId::from(index),
                len: list.len(),
            }
            .into()
        })
    }
}

impl GraphCapability for ProgramGraph<'_> {
    type Node = ProgramNode;

    /// Values first, then each op followed by its operands and results.
    fn nodes(&self) -> Result<Vec<Self::Node>, MatchError> {
        let values = (0..self.program.values.len()).map(ProgramNode::Value);
        let ops = self.program.ops.iter().enumerate().flat_map(|(op, inst)| {
            std::iter::once(ProgramNode::Op(op))
                .chain((0..inst.operands.len()).map(move |index| ProgramNode::Operand { op, index }))
                .chain((0..inst.results.len()).map(move |index| ProgramNode::Result { op, index }))
        });
        Ok(values.chain(ops).collect())
    }

    fn visit_upstream(
        &self,
        node: &Self::Node,
        visitor: &mut Visitor<'_, Self::Node>,
    ) -> Result<(), MatchError> {
        match *node {
            ProgramNode::Value(value) => {
                self.value_name(value)?;
                if let Some(producer) = &self.producers[value] {
                    visitor(producer)?;
                }
            }
            ProgramNode::Operand { op, index } => {
                let value = Self::slot(&self.op(op)?.operands, index)?;
                visitor(&ProgramNode::Value(value))?;
            }
            ProgramNode::Op(op) => {
                for index in 0..self.op(op)?.operands.len() {
                    visitor(&ProgramNode::Operand { op, index })?;
                }
            }
            ProgramNode::Result { op, index } => {
                Self::slot(&self.op(op)?.results, index)?;
                visitor(&ProgramNode::Op(op))?;
            }
        }
        Ok(())
    }

    fn visit_downstream(
        &self,
        node: &Self::Node,
        visitor: &mut Visitor<'_, Self::Node>,
    ) -> Result<(), MatchError> {
        match *node {
            ProgramNode::Value(value) => {
                self.value_name(value)?;
                for consumer in &self.consumers[value] {
                    visitor(consumer)?;
                }
            }
            ProgramNode::Operand { op, index } => {
                Self::slot(&self.op(op)?.operands, index)?;
                visitor(&ProgramNode::Op(op))?;
            }
            ProgramNode::Op(op) => {
                for index in 0..self.op(op)?.results.len() {
                    visitor(&ProgramNode::Result { op, index })?;
                }
            }
            ProgramNode::Result { op, index } => {
                let value = Self::slot(&self.op(op)?.results, index)?;
                visitor(&ProgramNode::Value(value))?;
            }
        }
        Ok(())
    }

    fn constraint(&self, node: &Self::Node) -> Result<NodeConstraint, MatchError> {
        Ok(match *node {
            ProgramNode::Value(value) => {
                self.value_name(value)?;
                NodeConstraint::NativeValue
            }
            ProgramNode::Op(op) => NodeConstraint::native_op(self.op(op)?.name.as_str()),
            ProgramNode::Operand { op, index } => {
                Self::slot(&self.op(op)?.operands, index)?;
                NodeConstraint::NativeOperand { index }
            }
            ProgramNode::Result { op, index } => {
                Self::slot(&self.op(op)?.results, index)?;
                NodeConstraint::NativeResult { index }
            }
        })
    }

    fn is_ignored(&self, _node: &Self::Node) -> Result<bool, MatchError> {
        Ok(false)
    }
}

#[cfg(test)]
mod tests {
    use fpat_subgraph::GraphHelper;

    use super::*;

    /// `x -> relu -> y`
    fn relu_program() -> Program {
        let mut program = Program::new();
        let x = program.add_value("x");
        let y = program.add_value("y");
        program.add_op("relu", vec![x], vec![y]);
        program
    }

    #[test]
    fn nodes_list_values_then_ops_with_their_wrappers() {
        let program = relu_program();
        let graph = ProgramGraph::new(&program).unwrap();
        assert_eq!(
            graph.nodes().unwrap(),
            vec![
                ProgramNode::Value(0),
                ProgramNode::Value(1),
                ProgramNode::Op(0),
                ProgramNode::Operand { op: 0, index: 0 },
                ProgramNode::Result { op: 0, index: 0 },
            ]
        );
    }

    #[test]
    fn edges_run_through_wrappers() {
        let program = relu_program();
        let graph = ProgramGraph::new(&program).unwrap();
        let helper = GraphHelper::new(&graph);

        let order = helper.topo_order().unwrap();
        assert_eq!(order.first(), Some(&ProgramNode::Value(0)));
        assert_eq!(order.last(), Some(&ProgramNode::Value(1)));

        let into_relu = helper.upstream(&ProgramNode::Op(0)).unwrap();
        assert!(into_relu.contains(&ProgramNode::Operand { op: 0, index: 0 }));
        assert_eq!(
            graph.constraint(&ProgramNode::Op(0)).unwrap(),
            NodeConstraint::native_op("relu")
        );
    }

    #[test]
    fn foreign_nodes_are_out_of_range() {
        let program = relu_program();
        let graph = ProgramGraph::new(&program).unwrap();

        let err = graph.constraint(&ProgramNode::Op(3)).unwrap_err();
        assert!(matches!(
            err,
            MatchError::Graph(GraphError::IndexOutOfRange { len: 1, .. })
        ));
        assert!(graph.constraint(&ProgramNode::Result { op: 0, index: 1 }).is_err());
        assert!(graph.describe(&ProgramNode::Value(9)).is_err());
    }

    #[test]
    fn validation_rejects_bad_programs() {
        let mut dangling = relu_program();
        dangling.add_op("neg", vec![7], vec![]);
        assert!(matches!(
            dangling.validate(),
            Err(IrError::UnknownValue { op: 1, .. })
        ));

        let mut twice = relu_program();
        twice.add_op("tanh", vec![0], vec![1]);
        assert!(matches!(
            ProgramGraph::new(&twice),
            Err(IrError::MultipleProducers { value }) if value == "y"
        ));
    }

    #[test]
    fn describe_uses_program_names() {
        let program = relu_program();
        let graph = ProgramGraph::new(&program).unwrap();
        assert_eq!(graph.describe(&ProgramNode::Value(1)).unwrap(), "value `y`");
        assert_eq!(graph.describe(&ProgramNode::Op(0)).unwrap(), "relu (op#0)");
        assert_eq!(
            graph
                .describe(&ProgramNode::Operand { op: 0, index: 0 })
                .unwrap(),
            "op#0.operand0 of relu"
        );
    }
}
