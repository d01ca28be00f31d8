//! Pattern node payloads.

use std::fmt;

use fpat_graph::{EdgeTag, NodeConstraint, NodeHandle};
use fpat_subgraph::ArenaNode;
use serde::{Deserialize, Serialize};

/// What a pattern node stands for.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum IrKind {
    /// A single tensor value.
    Value,
    /// A concrete operation.
    Op {
        /// Operation name.
        name: String,
    },
    /// Positional operand wrapper between a value and its consumer.
    Operand {
        /// Operand position.
        index: usize,
    },
    /// Positional result wrapper between an op and the value it produces.
    Result {
        /// Result position.
        index: usize,
    },
    /// Any number of values.
    PackedValue,
    /// An operation with variable arity.
    PackedOp {
        /// Operation name.
        name: String,
    },
    /// Operand wrapper of a packed op.
    PackedOperand,
    /// Result wrapper of a packed op.
    PackedResult,
}

impl IrKind {
    /// Structural fingerprint of this kind.
    #[must_use]
    pub fn constraint(&self) -> NodeConstraint {
        match self {
            Self::Value => NodeConstraint::NativeValue,
            Self::Op { name } => NodeConstraint::native_op(name.as_str()),
            Self::Operand { index } => NodeConstraint::NativeOperand { index: *index },
            Self::Result { index } => NodeConstraint::NativeResult { index: *index },
            Self::PackedValue => NodeConstraint::PackedValue,
            Self::PackedOp { name } => NodeConstraint::packed_op(name.as_str()),
            Self::PackedOperand => NodeConstraint::PackedOperand,
            Self::PackedResult => NodeConstraint::PackedResult,
        }
    }

    /// Operand and result wrappers of packed ops. Anchor search sees through
    /// them; their binding follows their neighbour's.
    #[must_use]
    pub const fn is_packed_wrapper(&self) -> bool {
        matches!(self, Self::PackedOperand | Self::PackedResult)
    }

    /// Adjacency tag of edges touching a node of this kind.
    #[must_use]
    pub const fn edge_tag(&self) -> EdgeTag {
        match self {
            Self::Value | Self::PackedValue | Self::PackedOp { .. } => EdgeTag::Unindexed,
            Self::PackedOperand | Self::PackedResult => EdgeTag::Unindexed,
            Self::Op { .. } | Self::Operand { .. } | Self::Result { .. } => EdgeTag::Indexed,
        }
    }
}

/// A node of a pattern arena.
///
/// Carries its own handle so a payload reached through `Arena::at` can
/// still walk its neighbours.
pub struct IrNode {
    handle: NodeHandle<IrNode>,
    kind: IrKind,
    label: Option<String>,
}

impl IrNode {
    pub(crate) const fn new(handle: NodeHandle<Self>, kind: IrKind, label: Option<String>) -> Self {
        Self {
            handle,
            kind,
            label,
        }
    }

    /// Handle of this node in its arena.
    pub const fn handle(&self) -> &NodeHandle<Self> {
        &self.handle
    }

    /// What the node stands for.
    pub const fn kind(&self) -> &IrKind {
        &self.kind
    }

    /// User-facing name, if the node was declared with one.
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }
}

impl ArenaNode for IrNode {
    fn constraint(&self) -> NodeConstraint {
        self.kind.constraint()
    }
}

impl fmt::Debug for IrNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IrNode")
            .field("id", &self.handle.id())
            .field("kind", &self.kind)
            .field("label", &self.label)
            .finish()
    }
}

impl fmt::Display for IrNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.handle, self.kind.constraint())?;
        if let Some(label) = &self.label {
            write!(f, " `{label}`")?;
        }
        Ok(())
    }
}
