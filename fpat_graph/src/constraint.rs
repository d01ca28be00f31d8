use std::fmt;

/// Structural fingerprint of a node, used to prune candidates cheaply.
///
/// Equality is structural (kind plus payload). A matching fingerprint is a
/// necessary condition for a binding, never a sufficient one.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum NodeConstraint {
    /// A single concrete value (tensor).
    NativeValue,
    /// A concrete operation.
    NativeOp {
        /// Operation name, e.g. `relu`.
        name: String,
    },
    /// Positional operand slot of a concrete operation.
    NativeOperand {
        /// Operand position.
        index: usize,
    },
    /// Positional result slot of a concrete operation.
    NativeResult {
        /// Result position.
        index: usize,
    },
    /// A variadic group of values.
    PackedValue,
    /// An operation with a variable number of operands or results.
    PackedOp {
        /// Operation name.
        name: String,
    },
    /// Operand slot of a packed operation.
    PackedOperand,
    /// Result slot of a packed operation.
    PackedResult,
}

impl NodeConstraint {
    /// Shorthand for [`NodeConstraint::NativeOp`].
    pub fn native_op(name: impl Into<String>) -> Self {
        Self::NativeOp { name: name.into() }
    }

    /// Shorthand for [`NodeConstraint::PackedOp`].
    pub fn packed_op(name: impl Into<String>) -> Self {
        Self::PackedOp { name: name.into() }
    }

    /// Whether the node is an operation (native or packed).
    #[must_use]
    pub const fn is_op(&self) -> bool {
        matches!(self, Self::NativeOp { .. } | Self::PackedOp { .. })
    }

    /// Whether the node is a packed placeholder.
    #[must_use]
    pub const fn is_packed(&self) -> bool {
        match self {
            Self::PackedValue | Self::PackedOp { .. } | Self::PackedOperand | Self::PackedResult => {
                true
            }
            Self::NativeValue
            | Self::NativeOp { .. }
            | Self::NativeOperand { .. }
            | Self::NativeResult { .. } => false,
        }
    }

    /// Whether an object node fingerprinted `object` may stand in for a
    /// pattern node fingerprinted `self`.
    ///
    /// Native pattern constraints require equality. Packed pattern constraints
    /// also accept their native counterpart: any value, any operand or result
    /// slot regardless of position, and a native op of the same name.
    #[must_use]
    pub fn is_satisfied_by(&self, object: &Self) -> bool {
        if self == object {
            return true;
        }
        match (self, object) {
            (Self::PackedValue, Self::NativeValue)
            | (Self::PackedOperand, Self::NativeOperand { .. })
            | (Self::PackedResult, Self::NativeResult { .. }) => true,
            (Self::PackedOp { name }, Self::NativeOp { name: other }) => name == other,
            _ => false,
        }
    }
}

impl fmt::Display for NodeConstraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NativeValue => f.write_str("value"),
            Self::NativeOp { name } => write!(f, "op({name})"),
            Self::NativeOperand { index } => write!(f, "operand#{index}"),
            Self::NativeResult { index } => write!(f, "result#{index}"),
            Self::PackedValue => f.write_str("packed value"),
            Self::PackedOp { name } => write!(f, "packed op({name})"),
            Self::PackedOperand => f.write_str("packed operand"),
            Self::PackedResult => f.write_str("packed result"),
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;

    #[rstest]
    #[case::same_value(NodeConstraint::NativeValue, NodeConstraint::NativeValue, true)]
    #[case::same_op(NodeConstraint::native_op("relu"), NodeConstraint::native_op("relu"), true)]
    #[case::other_op(NodeConstraint::native_op("relu"), NodeConstraint::native_op("add"), false)]
    #[case::operand_index(
        NodeConstraint::NativeOperand { index: 0 },
        NodeConstraint::NativeOperand { index: 1 },
        false
    )]
    #[case::packed_value(NodeConstraint::PackedValue, NodeConstraint::NativeValue, true)]
    #[case::packed_op(NodeConstraint::packed_op("concat"), NodeConstraint::native_op("concat"), true)]
    #[case::packed_op_name(NodeConstraint::packed_op("concat"), NodeConstraint::native_op("add"), false)]
    #[case::packed_operand(
        NodeConstraint::PackedOperand,
        NodeConstraint::NativeOperand { index: 3 },
        true
    )]
    #[case::packed_result(NodeConstraint::PackedResult, NodeConstraint::NativeResult { index: 1 }, true)]
    #[case::native_never_packed(NodeConstraint::NativeValue, NodeConstraint::PackedValue, false)]
    #[case::kinds_differ(NodeConstraint::NativeValue, NodeConstraint::native_op("relu"), false)]
    fn satisfaction(
        #[case] pattern: NodeConstraint,
        #[case] object: NodeConstraint,
        #[case] expected: bool,
    ) {
        assert_eq!(pattern.is_satisfied_by(&object), expected);
    }

    #[test]
    fn classification() {
        assert!(NodeConstraint::native_op("relu").is_op());
        assert!(NodeConstraint::packed_op("concat").is_op());
        assert!(NodeConstraint::packed_op("concat").is_packed());
        assert!(!NodeConstraint::PackedValue.is_op());
        assert!(!NodeConstraint::NativeOperand { index: 0 }.is_op());
        assert!(!NodeConstraint::NativeResult { index: 0 }.is_packed());
    }

    #[test]
    fn display() {
        assert_eq!(NodeConstraint::native_op("relu").to_string(), "op(relu)");
        assert_eq!(NodeConstraint::NativeOperand { index: 2 }.to_string(), "operand#2");
    }
}
