//! JSON documents describing programs and patterns.
//!
//! Program:
//! ```json
//! { "values": ["x", "y"],
//!   "ops": [{ "op": "relu", "operands": ["x"], "results": ["y"] }] }
//! ```
//!
//! Pattern:
//! ```json
//! { "values": [{ "name": "x" }],
//!   "ops": [{ "name": "act", "op": "relu", "inputs": ["x"], "outputs": ["t"] }] }
//! ```

use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{IrError, Pattern, PatternBuilder, Program};

/// One operation of a [`ProgramSpec`], referring to values by name.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpSpec {
    /// Operation name.
    pub op: String,
    /// Consumed values.
    #[serde(default)]
    pub operands: Vec<String>,
    /// Produced values.
    #[serde(default)]
    pub results: Vec<String>,
}

/// Serialized form of a [`Program`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProgramSpec {
    /// Value names; each must be unique.
    pub values: Vec<String>,
    /// Operations in program order.
    #[serde(default)]
    pub ops: Vec<OpSpec>,
}

impl ProgramSpec {
    /// Parses a program document.
    ///
    /// # Errors
    /// [`IrError::Json`] on malformed input.
    pub fn from_json(text: &str) -> Result<Self, IrError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a program document.
    ///
    /// # Errors
    /// [`IrError::Io`] or [`IrError::Json`].
    pub fn from_path(path: &Path) -> Result<Self, IrError> {
        load(path)
    }

    /// Resolves value names and validates the result.
    ///
    /// # Errors
    /// - [`IrError::DuplicateName`] if a value name repeats.
    /// - [`IrError::UnknownValue`] if an op names an undeclared value.
    /// - See [`Program::validate`].
    pub fn into_program(self) -> Result<Program, IrError> {
        let mut program = Program::new();
        let mut ids = IndexMap::new();
        for name in self.values {
            if ids.contains_key(&name) {
                return Err(IrError::duplicate(name));
            }
            let id = program.add_value(name.clone());
            ids.insert(name, id);
        }

        for (pos, spec) in self.ops.into_iter().enumerate() {
            let resolve = |names: Vec<String>| {
                names
                    .into_iter()
                    .map(|name| {
                        ids.get(&name)
                            .copied()
                            .ok_or(IrError::UnknownValue { op: pos, value: name })
                    })
                    .collect::<Result<Vec<_>, _>>()
            };
            let operands = resolve(spec.operands)?;
            let results = resolve(spec.results)?;
            program.add_op(spec.op, operands, results);
        }

        program.validate()?;
        Ok(program)
    }
}

/// A value declaration in a [`PatternSpec`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValueSpec {
    /// Name of the value.
    pub name: String,
    /// Whether the value stands for any number of values.
    #[serde(default)]
    pub packed: bool,
}

/// An operation declaration in a [`PatternSpec`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternOpSpec {
    /// Name of the operation node.
    pub name: String,
    /// Operation to match, e.g. `relu`.
    pub op: String,
    /// Whether the operation is variadic.
    #[serde(default)]
    pub packed: bool,
    /// Consumed values, declared earlier.
    #[serde(default)]
    pub inputs: Vec<String>,
    /// Values this operation declares.
    #[serde(default)]
    pub outputs: Vec<String>,
}

/// Serialized form of a [`Pattern`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatternSpec {
    /// Free values, declared before any operation.
    #[serde(default)]
    pub values: Vec<ValueSpec>,
    /// Operations in declaration order.
    #[serde(default)]
    pub ops: Vec<PatternOpSpec>,
}

impl PatternSpec {
    /// Parses a pattern document.
    ///
    /// # Errors
    /// [`IrError::Json`] on malformed input.
    pub fn from_json(text: &str) -> Result<Self, IrError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Reads and parses a pattern document.
    ///
    /// # Errors
    /// [`IrError::Io`] or [`IrError::Json`].
    pub fn from_path(path: &Path) -> Result<Self, IrError> {
        load(path)
    }

    /// Replays the declarations through a [`PatternBuilder`].
    ///
    /// # Errors
    /// Whatever the builder rejects.
    pub fn build(&self) -> Result<Pattern, IrError> {
        let mut builder = PatternBuilder::new();
        for value in &self.values {
            if value.packed {
                builder.packed_value(&value.name)?;
            } else {
                builder.value(&value.name)?;
            }
        }
        for op in &self.ops {
            let inputs: Vec<&str> = op.inputs.iter().map(String::as_str).collect();
            let outputs: Vec<&str> = op.outputs.iter().map(String::as_str).collect();
            if op.packed {
                builder.packed_op(&op.name, &op.op, &inputs, &outputs)?;
            } else {
                builder.op(&op.name, &op.op, &inputs, &outputs)?;
            }
        }
        Ok(builder.build())
    }
}

fn load<T: DeserializeOwned>(path: &Path) -> Result<T, IrError> {
    debug!("loading {}", path.display());
    let text = std::fs::read_to_string(path).map_err(|source| IrError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(serde_json::from_str(&text)?)
}
