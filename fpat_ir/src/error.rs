//! Error types for the reference dialect.

use std::path::PathBuf;

use fpat_graph::GraphError;
use fpat_subgraph::MatchError;
use thiserror::Error;

/// Errors raised while building patterns, validating programs or loading
/// either from JSON.
#[derive(Debug, Error)]
pub enum IrError {
    /// A pattern name was declared twice.
    #[error("name `{0}` is already declared")]
    DuplicateName(String),

    /// A pattern op used a value name that was never declared.
    #[error("name `{0}` is not declared")]
    UnknownName(String),

    /// A program op refers to a value that does not exist.
    #[error("op #{op} refers to unknown value `{value}`")]
    UnknownValue {
        /// Position of the op in the program.
        op: usize,
        /// The unresolved value reference.
        value: String,
    },

    /// A program value is produced by more than one op result.
    #[error("value `{value}` has more than one producer")]
    MultipleProducers {
        /// Name of the value.
        value: String,
    },

    /// Arena construction failed.
    #[error(transparent)]
    Graph(#[from] GraphError),

    /// Matching failed.
    #[error(transparent)]
    Match(#[from] MatchError),

    /// Malformed JSON document.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A document could not be read.
    #[error("cannot read {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },
}

impl IrError {
    /// Create a duplicate-name error.
    pub fn duplicate(name: impl Into<String>) -> Self {
        Self::DuplicateName(name.into())
    }

    /// Create an unknown-name error.
    pub fn unknown(name: impl Into<String>) -> Self {
        Self::UnknownName(name.into())
    }

    /// Whether this wraps the matcher's "no embedding" outcome.
    #[must_use]
    pub const fn is_mismatch(&self) -> bool {
        matches!(self, Self::Match(err) if err.is_mismatch())
    }
}
