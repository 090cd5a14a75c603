//! Error types for graph unpacking
//!
//! Every failure aborts the whole `unpack` call: there is no partial or
//! best-effort materialization, and per-call state never outlives the call.

use telepath_wire::{DecodeError, NodeId};

/// Errors while materializing an object graph from a document
#[derive(Debug, thiserror::Error)]
pub enum UnpackError {
    /// Document could not be decoded into the typed model
    #[error("decode failed: {0}")]
    Decode(#[from] DecodeError),

    /// Document text is not valid JSON
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),

    /// A typed cell names a constructor absent from the registry
    #[error("unknown constructor: '{name}'")]
    UnknownConstructor {
        /// The unregistered name
        name: String,
    },

    /// A `ref` points at an id no node in the document declares
    #[error("dangling reference: {id}")]
    DanglingRef {
        /// The unresolved identity
        id: NodeId,
    },

    /// A `ref` resolves to an identity whose materialization is still in
    /// progress (a true constructor-argument cycle)
    #[error("cyclic reference through constructor arguments: {id}")]
    CyclicReference {
        /// The identity on the cycle
        id: NodeId,
    },

    /// A registered constructor rejected its arguments
    #[error("constructor '{name}' failed: {source}")]
    Constructor {
        /// The constructor name
        name: String,
        /// The constructor's own error
        #[source]
        source: ConstructorError,
    },

    /// Materialization recursed past the depth limit
    #[error("unpack recursion exceeded depth limit of {limit}")]
    RecursionLimitExceeded {
        /// The limit that was exceeded
        limit: usize,
    },
}

/// Errors a registered constructor may return
#[derive(Debug, thiserror::Error)]
pub enum ConstructorError {
    /// Wrong number of positional arguments
    #[error("wrong number of arguments: expected {expected}, got {got}")]
    Arity {
        /// Arguments the constructor requires
        expected: usize,
        /// Arguments it received
        got: usize,
    },

    /// Constructor-specific failure
    #[error("{0}")]
    Message(String),
}

impl ConstructorError {
    /// Constructor-specific failure with a message
    #[inline]
    #[must_use]
    pub fn message(text: impl Into<String>) -> Self {
        Self::Message(text.into())
    }

    /// Check an exact argument count, for use at the top of constructors
    ///
    /// # Errors
    ///
    /// Returns [`ConstructorError::Arity`] when the counts differ.
    pub fn check_arity(expected: usize, got: usize) -> Result<(), Self> {
        if expected == got {
            Ok(())
        } else {
            Err(Self::Arity { expected, got })
        }
    }
}
