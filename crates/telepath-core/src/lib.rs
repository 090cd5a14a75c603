//! Telepath Core
//!
//! Graph-preserving object deserialization: reconstructs rich application
//! object graphs - shared references and cycles included - from the compact
//! tree-shaped Telepath wire format, dispatching typed nodes through a
//! registry of named constructors.
//!
//! # Core Concepts
//!
//! - [`Registry`]: name → constructor table, owned by the application
//! - [`Value`]: materialized graph value with reference semantics
//! - [`Registry::unpack`] / [`Registry::unpack_json`] /
//!   [`Registry::unpack_str`]: two-pass unpacking with per-call memoization
//! - [`index_ids`]: the scan pass, exposed for inspection and testing
//!
//! # Example
//!
//! ```rust
//! use telepath_core::{Registry, Value};
//!
//! let mut registry = Registry::new();
//! registry.register("Point", |args: Vec<Value>| {
//!     Ok(Value::dict([
//!         ("x".to_string(), args[0].clone()),
//!         ("y".to_string(), args[1].clone()),
//!     ]))
//! });
//!
//! let point = registry
//!     .unpack_str(r#"{"type": "Point", "args": [{"val": 1}, {"val": 2}]}"#)
//!     .unwrap();
//! assert_eq!(point.get_key("y").unwrap().as_i64(), Some(2));
//! ```
//!
//! # Limitations
//!
//! A cycle that runs through constructor arguments (A's args need B, B's
//! args need A) is not representable by constructor-based unpacking: every
//! constructor runs only after all of its arguments are fully materialized.
//! Such documents fail with [`UnpackError::CyclicReference`]. Cycles through
//! list/dict positions, or refs to already-completed identities, are fine.

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod error;
mod registry;
mod unpack;
mod value;

// Re-exports
pub use error::{ConstructorError, UnpackError};
pub use registry::{ConstructorFn, Registry};
pub use unpack::{index_ids, index_ids_with_depth_limit};
pub use value::{DictCell, ListCell, Value};

pub use telepath_wire::{
    decode, decode_str, DecodeError, Node, NodeId, NodeKind, DEFAULT_DEPTH_LIMIT,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
