//! Telepath Wire Format
//!
//! Typed document model for the Telepath serialization protocol: a compact
//! JSON encoding of object graphs that supports shared references and cycles
//! through a small set of reserved marker keys.
//!
//! # Core Concepts
//!
//! - [`Node`]: one decoded document node (optional identity + shape)
//! - [`NodeKind`]: the closed set of node shapes (`val`, `list`, `dict`,
//!   `type`/`args`, `ref`, plain mapping, scalar)
//! - [`NodeId`]: an integer or string identity addressable by `ref` cells
//! - [`decode`]: `serde_json::Value` → [`Node`], enforcing the reserved-key
//!   priority order in one place
//!
//! # Example
//!
//! ```rust
//! use serde_json::json;
//! use telepath_wire::{decode, NodeKind};
//!
//! let node = decode(&json!({"type": "Point", "args": [{"val": 1}, {"val": 2}]})).unwrap();
//! assert!(matches!(node.kind(), NodeKind::Typed { .. }));
//! ```

#![warn(missing_docs)]
#![warn(unreachable_pub)]

mod decode;
mod error;
mod node;

// Re-exports
pub use decode::{decode, decode_str, decode_with_depth_limit, DEFAULT_DEPTH_LIMIT};
pub use error::DecodeError;
pub use node::{keys, Node, NodeId, NodeKind};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
