//! Constructor registry
//!
//! Provides [`Registry`], the name → constructor table that typed cells
//! dispatch through. The registry is owned by the embedding application, not
//! a process-wide singleton: independent registries are cheap to build,
//! which keeps tests isolated.
//!
//! # Concurrency
//!
//! `Registry` is `Send + Sync`, but `register` and `unpack` are not
//! synchronized against each other. The expected pattern is
//! single-writer-before-many-readers: collaborators register during
//! application startup, unpack happens afterwards.

use crate::error::{ConstructorError, UnpackError};
use crate::unpack::{index_ids_with_depth_limit, Unpacker};
use crate::value::Value;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use telepath_wire::{decode, Node, DEFAULT_DEPTH_LIMIT};

/// A registered constructor: positional, fully-materialized arguments in,
/// application value out
pub type ConstructorFn = dyn Fn(Vec<Value>) -> Result<Value, ConstructorError> + Send + Sync;

/// Registry of named constructors
///
/// # Example
///
/// ```rust
/// use serde_json::json;
/// use telepath_core::{Registry, Value};
///
/// let mut registry = Registry::new();
/// registry.register("Point", |args: Vec<Value>| {
///     Ok(Value::dict([
///         ("x".to_string(), args[0].clone()),
///         ("y".to_string(), args[1].clone()),
///     ]))
/// });
///
/// let point = registry
///     .unpack_json(&json!({"type": "Point", "args": [{"val": 1}, {"val": 2}]}))
///     .unwrap();
/// assert_eq!(point.get_key("x").unwrap().as_i64(), Some(1));
/// ```
#[derive(Clone, Default)]
pub struct Registry {
    constructors: HashMap<String, Arc<ConstructorFn>>,
}

impl Registry {
    /// Create a new empty registry
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            constructors: HashMap::new(),
        }
    }

    /// Register a constructor under `name`
    ///
    /// Overwriting an existing name is not an error: registries are
    /// populated incrementally by independent collaborators, and the last
    /// write wins.
    pub fn register<F>(&mut self, name: impl Into<String>, constructor: F)
    where
        F: Fn(Vec<Value>) -> Result<Value, ConstructorError> + Send + Sync + 'static,
    {
        let name = name.into();
        if self
            .constructors
            .insert(name.clone(), Arc::new(constructor))
            .is_some()
        {
            tracing::debug!("constructor overwritten: {}", name);
        } else {
            tracing::debug!("constructor registered: {}", name);
        }
    }

    /// Look up a constructor by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<ConstructorFn>> {
        self.constructors.get(name)
    }

    /// Check if a constructor is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.constructors.contains_key(name)
    }

    /// List all registered constructor names
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.constructors.keys().map(String::as_str).collect()
    }

    /// Number of registered constructors
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.constructors.len()
    }

    /// Check if the registry is empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.constructors.is_empty()
    }

    /// Materialize the object graph a document describes
    ///
    /// Two passes: a scan indexing every id-bearing node, then a recursive
    /// materialization that memoizes each identity so all `ref` cells to it
    /// observe the same instance.
    ///
    /// # Errors
    ///
    /// Any [`UnpackError`] aborts the whole call; no partial graph is
    /// returned.
    pub fn unpack(&self, document: &Node) -> Result<Value, UnpackError> {
        self.unpack_with_depth_limit(document, DEFAULT_DEPTH_LIMIT)
    }

    /// [`Registry::unpack`] with an explicit recursion limit
    ///
    /// # Errors
    ///
    /// Same as [`Registry::unpack`]; additionally
    /// [`UnpackError::RecursionLimitExceeded`] reflects `limit`.
    pub fn unpack_with_depth_limit(
        &self,
        document: &Node,
        limit: usize,
    ) -> Result<Value, UnpackError> {
        let packed = index_ids_with_depth_limit(document, limit)?;
        Unpacker::new(self, packed, limit).materialize(document)
    }

    /// Decode a raw JSON document, then unpack it
    ///
    /// # Errors
    ///
    /// [`UnpackError::Decode`] on a malformed document, otherwise as
    /// [`Registry::unpack`].
    pub fn unpack_json(&self, document: &serde_json::Value) -> Result<Value, UnpackError> {
        let node = decode(document)?;
        self.unpack(&node)
    }

    /// Parse JSON text, decode and unpack it
    ///
    /// # Errors
    ///
    /// [`UnpackError::Json`] on invalid JSON, otherwise as
    /// [`Registry::unpack_json`].
    pub fn unpack_str(&self, document: &str) -> Result<Value, UnpackError> {
        let value: serde_json::Value = serde_json::from_str(document)?;
        self.unpack_json(&value)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("constructors", &self.names())
            .finish()
    }
}
