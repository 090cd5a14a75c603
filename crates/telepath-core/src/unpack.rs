//! Two-pass graph materialization
//!
//! Pass one ([`index_ids`]) walks the document and indexes every id-bearing
//! node without constructing anything, which is what makes forward
//! references resolvable. Pass two ([`Unpacker::materialize`]) walks it
//! again, memoizing each identity on first materialization so every `ref`
//! to it observes the identical instance.
//!
//! Id-bearing containers are memoized *before* their children materialize
//! (allocate, publish, then fill), so cycles that run through list or dict
//! positions resolve to the shared cell. A cycle that runs through
//! constructor *arguments* cannot be satisfied - the constructor has not
//! produced a value yet - and fails with [`UnpackError::CyclicReference`]
//! instead of hanging.

use crate::error::UnpackError;
use crate::registry::Registry;
use crate::value::Value;
use indexmap::IndexMap;
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use telepath_wire::{Node, NodeId, NodeKind, DEFAULT_DEPTH_LIMIT};

/// Index every id-bearing node in a document
///
/// Pure function of the document: running it twice yields the same index.
/// A duplicate id keeps the last occurrence, matching the order the scan
/// visits nodes.
///
/// # Errors
///
/// [`UnpackError::RecursionLimitExceeded`] on nesting beyond
/// [`DEFAULT_DEPTH_LIMIT`].
pub fn index_ids(document: &Node) -> Result<HashMap<NodeId, &Node>, UnpackError> {
    index_ids_with_depth_limit(document, DEFAULT_DEPTH_LIMIT)
}

/// [`index_ids`] with an explicit recursion limit
///
/// # Errors
///
/// [`UnpackError::RecursionLimitExceeded`] on nesting beyond `limit`.
pub fn index_ids_with_depth_limit(
    document: &Node,
    limit: usize,
) -> Result<HashMap<NodeId, &Node>, UnpackError> {
    let mut index = HashMap::new();
    scan(document, &mut index, 0, limit)?;
    Ok(index)
}

fn scan<'doc>(
    node: &'doc Node,
    index: &mut HashMap<NodeId, &'doc Node>,
    depth: usize,
    limit: usize,
) -> Result<(), UnpackError> {
    if depth >= limit {
        return Err(UnpackError::RecursionLimitExceeded { limit });
    }
    if let Some(id) = node.id() {
        if index.insert(id.clone(), node).is_some() {
            tracing::warn!("duplicate id in document: {}", id);
        }
    }
    match node.kind() {
        NodeKind::List(items) | NodeKind::Typed { args: items, .. } => {
            for item in items {
                scan(item, index, depth + 1, limit)?;
            }
        }
        NodeKind::Dict(entries) | NodeKind::Mapping(entries) => {
            for (_, value) in entries {
                scan(value, index, depth + 1, limit)?;
            }
        }
        // Val payloads are opaque; scalars and refs are leaves
        NodeKind::Scalar(_) | NodeKind::Val(_) | NodeKind::Ref(_) => {}
    }
    Ok(())
}

/// Per-call materialization state
///
/// Created fresh for each top-level unpack and dropped with it; nothing
/// here is shared across calls.
pub(crate) struct Unpacker<'a> {
    registry: &'a Registry,
    packed: HashMap<NodeId, &'a Node>,
    memo: HashMap<NodeId, Value>,
    in_progress: HashSet<NodeId>,
    depth_limit: usize,
}

impl<'a> Unpacker<'a> {
    pub(crate) fn new(
        registry: &'a Registry,
        packed: HashMap<NodeId, &'a Node>,
        depth_limit: usize,
    ) -> Self {
        Self {
            registry,
            packed,
            memo: HashMap::new(),
            in_progress: HashSet::new(),
            depth_limit,
        }
    }

    pub(crate) fn materialize(&mut self, document: &'a Node) -> Result<Value, UnpackError> {
        self.materialize_at(document, 0)
    }

    // The depth guard covers ref chains, which add frames beyond the
    // document's tree depth already bounded at decode time.
    fn materialize_at(&mut self, node: &'a Node, depth: usize) -> Result<Value, UnpackError> {
        if depth >= self.depth_limit {
            return Err(UnpackError::RecursionLimitExceeded {
                limit: self.depth_limit,
            });
        }
        if let Some(id) = node.id() {
            if let Some(memoized) = self.memo.get(id) {
                return Ok(memoized.clone());
            }
        }

        let value = match node.kind() {
            NodeKind::Scalar(raw) | NodeKind::Val(raw) => Value::from_json(raw),
            NodeKind::List(items) => {
                let cell = Rc::new(RefCell::new(Vec::with_capacity(items.len())));
                if let Some(id) = node.id() {
                    // Publish the empty cell first so inner refs to this id
                    // resolve to the same instance
                    self.memo.insert(id.clone(), Value::List(cell.clone()));
                }
                for item in items {
                    let materialized = self.materialize_at(item, depth + 1)?;
                    cell.borrow_mut().push(materialized);
                }
                Value::List(cell)
            }
            NodeKind::Dict(entries) | NodeKind::Mapping(entries) => {
                let cell = Rc::new(RefCell::new(IndexMap::with_capacity(entries.len())));
                if let Some(id) = node.id() {
                    self.memo.insert(id.clone(), Value::Dict(cell.clone()));
                }
                for (key, value) in entries {
                    let materialized = self.materialize_at(value, depth + 1)?;
                    cell.borrow_mut().insert(key.clone(), materialized);
                }
                Value::Dict(cell)
            }
            NodeKind::Typed { name, args } => {
                let constructor = self
                    .registry
                    .get(name)
                    .ok_or_else(|| UnpackError::UnknownConstructor { name: name.clone() })?
                    .clone();
                if let Some(id) = node.id() {
                    self.in_progress.insert(id.clone());
                }
                let mut materialized = Vec::with_capacity(args.len());
                for arg in args {
                    materialized.push(self.materialize_at(arg, depth + 1)?);
                }
                if let Some(id) = node.id() {
                    self.in_progress.remove(id);
                }
                constructor(materialized).map_err(|source| UnpackError::Constructor {
                    name: name.clone(),
                    source,
                })?
            }
            NodeKind::Ref(target) => {
                if let Some(memoized) = self.memo.get(target) {
                    memoized.clone()
                } else if self.in_progress.contains(target) {
                    return Err(UnpackError::CyclicReference { id: target.clone() });
                } else {
                    tracing::trace!("resolving forward reference: {}", target);
                    let packed = self
                        .packed
                        .get(target)
                        .copied()
                        .ok_or_else(|| UnpackError::DanglingRef { id: target.clone() })?;
                    self.in_progress.insert(target.clone());
                    let resolved = self.materialize_at(packed, depth + 1)?;
                    self.in_progress.remove(target);
                    resolved
                }
            }
        };

        if let Some(id) = node.id() {
            // Containers pre-published themselves; everything else is
            // memoized here, on completion
            self.memo
                .entry(id.clone())
                .or_insert_with(|| value.clone());
        }
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use telepath_wire::decode;

    fn doc(value: serde_json::Value) -> Node {
        decode(&value).unwrap()
    }

    #[test]
    fn scan_indexes_ids_across_shapes() {
        let document = doc(json!({
            "outer": {
                "list": [
                    {"id": 1, "val": "a"},
                    {"id": "b", "dict": {"inner": {"id": 2, "type": "T", "args": [{"id": 3, "val": null}]}}},
                ],
            }
        }));
        let index = index_ids(&document).unwrap();
        assert_eq!(index.len(), 4);
        assert!(index.contains_key(&NodeId::Int(1)));
        assert!(index.contains_key(&NodeId::Str("b".to_string())));
        assert!(index.contains_key(&NodeId::Int(2)));
        assert!(index.contains_key(&NodeId::Int(3)));
    }

    #[test]
    fn scan_is_idempotent() {
        let document = doc(json!([
            {"id": 1, "val": 1},
            {"id": 2, "list": [{"id": 3, "val": 3}]},
        ]));
        let first = index_ids(&document).unwrap();
        let second = index_ids(&document).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn scan_does_not_enter_val_payloads() {
        let document = doc(json!({"val": {"id": 1, "val": "hidden"}}));
        let index = index_ids(&document).unwrap();
        assert!(index.is_empty());
    }

    #[test]
    fn scan_duplicate_id_last_wins() {
        let document = doc(json!([
            {"id": 1, "val": "first"},
            {"id": 1, "val": "second"},
        ]));
        let index = index_ids(&document).unwrap();
        assert_eq!(index.len(), 1);
        match index[&NodeId::Int(1)].kind() {
            NodeKind::Val(raw) => assert_eq!(raw, &json!("second")),
            other => panic!("expected val, got {other:?}"),
        }
    }

    #[test]
    fn scan_depth_limit() {
        let mut raw = json!(1);
        for _ in 0..40 {
            raw = json!([raw]);
        }
        let document = decode(&raw).unwrap();
        let err = index_ids_with_depth_limit(&document, 16).unwrap_err();
        assert!(matches!(
            err,
            UnpackError::RecursionLimitExceeded { limit: 16 }
        ));
    }
}
