//! Decoder from raw JSON into the typed document model
//!
//! Reserved-key priority is the contract of the wire format and is enforced
//! in exactly one place ([`decode_object`]): `ref` > `val` > `list` > `dict`
//! > `type`, then the id-without-shape error, then plain mapping. Extra keys
//! on a marker-bearing object are ignored, except `id`.

use crate::error::DecodeError;
use crate::node::{keys, Node, NodeId, NodeKind};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// Default nesting limit for decode, scan and materialize passes
///
/// Matches the recursion limit of `serde_json`'s parser, so any document
/// that parses will normally also decode.
pub const DEFAULT_DEPTH_LIMIT: usize = 128;

/// Decode a JSON value into a typed document node
///
/// # Errors
///
/// Returns [`DecodeError`] on malformed marker payloads, an `id` with no
/// payload shape, or nesting beyond [`DEFAULT_DEPTH_LIMIT`].
pub fn decode(value: &Value) -> Result<Node, DecodeError> {
    decode_with_depth_limit(value, DEFAULT_DEPTH_LIMIT)
}

/// Decode with an explicit nesting limit
///
/// # Errors
///
/// Returns [`DecodeError`] on malformed marker payloads or nesting beyond
/// `limit`.
pub fn decode_with_depth_limit(value: &Value, limit: usize) -> Result<Node, DecodeError> {
    decode_at(value, 0, limit)
}

/// Parse JSON text and decode it into a typed document node
///
/// # Errors
///
/// Returns [`DecodeError::Json`] if the text is not valid JSON, otherwise
/// the same errors as [`decode`].
pub fn decode_str(text: &str) -> Result<Node, DecodeError> {
    let value: Value = serde_json::from_str(text)?;
    decode(&value)
}

impl TryFrom<&Value> for Node {
    type Error = DecodeError;

    fn try_from(value: &Value) -> Result<Self, Self::Error> {
        decode(value)
    }
}

impl<'de> Deserialize<'de> for Node {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        decode(&value).map_err(serde::de::Error::custom)
    }
}

fn decode_at(value: &Value, depth: usize, limit: usize) -> Result<Node, DecodeError> {
    if depth >= limit {
        return Err(DecodeError::DepthLimitExceeded { limit });
    }
    match value {
        Value::Object(map) => decode_object(map, depth, limit),
        Value::Array(items) => {
            let nodes = items
                .iter()
                .map(|item| decode_at(item, depth + 1, limit))
                .collect::<Result<Vec<_>, _>>()?;
            // Bare arrays cannot carry an id
            Ok(Node::new(NodeKind::List(nodes)))
        }
        scalar => Ok(Node::new(NodeKind::Scalar(scalar.clone()))),
    }
}

fn decode_object(
    map: &Map<String, Value>,
    depth: usize,
    limit: usize,
) -> Result<Node, DecodeError> {
    let id = match map.get(keys::ID) {
        Some(raw) => Some(node_id(raw).ok_or_else(|| DecodeError::InvalidId {
            found: raw.clone(),
        })?),
        None => None,
    };

    if let Some(raw) = map.get(keys::REF) {
        let target = node_id(raw).ok_or_else(|| DecodeError::InvalidRef {
            found: raw.clone(),
        })?;
        return Ok(Node::with_id(id, NodeKind::Ref(target)));
    }

    if let Some(raw) = map.get(keys::VAL) {
        // Payload stays raw; it is never re-interpreted
        return Ok(Node::with_id(id, NodeKind::Val(raw.clone())));
    }

    if let Some(raw) = map.get(keys::LIST) {
        let items = raw.as_array().ok_or(DecodeError::InvalidList)?;
        let nodes = items
            .iter()
            .map(|item| decode_at(item, depth + 1, limit))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Node::with_id(id, NodeKind::List(nodes)));
    }

    if let Some(raw) = map.get(keys::DICT) {
        let entries = raw.as_object().ok_or(DecodeError::InvalidDict)?;
        let decoded = decode_entries(entries, depth, limit)?;
        return Ok(Node::with_id(id, NodeKind::Dict(decoded)));
    }

    if let Some(raw) = map.get(keys::TYPE) {
        let name = raw
            .as_str()
            .ok_or_else(|| DecodeError::InvalidTypeName {
                found: raw.clone(),
            })?
            .to_string();
        let raw_args = map.get(keys::ARGS).ok_or_else(|| DecodeError::MissingArgs {
            type_name: name.clone(),
        })?;
        let items = raw_args
            .as_array()
            .ok_or_else(|| DecodeError::InvalidArgs {
                type_name: name.clone(),
            })?;
        let args = items
            .iter()
            .map(|item| decode_at(item, depth + 1, limit))
            .collect::<Result<Vec<_>, _>>()?;
        return Ok(Node::with_id(id, NodeKind::Typed { name, args }));
    }

    if id.is_some() {
        return Err(DecodeError::MissingType);
    }

    let entries = decode_entries(map, depth, limit)?;
    Ok(Node::new(NodeKind::Mapping(entries)))
}

fn decode_entries(
    map: &Map<String, Value>,
    depth: usize,
    limit: usize,
) -> Result<Vec<(String, Node)>, DecodeError> {
    map.iter()
        .map(|(key, value)| Ok((key.clone(), decode_at(value, depth + 1, limit)?)))
        .collect()
}

fn node_id(raw: &Value) -> Option<NodeId> {
    match raw {
        Value::Number(n) => n.as_i64().map(NodeId::Int),
        Value::String(s) => Some(NodeId::Str(s.clone())),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decode_scalars() {
        assert!(matches!(
            decode(&json!(null)).unwrap().kind(),
            NodeKind::Scalar(Value::Null)
        ));
        assert!(matches!(
            decode(&json!(true)).unwrap().kind(),
            NodeKind::Scalar(Value::Bool(true))
        ));
        assert!(matches!(
            decode(&json!(3)).unwrap().kind(),
            NodeKind::Scalar(Value::Number(_))
        ));
        assert!(matches!(
            decode(&json!("hello")).unwrap().kind(),
            NodeKind::Scalar(Value::String(_))
        ));
    }

    #[test]
    fn decode_bare_array() {
        let node = decode(&json!([1, 2, 3])).unwrap();
        assert_eq!(node.id(), None);
        match node.kind() {
            NodeKind::List(items) => assert_eq!(items.len(), 3),
            other => panic!("expected list, got {other:?}"),
        }
    }

    #[test]
    fn decode_plain_mapping() {
        let node = decode(&json!({"a": 1, "b": [1, 2]})).unwrap();
        match node.kind() {
            NodeKind::Mapping(entries) => {
                assert_eq!(entries.len(), 2);
                assert_eq!(entries[0].0, "a");
            }
            other => panic!("expected mapping, got {other:?}"),
        }
    }

    #[test]
    fn decode_val_cell_keeps_payload_raw() {
        let node = decode(&json!({"val": {"ref": 1}, "id": 4})).unwrap();
        assert_eq!(node.id(), Some(&NodeId::Int(4)));
        match node.kind() {
            NodeKind::Val(raw) => assert_eq!(raw, &json!({"ref": 1})),
            other => panic!("expected val, got {other:?}"),
        }
    }

    #[test]
    fn decode_typed_cell() {
        let node = decode(&json!({"type": "Point", "args": [{"val": 1}, {"val": 2}]})).unwrap();
        match node.kind() {
            NodeKind::Typed { name, args } => {
                assert_eq!(name, "Point");
                assert_eq!(args.len(), 2);
            }
            other => panic!("expected typed, got {other:?}"),
        }
    }

    #[test]
    fn decode_dict_cell_with_reserved_keys_inside() {
        let node = decode(&json!({"dict": {"type": "not-a-marker", "ref": 9}})).unwrap();
        match node.kind() {
            NodeKind::Dict(entries) => {
                assert_eq!(entries.len(), 2);
                assert!(entries.iter().any(|(k, _)| k == "type"));
            }
            other => panic!("expected dict, got {other:?}"),
        }
    }

    #[test]
    fn decode_string_and_int_ids() {
        let node = decode(&json!({"id": "blk", "val": 1})).unwrap();
        assert_eq!(node.id(), Some(&NodeId::Str("blk".to_string())));

        let node = decode(&json!({"id": 12, "val": 1})).unwrap();
        assert_eq!(node.id(), Some(&NodeId::Int(12)));
    }

    #[test]
    fn marker_priority_ref_beats_val() {
        let node = decode(&json!({"ref": 1, "val": 2})).unwrap();
        assert!(matches!(node.kind(), NodeKind::Ref(NodeId::Int(1))));
    }

    #[test]
    fn marker_priority_val_beats_list() {
        let node = decode(&json!({"val": 2, "list": [1]})).unwrap();
        assert!(matches!(node.kind(), NodeKind::Val(_)));
    }

    #[test]
    fn marker_priority_list_beats_dict() {
        let node = decode(&json!({"list": [1], "dict": {}})).unwrap();
        assert!(matches!(node.kind(), NodeKind::List(_)));
    }

    #[test]
    fn marker_priority_dict_beats_type() {
        let node = decode(&json!({"dict": {}, "type": "Point", "args": []})).unwrap();
        assert!(matches!(node.kind(), NodeKind::Dict(_)));
    }

    #[test]
    fn id_without_shape_is_rejected() {
        let err = decode(&json!({"id": 1})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingType));

        // Extra non-reserved keys do not rescue an id-only node
        let err = decode(&json!({"id": 1, "label": "x"})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingType));
    }

    #[test]
    fn args_without_type_is_a_plain_mapping() {
        // The priority chain never checks `args` on its own
        let node = decode(&json!({"args": [1, 2]})).unwrap();
        assert!(matches!(node.kind(), NodeKind::Mapping(_)));
    }

    #[test]
    fn type_without_args_is_rejected() {
        let err = decode(&json!({"type": "Point"})).unwrap_err();
        assert!(matches!(err, DecodeError::MissingArgs { type_name } if type_name == "Point"));
    }

    #[test]
    fn malformed_marker_payloads_are_rejected() {
        assert!(matches!(
            decode(&json!({"type": 7, "args": []})).unwrap_err(),
            DecodeError::InvalidTypeName { .. }
        ));
        assert!(matches!(
            decode(&json!({"type": "P", "args": 3})).unwrap_err(),
            DecodeError::InvalidArgs { .. }
        ));
        assert!(matches!(
            decode(&json!({"list": 3})).unwrap_err(),
            DecodeError::InvalidList
        ));
        assert!(matches!(
            decode(&json!({"dict": 3})).unwrap_err(),
            DecodeError::InvalidDict
        ));
        assert!(matches!(
            decode(&json!({"id": true, "val": 1})).unwrap_err(),
            DecodeError::InvalidId { .. }
        ));
        assert!(matches!(
            decode(&json!({"ref": 1.5})).unwrap_err(),
            DecodeError::InvalidRef { .. }
        ));
    }

    #[test]
    fn depth_limit_is_enforced() {
        let mut doc = json!(1);
        for _ in 0..10 {
            doc = json!({ "list": [doc] });
        }
        assert!(matches!(
            decode_with_depth_limit(&doc, 5).unwrap_err(),
            DecodeError::DepthLimitExceeded { limit: 5 }
        ));
        assert!(decode_with_depth_limit(&doc, 64).is_ok());
    }

    #[test]
    fn decode_str_parses_json_text() {
        let node = decode_str(r#"{"val": 42}"#).unwrap();
        assert!(matches!(node.kind(), NodeKind::Val(_)));

        assert!(matches!(
            decode_str("not json").unwrap_err(),
            DecodeError::Json(_)
        ));
    }

    #[test]
    fn node_deserialize_via_serde() {
        let node: Node = serde_json::from_str(r#"{"ref": 3}"#).unwrap();
        assert!(matches!(node.kind(), NodeKind::Ref(NodeId::Int(3))));
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        // JSON values whose object keys never collide with reserved markers
        fn marker_free_json() -> impl Strategy<Value = Value> {
            let leaf = prop_oneof![
                Just(Value::Null),
                any::<bool>().prop_map(Value::Bool),
                any::<i64>().prop_map(|n| Value::Number(n.into())),
                "k[a-z]{0,6}".prop_map(Value::String),
            ];
            leaf.prop_recursive(4, 24, 4, |inner| {
                prop_oneof![
                    prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
                    prop::collection::btree_map("k[a-z]{0,6}", inner, 0..4)
                        .prop_map(|m| Value::Object(m.into_iter().collect())),
                ]
            })
        }

        proptest! {
            #[test]
            fn marker_free_documents_always_decode(doc in marker_free_json()) {
                prop_assert!(decode(&doc).is_ok());
            }

            #[test]
            fn decode_is_deterministic(doc in marker_free_json()) {
                prop_assert_eq!(decode(&doc).unwrap(), decode(&doc).unwrap());
            }
        }
    }
}
