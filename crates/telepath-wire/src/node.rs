//! Document nodes - the decoded form of a Telepath wire payload
//!
//! A wire document is an untyped JSON tree using reserved marker keys.
//! Decoding turns it into a closed variant ([`NodeKind`]) once, so the rest
//! of the pipeline never re-inspects raw key presence.

use std::fmt::{self, Display, Formatter};

/// Reserved marker keys of the wire format
pub mod keys {
    /// Declares the node addressable by identity.
    pub const ID: &str = "id";
    /// Registry lookup key for a constructor invocation.
    pub const TYPE: &str = "type";
    /// Positional constructor arguments, paired with `type`.
    pub const ARGS: &str = "args";
    /// Literal value carried through without interpretation.
    pub const VAL: &str = "val";
    /// Ordered sequence of nodes.
    pub const LIST: &str = "list";
    /// Explicit mapping, used when keys might collide with markers.
    pub const DICT: &str = "dict";
    /// Reference to another node's identity.
    pub const REF: &str = "ref";
}

/// Identity of an addressable node within a single document
///
/// The wire format allows either integers or strings in `id` and `ref`
/// positions. Identities are only meaningful within one document.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeId {
    /// Integer identity
    Int(i64),
    /// String identity
    Str(String),
}

impl Display for NodeId {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(n) => write!(f, "{n}"),
            Self::Str(s) => write!(f, "{s}"),
        }
    }
}

impl From<i64> for NodeId {
    #[inline]
    fn from(n: i64) -> Self {
        Self::Int(n)
    }
}

impl From<&str> for NodeId {
    #[inline]
    fn from(s: &str) -> Self {
        Self::Str(s.to_string())
    }
}

impl From<String> for NodeId {
    #[inline]
    fn from(s: String) -> Self {
        Self::Str(s)
    }
}

/// One decoded document node
///
/// Any shape except scalars and plain mappings may additionally carry an
/// `id`, which makes the materialized value addressable by [`NodeKind::Ref`]
/// cells elsewhere in the document.
#[derive(Debug, Clone, PartialEq)]
pub struct Node {
    id: Option<NodeId>,
    kind: NodeKind,
}

/// The closed set of node shapes
///
/// Mapping entries preserve decode order; for plain mappings and dict cells
/// key order is not semantically significant.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Non-object leaf (null, boolean, number, string), kept raw.
    Scalar(serde_json::Value),
    /// Ordered sequence, from a `list` cell or a bare JSON array.
    List(Vec<Node>),
    /// Explicit mapping from a `dict` cell.
    Dict(Vec<(String, Node)>),
    /// Ordinary mapping with no reserved keys present.
    Mapping(Vec<(String, Node)>),
    /// Literal payload from a `val` cell, never re-interpreted.
    Val(serde_json::Value),
    /// Constructor invocation: registry name plus positional arguments.
    Typed {
        /// Registry lookup key.
        name: String,
        /// Arguments, unpacked left-to-right before construction.
        args: Vec<Node>,
    },
    /// Stand-in for another node's materialized value, by identity.
    Ref(NodeId),
}

impl Node {
    /// Create a node with no identity
    #[inline]
    #[must_use]
    pub fn new(kind: NodeKind) -> Self {
        Self { id: None, kind }
    }

    /// Create a node with an optional identity
    #[inline]
    #[must_use]
    pub fn with_id(id: Option<NodeId>, kind: NodeKind) -> Self {
        Self { id, kind }
    }

    /// Identity declared on this node, if any
    #[inline]
    #[must_use]
    pub fn id(&self) -> Option<&NodeId> {
        self.id.as_ref()
    }

    /// Shape of this node
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }
}
