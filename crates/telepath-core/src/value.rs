//! Materialized graph values
//!
//! Unlike a JSON tree, an unpacked graph has reference semantics: two `ref`
//! cells naming the same id must observe the identical instance, and a
//! container may (indirectly) contain itself. Lists and dicts are therefore
//! shared `Rc<RefCell<..>>` cells, and constructor-produced application
//! objects are shared `Rc<dyn Any>` handles.

use indexmap::IndexMap;
use std::any::Any;
use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;

/// Shared list cell
pub type ListCell = Rc<RefCell<Vec<Value>>>;
/// Shared dict cell
pub type DictCell = Rc<RefCell<IndexMap<String, Value>>>;

/// One materialized value in an unpacked object graph
///
/// `Value` is deliberately `!Send`: a graph is produced and consumed by one
/// caller, which is what keeps the shared cells cheap. Clone is shallow for
/// the shared variants.
#[derive(Clone)]
pub enum Value {
    /// JSON null
    Null,
    /// Boolean
    Bool(bool),
    /// Number (integer or float, as on the wire)
    Number(serde_json::Number),
    /// String
    String(Rc<str>),
    /// Ordered sequence, shared by identity
    List(ListCell),
    /// Mapping, shared by identity (dict cells and plain mappings)
    Dict(DictCell),
    /// Constructor-produced application object, shared by identity
    Object(Rc<dyn Any>),
}

impl Value {
    /// Build a list value from materialized items
    #[must_use]
    pub fn list(items: Vec<Value>) -> Self {
        Self::List(Rc::new(RefCell::new(items)))
    }

    /// Build a dict value from key/value pairs
    #[must_use]
    pub fn dict(entries: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self::Dict(Rc::new(RefCell::new(entries.into_iter().collect())))
    }

    /// Wrap an application object
    #[must_use]
    pub fn object<T: Any>(value: T) -> Self {
        Self::Object(Rc::new(value))
    }

    /// Structural conversion of a raw JSON value, with no marker
    /// interpretation (used for `val` payloads and scalars)
    #[must_use]
    pub fn from_json(value: &serde_json::Value) -> Self {
        match value {
            serde_json::Value::Null => Self::Null,
            serde_json::Value::Bool(b) => Self::Bool(*b),
            serde_json::Value::Number(n) => Self::Number(n.clone()),
            serde_json::Value::String(s) => Self::String(Rc::from(s.as_str())),
            serde_json::Value::Array(items) => {
                Self::list(items.iter().map(Self::from_json).collect())
            }
            serde_json::Value::Object(map) => Self::dict(
                map.iter()
                    .map(|(key, value)| (key.clone(), Self::from_json(value))),
            ),
        }
    }

    /// Identity comparison: true iff both values are the same shared cell
    ///
    /// Scalars carry no identity and always compare false here.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::List(a), Self::List(b)) => Rc::ptr_eq(a, b),
            (Self::Dict(a), Self::Dict(b)) => Rc::ptr_eq(a, b),
            (Self::Object(a), Self::Object(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }

    /// True for `Value::Null`
    #[inline]
    #[must_use]
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    /// Boolean payload, if this is a boolean
    #[inline]
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Integer payload, if this is an integer-valued number
    #[inline]
    #[must_use]
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Number(n) => n.as_i64(),
            _ => None,
        }
    }

    /// Float payload, if this is a number
    #[inline]
    #[must_use]
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => n.as_f64(),
            _ => None,
        }
    }

    /// String payload, if this is a string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Element at `index`, if this is a list (shallow clone)
    #[must_use]
    pub fn get(&self, index: usize) -> Option<Value> {
        match self {
            Self::List(items) => items.borrow().get(index).cloned(),
            _ => None,
        }
    }

    /// Value under `key`, if this is a dict (shallow clone)
    #[must_use]
    pub fn get_key(&self, key: &str) -> Option<Value> {
        match self {
            Self::Dict(entries) => entries.borrow().get(key).cloned(),
            _ => None,
        }
    }

    /// Borrow the application object as `T`, if this is an object of that type
    #[must_use]
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        match self {
            Self::Object(object) => object.downcast_ref::<T>(),
            _ => None,
        }
    }
}

/// Structural equality with an identity short-circuit
///
/// Two values that are the same shared cell compare equal without
/// descending. Comparing two *distinct* cyclic graphs does not terminate;
/// use [`Value::ptr_eq`] when identity is what is being asserted.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        if self.ptr_eq(other) {
            return true;
        }
        match (self, other) {
            (Self::Null, Self::Null) => true,
            (Self::Bool(a), Self::Bool(b)) => a == b,
            (Self::Number(a), Self::Number(b)) => a == b,
            (Self::String(a), Self::String(b)) => a == b,
            (Self::List(a), Self::List(b)) => *a.borrow() == *b.borrow(),
            (Self::Dict(a), Self::Dict(b)) => *a.borrow() == *b.borrow(),
            // Objects compare by identity only, handled by ptr_eq above
            _ => false,
        }
    }
}

// Graphs may be cyclic, so Debug stops descending at a fixed depth instead
// of borrowing its way around a cycle forever.
const DEBUG_DEPTH_LIMIT: usize = 8;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_at(self, f, 0)
    }
}

fn fmt_at(value: &Value, f: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    if depth >= DEBUG_DEPTH_LIMIT {
        return f.write_str("..");
    }
    match value {
        Value::Null => f.write_str("Null"),
        Value::Bool(b) => write!(f, "Bool({b})"),
        Value::Number(n) => write!(f, "Number({n})"),
        Value::String(s) => write!(f, "String({s:?})"),
        Value::List(items) => match items.try_borrow() {
            Ok(items) => {
                f.write_str("List[")?;
                for (index, item) in items.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    fmt_at(item, f, depth + 1)?;
                }
                f.write_str("]")
            }
            Err(_) => f.write_str("List(<borrowed>)"),
        },
        Value::Dict(entries) => match entries.try_borrow() {
            Ok(entries) => {
                f.write_str("Dict{")?;
                for (index, (key, item)) in entries.iter().enumerate() {
                    if index > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{key:?}: ")?;
                    fmt_at(item, f, depth + 1)?;
                }
                f.write_str("}")
            }
            Err(_) => f.write_str("Dict(<borrowed>)"),
        },
        Value::Object(_) => f.write_str("Object(..)"),
    }
}

impl From<bool> for Value {
    #[inline]
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl From<i64> for Value {
    #[inline]
    fn from(n: i64) -> Self {
        Self::Number(n.into())
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n).map_or(Self::Null, Self::Number)
    }
}

impl From<&str> for Value {
    #[inline]
    fn from(s: &str) -> Self {
        Self::String(Rc::from(s))
    }
}

impl From<String> for Value {
    #[inline]
    fn from(s: String) -> Self {
        Self::String(Rc::from(s.as_str()))
    }
}
