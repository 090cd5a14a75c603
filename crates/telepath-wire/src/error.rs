//! Error types for wire decoding
//!
//! All decode failures are fatal to the surrounding unpack: the document is
//! rejected up front rather than producing a partially-typed tree.

/// Errors while decoding a JSON value into the typed document model
#[derive(Debug, thiserror::Error)]
pub enum DecodeError {
    /// Object carries `id` but no recognized payload shape
    #[error("object with id but no type specified")]
    MissingType,

    /// `id` value is not an integer or string
    #[error("invalid id: {found}")]
    InvalidId {
        /// The offending JSON value
        found: serde_json::Value,
    },

    /// `ref` value is not an integer or string
    #[error("invalid ref: {found}")]
    InvalidRef {
        /// The offending JSON value
        found: serde_json::Value,
    },

    /// `type` value is not a string
    #[error("invalid type name: {found}")]
    InvalidTypeName {
        /// The offending JSON value
        found: serde_json::Value,
    },

    /// `type` cell has no `args` key
    #[error("typed cell '{type_name}' has no args")]
    MissingArgs {
        /// The constructor name on the offending cell
        type_name: String,
    },

    /// `args` value is not an array
    #[error("args of typed cell '{type_name}' is not an array")]
    InvalidArgs {
        /// The constructor name on the offending cell
        type_name: String,
    },

    /// `list` value is not an array
    #[error("list cell payload is not an array")]
    InvalidList,

    /// `dict` value is not an object
    #[error("dict cell payload is not an object")]
    InvalidDict,

    /// Document nesting exceeded the decoder's depth limit
    #[error("document nesting exceeded depth limit of {limit}")]
    DepthLimitExceeded {
        /// The limit that was exceeded
        limit: usize,
    },

    /// Document is not valid JSON
    #[error("invalid json: {0}")]
    Json(#[from] serde_json::Error),
}
