use thiserror::Error;

/// Errors raised while building or decoding a document
#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("Document root must be an object, found {0}")]
    NotAnObject(&'static str),

    #[error("Unknown element kind: {0}")]
    UnknownKind(String),

    #[error("Invalid entity path: {0}")]
    InvalidEntityPath(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result alias for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Human-readable name of a JSON value's type, for error messages
pub(crate) fn value_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;

    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
