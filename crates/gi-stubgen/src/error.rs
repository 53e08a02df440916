use thiserror::Error;

#[derive(Debug, Error)]
pub enum StubError {
    #[error("namespace '{0}' is not loaded")]
    NamespaceNotLoaded(String),

    #[error("failed to load namespace '{namespace}': {reason}")]
    NamespaceLoad { namespace: String, reason: String },

    #[error("expected {expected} for '{namespace}.{name}', found {found}")]
    TypeMismatch {
        namespace: String,
        name: String,
        expected: &'static str,
        found: &'static str,
    },

    #[error("'{namespace}.{name}' does not support the callable capability set")]
    NotCallable { namespace: String, name: String },

    #[error(
        "conflicting signatures for callback '{name}' (first seen at {first_origin}, again at {second_origin})"
    )]
    CallbackMismatch {
        name: String,
        first_origin: String,
        second_origin: String,
    },

    #[error("cannot sanitize an empty identifier")]
    EmptyIdentifier,

    #[error("invalid namespace reference '{0}': expected Namespace or Namespace-Version")]
    InvalidNamespaceRef(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, StubError>;
