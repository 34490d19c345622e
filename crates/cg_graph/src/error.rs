use alloc::borrow::Cow;
use alloc::string::String;

use thiserror::Error;

use crate::object::ConstructError;

// -----------------------------------------------------------------------------
// TypeResolutionError

/// A type tag could not be resolved to a registered type.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum TypeResolutionError {
    #[error("type tag `{0}` is not a `container::Type` path")]
    InvalidTypeTag(String),

    #[error("no registered types live in `{container}`")]
    ContainerNotFound { container: String },

    #[error("`{container}` has no registered type named `{name}`")]
    TypeNotFound { container: String, name: String },

    #[error("no environment registered under `{0}`")]
    EnvironmentNotFound(String),
}

// -----------------------------------------------------------------------------
// MalformedKind

/// The ways a document can fail to have the shape of a config document.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum MalformedKind {
    #[error("record is missing the `{key}` tag")]
    MissingTag { key: &'static str },

    #[error("record tag `{key}` holds a {found}")]
    InvalidTag {
        key: &'static str,
        found: &'static str,
    },

    #[error("expected a record at the document root, found a {found}")]
    NotARecord { found: &'static str },

    #[error("attribute `{key}` collides with a record tag")]
    ReservedKey { key: &'static str },
}

// -----------------------------------------------------------------------------
// ConvertError

/// Every failure of an encode or decode call.
///
/// Conversion is fail-fast: the first error aborts the whole call and no
/// partial document or object graph is returned.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConvertError {
    /// An attribute holds a value with type identity but no conversion rule.
    #[error("unsupported value kind `{type_path}` for key `{key}`")]
    UnsupportedValueKind {
        key: String,
        type_path: Cow<'static, str>,
    },

    /// A type declares a parameter it cannot read back.
    #[error("`{type_path}` declares parameter `{key}` but exposes no attribute for it")]
    MissingAttribute {
        type_path: &'static str,
        key: &'static str,
    },

    #[error("type resolution failed: {0}")]
    TypeResolution(#[from] TypeResolutionError),

    /// The resolved type rejected the decoded arguments.
    #[error("failed to construct `{type_path}`: {source}")]
    Construction {
        type_path: String,
        #[source]
        source: ConstructError,
    },

    #[error("malformed document: {0}")]
    MalformedDocument(#[from] MalformedKind),

    #[error("object graph is deeper than {limit} levels")]
    DepthExceeded { limit: usize },

    #[error("decoded `{found}` where `{expected}` was requested")]
    UnexpectedType {
        expected: &'static str,
        found: &'static str,
    },
}
