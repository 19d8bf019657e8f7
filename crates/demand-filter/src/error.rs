//! Error types for the demand-filter crate.

use thiserror::Error;

/// Errors that can occur when collecting, parsing, or compiling demands.
///
/// Every error aborts the whole operation: there is no partial filter.
#[derive(Debug, Error)]
pub enum FilterError {
    /// An alias key does not have the `table-field` shape.
    #[error("malformed alias '{alias}': {reason}")]
    MalformedAlias { alias: String, reason: &'static str },

    /// A demand node has the wrong structure (e.g. a scalar where a mapping is expected).
    #[error("malformed demand at '{path}': {message}")]
    MalformedDemand { path: String, message: String },

    /// A restriction is missing a required key.
    #[error("missing key '{key}' at '{path}'")]
    MissingKey { path: String, key: &'static str },

    /// A grouping alias did not resolve to an `or` or `and` group.
    #[error("grouping alias '{alias}' has no '{connective}' group")]
    MissingGroupKey {
        alias: String,
        connective: &'static str,
    },

    /// A restriction value does not fit its operator.
    #[error("invalid value for '{operator}' on field '{field}': {message}")]
    InvalidRestrictionValue {
        field: String,
        operator: &'static str,
        message: String,
    },

    /// Operator tag is not recognized and the compiler is configured to reject it.
    #[error("unsupported operator '{operator}' on field '{field}'")]
    UnknownOperator { field: String, operator: String },

    /// A predicate references a field the evaluated record does not have.
    #[error("unknown field reference '{field}'")]
    InvalidFieldReference { field: String },

    /// No factory is registered for a configured provider type.
    #[error("provider '{id}' has unregistered type '{kind}'")]
    UnknownProviderType { id: String, kind: String },

    /// A demand provider failed to produce its demand.
    #[error("provider '{id}' failed: {message}")]
    Provider { id: String, message: String },

    /// A configuration file could not be parsed.
    #[error("invalid configuration in {path}: {message}")]
    Config { path: String, message: String },

    /// I/O failure while reading a configuration or demand file.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON decoding failure.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// YAML decoding failure.
    #[error("invalid YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

/// Result type for demand-filter operations.
pub type Result<T> = std::result::Result<T, FilterError>;
