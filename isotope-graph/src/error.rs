//! Error types for decoding, validating, generating and encoding service graphs.

use isotope_types::pct::ParsePercentageError;
use isotope_types::size::ParseSizeError;
use thiserror::Error;

/// Errors that can occur while decoding a service graph document.
///
/// No partially decoded graph is ever returned alongside an error.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The JSON document does not have the expected structure.
    #[error("failed to parse JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// The YAML document does not have the expected structure.
    #[error("failed to parse YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A size or percentage literal does not match its grammar.
    #[error("malformed {field} in {context}: {source}")]
    MalformedLiteral {
        /// The document field holding the literal, e.g. `errorRate`.
        field: &'static str,
        /// Where the field was found, e.g. `service "s1"` or `defaults`.
        context: String,
        /// The underlying parse error.
        #[source]
        source: LiteralError,
    },

    /// The document is well-formed, but does not describe a valid graph.
    #[error("invalid service graph: {0}")]
    Invalid(#[from] ValidationError),
}

/// A parse error of a single literal, see [`DecodeError::MalformedLiteral`].
#[derive(Debug, Error)]
pub enum LiteralError {
    /// A [`ByteSize`](isotope_types::ByteSize) literal.
    #[error(transparent)]
    Size(#[from] ParseSizeError),
    /// A [`Percentage`](isotope_types::Percentage) literal.
    #[error(transparent)]
    Percentage(#[from] ParsePercentageError),
}

/// Graph-level invariant violations, reported by [`validate`](crate::decode::validate).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A service has an empty name.
    #[error("service name must not be empty")]
    EmptyServiceName,

    /// Two services share the same name.
    #[error("service {0:?} is defined more than once")]
    DuplicateService(String),

    /// A request command targets a service that is not part of the graph.
    #[error("service {service:?} calls unknown service {target:?}")]
    UnknownServiceReference {
        /// The service whose script contains the request.
        service: String,
        /// The name of the missing target.
        target: String,
    },
}

/// Errors returned by [`generate`](crate::generate::generate) for invalid input.
///
/// These are checked before any service is constructed.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum GenerateError {
    /// No clusters were given to place services on.
    #[error("the cluster list must not be empty")]
    EmptyClusterList,

    /// A cluster label is the empty string.
    #[error("cluster label at position {0} is empty")]
    EmptyClusterLabel(usize),

    /// The random source returned an index outside of the requested range.
    #[error("random source returned {index}, expected a value below {len}")]
    SampleOutOfRange {
        /// The returned index.
        index: usize,
        /// The exclusive upper bound that was requested.
        len: usize,
    },
}

/// Error returned by [`ServiceGraph::find_service_by_name`](crate::ServiceGraph::find_service_by_name).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LookupError {
    /// No service with the given name exists in the graph.
    #[error("{0} is not found")]
    ServiceNotFound(String),
}

/// Errors that can occur while encoding a service graph document.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Serializing to JSON failed.
    #[error("failed to encode JSON document: {0}")]
    Json(#[from] serde_json::Error),

    /// Serializing to YAML failed.
    #[error("failed to encode YAML document: {0}")]
    Yaml(#[from] serde_yaml::Error),
}
