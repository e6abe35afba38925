//! Error types for instance loading.

use thiserror::Error;

/// Problems that prevent an instance file from being turned into a usable
/// [`PDPTWInstance`](crate::instance::PDPTWInstance).
///
/// Unparsable numeric fields are never reported here: they fall back to
/// their documented defaults while parsing.
#[derive(Debug, Error)]
pub enum InstanceError {
    #[error("Cannot open file {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Instance has no depot node")]
    NoDepot,

    #[error("Missing {0} section")]
    MissingSection(&'static str),

    #[error("Expected {expected} node lines, found {found}")]
    MissingNodeLine { expected: usize, found: usize },

    #[error("Expected {expected} travel-time rows, found {found}")]
    MissingMatrixRow { expected: usize, found: usize },

    #[error("Travel-time row {row} has {len} entries, expected {expected}")]
    RaggedMatrix {
        row: usize,
        len: usize,
        expected: usize,
    },

    #[error("Node on line {index} declares id {id}")]
    NodeIdMismatch { index: usize, id: usize },

    #[error("Node {node} is not correctly paired (pair reference {pair:?})")]
    BrokenPair { node: usize, pair: Option<usize> },
}
