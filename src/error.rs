//! Error types for the adapter

use crate::session::{FilterError, StoreError};
use thiserror::Error;

/// Errors that can occur while compiling patterns, assembling results or
/// running adapter operations
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AdapterError {
    /// Pattern is empty or contains an empty token
    #[error("Path query items cannot be empty")]
    EmptyPattern,

    /// Pattern is well-formed but cannot be compiled
    #[error("Unsupported path pattern: {0}")]
    UnsupportedPattern(String),

    /// One native identity was bound to two different external ids
    #[error("Identity conflict: native id {internal} is bound to '{existing}', cannot rebind to '{attempted}'")]
    IdentityConflict {
        internal: String,
        existing: String,
        attempted: String,
    },

    /// Relationship endpoint has no node in the accompanying result
    #[error("Could not find endpoint {endpoint} of relationship {relationship}")]
    DanglingEndpoint {
        relationship: String,
        endpoint: String,
    },

    /// Session collaborator failure
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Filter compilation failure
    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),

    /// Malformed operation input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A record field did not hold the expected kind of value
    #[error("Unexpected result shape: {0}")]
    UnexpectedShape(String),

    /// Create of an id that is already taken
    #[error("{0} exists already")]
    ItemExists(String),

    /// Update of an id that does not exist
    #[error("{0} does not exist")]
    ItemMissing(String),
}

pub type AdapterResult<T> = Result<T, AdapterError>;
