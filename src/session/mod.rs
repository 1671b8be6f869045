//! External collaborators of the adapter
//!
//! The adapter never talks to a driver directly. It is handed:
//! - a [`SessionProvider`] that opens [`CypherSession`]s, one per operation
//! - an [`IdGenerator`] for stable ids the store does not carry
//! - a [`FilterCompiler`] turning Mongo-like filters into Cypher constraints

pub mod record;
pub mod value;

pub use record::Record;
pub use value::{NativeNode, NativePath, NativeRelationship, PathSegment, Value};

use crate::graph::{PropertyMap, PropertyValue};
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// Opaque failure reported by a session
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{message}")]
pub struct StoreError {
    pub message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure reported by the filter compiler
#[derive(Error, Debug, Clone, PartialEq)]
#[error("{0}")]
pub struct FilterError(pub String);

/// Whether a session will only read or may also write
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessMode {
    Read,
    Write,
}

impl fmt::Display for AccessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessMode::Read => write!(f, "read"),
            AccessMode::Write => write!(f, "write"),
        }
    }
}

/// A Cypher statement with its parameters
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Statement {
    pub text: String,
    pub params: PropertyMap,
}

impl Statement {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            params: PropertyMap::new(),
        }
    }

    /// Builder-style parameter binding
    pub fn param(mut self, name: impl Into<String>, value: impl Into<PropertyValue>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.text)
    }
}

/// An open session against the store.
///
/// Implementations own the network round trip, cancellation and timeouts.
#[async_trait]
pub trait CypherSession: Send {
    /// Execute one statement and return every record it produced, in order
    async fn run(&mut self, statement: &Statement) -> StoreResult<Vec<Record>>;

    /// Release the session
    async fn close(&mut self) -> StoreResult<()>;
}

/// Source of sessions, acquired and released around every operation
#[async_trait]
pub trait SessionProvider: Send + Sync {
    type Session: CypherSession;

    async fn acquire(&self, mode: AccessMode) -> StoreResult<Self::Session>;
}

/// Source of globally unique stable ids
pub trait IdGenerator: Send + Sync {
    fn new_id(&self) -> String;
}

/// Random UUID v4 ids
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Translates a structured filter into a Cypher constraint over `variable`,
/// e.g. `{"age": {"$gt": 3}}` over `n` into `n.age > 3`.
pub trait FilterCompiler: Send + Sync {
    fn compile(&self, filter: &serde_json::Value, variable: &str) -> Result<String, FilterError>;
}
