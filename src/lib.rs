//! Cypher Bridge
//!
//! Lets a generic graph-manipulation API talk to a Cypher-speaking graph
//! database.
//!
//! # Architecture
//!
//! - [`cypher::pattern`]: path patterns (alternating node and edge selectors,
//!   `*` as wildcard) compiled to `MATCH p=... RETURN p LIMIT n`
//! - [`cypher::identity`]: native element identities mapped to stable ids,
//!   either reusing the `id` property or minting fresh ids
//! - [`cypher::assembler`]: nodes, relationships and path hops folded into a
//!   deduplicated [`ResultGraph`]
//! - [`cypher::neighborhood`] and [`cypher::schema`]: ego graphs and schema
//!   graphs
//! - [`adapter`]: the async surface, one session per statement
//!
//! The database driver, id generation and filter compilation are injected
//! through the traits in [`session`].
//!
//! ## Example Usage
//!
//! ```rust
//! use cypher_bridge::cypher::{compile_pattern, GraphAssembler, RawSegment};
//! use cypher_bridge::session::{NativeNode, UuidGenerator};
//! use cypher_bridge::PropertyMap;
//!
//! let query = compile_pattern(["Person", "KNOWS", "*"], 25).unwrap();
//! assert_eq!(query.text, "MATCH p=(:Person)-[:KNOWS]->() RETURN p LIMIT 25");
//!
//! let mut props = PropertyMap::new();
//! props.insert("id".to_string(), "alice".into());
//! let segments = vec![RawSegment::Node(NativeNode::new(1, vec!["Person".to_string()], props))];
//! let graph = GraphAssembler::assemble(&UuidGenerator, segments).unwrap();
//! assert!(graph.node_exists("alice"));
//! ```

#![allow(missing_docs)]
#![warn(clippy::all)]

pub mod adapter;
pub mod config;
pub mod cypher;
pub mod error;
pub mod graph;
pub mod session;

// Re-export main types for convenience
pub use adapter::{CypherAdapter, NewEdge, NewNode};
pub use config::{AdapterConfig, ConfigError, ConfigResult, ConnectionSettings};
pub use cypher::{compile_pattern, CompiledQuery, IdentityMapper, IdentityMode};
pub use error::{AdapterError, AdapterResult};
pub use graph::{GraphEdge, GraphNode, Label, PropertyMap, PropertyValue, ResultGraph};
pub use session::{
    AccessMode, CypherSession, FilterCompiler, FilterError, IdGenerator, Record, SessionProvider, Statement,
    StoreError, StoreResult, UuidGenerator,
};

/// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Get version string
pub fn version() -> &'static str {
    VERSION
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(version(), "0.3.0");
    }
}
