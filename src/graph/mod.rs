//! In-memory property graph model
//!
//! This module holds the graph values the engine hands to callers:
//! - Nodes with stable ids, ordered label sets and properties
//! - Directed edges carrying at most one relationship type
//! - The deduplicating [`ResultGraph`] container

pub mod edge;
pub mod node;
pub mod property;
pub mod result;
pub mod types;

// Re-export main types
pub use edge::GraphEdge;
pub use node::GraphNode;
pub use property::{without_reserved, PropertyMap, PropertyValue, RESERVED_KEYS};
pub use result::ResultGraph;
pub use types::{quote_identifier, Label, NativeId};
